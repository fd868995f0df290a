//! Payment order creation and reconciliation
//!
//! `RazorpayClient` talks to the Razorpay Orders API and checks callback
//! signatures. `PaymentManager` ties the gateway to the booking lifecycle:
//! creating an order moves an accepted booking to `payment_pending`, and a
//! verified payment moves it to `paid`. A signature that does not match
//! leaves the booking untouched.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rentwheels_core::{
    config::PaymentConfig,
    models::{Booking, PaymentStatus},
    traits::{BookingRepository, GatewayOrder, PaymentGateway},
    AppError, AppResult,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Razorpay REST API client
pub struct RazorpayClient {
    http: reqwest::Client,
    key_id: String,
    key_secret: String,
    api_base_url: String,
    currency: String,
}

/// Order response from the Razorpay API
#[derive(Debug, Deserialize)]
struct RazorpayOrder {
    id: String,
    amount: i64,
    currency: String,
}

impl RazorpayClient {
    /// Create a client from the payment configuration
    pub fn new(config: &PaymentConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            http,
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            currency: config.currency.clone(),
        }
    }

    /// Gateway key id, needed by the checkout client
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Convert a major-unit amount to the gateway's minor unit (paise)
    fn to_minor_units(amount: Decimal) -> AppResult<i64> {
        (amount * Decimal::from(100))
            .round()
            .to_i64()
            .ok_or_else(|| AppError::Gateway(format!("Amount out of range: {}", amount)))
    }

}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    #[instrument(skip(self))]
    async fn create_order(&self, amount: Decimal, receipt: &str) -> AppResult<GatewayOrder> {
        let amount_minor = Self::to_minor_units(amount)?;

        debug!(amount_minor, receipt, "Creating gateway order");

        let response = self
            .http
            .post(format!("{}/orders", self.api_base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&json!({
                "amount": amount_minor,
                "currency": self.currency,
                "receipt": receipt,
            }))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Gateway request failed");
                AppError::Gateway(format!("Order creation request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, body, "Gateway rejected order creation");
            return Err(AppError::Gateway(format!(
                "Order creation failed with status {}",
                status
            )));
        }

        let order: RazorpayOrder = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse gateway response");
            AppError::Gateway(format!("Invalid order response: {}", e))
        })?;

        info!(order_id = %order.id, amount_minor = order.amount, "Gateway order created");

        Ok(GatewayOrder {
            order_id: order.id,
            amount_minor: order.amount,
            currency: order.currency,
        })
    }

    /// Check the callback signature: HMAC-SHA256 over "order_id|payment_id"
    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        // Key length is unrestricted for HMAC, new_from_slice cannot fail
        let mut mac = HmacSha256::new_from_slice(self.key_secret.as_bytes())
            .unwrap_or_else(|_| unreachable!());
        mac.update(format!("{}|{}", order_id, payment_id).as_bytes());

        // verify_slice compares in constant time
        match hex::decode(signature) {
            Ok(bytes) => mac.verify_slice(&bytes).is_ok(),
            Err(_) => {
                debug!("Callback signature is not valid hex");
                false
            }
        }
    }
}

/// Payment reconciliation service
pub struct PaymentManager<B: BookingRepository, G: PaymentGateway> {
    booking_repo: Arc<B>,
    gateway: Arc<G>,
}

impl<B: BookingRepository, G: PaymentGateway> PaymentManager<B, G> {
    /// Create a new payment manager
    pub fn new(booking_repo: Arc<B>, gateway: Arc<G>) -> Self {
        Self {
            booking_repo,
            gateway,
        }
    }

    async fn load_owned(&self, id: Uuid, requester_id: i32) -> AppResult<Booking> {
        let booking = self
            .booking_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(id.to_string()))?;

        if booking.customer_id != requester_id {
            return Err(AppError::BookingNotFound(id.to_string()));
        }

        Ok(booking)
    }

    /// Create a payment order for an accepted booking
    ///
    /// The order amount is the rental price plus the deposit when the
    /// deposit is collected online. Re-invoking on a booking already in
    /// `payment_pending` creates a fresh order and replaces the stored
    /// order id.
    #[instrument(skip(self))]
    pub async fn create_order(
        &self,
        booking_id: Uuid,
        requester_id: i32,
    ) -> AppResult<(Booking, GatewayOrder)> {
        let booking = self.load_owned(booking_id, requester_id).await?;

        if !booking.status.can_create_order() {
            return Err(AppError::invalid_transition(booking.status, "pay"));
        }

        let amount = booking.amount_due();
        let order = self
            .gateway
            .create_order(amount, &booking_id.to_string())
            .await?;

        let updated = self
            .booking_repo
            .attach_order(booking_id, booking.status, &order.order_id)
            .await?;

        match updated {
            Some(booking) => {
                info!(
                    booking_id = %booking_id,
                    order_id = %order.order_id,
                    amount = %amount,
                    "Payment order attached"
                );
                Ok((booking, order))
            }
            None => {
                warn!(booking_id = %booking_id, "Order attachment lost the status race");
                Err(AppError::invalid_transition(booking.status, "pay"))
            }
        }
    }

    /// Verify a payment callback and mark the booking paid
    ///
    /// The signature must cover the booking's stored order id. A mismatch
    /// or tampered signature fails verification and leaves the booking in
    /// `payment_pending`.
    #[instrument(skip(self, signature))]
    pub async fn verify_payment(
        &self,
        booking_id: Uuid,
        requester_id: i32,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> AppResult<Booking> {
        let booking = self.load_owned(booking_id, requester_id).await?;

        if booking.status != rentwheels_core::models::BookingStatus::PaymentPending {
            return Err(AppError::invalid_transition(booking.status, "verify payment"));
        }

        match booking.gateway_order_id.as_deref() {
            Some(stored) if stored == order_id => {}
            _ => {
                warn!(booking_id = %booking_id, "Callback order id does not match the booking");
                return Err(AppError::PaymentVerificationFailed);
            }
        }

        if !self.gateway.verify_signature(order_id, payment_id, signature) {
            warn!(booking_id = %booking_id, "Payment signature verification failed");
            return Err(AppError::PaymentVerificationFailed);
        }

        let updated = self
            .booking_repo
            .record_payment(
                booking_id,
                booking.status,
                payment_id,
                PaymentStatus::Completed,
            )
            .await?;

        match updated {
            Some(booking) => {
                info!(booking_id = %booking_id, payment_id, "Payment verified");
                Ok(booking)
            }
            None => Err(AppError::invalid_transition(booking.status, "verify payment")),
        }
    }
}
