//! Payment DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Order creation request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub booking_id: Uuid,
}

/// Order creation response, consumed by the checkout client
#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    /// Gateway order id to open checkout with
    pub order_id: String,
    /// Amount due in major units
    pub amount: Decimal,
    /// Amount in the gateway's minor unit (paise)
    pub amount_minor: i64,
    /// ISO currency code
    pub currency: String,
    /// Public gateway key id
    pub key_id: String,
}

/// Payment verification request, fields as posted by the checkout callback
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyPaymentRequest {
    pub booking_id: Uuid,

    #[validate(length(min = 1))]
    pub razorpay_order_id: String,

    #[validate(length(min = 1))]
    pub razorpay_payment_id: String,

    #[validate(length(min = 1))]
    pub razorpay_signature: String,
}
