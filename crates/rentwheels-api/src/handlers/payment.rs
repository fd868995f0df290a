//! Payment handlers
//!
//! Order creation and payment verification for the checkout flow.

use crate::dto::payment::{CreateOrderRequest, OrderResponse, VerifyPaymentRequest};
use crate::dto::ApiResponse;
use crate::PaymentService;
use actix_web::{web, HttpResponse};
use rentwheels_auth::AuthenticatedUser;
use rentwheels_core::AppError;
use rentwheels_services::RazorpayClient;
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

/// Create a payment order for an accepted booking
///
/// POST /api/v1/payments/create-order
#[instrument(skip(manager, gateway, req), fields(customer_id = user.user_id))]
pub async fn create_order(
    manager: web::Data<PaymentService>,
    gateway: web::Data<Arc<RazorpayClient>>,
    user: AuthenticatedUser,
    req: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let (booking, order) = manager.create_order(req.booking_id, user.user_id).await?;

    info!(booking_id = %booking.id, order_id = %order.order_id, "Payment order created");

    let response = OrderResponse {
        order_id: order.order_id,
        amount: booking.amount_due(),
        amount_minor: order.amount_minor,
        currency: order.currency,
        key_id: gateway.key_id().to_string(),
    };

    Ok(HttpResponse::Created().json(ApiResponse::success(response)))
}

/// Verify a payment callback and mark the booking paid
///
/// POST /api/v1/payments/verify
#[instrument(skip(manager, req), fields(customer_id = user.user_id))]
pub async fn verify(
    manager: web::Data<PaymentService>,
    user: AuthenticatedUser,
    req: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate()?;
    let req = req.into_inner();

    let booking = manager
        .verify_payment(
            req.booking_id,
            user.user_id,
            &req.razorpay_order_id,
            &req.razorpay_payment_id,
            &req.razorpay_signature,
        )
        .await?;

    info!(booking_id = %booking.id, "Payment verified");

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(booking, "Payment verified")))
}

/// Configure payment routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("/create-order", web::post().to(create_order))
            .route("/verify", web::post().to(verify)),
    );
}
