//! Payment processor webhook handlers

use axum::{extract::State, Json};

use crate::dto::checkout::{StripeEventType, StripeWebhookRequest, WebhookResponse};
use crate::{error::ApiError, AppState};

/// Handles Stripe settlement notifications
///
/// Stripe delivers events at least once; the ledger's delta arithmetic
/// makes redelivery a no-op, so every delivery gets the same acknowledgement.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    Json(event): Json<StripeWebhookRequest>,
) -> Result<Json<WebhookResponse>, ApiError> {
    tracing::info!(
        order_id = %event.order_id,
        method_key = %event.method_key,
        event = ?event.event_type,
        "stripe webhook received"
    );

    let order_status = match event.event_type {
        StripeEventType::PaymentSucceeded => {
            let (order, _) = state
                .processor
                .settle_payment_success(event.order_id, &event.method_key, &event.reference)
                .await?;
            Some(order.status)
        }
        StripeEventType::PaymentFailed => {
            let order = state
                .processor
                .settle_payment_failure(event.order_id, &event.method_key)
                .await?;
            Some(order.status)
        }
        StripeEventType::Refunded => {
            state
                .processor
                .refund_payment(event.order_id, &event.method_key, &event.reference)
                .await?;
            None
        }
    };

    Ok(Json(WebhookResponse {
        received: true,
        order_status,
    }))
}
