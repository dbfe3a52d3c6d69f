//! Checkout payment handlers

use axum::{
    extract::{Path, State},
    Json,
};

use core_kernel::OrderId;
use domain_checkout::CheckoutError;

use crate::dto::checkout::{
    CheckoutPaymentRequest, CheckoutPaymentResponse, PaymentStatesResponse,
};
use crate::{error::ApiError, AppState};

/// Records a checkout payment submission
///
/// A request without an order id places a new order; a request naming a
/// known order id is a resubmission, and the processor voids what the
/// submitted method keys previously reserved before recording again.
pub async fn record_payments(
    State(state): State<AppState>,
    Json(request): Json<CheckoutPaymentRequest>,
) -> Result<Json<CheckoutPaymentResponse>, ApiError> {
    let mut order = match request.order.id {
        Some(id) => state
            .orders
            .find_order(id)
            .await
            .map_err(CheckoutError::from)?
            .ok_or(CheckoutError::OrderNotFound(id))?,
        None => {
            let order = request.order.into_order();
            state
                .orders
                .save_order(&order)
                .await
                .map_err(CheckoutError::from)?;
            order
        }
    };

    let states = state
        .processor
        .record_payments(&mut order, &request.payment)
        .await?;

    tracing::info!(
        order = %order.number,
        status = ?order.status,
        methods = states.len(),
        "checkout payment recorded"
    );
    Ok(Json(CheckoutPaymentResponse::new(&order, states)))
}

/// Returns the current payment states of an order
pub async fn payment_states(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<PaymentStatesResponse>, ApiError> {
    let order = state
        .orders
        .find_order(order_id)
        .await
        .map_err(CheckoutError::from)?
        .ok_or(CheckoutError::OrderNotFound(order_id))?;
    let states = state.processor.payment_states(order_id).await?;

    Ok(Json(PaymentStatesResponse {
        order_id,
        order_status: order.status,
        payment_states: states
            .into_iter()
            .map(|(key, recorded)| (key, recorded.into()))
            .collect(),
    }))
}
