//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fluent::FluentArgs;
use serde::Serialize;
use thiserror::Error;

use domain_checkout::CheckoutError;

use crate::i18n;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg, None)
            }
            ApiError::Checkout(err) => return checkout_error_response(err),
        };

        error_body(status, error_type, message, details)
    }
}

/// Maps domain checkout errors to HTTP responses
///
/// Everything the client can fix is a 422 with a localized message;
/// settlement callbacks referencing unknown orders or method keys are 404s.
fn checkout_error_response(err: CheckoutError) -> Response {
    use StatusCode as S;

    match err {
        CheckoutError::InvalidSelection(errors) => {
            let details: serde_json::Map<String, serde_json::Value> = errors
                .into_iter()
                .map(|(key, fields)| (key, serde_json::json!(fields)))
                .collect();
            error_body(
                S::UNPROCESSABLE_ENTITY,
                "validation_error",
                i18n::message("invalid-payment-selection", None),
                Some(serde_json::Value::Object(details)),
            )
        }
        CheckoutError::NoMethodEnabled => error_body(
            S::UNPROCESSABLE_ENTITY,
            "validation_error",
            i18n::message("no-method-enabled", None),
            None,
        ),
        CheckoutError::MultiplePayBalance => error_body(
            S::UNPROCESSABLE_ENTITY,
            "validation_error",
            i18n::message("multiple-pay-balance", None),
            None,
        ),
        CheckoutError::AmountNotSpecified => error_body(
            S::UNPROCESSABLE_ENTITY,
            "validation_error",
            i18n::message("amount-not-specified", None),
            None,
        ),
        CheckoutError::AmountMismatch { submitted, total } => {
            let mut args = FluentArgs::new();
            args.set("submitted", submitted.to_string());
            args.set("total", total.to_string());
            error_body(
                S::UNPROCESSABLE_ENTITY,
                "validation_error",
                i18n::message("amount-mismatch", Some(&args)),
                None,
            )
        }
        CheckoutError::Overpayment { submitted, total } => {
            let mut args = FluentArgs::new();
            args.set("submitted", submitted.to_string());
            args.set("total", total.to_string());
            error_body(
                S::UNPROCESSABLE_ENTITY,
                "validation_error",
                i18n::message("overpayment", Some(&args)),
                None,
            )
        }
        CheckoutError::UnknownMethod(method) => {
            let mut args = FluentArgs::new();
            args.set("method", method);
            error_body(
                S::UNPROCESSABLE_ENTITY,
                "validation_error",
                i18n::message("unknown-method", Some(&args)),
                None,
            )
        }
        CheckoutError::OrderNotFound(_) => error_body(
            S::NOT_FOUND,
            "not_found",
            i18n::message("order-not-found", None),
            None,
        ),
        CheckoutError::NoRecordedPayment(key) => {
            let mut args = FluentArgs::new();
            args.set("key", key);
            error_body(
                S::NOT_FOUND,
                "not_found",
                i18n::message("no-recorded-payment", Some(&args)),
                None,
            )
        }
        CheckoutError::UnsupportedSettlement(_) => error_body(
            S::CONFLICT,
            "conflict",
            i18n::message("unsupported-settlement", None),
            None,
        ),
        CheckoutError::Port(err) if err.is_not_found() => {
            error_body(S::NOT_FOUND, "not_found", err.to_string(), None)
        }
        err @ (CheckoutError::Payment(_) | CheckoutError::Port(_) | CheckoutError::Money(_)) => {
            tracing::error!(error = %err, "checkout request failed");
            error_body(
                S::INTERNAL_SERVER_ERROR,
                "internal_error",
                err.to_string(),
                None,
            )
        }
    }
}

fn error_body(
    status: StatusCode,
    error_type: &str,
    message: String,
    details: Option<serde_json::Value>,
) -> Response {
    let body = ErrorResponse {
        error: error_type.to_string(),
        message,
        details,
    };
    (status, Json(body)).into_response()
}
