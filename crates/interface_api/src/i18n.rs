//! Localized user-facing messages
//!
//! Error messages shown to customers are rendered through fluent. The
//! catalog is embedded; `FluentBundle` is not `Sync`, so a bundle is built
//! per lookup rather than shared behind the app state.

use fluent::{FluentArgs, FluentBundle, FluentResource};
use unic_langid::langid;

const EN_US: &str = r#"
invalid-payment-selection = One or more payment methods failed validation.
no-method-enabled = At least one payment method must be enabled.
multiple-pay-balance = Only one payment method may pay the remaining balance.
amount-mismatch = Payment amounts ({ $submitted }) do not match the order total ({ $total }).
overpayment = Payment amounts ({ $submitted }) exceed the order total ({ $total }).
amount-not-specified = Amount must be specified.
unknown-method = Unknown payment method: { $method }.
order-not-found = Order not found.
no-recorded-payment = No payment has been recorded under method key { $key }.
unsupported-settlement = The selected payment method does not settle out of band.
"#;

/// Renders the catalog message `id`, falling back to the id itself
///
/// Catalog problems (missing message, parse error) degrade to the message
/// id so error responses never fail to serialize.
pub fn message(id: &str, args: Option<&FluentArgs>) -> String {
    let Ok(resource) = FluentResource::try_new(EN_US.to_string()) else {
        return id.to_string();
    };

    let mut bundle = FluentBundle::new(vec![langid!("en-US")]);
    bundle.set_use_isolating(false);
    if bundle.add_resource(resource).is_err() {
        return id.to_string();
    }

    let Some(pattern) = bundle.get_message(id).and_then(|m| m.value()) else {
        return id.to_string();
    };
    let mut errors = Vec::new();
    bundle.format_pattern(pattern, args, &mut errors).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_message() {
        assert_eq!(
            message("no-method-enabled", None),
            "At least one payment method must be enabled."
        );
    }

    #[test]
    fn test_message_with_args() {
        let mut args = FluentArgs::new();
        args.set("submitted", "70.00");
        args.set("total", "64.50");
        assert_eq!(
            message("overpayment", Some(&args)),
            "Payment amounts (70.00) exceed the order total (64.50)."
        );
    }

    #[test]
    fn test_unknown_id_falls_back() {
        assert_eq!(message("does-not-exist", None), "does-not-exist");
    }
}
