//! Payment method registry
//!
//! Methods are registered once at startup and looked up by code for the
//! rest of the process lifetime. This replaces runtime model lookups with
//! explicit dependency injection: handlers receive the registry, never
//! reach into a global.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::methods::{Cash, PayLater, PaymentMethod, Stripe};

/// Registry of payment methods keyed by their stable code
#[derive(Clone, Default)]
pub struct MethodRegistry {
    methods: BTreeMap<&'static str, Arc<dyn PaymentMethod>>,
}

impl MethodRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the storefront's stock methods
    pub fn with_default_methods() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Cash));
        registry.register(Arc::new(PayLater));
        registry.register(Arc::new(Stripe));
        registry
    }

    /// Registers a method under its own code, replacing any previous entry
    pub fn register(&mut self, method: Arc<dyn PaymentMethod>) {
        self.methods.insert(method.code(), method);
    }

    /// Looks up a method by code
    pub fn get(&self, code: &str) -> Option<Arc<dyn PaymentMethod>> {
        self.methods.get(code).cloned()
    }

    /// Returns true if a method is registered under this code
    pub fn contains(&self, code: &str) -> bool {
        self.methods.contains_key(code)
    }

    /// Registered codes in stable order
    pub fn codes(&self) -> Vec<&'static str> {
        self.methods.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_methods_registered() {
        let registry = MethodRegistry::with_default_methods();
        assert_eq!(registry.codes(), vec!["cash", "pay-later", "stripe"]);
        assert!(registry.contains("cash"));
        assert!(!registry.contains("carrier-pigeon"));
    }

    #[test]
    fn test_register_replaces_same_code() {
        let mut registry = MethodRegistry::with_default_methods();
        registry.register(Arc::new(Cash));
        assert_eq!(registry.codes().len(), 3);
    }

    #[test]
    fn test_get_returns_method() {
        let registry = MethodRegistry::with_default_methods();
        let method = registry.get("pay-later").unwrap();
        assert_eq!(method.name(), "Pay Later");
    }
}
