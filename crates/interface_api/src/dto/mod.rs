//! Request/response data transfer objects

pub mod checkout;
