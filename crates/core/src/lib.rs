//! Core business logic for redeemly.

pub mod services;

pub use services::*;
