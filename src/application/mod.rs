//! Application layer containing the payment orchestration.
//!
//! This module defines the `PaymentService`, the entry point for opening and
//! settling booking payments. It owns the storage and gateway ports and shares
//! the method catalog read-only.

pub mod service;
