use crate::domain::money::Money;
use std::fmt;
use thiserror::Error;

/// Which side of a method's amount range a total fell outside of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountBound {
    Minimum,
    Maximum,
}

impl fmt::Display for AmountBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountBound::Minimum => f.write_str("Minimum"),
            AmountBound::Maximum => f.write_str("Maximum"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),

    #[error("Invalid payment method: {0}")]
    InvalidMethod(String),
    #[error("Phone number required for {method} payments")]
    MissingContactInfo { method: String },
    #[error("Account number required for {method} bank transfers")]
    MissingAccountInfo { method: String },
    #[error("{bound} amount for {method} is ${limit} (requested ${total})")]
    AmountOutOfRange {
        method: String,
        bound: AmountBound,
        limit: Money,
        total: Money,
        min: Money,
        max: Money,
    },
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Gateway error: {0}")]
    GatewayError(String),
    #[error("Persistence error: {0}")]
    PersistenceError(String),
    #[error("Payment not found: {0}")]
    PaymentNotFound(String),
    #[error("Payment {0} already exists")]
    DuplicatePayment(String),
    #[error("Cannot move payment {payment_id} from {from} to {to}")]
    InvalidTransition {
        payment_id: String,
        from: String,
        to: String,
    },
    #[error("Payment {0} has expired")]
    PaymentExpired(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, PaymentError>;
