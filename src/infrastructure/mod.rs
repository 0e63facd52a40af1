//! Adapters for the domain ports.
//!
//! Stores (`in_memory`, and `rocksdb` behind the `storage-rocksdb` feature) and
//! the two payment gateways: `simulated` for demo mode and `live` for
//! production traffic.

pub mod in_memory;
pub mod live;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod simulated;

use crate::config::PaymentConfig;
use crate::domain::ports::PaymentGatewayBox;
use crate::error::Result;
use live::LiveGateway;
use simulated::SimulatedGateway;

/// Picks the gateway for this process once, from the configured mode.
pub fn gateway_from_config(config: &PaymentConfig) -> Result<PaymentGatewayBox> {
    if config.demo_mode {
        tracing::info!(
            success_rate = config.demo_success_rate,
            processing_time = ?config.demo_processing_time,
            "using simulated payment gateway"
        );
        Ok(Box::new(SimulatedGateway::from_config(config)))
    } else {
        let missing = config.missing_production_vars();
        if !missing.is_empty() {
            tracing::warn!(missing = ?missing, "production payment configuration is incomplete");
        }
        Ok(Box::new(LiveGateway::from_config(config)?))
    }
}
