#![allow(dead_code)]

use assert_cmd::cargo_bin;
use std::io::{Error, Write};
use std::process::Command;
use tempfile::NamedTempFile;

pub fn rooms_csv() -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "id, slug, name, price, discount")?;
    writeln!(file, "room-1, ocean-suite, Ocean Suite, 100, 0")?;
    writeln!(file, "room-2, garden-room, Garden Room, 60, 25")?;
    writeln!(file, "room-3, penthouse, Penthouse, 2500, 0")?;
    file.flush()?;
    Ok(file)
}

pub fn request_json(body: serde_json::Value) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    serde_json::to_writer(&mut file, &body)?;
    file.flush()?;
    Ok(file)
}

pub fn booking(method: &str, slug: &str, nights: u32) -> serde_json::Value {
    serde_json::json!({
        "checkinDate": "2025-07-01",
        "checkoutDate": format!("2025-07-{:02}", 1 + nights),
        "adults": 2,
        "children": 1,
        "numberOfDays": nights,
        "hotelRoomSlug": slug,
        "paymentMethod": method,
    })
}

/// The binary in demo mode with instant, always successful simulated payments.
pub fn demo_cmd() -> Command {
    let mut cmd = Command::new(cargo_bin!("somalipay"));
    cmd.env_remove("PAYMENT_API_KEY")
        .env_remove("PAYMENT_DEMO_MODE")
        .env_remove("RUST_LOG")
        .env("PAYMENT_DEMO_PROCESSING_MS", "0")
        .env("PAYMENT_DEMO_SUCCESS_RATE", "1.0");
    cmd
}
