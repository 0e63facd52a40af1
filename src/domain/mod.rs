//! Domain model of the payment rules engine: the method catalog, money and fee
//! rules, references, payment records and the ports the application drives.

pub mod catalog;
pub mod fees;
pub mod method;
pub mod money;
pub mod payment;
pub mod phone;
pub mod ports;
pub mod reference;
pub mod room;
