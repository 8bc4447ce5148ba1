//! Sensor drivers, hardware initialisation, and peripheral helpers.

pub mod dht11;
pub mod hw_init;
pub mod watchdog;
