//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the control loop for the AirMonitor: sensor
//! acquisition, classification and the notification policy.  All
//! interaction with hardware and the network happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
