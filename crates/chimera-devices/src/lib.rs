//! ---
//! chimera_section: "02-device-schemas"
//! chimera_subsection: "module"
//! chimera_type: "source"
//! chimera_scope: "code"
//! chimera_description: "Vehicle device record definitions."
//! chimera_version: "v0.1.0"
//! chimera_owner: "telemetry"
//! ---
//! Telemetry records emitted by the vehicle's devices.
//!
//! Each record is declared from its field table with
//! [`chimera_wire::define_record!`]; tags are the wire identity and must
//! never be renumbered once samples exist.
#![warn(missing_docs)]

pub mod device;
pub mod ecu;
pub mod inverter;

pub use device::{Device, UnknownDevice};
pub use ecu::EcuSample;
pub use inverter::InverterSample;
