//! ---
//! chimera_section: "02-device-schemas"
//! chimera_subsection: "module"
//! chimera_type: "source"
//! chimera_scope: "code"
//! chimera_description: "Vehicle device record definitions."
//! chimera_version: "v0.1.0"
//! chimera_owner: "telemetry"
//! ---
use std::fmt;
use std::str::FromStr;

use chimera_wire::{Record, Schema};
use serde::{Deserialize, Serialize};

use crate::{EcuSample, InverterSample};

/// Device families with a telemetry record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Electronic control unit, see [`EcuSample`].
    Ecu,
    /// Traction inverter, see [`InverterSample`].
    Inverter,
}

impl Device {
    /// Every known device.
    pub const ALL: [Device; 2] = [Device::Ecu, Device::Inverter];

    /// Field table of the device's record.
    pub fn schema(self) -> &'static Schema {
        match self {
            Device::Ecu => EcuSample::schema(),
            Device::Inverter => InverterSample::schema(),
        }
    }

    /// Lowercase identifier used on the command line and in file names.
    pub fn as_str(self) -> &'static str {
        match self {
            Device::Ecu => "ecu",
            Device::Inverter => "inverter",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unrecognised device name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown device: {0}")]
pub struct UnknownDevice(pub String);

impl FromStr for Device {
    type Err = UnknownDevice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ecu" | "devices.ecu" => Ok(Device::Ecu),
            "inverter" | "devices.inverter" => Ok(Device::Inverter),
            other => Err(UnknownDevice(other.to_owned())),
        }
    }
}
