//! ---
//! chimera_section: "02-device-schemas"
//! chimera_subsection: "module"
//! chimera_type: "source"
//! chimera_scope: "code"
//! chimera_description: "Vehicle device record definitions."
//! chimera_version: "v0.1.0"
//! chimera_owner: "telemetry"
//! ---
chimera_wire::define_record! {
    /// Sample reported by the electronic control unit.
    pub struct EcuSample = "devices.Ecu" {
        /// Acquisition time in seconds.
        1 => timestamp: f32 {
            json: "timestamp",
            set: set_timestamp,
            has: has_timestamp,
            clear: clear_timestamp,
        },
    }
}
