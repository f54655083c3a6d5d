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
    /// Sample reported by one traction inverter.
    pub struct InverterSample = "devices.Inverter" {
        /// Acquisition time in seconds.
        1 => timestamp: f32 {
            json: "timestamp",
            set: set_timestamp,
            has: has_timestamp,
            clear: clear_timestamp,
        },
        /// Inverter temperature.
        2 => temperature: f32 {
            json: "temperature",
            set: set_temperature,
            has: has_temperature,
            clear: clear_temperature,
        },
        /// Motor temperature.
        3 => motor_temp: f32 {
            json: "motorTemp",
            set: set_motor_temp,
            has: has_motor_temp,
            clear: clear_motor_temp,
        },
        /// Commanded torque.
        4 => torque: f32 {
            json: "torque",
            set: set_torque,
            has: has_torque,
            clear: clear_torque,
        },
        /// Motor speed.
        5 => speed: f32 {
            json: "speed",
            set: set_speed,
            has: has_speed,
            clear: clear_speed,
        },
    }
}
