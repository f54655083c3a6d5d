//! ---
//! chimera_section: "04-tooling"
//! chimera_subsection: "binary"
//! chimera_type: "source"
//! chimera_scope: "code"
//! chimera_description: "Command line tool for Chimera telemetry samples."
//! chimera_version: "v0.1.0"
//! chimera_owner: "telemetry"
//! ---
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chimera_devices::Device;
use chimera_wire::{render, SampleWriter};
use clap::Args;
use tracing::info;

use crate::DeviceArg;

#[derive(Debug, Args)]
pub struct EncodeCommand {
    /// Record shape to build.
    #[arg(long, value_enum)]
    device: DeviceArg,

    /// JSON object of field name (snake_case or camelCase) to number.
    #[arg(long = "json", value_name = "OBJECT")]
    json: String,

    /// Write the encoded bytes to FILE instead of printing hex.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Append a length-delimited frame to FILE instead of overwriting it.
    #[arg(long = "append", action = clap::ArgAction::SetTrue, requires = "output")]
    append: bool,
}

impl EncodeCommand {
    pub fn execute(self) -> Result<()> {
        let device = Device::from(self.device);
        let value: serde_json::Value =
            serde_json::from_str(&self.json).context("--json is not valid JSON")?;
        let fields = render::from_json(device.schema(), &value)
            .with_context(|| format!("cannot build a {} sample", device))?;

        match (self.output, self.append) {
            (Some(path), true) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .with_context(|| format!("unable to open {}", path.display()))?;
                let mut writer = SampleWriter::new(file);
                let written = writer.write_fields(&fields)?;
                writer.flush()?;
                info!(
                    device = %device,
                    path = %path.display(),
                    bytes = written,
                    "sample appended"
                );
            }
            (Some(path), false) => {
                let bytes = fields.encode_to_vec();
                fs::write(&path, &bytes)
                    .with_context(|| format!("unable to write {}", path.display()))?;
                info!(
                    device = %device,
                    path = %path.display(),
                    bytes = bytes.len(),
                    "sample written"
                );
            }
            (None, _) => println!("{}", hex::encode(fields.encode_to_vec())),
        }
        Ok(())
    }
}
