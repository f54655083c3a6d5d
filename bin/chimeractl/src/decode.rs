//! ---
//! chimera_section: "04-tooling"
//! chimera_subsection: "binary"
//! chimera_type: "source"
//! chimera_scope: "code"
//! chimera_description: "Command line tool for Chimera telemetry samples."
//! chimera_version: "v0.1.0"
//! chimera_owner: "telemetry"
//! ---
use std::fs;
use std::io::{self, Cursor, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chimera_common::AppConfig;
use chimera_devices::Device;
use chimera_wire::{render, FieldSet, SampleReader};
use clap::{Args, ValueEnum};
use tracing::debug;

use crate::DeviceArg;

#[derive(Debug, Args)]
pub struct DecodeCommand {
    /// Record shape to decode.
    #[arg(long, value_enum)]
    device: DeviceArg,

    /// Encoded bytes as a hex string.
    #[arg(long = "hex", value_name = "HEX", conflicts_with = "input", required_unless_present = "input")]
    hex: Option<String>,

    /// File holding the encoded bytes.
    #[arg(long = "input", short = 'i', value_name = "FILE")]
    input: Option<PathBuf>,

    /// Treat the input as a length-delimited sample log.
    #[arg(long = "delimited", action = clap::ArgAction::SetTrue)]
    delimited: bool,

    /// Output rendering.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl DecodeCommand {
    pub fn execute(self, config: &AppConfig) -> Result<()> {
        let device = Device::from(self.device);
        let bytes = match (&self.hex, &self.input) {
            (Some(text), _) => hex::decode(text.trim()).context("--hex is not valid hex")?,
            (None, Some(path)) => {
                fs::read(path).with_context(|| format!("unable to read {}", path.display()))?
            }
            (None, None) => anyhow::bail!("either --hex or --input is required"),
        };

        let samples = if self.delimited {
            let mut reader =
                SampleReader::with_max_frame_len(Cursor::new(bytes), config.stream.max_frame_len);
            let mut samples = Vec::new();
            while let Some(fields) = reader
                .read_fields(device.schema())
                .with_context(|| format!("malformed {} sample log", device))?
            {
                samples.push(fields);
            }
            samples
        } else {
            vec![FieldSet::decode(device.schema(), &bytes)
                .with_context(|| format!("malformed {} sample", device))?]
        };
        debug!(device = %device, samples = samples.len(), "input decoded");

        let stdout = io::stdout();
        print_samples(stdout.lock(), &samples, self.format, self.delimited)
    }
}

fn print_samples<W: Write>(
    mut out: W,
    samples: &[FieldSet],
    format: OutputFormat,
    delimited: bool,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for (index, fields) in samples.iter().enumerate() {
                if delimited {
                    writeln!(out, "# sample {}", index)?;
                }
                write!(out, "{}", render::to_text(fields))?;
            }
        }
        OutputFormat::Json if delimited => {
            for fields in samples {
                writeln!(out, "{}", render::to_json(fields))?;
            }
        }
        OutputFormat::Json => {
            for fields in samples {
                writeln!(out, "{}", serde_json::to_string_pretty(&render::to_json(fields))?)?;
            }
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            if let Some(first) = samples.first() {
                writer.write_record(render::csv_header(first.schema()))?;
            }
            for fields in samples {
                writer.write_record(render::csv_row(fields))?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inverter(temperature: f32) -> FieldSet {
        let mut fields = FieldSet::new(Device::Inverter.schema());
        fields.put(2, temperature);
        fields
    }

    fn render(samples: &[FieldSet], format: OutputFormat, delimited: bool) -> String {
        let mut out = Vec::new();
        print_samples(&mut out, samples, format, delimited).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn text_output_lists_present_fields() {
        assert_eq!(
            render(&[inverter(85.5)], OutputFormat::Text, false),
            "temperature: 85.5\n"
        );
        assert_eq!(
            render(&[inverter(1.0), inverter(2.0)], OutputFormat::Text, true),
            "# sample 0\ntemperature: 1\n# sample 1\ntemperature: 2\n"
        );
    }

    #[test]
    fn delimited_json_is_one_object_per_line() {
        let output = render(&[inverter(1.0), inverter(2.0)], OutputFormat::Json, true);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["temperature"], 2.0);
        assert_eq!(second["motorTemp"], 0.0);
    }

    #[test]
    fn csv_output_has_header_and_empty_cells() {
        let output = render(&[inverter(3.5)], OutputFormat::Csv, false);
        assert_eq!(
            output,
            "timestamp,temperature,motor_temp,torque,speed\n,3.5,,,\n"
        );
    }
}
