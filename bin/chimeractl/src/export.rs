//! ---
//! chimera_section: "04-tooling"
//! chimera_subsection: "binary"
//! chimera_type: "source"
//! chimera_scope: "code"
//! chimera_description: "Command line tool for Chimera telemetry samples."
//! chimera_version: "v0.1.0"
//! chimera_owner: "telemetry"
//! ---
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chimera_common::{AppConfig, ExportConfig};
use chimera_devices::Device;
use chimera_wire::{render, SampleReader};
use clap::Args;
use tempfile::NamedTempFile;
use tracing::info;

use crate::DeviceArg;

#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Record shape stored in the log.
    #[arg(long, value_enum)]
    device: DeviceArg,

    /// Length-delimited sample log to convert.
    #[arg(long = "input", short = 'i', value_name = "LOG")]
    input: PathBuf,

    /// Destination CSV file (defaults to `<export.directory>/<log stem>.csv`).
    #[arg(long = "output", short = 'o', value_name = "CSV")]
    output: Option<PathBuf>,
}

impl ExportCommand {
    pub fn execute(self, config: &AppConfig) -> Result<()> {
        let device = Device::from(self.device);
        let output = match self.output {
            Some(path) => path,
            None => default_output(&config.export, &self.input),
        };
        let rows = write_csv(&self.input, &output, device, config)?;

        info!(
            device = %device,
            input = %self.input.display(),
            output = %output.display(),
            rows,
            "sample log exported"
        );
        println!("{}", output.display());
        Ok(())
    }
}

/// Export into a temporary file next to `output`; it replaces `output` only
/// once the whole log has been converted.
fn write_csv(input: &Path, output: &Path, device: Device, config: &AppConfig) -> Result<usize> {
    let directory = match output.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)
                .with_context(|| format!("unable to create {}", parent.display()))?;
            parent
        }
        None => Path::new("."),
    };

    let file =
        File::open(input).with_context(|| format!("unable to open {}", input.display()))?;
    let staging = NamedTempFile::new_in(directory)
        .with_context(|| format!("unable to stage export in {}", directory.display()))?;
    let rows = {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(config.export.delimiter_byte())
            .from_writer(staging.as_file());
        export_log(BufReader::new(file), device, config, &mut writer)
            .with_context(|| format!("failed to export {}", input.display()))?
    };
    staging
        .persist(output)
        .map_err(|err| err.error)
        .with_context(|| format!("unable to write {}", output.display()))?;
    Ok(rows)
}

fn default_output(export: &ExportConfig, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "samples".to_owned());
    export.directory.join(format!("{}.csv", stem))
}

fn export_log<R: std::io::Read, W: std::io::Write>(
    input: R,
    device: Device,
    config: &AppConfig,
    writer: &mut csv::Writer<W>,
) -> Result<usize> {
    let schema = device.schema();
    if config.export.write_header {
        writer.write_record(render::csv_header(schema))?;
    }
    let mut reader = SampleReader::with_max_frame_len(input, config.stream.max_frame_len);
    let mut rows = 0;
    while let Some(fields) = reader.read_fields(schema)? {
        writer.write_record(render::csv_row(&fields))?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chimera_devices::InverterSample;
    use chimera_wire::SampleWriter;

    fn log() -> Vec<u8> {
        let mut writer = SampleWriter::new(Vec::new());
        let mut sample = InverterSample::new();
        sample.set_timestamp(1.0).set_speed(1200.0);
        writer.write(&sample).unwrap();
        sample.clear_speed().set_torque(-3.5);
        writer.write(&sample).unwrap();
        writer.into_inner()
    }

    fn export(config: &AppConfig) -> (usize, String) {
        let mut out = Vec::new();
        let mut writer = csv::WriterBuilder::new()
            .delimiter(config.export.delimiter_byte())
            .from_writer(&mut out);
        let rows = export_log(&log()[..], Device::Inverter, config, &mut writer).unwrap();
        drop(writer);
        (rows, String::from_utf8(out).unwrap())
    }

    #[test]
    fn default_output_lands_in_export_directory() {
        let export = ExportConfig::default();
        assert_eq!(
            default_output(&export, Path::new("logs/run-7.bin")),
            PathBuf::from("target/parsed/run-7.csv")
        );
    }

    #[test]
    fn rows_follow_the_log() {
        let (rows, csv) = export(&AppConfig::default());
        assert_eq!(rows, 2);
        assert_eq!(
            csv,
            "timestamp,temperature,motor_temp,torque,speed\n1,,,,1200\n1,,,-3.5,\n"
        );
    }

    #[test]
    fn delimiter_and_header_follow_config() {
        let mut config = AppConfig::default();
        config.export.delimiter = ';';
        config.export.write_header = false;
        let (_, csv) = export(&config);
        assert_eq!(csv, "1;;;;1200\n1;;;-3.5;\n");
    }

    #[test]
    fn failed_export_keeps_the_previous_csv() {
        let dir = tempfile::tempdir().expect("temp dir");
        let good = dir.path().join("good.bin");
        let cut = dir.path().join("cut.bin");
        let output = dir.path().join("csv").join("inverter.csv");
        fs::write(&good, log()).unwrap();
        let mut bytes = log();
        bytes.pop();
        fs::write(&cut, bytes).unwrap();
        let config = AppConfig::default();

        assert_eq!(write_csv(&good, &output, Device::Inverter, &config).unwrap(), 2);
        let exported = fs::read_to_string(&output).unwrap();

        assert!(write_csv(&cut, &output, Device::Inverter, &config).is_err());
        assert_eq!(fs::read_to_string(&output).unwrap(), exported);
        let leftovers = fs::read_dir(output.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn truncated_log_is_an_error() {
        let mut bytes = log();
        bytes.pop();
        let mut writer = csv::Writer::from_writer(Vec::new());
        let err = export_log(&bytes[..], Device::Inverter, &AppConfig::default(), &mut writer)
            .unwrap_err();
        assert!(err.to_string().contains("truncated"), "{err}");
    }
}
