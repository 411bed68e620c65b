#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::io::{Read, Write};

use anyhow::Context;
use passkey_inspect::{settings::InspectSettings, CeremonyInspector, CeremonyReport, VERSION};
use serde::Serialize;

fn main() -> anyhow::Result<()> {
    // Load configuration from Settings.toml and environment variables
    // This also initializes the logger
    let settings = InspectSettings::load()
        .map_err(|e| anyhow::anyhow!("Failed to load settings: {e}"))?;
    log::debug!("passkey-inspect {VERSION}");

    let input = read_input(std::env::args().nth(1).as_deref())?;

    let inspector = CeremonyInspector::from_settings(&settings.output);
    let report = inspector
        .inspect_json(&input)
        .context("Failed to inspect credential")?;

    let rendered = render(&report, settings.output.json_indent)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&rendered)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

/// Read the credential document from a file path, or stdin for `-` or no argument
fn read_input(path: Option<&str>) -> anyhow::Result<String> {
    match path {
        Some("-") | None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))
        }
    }
}

fn render(report: &CeremonyReport, indent: usize) -> anyhow::Result<Vec<u8>> {
    if indent == 0 {
        return Ok(serde_json::to_vec(report)?);
    }
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    report.serialize(&mut serializer)?;
    Ok(out)
}
