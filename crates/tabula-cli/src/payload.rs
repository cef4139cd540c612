// Rust guideline compliant 2026-02-09

//! Reading operation payloads from arguments, files or stdin.

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Read;

/// Reads a JSON payload.
///
/// `None` yields `null`, `-` reads stdin, `@path` reads a file, anything
/// else is parsed as inline JSON.
///
/// # Errors
///
/// Returns an error if the source cannot be read or is not valid JSON.
pub fn read_payload(source: Option<&str>) -> Result<Value> {
    let text = match source {
        None => return Ok(Value::Null),
        Some("-") => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read payload from stdin")?;
            buffer
        }
        Some(source) => match source.strip_prefix('@') {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read payload file {path}"))?,
            None => source.to_string(),
        },
    };

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).context("Payload is not valid JSON")
}
