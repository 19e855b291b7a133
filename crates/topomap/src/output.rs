//! Output formatting: table, JSON, YAML.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Green for good news, red otherwise.
pub fn verdict(text: &str, ok: bool, color: bool) -> String {
    match (color, ok) {
        (false, _) => text.to_owned(),
        (true, true) => text.green().bold().to_string(),
        (true, false) => text.red().bold().to_string(),
    }
}

pub fn dim(text: &str, color: bool) -> String {
    if color {
        text.dimmed().to_string()
    } else {
        text.to_owned()
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a report in the chosen format.
///
/// `table_fn` builds the human view; structured formats serialize `data`.
pub fn render<T>(
    format: OutputFormat,
    data: &T,
    table_fn: impl FnOnce(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => Ok(table_fn(data)),
        OutputFormat::Json => serde_json::to_string_pretty(data).map_err(serialize_err),
        OutputFormat::JsonCompact => serde_json::to_string(data).map_err(serialize_err),
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(serialize_err),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", output.trim_end());
}

pub fn table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// `-` for absent values.
pub fn or_dash<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

fn serialize_err(e: impl std::fmt::Display) -> CliError {
    CliError::Serialize(e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(serde::Serialize)]
    struct Sample {
        id: u32,
    }

    #[test]
    fn structured_formats_serialize_data() {
        let s = Sample { id: 7 };
        let json = render(OutputFormat::JsonCompact, &s, |_| String::new()).unwrap();
        assert_eq!(json, r#"{"id":7}"#);
        let yaml = render(OutputFormat::Yaml, &s, |_| String::new()).unwrap();
        assert_eq!(yaml.trim(), "id: 7");
        let table = render(OutputFormat::Table, &s, |d| format!("#{}", d.id)).unwrap();
        assert_eq!(table, "#7");
    }

    #[test]
    fn no_color_leaves_text_alone() {
        assert_eq!(verdict("deployable", true, false), "deployable");
        assert_ne!(verdict("blocked", false, true), "blocked");
        assert_eq!(or_dash::<u8>(None), "-");
    }
}
