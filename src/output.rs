use clap::ValueEnum;
use colored::Colorize;

use crate::error::MigrateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Pretty,
}

pub fn render_error(e: &MigrateError, format: Format) -> String {
    match format {
        Format::Json => serde_json::json!({
            "error": e.code(),
            "message": e.to_string()
        })
        .to_string(),
        Format::Pretty => format!("{} {e}", "error:".red().bold()),
    }
}
