use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One command result: a serializable body plus a field/value view of it.
pub struct Report<'a, T: Serialize> {
    pub title: &'a str,
    pub body: &'a T,
    pub rows: Vec<(&'static str, String)>,
    /// Single value printed by `--format raw`.
    pub raw: String,
}

pub fn print_report<T: Serialize>(report: &Report<'_, T>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(report.body).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (field, value) in &report.rows {
                table.add_row(vec![field.to_string(), value.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{}:", report.title);
            let width = report
                .rows
                .iter()
                .map(|(field, _)| field.len())
                .max()
                .unwrap_or(0);
            for (field, value) in &report.rows {
                println!("  {:<width$}  {}", format!("{field}:"), value, width = width + 1);
            }
        }
        OutputFormat::Raw => {
            println!("{}", report.raw);
        }
    }
}

/// Format a physical value with a fixed number of decimals.
pub fn fixed(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}
