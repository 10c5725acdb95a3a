//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use predictor_lib::PredictionResult;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a table from a list of items
pub fn print_table<T: Tabled + Serialize>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("{}", "No items found".yellow());
                return;
            }
            let table = Table::new(items).with(Style::rounded()).to_string();
            println!("{}", table);
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(&items) {
                println!("{}", json);
            }
        }
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Row for the cost breakdown table
#[derive(Tabled, Serialize)]
struct AmountRow {
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

/// Render a prediction the way the web form showed it
pub fn print_prediction(result: &PredictionResult, currency: &str) {
    match result {
        PredictionResult::Total { .. } => {
            for (label, value) in result.display_lines(currency) {
                print_success(&format!("{}: {}", label, value.bold()));
            }
        }
        PredictionResult::Breakdown { .. } => {
            let rows: Vec<AmountRow> = result
                .display_lines(currency)
                .into_iter()
                .map(|(label, value)| AmountRow {
                    item: label.to_string(),
                    amount: value,
                })
                .collect();
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{}", table);
            println!(
                "{} {}",
                "Estimated total cost:".bold(),
                predictor_lib::format_currency(result.total(), currency)
                    .green()
                    .bold()
            );
        }
    }
}
