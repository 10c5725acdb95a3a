//! Destination list and dataset preview commands

use anyhow::{Context, Result};
use colored::Colorize;
use predictor_lib::DatasetPreview;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style, Tabled};

use super::Backend;
use crate::output::{print_table, print_warning, OutputFormat};

/// Row for destinations table
#[derive(Tabled, Serialize)]
struct DestinationRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Destination")]
    destination: String,
}

/// List the selectable destinations
pub async fn list_destinations(backend: &Backend, format: OutputFormat) -> Result<()> {
    let destinations = match backend {
        Backend::Local { session, .. } => session.catalog().as_slice().to_vec(),
        Backend::Remote(client) => client.destinations().await?,
    };

    let rows: Vec<DestinationRow> = destinations
        .into_iter()
        .enumerate()
        .map(|(i, destination)| DestinationRow {
            index: i + 1,
            destination,
        })
        .collect();

    print_table(&rows, format);
    Ok(())
}

/// Show the first rows of the dataset
pub async fn preview_dataset(backend: &Backend, rows: usize, format: OutputFormat) -> Result<()> {
    let preview = match backend {
        Backend::Local { session, .. } => session
            .dataset()
            .context("No dataset configured (use --dataset or TCP_DATASET)")?
            .preview(rows),
        Backend::Remote(client) => client.dataset_preview(rows).await?,
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&preview)?),
        OutputFormat::Table => print_preview(&preview),
    }

    Ok(())
}

fn print_preview(preview: &DatasetPreview) {
    println!("{}", "Dataset Preview".bold());

    if preview.rows.is_empty() {
        print_warning("Dataset has no rows");
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(preview.headers.iter().cloned());
    for row in &preview.rows {
        builder.push_record(row.iter().cloned());
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{}", table);
    println!(
        "\nShowing {} of {} rows",
        preview.rows.len(),
        preview.total_rows
    );
}
