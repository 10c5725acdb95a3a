//! Model artifact inspection command

use anyhow::Result;
use colored::Colorize;

use super::Backend;
use crate::client::ModelInfo;
use crate::output::OutputFormat;

/// Show which model the predictions come from
pub async fn show_model(backend: &Backend, format: OutputFormat) -> Result<()> {
    let info = match backend {
        Backend::Local { session, .. } => {
            let artifact = session.artifact();
            ModelInfo {
                kind: artifact.kind().to_string(),
                label: artifact.label().map(str::to_string),
                fingerprint: artifact.fingerprint().to_string(),
                path: artifact.path().display().to_string(),
            }
        }
        Backend::Remote(client) => client.model_info().await?,
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
        OutputFormat::Table => {
            println!("{}", "Model Artifact".bold());
            println!("{}", "=".repeat(50));
            println!("Path:        {}", info.path.cyan());
            println!("Kind:        {}", info.kind);
            if let Some(label) = &info.label {
                println!("Entry:       {}", label);
            }
            println!("SHA-256:     {}", info.fingerprint.dimmed());
        }
    }

    Ok(())
}
