// System status display — artifact files, model metadata, posting table.

use anyhow::Result;
use std::path::Path;

use crate::artifact::TrainedArtifact;
use crate::config::Config;
use crate::postings::table;

/// Display system status to the terminal.
pub fn show(config: &Config) -> Result<()> {
    let paths = config.artifact_paths();
    println!("Artifact prefix: {}", config.artifact_prefix);
    println!("  {}", describe_file(&paths.vectorizer));
    println!("  {}", describe_file(&paths.model));

    if paths.all_present() {
        match TrainedArtifact::load(&config.artifact_prefix) {
            Ok(artifact) => {
                println!(
                    "Model: {} clusters (seed {}), {} skills, trained on {} postings ({})",
                    artifact.model.k(),
                    artifact.model.seed(),
                    artifact.vectorizer.dim(),
                    artifact.meta.training_postings,
                    artifact.meta.trained_at.format("%Y-%m-%d %H:%M:%S UTC"),
                );
            }
            Err(e) => println!("Model: unreadable ({e})"),
        }
    } else {
        println!("Model: not trained yet");
        println!("  Run `skillmatch train` to build it");
    }

    let table_path = config.table_path();
    if table_path.exists() {
        let rows = table::load(&table_path)?;
        let labeled = rows.iter().filter(|r| r.cluster.is_some()).count();
        println!(
            "Posting table: {} ({} rows, {} labeled)",
            table_path.display(),
            rows.len(),
            labeled
        );
    } else {
        println!("Posting table: {} (missing)", table_path.display());
    }

    Ok(())
}

fn describe_file(path: &Path) -> String {
    match std::fs::metadata(path) {
        Ok(meta) => format!("{} ({})", path.display(), format_bytes(meta.len())),
        Err(_) => format!("{} (missing)", path.display()),
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
