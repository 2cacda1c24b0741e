//! The `mockexam upload` and `mockexam sample-csv` commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mockexam_core::ingest;

use super::Workspace;

pub fn execute(ws: &mut Workspace, file: &Path) -> Result<()> {
    let user = ws.require_user()?;
    let result = ingest::ingest_path(file)?;

    for warning in &result.warnings {
        println!("Warning: {warning}");
    }
    for error in &result.errors {
        println!("  {error}");
    }

    if !result.success {
        anyhow::bail!("upload failed: no questions were added from {}", file.display());
    }

    let pool_size = ingest::append_to_pool(&mut ws.store, &user.id, &result.questions)
        .context("failed to save questions")?;
    println!(
        "Uploaded {} questions from {} ({pool_size} in your question bank)",
        result.questions.len(),
        file.display()
    );
    Ok(())
}

pub fn sample(output: Option<PathBuf>) -> Result<()> {
    let csv = ingest::sample_csv()?;
    match output {
        Some(path) => {
            std::fs::write(&path, csv)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote sample CSV to {}", path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}
