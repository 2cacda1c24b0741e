//! The `mockexam init` command.

use anyhow::Result;
use mockexam_core::config::{CONFIG_FILE, SAMPLE_CONFIG};
use mockexam_core::ingest;

const SAMPLE_QUESTIONS: &str = "sample_questions.csv";

pub fn execute() -> Result<()> {
    if std::path::Path::new(CONFIG_FILE).exists() {
        println!("{CONFIG_FILE} already exists, skipping.");
    } else {
        std::fs::write(CONFIG_FILE, SAMPLE_CONFIG)?;
        println!("Created {CONFIG_FILE}");
    }

    if std::path::Path::new(SAMPLE_QUESTIONS).exists() {
        println!("{SAMPLE_QUESTIONS} already exists, skipping.");
    } else {
        std::fs::write(SAMPLE_QUESTIONS, ingest::sample_csv()?)?;
        println!("Created {SAMPLE_QUESTIONS}");
    }

    println!("\nNext steps:");
    println!("  1. Run: mockexam signup --name <name> --email <email> --password <password>");
    println!("  2. Run: mockexam upload {SAMPLE_QUESTIONS}");
    println!("  3. Run: mockexam take");

    Ok(())
}
