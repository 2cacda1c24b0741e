//! Question ingestion from uploaded files.
//!
//! CSV is the only supported format. Each data row goes through a strict
//! validation pass that yields either an accepted [`Question`] or a row
//! rejection; rejections are collected as data and never abort the file.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{Difficulty, Question};
use crate::store::{RecordKey, RecordStore};

/// Column names of the question CSV, in order.
pub const CSV_COLUMNS: [&str; 9] = [
    "question",
    "option1",
    "option2",
    "option3",
    "option4",
    "correctAnswer",
    "explanation",
    "subject",
    "difficulty",
];

const DEFAULT_EXPLANATION: &str = "No explanation provided";
const DEFAULT_SUBJECT: &str = "General";

/// Outcome of ingesting one file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestResult {
    /// `true` only if no row errored and the format was supported.
    pub success: bool,
    /// Every row that validated on its own.
    pub questions: Vec<Question>,
    /// Rendered [`IngestIssue`]s that count as errors.
    pub errors: Vec<String>,
    /// Rendered [`IngestIssue`]s that are only warnings.
    pub warnings: Vec<String>,
}

/// Something that went wrong while ingesting a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestIssue {
    /// The file extension is neither CSV nor PDF.
    UnsupportedFileFormat,
    /// PDF uploads are recognised but not processed.
    UnimplementedFormat,
    /// The CSV itself could not be read.
    CsvParse(String),
    /// A single row failed validation.
    RowValidation { row: usize, error: RowError },
    /// Summary appended when any row was rejected.
    RowsSkipped(usize),
}

impl IngestIssue {
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            IngestIssue::UnimplementedFormat | IngestIssue::RowsSkipped(_)
        )
    }

    pub fn message(&self) -> String {
        match self {
            IngestIssue::UnsupportedFileFormat => {
                "Unsupported file format. Please upload CSV or PDF files.".to_string()
            }
            IngestIssue::UnimplementedFormat => format!(
                "PDF processing is not fully implemented yet. Please use CSV format with columns: {}",
                CSV_COLUMNS.join(", ")
            ),
            IngestIssue::CsvParse(msg) => format!("CSV parsing error: {msg}"),
            IngestIssue::RowValidation { row, error } => format!("Row {row}: {error}"),
            IngestIssue::RowsSkipped(n) => format!("{n} rows could not be processed"),
        }
    }
}

/// Why a single row was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    MissingRequiredFields,
    InvalidCorrectAnswer,
    Malformed(String),
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowError::MissingRequiredFields => write!(f, "Missing required fields"),
            RowError::InvalidCorrectAnswer => {
                write!(f, "Invalid correct answer (must be 1-4)")
            }
            RowError::Malformed(e) => write!(f, "Error processing row - {e}"),
        }
    }
}

/// Result of validating one CSV row.
#[derive(Debug, Clone)]
pub enum RowOutcome {
    Accepted(Question),
    Rejected(RowError),
}

/// A CSV row as it appears on disk, before validation.
#[derive(Debug, Default, Deserialize, Serialize)]
struct CsvRow {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    option1: Option<String>,
    #[serde(default)]
    option2: Option<String>,
    #[serde(default)]
    option3: Option<String>,
    #[serde(default)]
    option4: Option<String>,
    #[serde(default, rename = "correctAnswer")]
    correct_answer: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
}

/// Supported upload formats, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Pdf,
    Unsupported,
}

impl FileFormat {
    pub fn from_file_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.ends_with(".csv") {
            FileFormat::Csv
        } else if lower.ends_with(".pdf") {
            FileFormat::Pdf
        } else {
            FileFormat::Unsupported
        }
    }
}

/// Ingest an uploaded file by name and contents.
pub fn ingest(file_name: &str, contents: &[u8]) -> IngestResult {
    match FileFormat::from_file_name(file_name) {
        FileFormat::Csv => ingest_csv(contents),
        FileFormat::Pdf => IngestResult::failed(vec![IngestIssue::UnimplementedFormat]),
        FileFormat::Unsupported => IngestResult::failed(vec![IngestIssue::UnsupportedFileFormat]),
    }
}

/// Read a file from disk and ingest it.
pub fn ingest_path(path: &Path) -> Result<IngestResult> {
    let contents =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(ingest(&file_name, &contents))
}

/// Ingest CSV data with the standard question header.
pub fn ingest_csv<R: Read>(reader: R) -> IngestResult {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    if let Err(e) = csv_reader.headers() {
        return IngestResult::failed(vec![IngestIssue::CsvParse(e.to_string())]);
    }

    let mut questions = Vec::new();
    let mut issues = Vec::new();

    for (index, row) in csv_reader.deserialize::<CsvRow>().enumerate() {
        let row_number = index + 1;
        let outcome = match row {
            Ok(row) => validate_row(row),
            Err(e) => RowOutcome::Rejected(RowError::Malformed(e.to_string())),
        };
        match outcome {
            RowOutcome::Accepted(q) => questions.push(q),
            RowOutcome::Rejected(error) => {
                tracing::warn!(row = row_number, %error, "rejected CSV row");
                issues.push(IngestIssue::RowValidation {
                    row: row_number,
                    error,
                });
            }
        }
    }

    let rejected = issues.len();
    if rejected > 0 {
        issues.push(IngestIssue::RowsSkipped(rejected));
    }

    tracing::info!(accepted = questions.len(), rejected, "ingested CSV");
    IngestResult::from_parts(rejected == 0, questions, issues)
}

fn non_empty(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn validate_row(row: CsvRow) -> RowOutcome {
    let (Some(question), Some(o1), Some(o2), Some(o3), Some(o4)) = (
        non_empty(row.question),
        non_empty(row.option1),
        non_empty(row.option2),
        non_empty(row.option3),
        non_empty(row.option4),
    ) else {
        return RowOutcome::Rejected(RowError::MissingRequiredFields);
    };

    let correct_answer = match row
        .correct_answer
        .as_deref()
        .map(str::trim)
        .and_then(|s| s.parse::<usize>().ok())
    {
        Some(n @ 1..=4) => n - 1,
        _ => return RowOutcome::Rejected(RowError::InvalidCorrectAnswer),
    };

    let difficulty = non_empty(row.difficulty)
        .and_then(|d| d.parse::<Difficulty>().ok())
        .unwrap_or_default();

    RowOutcome::Accepted(Question {
        id: Uuid::new_v4().to_string(),
        question,
        options: [o1, o2, o3, o4],
        correct_answer,
        explanation: non_empty(row.explanation).unwrap_or_else(|| DEFAULT_EXPLANATION.to_string()),
        subject: non_empty(row.subject).unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
        difficulty,
    })
}

impl IngestResult {
    fn failed(issues: Vec<IngestIssue>) -> Self {
        Self::from_parts(false, Vec::new(), issues)
    }

    fn from_parts(success: bool, questions: Vec<Question>, issues: Vec<IngestIssue>) -> Self {
        let (warnings, errors): (Vec<_>, Vec<_>) =
            issues.into_iter().partition(IngestIssue::is_warning);
        Self {
            success,
            questions,
            errors: errors.iter().map(IngestIssue::message).collect(),
            warnings: warnings.iter().map(IngestIssue::message).collect(),
        }
    }
}

/// Append questions to a user's pool, keeping what is already there.
///
/// Returns the new pool size.
pub fn append_to_pool<S: RecordStore>(
    store: &mut S,
    user_id: &str,
    questions: &[Question],
) -> Result<usize, StoreError> {
    let key = RecordKey::Questions(user_id.to_string());
    let mut pool: Vec<Question> = store.load_or_default(&key)?;
    pool.extend_from_slice(questions);
    store.save(&key, &pool)?;
    Ok(pool.len())
}

/// Load a user's question pool in stored order.
pub fn load_pool<S: RecordStore>(store: &S, user_id: &str) -> Result<Vec<Question>, StoreError> {
    store.load_or_default(&RecordKey::Questions(user_id.to_string()))
}

/// Write questions in the upload CSV schema (1-based `correctAnswer`).
pub fn export_csv(questions: &[Question]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for q in questions {
        let [o1, o2, o3, o4] = &q.options;
        writer.serialize(CsvRow {
            question: Some(q.question.clone()),
            option1: Some(o1.clone()),
            option2: Some(o2.clone()),
            option3: Some(o3.clone()),
            option4: Some(o4.clone()),
            correct_answer: Some((q.correct_answer + 1).to_string()),
            explanation: Some(q.explanation.clone()),
            subject: Some(q.subject.clone()),
            difficulty: Some(q.difficulty.to_string()),
        })?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush CSV writer: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

/// The downloadable template: two sample questions in the upload schema.
pub fn sample_csv() -> Result<String> {
    let samples = [
        Question {
            id: String::new(),
            question: "What is the capital of India?".into(),
            options: [
                "Mumbai".into(),
                "Delhi".into(),
                "Kolkata".into(),
                "Chennai".into(),
            ],
            correct_answer: 1,
            explanation:
                "Delhi is the capital of India and houses the seat of the Indian government."
                    .into(),
            subject: "Geography".into(),
            difficulty: Difficulty::Easy,
        },
        Question {
            id: String::new(),
            question: "Who was the first President of India?".into(),
            options: [
                "Jawaharlal Nehru".into(),
                "Mahatma Gandhi".into(),
                "Dr. Rajendra Prasad".into(),
                "Sardar Patel".into(),
            ],
            correct_answer: 2,
            explanation:
                "Dr. Rajendra Prasad was the first President of India, serving from 1950 to 1962."
                    .into(),
            subject: "History".into(),
            difficulty: Difficulty::Medium,
        },
    ];
    export_csv(&samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const HEADER: &str =
        "question,option1,option2,option3,option4,correctAnswer,explanation,subject,difficulty\n";

    fn csv(rows: &str) -> Vec<u8> {
        format!("{HEADER}{rows}").into_bytes()
    }

    #[test]
    fn well_formed_row_maps_to_zero_based_answer() {
        let data = csv("2+2?,3,4,5,6,2,basic math,Math,easy\n");
        let result = ingest("questions.csv", &data);

        assert!(result.success);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.questions.len(), 1);
        let q = &result.questions[0];
        assert_eq!(q.question, "2+2?");
        assert_eq!(q.options, ["3", "4", "5", "6"].map(String::from));
        assert_eq!(q.correct_answer, 1);
        assert_eq!(q.difficulty, Difficulty::Easy);
        assert_eq!(q.subject, "Math");
        assert_eq!(q.explanation, "basic math");
    }

    #[test]
    fn missing_option_rejects_only_that_row() {
        let data = csv(
            "Q1,a,b,c,d,1,,,\n\
             Q2,a,,c,d,1,,,\n\
             Q3,a,b,c,d,4,,,\n",
        );
        let result = ingest("q.CSV", &data);

        assert!(!result.success);
        assert_eq!(result.questions.len(), 2);
        assert_eq!(result.errors, vec!["Row 2: Missing required fields"]);
        assert_eq!(result.warnings, vec!["1 rows could not be processed"]);
    }

    #[test]
    fn correct_answer_must_be_one_to_four() {
        let data = csv(
            "Q1,a,b,c,d,0,,,\n\
             Q2,a,b,c,d,5,,,\n\
             Q3,a,b,c,d,two,,,\n\
             Q4,a,b,c,d,,,,\n",
        );
        let result = ingest("q.csv", &data);

        assert!(result.questions.is_empty());
        assert_eq!(result.errors.len(), 4);
        assert!(result
            .errors
            .iter()
            .all(|e| e.ends_with("Invalid correct answer (must be 1-4)")));
        assert_eq!(result.warnings, vec!["4 rows could not be processed"]);
    }

    #[test]
    fn optional_fields_default() {
        let data = csv("Q1,a,b,c,d,3,,,extreme\nQ2,a,b,c,d,1, , ,HARD\n");
        let result = ingest("q.csv", &data);

        assert!(result.success);
        let q = &result.questions[0];
        assert_eq!(q.explanation, DEFAULT_EXPLANATION);
        assert_eq!(q.subject, DEFAULT_SUBJECT);
        assert_eq!(q.difficulty, Difficulty::Medium);
        assert_eq!(result.questions[1].difficulty, Difficulty::Hard);
        assert_eq!(result.questions[1].subject, DEFAULT_SUBJECT);
    }

    #[test]
    fn missing_optional_columns_still_parse() {
        let data = b"question,option1,option2,option3,option4,correctAnswer\nQ,a,b,c,d,1\n";
        let result = ingest("q.csv", data);
        assert!(result.success);
        assert_eq!(result.questions[0].subject, DEFAULT_SUBJECT);
    }

    #[test]
    fn pdf_is_an_unimplemented_boundary() {
        let result = ingest("paper.pdf", b"%PDF-1.4");
        assert!(!result.success);
        assert!(result.questions.is_empty());
        assert!(result.errors.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("not fully implemented"));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let result = ingest("notes.docx", b"whatever");
        assert!(!result.success);
        assert_eq!(
            result.errors,
            vec!["Unsupported file format. Please upload CSV or PDF files."]
        );
    }

    #[test]
    fn sample_csv_ingests_cleanly() {
        let sample = sample_csv().unwrap();
        assert!(sample.starts_with(HEADER.trim_end()));

        let result = ingest("sample_questions.csv", sample.as_bytes());
        assert!(result.success);
        assert_eq!(result.questions.len(), 2);
        assert_eq!(result.questions[0].correct_answer, 1);
        assert_eq!(result.questions[1].correct_answer, 2);
        assert_eq!(result.questions[1].subject, "History");
    }

    #[test]
    fn append_keeps_existing_pool() {
        let mut store = MemoryStore::new();
        let first = ingest("a.csv", &csv("Q1,a,b,c,d,1,,,\n")).questions;
        let second = ingest("b.csv", &csv("Q2,a,b,c,d,2,,,\nQ3,a,b,c,d,3,,,\n")).questions;

        assert_eq!(append_to_pool(&mut store, "u1", &first).unwrap(), 1);
        assert_eq!(append_to_pool(&mut store, "u1", &second).unwrap(), 3);

        let pool = load_pool(&store, "u1").unwrap();
        let texts: Vec<_> = pool.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(texts, vec!["Q1", "Q2", "Q3"]);
        assert!(load_pool(&store, "someone-else").unwrap().is_empty());
    }

    #[test]
    fn ingest_path_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.csv");
        std::fs::write(&path, csv("Q1,a,b,c,d,1,,,\n")).unwrap();

        let result = ingest_path(&path).unwrap();
        assert!(result.success);
        assert!(ingest_path(&dir.path().join("missing.csv")).is_err());
    }
}
