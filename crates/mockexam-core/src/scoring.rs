//! Scoring, result snapshots, and running user statistics.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Question;
use crate::session::TestSession;

/// Subject label stored on results built from a mixed question set.
pub const MIXED_SUBJECT: &str = "Mixed";

/// The immutable record of a submitted test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Unique per submission.
    pub id: String,
    /// Display name, e.g. "Mock Test 2026-10-16".
    pub name: String,
    /// Subject label for the whole test.
    pub subject: String,
    /// Percentage score, 0-100.
    pub score: u32,
    pub total_questions: usize,
    pub correct_answers: usize,
    /// Wall-clock seconds between start and submission.
    pub time_taken_secs: u64,
    /// Submission time.
    pub date: DateTime<Utc>,
    /// Every question with the answer the user gave.
    pub questions: Vec<AnsweredQuestion>,
}

/// A question snapshot annotated with the user's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    #[serde(flatten)]
    pub question: Question,
    /// `None` when the question was left unanswered.
    #[serde(default)]
    pub user_answer: Option<usize>,
}

impl AnsweredQuestion {
    pub fn is_correct(&self) -> bool {
        self.user_answer == Some(self.question.correct_answer)
    }
}

/// Count questions whose recorded answer matches the correct option.
///
/// `answers` maps question index to chosen option; its iteration order does
/// not matter. Indices past the end of `questions` are ignored.
pub fn correct_count<'a, I>(questions: &[Question], answers: I) -> usize
where
    I: IntoIterator<Item = (&'a usize, &'a usize)>,
{
    answers
        .into_iter()
        .filter(|(index, option)| questions.get(**index).is_some_and(|q| q.is_correct(**option)))
        .count()
}

/// Rounded percentage of `correct` out of `total`; 0 when `total` is 0.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}

/// Percentage score of an answer set. Unanswered questions count as wrong.
pub fn score<'a, I>(questions: &[Question], answers: I) -> u32
where
    I: IntoIterator<Item = (&'a usize, &'a usize)>,
{
    percentage(correct_count(questions, answers), questions.len())
}

/// Build the result record for a session submitted at `submitted_at`.
pub fn build_result(session: &TestSession, submitted_at: DateTime<Utc>) -> TestResult {
    let questions = session.questions();
    let correct_answers = correct_count(questions, session.answers());

    let snapshot = questions
        .iter()
        .enumerate()
        .map(|(index, q)| AnsweredQuestion {
            question: q.clone(),
            user_answer: session.answer_for(index),
        })
        .collect();

    let time_taken_secs = (submitted_at - session.started_at()).num_seconds().max(0) as u64;

    TestResult {
        id: Uuid::new_v4().to_string(),
        name: format!("Mock Test {}", submitted_at.format("%Y-%m-%d")),
        subject: MIXED_SUBJECT.to_string(),
        score: percentage(correct_answers, questions.len()),
        total_questions: questions.len(),
        correct_answers,
        time_taken_secs,
        date: submitted_at,
        questions: snapshot,
    }
}

/// Running aggregate over every result a user has submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_tests: u32,
    /// Running mean of all scores.
    pub average_score: f64,
    pub total_questions: u64,
    pub time_spent_secs: u64,
}

/// Fold one more result into the previous stats snapshot.
pub fn update_stats(previous: &Stats, result: &TestResult) -> Stats {
    let count = f64::from(previous.total_tests);
    Stats {
        total_tests: previous.total_tests + 1,
        average_score: (previous.average_score * count + f64::from(result.score)) / (count + 1.0),
        total_questions: previous.total_questions + result.total_questions as u64,
        time_spent_secs: previous.time_spent_secs + result.time_taken_secs,
    }
}

/// Per-subject tally within one result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectScore {
    pub subject: String,
    pub correct: usize,
    pub total: usize,
    pub percentage: u32,
}

/// Group a result's questions by subject, in order of first appearance.
pub fn subject_breakdown(result: &TestResult) -> Vec<SubjectScore> {
    let mut order: Vec<&str> = Vec::new();
    let mut tally: HashMap<&str, (usize, usize)> = HashMap::new();

    for answered in &result.questions {
        let subject = answered.question.subject.as_str();
        let entry = tally.entry(subject).or_insert_with(|| {
            order.push(subject);
            (0, 0)
        });
        entry.1 += 1;
        if answered.is_correct() {
            entry.0 += 1;
        }
    }

    order
        .into_iter()
        .map(|subject| {
            let (correct, total) = tally[subject];
            SubjectScore {
                subject: subject.to_string(),
                correct,
                total,
                percentage: percentage(correct, total),
            }
        })
        .collect()
}

/// Letter grade shown next to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    APlus,
    A,
    BPlus,
    B,
    CPlus,
    C,
    D,
}

impl Grade {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => Grade::APlus,
            80..=89 => Grade::A,
            70..=79 => Grade::BPlus,
            60..=69 => Grade::B,
            50..=59 => Grade::CPlus,
            40..=49 => Grade::C,
            _ => Grade::D,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::D => "D",
        };
        f.write_str(s)
    }
}

/// Format seconds as `HH:MM:SS`.
pub fn format_duration(secs: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}
