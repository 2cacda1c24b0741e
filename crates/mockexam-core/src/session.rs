//! The timed test-session state machine.
//!
//! A session is `Active` from the moment it starts until it is submitted,
//! either manually or by the countdown reaching zero. `Submitted` is terminal
//! and is entered exactly once: whichever trigger arrives first produces the
//! [`TestResult`], every later trigger is a no-op.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::model::{Difficulty, Question, OPTION_COUNT};
use crate::scoring::{self, TestResult};

/// Subjects drawn from when generating placeholder questions.
pub const PLACEHOLDER_SUBJECTS: [&str; 8] = [
    "History",
    "Geography",
    "Polity",
    "Economy",
    "Science & Tech",
    "Environment",
    "Current Affairs",
    "Ethics",
];

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Active,
    Submitted,
}

/// Direction for single-step navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// How a question appears in the navigator grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStatus {
    Answered,
    Flagged,
    Unanswered,
}

/// One in-progress test attempt.
#[derive(Debug, Clone)]
pub struct TestSession {
    questions: Vec<Question>,
    current: usize,
    answers: BTreeMap<usize, usize>,
    flagged: BTreeSet<usize>,
    time_left: u32,
    started_at: DateTime<Utc>,
    state: SessionState,
}

impl TestSession {
    /// Start a session from a user's question pool.
    ///
    /// Takes the first `max_questions` questions in stored order. An empty
    /// pool gets `placeholder_count` generated questions instead.
    pub fn start(pool: &[Question], config: &SessionConfig) -> Self {
        Self::start_with_rng(pool, config, &mut rand::thread_rng(), Utc::now())
    }

    /// Like [`TestSession::start`] with an explicit RNG and start time.
    pub fn start_with_rng<R: Rng>(
        pool: &[Question],
        config: &SessionConfig,
        rng: &mut R,
        started_at: DateTime<Utc>,
    ) -> Self {
        let questions = if pool.is_empty() {
            placeholder_questions(config.placeholder_count, rng)
        } else {
            pool.iter().take(config.max_questions).cloned().collect()
        };

        tracing::info!(
            questions = questions.len(),
            placeholders = pool.is_empty(),
            time_limit_secs = config.time_limit_secs,
            "test session started"
        );

        Self {
            questions,
            current: 0,
            answers: BTreeMap::new(),
            flagged: BTreeSet::new(),
            time_left: config.time_limit_secs,
            started_at,
            state: SessionState::Active,
        }
    }

    /// Record an answer for the current question, replacing any earlier one.
    ///
    /// Returns `false` if the option is out of range or the session is over.
    pub fn select_answer(&mut self, option: usize) -> bool {
        if !self.is_active() || option >= OPTION_COUNT || self.questions.is_empty() {
            return false;
        }
        self.answers.insert(self.current, option);
        true
    }

    /// Flag or unflag the current question. Returns whether it is now flagged.
    pub fn toggle_flag(&mut self) -> bool {
        if !self.is_active() || self.questions.is_empty() {
            return false;
        }
        if self.flagged.remove(&self.current) {
            false
        } else {
            self.flagged.insert(self.current);
            true
        }
    }

    /// Move one question back or forward, stopping at either end.
    pub fn navigate(&mut self, direction: Direction) {
        match direction {
            Direction::Prev => self.jump_to(self.current.saturating_sub(1)),
            Direction::Next => self.jump_to(self.current.saturating_add(1)),
        }
    }

    /// Jump straight to a question, clamped into range.
    pub fn jump_to(&mut self, index: usize) {
        self.current = index.min(self.questions.len().saturating_sub(1));
    }

    /// Advance the countdown by one second.
    ///
    /// Returns the result when this tick exhausted the time and submitted the
    /// session.
    pub fn tick(&mut self) -> Option<TestResult> {
        if !self.is_active() {
            return None;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            tracing::info!("time is up, submitting test");
            return self.submit();
        }
        None
    }

    /// Submit the session now.
    pub fn submit(&mut self) -> Option<TestResult> {
        self.submit_at(Utc::now())
    }

    /// Submit the session with an explicit submission time.
    ///
    /// Returns `None` if the session was already submitted.
    pub fn submit_at(&mut self, submitted_at: DateTime<Utc>) -> Option<TestResult> {
        if !self.is_active() {
            return None;
        }
        self.state = SessionState::Submitted;
        let result = scoring::build_result(self, submitted_at);
        tracing::info!(
            result_id = %result.id,
            score = result.score,
            correct = result.correct_answers,
            total = result.total_questions,
            "test submitted"
        );
        Some(result)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    /// Answers keyed by question index.
    pub fn answers(&self) -> &BTreeMap<usize, usize> {
        &self.answers
    }

    pub fn answer_for(&self, index: usize) -> Option<usize> {
        self.answers.get(&index).copied()
    }

    pub fn is_flagged(&self, index: usize) -> bool {
        self.flagged.contains(&index)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged.len()
    }

    /// Questions still without an answer. Flags do not count as answers.
    pub fn remaining(&self) -> usize {
        self.questions.len() - self.answers.len()
    }

    /// Seconds left on the countdown.
    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Grid status of a question. An answer outranks a flag.
    pub fn status(&self, index: usize) -> QuestionStatus {
        if self.answers.contains_key(&index) {
            QuestionStatus::Answered
        } else if self.flagged.contains(&index) {
            QuestionStatus::Flagged
        } else {
            QuestionStatus::Unanswered
        }
    }
}

/// Generate stand-in questions so a test can run without an uploaded pool.
pub fn placeholder_questions<R: Rng>(count: usize, rng: &mut R) -> Vec<Question> {
    (1..=count)
        .map(|n| {
            let subject = PLACEHOLDER_SUBJECTS[rng.gen_range(0..PLACEHOLDER_SUBJECTS.len())];
            let difficulty = Difficulty::ALL[rng.gen_range(0..Difficulty::ALL.len())];
            Question {
                id: format!("q_{n}"),
                question: format!(
                    "Sample {subject} question {n}. This is a {difficulty} level question about {subject}. Which of the following is correct?"
                ),
                options: [
                    "Option A - This is the first option".to_string(),
                    "Option B - This is the second option".to_string(),
                    "Option C - This is the third option".to_string(),
                    "Option D - This is the fourth option".to_string(),
                ],
                correct_answer: rng.gen_range(0..OPTION_COUNT),
                explanation: format!(
                    "This is the explanation for the {subject} question. The correct answer is explained here with proper reasoning."
                ),
                subject: subject.to_string(),
                difficulty,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn question(id: &str, correct: usize) -> Question {
        Question {
            id: id.into(),
            question: format!("question {id}"),
            options: ["a", "b", "c", "d"].map(String::from),
            correct_answer: correct,
            explanation: String::new(),
            subject: "General".into(),
            difficulty: Difficulty::Medium,
        }
    }

    fn pool(n: usize) -> Vec<Question> {
        (0..n).map(|i| question(&i.to_string(), i % 4)).collect()
    }

    fn start(pool: &[Question]) -> TestSession {
        let mut rng = StdRng::seed_from_u64(7);
        TestSession::start_with_rng(pool, &SessionConfig::default(), &mut rng, Utc::now())
    }

    #[test]
    fn start_initial_state() {
        let session = start(&pool(3));
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.len(), 3);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.answered_count(), 0);
        assert_eq!(session.flagged_count(), 0);
        assert_eq!(session.time_left(), 7200);
    }

    #[test]
    fn start_caps_pool_in_stored_order() {
        let session = start(&pool(150));
        assert_eq!(session.len(), 100);
        assert_eq!(session.questions()[0].id, "0");
        assert_eq!(session.questions()[99].id, "99");
    }

    #[test]
    fn empty_pool_gets_placeholders() {
        let session = start(&[]);
        assert_eq!(session.len(), 50);
        for q in session.questions() {
            assert!(q.correct_answer < OPTION_COUNT);
            assert!(PLACEHOLDER_SUBJECTS.contains(&q.subject.as_str()));
        }
        assert_eq!(session.questions()[0].id, "q_1");
    }

    #[test]
    fn placeholders_are_deterministic_per_seed() {
        let a = placeholder_questions(10, &mut StdRng::seed_from_u64(1));
        let b = placeholder_questions(10, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    fn select_answer_overwrites_and_bounds() {
        let mut session = start(&pool(2));
        assert!(session.select_answer(2));
        assert!(session.select_answer(3));
        assert_eq!(session.answer_for(0), Some(3));
        assert!(!session.select_answer(4));
        assert_eq!(session.answer_for(0), Some(3));
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn toggle_flag_round_trip() {
        let mut session = start(&pool(2));
        assert!(session.toggle_flag());
        assert!(session.is_flagged(0));
        assert_eq!(session.status(0), QuestionStatus::Flagged);
        assert!(!session.toggle_flag());
        assert!(!session.is_flagged(0));
        assert_eq!(session.status(0), QuestionStatus::Unanswered);
    }

    #[test]
    fn answered_outranks_flagged() {
        let mut session = start(&pool(2));
        session.toggle_flag();
        session.select_answer(1);
        assert_eq!(session.status(0), QuestionStatus::Answered);
    }

    #[test]
    fn remaining_counts_unanswered_questions() {
        let mut session = start(&pool(3));
        assert_eq!(session.remaining(), 3);

        session.toggle_flag();
        assert_eq!(session.remaining(), 3);

        session.select_answer(0);
        session.select_answer(2);
        assert_eq!(session.remaining(), 2);

        session.jump_to(2);
        session.select_answer(1);
        assert_eq!(session.remaining(), 1);

        session.submit();
        session.jump_to(1);
        session.select_answer(1);
        assert_eq!(session.remaining(), 1);
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let mut session = start(&pool(3));
        session.navigate(Direction::Prev);
        assert_eq!(session.current_index(), 0);

        session.navigate(Direction::Next);
        session.navigate(Direction::Next);
        assert_eq!(session.current_index(), 2);
        session.navigate(Direction::Next);
        assert_eq!(session.current_index(), 2);

        session.jump_to(1);
        assert_eq!(session.current_index(), 1);
        session.jump_to(99);
        assert_eq!(session.current_index(), 2);
    }

    #[test]
    fn answers_follow_current_question() {
        let mut session = start(&pool(3));
        session.select_answer(0);
        session.navigate(Direction::Next);
        session.select_answer(1);
        assert_eq!(session.answer_for(0), Some(0));
        assert_eq!(session.answer_for(1), Some(1));
        assert_eq!(session.answer_for(2), None);
    }

    #[test]
    fn submit_is_exactly_once() {
        let mut session = start(&pool(2));
        assert!(session.submit().is_some());
        assert_eq!(session.state(), SessionState::Submitted);
        assert!(session.submit().is_none());
        assert!(session.tick().is_none());
    }

    #[test]
    fn submitted_session_ignores_mutation() {
        let mut session = start(&pool(2));
        session.submit();
        assert!(!session.select_answer(1));
        assert!(!session.toggle_flag());
        assert_eq!(session.answered_count(), 0);
    }

    #[test]
    fn tick_counts_down_and_auto_submits() {
        let config = SessionConfig {
            time_limit_secs: 3,
            ..SessionConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let mut session = TestSession::start_with_rng(&pool(1), &config, &mut rng, Utc::now());
        session.select_answer(0);

        assert!(session.tick().is_none());
        assert!(session.tick().is_none());
        assert_eq!(session.time_left(), 1);

        let result = session.tick().expect("third tick should submit");
        assert_eq!(result.score, 100);
        assert_eq!(session.time_left(), 0);
        assert!(!session.is_active());

        assert!(session.tick().is_none());
        assert!(session.submit().is_none());
    }
}
