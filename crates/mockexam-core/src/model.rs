//! Core data model types for mockexam.
//!
//! These are the records the rest of the crate reads from and writes to the
//! record store: users, questions, and question difficulty.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every question has exactly this many answer options.
pub const OPTION_COUNT: usize = 4;

/// A registered user, as kept in the user list.
///
/// The password is stored in plaintext. This mirrors a local demo tool and
/// must not be reused anywhere credentials matter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login email, unique among users.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

impl User {
    /// The identity published to the rest of the app, without the password.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// The active session identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier.
    pub id: String,
    /// The question text.
    pub question: String,
    /// The four answer options, in display order.
    pub options: [String; OPTION_COUNT],
    /// 0-based index into `options`.
    pub correct_answer: usize,
    /// Why the correct answer is correct.
    pub explanation: String,
    /// Subject bucket used for per-subject analysis.
    pub subject: String,
    /// Difficulty level.
    pub difficulty: Difficulty,
}

impl Question {
    /// Returns `true` if `option` is the correct answer.
    pub fn is_correct(&self, option: usize) -> bool {
        self.correct_answer == option
    }
}

/// Question difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}
