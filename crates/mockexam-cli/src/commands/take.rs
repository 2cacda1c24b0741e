//! The `mockexam take` command.
//!
//! Reads one command per line from stdin while a background countdown runs.
//! Whichever of `s` or the countdown reaching zero comes first submits the
//! test; the other finds the session already submitted.

use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use mockexam_core::history;
use mockexam_core::ingest;
use mockexam_core::scoring::{format_duration, subject_breakdown, Grade, TestResult};
use mockexam_core::session::{Direction, QuestionStatus, TestSession};
use mockexam_core::timer::{self, Countdown, SharedSession};
use tokio::sync::mpsc;

use super::Workspace;

/// One line of user input during a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TakeCommand {
    /// Zero-based option index.
    Answer(usize),
    Next,
    Prev,
    /// Zero-based question index.
    Jump(usize),
    Flag,
    Show,
    Grid,
    Help,
    Submit,
    Quit,
    Unknown(String),
}

pub fn parse_command(line: &str) -> TakeCommand {
    let line = line.trim();
    let mut parts = line.split_whitespace();
    let head = parts.next().unwrap_or("").to_ascii_lowercase();
    let arg = parts.next();

    match (head.as_str(), arg) {
        ("1" | "2" | "3" | "4", None) => {
            TakeCommand::Answer(head.parse::<usize>().map(|n| n - 1).unwrap_or(0))
        }
        ("n" | "next", None) => TakeCommand::Next,
        ("p" | "prev", None) => TakeCommand::Prev,
        ("g" | "goto", Some(n)) => match n.parse::<usize>() {
            Ok(n) if n >= 1 => TakeCommand::Jump(n - 1),
            _ => TakeCommand::Unknown(line.to_string()),
        },
        ("f" | "flag", None) => TakeCommand::Flag,
        ("" | "show", None) => TakeCommand::Show,
        ("grid", None) => TakeCommand::Grid,
        ("h" | "help" | "?", None) => TakeCommand::Help,
        ("s" | "submit", None) => TakeCommand::Submit,
        ("q" | "quit", None) => TakeCommand::Quit,
        _ => TakeCommand::Unknown(line.to_string()),
    }
}

pub async fn execute(ws: &mut Workspace) -> Result<()> {
    let user = ws.require_user()?;
    let pool = ingest::load_pool(&ws.store, &user.id).context("failed to load question bank")?;
    if pool.is_empty() {
        println!(
            "Your question bank is empty; using {} placeholder questions.",
            ws.config.session.placeholder_count
        );
    }

    let session = timer::share(TestSession::start(&pool, &ws.config.session));
    let (count, time_left) = {
        let guard = lock(&session)?;
        (guard.len(), guard.time_left())
    };
    anyhow::ensure!(count > 0, "no questions available for this test");
    println!(
        "Starting test: {count} questions, {} on the clock.",
        format_duration(u64::from(time_left))
    );
    print_help();
    print_current(&session)?;

    let mut countdown = Countdown::spawn(Arc::clone(&session), Duration::from_secs(1));
    let mut lines = spawn_line_reader();

    let result = loop {
        tokio::select! {
            expired = countdown.expired() => {
                if expired.is_some() {
                    println!("\nTime is up! Your test was submitted automatically.");
                }
                break expired;
            }
            line = lines.recv() => {
                let Some(line) = line.transpose().context("failed to read input")? else {
                    println!("Input closed; test abandoned.");
                    break None;
                };
                match parse_command(&line) {
                    TakeCommand::Submit => {
                        let submitted = lock(&session)?.submit();
                        match submitted {
                            Some(result) => break Some(result),
                            // Timer won the race.
                            None => break countdown.expired().await,
                        }
                    }
                    TakeCommand::Quit => {
                        println!("Test abandoned; nothing was recorded.");
                        break None;
                    }
                    command => apply(&session, command)?,
                }
            }
        }
    };
    countdown.cancel();

    if let Some(result) = result {
        let stats = history::record_submission(&mut ws.store, &user.id, &result)
            .context("failed to save result")?;
        print_result(&result);
        println!(
            "\nTests taken: {}   Average score: {:.1}%",
            stats.total_tests, stats.average_score
        );
    }
    Ok(())
}

/// Read stdin lines on a plain thread.
///
/// A blocked read there does not hold up runtime shutdown, so the command can
/// exit as soon as the countdown submits. The channel closes on EOF.
fn spawn_line_reader() -> mpsc::Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let failed = line.is_err();
            if tx.blocking_send(line).is_err() || failed {
                break;
            }
        }
    });
    rx
}

fn lock(session: &SharedSession) -> Result<std::sync::MutexGuard<'_, TestSession>> {
    session
        .lock()
        .map_err(|_| anyhow::anyhow!("test session lock poisoned"))
}

fn apply(session: &SharedSession, command: TakeCommand) -> Result<()> {
    {
        let mut guard = lock(session)?;
        match command {
            TakeCommand::Answer(option) => {
                if !guard.select_answer(option) {
                    println!("Option {} is not available.", option + 1);
                    return Ok(());
                }
                println!("Answer {} saved.", option + 1);
            }
            TakeCommand::Next => guard.navigate(Direction::Next),
            TakeCommand::Prev => guard.navigate(Direction::Prev),
            TakeCommand::Jump(index) => guard.jump_to(index),
            TakeCommand::Flag => {
                let flagged = guard.toggle_flag();
                println!("{}", if flagged { "Flagged." } else { "Flag removed." });
            }
            TakeCommand::Grid => {
                print_grid(&guard);
                return Ok(());
            }
            TakeCommand::Help => {
                print_help();
                return Ok(());
            }
            TakeCommand::Unknown(input) => {
                println!("Unknown command '{input}'. Type h for help.");
                return Ok(());
            }
            TakeCommand::Show | TakeCommand::Submit | TakeCommand::Quit => {}
        }
    }
    print_current(session)
}

fn print_help() {
    println!("Commands: 1-4 answer | n next | p prev | g <n> go to | f flag | grid | s submit | q quit");
}

fn print_current(session: &SharedSession) -> Result<()> {
    let guard = lock(session)?;
    let index = guard.current_index();
    let Some(question) = guard.current_question() else {
        return Ok(());
    };

    println!();
    println!(
        "Question {}/{}  [{} | {}]{}  Time left: {}",
        index + 1,
        guard.len(),
        question.subject,
        question.difficulty,
        if guard.is_flagged(index) { "  (flagged)" } else { "" },
        format_duration(u64::from(guard.time_left()))
    );
    println!("{}", question.question);
    let chosen = guard.answer_for(index);
    for (i, option) in question.options.iter().enumerate() {
        let marker = if chosen == Some(i) { '*' } else { ' ' };
        println!(" {marker}{}) {option}", i + 1);
    }
    println!(
        "Answered {}/{}  Flagged {}  Remaining {}",
        guard.answered_count(),
        guard.len(),
        guard.flagged_count(),
        guard.remaining()
    );
    Ok(())
}

fn print_grid(session: &TestSession) {
    let cells: Vec<String> = (0..session.len())
        .map(|i| {
            let mark = match session.status(i) {
                QuestionStatus::Answered => 'A',
                QuestionStatus::Flagged => 'F',
                QuestionStatus::Unanswered => '.',
            };
            if i == session.current_index() {
                format!("[{}{mark}]", i + 1)
            } else {
                format!("{}{mark}", i + 1)
            }
        })
        .collect();
    for row in cells.chunks(10) {
        println!("{}", row.join(" "));
    }
}

pub(crate) fn print_result(result: &TestResult) {
    use comfy_table::{Cell, Table};

    println!("\n{}", result.name);
    println!(
        "Score: {}%  Grade: {}  Correct: {}/{}  Time: {}",
        result.score,
        Grade::from_score(result.score),
        result.correct_answers,
        result.total_questions,
        format_duration(result.time_taken_secs)
    );

    let mut table = Table::new();
    table.set_header(vec!["Subject", "Correct", "Total", "Score"]);
    for subject in subject_breakdown(result) {
        table.add_row(vec![
            Cell::new(subject.subject),
            Cell::new(subject.correct),
            Cell::new(subject.total),
            Cell::new(format!("{}%", subject.percentage)),
        ]);
    }
    println!("{table}");
    println!("Result ID: {}", result.id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_answers_as_zero_based() {
        assert_eq!(parse_command("1"), TakeCommand::Answer(0));
        assert_eq!(parse_command(" 4 "), TakeCommand::Answer(3));
        assert_eq!(parse_command("5"), TakeCommand::Unknown("5".into()));
    }

    #[test]
    fn parses_navigation() {
        assert_eq!(parse_command("n"), TakeCommand::Next);
        assert_eq!(parse_command("PREV"), TakeCommand::Prev);
        assert_eq!(parse_command("g 12"), TakeCommand::Jump(11));
        assert_eq!(parse_command("g 0"), TakeCommand::Unknown("g 0".into()));
        assert_eq!(parse_command("g"), TakeCommand::Unknown("g".into()));
    }

    #[test]
    fn parses_control_commands() {
        assert_eq!(parse_command("f"), TakeCommand::Flag);
        assert_eq!(parse_command("s"), TakeCommand::Submit);
        assert_eq!(parse_command("quit"), TakeCommand::Quit);
        assert_eq!(parse_command(""), TakeCommand::Show);
        assert_eq!(parse_command("?"), TakeCommand::Help);
        assert_eq!(parse_command("grid"), TakeCommand::Grid);
    }
}
