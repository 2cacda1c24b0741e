//! The `mockexam results` and `mockexam stats` commands.

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use mockexam_core::history::{self, HistorySummary};
use mockexam_core::scoring::{format_duration, Grade, TestResult};

use super::take::print_result;
use super::Workspace;

const RECENT_LIMIT: usize = 5;

pub fn execute(ws: &Workspace, id: Option<String>, review: bool, format: &str) -> Result<()> {
    anyhow::ensure!(
        !review || id.is_some(),
        "--review needs --id <id> to pick a result"
    );
    anyhow::ensure!(
        !review || format == "text",
        "--review only applies to text output; JSON already includes every answer"
    );
    let user = ws.require_user()?;

    let Some(id) = id else {
        let results = history::load_results(&ws.store, &user.id)?;
        return match format {
            "json" => print_json(&results),
            "text" => {
                print_list(&results);
                Ok(())
            }
            other => anyhow::bail!("unknown format '{other}', expected text or json"),
        };
    };

    let result = history::find_result(&ws.store, &user.id, &id)?
        .with_context(|| format!("no result with id '{id}'"))?;
    match format {
        "json" => print_json(&result),
        "text" => {
            print_result(&result);
            if review {
                print_review(&result);
            }
            Ok(())
        }
        other => anyhow::bail!("unknown format '{other}', expected text or json"),
    }
}

pub fn stats(ws: &Workspace) -> Result<()> {
    let user = ws.require_user()?;
    let stats = history::load_stats(&ws.store, &user.id)?;

    println!("Dashboard for {}", user.name);
    println!("  Tests taken:     {}", stats.total_tests);
    println!("  Average score:   {:.1}%", stats.average_score);
    println!("  Questions:       {}", stats.total_questions);
    println!("  Time spent:      {}", format_duration(stats.time_spent_secs));

    let recent = history::recent_results(&ws.store, &user.id, RECENT_LIMIT)?;
    if recent.is_empty() {
        println!("\nNo tests taken yet. Run `mockexam take` to start one.");
    } else {
        println!("\nRecent tests:");
        println!("{}", results_table(&recent));
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_list(results: &[TestResult]) {
    if results.is_empty() {
        println!("No results yet.");
        return;
    }
    println!("{}", results_table(results));

    let summary = HistorySummary::from_results(results);
    println!(
        "{} tests, average {}%, best {}%, {} questions answered",
        summary.total_tests, summary.average_score, summary.best_score, summary.total_questions
    );
}

fn results_table(results: &[TestResult]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Date", "Score", "Grade", "Correct", "Time"]);
    for r in results {
        table.add_row(vec![
            Cell::new(&r.id),
            Cell::new(&r.name),
            Cell::new(r.date.format("%Y-%m-%d %H:%M")),
            Cell::new(format!("{}%", r.score)),
            Cell::new(Grade::from_score(r.score)),
            Cell::new(format!("{}/{}", r.correct_answers, r.total_questions)),
            Cell::new(format_duration(r.time_taken_secs)),
        ]);
    }
    table
}

fn print_review(result: &TestResult) {
    for (i, answered) in result.questions.iter().enumerate() {
        let q = &answered.question;
        let verdict = match answered.user_answer {
            None => "unanswered",
            Some(_) if answered.is_correct() => "correct",
            Some(_) => "incorrect",
        };
        println!("\nQ{} [{verdict}] {}", i + 1, q.question);
        for (j, option) in q.options.iter().enumerate() {
            let mut marks = String::new();
            if j == q.correct_answer {
                marks.push_str(" (correct)");
            }
            if answered.user_answer == Some(j) {
                marks.push_str(" (your answer)");
            }
            println!("  {}) {option}{marks}", j + 1);
        }
        if !q.explanation.is_empty() {
            println!("  Explanation: {}", q.explanation);
        }
    }
}
