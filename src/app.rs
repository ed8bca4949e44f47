use crate::engine::{Mode, OptionState, QuizEngine};
use crate::gateway::BackendGateway;
use crate::models::{HistoryEntry, Question};
use crate::validate::validate_wikipedia_url;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{info, warn};

const SEPARATOR: &str =
    "================================================================================";

/// Interactive terminal front end. Owns the gateway; each quiz run owns its
/// engine and drops it when the user navigates away.
pub struct App {
    gateway: Arc<dyn BackendGateway>,
}

impl App {
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        Self { gateway }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        println!("{SEPARATOR}");
        println!("AI Wiki Quiz - generate a quiz from any Wikipedia article");
        println!("{SEPARATOR}");

        loop {
            println!();
            println!("[g] generate quiz  [h] history  [q] quit");
            let Some(choice) = prompt("> ")? else {
                return Ok(());
            };
            match choice.as_str() {
                "g" => self.generate_flow().await?,
                "h" => self.history_flow().await?,
                "q" => return Ok(()),
                "" => {}
                other => println!("Unknown command: {other}"),
            }
        }
    }

    /// Prompt for a URL, validate inline (nothing goes over the wire until
    /// validation passes), generate, then run the attempt loop.
    async fn generate_flow(&self) -> anyhow::Result<()> {
        let url = loop {
            let Some(input) = prompt("Wikipedia article URL ('back' to cancel):")? else {
                return Ok(());
            };
            if input == "back" {
                return Ok(());
            }
            match validate_wikipedia_url(&input) {
                Ok(_) => break input.trim().to_string(),
                Err(reason) => println!("  {reason}"),
            }
        };

        println!("Generating quiz (this may take 10-30 seconds)...");
        let quiz = match self.gateway.generate_quiz(&url).await {
            Ok(quiz) => quiz,
            Err(err) => {
                println!("Error: {err}");
                return Ok(());
            }
        };

        info!(title = %quiz.title, questions = quiz.question_count(), "quiz generated");
        if let Some(summary) = &quiz.summary {
            println!();
            println!("Summary: {summary}");
        }

        let engine = QuizEngine::new(quiz);
        self.run_attempt(engine).await
    }

    /// The attempt loop: answer questions in any order, change answers
    /// freely, submit only once everything is answered.
    async fn run_attempt(&self, mut engine: QuizEngine) -> anyhow::Result<()> {
        loop {
            render_quiz(&engine);

            while engine.mode() == Mode::Attempt {
                let count = engine.question_count();
                let label = if engine.can_submit() {
                    "Change an answer ('1 B') or 'submit':".to_string()
                } else {
                    format!(
                        "Answer with question number and option letter, e.g. '1 B' ({}/{} answered):",
                        engine.answered_count(),
                        count
                    )
                };
                let Some(input) = prompt(&label)? else {
                    return Ok(());
                };
                match input.as_str() {
                    "back" => return Ok(()),
                    "submit" => {
                        if engine.submit() {
                            break;
                        }
                        println!(
                            "  Answer all questions first ({}/{} answered)",
                            engine.answered_count(),
                            count
                        );
                    }
                    other => match parse_selection(&engine, other)
                        .map(|(index, option)| (index, option.to_string()))
                    {
                        Some((index, option)) => {
                            engine.select_answer(index, option);
                            render_question(&engine, index);
                        }
                        None => println!("  Could not read that, try '1 B'"),
                    },
                }
            }

            // Results render before the save settles; persistence is
            // best-effort and never blocks or reverts the submitted state.
            let save_handle = engine.take_pending_save().map(|save| {
                let gateway = Arc::clone(&self.gateway);
                tokio::spawn(async move {
                    gateway.submit_answers(save.quiz_id, &save.answers).await
                })
            });

            render_quiz(&engine);

            if let Some(handle) = save_handle {
                match handle.await {
                    Ok(Ok(())) => info!("answers saved"),
                    Ok(Err(err)) => warn!(%err, "best-effort answer save failed"),
                    Err(err) => warn!(%err, "answer save task failed"),
                }
                engine.save_settled();
            }

            let Some(input) = prompt("[r] retry  [m] menu:")? else {
                return Ok(());
            };
            if input == "r" {
                engine.reset();
                continue;
            }
            return Ok(());
        }
    }

    /// List past quizzes and open one in read-only mode. A fetch failure
    /// leaves the listing untouched.
    async fn history_flow(&self) -> anyhow::Result<()> {
        let history = match self.gateway.get_history().await {
            Ok(history) => history,
            Err(err) => {
                println!("Error: {err}");
                return Ok(());
            }
        };

        if history.is_empty() {
            println!("No quiz history yet. Generate your first quiz!");
            return Ok(());
        }

        println!();
        println!("Quiz History");
        for entry in &history {
            println!("  {}", format_history_entry(entry));
        }

        loop {
            let Some(input) = prompt("Quiz id to view ('back' to cancel):")? else {
                return Ok(());
            };
            if input == "back" {
                return Ok(());
            }
            let Ok(id) = input.parse::<i64>() else {
                println!("  Enter one of the listed ids");
                continue;
            };

            match self.gateway.get_quiz_by_id(id).await {
                Ok(quiz) => {
                    let engine = QuizEngine::readonly(quiz);
                    render_quiz(&engine);
                    return Ok(());
                }
                Err(err) => println!("Error: {err}"),
            }
        }
    }
}

/// The one shared rendering path: attempt, results and historical views all
/// go through here, differing only in what the engine reports per option.
fn render_quiz(engine: &QuizEngine) {
    let quiz = engine.quiz();
    println!();
    println!("{SEPARATOR}");
    println!("{} ({} questions)", quiz.title, engine.question_count());
    if let Some(url) = &quiz.url {
        println!("Source: {url}");
    }
    println!("{SEPARATOR}");

    if let Some(score) = engine.score() {
        // Readonly entries with no saved answers are shown without a score.
        let show = engine.mode() == Mode::Submitted || engine.answered_count() > 0;
        if show {
            println!(
                "Score: {}/{} ({}%) - grade {}",
                score.correct,
                score.total,
                score.percentage(),
                score.grade()
            );
            if engine.is_saving() {
                println!("Saving your answers...");
            }
            println!("{SEPARATOR}");
        }
    }

    for index in 0..engine.question_count() {
        render_question(engine, index);
    }
}

fn render_question(engine: &QuizEngine, index: usize) {
    let Some(question) = engine.quiz().questions.get(index) else {
        return;
    };
    println!();
    println!("Question {}: {}", index + 1, question.question);
    if let Some(difficulty) = &question.difficulty {
        println!("  ({difficulty})");
    }
    for (i, option) in question.options.iter().enumerate() {
        let letter = option_letter(i);
        let marker = match engine.option_state(index, option) {
            OptionState::Selected => ">",
            OptionState::Correct => "+",
            OptionState::Incorrect => "x",
            OptionState::Neutral | OptionState::Dimmed => " ",
        };
        println!("  [{marker}] {letter}. {option}");
    }
    if let Some(explanation) = engine.explanation(index) {
        println!("  Explanation: {explanation}");
    }
}

fn format_history_entry(entry: &HistoryEntry) -> String {
    let date = entry
        .date_generated
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!("#{} {} | {} | {}", entry.id, entry.title, entry.url, date)
}

fn option_letter(index: usize) -> char {
    (b'A' + (index as u8).min(25)) as char
}

/// Parses "1 B" into a 0-based question index and the option string it
/// refers to. The full option text is also accepted in place of the letter.
fn parse_selection<'a>(engine: &'a QuizEngine, input: &str) -> Option<(usize, &'a str)> {
    let (number, rest) = input.split_once(char::is_whitespace)?;
    let number = number.parse::<usize>().ok()?;
    let index = number.checked_sub(1)?;
    let question = engine.quiz().questions.get(index)?;
    let option = lookup_option(question, rest.trim())?;
    Some((index, option))
}

fn lookup_option<'a>(question: &'a Question, token: &str) -> Option<&'a str> {
    if token.len() == 1 {
        let letter = token.chars().next()?.to_ascii_uppercase();
        if letter.is_ascii_uppercase() {
            let index = (letter as u8 - b'A') as usize;
            return question.options.get(index).map(String::as_str);
        }
    }
    question
        .options
        .iter()
        .find(|o| o.as_str() == token)
        .map(String::as_str)
}

/// Reads one trimmed line; `None` means stdin closed.
fn prompt(label: &str) -> io::Result<Option<String>> {
    print!("{label} ");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Quiz;

    fn engine() -> QuizEngine {
        QuizEngine::new(Quiz {
            id: None,
            title: "T".into(),
            url: None,
            questions: vec![Question {
                question: "Pick one".into(),
                options: vec!["Paris".into(), "Rome".into()],
                correct_answer: "Paris".into(),
                explanation: None,
                difficulty: None,
            }],
            summary: None,
            date_generated: None,
            user_answers: None,
        })
    }

    #[test]
    fn selection_parses_letter_and_full_text() {
        let engine = engine();
        assert_eq!(parse_selection(&engine, "1 b"), Some((0, "Rome")));
        assert_eq!(parse_selection(&engine, "1 Paris"), Some((0, "Paris")));
        assert_eq!(parse_selection(&engine, "2 A"), None);
        assert_eq!(parse_selection(&engine, "1 Z"), None);
        assert_eq!(parse_selection(&engine, "submit"), None);
        assert_eq!(parse_selection(&engine, "0 A"), None);
    }

    #[test]
    fn option_letters_run_from_a() {
        assert_eq!(option_letter(0), 'A');
        assert_eq!(option_letter(3), 'D');
    }
}
