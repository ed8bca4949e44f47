use crate::models::{AnswerMap, Quiz};
use tracing::warn;

/// Display modes for one quiz. `Attempt` is a live run, `Submitted` is the
/// results view right after a run, `Readonly` is a historical quiz opened
/// from the history list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Attempt,
    Submitted,
    Readonly,
}

/// Render-ready state of a single option row. The renderer maps these to
/// markers/colors; the engine never formats anything itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionState {
    Neutral,
    Selected,
    Correct,
    Incorrect,
    Dimmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.correct as f64) * 100.0 / (self.total as f64)).round() as u32
    }

    /// Letter grade, inclusive on the lower bound of each band.
    pub fn grade(&self) -> &'static str {
        match self.percentage() {
            90..=u32::MAX => "A+",
            80..=89 => "A",
            70..=79 => "B",
            60..=69 => "C",
            50..=59 => "D",
            _ => "F",
        }
    }
}

/// Answers to be persisted after a submit, handed to the gateway by the
/// caller. The engine itself does no I/O.
#[derive(Debug, Clone)]
pub struct PendingSave {
    pub quiz_id: i64,
    pub answers: AnswerMap,
}

/// State machine for one quiz run: answer collection, submission gating,
/// scoring and the per-option display table. Owns the quiz for its lifetime;
/// dropped when the user navigates away.
#[derive(Debug)]
pub struct QuizEngine {
    quiz: Quiz,
    mode: Mode,
    answers: AnswerMap,
    score: Option<Score>,
    pending_save: Option<PendingSave>,
    saving: bool,
}

impl QuizEngine {
    /// Fresh attempt: nothing answered, nothing locked.
    pub fn new(quiz: Quiz) -> Self {
        Self {
            quiz,
            mode: Mode::Attempt,
            answers: AnswerMap::new(),
            score: None,
            pending_save: None,
            saving: false,
        }
    }

    /// Historical view seeded from the answers saved with the quiz. Selection
    /// and submission are permanently disabled; the score is fixed at
    /// construction.
    pub fn readonly(quiz: Quiz) -> Self {
        let count = quiz.question_count();
        let mut answers = AnswerMap::new();
        if let Some(saved) = &quiz.user_answers {
            for (key, option) in saved {
                match key.parse::<usize>() {
                    Ok(i) if i < count => {
                        answers.insert(i, option.clone());
                    }
                    _ => warn!(key = %key, "dropping saved answer with unusable question index"),
                }
            }
        }
        let mut engine = Self {
            quiz,
            mode: Mode::Readonly,
            answers,
            score: None,
            pending_save: None,
            saving: false,
        };
        engine.score = Some(engine.compute_score());
        engine
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn question_count(&self) -> usize {
        self.quiz.question_count()
    }

    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Records (or overwrites) the answer for one question. Last write wins.
    /// Ignored outside `Attempt` mode and for out-of-range indices.
    pub fn select_answer(&mut self, index: usize, option: impl Into<String>) {
        if self.mode != Mode::Attempt || index >= self.question_count() {
            return;
        }
        self.answers.insert(index, option.into());
    }

    /// True once every question has an answer. Vacuously true for an empty
    /// quiz. Indices are in range by construction (`select_answer` is the
    /// only mutator), so counting entries is sufficient.
    pub fn can_submit(&self) -> bool {
        self.mode == Mode::Attempt && self.answers.len() == self.question_count()
    }

    /// Locks in the answers and computes the score. Returns false (and
    /// changes nothing) unless `can_submit()`. If the quiz has a persisted
    /// id, a `PendingSave` becomes available for the caller to fire off.
    pub fn submit(&mut self) -> bool {
        if !self.can_submit() {
            return false;
        }
        self.mode = Mode::Submitted;
        self.score = Some(self.compute_score());
        self.pending_save = self.quiz.id.map(|quiz_id| PendingSave {
            quiz_id,
            answers: self.answers.clone(),
        });
        true
    }

    /// Hands out the post-submit persistence job, at most once. Taking it
    /// raises the saving indicator until `save_settled` is called.
    pub fn take_pending_save(&mut self) -> Option<PendingSave> {
        let save = self.pending_save.take();
        if save.is_some() {
            self.saving = true;
        }
        save
    }

    /// Marks the background save as finished, successfully or not. The
    /// outcome never changes mode or answers.
    pub fn save_settled(&mut self) {
        self.saving = false;
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Back to a blank attempt. Only meaningful from `Submitted`; a
    /// historical view cannot be retried.
    pub fn reset(&mut self) {
        if self.mode != Mode::Submitted {
            return;
        }
        self.mode = Mode::Attempt;
        self.answers.clear();
        self.score = None;
        self.pending_save = None;
        self.saving = false;
    }

    /// Defined only once results are visible.
    pub fn score(&self) -> Option<Score> {
        match self.mode {
            Mode::Submitted | Mode::Readonly => self.score,
            Mode::Attempt => None,
        }
    }

    /// The display table for one option row. In `Attempt` only the current
    /// selection is highlighted; after submission the correct option is
    /// marked, a wrong pick is flagged, everything else is dimmed; a
    /// historical view marks the correct option only.
    pub fn option_state(&self, index: usize, option: &str) -> OptionState {
        let selected = self.answer(index) == Some(option);
        let correct = self
            .quiz
            .questions
            .get(index)
            .map(|q| q.correct_answer == option)
            .unwrap_or(false);

        match self.mode {
            Mode::Attempt => {
                if selected {
                    OptionState::Selected
                } else {
                    OptionState::Neutral
                }
            }
            Mode::Submitted => {
                if correct {
                    OptionState::Correct
                } else if selected {
                    OptionState::Incorrect
                } else {
                    OptionState::Dimmed
                }
            }
            Mode::Readonly => {
                if correct {
                    OptionState::Correct
                } else {
                    OptionState::Dimmed
                }
            }
        }
    }

    /// Explanations stay hidden during an attempt.
    pub fn explanation(&self, index: usize) -> Option<&str> {
        if self.mode == Mode::Attempt {
            return None;
        }
        self.quiz
            .questions
            .get(index)
            .and_then(|q| q.explanation.as_deref())
    }

    // Exact, case-sensitive string equality; no trimming or folding. That is
    // the scoring contract and must not be "improved".
    fn compute_score(&self) -> Score {
        let correct = self
            .quiz
            .questions
            .iter()
            .enumerate()
            .filter(|(i, q)| self.answers.get(i) == Some(&q.correct_answer))
            .count();
        Score {
            correct,
            total: self.question_count(),
        }
    }
}
