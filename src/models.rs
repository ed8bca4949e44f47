use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Answers keyed by 0-based question index; values are the exact option
/// strings the user picked. Kept ordered so wire payloads are stable.
pub type AnswerMap = BTreeMap<usize, String>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer", alias = "answer")]
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    // The generation endpoint nests the question list under "quiz",
    // the detail endpoint under "questions".
    #[serde(alias = "quiz")]
    pub questions: Vec<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub date_generated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_answers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(alias = "_id")]
    pub id: i64,
    pub title: String,
    pub url: String,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub date_generated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeIssue {
    pub field: String,
    pub issue: String,
}

impl Quiz {
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Reports anomalies in a quiz payload as it came off the wire. A quiz
    /// with issues may still be renderable (a correct answer missing from the
    /// options simply never gets marked correct); only an empty question list
    /// is treated as fatal by the loading layer.
    pub fn shape_issues(&self) -> Vec<ShapeIssue> {
        let mut issues = Vec::new();
        if self.questions.is_empty() {
            issues.push(ShapeIssue {
                field: "questions".into(),
                issue: "must contain at least one question".into(),
            });
        }
        for (i, q) in self.questions.iter().enumerate() {
            if q.question.trim().is_empty() {
                issues.push(ShapeIssue {
                    field: format!("questions[{i}].question"),
                    issue: "must not be empty".into(),
                });
            }
            if q.options.is_empty() {
                issues.push(ShapeIssue {
                    field: format!("questions[{i}].options"),
                    issue: "must contain at least one option".into(),
                });
            }
            if !q.options.iter().any(|o| o == &q.correct_answer) {
                issues.push(ShapeIssue {
                    field: format!("questions[{i}].correctAnswer"),
                    issue: "is not one of the options".into(),
                });
            }
        }
        issues
    }
}
