use crate::error::ClientError;
use crate::models::{AnswerMap, HistoryEntry, Quiz};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{error, info, warn};

/// Boundary for every backend call the client makes. The real implementation
/// talks HTTP; tests can substitute their own.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    async fn generate_quiz(&self, url: &str) -> Result<Quiz, ClientError>;
    async fn get_history(&self) -> Result<Vec<HistoryEntry>, ClientError>;
    async fn get_quiz_by_id(&self, id: i64) -> Result<Quiz, ClientError>;
    async fn submit_answers(&self, quiz_id: i64, answers: &AnswerMap) -> Result<(), ClientError>;
}

#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: String,
    client: Client,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
        }
    }

    /// Turns a response into `T`, or into an `Api` error carrying the
    /// server-provided message when there is one. The original backend is
    /// FastAPI and reports failures under "detail"; older payloads used
    /// "error". Anything else falls back to a per-operation message.
    async fn decode<T: DeserializeOwned>(
        &self,
        response: Response,
        fallback: &str,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| server_message(&body))
                .unwrap_or_else(|| fallback.to_string());
            error!(%status, %message, "backend request failed");
            return Err(ClientError::Api { status, message });
        }
        Ok(response.json::<T>().await?)
    }

    /// Shape-checks a freshly loaded quiz. Only a missing question list is
    /// fatal; anything else is logged and left to the renderer, which
    /// degrades gracefully.
    fn check_shape(quiz: Quiz) -> Result<Quiz, ClientError> {
        for issue in quiz.shape_issues() {
            if issue.field == "questions" {
                return Err(ClientError::DataShape(format!(
                    "{}: {}",
                    issue.field, issue.issue
                )));
            }
            warn!(field = %issue.field, issue = %issue.issue, "quiz payload anomaly");
        }
        Ok(quiz)
    }
}

#[async_trait]
impl BackendGateway for HttpGateway {
    async fn generate_quiz(&self, url: &str) -> Result<Quiz, ClientError> {
        info!(url, "requesting quiz generation");
        let response = self
            .client
            .post(format!("{}/api/generate-quiz", self.base_url))
            .json(&json!({ "url": url }))
            .send()
            .await?;
        let quiz = self
            .decode::<Quiz>(response, "Failed to generate quiz")
            .await?;
        Self::check_shape(quiz)
    }

    async fn get_history(&self) -> Result<Vec<HistoryEntry>, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/history", self.base_url))
            .send()
            .await?;
        self.decode(response, "Failed to fetch history").await
    }

    async fn get_quiz_by_id(&self, id: i64) -> Result<Quiz, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/quiz/{}", self.base_url, id))
            .send()
            .await?;
        let quiz = self
            .decode::<Quiz>(response, "Failed to fetch quiz details")
            .await?;
        Self::check_shape(quiz)
    }

    async fn submit_answers(&self, quiz_id: i64, answers: &AnswerMap) -> Result<(), ClientError> {
        info!(quiz_id, "saving answers");
        let response = self
            .client
            .post(format!("{}/api/submit-answers", self.base_url))
            .json(&json!({ "quiz_id": quiz_id, "answers": answers }))
            .send()
            .await?;
        self.decode::<Value>(response, "Failed to submit answers")
            .await?;
        Ok(())
    }
}

fn server_message(body: &Value) -> Option<String> {
    body.get("error")
        .or_else(|| body.get("detail"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_prefers_error_then_detail() {
        let body = json!({"error": "boom", "detail": "other"});
        assert_eq!(server_message(&body), Some("boom".into()));
        let body = json!({"detail": "Quiz with ID 9 not found"});
        assert_eq!(server_message(&body), Some("Quiz with ID 9 not found".into()));
        assert_eq!(server_message(&json!({"status": 500})), None);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let gateway = HttpGateway::new("http://localhost:8000/");
        assert_eq!(gateway.base_url, "http://localhost:8000");
    }
}
