//! Schedule advice: LLM-backed suggestion of personalized reminder times.
//!
//! The advisor is a seam: the HTTP handler talks to a `ScheduleAdvisor`
//! trait object, so tests script responses without a model server and
//! the backing model can change without touching the API layer. The
//! production implementation speaks the Ollama generate protocol.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::models::medication::is_time_of_day;

/// System prompt for the suggestion model. The response contract is
/// stated twice because small models drift: once as an instruction,
/// once as a literal shape.
const SYSTEM_PROMPT: &str = "You are an assistant that analyzes medication intake logs \
and suggests optimal, personalized reminder times to improve adherence, minimizing side \
effects and maximizing benefit. Respond with a single JSON object and nothing else, in \
exactly this shape: {\"suggestedSchedule\":[{\"time\":\"HH:MM\",\"reason\":\"...\"}]}";

/// Errors from schedule advice operations.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("cannot reach model server at {0}")]
    Connection(String),
    #[error("model request timed out after {0}s")]
    Timeout(u64),
    #[error("model server returned HTTP {status}: {body}")]
    Backend { status: u16, body: String },
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}

/// Everything the model needs to reason about one medication.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub medication_name: String,
    pub dosage: String,
    /// Past taken doses as (ISO date, "HH:MM") pairs.
    #[serde(default)]
    pub intake_logs: Vec<IntakeSample>,
    /// Free-text needs and preferences reported by the user.
    #[serde(default)]
    pub user_needs: String,
}

/// One historical intake, already split into local date and time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeSample {
    pub date: String,
    pub time: String,
}

/// A suggested reminder time with the model's reasoning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSuggestion {
    pub time: String,
    pub reason: String,
}

/// Produces schedule suggestions for one medication.
///
/// Dyn-compatible: `suggest` returns a boxed future so the advisor can
/// live behind `Arc<dyn ScheduleAdvisor>` in shared state.
pub trait ScheduleAdvisor: Send + Sync {
    fn suggest(
        &self,
        request: &SuggestionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ScheduleSuggestion>, AdvisorError>> + Send + '_>>;
}

// ---------------------------------------------------------------------------
// Ollama-backed implementation
// ---------------------------------------------------------------------------

/// Advisor backed by an Ollama-compatible `/api/generate` endpoint.
pub struct HttpScheduleAdvisor {
    base_url: String,
    model: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl HttpScheduleAdvisor {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, AdvisorError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            system: SYSTEM_PROMPT,
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_connect() {
                AdvisorError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                AdvisorError::Timeout(self.timeout_secs)
            } else {
                AdvisorError::MalformedResponse(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AdvisorError::MalformedResponse(e.to_string()))?;

        Ok(parsed.response)
    }
}

impl ScheduleAdvisor for HttpScheduleAdvisor {
    fn suggest(
        &self,
        request: &SuggestionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ScheduleSuggestion>, AdvisorError>> + Send + '_>>
    {
        let prompt = build_prompt(request);
        Box::pin(async move {
            let response = self.generate(&prompt).await?;
            parse_suggestions(&response)
        })
    }
}

/// Renders the user-facing half of the prompt: medication facts, the
/// stated needs, and one line per historical intake.
fn build_prompt(request: &SuggestionRequest) -> String {
    let mut prompt = format!(
        "Medication Name: {}\nDosage: {}\nUser Needs: {}\n\nIntake Logs:\n",
        request.medication_name, request.dosage, request.user_needs
    );
    if request.intake_logs.is_empty() {
        prompt.push_str("(none recorded)\n");
    }
    for sample in &request.intake_logs {
        prompt.push_str(&format!("- Date: {}, Time: {}\n", sample.date, sample.time));
    }
    prompt.push_str(
        "\nBased on the intake logs and user needs, suggest an optimal medication \
         schedule with reasoning for each suggested time. Format each time as HH:MM.",
    );
    prompt
}

/// Parses the model's text into suggestions.
///
/// Models wrap JSON in prose or code fences, so the outermost brace
/// pair is located first. Entries that fail to deserialize or carry a
/// malformed time are dropped rather than failing the whole response.
fn parse_suggestions(response: &str) -> Result<Vec<ScheduleSuggestion>, AdvisorError> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Raw {
        suggested_schedule: Vec<serde_json::Value>,
    }

    let json = extract_json_object(response)
        .ok_or_else(|| AdvisorError::MalformedResponse("no JSON object found".into()))?;
    let raw: Raw = serde_json::from_str(json)
        .map_err(|e| AdvisorError::MalformedResponse(e.to_string()))?;

    Ok(raw
        .suggested_schedule
        .into_iter()
        .filter_map(|v| serde_json::from_value::<ScheduleSuggestion>(v).ok())
        .filter(|s| is_time_of_day(&s.time))
        .collect())
}

fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&response[start..=end])
}

// ---------------------------------------------------------------------------
// Scripted advisor for tests
// ---------------------------------------------------------------------------

/// Advisor that returns a fixed outcome, no model server involved.
pub struct ScriptedAdvisor {
    outcome: Result<Vec<ScheduleSuggestion>, String>,
}

impl ScriptedAdvisor {
    pub fn with_suggestions(suggestions: Vec<ScheduleSuggestion>) -> Self {
        Self {
            outcome: Ok(suggestions),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
        }
    }
}

impl ScheduleAdvisor for ScriptedAdvisor {
    fn suggest(
        &self,
        _request: &SuggestionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ScheduleSuggestion>, AdvisorError>> + Send + '_>>
    {
        let outcome = match &self.outcome {
            Ok(suggestions) => Ok(suggestions.clone()),
            Err(message) => Err(AdvisorError::Connection(message.clone())),
        };
        Box::pin(async move { outcome })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
