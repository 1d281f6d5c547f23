//! Endpoint handlers producing `{status, body}` responses.
//!
//! Each handler runs one core operation to completion and maps its outcome to
//! a JSON body: the success payload, or `{"error": ...}` with a 4xx/5xx status.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::assistant::domain::{AnalysisAssistant, CollaboratorError, Transcriber};
use crate::assistant::{prompt, service as assistant_service, RetryPolicy};
use crate::common::config::AppCfg;
use crate::common::error::{LensCode, LensError, LensResult};
use crate::common::time;
use crate::data::domain::SessionId;
use crate::data::store::MemoryStore;
use crate::data::{clean, ingest, summary};
use crate::evaluation::service as evaluation_service;
use crate::training::domain::SplitConfig;

/// Status plus JSON body, ready for any transport.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }
}

impl From<LensError> for ApiResponse {
    fn from(err: LensError) -> Self {
        ApiResponse::error(err.status(), err.to_string())
    }
}

fn collaborator_response(err: CollaboratorError) -> ApiResponse {
    match err {
        CollaboratorError::NotUnderstood => ApiResponse::error(400, err.to_string()),
        other => ApiResponse::error(502, other.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct PredictRequest {
    target: Option<String>,
}

/// Session store plus configuration and optional collaborators.
pub struct Engine {
    cfg: AppCfg,
    store: MemoryStore,
    transcriber: Option<Box<dyn Transcriber>>,
    assistant: Option<Box<dyn AnalysisAssistant>>,
}

impl Engine {
    pub fn new(cfg: AppCfg) -> Self {
        Self {
            cfg,
            store: MemoryStore::new(),
            transcriber: None,
            assistant: None,
        }
    }

    pub fn with_transcriber(mut self, transcriber: Box<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn with_assistant(mut self, assistant: Box<dyn AnalysisAssistant>) -> Self {
        self.assistant = Some(assistant);
        self
    }

    /// Session used when the caller does not name one.
    pub fn default_session(&self) -> SessionId {
        SessionId::new(self.cfg.default_session.clone())
    }

    fn respond(&self, ev: &'static str, start: Instant, result: LensResult<Value>) -> ApiResponse {
        let (code, response) = match result {
            Ok(body) => (LensCode::Ok, ApiResponse::ok(body)),
            Err(err) => (err.code(), ApiResponse::from(err)),
        };
        info!(
            ev,
            code = code as u32,
            status = response.status,
            dur_ms = time::elapsed_ms(start) as u64,
            "request finished"
        );
        response
    }

    /// Replace the session's dataset with an uploaded CSV file.
    pub fn upload(&self, session: &SessionId, file: Option<&[u8]>) -> ApiResponse {
        let start = Instant::now();
        let result = file
            .ok_or_else(|| LensError::malformed("No file provided"))
            .and_then(|bytes| ingest::ingest(&self.store, session, bytes))
            .map(|columns| json!({ "message": "File uploaded", "columns": columns }));
        self.respond("upload", start, result)
    }

    /// Drop incomplete rows from the session's dataset.
    pub fn clean(&self, session: &SessionId) -> ApiResponse {
        let start = Instant::now();
        let result = clean::clean(&self.store, session).map(|report| {
            json!({
                "message": "Data cleaned",
                "rows_before": report.rows_before,
                "rows_after": report.rows_after,
            })
        });
        self.respond("clean", start, result)
    }

    /// Per-column statistics of the session's dataset.
    pub fn analyze(&self, session: &SessionId) -> ApiResponse {
        let start = Instant::now();
        let result = summary::summarize(&self.store, session)
            .and_then(|s| {
                serde_json::to_value(&s).map_err(|e| LensError::internal(e.to_string()))
            })
            .map(|s| json!({ "summary": s }));
        self.respond("analyze", start, result)
    }

    /// Same payload as [`Engine::analyze`]; the dashboard polls this name.
    pub fn summary(&self, session: &SessionId) -> ApiResponse {
        self.analyze(session)
    }

    /// Score the baseline model for the `target` named in a JSON body.
    pub fn predict(&self, session: &SessionId, body: &[u8]) -> ApiResponse {
        let start = Instant::now();
        let result = serde_json::from_slice::<PredictRequest>(body)
            .map_err(|e| LensError::malformed(format!("invalid JSON body: {e}")))
            .and_then(|req| {
                req.target
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| LensError::invalid_target("target is required"))
            })
            .and_then(|target| {
                evaluation_service::evaluate(
                    &self.store,
                    session,
                    &target,
                    &SplitConfig::from(&self.cfg),
                )
            })
            .map(|result| json!({ "model_score": result.model_score }));
        self.respond("predict", start, result)
    }

    /// Transcribe a recorded voice command.
    pub fn voice_command(&self, audio: Option<&[u8]>) -> ApiResponse {
        let Some(transcriber) = self.transcriber.as_deref() else {
            return ApiResponse::error(503, "transcription service not configured");
        };
        let Some(audio) = audio else {
            return ApiResponse::error(400, "No audio provided");
        };
        match assistant_service::transcribe(transcriber, audio) {
            Ok(text) => ApiResponse::ok(json!({ "transcription": text })),
            Err(err) => collaborator_response(err),
        }
    }

    fn consult<F>(&self, session: &SessionId, build: F) -> ApiResponse
    where
        F: FnOnce(&summary::Summary) -> String,
    {
        let Some(assistant) = self.assistant.as_deref() else {
            return ApiResponse::error(503, "analysis assistant not configured");
        };
        let summary = match summary::summarize(&self.store, session) {
            Ok(summary) => summary,
            Err(err) => return err.into(),
        };
        let policy = RetryPolicy::from(&self.cfg);
        match assistant_service::ask(assistant, &policy, &build(&summary)) {
            Ok(reply) => ApiResponse::ok(json!({ "reply": reply })),
            Err(err) => collaborator_response(err),
        }
    }

    /// Forward a free-text request about the dataset to the assistant.
    pub fn ask(&self, session: &SessionId, user_name: &str, request: &str) -> ApiResponse {
        self.consult(session, |summary| {
            prompt::chat_prompt(user_name, summary, request)
        })
    }

    /// Ask the assistant for starter questions about the dataset.
    pub fn suggestions(&self, session: &SessionId, user_name: &str) -> ApiResponse {
        self.consult(session, |summary| prompt::suggestions_prompt(user_name, summary))
    }
}
