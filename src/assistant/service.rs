//! Calls into the external collaborators with retry and backoff.

use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::common::config::AppCfg;

use super::domain::{AnalysisAssistant, CollaboratorError, Transcriber};

/// Exponential backoff for assistant requests.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (zero-based); doubles every time.
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(retry))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl From<&AppCfg> for RetryPolicy {
    fn from(cfg: &AppCfg) -> Self {
        Self {
            max_attempts: cfg.assistant_attempts.max(1),
            base_delay: Duration::from_millis(cfg.assistant_delay_ms),
        }
    }
}

/// Send `prompt`, retrying transient failures.
///
/// Non-retryable errors are returned immediately; after `max_attempts` the
/// last error is returned.
pub fn ask(
    assistant: &dyn AnalysisAssistant,
    policy: &RetryPolicy,
    prompt: &str,
) -> Result<String, CollaboratorError> {
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        let err = match assistant.complete(prompt) {
            Ok(text) if text.trim().is_empty() => CollaboratorError::Empty,
            Ok(text) => return Ok(text),
            Err(err) => err,
        };
        attempt += 1;
        if !err.is_retryable() || attempt >= attempts {
            warn!(attempt, error = %err, "assistant request failed");
            return Err(err);
        }
        let delay = policy.delay_for(attempt - 1);
        debug!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "retrying assistant request");
        thread::sleep(delay);
    }
}

/// Transcribe an audio clip, treating an empty transcript as not understood.
pub fn transcribe(transcriber: &dyn Transcriber, audio: &[u8]) -> Result<String, CollaboratorError> {
    let text = transcriber.transcribe(audio)?;
    let text = text.trim();
    if text.is_empty() {
        return Err(CollaboratorError::NotUnderstood);
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Replays scripted responses in order.
    struct Scripted {
        responses: Mutex<Vec<Result<String, CollaboratorError>>>,
        calls: Mutex<u32>,
    }

    impl Scripted {
        fn new(mut responses: Vec<Result<String, CollaboratorError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    impl AnalysisAssistant for Scripted {
        fn complete(&self, _prompt: &str) -> Result<String, CollaboratorError> {
            *self.calls.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(CollaboratorError::Unavailable("exhausted".into())))
        }
    }

    impl Transcriber for Scripted {
        fn transcribe(&self, _audio: &[u8]) -> Result<String, CollaboratorError> {
            self.complete("")
        }
    }

    fn instant(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::ZERO,
        }
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(8000));
    }

    #[test]
    fn retries_transient_failures_until_success() {
        let assistant = Scripted::new(vec![
            Err(CollaboratorError::RateLimited),
            Ok("   ".into()),
            Ok("try a histogram".into()),
        ]);
        let reply = ask(&assistant, &instant(5), "p").unwrap();
        assert_eq!(reply, "try a histogram");
        assert_eq!(assistant.calls(), 3);
    }

    #[test]
    fn stops_on_rejection() {
        let assistant = Scripted::new(vec![
            Err(CollaboratorError::Rejected("bad key".into())),
            Ok("never".into()),
        ]);
        let err = ask(&assistant, &instant(5), "p").unwrap_err();
        assert_eq!(err, CollaboratorError::Rejected("bad key".into()));
        assert_eq!(assistant.calls(), 1);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let assistant = Scripted::new(vec![]);
        let err = ask(&assistant, &instant(3), "p").unwrap_err();
        assert!(matches!(err, CollaboratorError::Unavailable(_)));
        assert_eq!(assistant.calls(), 3);
    }

    #[test]
    fn blank_transcript_is_not_understood() {
        let transcriber = Scripted::new(vec![Ok("  ".into())]);
        assert_eq!(
            transcribe(&transcriber, b"wav").unwrap_err(),
            CollaboratorError::NotUnderstood
        );
    }
}
