//! External generative model used to estimate nutrition and write diet analyses.
//!
//! Handlers never talk to a provider directly: they get an `Arc<dyn NutritionModel>`
//! from `AppState`, built once at startup.

pub mod gemini;
pub mod prompt;
pub mod retry;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use gemini::GeminiModel;
pub use retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data_base64: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    pub prompt: String,
    pub image: Option<InlineImage>,
    /// Ask the provider to answer with `application/json`.
    pub expect_json: bool,
}

impl ModelRequest {
    pub fn json(prompt: String) -> Self {
        Self {
            prompt,
            image: None,
            expect_json: true,
        }
    }

    pub fn with_image(mut self, image: Option<InlineImage>) -> Self {
        self.image = image;
        self
    }
}

/// Failure talking to the model provider. Passed through untouched by the
/// normalization code.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("model API key is not configured")]
    MissingCredentials,
    #[error("model request timed out after {0:?}")]
    Timeout(Duration),
    #[error("model request failed: {0}")]
    Network(String),
    #[error("model API error ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("model response had no text content")]
    EmptyResponse,
}

impl UpstreamError {
    /// Transient failures worth asking again for.
    pub fn is_transient(&self) -> bool {
        match self {
            UpstreamError::Timeout(_) | UpstreamError::Network(_) => true,
            UpstreamError::Status { status, .. } => *status == 429 || *status >= 500,
            UpstreamError::MissingCredentials | UpstreamError::EmptyResponse => false,
        }
    }
}

#[async_trait]
pub trait NutritionModel: Send + Sync {
    /// Returns the raw text of the first candidate answer.
    async fn generate(&self, request: &ModelRequest) -> Result<String, UpstreamError>;
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted answers in order and records every prompt it saw.
    /// Once the script runs out the last answer repeats.
    #[derive(Default)]
    pub struct ScriptedModel {
        script: Mutex<VecDeque<Result<String, UpstreamError>>>,
        pub requests: Mutex<Vec<ModelRequest>>,
    }

    impl ScriptedModel {
        pub fn new(script: Vec<Result<String, UpstreamError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn answering(text: &str) -> Self {
            Self::new(vec![Ok(text.to_string())])
        }

        pub fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    fn replay(e: &UpstreamError) -> UpstreamError {
        match e {
            UpstreamError::MissingCredentials => UpstreamError::MissingCredentials,
            UpstreamError::Timeout(d) => UpstreamError::Timeout(*d),
            UpstreamError::Network(m) => UpstreamError::Network(m.clone()),
            UpstreamError::Status { status, message } => UpstreamError::Status {
                status: *status,
                message: message.clone(),
            },
            UpstreamError::EmptyResponse => UpstreamError::EmptyResponse,
        }
    }

    #[async_trait]
    impl NutritionModel for ScriptedModel {
        async fn generate(&self, request: &ModelRequest) -> Result<String, UpstreamError> {
            self.requests.lock().unwrap().push(request.clone());
            let mut script = self.script.lock().unwrap();
            let next = if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().map(|r| match r {
                    Ok(text) => Ok(text.clone()),
                    Err(e) => Err(replay(e)),
                })
            };
            next.unwrap_or(Err(UpstreamError::EmptyResponse))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_the_retryable_ones() {
        assert!(UpstreamError::Timeout(Duration::from_secs(30)).is_transient());
        assert!(UpstreamError::Network("reset".into()).is_transient());
        assert!(UpstreamError::Status {
            status: 503,
            message: "overloaded".into()
        }
        .is_transient());
        assert!(UpstreamError::Status {
            status: 429,
            message: "quota".into()
        }
        .is_transient());
        assert!(!UpstreamError::Status {
            status: 400,
            message: "bad request".into()
        }
        .is_transient());
        assert!(!UpstreamError::MissingCredentials.is_transient());
    }
}
