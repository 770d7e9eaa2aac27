//! Mock model invoker for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::{LarderError, Result};
use crate::request::ImagePayload;

use super::invoker::{LlmConfig, ModelInvoker};

/// Scripted model invoker that returns queued responses in order.
///
/// Records the number of calls made, so tests can assert on the
/// caller-level retry policy.
pub struct MockInvoker {
    config: LlmConfig,
    responses: Mutex<VecDeque<Result<String>>>,
    calls: AtomicUsize,
}

impl MockInvoker {
    /// Create a mock with no scripted responses.
    pub fn new() -> Self {
        Self {
            config: LlmConfig::default(),
            responses: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a mock that returns a single fixed response.
    pub fn with_response(response: impl Into<String>) -> Self {
        Self::new().push_response(response)
    }

    /// Queue a successful response.
    pub fn push_response(self, response: impl Into<String>) -> Self {
        self.queue().push_back(Ok(response.into()));
        self
    }

    /// Queue a failure.
    pub fn push_failure(self, err: LarderError) -> Self {
        self.queue().push_back(Err(err));
        self
    }

    /// Number of completions requested so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn queue(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String>>> {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockInvoker {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelInvoker for MockInvoker {
    fn complete(&self, _prompt: &str, _image: Option<&ImagePayload>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queue().pop_front().unwrap_or_else(|| {
            Err(LarderError::ModelRefused(
                "mock invoker has no scripted response".to_string(),
            ))
        })
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_responses_return_in_order() {
        let mock = MockInvoker::new().push_response("first").push_response("second");

        assert_eq!(mock.complete("p", None).unwrap(), "first");
        assert_eq!(mock.complete("p", None).unwrap(), "second");
        assert_eq!(mock.call_count(), 2);
    }

    #[test]
    fn test_exhausted_mock_refuses() {
        let mock = MockInvoker::new();
        assert!(matches!(
            mock.complete("p", None),
            Err(LarderError::ModelRefused(_))
        ));
    }

    #[test]
    fn test_scripted_failure() {
        let mock = MockInvoker::new().push_failure(LarderError::Timeout(30));
        assert!(matches!(mock.complete("p", None), Err(LarderError::Timeout(30))));
    }
}
