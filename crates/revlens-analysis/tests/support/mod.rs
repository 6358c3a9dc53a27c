//! Scripted in-memory completion service shared by the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use revlens_llm::{CompletionRequest, CompletionService, LlmError};

type Responder = dyn Fn(&CompletionRequest, usize) -> Result<String, LlmError> + Send + Sync;
type Delay = dyn Fn(&CompletionRequest) -> Duration + Send + Sync;

/// Records every request and answers with a caller-supplied function of
/// `(request, 1-based call number)`.
pub struct ScriptedService {
    calls: Mutex<Vec<CompletionRequest>>,
    responder: Box<Responder>,
    delay: Option<Box<Delay>>,
}

impl ScriptedService {
    pub fn new(
        responder: impl Fn(&CompletionRequest, usize) -> Result<String, LlmError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
            delay: None,
        }
    }

    /// Answers `"analysis of <last char of prompt>"` for chunk calls and
    /// `"REPORT:" + prompt` for merge calls.
    pub fn echo() -> Self {
        Self::new(|request, _| Ok(echo_response(request)))
    }

    /// Like [`echo`](Self::echo) but fails on call number `n`.
    pub fn failing_on(n: usize) -> Self {
        Self::new(move |request, call| {
            if call == n {
                Err(LlmError::Status {
                    status: 500,
                    message: "injected failure".to_owned(),
                })
            } else {
                Ok(echo_response(request))
            }
        })
    }

    #[must_use]
    pub fn with_delay(
        mut self,
        delay: impl Fn(&CompletionRequest) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.delay = Some(Box::new(delay));
        self
    }

    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

pub fn is_merge_call(request: &CompletionRequest) -> bool {
    request.system.contains("summarizes multiple")
}

fn echo_response(request: &CompletionRequest) -> String {
    if is_merge_call(request) {
        format!("REPORT:{}", request.user)
    } else {
        let last = request.user.chars().last().unwrap_or('?');
        format!("analysis of {last}")
    }
}

impl CompletionService for ScriptedService {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request.clone());
            calls.len()
        };
        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(request)).await;
        }
        (self.responder)(request, call)
    }
}
