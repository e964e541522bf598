pub type RequestId = u64;

/// The three independent round trips the client can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    PromptEnhancement,
    ImageGeneration,
    BackgroundRemoval,
}

impl Operation {
    /// Prompt enhancement shows a loading line instead of an elapsed-time counter.
    pub fn has_timer(self) -> bool {
        !matches!(self, Operation::PromptEnhancement)
    }

    fn failure_fallback(self) -> &'static str {
        match self {
            Operation::PromptEnhancement => "Failed to enhance prompt.",
            Operation::ImageGeneration => "Failed to generate image.",
            Operation::BackgroundRemoval => "Failed to remove background.",
        }
    }
}

pub const TIMEOUT_MESSAGE: &str = "Request timeout. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFailure {
    Timeout,
    Network(String),
    /// Non-2xx response; `message` is the server's `error` field when present.
    Server { status: u16, message: Option<String> },
    InvalidResponse(String),
    Cancelled,
}

impl RequestFailure {
    /// Text shown after `Error: ` in the results panel.
    pub fn user_message(&self, operation: Operation) -> String {
        match self {
            RequestFailure::Timeout => TIMEOUT_MESSAGE.to_string(),
            RequestFailure::Server {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            RequestFailure::Server { .. } => operation.failure_fallback().to_string(),
            RequestFailure::Network(message) if !message.trim().is_empty() => message.clone(),
            RequestFailure::Network(_) => operation.failure_fallback().to_string(),
            RequestFailure::InvalidResponse(_) => "Unexpected response from server.".to_string(),
            RequestFailure::Cancelled => "Request cancelled.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase<T> {
    Idle,
    InFlight { request_id: RequestId },
    Succeeded(T),
    Failed(RequestFailure),
}

/// One feature's request lifecycle. At most one request is in flight at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature<T> {
    phase: Phase<T>,
}

impl<T> Default for Feature<T> {
    fn default() -> Self {
        Self { phase: Phase::Idle }
    }
}

impl<T> Feature<T> {
    pub fn phase(&self) -> &Phase<T> {
        &self.phase
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.phase, Phase::InFlight { .. })
    }

    /// Moves to `InFlight`. Refused while another request is outstanding.
    pub(crate) fn begin(&mut self, request_id: RequestId) -> bool {
        if self.is_in_flight() {
            return false;
        }
        self.phase = Phase::InFlight { request_id };
        true
    }

    /// Applies a completion. Stale or unexpected completions are dropped.
    pub(crate) fn finish(&mut self, request_id: RequestId, result: Result<T, RequestFailure>) -> bool {
        match self.phase {
            Phase::InFlight { request_id: current } if current == request_id => {
                self.phase = match result {
                    Ok(value) => Phase::Succeeded(value),
                    Err(failure) => Phase::Failed(failure),
                };
                true
            }
            _ => false,
        }
    }

    pub(crate) fn cancel(&mut self) -> bool {
        if self.is_in_flight() {
            self.phase = Phase::Failed(RequestFailure::Cancelled);
            true
        } else {
            false
        }
    }
}
