use std::sync::Arc;

use super::SourceFile;
use crate::error::{SessionError, TransformError};

const DOWNLOAD_PREFIX: &str = "processed_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Processing,
    Ready,
    Failed,
}

/// Identifies one dispatched transformation request. Results carrying an
/// outdated ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// What the caller must send to the transformation service.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    pub ticket: Ticket,
    pub file_name: String,
    pub data: Arc<[u8]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Download<'a> {
    pub file_name: String,
    pub data: &'a [u8],
}

#[derive(Debug, Clone)]
enum Phase {
    Idle,
    Processing { ticket: Ticket },
    Ready { processed: Vec<u8> },
    Failed { error: String },
}

/// State machine of one upload / transform / result cycle.
///
/// ```text
/// Idle --submit--> Processing --ok--> Ready
///                             --err-> Failed
/// any --select_file--> Idle
/// Ready | Failed --submit--> Processing
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    original: Option<SourceFile>,
    phase: Phase,
    next_ticket: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            original: None,
            phase: Phase::Idle,
            next_ticket: 0,
        }
    }

    pub fn status(&self) -> Status {
        match self.phase {
            Phase::Idle => Status::Idle,
            Phase::Processing { .. } => Status::Processing,
            Phase::Ready { .. } => Status::Ready,
            Phase::Failed { .. } => Status::Failed,
        }
    }

    pub fn original(&self) -> Option<&SourceFile> {
        self.original.as_ref()
    }

    pub fn processed(&self) -> Option<&[u8]> {
        match &self.phase {
            Phase::Ready { processed } => Some(processed),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Replaces the original file and forgets any result or error. A request
    /// still in flight for the previous file will be discarded on arrival.
    pub fn select_file(&mut self, file: SourceFile) {
        tracing::info!("Selected {} ({} bytes)", file.name(), file.data().len());
        self.original = Some(file);
        self.phase = Phase::Idle;
    }

    /// Moves to `Processing` and returns the request to dispatch.
    ///
    /// Returns `Ok(None)` without dispatching anything while a request is
    /// already in flight.
    pub fn submit(&mut self) -> Result<Option<TransformRequest>, SessionError> {
        let original = self.original.as_ref().ok_or(SessionError::NoFileSelected)?;
        if let Phase::Processing { .. } = self.phase {
            return Ok(None);
        }

        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        let request = TransformRequest {
            ticket,
            file_name: original.name().to_string(),
            data: original.shared_data(),
        };
        self.phase = Phase::Processing { ticket };

        Ok(Some(request))
    }

    /// Applies the outcome of the request identified by `ticket`.
    ///
    /// Returns false when the session has moved on since that request was
    /// made, in which case the outcome is dropped.
    pub fn complete(&mut self, ticket: Ticket, outcome: Result<Vec<u8>, TransformError>) -> bool {
        match self.phase {
            Phase::Processing { ticket: current } if current == ticket => {}
            _ => {
                tracing::debug!("Discarding stale response for {:?}", ticket);
                return false;
            }
        }

        self.phase = match outcome {
            Ok(processed) => {
                tracing::info!("Processing finished ({} bytes)", processed.len());
                Phase::Ready { processed }
            }
            Err(err) => {
                tracing::warn!("Processing failed: {}", err);
                Phase::Failed {
                    error: user_message(&err),
                }
            }
        };
        true
    }

    /// The processed bytes, untouched, under the name `processed_<original>`.
    pub fn request_download(&self) -> Result<Download<'_>, SessionError> {
        match (&self.phase, &self.original) {
            (Phase::Ready { processed }, Some(original)) => Ok(Download {
                file_name: format!("{}{}", DOWNLOAD_PREFIX, original.name()),
                data: processed,
            }),
            _ => Err(SessionError::NotReady),
        }
    }
}

fn user_message(err: &TransformError) -> String {
    match err {
        TransformError::Service(message) => message.clone(),
        TransformError::TimedOut => "The processing service did not respond in time".to_string(),
        TransformError::Transport(_) => "Could not reach the processing service".to_string(),
    }
}
