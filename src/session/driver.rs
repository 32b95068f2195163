use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{Receiver, Sender};

use super::{Download, Session, SourceFile, Ticket};
use crate::error::{SessionError, TransformError};
use crate::transform::TransformService;

struct Completion {
    ticket: Ticket,
    outcome: Result<Vec<u8>, TransformError>,
}

/// Runs a [`Session`] against a transformation service without blocking the
/// caller.
///
/// Requests execute on worker threads; their outcomes are queued and only
/// applied to the session from the owning thread, in `poll` or `wait`.
pub struct SessionDriver {
    session: Session,
    service: Arc<dyn TransformService>,
    completion_tx: Sender<Completion>,
    completion_rx: Receiver<Completion>,
}

impl SessionDriver {
    pub fn new(service: Arc<dyn TransformService>) -> Self {
        let (completion_tx, completion_rx) = crossbeam::channel::unbounded();
        Self {
            session: Session::new(),
            service,
            completion_tx,
            completion_rx,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn select_file(&mut self, file: SourceFile) {
        self.session.select_file(file);
    }

    /// Dispatches the selected file. Returns false if a request is already
    /// in flight and nothing new was sent.
    pub fn submit(&mut self) -> Result<bool, SessionError> {
        let Some(request) = self.session.submit()? else {
            return Ok(false);
        };

        let service = self.service.clone();
        let completion_tx = self.completion_tx.clone();
        std::thread::spawn(move || {
            tracing::info!("Sending {} to the processing service", request.file_name);
            let outcome = service.transform(&request.file_name, &request.data);
            let _ = completion_tx.send(Completion {
                ticket: request.ticket,
                outcome,
            });
        });

        Ok(true)
    }

    /// Applies every outcome that has arrived. Returns how many changed the
    /// session.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completion_rx.try_recv() {
            if self.apply(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Blocks until one outcome arrives or `timeout` elapses, then applies it.
    /// Returns whether it changed the session.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        match self.completion_rx.recv_timeout(timeout) {
            Ok(completion) => self.apply(completion),
            Err(_) => false,
        }
    }

    pub fn request_download(&self) -> Result<Download<'_>, SessionError> {
        self.session.request_download()
    }

    fn apply(&mut self, completion: Completion) -> bool {
        self.session.complete(completion.ticket, completion.outcome)
    }
}
