//! Bridge between the synchronous draw loop and the async backend calls.
//! Every request runs as its own tokio task and reports back through an
//! unbounded channel that the view drains once per tick.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::{ApiError, RosterClient};
use crate::models::{MarksUpdate, Student, StudentDraft};

/// Completion of a remote call, handed back to the UI loop so it can be
/// applied to the state as it is when the response arrives.
#[derive(Debug)]
pub enum RemoteEvent {
    Loaded(Result<Vec<Student>, ApiError>),
    Created(Result<Student, ApiError>),
    MarksUpdated {
        student_id: String,
        result: Result<Student, ApiError>,
    },
}

/// Spawns roster requests on the tokio runtime. Requests are not
/// deduplicated and never cancelled.
pub(crate) struct RemoteDispatcher {
    client: Arc<RosterClient>,
    runtime: Handle,
    tx: UnboundedSender<RemoteEvent>,
}

impl RemoteDispatcher {
    pub(crate) fn new(client: RosterClient, runtime: Handle) -> (Self, UnboundedReceiver<RemoteEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            client: Arc::new(client),
            runtime,
            tx,
        };
        (dispatcher, rx)
    }

    pub(crate) fn fetch_students(&self) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = client.fetch_students().await;
            deliver(&tx, RemoteEvent::Loaded(result));
        });
    }

    pub(crate) fn create_student(&self, draft: StudentDraft) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = client.create_student(&draft).await;
            deliver(&tx, RemoteEvent::Created(result));
        });
    }

    pub(crate) fn update_marks(&self, update: MarksUpdate) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = client.update_marks(&update).await;
            deliver(
                &tx,
                RemoteEvent::MarksUpdated {
                    student_id: update.student_id,
                    result,
                },
            );
        });
    }
}

/// The receiver disappears with the view; a late result is dropped and
/// `false` is returned.
fn deliver(tx: &UnboundedSender<RemoteEvent>, event: RemoteEvent) -> bool {
    match tx.send(event) {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(event = ?err.0, "view closed before response arrived");
            false
        }
    }
}
