//! Server round-trips issued by the board.
//!
//! Every mutation is followed by a full re-fetch, and the resulting list
//! replaces the board's copy wholesale. Requests are not sequenced: when two
//! are in flight, whichever outcome arrives last wins.

use tokio::sync::mpsc::UnboundedSender;

use crate::client::TaskClient;
use crate::error::ApiError;
use crate::task::{Task, TaskDraft, TaskId};

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Load,
    /// Update when the draft carries an id, create otherwise.
    Save(TaskDraft),
    ChangeStatus(Task),
    Delete(TaskId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Load,
    /// Carries the id of the task being updated, `None` for a create.
    Save(Option<TaskId>),
    ChangeStatus,
    Delete,
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Load => RequestKind::Load,
            Request::Save(draft) => RequestKind::Save(draft.id),
            Request::ChangeStatus(_) => RequestKind::ChangeStatus,
            Request::Delete(_) => RequestKind::Delete,
        }
    }
}

#[derive(Debug)]
pub struct Outcome {
    pub kind: RequestKind,
    /// The mutation went through (always true for `Load`), even if the
    /// re-fetch that followed failed.
    pub committed: bool,
    pub result: Result<Vec<Task>, ApiError>,
}

/// Performs the request's mutation, then fetches the full collection.
///
/// The re-fetch is skipped when the mutation fails.
pub async fn execute(client: &TaskClient, request: &Request) -> Outcome {
    let kind = request.kind();
    if let Err(err) = mutate(client, request).await {
        return Outcome {
            kind,
            committed: false,
            result: Err(err),
        };
    }
    Outcome {
        kind,
        committed: true,
        result: client.list().await,
    }
}

async fn mutate(client: &TaskClient, request: &Request) -> Result<(), ApiError> {
    match request {
        Request::Load => {}
        Request::Save(draft) => match draft.id {
            Some(_) => {
                client.update(&draft.to_task()).await?;
            }
            None => {
                client.create(&draft.to_new_task()).await?;
            }
        },
        Request::ChangeStatus(task) => {
            client.update(task).await?;
        }
        Request::Delete(id) => client.delete(*id).await?,
    }
    Ok(())
}

/// Runs `request` in the background and posts its outcome to `tx`.
pub fn dispatch(client: &TaskClient, request: Request, tx: UnboundedSender<Outcome>) {
    let client = client.clone();
    tokio::spawn(async move {
        let outcome = execute(&client, &request).await;
        if let Err(unsent) = tx.send(outcome) {
            tracing::debug!(
                target: "taskboard.sync",
                kind = ?unsent.0.kind,
                "board gone, dropping outcome"
            );
        }
    });
}
