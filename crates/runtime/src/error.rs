//! Unified error types surfaced by the session API.
//!
//! Wraps failures from worker coordination and from the inventory rules so
//! clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use inventory_core::{InventoryError, ItemId};

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("session worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("item {id} is not in the catalog")]
    UnknownItem { id: ItemId },

    #[error(transparent)]
    Inventory(#[from] InventoryError),
}
