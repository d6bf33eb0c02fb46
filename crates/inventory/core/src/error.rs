//! Error types for container lifecycle operations.
//!
//! Nothing here is fatal: the worst outcome of any inventory operation is a
//! rejection that leaves state untouched. Slot-level mutation keeps the
//! boolean contracts ([`try_add_item`](crate::ContainerInstance::try_add_item)
//! and friends); these errors cover the places where callers need a reason.

use crate::item::{ContainerKey, ItemKind};

/// Failures when creating or addressing container instances.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContainerError {
    /// The descriptor does not describe a container-type item.
    #[error("item is not a container (kind: {kind})")]
    NotAContainer { kind: ItemKind },

    /// The descriptor carries an empty item id.
    #[error("container descriptor has an invalid item id")]
    InvalidItemId,

    /// No live instance exists for the key.
    #[error("no live container for key {key}")]
    NotLive { key: ContainerKey },

    /// The key fails the container-key shape check.
    #[error("malformed container key {key}")]
    MalformedKey { key: ContainerKey },
}

/// Top-level error for coordinator entry points, which can fail either when
/// addressing the container or when executing the slot command against it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Command(#[from] crate::command::CommandError),
}
