//! Error type for dead-letter queue operations.

use std::fmt;

/// Errors returned by [`crate::DeadLetterQueue`] operations.
#[derive(Debug)]
pub enum DlqError {
 /// No item exists with the given id.
 ItemNotFound(String),
 /// The requested transition is not valid from the item's current status.
 InvalidTransition {
 id: String,
 from: &'static str,
 action: &'static str,
 },
}

impl fmt::Display for DlqError {
 fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
 match self {
 DlqError::ItemNotFound(id) => write!(f, "no dead-letter item with id {id}"),
 DlqError::InvalidTransition { id, from, action } => {
 write!(f, "cannot {action} item {id} while it is {from}")
 }
 }
 }
}

impl std::error::Error for DlqError {}
