//! Access policy: who may reach which page, and which notes they may touch.
//!
//! The decision is a pure function of the actor and, for note-scoped
//! operations, of the note's author. Nothing is cached or persisted. A user
//! asking for somebody else's note is told it does not exist.

use serde::{Deserialize, Serialize};

use crate::types::{Note, UserId};

/// The party making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "snake_case")]
pub enum Actor {
    Anonymous,
    User(UserId),
}

impl Actor {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::User(id) => Some(*id),
        }
    }
}

impl From<Option<UserId>> for Actor {
    fn from(user: Option<UserId>) -> Self {
        user.map_or(Self::Anonymous, Self::User)
    }
}

/// Everything a client can ask the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Home,
    Login,
    Signup,
    Logout,
    List,
    Add,
    Success,
    Detail,
    Edit,
    Delete,
}

impl Operation {
    /// Pages anyone may open.
    pub fn is_public(self) -> bool {
        matches!(self, Self::Home | Self::Login | Self::Signup | Self::Logout)
    }

    /// Operations on a single note, reserved for its author.
    pub fn is_note_scoped(self) -> bool {
        matches!(self, Self::Detail | Self::Edit | Self::Delete)
    }
}

/// Why access was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum Denial {
    /// Anonymous actor on a protected page; send them to log in.
    #[error("authentication required")]
    Unauthenticated,
    /// Missing note, or a note owned by someone else.
    #[error("note not found")]
    NotFound,
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Authorized,
    Denied(Denial),
}

impl AccessDecision {
    pub fn is_authorized(self) -> bool {
        matches!(self, Self::Authorized)
    }

    /// Convert into a `Result` for `?` propagation.
    pub fn into_result(self) -> Result<(), Denial> {
        match self {
            Self::Authorized => Ok(()),
            Self::Denied(denial) => Err(denial),
        }
    }
}

/// Decide whether `actor` may perform `operation`.
///
/// `note` is the target of note-scoped operations; passing `None` for one of
/// those means no such note exists.
pub fn check(actor: &Actor, operation: Operation, note: Option<&Note>) -> AccessDecision {
    if operation.is_public() {
        return AccessDecision::Authorized;
    }

    let Some(user) = actor.user_id() else {
        return AccessDecision::Denied(Denial::Unauthenticated);
    };

    if !operation.is_note_scoped() {
        return AccessDecision::Authorized;
    }

    match note {
        Some(note) if note.is_authored_by(user) => AccessDecision::Authorized,
        _ => AccessDecision::Denied(Denial::NotFound),
    }
}
