//! Action records and the HTTP verb mapping.
//!
//! # Invariants
//! - Only GET, POST, PUT and DELETE map to an action.
//! - Verb matching ignores ASCII case and surrounding whitespace.

use super::EntityId;
use serde::{Deserialize, Serialize};

/// CRUD-style operation persisted in the `actions` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub action_id: EntityId,
    pub action_name: String,
    pub action_uri: String,
}

/// The fixed set of action names known to the security model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionName {
    Read,
    Create,
    Update,
    Delete,
}

impl ActionName {
    /// Name as stored in `actions.action_name`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "Read",
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

/// HTTP verbs that carry an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpVerb {
    /// Parses a request verb. Returns `None` for verbs without an action
    /// (`PATCH`, `HEAD`, ...).
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        [Self::Get, Self::Post, Self::Put, Self::Delete]
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(value))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    pub fn action_name(self) -> ActionName {
        match self {
            Self::Get => ActionName::Read,
            Self::Post => ActionName::Create,
            Self::Put => ActionName::Update,
            Self::Delete => ActionName::Delete,
        }
    }
}

/// Maps a raw HTTP verb to its action name.
pub fn action_name_for_http_verb(verb: &str) -> Option<ActionName> {
    HttpVerb::parse(verb).map(HttpVerb::action_name)
}
