//! # Admin List Screens
//!
//! State machine shared by the admin orders and users screens: fetch a list,
//! show it, delete a row, refetch.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  FetchRequest ──► loading ──┬── FetchSuccess(rows) ──► rows shown       │
//! │                             └── FetchFail(msg) ─────► error shown       │
//! │                                                                         │
//! │  DeleteRequest ──► loading_delete ──┬── DeleteSuccess ──► success_delete│
//! │                                     └── DeleteFail ─────► idle          │
//! │                                                                         │
//! │  next_effect(): success_delete ? Reset (DeleteReset) : Fetch           │
//! │  so a successful delete resets once, then the list is fetched again.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

/// State of one admin list screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListState<T> {
    pub loading: bool,
    pub items: Vec<T>,
    pub error: Option<String>,
    pub loading_delete: bool,
    pub success_delete: bool,
}

impl<T> Default for ListState<T> {
    /// A screen starts out loading with no rows.
    fn default() -> Self {
        ListState {
            loading: true,
            items: Vec::new(),
            error: None,
            loading_delete: false,
            success_delete: false,
        }
    }
}

/// Events driving a [`ListState`].
#[derive(Debug, Clone, PartialEq)]
pub enum ListAction<T> {
    FetchRequest,
    FetchSuccess(Vec<T>),
    FetchFail(String),
    DeleteRequest,
    DeleteSuccess,
    DeleteFail,
    DeleteReset,
}

/// What the screen should do after rendering the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEffect {
    /// Load (or reload) the rows.
    Fetch,
    /// Acknowledge a finished delete with [`ListAction::DeleteReset`].
    Reset,
}

impl<T> ListState<T> {
    pub fn new() -> Self {
        ListState::default()
    }

    /// Pure transition to the next state.
    pub fn reduce(self, action: ListAction<T>) -> Self {
        match action {
            ListAction::FetchRequest => ListState {
                loading: true,
                error: None,
                ..self
            },
            ListAction::FetchSuccess(items) => ListState {
                loading: false,
                items,
                error: None,
                ..self
            },
            ListAction::FetchFail(message) => ListState {
                loading: false,
                error: Some(message),
                ..self
            },
            ListAction::DeleteRequest => ListState {
                loading_delete: true,
                ..self
            },
            ListAction::DeleteSuccess => ListState {
                loading_delete: false,
                success_delete: true,
                ..self
            },
            ListAction::DeleteFail => ListState {
                loading_delete: false,
                ..self
            },
            ListAction::DeleteReset => ListState {
                loading_delete: false,
                success_delete: false,
                ..self
            },
        }
    }

    pub fn next_effect(&self) -> ListEffect {
        if self.success_delete {
            ListEffect::Reset
        } else {
            ListEffect::Fetch
        }
    }
}
