//! Navigation history for the chat prompt and the side panel.
//!
//! The two stacks follow different push policies:
//!
//! * the chat stack is driven per call site through [`ChatHistoryPolicy`];
//!   each transition decides whether to preserve, skip or clear history.
//! * the panel stack auto-pushes whatever is on screen every time a new
//!   panel is shown, unless [`PanelOptions::clear_history`] is set.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::content::{PanelContent, PromptContent};
use crate::error::JourneyError;

/// Snapshots that can tell whether they show the same thing.
pub trait Snapshot: Clone {
    fn same_view(&self, other: &Self) -> bool;
}

impl Snapshot for PromptContent {
    fn same_view(&self, other: &Self) -> bool {
        self == other
    }
}

/// Panel stack entry: rendered content plus where the reader had scrolled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSnapshot {
    pub content: PanelContent,
    pub scroll_offset: u32,
}

impl Snapshot for PanelSnapshot {
    // Scroll position is restored on pop but does not make a view distinct.
    fn same_view(&self, other: &Self) -> bool {
        self.content == other.content
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    Chat,
    Panel,
}

impl fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Chat => "chat",
            Self::Panel => "panel",
        })
    }
}

/// How a chat prompt update treats the prompt it replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatHistoryPolicy {
    /// Push the outgoing prompt so back can return to it.
    Preserve,
    /// Replace the outgoing prompt without recording it.
    Skip,
    /// Drop all recorded prompts, then replace.
    Clear,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelOptions {
    pub clear_history: bool,
}

impl PanelOptions {
    #[must_use]
    pub const fn clearing() -> Self {
        Self {
            clear_history: true,
        }
    }
}

/// Bounded LIFO of immutable snapshots with duplicate suppression.
#[derive(Debug, Clone)]
pub struct HistoryStack<T> {
    kind: HistoryKind,
    capacity: usize,
    entries: VecDeque<T>,
}

impl<T: Snapshot> HistoryStack<T> {
    /// Create an empty stack; a zero capacity is treated as one.
    #[must_use]
    pub fn new(kind: HistoryKind, capacity: usize) -> Self {
        Self {
            kind,
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    /// Push unless the entry shows the same view as the current top.
    /// Returns whether the entry was stored. The oldest entry is dropped
    /// once capacity is exceeded.
    pub fn push(&mut self, entry: T) -> bool {
        if self
            .entries
            .back()
            .is_some_and(|top| top.same_view(&entry))
        {
            return false;
        }
        self.entries.push_back(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        true
    }

    /// Remove and return the most recent entry.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::EmptyHistory`] when nothing is recorded.
    pub fn pop(&mut self) -> Result<T, JourneyError> {
        self.entries
            .pop_back()
            .ok_or(JourneyError::EmptyHistory { stack: self.kind })
    }

    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.entries.back()
    }

    /// Drives the enabled state of the back control.
    #[must_use]
    pub fn peek_non_empty(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn kind(&self) -> HistoryKind {
        self.kind
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}

pub type ChatHistory = HistoryStack<PromptContent>;
pub type PanelHistory = HistoryStack<PanelSnapshot>;
