#![forbid(unsafe_code)]

//! Per-environment source buffers.
//!
//! [`EnvironmentStore`] keeps one buffer per [`Environment`] plus the id of
//! the active one. Only the active buffer is "live" (mirrored by the text
//! surface); the others are frozen snapshots until their environment is
//! selected again.
//!
//! # Switching
//!
//! [`EnvironmentStore::select`] takes the outgoing content explicitly so the
//! flush always happens before the active id changes:
//!
//! ```
//! use typlive_core::{Environment, EnvironmentStore};
//!
//! let mut store = EnvironmentStore::new(Environment::Passage);
//! store.write_current("= Title");
//!
//! let incoming = store.select("= Title, edited".into(), Environment::InlineFormula);
//! assert_eq!(incoming, "");
//! assert_eq!(store.buffer(Environment::Passage), "= Title, edited");
//! ```
//!
//! # Persistence
//!
//! Buffers live for the page session only. [`StoreSnapshot`] is the
//! extension point for durable storage: it is serializable when the
//! `state-persistence` feature is enabled and can be fed back through
//! [`EnvironmentStore::restore`].

use crate::environment::Environment;

/// Buffers for every environment and the currently active environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentStore {
    buffers: [String; Environment::COUNT],
    current: Environment,
}

impl EnvironmentStore {
    /// Create a store with empty buffers and `initial` active.
    #[must_use]
    pub fn new(initial: Environment) -> Self {
        Self {
            buffers: Default::default(),
            current: initial,
        }
    }

    /// The active environment.
    #[inline]
    #[must_use]
    pub const fn current(&self) -> Environment {
        self.current
    }

    /// Content of `env`'s buffer.
    #[must_use]
    pub fn buffer(&self, env: Environment) -> &str {
        &self.buffers[env.index()]
    }

    /// Content of the active buffer.
    #[must_use]
    pub fn current_buffer(&self) -> &str {
        self.buffer(self.current)
    }

    /// Whether the active buffer has no content besides whitespace.
    #[must_use]
    pub fn is_current_blank(&self) -> bool {
        self.current_buffer().trim().is_empty()
    }

    /// Overwrite the active buffer.
    pub fn write_current(&mut self, content: impl Into<String>) {
        self.buffers[self.current.index()] = content.into();
    }

    /// Empty the active buffer.
    pub fn clear_current(&mut self) {
        self.buffers[self.current.index()].clear();
    }

    /// Flush `outgoing` into the active buffer, make `next` active, and
    /// return the content to load for `next`.
    pub fn select(&mut self, outgoing: String, next: Environment) -> &str {
        self.buffers[self.current.index()] = outgoing;
        self.current = next;
        self.current_buffer()
    }

    /// Capture all buffers and the active environment.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            current: self.current,
            passage: self.buffer(Environment::Passage).to_owned(),
            inline_formula: self.buffer(Environment::InlineFormula).to_owned(),
            interline_formula: self.buffer(Environment::InterlineFormula).to_owned(),
        }
    }

    /// Replace all buffers and the active environment with `snapshot`.
    pub fn restore(&mut self, snapshot: StoreSnapshot) {
        self.current = snapshot.current;
        self.buffers = [
            snapshot.passage,
            snapshot.inline_formula,
            snapshot.interline_formula,
        ];
    }
}

impl Default for EnvironmentStore {
    fn default() -> Self {
        Self::new(Environment::default())
    }
}

/// Owned copy of an [`EnvironmentStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
#[cfg_attr(
    feature = "state-persistence",
    serde(default, rename_all = "kebab-case")
)]
pub struct StoreSnapshot {
    /// Active environment at capture time.
    pub current: Environment,
    /// Passage buffer.
    pub passage: String,
    /// Inline formula buffer.
    pub inline_formula: String,
    /// Interline formula buffer.
    pub interline_formula: String,
}
