#![forbid(unsafe_code)]

//! Environment controller.
//!
//! Mediates between the [`TextSurface`] and the [`EnvironmentStore`]: saves
//! the outgoing buffer before every switch, loads the incoming one, and keeps
//! the surface's math mode and the view's affordances in step with the active
//! environment.
//!
//! # Degraded surfaces
//!
//! While [`TextSurface::is_ready`] is `false` the controller keeps content in
//! a raw fallback buffer instead of calling the surface. The fallback mirrors
//! every load, so nothing is lost once the surface comes up.

use tracing::debug;
use typlive_core::{ChangeEvent, ChangeOrigin, Environment, EnvironmentStore, TextSurface};

use crate::view::ViewState;

/// Owns the per-environment buffers and drives the surface on switches.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentController {
    store: EnvironmentStore,
    fallback: String,
}

impl EnvironmentController {
    /// Create a controller with `initial` active and all buffers empty.
    #[must_use]
    pub fn new(initial: Environment) -> Self {
        Self {
            store: EnvironmentStore::new(initial),
            fallback: String::new(),
        }
    }

    /// Create a controller around an existing store (e.g. restored from a
    /// snapshot).
    #[must_use]
    pub fn with_store(store: EnvironmentStore) -> Self {
        let fallback = store.current_buffer().to_owned();
        Self { store, fallback }
    }

    /// The buffers.
    #[inline]
    #[must_use]
    pub const fn store(&self) -> &EnvironmentStore {
        &self.store
    }

    /// The active environment.
    #[inline]
    #[must_use]
    pub const fn current(&self) -> Environment {
        self.store.current()
    }

    /// Apply the active environment to the surface and view, and load its
    /// buffer if it has content.
    pub fn init<S: TextSurface>(&mut self, surface: &mut S, view: &mut ViewState) {
        let env = self.current();
        view.apply_environment(env);
        if !self.store.current_buffer().is_empty() {
            let content = self.store.current_buffer().to_owned();
            self.load(surface, &content);
        }
        if surface.is_ready() {
            surface.set_math_mode(env.is_math());
        }
        debug!(target: "typlive.env", env = %env, "environment initialised");
    }

    /// Make `next` active. Returns `false` when `next` was already active, in
    /// which case only the live content is flushed into its buffer.
    pub fn switch<S: TextSurface>(
        &mut self,
        surface: &mut S,
        next: Environment,
        view: &mut ViewState,
    ) -> bool {
        let outgoing = self.read(surface);
        let previous = self.current();
        if previous == next {
            self.store.write_current(outgoing);
            debug!(target: "typlive.env", env = %next, "already active");
            return false;
        }

        let incoming = self.store.select(outgoing, next).to_owned();
        if surface.is_ready() {
            surface.set_math_mode(next.is_math());
        }
        view.apply_environment(next);
        self.load(surface, &incoming);
        if surface.is_ready() {
            surface.focus();
        }
        view.reset_preview();

        debug!(
            target: "typlive.env",
            from = %previous,
            to = %next,
            loaded_len = incoming.len(),
            "environment switched"
        );
        true
    }

    /// Empty the surface and the active buffer, and reset the preview.
    pub fn clear_current<S: TextSurface>(&mut self, surface: &mut S, view: &mut ViewState) {
        self.load(surface, "");
        if surface.is_ready() {
            surface.focus();
        }
        self.store.clear_current();
        view.reset_preview();
        debug!(target: "typlive.env", env = %self.current(), "buffer cleared");
    }

    /// Record a surface change. Returns `true` for user edits, which were
    /// written to the active buffer; programmatic echoes are ignored.
    pub fn record_change(&mut self, change: &ChangeEvent) -> bool {
        match change.origin {
            ChangeOrigin::User => {
                self.fallback.clone_from(&change.value);
                self.store.write_current(change.value.clone());
                true
            }
            ChangeOrigin::Programmatic => false,
        }
    }

    /// Insert `text` at the cursor and resync the active buffer.
    pub fn insert<S: TextSurface>(&mut self, surface: &mut S, text: &str, cursor_back: usize) {
        if surface.is_ready() {
            surface.insert_text(text, cursor_back);
            surface.focus();
            self.fallback = surface.value();
        } else {
            self.fallback.push_str(text);
        }
        self.store.write_current(self.fallback.clone());
        debug!(target: "typlive.env", text = %text, cursor_back, "symbol inserted");
    }

    /// Current source text of the active environment.
    #[must_use]
    pub fn source<S: TextSurface>(&self, surface: &S) -> String {
        self.read(surface)
    }

    fn read<S: TextSurface>(&self, surface: &S) -> String {
        if surface.is_ready() {
            surface.value()
        } else {
            self.fallback.clone()
        }
    }

    fn load<S: TextSurface>(&mut self, surface: &mut S, content: &str) {
        content.clone_into(&mut self.fallback);
        if surface.is_ready() {
            surface.set_value(content);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{Placeholder, Preview};

    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Surface {
        text: String,
        math: Option<bool>,
        focused: u32,
        sets: u32,
        down: bool,
    }

    impl TextSurface for Surface {
        fn is_ready(&self) -> bool {
            !self.down
        }

        fn value(&self) -> String {
            self.text.clone()
        }

        fn set_value(&mut self, value: &str) {
            self.sets += 1;
            value.clone_into(&mut self.text);
        }

        fn focus(&mut self) {
            self.focused += 1;
        }

        fn set_math_mode(&mut self, math: bool) {
            self.math = Some(math);
        }

        fn insert_text(&mut self, text: &str, _cursor_back: usize) {
            self.text.push_str(text);
        }
    }

    fn type_text(ctl: &mut EnvironmentController, surface: &mut Surface, text: &str) {
        text.clone_into(&mut surface.text);
        assert!(ctl.record_change(&ChangeEvent::user(text)));
    }

    #[test]
    fn init_applies_math_mode_and_skips_empty_load() {
        let mut ctl = EnvironmentController::new(Environment::InterlineFormula);
        let mut surface = Surface::default();
        let mut view = ViewState::new(Environment::Passage);
        ctl.init(&mut surface, &mut view);
        assert_eq!(surface.math, Some(true));
        assert_eq!(surface.sets, 0);
        assert_eq!(view.environment, Environment::InterlineFormula);
    }

    #[test]
    fn switch_saves_outgoing_and_loads_incoming() {
        let mut ctl = EnvironmentController::new(Environment::Passage);
        let mut surface = Surface::default();
        let mut view = ViewState::new(Environment::Passage);
        ctl.init(&mut surface, &mut view);

        type_text(&mut ctl, &mut surface, "= Title");
        assert!(ctl.switch(&mut surface, Environment::InlineFormula, &mut view));
        assert_eq!(surface.text, "");
        assert_eq!(surface.math, Some(true));
        assert_eq!(view.placeholder, Environment::InlineFormula.placeholder());

        type_text(&mut ctl, &mut surface, "x^2");
        assert!(ctl.switch(&mut surface, Environment::Passage, &mut view));
        assert_eq!(surface.text, "= Title");
        assert_eq!(surface.math, Some(false));
        assert_eq!(ctl.store().buffer(Environment::InlineFormula), "x^2");
    }

    #[test]
    fn switch_flushes_unreported_surface_content() {
        let mut ctl = EnvironmentController::new(Environment::Passage);
        let mut surface = Surface::default();
        let mut view = ViewState::new(Environment::Passage);
        // Content the host never reported as a change.
        surface.text = "typed".into();
        ctl.switch(&mut surface, Environment::InlineFormula, &mut view);
        assert_eq!(ctl.store().buffer(Environment::Passage), "typed");
    }

    #[test]
    fn switch_resets_preview_and_error() {
        let mut ctl = EnvironmentController::new(Environment::Passage);
        let mut surface = Surface::default();
        let mut view = ViewState::new(Environment::Passage);
        view.show_rendered("<svg/>".into());
        view.show_failure("boom".into());

        ctl.switch(&mut surface, Environment::InterlineFormula, &mut view);
        assert_eq!(view.preview, Preview::Placeholder(Placeholder::Idle));
        assert_eq!(view.error, None);
    }

    #[test]
    fn same_environment_switch_is_idempotent() {
        let mut ctl = EnvironmentController::new(Environment::Passage);
        let mut surface = Surface::default();
        let mut view = ViewState::new(Environment::Passage);
        view.show_rendered("<svg/>".into());
        surface.text = "abc".into();

        assert!(!ctl.switch(&mut surface, Environment::Passage, &mut view));
        assert_eq!(surface.sets, 0);
        assert_eq!(surface.focused, 0);
        assert!(matches!(view.preview, Preview::Rendered { .. }));
        assert_eq!(ctl.store().buffer(Environment::Passage), "abc");
    }

    #[test]
    fn programmatic_changes_are_ignored() {
        let mut ctl = EnvironmentController::new(Environment::Passage);
        assert!(!ctl.record_change(&ChangeEvent::programmatic("loaded")));
        assert_eq!(ctl.store().current_buffer(), "");
    }

    #[test]
    fn clear_current_empties_surface_and_buffer() {
        let mut ctl = EnvironmentController::new(Environment::InlineFormula);
        let mut surface = Surface::default();
        let mut view = ViewState::new(Environment::InlineFormula);
        type_text(&mut ctl, &mut surface, "a+b");
        view.show_failure("x".into());

        ctl.clear_current(&mut surface, &mut view);
        assert_eq!(surface.text, "");
        assert_eq!(ctl.store().current_buffer(), "");
        assert_eq!(view.error, None);
        assert_eq!(surface.focused, 1);
    }

    #[test]
    fn insert_resyncs_buffer() {
        let mut ctl = EnvironmentController::new(Environment::InlineFormula);
        let mut surface = Surface::default();
        type_text(&mut ctl, &mut surface, "x + ");
        ctl.insert(&mut surface, "alpha ", 0);
        assert_eq!(ctl.store().current_buffer(), "x + alpha ");
    }

    #[test]
    fn degraded_surface_uses_fallback() {
        let mut ctl = EnvironmentController::new(Environment::Passage);
        let mut surface = Surface {
            down: true,
            ..Surface::default()
        };
        let mut view = ViewState::new(Environment::Passage);

        assert!(ctl.record_change(&ChangeEvent::user("raw text")));
        assert_eq!(ctl.source(&surface), "raw text");

        ctl.switch(&mut surface, Environment::InlineFormula, &mut view);
        assert_eq!(ctl.store().buffer(Environment::Passage), "raw text");
        assert_eq!(ctl.source(&surface), "");
        assert_eq!(surface.sets, 0);
        assert_eq!(surface.math, None);

        ctl.insert(&mut surface, "pi ", 0);
        assert_eq!(ctl.store().current_buffer(), "pi ");
    }

    #[test]
    fn with_store_starts_from_snapshot() {
        let mut store = EnvironmentStore::new(Environment::Passage);
        store.write_current("kept");
        let ctl = EnvironmentController::with_store(store);
        let surface = Surface {
            down: true,
            ..Surface::default()
        };
        assert_eq!(ctl.source(&surface), "kept");
    }
}
