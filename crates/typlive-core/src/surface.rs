#![forbid(unsafe_code)]

//! Text surface capability.
//!
//! The editing widget (CodeMirror on the page, an in-memory buffer in tests)
//! is an external collaborator. The runtime only needs the operations of
//! [`TextSurface`]; change notifications flow the other way, as
//! [`ChangeEvent`](crate::ChangeEvent)s pushed by the host.
//!
//! Implementations must report programmatic writes with
//! [`ChangeOrigin::Programmatic`](crate::ChangeOrigin) if they report them at
//! all.

/// Capability-based text editing surface.
pub trait TextSurface {
    /// Whether the rich editor is initialized.
    ///
    /// While this is `false` the runtime keeps content in its own fallback
    /// buffer and does not call the other methods.
    fn is_ready(&self) -> bool {
        true
    }

    /// Current content.
    fn value(&self) -> String;

    /// Replace the content and refresh the surface.
    fn set_value(&mut self, value: &str);

    /// Move keyboard focus to the surface.
    fn focus(&mut self);

    /// Switch the tokenizer between markup and math mode.
    fn set_math_mode(&mut self, math: bool) {
        let _ = math;
    }

    /// Insert `text` at the cursor, then move the cursor back by
    /// `cursor_back` characters.
    ///
    /// Surfaces without a cursor append `text` through
    /// [`set_value`](Self::set_value) and ignore `cursor_back`.
    fn insert_text(&mut self, text: &str, cursor_back: usize) {
        let _ = cursor_back;
        let mut value = self.value();
        value.push_str(text);
        self.set_value(&value);
    }
}

impl<S: TextSurface + ?Sized> TextSurface for &mut S {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn value(&self) -> String {
        (**self).value()
    }

    fn set_value(&mut self, value: &str) {
        (**self).set_value(value);
    }

    fn focus(&mut self) {
        (**self).focus();
    }

    fn set_math_mode(&mut self, math: bool) {
        (**self).set_math_mode(math);
    }

    fn insert_text(&mut self, text: &str, cursor_back: usize) {
        (**self).insert_text(text, cursor_back);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Plain {
        text: String,
        focused: bool,
    }

    impl TextSurface for Plain {
        fn value(&self) -> String {
            self.text.clone()
        }

        fn set_value(&mut self, value: &str) {
            value.clone_into(&mut self.text);
        }

        fn focus(&mut self) {
            self.focused = true;
        }
    }

    fn load(surface: &mut impl TextSurface, text: &str) {
        surface.set_value(text);
        surface.set_math_mode(true);
        surface.focus();
    }

    #[test]
    fn optional_capabilities_have_defaults() {
        let mut plain = Plain::default();
        assert!(plain.is_ready());
        load(&mut plain, "abc");
        assert_eq!(plain.value(), "abc");
        assert!(plain.focused);
    }

    #[test]
    fn default_insert_appends_to_value() {
        let mut plain = Plain::default();
        plain.set_value("x = ");
        plain.insert_text("frac() ", 2);
        assert_eq!(plain.value(), "x = frac() ");
    }

    #[test]
    fn mutable_references_forward() {
        let mut plain = Plain::default();
        let mut borrowed = &mut plain;
        load(&mut borrowed, "xyz");
        assert_eq!(plain.text, "xyz");
    }
}
