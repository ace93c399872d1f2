#![forbid(unsafe_code)]

//! Editing environments.
//!
//! Exactly one [`Environment`] is active at any time. The environment decides
//! three things and nothing else:
//!
//! 1. the placeholder shown in an empty editor,
//! 2. whether the tokenizer runs in math mode,
//! 3. how the source is wrapped before it is sent to the compiler.
//!
//! # Wrapping
//!
//! ```
//! use typlive_core::Environment;
//!
//! assert_eq!(Environment::Passage.wrap("x^2"), "x^2");
//! assert_eq!(Environment::InlineFormula.wrap("x^2"), "$x^2$");
//! assert_eq!(Environment::InterlineFormula.wrap("x^2"), "$ x^2 $");
//! ```
//!
//! The surrounding spaces of the interline form are part of the compiler
//! contract: Typst renders `$ ... $` as a display equation and `$...$`
//! inline.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseEnvironmentError;

/// One of the mutually exclusive editing modes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Environment {
    /// Free-form Typst markup, sent verbatim.
    Passage,
    /// A formula rendered inline: `$...$`.
    InlineFormula,
    /// A display formula on its own line: `$ ... $`.
    #[default]
    InterlineFormula,
}

impl Environment {
    /// All environments in toolbar order.
    pub const ALL: [Self; 3] = [Self::Passage, Self::InlineFormula, Self::InterlineFormula];

    /// Number of environments.
    pub const COUNT: usize = Self::ALL.len();

    /// Stable slot index, used to address per-environment storage.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Passage => 0,
            Self::InlineFormula => 1,
            Self::InterlineFormula => 2,
        }
    }

    /// Kebab-case identifier shared with the page (`data-environment`) and
    /// the like/favorites API.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Passage => "passage",
            Self::InlineFormula => "inline-formula",
            Self::InterlineFormula => "interline-formula",
        }
    }

    /// Whether the tokenizer should start in math mode.
    #[inline]
    #[must_use]
    pub const fn is_math(self) -> bool {
        !matches!(self, Self::Passage)
    }

    /// Placeholder text for an empty editor.
    #[must_use]
    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::Passage => "Input Typst passage code Here",
            Self::InlineFormula => "Input Typst inline formula Here",
            Self::InterlineFormula => "Input Typst display formula Here",
        }
    }

    /// Tooltip for the environment's toolbar button.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Passage => "Passage mode",
            Self::InlineFormula => "Inline formula mode",
            Self::InterlineFormula => "Display formula mode",
        }
    }

    /// DOM id of the environment's toolbar button.
    #[must_use]
    pub const fn button_id(self) -> &'static str {
        match self {
            Self::Passage => "passage-btn",
            Self::InlineFormula => "inline-formula-btn",
            Self::InterlineFormula => "interline-formula-btn",
        }
    }

    /// Wrap `source` into the payload the compiler expects.
    #[must_use]
    pub fn wrap(self, source: &str) -> String {
        match self {
            Self::Passage => source.to_owned(),
            Self::InlineFormula => format!("${source}$"),
            Self::InterlineFormula => format!("$ {source} $"),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Environment {
    type Err = ParseEnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|env| env.id() == s)
            .ok_or_else(|| ParseEnvironmentError {
                input: s.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn wrapping_matches_compiler_contract() {
        assert_eq!(Environment::Passage.wrap("x^2"), "x^2");
        assert_eq!(Environment::InlineFormula.wrap("x^2"), "$x^2$");
        assert_eq!(Environment::InterlineFormula.wrap("x^2"), "$ x^2 $");
    }

    #[test]
    fn math_mode_is_everything_but_passage() {
        assert!(!Environment::Passage.is_math());
        assert!(Environment::InlineFormula.is_math());
        assert!(Environment::InterlineFormula.is_math());
    }

    #[test]
    fn indices_are_dense_and_unique() {
        for (expected, env) in Environment::ALL.into_iter().enumerate() {
            assert_eq!(env.index(), expected);
        }
    }

    #[test]
    fn parse_round_trips_ids() {
        for env in Environment::ALL {
            assert_eq!(env.id().parse::<Environment>(), Ok(env));
            assert_eq!(env.to_string(), env.id());
        }
    }

    #[test]
    fn parse_rejects_unknown_id() {
        let err = "display".parse::<Environment>().unwrap_err();
        assert_eq!(err.input, "display");
        assert!(err.to_string().contains("display"));
    }

    #[test]
    fn serde_uses_kebab_case_ids() {
        let json = serde_json::to_string(&Environment::InlineFormula).unwrap();
        assert_eq!(json, "\"inline-formula\"");
        let back: Environment = serde_json::from_str("\"interline-formula\"").unwrap();
        assert_eq!(back, Environment::InterlineFormula);
    }

    #[test]
    fn default_is_display_formula() {
        assert_eq!(Environment::default(), Environment::InterlineFormula);
    }
}
