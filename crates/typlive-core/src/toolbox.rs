#![forbid(unsafe_code)]

//! Symbol toolbox catalogue.
//!
//! Static data for the symbol-insertion sidebar plus the two pieces of layout
//! arithmetic the page needs: how many columns a detail panel gets, and after
//! which group button an inline detail panel is inserted.

/// Group buttons per row in the toolbox grid.
pub const GROUPS_PER_ROW: usize = 3;

/// One insertable symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolItem {
    /// What the button shows.
    pub display: &'static str,
    /// Typst code inserted into the editor.
    pub code: &'static str,
    /// Tooltip.
    pub desc: &'static str,
    /// Characters to move the cursor back after insertion, e.g. into `()`.
    pub cursor_back: usize,
}

impl ToolItem {
    const fn new(display: &'static str, code: &'static str, desc: &'static str) -> Self {
        Self {
            display,
            code,
            desc,
            cursor_back: 0,
        }
    }

    const fn with_cursor_back(mut self, cursor_back: usize) -> Self {
        self.cursor_back = cursor_back;
        self
    }

    /// Text and cursor movement for inserting this item.
    ///
    /// A trailing space separates the symbol from whatever is typed next.
    #[must_use]
    pub fn insertion(&self) -> Insertion {
        Insertion {
            text: format!("{} ", self.code),
            cursor_back: self.cursor_back,
        }
    }
}

/// Text to insert at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    /// Inserted text.
    pub text: String,
    /// Characters to move the cursor back afterwards.
    pub cursor_back: usize,
}

/// A named group of symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolGroup {
    /// Stable id.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Icon text for the group button.
    pub icon: &'static str,
    /// Symbols in the group.
    pub items: &'static [ToolItem],
}

impl ToolGroup {
    /// Column count for this group's detail panel.
    #[must_use]
    pub fn panel_columns(&self) -> usize {
        panel_columns(self.items)
    }
}

/// The built-in catalogue.
pub static CATALOGUE: &[ToolGroup] = &[
    ToolGroup {
        id: "greek_lower",
        name: "Greek",
        icon: "αβγπ",
        items: &[
            ToolItem::new("α", "alpha", "alpha"),
            ToolItem::new("β", "beta", "beta"),
            ToolItem::new("γ", "gamma", "gamma"),
            ToolItem::new("π", "pi", "pi"),
            ToolItem::new("φ", "phi", "phi"),
            ToolItem::new("ω", "omega", "omega"),
        ],
    },
    ToolGroup {
        id: "arrows",
        name: "Arrows",
        icon: "→",
        items: &[
            ToolItem::new("→", "arrow.r", "Right Arrow"),
            ToolItem::new("←", "arrow.l", "Left Arrow"),
            ToolItem::new("↔", "arrow.l.r", "Left-Right Arrow"),
            ToolItem::new("⇒", "arrow.r.double", "Implies"),
            ToolItem::new("⇔", "arrow.l.r.double", "Equivalent"),
            ToolItem::new("↦", "arrow.r.bar", "Maps to"),
        ],
    },
    ToolGroup {
        id: "math_func",
        name: "Functions",
        icon: "ƒ",
        items: &[
            ToolItem::new("frac", "frac()", "Fraction").with_cursor_back(2),
            ToolItem::new("√", "sqrt()", "Square Root").with_cursor_back(2),
            ToolItem::new("txt", "text()", "Text Mode").with_cursor_back(2),
            ToolItem::new("\"\"", "\"\"", "Quote").with_cursor_back(2),
        ],
    },
    ToolGroup {
        id: "math",
        name: "Math",
        icon: "∑",
        items: &[
            ToolItem::new("+", "plus", "Plus"),
            ToolItem::new("∑", "sum", "Sum"),
            ToolItem::new("sub", "_", "Subscript"),
            ToolItem::new("sup", "^", "Superscript"),
        ],
    },
];

/// Look up a group by id.
#[must_use]
pub fn find_group(id: &str) -> Option<&'static ToolGroup> {
    CATALOGUE.iter().find(|group| group.id == id)
}

/// Column count for a detail panel, driven by the longest code.
#[must_use]
pub fn panel_columns(items: &[ToolItem]) -> usize {
    let longest = items
        .iter()
        .map(|item| item.code.chars().count())
        .max()
        .unwrap_or(0);
    match longest {
        0..=4 => 6,
        5..=8 => 4,
        9..=24 => 3,
        _ => 2,
    }
}

/// Index of the group button after which the detail panel for the group at
/// `index` is inserted: the last button of that group's row.
///
/// Returns `None` when `index` is out of range.
#[must_use]
pub fn panel_anchor(index: usize, group_count: usize) -> Option<usize> {
    if index >= group_count {
        return None;
    }
    let row = index / GROUPS_PER_ROW;
    Some(((row + 1) * GROUPS_PER_ROW - 1).min(group_count - 1))
}
