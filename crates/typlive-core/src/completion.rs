#![forbid(unsafe_code)]

//! Keyword completion.
//!
//! Matching is a case-insensitive prefix search over [`KEYWORDS`]. A leading
//! `#` (code mode marker) is ignored. Candidates are ranked: exact match
//! first, then shorter words, then alphabetical.
//!
//! ```
//! use typlive_core::completion::complete;
//!
//! assert_eq!(&complete("#in")[..3], &["in", "inf", "int"]);
//! ```

/// Typst keywords, common functions, math functions, and symbol names.
pub static KEYWORDS: &[&str] = &[
    // keywords
    "let", "set", "show", "import", "include", "return", "if", "else", "for", "while", "break",
    "continue", "in", "not", "and", "or", "content", "context", "none", "auto", "arguments",
    // functions
    "heading", "strong", "emph", "link", "image", "rect", "block", "page", "text", "par",
    "align", "grid", "stack", "columns", "colbreak", "list", "enum", "table", "figure",
    "bibliography", "cite", "footnote", "h", "v", "box", "rotate", "scale", "move", "place",
    "counter", "state", "query", "measure", "locate", "style", "layout", "numbering", "panic",
    "assert", "type", "repr", "str", "int", "float", "bool", "rgb", "cmyk", "luma", "color",
    "gradient", "pattern", "datetime", "duration",
    // math
    "sum", "prod", "sqrt", "root", "log", "ln", "lim", "sup", "inf", "max", "min", "floor",
    "ceil", "round", "abs", "norm", "sin", "cos", "tan", "cot", "csc", "sec", "arcsin", "arccos",
    "arctan", "sinh", "cosh", "tanh", "vec", "mat", "cases", "binom", "frac", "cancel", "op",
    "limits", "display", "inline", "script", "sscript", "upright", "italic", "bold", "serif",
    "sans", "mono", "cal", "frak", "bb",
    // greek
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa",
    "lambda", "mu", "nu", "xi", "omicron", "pi", "rho", "sigma", "tau", "upsilon", "phi", "chi",
    "psi", "omega", "varepsilon", "vartheta", "varkappa", "varpi", "varrho", "varsigma",
    "varphi",
    // arrows
    "arrow", "arrows", "arrow.l", "arrow.r", "arrow.t", "arrow.b", "larr", "rarr", "tarr",
    "barr", "larrow", "rarrow", "leftrightarrow", "iff", "implies", "impliedby", "mapsto",
    "hook", "harpoon", "curve", "squiggly",
    // relations and operators
    "plus", "minus", "times", "div", "dot", "cdot", "ast", "star", "eq", "neq", "approx", "sim",
    "simeq", "cong", "equiv", "lt", "gt", "leq", "geq", "ll", "gg", "prec", "succ", "preceq",
    "succeq", "subset", "supset", "subseteq", "supseteq", "ni", "owns", "parallel", "perp",
    "prop", "propto", "compose", "otimes", "oplus", "odot", "wedge", "vee", "union", "sect",
    "cup", "cap", "setminus",
    // logic and sets
    "forall", "exists", "nexists", "empty", "emptyset", "top", "bot", "neg", "angle",
    "measuredangle", "sphericalangle", "nabla", "partial", "infinity", "oo", "aleph", "beth",
    "gimel", "prime", "degree",
    // punctuation and delimiters
    "dots", "cdots", "ldots", "ddots", "vdots", "colon", "comma", "semi", "bang", "quest", "bar",
    "vert", "brace", "bracket", "paren", "langle", "rangle", "lceil", "rceil", "lfloor",
    "rfloor",
    // misc
    "bullet", "circle", "square", "triangle", "diamond", "lozenge", "checkmark", "cross",
    "ballot", "copyright", "registered", "trademark", "section", "paragraph", "dagger", "hash",
    "percent", "amp", "at", "backslash", "dollar", "euro", "pound", "yen", "won", "rupee",
];

/// Ranked completion candidates for the word being typed.
///
/// An empty word (or a bare `#`) matches every keyword.
#[must_use]
pub fn complete(word: &str) -> Vec<&'static str> {
    let needle = word.strip_prefix('#').unwrap_or(word).to_lowercase();

    let mut matches: Vec<&'static str> = KEYWORDS
        .iter()
        .copied()
        .filter(|candidate| candidate.to_lowercase().starts_with(&needle))
        .collect();

    matches.sort_by(|a, b| {
        let a_exact = a.eq_ignore_ascii_case(&needle);
        let b_exact = b.eq_ignore_ascii_case(&needle);
        b_exact
            .cmp(&a_exact)
            .then_with(|| a.len().cmp(&b.len()))
            .then_with(|| a.cmp(b))
    });
    matches.dedup();
    matches
}

/// The word immediately left of byte offset `cursor` in `line`, including a
/// leading `#` if present.
#[must_use]
pub fn word_before(line: &str, cursor: usize) -> &str {
    let Some(head) = line.get(..cursor) else {
        return "";
    };
    let start = head
        .char_indices()
        .rev()
        .find(|&(_, ch)| !(ch.is_alphanumeric() || ch == '_' || ch == '.'))
        .map_or(0, |(idx, ch)| idx + ch.len_utf8());
    // Keep the code-mode marker attached to the word.
    if start > 0 && head[..start].ends_with('#') {
        &head[start - 1..]
    } else {
        &head[start..]
    }
}
