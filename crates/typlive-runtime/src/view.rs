#![forbid(unsafe_code)]

//! Host-renderable editor state.
//!
//! The runtime never touches the DOM. Everything the page shows besides the
//! text surface itself is a pure function of [`ViewState`]: the active
//! environment button, the placeholder, the preview pane, the compile error
//! line, and the connection notice.

use typlive_core::Environment;

/// Neutral preview contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Nothing compiled yet in this environment.
    Idle,
    /// The last compile found only whitespace.
    AwaitingInput,
    /// A compile failed before anything rendered.
    CompileFailed,
}

impl Placeholder {
    /// Text shown in the preview pane.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Idle => "Output will be Shown Here!",
            Self::AwaitingInput => "Please input Typst code",
            Self::CompileFailed => "Compilation failed",
        }
    }
}

/// Preview pane contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    /// A neutral message.
    Placeholder(Placeholder),
    /// Rendered markup. `stale` is set when a later compile failed.
    Rendered {
        /// SVG markup from the compiler.
        markup: String,
        /// Whether the markup predates the current error.
        stale: bool,
    },
}

impl Default for Preview {
    fn default() -> Self {
        Self::Placeholder(Placeholder::Idle)
    }
}

/// Connection notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The link dropped; a retry is scheduled.
    Reconnecting,
    /// A connection attempt failed; a retry may follow.
    ConnectError,
    /// Retries are exhausted.
    ReconnectFailed,
    /// No transport is available on this page.
    TransportUnavailable,
    /// The transport refused a compile request.
    SendFailed,
}

impl Notice {
    /// Text for the status line.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Reconnecting => "Socket link disconnect, Reconnecting...",
            Self::ConnectError => "Socket connect error",
            Self::ReconnectFailed => "Socket reconnect failed, Please Refresh Page!",
            Self::TransportUnavailable => "Socket unavailable, Please Refresh Page!",
            Self::SendFailed => "Socket unconnected, Please Refresh Page!",
        }
    }

    /// Whether only a page reload recovers from this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::ReconnectFailed | Self::TransportUnavailable)
    }
}

/// Everything the host renders outside the text surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// Active environment (drives the active button and `data-environment`).
    pub environment: Environment,
    /// Placeholder for the empty text surface.
    pub placeholder: &'static str,
    /// Whether the surface tokenizes as math.
    pub math_mode: bool,
    /// Preview pane.
    pub preview: Preview,
    /// Compile error line, verbatim from the compiler.
    pub error: Option<String>,
    /// Connection status line.
    pub notice: Option<Notice>,
}

impl ViewState {
    /// Initial view for `environment`.
    #[must_use]
    pub fn new(environment: Environment) -> Self {
        let mut view = Self {
            environment,
            placeholder: "",
            math_mode: false,
            preview: Preview::default(),
            error: None,
            notice: None,
        };
        view.apply_environment(environment);
        view
    }

    /// Environment-derived affordances. Does not touch the preview.
    pub fn apply_environment(&mut self, environment: Environment) {
        self.environment = environment;
        self.placeholder = environment.placeholder();
        self.math_mode = environment.is_math();
    }

    /// Neutral preview, no error.
    pub fn reset_preview(&mut self) {
        self.preview = Preview::Placeholder(Placeholder::Idle);
        self.error = None;
    }

    /// Blank-input preview, no error.
    pub fn show_awaiting_input(&mut self) {
        self.preview = Preview::Placeholder(Placeholder::AwaitingInput);
        self.error = None;
    }

    /// Fresh markup, no error.
    pub fn show_rendered(&mut self, markup: String) {
        self.preview = Preview::Rendered {
            markup,
            stale: false,
        };
        self.error = None;
    }

    /// Keep the last good markup (marked stale) and show `error`.
    pub fn show_failure(&mut self, error: String) {
        match &mut self.preview {
            Preview::Rendered { stale, .. } => *stale = true,
            Preview::Placeholder(_) => {
                self.preview = Preview::Placeholder(Placeholder::CompileFailed);
            }
        }
        self.error = Some(error);
    }

    /// Replace the connection notice. Terminal notices are sticky until the
    /// link is established again.
    pub fn set_notice(&mut self, notice: Notice) {
        if self.notice.is_some_and(Notice::is_terminal) && !notice.is_terminal() {
            return;
        }
        self.notice = Some(notice);
    }

    /// Clear the connection notice.
    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Clear the connection notice only if it is `notice`.
    pub fn clear_notice_if(&mut self, notice: Notice) {
        if self.notice == Some(notice) {
            self.notice = None;
        }
    }
}
