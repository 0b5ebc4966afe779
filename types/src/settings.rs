//! Resolved settings shared across crates.
//!
//! Raw TOML deserialization structs (with `Option` fields) stay private in
//! `quill-config`. The config loader resolves them into these types at the
//! parse boundary, so everything downstream sees concrete values.

use std::time::Duration;

/// Alternating presentation of highlighted fragments, keyed by position parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Even,
    Odd,
}

impl Tone {
    #[must_use]
    pub const fn for_position(index: usize) -> Self {
        if index % 2 == 0 { Tone::Even } else { Tone::Odd }
    }

    /// The modifier class carried next to the highlight class.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Tone::Even => "even",
            Tone::Odd => "odd",
        }
    }
}

/// Colors and weight applied to highlight spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightStyle {
    even_color: String,
    odd_color: String,
    bold: bool,
}

impl HighlightStyle {
    /// Class every highlight span carries; the guard recognizes its own spans by it.
    pub const CLASS: &'static str = "prompt-highlight";

    #[must_use]
    pub fn new(even_color: impl Into<String>, odd_color: impl Into<String>, bold: bool) -> Self {
        Self {
            even_color: even_color.into(),
            odd_color: odd_color.into(),
            bold,
        }
    }

    #[must_use]
    pub fn color(&self, tone: Tone) -> &str {
        match tone {
            Tone::Even => &self.even_color,
            Tone::Odd => &self.odd_color,
        }
    }

    #[must_use]
    pub const fn bold(&self) -> bool {
        self.bold
    }
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self::new("#4A9EFF", "#1E7CE8", true)
    }
}

/// Timing knobs for bootstrap, the mutation guard, and surface detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub startup_delay: Duration,
    /// Minimum interval between two guard re-styling passes.
    pub guard_throttle: Duration,
    /// How long the guard ignores mutations after it starts a pass.
    pub guard_release: Duration,
    pub detection_max_attempts: u32,
    pub detected_badge: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            startup_delay: Duration::from_millis(2000),
            guard_throttle: Duration::from_millis(500),
            guard_release: Duration::from_millis(100),
            detection_max_attempts: 5,
            detected_badge: Duration::from_millis(2000),
        }
    }
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub auto_open: bool,
    pub highlight_prompts: bool,
    pub debug: bool,
    pub highlight_style: HighlightStyle,
    pub timings: Timings,
    /// Classes that mark a rich region as owned by a host editing framework.
    pub host_editor_classes: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_open: false,
            highlight_prompts: true,
            debug: false,
            highlight_style: HighlightStyle::default(),
            timings: Timings::default(),
            host_editor_classes: vec!["ProseMirror".to_string()],
        }
    }
}
