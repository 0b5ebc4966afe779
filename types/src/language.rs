use std::fmt;

/// Answer language selected in the panel, by short code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language(String);

impl Language {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_ascii_lowercase())
    }

    #[must_use]
    pub fn english() -> Self {
        Self::new("en")
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_english(&self) -> bool {
        self.0 == "en"
    }

    /// Human-readable name used in answer instructions; unknown codes pass through.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.0.as_str() {
            "de" => "German",
            "en" => "English",
            "es" => "Spain",
            "ch" => "Schwitzerdütch",
            "sch" => "Schwäbisch",
            "fr" => "French",
            "it" => "Italian",
            "ru" => "Russian",
            "zh" => "Chinese",
            "th" => "Thai",
            "pt" => "Portuguese",
            other => other,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::english()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
