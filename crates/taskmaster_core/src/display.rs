use crate::config::canonical_name;
use std::fmt;

/// Light or dark rendering. Lives only for the current process.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    #[default]
    Light,
    Dark,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Self::Light => Palette {
                accent: "",
                muted: "",
                reset: "",
            },
            Self::Dark => Palette {
                accent: "\x1b[38;5;208m",
                muted: "\x1b[38;5;250m",
                reset: "\x1b[0m",
            },
        }
    }

    /// Maps a theme name onto a mode. Unknown or blank names yield `None`.
    pub fn from_theme_name(raw: &str) -> Option<Self> {
        match canonical_name(raw)?.as_str() {
            "light" | "light_mode" | "lightmode" => Some(Self::Light),
            "dark" | "dark_mode" | "darkmode" => Some(Self::Dark),
            _ => None,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn accentize(&self, text: &str) -> String {
        if self.accent.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.accent, text, self.reset)
        }
    }

    pub fn mutedize(&self, text: &str) -> String {
        if self.muted.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.muted, text, self.reset)
        }
    }
}
