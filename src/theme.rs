use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use crate::storage::{FileStore, StorageError};

/// Key the preference lives under in the store.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

pub struct ThemeColors {
    pub text: &'static str,
    pub key: &'static str,
    pub value: &'static str,
    pub cc: &'static str,
    pub error: &'static str,
    pub accent: &'static str,
}

impl Theme {
    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Dark => ThemeColors {
                text: "#c9d1d9",
                key: "#ffa657",
                value: "#a5d6ff",
                cc: "#616e7f",
                error: "#f85149",
                accent: "#818cf8",
            },
            Theme::Light => ThemeColors {
                text: "#24292f",
                key: "#d73a49",
                value: "#0366d6",
                cc: "#6a737d",
                error: "#b91c1c",
                accent: "#4f46e5",
            },
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Label of the toggle button: names the theme it switches to.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Light => "Tema escuro",
            Theme::Dark => "Tema claro",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme {other:?}")),
        }
    }
}

/// The persisted light/dark choice.
pub struct ThemePreference {
    theme: Theme,
    store: FileStore,
}

impl ThemePreference {
    /// Read the stored theme; absent or unrecognised values mean light.
    pub fn load(store: FileStore) -> Self {
        let theme = match store.get(THEME_KEY) {
            None => Theme::default(),
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(error = %e, "ignoring stored theme");
                Theme::default()
            }),
        };
        Self { theme, store }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Change and persist the theme.
    pub fn set(&mut self, theme: Theme) -> Result<(), StorageError> {
        self.theme = theme;
        self.store.set(THEME_KEY, theme.as_str())?;
        info!(%theme, "theme changed");
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<Theme, StorageError> {
        let next = self.theme.toggled();
        self.set(next)?;
        Ok(next)
    }
}
