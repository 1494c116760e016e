//! Theme management: named palettes persisted to a JSON file and rendered
//! as CSS custom properties for the web view.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{Result, UiError};

/// Color palette of a theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub surface: String,
    pub text: String,
    pub text_secondary: String,
}

/// Gradient definitions of a theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeGradients {
    pub header: String,
    pub card: String,
    pub accent: String,
}

/// A named theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Display name shown in the theme picker.
    pub name: String,
    pub colors: ThemeColors,
    pub gradients: ThemeGradients,
}

/// Loads, persists, and switches themes.
pub struct ThemeManager {
    path: PathBuf,
    current: String,
    themes: BTreeMap<String, Theme>,
}

/// Theme id used when nothing else is selected or a lookup fails.
const DEFAULT_THEME: &str = "default";

impl ThemeManager {
    /// Load themes from `path`. Falls back to the built-in set when the
    /// file is missing or unreadable; a missing file is created with the
    /// built-ins, an unreadable one is left untouched.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let themes = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, Theme>>(&content) {
                Ok(themes) if !themes.is_empty() => themes,
                Ok(_) => default_themes(),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "themes file unreadable; using defaults");
                    default_themes()
                }
            },
            Err(_) => default_themes(),
        };

        let manager = Self {
            path,
            current: DEFAULT_THEME.to_owned(),
            themes,
        };
        if !manager.path.exists()
            && let Err(e) = manager.save()
        {
            warn!(error = %e, "failed to persist default themes");
        }
        info!(count = manager.themes.len(), "themes loaded");
        manager
    }

    /// Persist the theme set to the themes file.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.themes)
            .map_err(|e| UiError::Theme(e.to_string()))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    /// Id of the currently selected theme.
    #[must_use]
    pub fn current_theme(&self) -> &str {
        &self.current
    }

    /// Switch the current theme. Unknown names are rejected and leave the
    /// selection unchanged.
    pub fn set_theme(&mut self, name: &str) -> Result<()> {
        if !self.themes.contains_key(name) {
            return Err(UiError::Theme(format!("unknown theme: {name}")));
        }
        self.current = name.to_owned();
        info!(theme = %name, "theme changed");
        Ok(())
    }

    /// Id → display-name pairs for the theme picker.
    #[must_use]
    pub fn available_themes(&self) -> BTreeMap<String, String> {
        self.themes
            .iter()
            .map(|(id, theme)| (id.clone(), theme.name.clone()))
            .collect()
    }

    /// Render the CSS custom-property block for `name` (or the current
    /// theme when `None`). Unknown names fall back to the default theme.
    #[must_use]
    pub fn theme_css(&self, name: Option<&str>) -> String {
        let id = name.unwrap_or(&self.current);
        let theme = self
            .themes
            .get(id)
            .or_else(|| self.themes.get(DEFAULT_THEME));
        match theme {
            Some(theme) => render_css(theme),
            None => String::new(),
        }
    }

    /// Path of the backing themes file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn render_css(theme: &Theme) -> String {
    let c = &theme.colors;
    let g = &theme.gradients;
    format!(
        ":root {{\n  --primary-color: {};\n  --secondary-color: {};\n  --accent-color: {};\n  --background-color: {};\n  --surface-color: {};\n  --text-color: {};\n  --text-secondary: {};\n  --header-gradient: {};\n  --card-gradient: {};\n  --accent-gradient: {};\n}}\n",
        c.primary,
        c.secondary,
        c.accent,
        c.background,
        c.surface,
        c.text,
        c.text_secondary,
        g.header,
        g.card,
        g.accent,
    )
}

/// The built-in theme set.
fn default_themes() -> BTreeMap<String, Theme> {
    let mut themes = BTreeMap::new();
    themes.insert(
        "default".to_owned(),
        Theme {
            name: "Ocean Blue".to_owned(),
            colors: ThemeColors {
                primary: "#4facfe".to_owned(),
                secondary: "#00f2fe".to_owned(),
                accent: "#667eea".to_owned(),
                background: "#f8f9fa".to_owned(),
                surface: "#ffffff".to_owned(),
                text: "#333333".to_owned(),
                text_secondary: "#666666".to_owned(),
            },
            gradients: ThemeGradients {
                header: "linear-gradient(135deg, #4facfe 0%, #00f2fe 100%)".to_owned(),
                card: "linear-gradient(135deg, #667eea 0%, #764ba2 100%)".to_owned(),
                accent: "linear-gradient(135deg, #a8edea 0%, #fed6e3 100%)".to_owned(),
            },
        },
    );
    themes.insert(
        "dark".to_owned(),
        Theme {
            name: "Midnight Dark".to_owned(),
            colors: ThemeColors {
                primary: "#6366f1".to_owned(),
                secondary: "#8b5cf6".to_owned(),
                accent: "#ec4899".to_owned(),
                background: "#1a1a1a".to_owned(),
                surface: "#2d2d2d".to_owned(),
                text: "#ffffff".to_owned(),
                text_secondary: "#a0a0a0".to_owned(),
            },
            gradients: ThemeGradients {
                header: "linear-gradient(135deg, #6366f1 0%, #8b5cf6 100%)".to_owned(),
                card: "linear-gradient(135deg, #1e293b 0%, #334155 100%)".to_owned(),
                accent: "linear-gradient(135deg, #ec4899 0%, #f59e0b 100%)".to_owned(),
            },
        },
    );
    themes.insert(
        "nature".to_owned(),
        Theme {
            name: "Forest Nature".to_owned(),
            colors: ThemeColors {
                primary: "#10b981".to_owned(),
                secondary: "#059669".to_owned(),
                accent: "#f59e0b".to_owned(),
                background: "#f0fdf4".to_owned(),
                surface: "#ffffff".to_owned(),
                text: "#1c1917".to_owned(),
                text_secondary: "#57534e".to_owned(),
            },
            gradients: ThemeGradients {
                header: "linear-gradient(135deg, #10b981 0%, #059669 100%)".to_owned(),
                card: "linear-gradient(135deg, #86efac 0%, #4ade80 100%)".to_owned(),
                accent: "linear-gradient(135deg, #f59e0b 0%, #d97706 100%)".to_owned(),
            },
        },
    );
    themes.insert(
        "sunset".to_owned(),
        Theme {
            name: "Sunset Orange".to_owned(),
            colors: ThemeColors {
                primary: "#f97316".to_owned(),
                secondary: "#ea580c".to_owned(),
                accent: "#dc2626".to_owned(),
                background: "#fff7ed".to_owned(),
                surface: "#ffffff".to_owned(),
                text: "#431407".to_owned(),
                text_secondary: "#78350f".to_owned(),
            },
            gradients: ThemeGradients {
                header: "linear-gradient(135deg, #f97316 0%, #ea580c 100%)".to_owned(),
                card: "linear-gradient(135deg, #fdba74 0%, #fb923c 100%)".to_owned(),
                accent: "linear-gradient(135deg, #dc2626 0%, #b91c1c 100%)".to_owned(),
            },
        },
    );
    themes
}
