//! Preference persistence for autonate settings

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Focus radius bounds
pub const FOCUS_RADIUS_MIN: f32 = 25.0;
pub const FOCUS_RADIUS_MAX: f32 = 600.0;
/// Backdrop blur bounds
pub const BLUR_MAX: f32 = 20.0;

/// Shape of the focus window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FocusShape {
    #[default]
    Circle,
    Square,
    Rectangle,
    /// Two-click user-drawn box
    CustomBox,
}

impl FocusShape {
    /// Get the next shape in the cycle
    pub fn next(self) -> Self {
        match self {
            FocusShape::Circle => FocusShape::Square,
            FocusShape::Square => FocusShape::Rectangle,
            FocusShape::Rectangle => FocusShape::CustomBox,
            FocusShape::CustomBox => FocusShape::Circle,
        }
    }
}

/// What a finishing right-click does with the composite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultAction {
    #[default]
    Copy,
    Save,
}

/// Folder that saved captures land in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveLocation {
    #[default]
    Pictures,
    Documents,
}

impl SaveLocation {
    /// Resolve the folder, falling back to a subfolder of home
    pub fn dir(self) -> Option<PathBuf> {
        match self {
            SaveLocation::Pictures => {
                dirs::picture_dir().or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
            }
            SaveLocation::Documents => {
                dirs::document_dir().or_else(|| dirs::home_dir().map(|h| h.join("Documents")))
            }
        }
    }
}

/// Preferences persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutonateConfig {
    /// Focus window shape used by the next session
    pub shape: FocusShape,
    /// Backdrop blur radius in pixels (0-20)
    pub blur_radius: f32,
    /// Export action on the finishing right-click
    pub default_action: DefaultAction,
    /// Tool palette UI scale factor
    pub palette_scale: f32,
    /// Last used focus radius (25-600)
    pub focus_radius: f32,
    /// Where saved captures go
    pub save_location: SaveLocation,
}

impl Default for AutonateConfig {
    fn default() -> Self {
        Self {
            shape: FocusShape::Circle,
            blur_radius: 8.0,
            default_action: DefaultAction::Copy,
            palette_scale: 0.5,
            focus_radius: 150.0,
            save_location: SaveLocation::Pictures,
        }
    }
}

impl AutonateConfig {
    /// Application directory name under the user config dir
    pub const ID: &'static str = "autonate";

    /// Default location of the preference file
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("No config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Load from an explicit file; missing or invalid files yield defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::read(path) {
            Ok(config) => config.clamped(),
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::path() else {
            log::error!("No config directory available, preferences not saved");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {:?}", err);
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Bring every numeric preference back inside its valid range
    pub fn clamped(mut self) -> Self {
        self.blur_radius = self.blur_radius.clamp(0.0, BLUR_MAX);
        self.focus_radius = self.focus_radius.clamp(FOCUS_RADIUS_MIN, FOCUS_RADIUS_MAX);
        self.palette_scale = self.palette_scale.clamp(0.25, 2.0);
        self
    }
}
