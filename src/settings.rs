//! Game configuration
//!
//! A JSON document with the display texts, colors, asset sources and lane
//! bindings of one game. Every field has a default, so a partial document
//! (or none at all) still produces a playable game.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assets::AssetRequest;
use crate::renderer::Hsla;
use crate::renderer::color::palette;
use crate::tuning::Tuning;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config defines no buttons")]
    NoLanes,
    #[error("game speed must be positive, got {0}")]
    InvalidSpeed(f32),
}

/// Display texts and pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameSettings {
    pub name: String,
    pub game_speed: f32,
    pub start_text: String,
    pub gameover_text: String,
    pub instructions_desktop: String,
    pub instructions_mobile: String,
    /// Canvas width cap in pixels; 0 leaves the width uncapped
    pub max_width: f32,
    pub font_family: Option<String>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            name: "Lane Rush".to_string(),
            game_speed: 10.0,
            start_text: "Start".to_string(),
            gameover_text: "Game Over".to_string(),
            instructions_desktop: "Press the matching key when a button reaches its goal".to_string(),
            instructions_mobile: "Tap a goal when a button reaches it".to_string(),
            max_width: 600.0,
            font_family: None,
        }
    }
}

/// Hex colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Colors {
    pub background_color: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub text_color: String,
    pub spark_color: String,
    pub burn_color: String,
    pub splash_color: String,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            background_color: "#000000".to_string(),
            primary_color: "#ff00ff".to_string(),
            secondary_color: "#00ffff".to_string(),
            text_color: "#ffffff".to_string(),
            spark_color: "#ffd700".to_string(),
            burn_color: "#ff0000".to_string(),
            splash_color: "#ffccf2".to_string(),
        }
    }
}

impl Colors {
    pub fn spark(&self) -> Hsla {
        Hsla::from_hex(&self.spark_color).unwrap_or(palette::SPARK)
    }

    pub fn burn(&self) -> Hsla {
        Hsla::from_hex(&self.burn_color).unwrap_or(palette::BURN)
    }

    pub fn splash(&self) -> Hsla {
        Hsla::from_hex(&self.splash_color).unwrap_or(palette::SPLASH)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Images {
    pub background_image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Sounds {
    pub background_music: Option<String>,
}

/// One lane: the key that scores it and its button artwork
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonBinding {
    pub keycode: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub settings: GameSettings,
    pub colors: Colors,
    pub images: Images,
    pub sounds: Sounds,
    /// Lanes, left to right
    pub buttons: Vec<ButtonBinding>,
    pub tuning: Tuning,
}

impl Default for GameConfig {
    fn default() -> Self {
        let buttons = ["KeyD", "KeyF", "KeyJ", "KeyK"]
            .into_iter()
            .map(|code| ButtonBinding {
                keycode: Some(code.to_string()),
                image: None,
            })
            .collect();
        Self {
            settings: GameSettings::default(),
            colors: Colors::default(),
            images: Images::default(),
            sounds: Sounds::default(),
            buttons,
            tuning: Tuning::default(),
        }
    }
}

impl GameConfig {
    pub const BACKGROUND_IMAGE: &'static str = "backgroundImage";
    pub const BACKGROUND_MUSIC: &'static str = "backgroundMusic";
    pub const GAME_FONT: &'static str = "gameFont";

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!(
            "Loaded config `{}` from {}",
            config.settings.name,
            path.as_ref().display()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buttons.is_empty() {
            return Err(ConfigError::NoLanes);
        }
        let speed = self.settings.game_speed;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(ConfigError::InvalidSpeed(speed));
        }
        Ok(())
    }

    pub fn lanes(&self) -> usize {
        self.buttons.len()
    }

    /// Image key of lane `lane` (`button1Image`, `button2Image`, ...)
    pub fn button_image_key(lane: usize) -> String {
        format!("button{}Image", lane + 1)
    }

    /// Everything the game needs loaded before it can be ready
    pub fn asset_requests(&self) -> Vec<AssetRequest> {
        let mut requests = vec![
            AssetRequest::optional_image(Self::BACKGROUND_IMAGE, self.images.background_image.clone()),
            AssetRequest::sound(Self::BACKGROUND_MUSIC, self.sounds.background_music.clone()),
            AssetRequest::font(Self::GAME_FONT, self.settings.font_family.clone()),
        ];
        requests.extend(
            self.buttons
                .iter()
                .enumerate()
                .map(|(lane, b)| AssetRequest::image(Self::button_image_key(lane), b.image.clone())),
        );
        requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetKind;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = GameConfig::from_json(
            r##"{
                "settings": { "name": "Beat Lanes", "gameSpeed": 12 },
                "colors": { "sparkColor": "#00ff00" },
                "buttons": [
                    { "keycode": "Digit1", "image": "one.png" },
                    { "keycode": "Digit2" }
                ]
            }"##,
        )
        .unwrap();
        assert_eq!(config.settings.name, "Beat Lanes");
        assert_eq!(config.settings.game_speed, 12.0);
        assert_eq!(config.settings.start_text, "Start");
        assert_eq!(config.colors.spark(), Hsla::new(120.0, 100.0, 50.0, 1.0));
        assert_eq!(config.colors.burn_color, "#ff0000");
        assert_eq!(config.lanes(), 2);
        assert_eq!(config.tuning, Tuning::default());
    }

    #[test]
    fn test_rejects_invalid_configs() {
        assert!(matches!(
            GameConfig::from_json(r#"{ "buttons": [] }"#),
            Err(ConfigError::NoLanes)
        ));
        assert!(matches!(
            GameConfig::from_json(r#"{ "settings": { "gameSpeed": 0 } }"#),
            Err(ConfigError::InvalidSpeed(_))
        ));
        assert!(matches!(
            GameConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            GameConfig::from_path("/nonexistent/lane-rush.json"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_bad_color_falls_back_to_palette() {
        let mut colors = Colors::default();
        colors.burn_color = "crimson".into();
        assert_eq!(colors.burn(), palette::BURN);
    }

    #[test]
    fn test_asset_requests_cover_every_lane() {
        let config = GameConfig::default();
        let requests = config.asset_requests();
        assert_eq!(requests.len(), 3 + 4);
        assert!(requests[0].optional);
        let images: Vec<&str> = requests
            .iter()
            .filter(|r| r.kind == AssetKind::Image && !r.optional)
            .map(|r| r.key.as_str())
            .collect();
        assert_eq!(images, vec!["button1Image", "button2Image", "button3Image", "button4Image"]);
    }
}
