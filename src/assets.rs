//! Asset loading
//!
//! Loading is total for images: a failed or missing image resolves to a
//! placeholder so the game can always start. Sounds and fonts that fail are
//! logged and left out.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("failed to fetch {location}: {reason}")]
    Fetch { location: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Image,
    Sound,
    Font,
}

/// One entry of a load list
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRequest {
    pub kind: AssetKind,
    pub key: String,
    /// URL for images and sounds, family name for fonts
    pub source: Option<String>,
    /// Optional images fall back to a blank placeholder instead of the default one
    pub optional: bool,
}

impl AssetRequest {
    pub fn image(key: impl Into<String>, source: Option<String>) -> Self {
        Self {
            kind: AssetKind::Image,
            key: key.into(),
            source,
            optional: false,
        }
    }

    pub fn optional_image(key: impl Into<String>, source: Option<String>) -> Self {
        Self {
            optional: true,
            ..Self::image(key, source)
        }
    }

    pub fn sound(key: impl Into<String>, source: Option<String>) -> Self {
        Self {
            kind: AssetKind::Sound,
            key: key.into(),
            source,
            optional: false,
        }
    }

    pub fn font(key: impl Into<String>, family: Option<String>) -> Self {
        Self {
            kind: AssetKind::Font,
            key: key.into(),
            source: family,
            optional: false,
        }
    }
}

/// Built-in stand-ins for images that did not load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// 1x1 transparent pixel, for optional images
    Blank,
    /// 32x32 "missing image" marker
    Default,
}

impl Placeholder {
    pub fn size(&self) -> (f32, f32) {
        match self {
            Placeholder::Blank => (1.0, 1.0),
            Placeholder::Default => (32.0, 32.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageAsset {
    pub src: String,
    pub width: f32,
    pub height: f32,
    /// Set when this is a stand-in rather than the requested image
    pub placeholder: Option<Placeholder>,
}

impl ImageAsset {
    pub fn placeholder(kind: Placeholder) -> Self {
        let (width, height) = kind.size();
        Self {
            src: match kind {
                Placeholder::Blank => "placeholder:blank".to_string(),
                Placeholder::Default => "placeholder:default".to_string(),
            },
            width,
            height,
            placeholder: Some(kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundAsset {
    /// Seconds
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontAsset {
    pub family: String,
}

/// Backend that actually fetches and decodes assets
pub trait AssetSource {
    fn fetch_image(&mut self, source: &str) -> Result<ImageAsset, AssetError>;
    fn fetch_sound(&mut self, source: &str) -> Result<SoundAsset, AssetError>;
    fn fetch_font(&mut self, family: &str) -> Result<FontAsset, AssetError>;
}

/// Loading progress after each finished request
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub percent: u32,
    /// Kind and key of the request that just finished; `None` for the initial report
    pub loaded: Option<(AssetKind, String)>,
}

impl Progress {
    pub fn label(&self) -> String {
        format!("{}%", self.percent)
    }
}

/// Loaded assets grouped by kind
#[derive(Debug, Clone, Default)]
pub struct Assets {
    pub images: HashMap<String, ImageAsset>,
    pub sounds: HashMap<String, SoundAsset>,
    pub fonts: HashMap<String, FontAsset>,
}

/// Load every request in order, reporting progress as each one finishes
pub fn load_list(
    requests: &[AssetRequest],
    source: &mut dyn AssetSource,
    mut progress: impl FnMut(Progress),
) -> Assets {
    let mut assets = Assets::default();
    let total = requests.len().max(1);
    progress(Progress {
        percent: 0,
        loaded: None,
    });

    for (i, request) in requests.iter().enumerate() {
        let src = request.source.as_deref().filter(|s| !s.is_empty());
        match request.kind {
            AssetKind::Image => {
                let image = load_image(source, src, request.optional);
                assets.images.insert(request.key.clone(), image);
            }
            AssetKind::Sound => match src.map(|s| source.fetch_sound(s)) {
                Some(Ok(sound)) => {
                    assets.sounds.insert(request.key.clone(), sound);
                }
                Some(Err(e)) => log::warn!("Sound `{}` not loaded: {}", request.key, e),
                None => {}
            },
            AssetKind::Font => match src.map(|s| source.fetch_font(s)) {
                Some(Ok(font)) => {
                    assets.fonts.insert(request.key.clone(), font);
                }
                Some(Err(e)) => log::warn!("Font `{}` not loaded: {}", request.key, e),
                None => {}
            },
        }

        progress(Progress {
            percent: ((i + 1) * 100 / total) as u32,
            loaded: Some((request.kind, request.key.clone())),
        });
    }

    log::info!(
        "Loaded {} images, {} sounds, {} fonts",
        assets.images.len(),
        assets.sounds.len(),
        assets.fonts.len()
    );
    assets
}

fn load_image(source: &mut dyn AssetSource, src: Option<&str>, optional: bool) -> ImageAsset {
    let Some(src) = src else {
        return ImageAsset::placeholder(if optional {
            Placeholder::Blank
        } else {
            Placeholder::Default
        });
    };
    match source.fetch_image(src) {
        Ok(image) => image,
        Err(e) => {
            log::warn!("Image {} not loaded, using placeholder: {}", src, e);
            ImageAsset::placeholder(Placeholder::Default)
        }
    }
}

/// Offline source for headless runs: every image has a configured or default
/// size, every sound lasts a minute, and listed sources fail
#[derive(Debug, Clone)]
pub struct StubAssetSource {
    pub image_size: (f32, f32),
    pub sizes: HashMap<String, (f32, f32)>,
    pub failing: HashSet<String>,
}

impl Default for StubAssetSource {
    fn default() -> Self {
        Self {
            image_size: (100.0, 100.0),
            sizes: HashMap::new(),
            failing: HashSet::new(),
        }
    }
}

impl StubAssetSource {
    fn check(&self, source: &str) -> Result<(), AssetError> {
        if self.failing.contains(source) {
            Err(AssetError::Fetch {
                location: source.to_string(),
                reason: "unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl AssetSource for StubAssetSource {
    fn fetch_image(&mut self, source: &str) -> Result<ImageAsset, AssetError> {
        self.check(source)?;
        let (width, height) = self.sizes.get(source).copied().unwrap_or(self.image_size);
        Ok(ImageAsset {
            src: source.to_string(),
            width,
            height,
            placeholder: None,
        })
    }

    fn fetch_sound(&mut self, source: &str) -> Result<SoundAsset, AssetError> {
        self.check(source)?;
        Ok(SoundAsset { duration: 60.0 })
    }

    fn fetch_font(&mut self, family: &str) -> Result<FontAsset, AssetError> {
        self.check(family)?;
        Ok(FontAsset {
            family: family.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requests() -> Vec<AssetRequest> {
        vec![
            AssetRequest::optional_image("backgroundImage", None),
            AssetRequest::sound("backgroundMusic", Some("music.mp3".into())),
            AssetRequest::font("gameFont", Some("Press Start 2P".into())),
            AssetRequest::image("button1Image", Some("b1.png".into())),
        ]
    }

    #[test]
    fn test_load_list_groups_by_kind() {
        let mut source = StubAssetSource::default();
        source.sizes.insert("b1.png".into(), (64.0, 32.0));
        let assets = load_list(&requests(), &mut source, |_| {});

        assert_eq!(assets.images.len(), 2);
        assert_eq!(assets.images["button1Image"].width, 64.0);
        assert_eq!(assets.sounds["backgroundMusic"].duration, 60.0);
        assert_eq!(assets.fonts["gameFont"].family, "Press Start 2P");
    }

    #[test]
    fn test_missing_images_get_placeholders() {
        let mut source = StubAssetSource::default();
        source.failing.insert("b1.png".into());
        let assets = load_list(&requests(), &mut source, |_| {});

        assert_eq!(
            assets.images["backgroundImage"].placeholder,
            Some(Placeholder::Blank)
        );
        assert_eq!(
            assets.images["button1Image"].placeholder,
            Some(Placeholder::Default)
        );
        assert_eq!(assets.images["button1Image"].width, 32.0);
    }

    #[test]
    fn test_failed_sound_is_skipped() {
        let mut source = StubAssetSource::default();
        source.failing.insert("music.mp3".into());
        let assets = load_list(&requests(), &mut source, |_| {});
        assert!(assets.sounds.is_empty());
        assert_eq!(assets.images.len(), 2);
    }

    #[test]
    fn test_progress_reports_each_request() {
        let mut source = StubAssetSource::default();
        let mut reports = Vec::new();
        load_list(&requests(), &mut source, |p| reports.push(p));

        let percents: Vec<u32> = reports.iter().map(|p| p.percent).collect();
        assert_eq!(percents, vec![0, 25, 50, 75, 100]);
        assert_eq!(reports[0].loaded, None);
        assert_eq!(
            reports[4].loaded,
            Some((AssetKind::Image, "button1Image".to_string()))
        );
        assert_eq!(reports[2].label(), "50%");
    }
}
