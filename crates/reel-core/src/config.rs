use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{ReelError, ReelResult};

/// Codec preference order used when the config does not name one.
pub const DEFAULT_FORMATS: [&str; 5] = [
    "video/mp4;codecs=h264",
    "video/mp4",
    "video/webm;codecs=vp9",
    "video/webm;codecs=vp8",
    "video/webm",
];

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the finished reel is written to.
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// ffmpeg executable name or path.
    pub ffmpeg: String,
    /// Ordered (container, codec) preference list, MIME style.
    pub formats: Vec<String>,
    /// Constant rate factor override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crf: Option<u32>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            formats: DEFAULT_FORMATS.iter().map(|s| s.to_string()).collect(),
            crf: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TextConfig {
    /// TTF/OTF used for captions. System fonts are searched when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ReelConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub text: TextConfig,
}

impl ReelConfig {
    pub fn load_from_file(path: &Path) -> ReelResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> ReelResult<Self> {
        toml::from_str(contents).map_err(|e| ReelError::Config(e.to_string()))
    }

    pub fn save_to_file(&self, path: &Path) -> ReelResult<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ReelError::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ReelConfig::from_toml("").unwrap();
        assert_eq!(config.encoder.ffmpeg, "ffmpeg");
        assert_eq!(config.encoder.formats.len(), 5);
        assert_eq!(config.encoder.formats[0], "video/mp4;codecs=h264");
        assert_eq!(config.output.dir, PathBuf::from("output"));
        assert!(config.text.font.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config = ReelConfig::from_toml(
            r#"
            [encoder]
            ffmpeg = "/opt/ffmpeg/bin/ffmpeg"
            formats = ["video/webm"]
            crf = 28

            [text]
            font = "/usr/share/fonts/Inter-Bold.ttf"
            "#,
        )
        .unwrap();
        assert_eq!(config.encoder.formats, vec!["video/webm".to_string()]);
        assert_eq!(config.encoder.crf, Some(28));
        assert_eq!(
            config.text.font.as_deref(),
            Some(Path::new("/usr/share/fonts/Inter-Bold.ttf"))
        );
        assert_eq!(config.output.dir, PathBuf::from("output"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = ReelConfig::from_toml("[encoder\nffmpeg=").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Config);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("reel_config_{}.toml", std::process::id()));
        let mut config = ReelConfig::default();
        config.output.dir = PathBuf::from("reels");
        config.save_to_file(&path).unwrap();
        let loaded = ReelConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.output.dir, PathBuf::from("reels"));
        assert_eq!(loaded.encoder.formats, config.encoder.formats);
    }
}
