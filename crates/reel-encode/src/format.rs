//! MIME-style codec descriptors and the container/codec vocabulary the
//! encoder understands.

use std::fmt;
use std::str::FromStr;

use reel_core::{ReelError, ReelResult};

/// Output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    Mp4,
    Webm,
}

impl Container {
    /// ffmpeg muxer name.
    pub fn muxer(&self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Webm => "webm",
        }
    }

    /// Codec used when a descriptor names only the container.
    pub fn default_codec(&self) -> VideoCodec {
        match self {
            Container::Mp4 => VideoCodec::H264,
            Container::Webm => VideoCodec::Vp9,
        }
    }

    fn from_subtype(subtype: &str) -> Option<Self> {
        match subtype {
            "mp4" => Some(Container::Mp4),
            "webm" => Some(Container::Webm),
            _ => None,
        }
    }
}

/// Video codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoCodec {
    H264,
    Vp9,
    Vp8,
}

impl VideoCodec {
    /// ffmpeg encoder implementing this codec.
    pub fn encoder(&self) -> &'static str {
        match self {
            VideoCodec::H264 => "libx264",
            VideoCodec::Vp9 => "libvpx-vp9",
            VideoCodec::Vp8 => "libvpx",
        }
    }

    fn from_param(name: &str) -> Option<Self> {
        let name = name.trim().trim_matches('"').to_ascii_lowercase();
        if name == "h264" || name.starts_with("avc1") {
            Some(VideoCodec::H264)
        } else if name == "vp9" || name.starts_with("vp09") {
            Some(VideoCodec::Vp9)
        } else if name == "vp8" {
            Some(VideoCodec::Vp8)
        } else {
            None
        }
    }

    fn allowed_in(&self, container: Container) -> bool {
        match container {
            Container::Mp4 => matches!(self, VideoCodec::H264 | VideoCodec::Vp9),
            Container::Webm => matches!(self, VideoCodec::Vp9 | VideoCodec::Vp8),
        }
    }
}

/// A `(container, codec)` pair parsed from strings like `video/webm;codecs=vp9`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodecDescriptor {
    mime: String,
    container: Container,
    codec: Option<VideoCodec>,
}

impl CodecDescriptor {
    /// The descriptor string as given.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn container(&self) -> Container {
        self.container
    }

    /// Explicit codec, if the descriptor named one.
    pub fn codec(&self) -> Option<VideoCodec> {
        self.codec
    }

    /// Codec that will actually be used.
    pub fn effective_codec(&self) -> VideoCodec {
        self.codec.unwrap_or_else(|| self.container.default_codec())
    }

    /// File extension for the produced blob: `mp4` when the container string
    /// mentions mp4, `webm` otherwise.
    pub fn extension(&self) -> &'static str {
        let container = self.mime.split(';').next().unwrap_or_default();
        if container.contains("mp4") {
            "mp4"
        } else {
            "webm"
        }
    }
}

impl FromStr for CodecDescriptor {
    type Err = ReelError;

    fn from_str(s: &str) -> ReelResult<Self> {
        let mut parts = s.split(';');
        let essence = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
        let subtype = essence
            .strip_prefix("video/")
            .ok_or_else(|| ReelError::UnsupportedFormat(format!("not a video type: {}", s)))?;
        let container = Container::from_subtype(subtype)
            .ok_or_else(|| ReelError::UnsupportedFormat(format!("unknown container: {}", s)))?;

        let mut codec = None;
        for param in parts {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            if !key.trim().eq_ignore_ascii_case("codecs") {
                continue;
            }
            // First video codec in the list; audio entries are ignored.
            let first = value
                .trim()
                .trim_matches('"')
                .split(',')
                .find_map(VideoCodec::from_param)
                .ok_or_else(|| ReelError::UnsupportedFormat(format!("unknown codec: {}", s)))?;
            codec = Some(first);
        }

        if let Some(c) = codec {
            if !c.allowed_in(container) {
                return Err(ReelError::UnsupportedFormat(format!(
                    "{:?} cannot be muxed into {}",
                    c,
                    container.muxer()
                )));
            }
        }

        Ok(Self {
            mime: s.trim().to_string(),
            container,
            codec,
        })
    }
}

impl fmt::Display for CodecDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mime)
    }
}

/// Artifact name for a clip finished at `timestamp_ms` (unix milliseconds).
pub fn reel_filename(codec: &CodecDescriptor, timestamp_ms: u128) -> String {
    format!("reel-{}.{}", timestamp_ms, codec.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> CodecDescriptor {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_container_and_codec() {
        let d = parse("video/mp4;codecs=h264");
        assert_eq!(d.container(), Container::Mp4);
        assert_eq!(d.codec(), Some(VideoCodec::H264));
        assert_eq!(d.effective_codec().encoder(), "libx264");

        let d = parse("video/webm; codecs=\"vp8, opus\"");
        assert_eq!(d.container(), Container::Webm);
        assert_eq!(d.codec(), Some(VideoCodec::Vp8));
    }

    #[test]
    fn test_container_only_uses_default_codec() {
        assert_eq!(parse("video/mp4").effective_codec(), VideoCodec::H264);
        assert_eq!(parse("video/webm").effective_codec().encoder(), "libvpx-vp9");
        assert_eq!(parse("video/webm").codec(), None);
    }

    #[test]
    fn test_codec_aliases() {
        assert_eq!(parse("video/mp4;codecs=avc1.42E01E").codec(), Some(VideoCodec::H264));
        assert_eq!(parse("video/webm;codecs=vp09.00.10.08").codec(), Some(VideoCodec::Vp9));
    }

    #[test]
    fn test_rejects_unknown_types() {
        for bad in [
            "audio/mp4",
            "video/x-matroska",
            "video/webm;codecs=av1",
            "video/mp4;codecs=vp8",
            "",
        ] {
            let err = bad.parse::<CodecDescriptor>().unwrap_err();
            assert_eq!(err.kind(), reel_core::ErrorKind::UnsupportedFormat, "{}", bad);
        }
    }

    #[test]
    fn test_extension_follows_container_string() {
        assert_eq!(parse("video/mp4;codecs=h264").extension(), "mp4");
        assert_eq!(parse("video/mp4").extension(), "mp4");
        assert_eq!(parse("video/webm;codecs=vp9").extension(), "webm");
        assert_eq!(parse("video/webm").extension(), "webm");
    }

    #[test]
    fn test_reel_filename() {
        let d = parse("video/webm;codecs=vp9");
        assert_eq!(reel_filename(&d, 1_700_000_000_123), "reel-1700000000123.webm");
    }
}
