//! ffmpeg capture backend.
//!
//! Raw RGBA frames go to the child's stdin; the muxed container is read
//! back from stdout by a spawned task, chunk by chunk, so nothing touches
//! the filesystem. mp4 output is fragmented to make it pipe-friendly.

use std::collections::HashSet;
use std::process::Stdio;

use async_trait::async_trait;
use reel_core::{ReelError, ReelResult};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::task::JoinHandle;

use crate::backend::{CaptureBackend, CaptureConfig, CaptureStream, EncodedStream};
use crate::format::{Container, VideoCodec};

const READ_CHUNK: usize = 64 * 1024;
const STDERR_TAIL: usize = 2000;

/// Encoders and muxers reported by an ffmpeg binary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FfmpegCapabilities {
    encoders: HashSet<String>,
    muxers: HashSet<String>,
}

impl FfmpegCapabilities {
    /// Parse the output of `ffmpeg -encoders` and `ffmpeg -muxers`.
    pub fn parse(encoders_listing: &str, muxers_listing: &str) -> Self {
        Self {
            encoders: parse_listing(encoders_listing),
            muxers: parse_listing(muxers_listing),
        }
    }

    pub fn has_encoder(&self, name: &str) -> bool {
        self.encoders.contains(name)
    }

    pub fn has_muxer(&self, name: &str) -> bool {
        self.muxers.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty() && self.muxers.is_empty()
    }
}

/// Table rows follow a `--` separator line: `<flags> <name[,alias]> <description>`.
fn parse_listing(listing: &str) -> HashSet<String> {
    let mut names = HashSet::new();
    let mut in_table = false;
    for line in listing.lines() {
        let line = line.trim();
        if !in_table {
            in_table = line.starts_with("--");
            continue;
        }
        let mut tokens = line.split_whitespace();
        let (Some(_flags), Some(name)) = (tokens.next(), tokens.next()) else {
            continue;
        };
        names.extend(name.split(',').map(str::to_string));
    }
    names
}

/// Capture backend driving the system ffmpeg binary.
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    binary: String,
    capabilities: FfmpegCapabilities,
}

impl FfmpegBackend {
    pub fn new(binary: impl Into<String>, capabilities: FfmpegCapabilities) -> Self {
        Self {
            binary: binary.into(),
            capabilities,
        }
    }

    /// Ask `binary` what it can encode and mux.
    ///
    /// A binary that cannot be run yields a backend that supports nothing,
    /// so negotiation reports `UnsupportedFormat`.
    pub async fn probe(binary: impl Into<String>) -> Self {
        let binary = binary.into();
        let listings = async {
            let encoders = run_listing(&binary, "-encoders").await?;
            let muxers = run_listing(&binary, "-muxers").await?;
            Ok::<_, ReelError>(FfmpegCapabilities::parse(&encoders, &muxers))
        };
        let capabilities = match listings.await {
            Ok(caps) => caps,
            Err(e) => {
                tracing::warn!("ffmpeg probe failed, no formats available: {}", e);
                FfmpegCapabilities::default()
            }
        };
        Self::new(binary, capabilities)
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn capabilities(&self) -> &FfmpegCapabilities {
        &self.capabilities
    }

    /// Full ffmpeg argument list for a capture.
    pub fn command_args(config: &CaptureConfig) -> Vec<String> {
        let codec = config.codec.effective_codec();
        let mut args = Vec::new();
        push_args(
            &mut args,
            &["-hide_banner", "-loglevel", "error", "-f", "rawvideo", "-pixel_format", "rgba"],
        );
        args.push("-video_size".to_string());
        args.push(format!("{}x{}", config.width, config.height));
        args.push("-framerate".to_string());
        args.push(config.fps.to_string());
        push_args(
            &mut args,
            &["-i", "-", "-an", "-c:v", codec.encoder(), "-pix_fmt", "yuv420p"],
        );

        let (default_crf, tuning): (u32, &[&str]) = match codec {
            VideoCodec::H264 => (23, &["-preset", "veryfast"][..]),
            VideoCodec::Vp9 => (32, &["-b:v", "0", "-deadline", "realtime", "-cpu-used", "8"][..]),
            VideoCodec::Vp8 => (10, &["-b:v", "2M"][..]),
        };
        args.push("-crf".to_string());
        args.push(config.crf.unwrap_or(default_crf).to_string());
        push_args(&mut args, tuning);

        match config.codec.container() {
            Container::Mp4 => {
                push_args(&mut args, &["-movflags", "frag_keyframe+empty_moov", "-f", "mp4"])
            }
            Container::Webm => push_args(&mut args, &["-f", "webm"]),
        }
        args.push("pipe:1".to_string());
        args
    }
}

fn push_args(args: &mut Vec<String>, items: &[&str]) {
    args.extend(items.iter().map(|s| s.to_string()));
}

async fn run_listing(binary: &str, flag: &str) -> ReelResult<String> {
    let output = Command::new(binary)
        .args(["-hide_banner", flag])
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| ReelError::encoding(format!("failed to run {}: {}", binary, e)))?;
    if !output.status.success() {
        return Err(ReelError::encoding(format!(
            "{} {} exited with {}",
            binary, flag, output.status
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[async_trait]
impl CaptureBackend for FfmpegBackend {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn supports(&self, codec: &crate::format::CodecDescriptor) -> bool {
        self.capabilities.has_encoder(codec.effective_codec().encoder())
            && self.capabilities.has_muxer(codec.container().muxer())
    }

    async fn start(&self, config: CaptureConfig) -> ReelResult<Box<dyn CaptureStream>> {
        let args = Self::command_args(&config);
        tracing::debug!("Spawning {} {}", self.binary, args.join(" "));

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ReelError::encoding(format!("failed to start {}: {}", self.binary, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::encoding("failed to open ffmpeg stdin"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReelError::encoding("failed to open ffmpeg stdout"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::encoding("failed to open ffmpeg stderr"))?;

        let stdout_task = tokio::spawn(async move {
            let mut stream = EncodedStream::new();
            let mut buf = vec![0u8; READ_CHUNK];
            loop {
                let n = stdout.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                stream.push(buf[..n].to_vec());
            }
            Ok::<_, std::io::Error>(stream)
        });
        let stderr_task = tokio::spawn(async move {
            let mut bytes = Vec::new();
            let _ = stderr.read_to_end(&mut bytes).await;
            String::from_utf8_lossy(&bytes).into_owned()
        });

        Ok(Box::new(FfmpegStream {
            child,
            stdin: Some(stdin),
            stdout_task,
            stderr_task: Some(stderr_task),
            frame_size: config.frame_size(),
            frames_written: 0,
        }))
    }
}

struct FfmpegStream {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout_task: JoinHandle<std::io::Result<EncodedStream>>,
    stderr_task: Option<JoinHandle<String>>,
    frame_size: usize,
    frames_written: u64,
}

impl FfmpegStream {
    /// Last part of ffmpeg's stderr. Only meaningful once the process has exited.
    async fn stderr_tail(&mut self) -> String {
        let Some(task) = self.stderr_task.take() else {
            return String::new();
        };
        let text = task.await.unwrap_or_default();
        let text = text.trim();
        let start = text.len().saturating_sub(STDERR_TAIL);
        let start = (start..text.len())
            .find(|&i| text.is_char_boundary(i))
            .unwrap_or(text.len());
        text[start..].to_string()
    }
}

#[async_trait]
impl CaptureStream for FfmpegStream {
    async fn write_frame(&mut self, rgba: &[u8]) -> ReelResult<()> {
        if rgba.len() != self.frame_size {
            return Err(ReelError::encoding(format!(
                "frame is {} bytes, expected {}",
                rgba.len(),
                self.frame_size
            )));
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| ReelError::encoding("ffmpeg input already closed"))?;

        if let Err(e) = stdin.write_all(rgba).await {
            // The process most likely died; report why.
            self.stdin = None;
            let _ = self.child.wait().await;
            let stderr = self.stderr_tail().await;
            return Err(ReelError::encoding(format!(
                "failed to write frame {} to ffmpeg: {}. ffmpeg stderr: {}",
                self.frames_written, e, stderr
            )));
        }
        self.frames_written += 1;
        Ok(())
    }

    async fn finish(mut self: Box<Self>) -> ReelResult<EncodedStream> {
        // Closing stdin signals end of input.
        drop(self.stdin.take());

        let stdout = (&mut self.stdout_task)
            .await
            .map_err(|e| ReelError::encoding(format!("ffmpeg output reader failed: {}", e)))?
            .map_err(|e| ReelError::encoding(format!("failed to read ffmpeg output: {}", e)))?;

        let status = self
            .child
            .wait()
            .await
            .map_err(|e| ReelError::encoding(format!("ffmpeg process error: {}", e)))?;
        if !status.success() {
            let stderr = self.stderr_tail().await;
            return Err(ReelError::encoding(format!(
                "ffmpeg failed with status {}: {}",
                status, stderr
            )));
        }

        tracing::info!(
            "ffmpeg encoded {} frames into {} bytes",
            self.frames_written,
            stdout.len()
        );
        Ok(stdout)
    }
}
