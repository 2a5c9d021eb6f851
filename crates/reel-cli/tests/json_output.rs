use std::path::PathBuf;
use std::process::{Command, Output};

fn reel(args: &[&str]) -> Output {
    let bin = std::env::var("CARGO_BIN_EXE_reel").unwrap_or_else(|_| {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../target/debug/reel")
            .to_string_lossy()
            .to_string()
    });
    Command::new(bin)
        .args(args)
        .env("RUST_LOG", "info")
        .output()
        .expect("failed to spawn reel")
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("reel-cli-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8(output.stdout.clone()).expect("stdout not utf-8");
    assert!(
        !stdout.contains('\u{1b}'),
        "stdout contaminated with ANSI escape codes: {stdout:?}"
    );
    serde_json::from_str(stdout.trim()).expect("stdout is not a single JSON document")
}

#[test]
fn captions_json_is_reproducible_with_seed() {
    let first = reel(&["captions", "--json", "--seed", "11", "--count", "4"]);
    assert!(first.status.success(), "captions failed: {:?}", first.status);
    let second = reel(&["captions", "--json", "--seed", "11", "--count", "4"]);

    let pairs = stdout_json(&first);
    let pairs = pairs.as_array().expect("expected an array");
    assert_eq!(pairs.len(), 4);
    for pair in pairs {
        assert!(!pair["quote"].as_str().unwrap().is_empty());
        assert!(!pair["cta"].as_str().unwrap().is_empty());
    }
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn formats_json_without_ffmpeg_selects_nothing() {
    let dir = scratch_dir("formats");
    let config = dir.join("reel.config.toml");
    std::fs::write(
        &config,
        "[encoder]\nffmpeg = \"/nonexistent/ffmpeg\"\nformats = [\"video/webm;codecs=vp9\", \"video/quicktime\"]\n",
    )
    .unwrap();

    let output = reel(&["formats", "--json", "--config", config.to_str().unwrap()]);
    assert!(output.status.success(), "formats failed: {:?}", output.status);

    let report = stdout_json(&output);
    assert_eq!(report["ffmpeg"], "/nonexistent/ffmpeg");
    assert!(report["selected"].is_null());
    let formats = report["formats"].as_array().unwrap();
    assert_eq!(formats.len(), 2);
    assert_eq!(formats[0]["encoder"], "libvpx-vp9");
    assert_eq!(formats[0]["supported"], false);
    assert!(formats[1]["encoder"].is_null());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(
        stderr.contains("ffmpeg probe failed"),
        "expected probe warning on stderr, got: {stderr}"
    );
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn init_writes_a_loadable_config() {
    let dir = scratch_dir("init");
    let config = dir.join("reel.config.toml");

    let output = reel(&["init", config.to_str().unwrap()]);
    assert!(output.status.success(), "init failed: {:?}", output.status);
    let written = std::fs::read_to_string(&config).unwrap();
    assert!(written.contains("[encoder]"));
    assert!(written.contains("video/mp4;codecs=h264"));

    // Refuses to clobber without --force.
    let again = reel(&["init", config.to_str().unwrap()]);
    assert!(!again.status.success());
    let forced = reel(&["init", config.to_str().unwrap(), "--force"]);
    assert!(forced.status.success());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn generate_failure_leaves_stdout_empty() {
    let dir = scratch_dir("generate");
    let output = reel(&[
        "generate",
        "--json",
        "--image",
        "/nonexistent/hero.jpg",
        "--output",
        dir.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty(), "unexpected stdout: {:?}", output.stdout);
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    std::fs::remove_dir_all(&dir).ok();
}
