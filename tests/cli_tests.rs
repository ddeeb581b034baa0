use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary isolated from the user's config files and environment
fn vidconv(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("vidconv").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("APPDATA")
        .env_remove("RUST_LOG")
        .env_remove("VIDCONV_CONFIG")
        .env_remove("VIDCONV_FFMPEG_PATH")
        .env_remove("VIDCONV_FFPROBE_PATH")
        .env_remove("VIDCONV_LOG_LEVEL")
        .env_remove("VIDCONV_DEFAULT_FORMAT")
        .env_remove("VIDCONV_PROBE_TIMEOUT")
        .env_remove("VIDCONV_TOOL_TIMEOUT");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    vidconv(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("convert"))
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("formats"));
}

#[test]
fn test_formats_lists_output_formats() {
    let home = TempDir::new().unwrap();
    vidconv(home.path())
        .arg("formats")
        .assert()
        .success()
        .stdout("mp4\navi\nmov\nmkv\nwebm\nflv\nwmv\nm4v\n");
}

#[test]
fn test_formats_inputs() {
    let home = TempDir::new().unwrap();
    vidconv(home.path())
        .args(["formats", "--inputs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mts"))
        .stdout(predicate::str::contains("3gp"));
}

#[test]
fn test_tool_check_reports_missing_ffmpeg() {
    let home = TempDir::new().unwrap();
    vidconv(home.path())
        .args(["tool", "check", "--ffmpeg", "/nonexistent/ffmpeg"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("not available"));
}

#[test]
fn test_convert_without_ffmpeg_fails_fast() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("a.mov"), b"x").unwrap();

    vidconv(home.path())
        .args(["convert", "a.mov", "--output-dir", "out", "--ffmpeg", "/nonexistent/ffmpeg"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("ffmpeg is not available"));

    assert!(!home.path().join("out").exists());
}

#[test]
fn test_invalid_format_rejected() {
    let home = TempDir::new().unwrap();
    vidconv(home.path())
        .args(["convert", "a.mov", "--output-dir", "out", "--format", "gif"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid output format"));
}

#[test]
fn test_malformed_config_file() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("vidconv.toml"), "[vidconv\nffmpeg_path = 3").unwrap();

    vidconv(home.path())
        .arg("formats")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_env_default_format_is_validated() {
    let home = TempDir::new().unwrap();
    vidconv(home.path())
        .env("VIDCONV_DEFAULT_FORMAT", "gif")
        .arg("formats")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("VIDCONV_DEFAULT_FORMAT"));
}

#[test]
fn test_config_shows_precedence() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("vidconv.toml"),
        "[vidconv]\nffmpeg_path = \"/file/ffmpeg\"\ndefault_format = \"mkv\"\n",
    )
    .unwrap();

    vidconv(home.path())
        .env("VIDCONV_DEFAULT_FORMAT", "webm")
        .args(["config", "--ffprobe", "/cli/ffprobe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ffmpeg_path = \"/file/ffmpeg\""))
        .stdout(predicate::str::contains("ffprobe_path = \"/cli/ffprobe\""))
        .stdout(predicate::str::contains("default_format = \"webm\""));
}

#[cfg(unix)]
mod with_fake_tools {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Fails any input whose name contains "broken"
    fn fake_ffmpeg(dir: &Path) -> PathBuf {
        script(
            dir,
            "ffmpeg",
            r#"[ "$1" = "-version" ] && { echo "ffmpeg version 6.0"; exit 0; }
for last; do :; done
case "$2" in *broken*) echo "Invalid data found when processing input" >&2; exit 1;; esac
printf 'frame=1 time=00:00:05.00 speed=1x\r' >&2
printf 'frame=2 time=00:00:10.00 speed=1x\r' >&2
printf 'converted' > "$last""#,
        )
    }

    fn fake_ffprobe(dir: &Path) -> PathBuf {
        script(
            dir,
            "ffprobe",
            r#"echo '{"format": {"format_name": "mov,mp4,m4a", "duration": "10.0"}}'"#,
        )
    }

    #[test]
    fn test_convert_json_events() {
        let home = TempDir::new().unwrap();
        let tools = TempDir::new().unwrap();
        let videos = home.path().join("videos");
        std::fs::create_dir(&videos).unwrap();
        std::fs::write(videos.join("a.mov"), b"x").unwrap();
        std::fs::write(videos.join("b.avi"), b"x").unwrap();

        let output = vidconv(home.path())
            .arg("convert")
            .arg(&videos)
            .args(["--output-dir", "out", "--format", "mkv", "--json"])
            .arg("--ffmpeg")
            .arg(fake_ffmpeg(tools.path()))
            .arg("--ffprobe")
            .arg(fake_ffprobe(tools.path()))
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let events: Vec<serde_json::Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        let finished: Vec<&serde_json::Value> = events
            .iter()
            .filter(|e| e["event"] == "job_finished")
            .collect();
        assert_eq!(finished.len(), 2);
        assert!(finished.iter().all(|e| e["status"] == "succeeded"));
        assert!(events.iter().any(|e| e["event"] == "progress" && e["percent"] == 100.0));
        assert_eq!(events.last().unwrap()["event"], "batch_finished");
        assert_eq!(events.last().unwrap()["succeeded"], 2);

        let out = home.path().join("out");
        assert_eq!(std::fs::read(out.join("a.mkv")).unwrap(), b"converted");
        assert!(out.join("b.mkv").exists());
    }

    #[test]
    fn test_convert_partial_failure_exit_code() {
        let home = TempDir::new().unwrap();
        let tools = TempDir::new().unwrap();
        std::fs::write(home.path().join("good.mov"), b"x").unwrap();
        std::fs::write(home.path().join("broken.mov"), b"x").unwrap();

        vidconv(home.path())
            .args(["convert", "good.mov", "broken.mov", "--output-dir", "out"])
            .arg("--ffmpeg")
            .arg(fake_ffmpeg(tools.path()))
            .arg("--ffprobe")
            .arg(fake_ffprobe(tools.path()))
            .assert()
            .code(1)
            .stdout(predicate::str::contains("✓ good.mov"))
            .stdout(predicate::str::contains("✗ broken.mov"))
            .stdout(predicate::str::contains("Invalid data found"))
            .stdout(predicate::str::contains("Done: 1 succeeded, 1 failed"));
    }

    #[test]
    fn test_inspect_json() {
        let home = TempDir::new().unwrap();
        let tools = TempDir::new().unwrap();
        std::fs::write(home.path().join("clip.bin"), b"x").unwrap();

        let output = vidconv(home.path())
            .args(["inspect", "clip.bin", "--output", "json"])
            .arg("--ffprobe")
            .arg(fake_ffprobe(tools.path()))
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let reports: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(reports[0]["format"], "mov");
        assert_eq!(reports[0]["duration"], 10.0);
    }

    #[test]
    fn test_tool_check_with_env_path() {
        let home = TempDir::new().unwrap();
        let tools = TempDir::new().unwrap();

        vidconv(home.path())
            .env("VIDCONV_FFMPEG_PATH", fake_ffmpeg(tools.path()))
            .args(["tool", "check"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ffmpeg is available"));
    }
}
