// Domain rules - Codec selection and progress arithmetic

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::domain::model::*;

/// Encoding speed/quality tradeoff applied to every job
pub const DEFAULT_PRESET: &str = "medium";

/// Constant-quality parameter applied to every job
pub const DEFAULT_CRF: u8 = 23;

/// Business rules for picking encoders per output format
pub struct CodecSelector;

impl CodecSelector {
    /// Complete codec profile for a target format.
    ///
    /// Every format shares the broadly-compatible H.264/AAC pair except WebM,
    /// which only carries the royalty-free VP9/Opus family. Both codecs are
    /// always chosen together from one table row.
    pub fn profile_for(format: TargetFormat) -> CodecProfile {
        let (video_codec, audio_codec) = match format {
            TargetFormat::Webm => ("libvpx-vp9", "libopus"),
            TargetFormat::Mp4
            | TargetFormat::Avi
            | TargetFormat::Mov
            | TargetFormat::Mkv
            | TargetFormat::Flv
            | TargetFormat::Wmv
            | TargetFormat::M4v => ("libx264", "aac"),
        };

        CodecProfile {
            video_codec,
            audio_codec,
            preset: DEFAULT_PRESET,
            crf: DEFAULT_CRF,
        }
    }

    /// Muxer flags for the target container.
    ///
    /// ISO-BMFF outputs get the index moved to the front for streaming;
    /// other muxers reject the flag.
    pub fn container_args(format: TargetFormat) -> &'static [&'static str] {
        match format {
            TargetFormat::Mp4 | TargetFormat::Mov | TargetFormat::M4v => {
                &["-movflags", "+faststart"]
            }
            _ => &[],
        }
    }
}

impl CodecProfile {
    /// The `-c:v … -c:a …` argument fragment
    pub fn codec_args(&self) -> [String; 4] {
        [
            "-c:v".to_string(),
            self.video_codec.to_string(),
            "-c:a".to_string(),
            self.audio_codec.to_string(),
        ]
    }

    /// The `-preset … -crf …` argument fragment
    pub fn quality_args(&self) -> [String; 4] {
        [
            "-preset".to_string(),
            self.preset.to_string(),
            "-crf".to_string(),
            self.crf.to_string(),
        ]
    }
}

static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"time=(\d+):(\d{1,2}):(\d{1,2})(?:\.(\d+))?").expect("time pattern is valid")
});

/// Extracts encoder position from ffmpeg diagnostic lines
pub struct TimestampParser;

impl TimestampParser {
    /// Elapsed seconds from the first `time=HH:MM:SS.ff` token on the line.
    ///
    /// The fractional part is read as a decimal fraction of any width, so
    /// `.5`, `.50` and `.500` are the same instant.
    pub fn parse_line(line: &str) -> Option<f64> {
        let caps = TIME_PATTERN.captures(line)?;

        let hours: f64 = caps.get(1)?.as_str().parse().ok()?;
        let minutes: f64 = caps.get(2)?.as_str().parse().ok()?;
        let seconds: f64 = caps.get(3)?.as_str().parse().ok()?;
        let fraction: f64 = match caps.get(4) {
            Some(digits) => format!("0.{}", digits.as_str()).parse().ok()?,
            None => 0.0,
        };

        Some(hours * 3600.0 + minutes * 60.0 + seconds + fraction)
    }
}

/// Percentage of `duration` covered by `elapsed`, clamped to [0, 100].
/// None when the duration is unknown or not positive.
pub fn percent_complete(elapsed: f64, duration: Option<f64>) -> Option<f64> {
    let duration = duration.filter(|d| d.is_finite() && *d > 0.0)?;
    Some((elapsed / duration * 100.0).clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests;
