// Unit tests for business rules

#[cfg(test)]
mod tests {
    use crate::domain::model::*;
    use crate::domain::rules::*;

    #[test]
    fn test_webm_selects_open_codec_pair() {
        let profile = CodecSelector::profile_for(TargetFormat::Webm);
        assert_eq!(profile.video_codec, "libvpx-vp9");
        assert_eq!(profile.audio_codec, "libopus");
    }

    #[test]
    fn test_default_formats_select_h264_aac() {
        for format in TargetFormat::ALL.iter().filter(|f| **f != TargetFormat::Webm) {
            let profile = CodecSelector::profile_for(*format);
            assert_eq!(profile.video_codec, "libx264", "format {}", format);
            assert_eq!(profile.audio_codec, "aac", "format {}", format);
        }
    }

    #[test]
    fn test_profiles_never_mix_codec_families() {
        for format in TargetFormat::ALL {
            let profile = CodecSelector::profile_for(format);
            let open_video = profile.video_codec == "libvpx-vp9";
            let open_audio = profile.audio_codec == "libopus";
            assert_eq!(open_video, open_audio, "format {} mixes families", format);
        }
    }

    #[test]
    fn test_quality_is_fixed() {
        for format in TargetFormat::ALL {
            let profile = CodecSelector::profile_for(format);
            assert_eq!(profile.preset, "medium");
            assert_eq!(profile.crf, 23);
        }
    }

    #[test]
    fn test_codec_args_fragment() {
        let args = CodecSelector::profile_for(TargetFormat::Webm).codec_args();
        assert_eq!(args, ["-c:v", "libvpx-vp9", "-c:a", "libopus"].map(String::from));
    }

    #[test]
    fn test_faststart_only_for_iso_containers() {
        assert_eq!(
            CodecSelector::container_args(TargetFormat::Mp4),
            &["-movflags", "+faststart"]
        );
        assert!(CodecSelector::container_args(TargetFormat::M4v).contains(&"+faststart"));
        assert!(CodecSelector::container_args(TargetFormat::Mkv).is_empty());
        assert!(CodecSelector::container_args(TargetFormat::Webm).is_empty());
    }

    #[test]
    fn test_parse_line_with_surrounding_noise() {
        let line = "frame=  120 fps= 30 q=28.0 size=     512kB time=00:01:30.50 bitrate= 699.1kbits/s speed=1.2x";
        assert_eq!(TimestampParser::parse_line(line), Some(90.5));
    }

    #[test]
    fn test_parse_line_fraction_widths() {
        assert_eq!(TimestampParser::parse_line("time=00:01:30.5"), Some(90.5));
        assert_eq!(TimestampParser::parse_line("time=00:01:30.500"), Some(90.5));
        assert_eq!(TimestampParser::parse_line("time=00:01:30.50"), Some(90.5));
    }

    #[test]
    fn test_parse_line_hours() {
        let elapsed = TimestampParser::parse_line("size=1kB time=01:02:03.25 bitrate=1").unwrap();
        assert!((elapsed - 3723.25).abs() < 1e-9);
    }

    #[test]
    fn test_parse_line_ignores_non_progress_lines() {
        assert_eq!(TimestampParser::parse_line("Input #0, mov,mp4,m4a, from 'a.mp4':"), None);
        assert_eq!(TimestampParser::parse_line("  Duration: 00:01:30.00, start: 0.000000"), None);
        assert_eq!(TimestampParser::parse_line("size=N/A time=N/A bitrate=N/A"), None);
        assert_eq!(TimestampParser::parse_line(""), None);
    }

    #[test]
    fn test_percent_clamped_at_100() {
        let elapsed = TimestampParser::parse_line("... time=00:01:30.50 ...").unwrap();
        assert_eq!(percent_complete(elapsed, Some(90.0)), Some(100.0));
    }

    #[test]
    fn test_percent_midway() {
        assert_eq!(percent_complete(45.0, Some(90.0)), Some(50.0));
        assert_eq!(percent_complete(0.0, Some(90.0)), Some(0.0));
    }

    #[test]
    fn test_percent_unknown_duration() {
        assert_eq!(percent_complete(10.0, None), None);
        assert_eq!(percent_complete(10.0, Some(0.0)), None);
        assert_eq!(percent_complete(10.0, Some(f64::NAN)), None);
    }
}
