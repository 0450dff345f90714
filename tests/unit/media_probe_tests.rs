/*!
 * Tests for ffprobe output parsing
 */

use autoshorts::errors::AssemblyError;
use autoshorts::media_probe::{filter_ffmpeg_stderr, parse_dimensions, parse_duration, probe_clip};
use std::path::Path;

#[test]
fn test_parseDuration_withValidOutput_shouldReturnSeconds() {
    assert_eq!(parse_duration("12.345000\n"), Some(12.345));
    assert_eq!(parse_duration("  3\n"), Some(3.0));
}

#[test]
fn test_parseDuration_withGarbage_shouldReturnNone() {
    assert_eq!(parse_duration("N/A"), None);
    assert_eq!(parse_duration(""), None);
    assert_eq!(parse_duration("-4.0"), None);
}

#[test]
fn test_parseDimensions_withCsvOutput_shouldReturnWidthAndHeight() {
    assert_eq!(parse_dimensions("1920x1080"), Some((1920, 1080)));
    assert_eq!(parse_dimensions("1080x1920x\n"), Some((1080, 1920)));
}

#[test]
fn test_parseDimensions_withMissingHeight_shouldReturnNone() {
    assert_eq!(parse_dimensions("1920"), None);
    assert_eq!(parse_dimensions("axb"), None);
}

#[test]
fn test_filterFfmpegStderr_shouldDropBannerNoise() {
    let stderr = "ffmpeg version 6.0\nbuilt with gcc\nconfiguration: --enable-gpl\n\
                  libavutil 58.2\nInput #0, mov\n[AVFilterGraph] No such filter: 'frobnicate'\n";
    assert_eq!(filter_ffmpeg_stderr(stderr), "[AVFilterGraph] No such filter: 'frobnicate'");
}

#[test]
fn test_filterFfmpegStderr_withOnlyNoise_shouldSaySo() {
    let filtered = filter_ffmpeg_stderr("ffmpeg version 6.0\n\n");
    assert!(filtered.contains("unknown ffmpeg error"));
}

#[test]
fn test_probeClip_withMissingFile_shouldFailWithMissingAsset() {
    let result = tokio_test::block_on(probe_clip(Path::new("/no/such/clip.mp4")));
    assert!(matches!(result, Err(AssemblyError::MissingAsset(_))));
}
