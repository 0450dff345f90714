/*!
 * Tests for the ffmpeg invocation built by the compositor
 */

use autoshorts::assembly::compositor::{escape_drawtext, format_time};
use autoshorts::assembly::{
    build_timeline, place_cues, render, AudioTrack, Compositor, RenderConfig, WordCue,
};
use autoshorts::errors::AssemblyError;
use std::path::Path;

use crate::common::{create_temp_dir, create_test_clip, create_test_file, vertical_render_config};

#[test]
fn test_checkInputs_withDurationMismatch_shouldFailWithRender() {
    let dir = create_temp_dir().unwrap();
    let clip = create_test_clip(dir.path(), "a.mp4", 30.0, 1920, 1080).unwrap();
    let audio_path = create_test_file(dir.path(), "voice.mp3", "audio").unwrap();
    let config = vertical_render_config();

    let segments = build_timeline(20.0, &[clip], 4.0, config.resolution).unwrap();
    let audio = AudioTrack::new(audio_path, 21.0);

    let result = Compositor::new(config).check_inputs(&segments, &audio);
    assert!(matches!(result, Err(AssemblyError::Render(_))));
}

#[test]
fn test_checkInputs_withDriftInsideTolerance_shouldPass() {
    let dir = create_temp_dir().unwrap();
    let clip = create_test_clip(dir.path(), "a.mp4", 30.0, 1920, 1080).unwrap();
    let audio_path = create_test_file(dir.path(), "voice.mp3", "audio").unwrap();
    let config = vertical_render_config();

    let segments = build_timeline(20.0, &[clip], 4.0, config.resolution).unwrap();
    let audio = AudioTrack::new(audio_path, 20.05);

    assert!(Compositor::new(config).check_inputs(&segments, &audio).is_ok());
}

#[test]
fn test_checkInputs_withSourceDeletedAfterPlanning_shouldFailWithMissingAsset() {
    let dir = create_temp_dir().unwrap();
    let clip = create_test_clip(dir.path(), "a.mp4", 30.0, 1920, 1080).unwrap();
    let audio_path = create_test_file(dir.path(), "voice.mp3", "audio").unwrap();
    let config = vertical_render_config();

    let segments = build_timeline(8.0, &[clip.clone()], 4.0, config.resolution).unwrap();
    std::fs::remove_file(&clip.path).unwrap();

    let result = Compositor::new(config).check_inputs(&segments, &AudioTrack::new(audio_path, 8.0));
    match result {
        Err(AssemblyError::MissingAsset(path)) => assert_eq!(path, clip.path),
        other => panic!("expected MissingAsset, got {:?}", other),
    }
}

#[test]
fn test_checkInputs_withMissingVoiceover_shouldFailWithMissingAsset() {
    let dir = create_temp_dir().unwrap();
    let clip = create_test_clip(dir.path(), "a.mp4", 30.0, 1920, 1080).unwrap();
    let config = vertical_render_config();
    let segments = build_timeline(8.0, &[clip], 4.0, config.resolution).unwrap();

    let audio = AudioTrack::new(dir.path().join("nope.mp3"), 8.0);
    let result = Compositor::new(config).check_inputs(&segments, &audio);
    assert!(matches!(result, Err(AssemblyError::MissingAsset(_))));
}

#[test]
fn test_compile_shouldHaveOneInputPerSegmentAndOneDrawtextPerEvent() {
    let dir = create_temp_dir().unwrap();
    let a = create_test_clip(dir.path(), "a.mp4", 30.0, 1920, 1080).unwrap();
    let b = create_test_clip(dir.path(), "b.mp4", 30.0, 720, 1600).unwrap();
    let audio_path = create_test_file(dir.path(), "voice.mp3", "audio").unwrap();
    let config = vertical_render_config();

    let segments = build_timeline(65.0, &[a, b], 20.0, config.resolution).unwrap();
    let cues = vec![
        WordCue::new("one", 0.0, 0.5),
        WordCue::new("two", 0.5, 1.0),
        WordCue::new("three", 1.0, 1.6),
    ];
    let events = place_cues(&cues, &config);
    let audio = AudioTrack::new(audio_path.clone(), 65.0);
    let output = dir.path().join("out.mp4");
    let script = dir.path().join("graph.txt");

    let invocation = Compositor::new(config)
        .compile(&segments, &events, &audio, &output, &script)
        .unwrap();
    let args = &invocation.args;

    assert_eq!(args.iter().filter(|a| a.as_str() == "-i").count(), segments.len() + 1);
    assert_eq!(args.iter().filter(|a| a.as_str() == "-ss").count(), segments.len());
    assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "4:a:0"));
    assert!(args.windows(2).any(|w| w[0] == "-filter_complex_script" && Path::new(&w[1]) == script));
    assert!(args.windows(2).any(|w| w[0] == "-t" && w[1] == format_time(65.0)));
    assert!(args.windows(2).any(|w| w[0] == "-c:v" && w[1] == "libx264"));
    assert!(args.windows(2).any(|w| w[0] == "-r" && w[1] == "30"));
    assert_eq!(args.last().map(Path::new), Some(output.as_path()));

    let graph = &invocation.filter_graph;
    assert_eq!(graph.matches("trim=duration=").count(), segments.len());
    assert_eq!(graph.matches("concat=n=4:v=1:a=0").count(), 1);
    assert_eq!(graph.matches("drawtext=").count(), events.len());
    assert!(graph.contains("enable='gte(t,0.500000)*lt(t,1.000000)'"));
    assert!(graph.contains("scale=3413:1920"));
    assert!(graph.contains("crop=1080:1920:1166:0"));
    assert!(graph.contains("crop=1080:1920:0:240"));
    assert!(graph.trim_end().ends_with("[outv]"));
}

#[test]
fn test_buildFilterGraph_withoutEvents_shouldPassBaseThrough() {
    let dir = create_temp_dir().unwrap();
    let a = create_test_clip(dir.path(), "a.mp4", 30.0, 1920, 1080).unwrap();
    let config = vertical_render_config();
    let segments = build_timeline(4.0, &[a], 4.0, config.resolution).unwrap();

    let graph = Compositor::new(config).build_filter_graph(&segments, &[]);
    assert!(graph.contains("[base]copy[outv]"));
    assert!(!graph.contains("drawtext"));
}

#[test]
fn test_escapeDrawtext_shouldEscapeForOptionAndGraphLevels() {
    assert_eq!(escape_drawtext("plain"), "plain");
    assert_eq!(escape_drawtext("it's"), r"it\\\'s");
    assert_eq!(escape_drawtext("10:30"), r"10\\:30");
    assert_eq!(escape_drawtext("a\\b"), r"a\\\\b");
    assert_eq!(escape_drawtext("a,b;[c]"), r"a\,b\;\[c\]");
    assert_eq!(escape_drawtext("two\nlines"), "two lines");
}

/// ffmpeg's token reader: skips leading whitespace, honors `\x` escapes and
/// `'...'` quoting, stops at any `term` char and trims unprotected trailing
/// whitespace. Returns the token and the unread input.
fn read_token<'a>(input: &'a str, term: &[char]) -> (String, &'a str) {
    let input = input.trim_start_matches([' ', '\n', '\t', '\r']);
    let mut chars = input.char_indices().peekable();
    let mut out: Vec<char> = Vec::new();
    let mut protected_len = 0;
    let mut consumed = input.len();

    while let Some(&(idx, c)) = chars.peek() {
        if term.contains(&c) {
            consumed = idx;
            break;
        }
        chars.next();
        if c == '\\' {
            if let Some((_, next)) = chars.next() {
                out.push(next);
                protected_len = out.len();
            }
        } else if c == '\'' {
            for (_, quoted) in chars.by_ref() {
                if quoted == '\'' {
                    break;
                }
                out.push(quoted);
            }
            protected_len = out.len();
        } else {
            out.push(c);
        }
    }
    while out.len() > protected_len && out.last().is_some_and(|c| c.is_whitespace()) {
        out.pop();
    }

    (out.into_iter().collect(), &input[consumed..])
}

/// Split the subtitle chain of a filter graph into per-filter option lists,
/// unescaping the graph level and then the option level.
fn parse_drawtext_options(graph: &str) -> Vec<Vec<(String, String)>> {
    let chain = graph.lines().last().unwrap();
    let mut rest = chain.strip_prefix("[base]").unwrap();
    let mut filters = Vec::new();

    while let Some(after_name) = rest.strip_prefix("drawtext=") {
        let (args, after_args) = read_token(after_name, &['[', ']', ',', ';']);
        rest = after_args;

        let mut options = Vec::new();
        let mut remaining = args.as_str();
        while !remaining.is_empty() {
            let (key, after_key) = remaining.split_once('=').unwrap();
            let (value, after_value) = read_token(after_key, &[':']);
            options.push((key.to_string(), value));
            remaining = after_value.strip_prefix(':').unwrap_or(after_value);
        }
        filters.push(options);

        rest = rest.strip_prefix(',').unwrap_or(rest);
    }
    filters
}

fn option<'a>(options: &'a [(String, String)], key: &str) -> &'a str {
    options
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .unwrap_or_else(|| panic!("option {} missing from {:?}", key, options))
}

#[test]
fn test_buildFilterGraph_withPunctuatedWords_shouldKeepEveryDrawtextOption() {
    let dir = create_temp_dir().unwrap();
    let a = create_test_clip(dir.path(), "a.mp4", 30.0, 1920, 1080).unwrap();
    let config = vertical_render_config();
    let segments = build_timeline(4.0, &[a], 4.0, config.resolution).unwrap();
    let words = ["hello", "it's", "10:30,", "[a;b]", "back\\slash", "that's"];
    let cues: Vec<WordCue> = words
        .iter()
        .enumerate()
        .map(|(i, w)| WordCue::new(*w, i as f64 * 0.5, i as f64 * 0.5 + 0.5))
        .collect();
    let events = place_cues(&cues, &config);

    let graph = Compositor::new(config.clone()).build_filter_graph(&segments, &events);
    let filters = parse_drawtext_options(&graph);

    assert_eq!(filters.len(), words.len());
    for (i, (options, word)) in filters.iter().zip(words).enumerate() {
        assert_eq!(option(options, "text"), word);
        assert_eq!(option(options, "font"), config.font);
        assert_eq!(option(options, "expansion"), "none");
        assert_eq!(option(options, "x"), "(w-text_w)/2");
        assert_eq!(
            option(options, "enable"),
            format!("gte(t,{})*lt(t,{})", format_time(i as f64 * 0.5), format_time(i as f64 * 0.5 + 0.5))
        );
        assert_eq!(options.len(), 10);
    }
}

#[test]
fn test_formatTime_shouldUseFixedPrecision() {
    assert_eq!(format_time(5.0), "5.000000");
    assert_eq!(format_time(0.1234567), "0.123457");
}

#[tokio::test]
async fn test_render_withMismatchedAudio_shouldFailBeforeSpawningFfmpeg() {
    let dir = create_temp_dir().unwrap();
    let a = create_test_clip(dir.path(), "a.mp4", 30.0, 1920, 1080).unwrap();
    let audio_path = create_test_file(dir.path(), "voice.mp3", "audio").unwrap();
    let config = RenderConfig::default();
    let segments = build_timeline(10.0, &[a], 4.0, config.resolution).unwrap();
    let output = dir.path().join("out").join("final.mp4");

    let result = render(&segments, &[], &AudioTrack::new(audio_path, 30.0), &config, &output).await;

    assert!(matches!(result, Err(AssemblyError::Render(_))));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_render_withNestedOutput_shouldCreateOutputFolderBeforeEncoding() {
    let dir = create_temp_dir().unwrap();
    let a = create_test_clip(dir.path(), "a.mp4", 30.0, 1920, 1080).unwrap();
    let audio_path = create_test_file(dir.path(), "voice.mp3", "audio").unwrap();
    let config = RenderConfig::default();
    let segments = build_timeline(4.0, &[a], 4.0, config.resolution).unwrap();
    let output = dir.path().join("renders").join("final.mp4");

    // placeholder inputs cannot be encoded, so only the folder is expected
    let result = render(&segments, &[], &AudioTrack::new(audio_path, 4.0), &config, &output).await;

    assert!(matches!(result, Err(AssemblyError::Render(_))));
    assert!(dir.path().join("renders").is_dir());
}
