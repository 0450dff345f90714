/*!
 * Tests for Whisper transcript handling
 */

use autoshorts::alignment::{parse_whisper_json, save_words, WhisperAligner, WordAligner};
use autoshorts::assembly::WordCue;
use std::path::Path;

use crate::common::create_temp_dir;

const TRANSCRIPT: &str = r#"{
  "text": " Salt comes from rocks.",
  "segments": [
    {
      "id": 0, "start": 0.0, "end": 1.4, "text": " Salt comes",
      "words": [
        {"word": " Salt", "start": 0.0, "end": 0.42, "probability": 0.98},
        {"word": " comes", "start": 0.42, "end": 0.9, "probability": 0.95}
      ]
    },
    {
      "id": 1, "start": 1.4, "end": 2.6, "text": " from rocks.",
      "words": [
        {"word": " from", "start": 1.4, "end": 1.7},
        {"word": "   ", "start": 1.7, "end": 1.75},
        {"word": " rocks.", "start": 1.75, "end": 2.6}
      ]
    }
  ],
  "language": "en"
}"#;

#[test]
fn test_parseWhisperJson_shouldFlattenSegmentsInOrder() {
    let cues = parse_whisper_json(TRANSCRIPT).unwrap();

    assert_eq!(
        cues,
        vec![
            WordCue::new("Salt", 0.0, 0.42),
            WordCue::new("comes", 0.42, 0.9),
            WordCue::new("from", 1.4, 1.7),
            WordCue::new("rocks.", 1.75, 2.6),
        ]
    );
}

#[test]
fn test_parseWhisperJson_withoutWordTimestamps_shouldReturnNoCues() {
    let cues = parse_whisper_json(r#"{"segments":[{"text":"hi","start":0,"end":1}]}"#).unwrap();
    assert!(cues.is_empty());
}

#[test]
fn test_parseWhisperJson_withInvalidJson_shouldFail() {
    assert!(parse_whisper_json("{").is_err());
}

#[test]
fn test_whisperAligner_buildArgs_shouldRequestWordTimestampsAsJson() {
    let aligner = WhisperAligner::new("whisper", "small", "/tmp/work");
    let args = aligner.build_args(Path::new("/p/voiceover.mp3"));

    assert_eq!(args[0], "/p/voiceover.mp3");
    assert!(args.windows(2).any(|w| w[0] == "--model" && w[1] == "small"));
    assert!(args.windows(2).any(|w| w[0] == "--word_timestamps" && w[1] == "True"));
    assert!(args.windows(2).any(|w| w[0] == "--output_format" && w[1] == "json"));
    assert_eq!(aligner.transcript_path(Path::new("/p/voiceover.mp3")), Path::new("/tmp/work/voiceover.json"));
}

#[tokio::test]
async fn test_whisperAligner_withMissingAudio_shouldFail() {
    let dir = create_temp_dir().unwrap();
    let aligner = WhisperAligner::new("whisper", "base", dir.path());
    assert!(aligner.align(&dir.path().join("missing.mp3")).await.is_err());
}

#[test]
fn test_saveWords_shouldWriteCuesAsJson() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("words.json");
    let cues = vec![WordCue::new("one", 0.0, 0.5), WordCue::new("two", 0.5, 0.9)];

    save_words(&path, &cues).unwrap();
    let saved: Vec<WordCue> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved, cues);
}
