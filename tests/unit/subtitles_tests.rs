/*!
 * Tests for word cue placement
 */

use autoshorts::assembly::{place_cues, RenderConfig, Resolution, ScreenPosition, TextStyle, WordCue};

#[test]
fn test_placeCues_withOrderedWords_shouldEmitOneCenteredEventPerWord() {
    let cues = vec![
        WordCue::new("Salt", 0.0, 0.4),
        WordCue::new("comes", 0.4, 0.8),
        WordCue::new("from", 0.8, 1.1),
    ];
    let config = RenderConfig::default();

    let events = place_cues(&cues, &config);

    assert_eq!(events.len(), 3);
    for (event, cue) in events.iter().zip(&cues) {
        assert_eq!(event.text, cue.word);
        assert_eq!(event.start, cue.start);
        assert_eq!(event.end, cue.end);
        assert_eq!(event.position, ScreenPosition::Center);
    }
}

#[test]
fn test_placeCues_withUnsortedAndOverlappingWords_shouldPreserveOrderAndCount() {
    let cues = vec![
        WordCue::new("late", 5.0, 5.5),
        WordCue::new("early", 1.0, 1.5),
        WordCue::new("overlap", 1.2, 2.0),
        WordCue::new("empty", 3.0, 3.0),
    ];

    let events = place_cues(&cues, &RenderConfig::default());

    let words: Vec<&str> = events.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(words, vec!["late", "early", "overlap", "empty"]);
    assert_eq!(events[3].start, events[3].end);
}

#[test]
fn test_placeCues_withNoWords_shouldReturnNothing() {
    assert!(place_cues(&[], &RenderConfig::default()).is_empty());
}

#[test]
fn test_placeCues_shouldCopyStyleFromRenderConfig() {
    let config = RenderConfig {
        font: "Impact".to_string(),
        font_size: 72,
        fill_color: "yellow".to_string(),
        stroke_color: "navy".to_string(),
        stroke_width: 4,
        ..RenderConfig::default()
    };

    let events = place_cues(&[WordCue::new("hi", 0.0, 1.0)], &config);
    let style = &events[0].style;

    assert_eq!(style.font, "Impact");
    assert_eq!(style.font_size, 72);
    assert_eq!(style.fill_color, "yellow");
    assert_eq!(style.stroke_color, "navy");
    assert_eq!(style.stroke_width, 4);
    assert_eq!(style.max_text_width, 980);
}

#[test]
fn test_textStyle_withLongWord_shouldShrinkFontToFit() {
    let config = RenderConfig {
        resolution: Resolution::new(1080, 1920),
        font_size: 90,
        ..RenderConfig::default()
    };
    let style = TextStyle::from_render_config(&config);

    assert_eq!(style.font_size_for("short"), 90);

    let long = "incomprehensibilities";
    let size = style.font_size_for(long);
    assert!(size < 90);
    let width = long.chars().count() as f64 * size as f64 * 0.6;
    assert!(width <= style.max_text_width as f64);
}
