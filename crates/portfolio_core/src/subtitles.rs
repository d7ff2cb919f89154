//! crates/portfolio_core/src/subtitles.rs
//!
//! Captions for the narrated intro and the time lookups used for
//! karaoke-style highlighting.

use crate::domain::{PlaybackClock, Subtitle, WordTiming};
use serde::Serialize;

/// (id, start, end, text) of each intro caption, in seconds.
const INTRO_CAPTIONS: &[(u32, f64, f64, &str)] = &[
    (1, 0.3, 2.0, "Hi, my name is Nguyen Vo."),
    (2, 2.5, 8.5, "I'm a Frontend Engineer with over six years of experience building scalable, high-quality web applications."),
    (3, 9.5, 12.5, "To me, frontend development is more than UI."),
    (4, 13.0, 17.5, "It's about how users understand, trust, and interact with a product."),
    (5, 18.5, 28.0, "I primarily work with React, TypeScript, and Next.js, focusing on frontend architecture, design systems, and complex, data-heavy interfaces—where performance and clarity truly matter."),
    (6, 29.0, 38.5, "I have strong experience designing reusable component systems, optimizing rendering performance, and translating complex requirements into intuitive, reliable user experiences."),
    (7, 39.5, 45.0, "Most recently, I led frontend development for an AI-native Agentic Intelligence Platform."),
    (8, 46.0, 57.0, "I redesigned a highly complex agent interface into a ChatGPT-like conversational experience, while still supporting advanced capabilities such as orchestration controls, contextual memory, and real-time visualization."),
    (9, 58.0, 66.0, "Beyond coding, I mentor engineers, define technical standards, and care deeply about building a strong, sustainable engineering culture."),
    (10, 67.0, 72.5, "If you're building a product that values quality, scalability, and thoughtful user experience,"),
    (11, 73.0, 76.0, "I'd love to connect and contribute."),
];

/// Splits `[start, end]` across the words of `text` in proportion to each
/// word's character count. The ranges tile the caption with no gaps; the last
/// word ends exactly at `end`.
pub fn generate_word_timings(text: &str, start: f64, end: f64) -> Vec<WordTiming> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let total_chars: usize = words.iter().map(|w| w.chars().count()).sum();
    if total_chars == 0 {
        return Vec::new();
    }

    let total_duration = end - start;
    let last = words.len() - 1;
    let mut cursor = start;
    words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let weight = word.chars().count() as f64 / total_chars as f64;
            let word_end = if i == last {
                end
            } else {
                cursor + total_duration * weight
            };
            let timing = WordTiming {
                word: (*word).to_string(),
                start: cursor,
                end: word_end,
            };
            cursor = word_end;
            timing
        })
        .collect()
}

/// An ordered, non-overlapping list of captions.
#[derive(Debug, Clone, Default)]
pub struct SubtitleTrack {
    subtitles: Vec<Subtitle>,
}

impl SubtitleTrack {
    pub fn new(subtitles: Vec<Subtitle>) -> Self {
        Self { subtitles }
    }

    /// The captions of the narrated intro video.
    pub fn intro() -> Self {
        let subtitles = INTRO_CAPTIONS
            .iter()
            .map(|&(id, start, end, text)| Subtitle {
                id,
                start,
                end,
                text: text.to_string(),
                words: generate_word_timings(text, start, end),
            })
            .collect();
        Self::new(subtitles)
    }

    pub fn subtitles(&self) -> &[Subtitle] {
        &self.subtitles
    }

    /// The caption whose `[start, end)` contains `current_time`.
    pub fn active_subtitle(&self, current_time: f64) -> Option<&Subtitle> {
        self.subtitles
            .iter()
            .find(|sub| current_time >= sub.start && current_time < sub.end)
    }

    /// End of the last caption, or 0 for an empty track.
    pub fn total_duration(&self) -> f64 {
        self.subtitles.last().map_or(0.0, |sub| sub.end)
    }

    /// Combines a clock snapshot with the caption and word it points at.
    pub fn frame(&self, clock: &PlaybackClock) -> CaptionFrame {
        let subtitle = self.active_subtitle(clock.current_time);
        CaptionFrame {
            current_time: clock.current_time,
            duration: clock.duration,
            is_playing: clock.is_playing,
            is_loaded: clock.is_loaded,
            progress: progress_percent(clock.current_time, clock.duration),
            subtitle_id: subtitle.map(|s| s.id),
            text: subtitle.map(|s| s.text.clone()),
            words: subtitle.map(|s| s.words.iter().map(|w| w.word.clone()).collect()),
            active_word_index: subtitle.and_then(|s| active_word_index(s, clock.current_time)),
        }
    }
}

/// Index of the word to highlight at `current_time`.
///
/// Falls back to the most recently started word when the time sits between
/// two word ranges or past the last one, so highlighting never blanks
/// mid-caption. `None` only before the caption starts (or for a caption
/// without words).
pub fn active_word_index(subtitle: &Subtitle, current_time: f64) -> Option<usize> {
    let hit = subtitle
        .words
        .iter()
        .position(|w| current_time >= w.start && current_time < w.end);
    if hit.is_some() || current_time < subtitle.start || subtitle.words.is_empty() {
        return hit;
    }

    match subtitle.words.iter().position(|w| current_time < w.start) {
        None => Some(subtitle.words.len() - 1),
        Some(next) => Some(next.saturating_sub(1)),
    }
}

pub fn progress_percent(current_time: f64, duration: f64) -> f64 {
    if duration > 0.0 {
        current_time / duration * 100.0
    } else {
        0.0
    }
}

/// What a caption renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionFrame {
    pub current_time: f64,
    pub duration: f64,
    pub is_playing: bool,
    pub is_loaded: bool,
    pub progress: f64,
    pub subtitle_id: Option<u32>,
    pub text: Option<String>,
    pub words: Option<Vec<String>>,
    pub active_word_index: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_caption() -> Subtitle {
        SubtitleTrack::intro().subtitles()[0].clone()
    }

    #[test]
    fn word_ranges_tile_the_caption() {
        let sub = first_caption();
        let words: Vec<_> = sub.words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["Hi,", "my", "name", "is", "Nguyen", "Vo."]);

        assert_eq!(sub.words.first().map(|w| w.start), Some(0.3));
        assert_eq!(sub.words.last().map(|w| w.end), Some(2.0));
        for pair in sub.words.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert!(pair[1].start > pair[0].start);
        }
        for w in &sub.words {
            assert!(w.end > w.start);
        }
    }

    #[test]
    fn longer_words_get_more_time() {
        let sub = first_caption();
        let span = |i: usize| sub.words[i].end - sub.words[i].start;
        // "Nguyen" (6 chars) vs "my" (2 chars)
        assert!((span(4) / span(1) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn every_intro_caption_tiles_exactly() {
        for sub in SubtitleTrack::intro().subtitles() {
            assert_eq!(sub.words.first().map(|w| w.start), Some(sub.start));
            assert_eq!(sub.words.last().map(|w| w.end), Some(sub.end));
        }
    }

    #[test]
    fn empty_text_has_no_words() {
        assert!(generate_word_timings("   ", 1.0, 2.0).is_empty());
    }

    #[test]
    fn no_subtitle_outside_ranges() {
        let track = SubtitleTrack::intro();
        assert!(track.active_subtitle(0.0).is_none());
        assert!(track.active_subtitle(0.29).is_none());
        assert!(track.active_subtitle(2.2).is_none());
        assert!(track.active_subtitle(76.0).is_none());
        assert!(track.active_subtitle(120.0).is_none());
        assert_eq!(track.active_subtitle(0.3).map(|s| s.id), Some(1));
        assert_eq!(track.active_subtitle(75.9).map(|s| s.id), Some(11));
    }

    #[test]
    fn total_duration_is_last_end() {
        assert_eq!(SubtitleTrack::intro().total_duration(), 76.0);
        assert_eq!(SubtitleTrack::default().total_duration(), 0.0);
    }

    #[test]
    fn word_index_is_defined_across_the_caption() {
        for sub in SubtitleTrack::intro().subtitles() {
            let steps = 500;
            for i in 0..steps {
                let t = sub.start + (sub.end - sub.start) * i as f64 / steps as f64;
                assert!(active_word_index(sub, t).is_some(), "caption {} at {t}", sub.id);
            }
        }
    }

    #[test]
    fn word_boundaries_advance_to_next_word() {
        let sub = first_caption();
        for (i, w) in sub.words.iter().enumerate() {
            let expected = (i + 1).min(sub.words.len() - 1);
            assert_eq!(active_word_index(&sub, w.end), Some(expected), "boundary {i}");
            assert_eq!(active_word_index(&sub, w.start), Some(i));
        }
    }

    #[test]
    fn gap_between_words_holds_previous_word() {
        let sub = Subtitle {
            id: 1,
            start: 0.0,
            end: 3.0,
            text: "a b".into(),
            words: vec![
                WordTiming { word: "a".into(), start: 0.0, end: 1.0 },
                WordTiming { word: "b".into(), start: 2.0, end: 3.0 },
            ],
        };
        assert_eq!(active_word_index(&sub, 1.5), Some(0));
        assert_eq!(active_word_index(&sub, 3.5), Some(1));
        assert_eq!(active_word_index(&sub, -0.5), None);
    }

    #[test]
    fn progress_handles_unknown_duration() {
        assert_eq!(progress_percent(5.0, 0.0), 0.0);
        assert_eq!(progress_percent(19.0, 76.0), 25.0);
    }

    #[test]
    fn frame_projects_clock() {
        let track = SubtitleTrack::intro();
        let clock = PlaybackClock {
            current_time: 0.3,
            duration: 76.0,
            is_playing: true,
            is_loaded: true,
        };
        let frame = track.frame(&clock);
        assert_eq!(frame.subtitle_id, Some(1));
        assert_eq!(frame.active_word_index, Some(0));
        assert_eq!(frame.words.map(|w| w.len()), Some(6));
    }
}
