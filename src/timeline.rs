use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Anchor;

/// Fixed frame rate used to cross-reference text offsets to audio timing
pub const FRAME_RATE: u32 = 25;

/// Half-open `[start, end)` range on the global character or frame axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: u64,
    pub end: u64,
}

impl Span {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Convert a time-slot list into a lookup of slot id to elapsed seconds,
/// rounded to two decimal places. Unaligned slots are left out, so a later
/// lookup against one fails instead of inventing a position.
pub fn load_anchors(slots: &[Anchor]) -> HashMap<String, f64> {
    slots
        .iter()
        .filter_map(|slot| {
            slot.millis
                .map(|ms| (slot.id.clone(), (ms as f64 / 10.0).round() / 100.0))
        })
        .collect()
}

/// Recording duration in whole seconds: the largest anchor value rounded up,
/// or zero for a recording without time-order data
pub fn recording_duration(anchors: &HashMap<String, f64>) -> u64 {
    anchors
        .values()
        .fold(0.0_f64, |max, &v| max.max(v))
        .ceil() as u64
}

/// Seconds to frame index, rounding half away from zero
pub fn seconds_to_frames(seconds: f64) -> u64 {
    (seconds * FRAME_RATE as f64).round() as u64
}

/// Running global offsets across a sequence of recordings.
///
/// `chars` and `seconds` start at zero and only ever grow: characters are
/// allocated segment by segment, seconds advance once per fully processed
/// recording. Every absolute offset in the output derives from these two
/// counters.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    chars: u64,
    seconds: f64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chars(&self) -> u64 {
        self.chars
    }

    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    /// Allocate `len` characters on the global axis and advance the counter
    pub fn alloc_chars(&mut self, len: u64) -> Span {
        let span = Span::new(self.chars, self.chars + len);
        self.chars = span.end;
        span
    }

    /// Advance the time counter after a recording is fully processed
    pub fn advance_seconds(&mut self, duration_secs: u64) {
        self.seconds += duration_secs as f64;
    }

    /// Lift a recording-local time onto the global axis
    pub fn absolute_seconds(&self, local_seconds: f64) -> f64 {
        self.seconds + local_seconds
    }

    /// Frame span for an absolute second range.
    ///
    /// A span that would come out empty is widened to one frame so no
    /// segment or token ever occupies a zero-width range.
    pub fn frame_span(&self, start_seconds: f64, end_seconds: f64) -> Span {
        let start = seconds_to_frames(start_seconds);
        let mut end = seconds_to_frames(end_seconds);
        if end <= start {
            end = start + 1;
        }
        Span::new(start, end)
    }
}

/// Distribute a segment's frame span across its tokens, proportionally to
/// their character lengths.
///
/// Each boundary rounds to the nearest frame; the final token's end is
/// pinned to the segment end so rounding drift never leaks past the
/// segment. A token whose rounded share collapses to nothing is clamped to
/// a single frame ending at its computed end.
pub fn allocate_token_frames(frames: Span, char_lens: &[u64]) -> Vec<Span> {
    let total_chars: u64 = char_lens.iter().sum();
    if char_lens.is_empty() || total_chars == 0 {
        return Vec::new();
    }

    let total_frames = frames.len() as f64;
    let mut spans = Vec::with_capacity(char_lens.len());
    let mut current = frames.start;

    for (i, &len) in char_lens.iter().enumerate() {
        let end = if i == char_lens.len() - 1 {
            frames.end
        } else {
            let share = (len as f64 / total_chars as f64) * total_frames;
            current + share.round() as u64
        };

        if current >= end {
            spans.push(Span::new(end.saturating_sub(1), end));
        } else {
            spans.push(Span::new(current, end));
        }
        current = end;
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(id: &str, millis: Option<u64>) -> Anchor {
        Anchor {
            id: id.to_string(),
            millis,
        }
    }

    #[test]
    fn test_load_anchors_rounds_to_centiseconds() {
        let anchors = load_anchors(&[
            anchor("ts1", Some(0)),
            anchor("ts2", Some(1234)),
            anchor("ts3", Some(2566)),
        ]);

        assert_eq!(anchors["ts1"], 0.0);
        assert_eq!(anchors["ts2"], 1.23);
        assert_eq!(anchors["ts3"], 2.57);
    }

    #[test]
    fn test_load_anchors_skips_unaligned_slots() {
        let anchors = load_anchors(&[anchor("ts1", Some(500)), anchor("ts2", None)]);

        assert_eq!(anchors.len(), 1);
        assert!(!anchors.contains_key("ts2"));
    }

    #[test]
    fn test_recording_duration_ceils_max_anchor() {
        let anchors = load_anchors(&[anchor("ts1", Some(1000)), anchor("ts2", Some(62_340))]);
        assert_eq!(recording_duration(&anchors), 63);

        assert_eq!(recording_duration(&HashMap::new()), 0);
    }

    #[test]
    fn test_seconds_to_frames_rounds_half_away_from_zero() {
        assert_eq!(seconds_to_frames(0.0), 0);
        assert_eq!(seconds_to_frames(1.0), 25);
        // 0.02 s * 25 = 0.5 frames
        assert_eq!(seconds_to_frames(0.02), 1);
        assert_eq!(seconds_to_frames(2.49), 62);
    }

    #[test]
    fn test_char_allocation_is_monotonic() {
        let mut timeline = Timeline::new();

        let a = timeline.alloc_chars(10);
        let b = timeline.alloc_chars(0);
        let c = timeline.alloc_chars(5);

        assert_eq!(a, Span::new(0, 10));
        assert_eq!(b, Span::new(10, 10));
        assert_eq!(c, Span::new(10, 15));
        assert_eq!(timeline.chars(), 15);
    }

    #[test]
    fn test_seconds_accumulate_per_recording() {
        let mut timeline = Timeline::new();
        timeline.advance_seconds(63);
        assert_eq!(timeline.absolute_seconds(1.5), 64.5);

        timeline.advance_seconds(10);
        assert_eq!(timeline.seconds(), 73.0);
    }

    #[test]
    fn test_frame_span_zero_length_guard() {
        let timeline = Timeline::new();

        let span = timeline.frame_span(4.0, 4.0);
        assert_eq!(span, Span::new(100, 101));

        let span = timeline.frame_span(4.0, 4.2);
        assert_eq!(span, Span::new(100, 105));
    }

    #[test]
    fn test_proportional_allocation_absorbs_rounding_drift() {
        let spans = allocate_token_frames(Span::new(100, 110), &[2, 3, 5]);

        assert_eq!(spans, vec![
            Span::new(100, 102),
            Span::new(102, 105),
            Span::new(105, 110),
        ]);
        // The last token's end is the segment end, exactly
        assert_eq!(spans.last().unwrap().end, 110);
    }

    #[test]
    fn test_proportional_allocation_clamps_collapsed_tokens() {
        // Two tokens squeezed into a single frame
        let spans = allocate_token_frames(Span::new(10, 11), &[10, 1]);

        assert_eq!(spans[0], Span::new(10, 11));
        // Collapsed share: one frame ending at the computed end
        assert_eq!(spans[1], Span::new(10, 11));
        assert!(spans.iter().all(|s| !s.is_empty()));
    }

    #[test]
    fn test_span_display() {
        assert_eq!(Span::new(3, 8).to_string(), "[3, 8)");
    }
}
