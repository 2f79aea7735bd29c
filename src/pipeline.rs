use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::ExportError;
use crate::models::Recording;
use crate::text::{Category, Classifier, Normalizer, Tokenizer};
use crate::timeline::{
    Span, Timeline, allocate_token_frames, load_anchors, recording_duration, seconds_to_frames,
};

/// Deduplicating map from token surface form to a stable integer id.
///
/// Ids are assigned in first-seen order, starting at 1, and stay stable for
/// the whole run so the token table can reference forms by id.
#[derive(Debug, Clone, Default)]
pub struct FormDictionary {
    ids: HashMap<String, u64>,
    entries: Vec<String>,
}

impl FormDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, form: &str) -> u64 {
        if let Some(&id) = self.ids.get(form) {
            return id;
        }
        let id = self.entries.len() as u64 + 1;
        self.ids.insert(form.to_string(), id);
        self.entries.push(form.to_string());
        id
    }

    /// All forms with their ids, in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, form)| (i as u64 + 1, form.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A classified token with its global ranges
#[derive(Debug, Clone, Serialize)]
pub struct TokenRecord {
    pub token_id: String,
    pub form: String,
    pub form_id: u64,
    pub alternative: Option<String>,
    pub category: Category,
    pub char_range: Span,
    /// Proportional sub-span of the owning segment's frame range
    pub frame_range: Span,
}

/// One emitted utterance with its tokens
#[derive(Debug, Clone, Serialize)]
pub struct SegmentRecord {
    pub segment_id: String,
    /// Source annotation id, used as the sentence id in line-oriented output
    pub annotation_id: String,
    pub speaker_id: String,
    /// Normalized segment text
    pub text: String,
    pub char_range: Span,
    pub frame_range: Span,
    /// Absolute start on the global time axis, in seconds
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub tokens: Vec<TokenRecord>,
}

/// One fully processed recording on the global timeline
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
    pub document_id: String,
    pub media: String,
    pub char_range: Span,
    pub frame_range: Span,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub segments: Vec<SegmentRecord>,
}

/// The single shared processing pass behind all emitters.
///
/// Owns the global timeline and the form dictionary; recordings must be fed
/// in corpus order, each one fully consumed before the next.
#[derive(Debug, Default)]
pub struct Pipeline {
    timeline: Timeline,
    forms: FormDictionary,
    normalizer: Normalizer,
    tokenizer: Tokenizer,
    classifier: Classifier,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn forms(&self) -> &FormDictionary {
        &self.forms
    }

    /// Process one recording: resolve segment spans against the anchor map,
    /// tokenize and classify, and place everything on the global axes.
    pub fn process_recording(
        &mut self,
        recording: &Recording,
    ) -> Result<DocumentRecord, ExportError> {
        let anchors = load_anchors(&recording.anchors);
        let duration = recording_duration(&anchors);

        let doc_start_seconds = self.timeline.seconds();
        let doc_end_seconds = doc_start_seconds + duration as f64;
        let doc_char_start = self.timeline.chars();

        let mut segments = Vec::new();
        for tier in &recording.tiers {
            for annotation in &tier.annotations {
                let Some(raw) = annotation.text.as_deref() else {
                    continue;
                };
                let raw = raw.trim();
                if raw.is_empty() {
                    continue;
                }
                let text = self.normalizer.normalize(raw);
                if text.trim().is_empty() {
                    debug!(
                        "Recording {}: annotation {} empty after normalization, skipped",
                        recording.id, annotation.id
                    );
                    continue;
                }

                let resolve = |slot: &str| -> Result<f64, ExportError> {
                    anchors
                        .get(slot)
                        .copied()
                        .ok_or_else(|| ExportError::UnresolvedTimeSlot {
                            recording: recording.id.clone(),
                            annotation: annotation.id.clone(),
                            slot: slot.to_string(),
                        })
                };
                let start_seconds = self.timeline.absolute_seconds(resolve(&annotation.start_ref)?);
                let end_seconds = self.timeline.absolute_seconds(resolve(&annotation.end_ref)?);

                let char_range = self.timeline.alloc_chars(text.chars().count() as u64);
                let frame_range = self.timeline.frame_span(start_seconds, end_seconds);
                let tokens = self.build_tokens(&text, char_range.start, frame_range);

                segments.push(SegmentRecord {
                    segment_id: Uuid::new_v4().to_string(),
                    annotation_id: annotation.id.clone(),
                    speaker_id: tier.speaker_id.clone(),
                    text,
                    char_range,
                    frame_range,
                    start_seconds,
                    end_seconds,
                    tokens,
                });
            }
        }

        let char_range = Span::new(doc_char_start, self.timeline.chars());
        let frame_range = Span::new(
            seconds_to_frames(doc_start_seconds),
            seconds_to_frames(doc_end_seconds),
        );
        self.timeline.advance_seconds(duration);

        Ok(DocumentRecord {
            document_id: recording.id.clone(),
            media: recording.media.clone(),
            char_range,
            frame_range,
            start_seconds: doc_start_seconds,
            end_seconds: doc_end_seconds,
            segments,
        })
    }

    /// Tokenize segment text and lay the tokens out within the segment's
    /// character and frame ranges. Token character ranges assume a single
    /// separating space between neighbours; the last token sits flush.
    fn build_tokens(&mut self, text: &str, char_base: u64, segment_frames: Span) -> Vec<TokenRecord> {
        let mut classified = Vec::new();
        for raw in self.tokenizer.split(text) {
            let cleaned = self.normalizer.normalize(raw);
            let token = self.classifier.classify(&cleaned);
            if token.form.is_empty() {
                continue;
            }
            classified.push(token);
        }

        let lens: Vec<u64> = classified
            .iter()
            .map(|t| t.form.chars().count() as u64)
            .collect();
        let frame_spans = allocate_token_frames(segment_frames, &lens);

        let last = classified.len().saturating_sub(1);
        let mut records = Vec::with_capacity(classified.len());
        let mut cursor = 0u64;
        for (i, (token, frames)) in classified.into_iter().zip(frame_spans).enumerate() {
            let char_range = Span::new(char_base + cursor, char_base + cursor + lens[i]);
            cursor += lens[i];
            if i < last {
                cursor += 1;
            }

            let form_id = self.forms.intern(&token.form);
            records.push(TokenRecord {
                token_id: Uuid::new_v4().to_string(),
                form: token.form,
                form_id,
                alternative: token.alternative,
                category: token.category,
                char_range,
                frame_range: frames,
            });
        }
        records
    }
}
