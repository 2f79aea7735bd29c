use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::json;
use tracing::debug;

use crate::io::CorpusMeta;
use crate::models::{SpeakerTable, audio_media_name};
use crate::pipeline::DocumentRecord;
use crate::text::Category;
use crate::timeline::Span;

/// Fluent builder over the corpus platform's three layers.
///
/// Documents are `Recording`s, segments `Sentence`s, tokens `Word`s, plus
/// one global `Speaker` attribute per known speaker. `make` materializes
/// everything under an output directory: a `config.json` describing the
/// layer structure and one comma-separated table per layer.
#[derive(Debug)]
pub struct Corpus {
    meta: CorpusMeta,
    speakers: Vec<(String, serde_json::Value)>,
    recordings: Vec<CorpusRecording>,
}

#[derive(Debug)]
pub struct CorpusRecording {
    name: String,
    media: String,
    frame_range: Span,
    sentences: Vec<CorpusSentence>,
}

#[derive(Debug)]
pub struct CorpusSentence {
    id: String,
    speaker_id: String,
    text: String,
    frame_range: Span,
    words: Vec<CorpusWord>,
}

#[derive(Debug)]
pub struct CorpusWord {
    id: String,
    form: String,
    category: Category,
    frame_range: Span,
}

impl Corpus {
    pub fn new(meta: CorpusMeta) -> Self {
        Self {
            meta,
            speakers: Vec::new(),
            recordings: Vec::new(),
        }
    }

    /// Register a global speaker attribute
    pub fn speaker(&mut self, speaker_id: String, attributes: serde_json::Value) {
        self.speakers.push((speaker_id, attributes));
    }

    /// Start a new document layer entry
    pub fn recording(
        &mut self,
        name: String,
        media: String,
        frame_range: Span,
    ) -> &mut CorpusRecording {
        self.recordings.push(CorpusRecording {
            name,
            media,
            frame_range,
            sentences: Vec::new(),
        });
        self.recordings.last_mut().expect("just pushed")
    }

    /// Write the corpus configuration and layer tables
    pub fn make(&self, out_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;

        let config = json!({
            "meta": {
                "name": self.meta.name,
                "description": self.meta.description,
                "date": self.meta.date,
                "revision": self.meta.revision,
                "authors": self.meta.authors,
            },
            "firstClass": {
                "document": "Recording",
                "segment": "Sentence",
                "token": "Word",
            },
            "tracks": {
                "layers": { "Sentence": { "split": ["speaker"] } },
            },
        });
        let config_path = out_dir.join("config.json");
        let config_file = File::create(&config_path)
            .with_context(|| format!("Failed to create file: {:?}", config_path))?;
        serde_json::to_writer_pretty(config_file, &config).context("Failed to write config")?;

        let mut recording_writer = csv::Writer::from_path(out_dir.join("recording.csv"))?;
        recording_writer.write_record(["recording_id", "media", "frame_range"])?;
        let mut sentence_writer = csv::Writer::from_path(out_dir.join("sentence.csv"))?;
        sentence_writer.write_record([
            "sentence_id",
            "recording_id",
            "speaker_id",
            "frame_range",
            "text",
        ])?;
        let mut word_writer = csv::Writer::from_path(out_dir.join("word.csv"))?;
        word_writer.write_record(["word_id", "sentence_id", "form", "category", "frame_range"])?;

        for recording in &self.recordings {
            recording_writer.write_record([
                recording.name.as_str(),
                recording.media.as_str(),
                recording.frame_range.to_string().as_str(),
            ])?;
            for sentence in &recording.sentences {
                sentence_writer.write_record([
                    sentence.id.as_str(),
                    recording.name.as_str(),
                    sentence.speaker_id.as_str(),
                    sentence.frame_range.to_string().as_str(),
                    sentence.text.as_str(),
                ])?;
                for word in &sentence.words {
                    word_writer.write_record([
                        word.id.as_str(),
                        sentence.id.as_str(),
                        word.form.as_str(),
                        word.category.as_str(),
                        word.frame_range.to_string().as_str(),
                    ])?;
                }
            }
        }
        recording_writer.flush()?;
        sentence_writer.flush()?;
        word_writer.flush()?;

        let mut speaker_writer =
            csv::Writer::from_path(out_dir.join("global_attribute_speaker.csv"))?;
        speaker_writer.write_record(["speaker_id", "speaker"])?;
        for (speaker_id, attributes) in &self.speakers {
            speaker_writer
                .write_record([speaker_id.as_str(), attributes.to_string().as_str()])?;
        }
        speaker_writer.flush()?;

        Ok(())
    }
}

impl CorpusRecording {
    /// Add a segment layer entry to this document
    pub fn sentence(
        &mut self,
        id: String,
        speaker_id: String,
        text: String,
        frame_range: Span,
    ) -> &mut CorpusSentence {
        self.sentences.push(CorpusSentence {
            id,
            speaker_id,
            text,
            frame_range,
            words: Vec::new(),
        });
        self.sentences.last_mut().expect("just pushed")
    }
}

impl CorpusSentence {
    /// Add a token layer entry with its own frame sub-span
    pub fn word(&mut self, id: String, form: String, category: Category, frame_range: Span) {
        self.words.push(CorpusWord {
            id,
            form,
            category,
            frame_range,
        });
    }
}

/// Drives the builder from the shared document stream.
///
/// This is the timing-aware export: words carry their proportional frame
/// sub-spans. Audio files are referenced as `.wav` and copied next to the
/// corpus when `copy_audio` is set, otherwise referenced as `.mp3`.
pub struct CorpusEmitter {
    corpus: Corpus,
    out_dir: PathBuf,
    data_dir: PathBuf,
    copy_audio: bool,
}

impl CorpusEmitter {
    pub fn new(meta: CorpusMeta, out_dir: &Path, data_dir: &Path, copy_audio: bool) -> Self {
        Self {
            corpus: Corpus::new(meta),
            out_dir: out_dir.to_path_buf(),
            data_dir: data_dir.to_path_buf(),
            copy_audio,
        }
    }

    pub fn add_document(&mut self, doc: &DocumentRecord) -> Result<()> {
        let extension = if self.copy_audio { "wav" } else { "mp3" };
        let media = audio_media_name(&doc.document_id, extension);
        if self.copy_audio {
            self.copy_media(&media)?;
        }

        let recording = self
            .corpus
            .recording(doc.document_id.clone(), media, doc.frame_range);
        for segment in &doc.segments {
            let sentence = recording.sentence(
                segment.segment_id.clone(),
                segment.speaker_id.clone(),
                segment.text.clone(),
                segment.frame_range,
            );
            for token in &segment.tokens {
                sentence.word(
                    token.token_id.clone(),
                    token.form.clone(),
                    token.category,
                    token.frame_range,
                );
            }
        }
        Ok(())
    }

    fn copy_media(&self, media: &str) -> Result<()> {
        let source = self.data_dir.join(media);
        if !source.exists() {
            debug!("Audio file {:?} not found, skipping copy", source);
            return Ok(());
        }
        let media_dir = self.out_dir.join("media");
        std::fs::create_dir_all(&media_dir)
            .with_context(|| format!("Failed to create media directory: {:?}", media_dir))?;
        std::fs::copy(&source, media_dir.join(media))
            .with_context(|| format!("Failed to copy audio file: {:?}", source))?;
        Ok(())
    }

    /// Attach speaker attributes and materialize the corpus
    pub fn finish(mut self, speakers: &SpeakerTable) -> Result<()> {
        for record in speakers.iter() {
            let mut blob = record.attribute_blob();
            if let Some(map) = blob.as_object_mut() {
                map.insert("id".to_string(), json!(record.speaker_id));
            }
            self.corpus.speaker(record.speaker_id.clone(), blob);
        }
        self.corpus.make(&self.out_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Anchor, Annotation, Recording, Tier};
    use crate::pipeline::Pipeline;

    fn meta() -> CorpusMeta {
        CorpusMeta {
            name: "Interviews 2019".to_string(),
            description: "Spoken interviews".to_string(),
            date: "2019-06-01".to_string(),
            revision: "1".to_string(),
            authors: "Field team".to_string(),
        }
    }

    fn sample_recording() -> Recording {
        Recording {
            id: "BE_2019_T01".to_string(),
            media: "BE_2019_A.wav".to_string(),
            anchors: vec![
                Anchor {
                    id: "ts1".to_string(),
                    millis: Some(0),
                },
                Anchor {
                    id: "ts2".to_string(),
                    millis: Some(2000),
                },
            ],
            tiers: vec![Tier {
                speaker_id: "T1_GP01".to_string(),
                annotations: vec![Annotation {
                    id: "a1".to_string(),
                    start_ref: "ts1".to_string(),
                    end_ref: "ts2".to_string(),
                    text: Some("also gut".to_string()),
                }],
            }],
        }
    }

    #[test]
    fn test_corpus_export() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = tempfile::tempdir().unwrap();

        let mut pipeline = Pipeline::new();
        let doc = pipeline.process_recording(&sample_recording()).unwrap();

        let mut emitter = CorpusEmitter::new(meta(), dir.path(), data_dir.path(), false);
        emitter.add_document(&doc).unwrap();

        let mut speakers = SpeakerTable::new();
        speakers.ensure("T1_GP01");
        emitter.finish(&speakers).unwrap();

        let config: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("config.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(config["meta"]["name"], "Interviews 2019");
        assert_eq!(config["firstClass"]["token"], "Word");
        assert_eq!(config["tracks"]["layers"]["Sentence"]["split"][0], "speaker");

        let recordings = std::fs::read_to_string(dir.path().join("recording.csv")).unwrap();
        // Without audio copying the media reference is an mp3
        assert!(recordings.contains("BE_2019_T01,BE_2019_A.mp3,\"[0, 50)\""));

        let words = std::fs::read_to_string(dir.path().join("word.csv")).unwrap();
        assert!(words.contains(",also,-,"));
        assert!(words.contains(",gut,-,"));

        let speakers_out =
            std::fs::read_to_string(dir.path().join("global_attribute_speaker.csv")).unwrap();
        assert!(speakers_out.contains("T1_GP01"));
        assert!(speakers_out.contains("\"\"id\"\":\"\"T1_GP01\"\""));
    }

    #[test]
    fn test_words_carry_proportional_spans() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = tempfile::tempdir().unwrap();

        let mut pipeline = Pipeline::new();
        let doc = pipeline.process_recording(&sample_recording()).unwrap();

        let mut emitter = CorpusEmitter::new(meta(), dir.path(), data_dir.path(), false);
        emitter.add_document(&doc).unwrap();
        emitter.finish(&SpeakerTable::new()).unwrap();

        let words = std::fs::read_to_string(dir.path().join("word.csv")).unwrap();
        // "also gut": 4 and 3 chars over 50 frames -> [0, 29) and [29, 50)
        assert!(words.contains("\"[0, 29)\""));
        assert!(words.contains("\"[29, 50)\""));
    }
}
