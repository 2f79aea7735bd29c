use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::json;

use crate::models::SpeakerTable;
use crate::pipeline::{DocumentRecord, FormDictionary};

/// Writes the tab-separated document/segment/token tables.
///
/// One row set per recording as documents stream through; the form
/// dictionary and the speaker attribute table are written once at the end
/// of the run. Token rows reference forms by dictionary id and carry their
/// owning segment's frame range.
pub struct TablesEmitter {
    out_dir: PathBuf,
    documents: csv::Writer<File>,
    segments: csv::Writer<File>,
    tokens: csv::Writer<File>,
    fts_vectors: csv::Writer<File>,
}

fn tsv_writer(path: &Path) -> Result<csv::Writer<File>> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_path(path)
        .with_context(|| format!("Failed to create output file: {:?}", path))
}

impl TablesEmitter {
    pub fn create(out_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;

        let mut documents = tsv_writer(&out_dir.join("document.tsv"))?;
        documents.write_record(["document_id", "char_range", "frame_range", "media"])?;

        let mut segments = tsv_writer(&out_dir.join("segment.tsv"))?;
        segments.write_record([
            "segment_id",
            "char_range",
            "frame_range",
            "speaker_id",
            "document_id",
        ])?;

        let mut tokens = tsv_writer(&out_dir.join("token.tsv"))?;
        tokens.write_record([
            "token_id",
            "form_id",
            "char_range",
            "frame_range",
            "segment_id",
            "meta",
        ])?;

        let mut fts_vectors = tsv_writer(&out_dir.join("fts_vector.tsv"))?;
        fts_vectors.write_record(["segment_id", "vector"])?;

        Ok(Self {
            out_dir: out_dir.to_path_buf(),
            documents,
            segments,
            tokens,
            fts_vectors,
        })
    }

    pub fn add_document(&mut self, doc: &DocumentRecord) -> Result<()> {
        let media = json!({ "audio": doc.media }).to_string();
        self.documents.write_record([
            doc.document_id.as_str(),
            doc.char_range.to_string().as_str(),
            doc.frame_range.to_string().as_str(),
            media.as_str(),
        ])?;

        for segment in &doc.segments {
            let segment_frames = segment.frame_range.to_string();
            self.segments.write_record([
                segment.segment_id.as_str(),
                segment.char_range.to_string().as_str(),
                segment_frames.as_str(),
                segment.speaker_id.as_str(),
                doc.document_id.as_str(),
            ])?;

            let vector = segment
                .tokens
                .iter()
                .enumerate()
                .map(|(n, token)| format!("'1{}':{}", token.form, n + 1))
                .collect::<Vec<_>>()
                .join(" ");
            self.fts_vectors
                .write_record([segment.segment_id.as_str(), vector.as_str()])?;

            for token in &segment.tokens {
                let meta = json!({
                    "alternative": token.alternative.as_deref().unwrap_or("-"),
                    "note": token.category.as_str(),
                })
                .to_string();
                self.tokens.write_record([
                    token.token_id.as_str(),
                    token.form_id.to_string().as_str(),
                    token.char_range.to_string().as_str(),
                    segment_frames.as_str(),
                    segment.segment_id.as_str(),
                    meta.as_str(),
                ])?;
            }
        }
        Ok(())
    }

    /// Write the form dictionary and speaker attributes, then flush everything
    pub fn finish(mut self, forms: &FormDictionary, speakers: &SpeakerTable) -> Result<()> {
        let mut form_writer = tsv_writer(&self.out_dir.join("token_form.tsv"))?;
        form_writer.write_record(["form_id", "form"])?;
        for (id, form) in forms.iter() {
            form_writer.write_record([id.to_string().as_str(), form])?;
        }
        form_writer.flush()?;

        write_speaker_table(&self.out_dir.join("global_attribute_speaker.tsv"), speakers)?;

        self.documents.flush()?;
        self.segments.flush()?;
        self.tokens.flush()?;
        self.fts_vectors.flush()?;
        Ok(())
    }
}

/// Write the speaker attribute lookup on its own: one row per speaker with
/// a JSON attribute blob
pub fn write_speaker_table(path: &Path, speakers: &SpeakerTable) -> Result<()> {
    let mut writer = tsv_writer(path)?;
    writer.write_record(["speaker_id", "speaker"])?;
    for record in speakers.iter() {
        writer.write_record([
            record.speaker_id.as_str(),
            record.attribute_blob().to_string().as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
