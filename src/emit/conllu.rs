use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::pipeline::DocumentRecord;

/// Writes the line-oriented annotated token format.
///
/// One file per run: a single column header, then per document a `newdoc`
/// comment block, per segment a sentence comment block followed by one
/// tab-separated line per token. All offsets are seconds on the global
/// timeline.
pub struct ConlluEmitter {
    out: BufWriter<File>,
}

impl ConlluEmitter {
    pub fn create(path: &Path) -> Result<Self> {
        let file =
            File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;
        let mut out = BufWriter::new(file);
        writeln!(out, "# global.columns = ID FORM LEMMA MISC")?;
        Ok(Self { out })
    }

    pub fn add_document(&mut self, doc: &DocumentRecord) -> Result<()> {
        self.out.write_all(format_document(doc).as_bytes())?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.out.flush().context("Failed to flush output")?;
        Ok(())
    }
}

/// Render one document as its comment blocks and token lines
pub fn format_document(doc: &DocumentRecord) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n# newdoc id = {}\n", doc.document_id));
    out.push_str(&format!("# newdoc audio = {}\n", doc.media));
    out.push_str(&format!("# newdoc start = {}\n", doc.start_seconds));
    out.push_str(&format!("# newdoc end = {}\n", doc.end_seconds));

    for segment in &doc.segments {
        out.push_str(&format!("\n# sent_id = {}\n", segment.annotation_id));
        out.push_str(&format!("# speaker_id = {}\n", segment.speaker_id));
        out.push_str(&format!("# start = {}\n", segment.start_seconds));
        out.push_str(&format!("# end = {}\n", segment.end_seconds));
        out.push_str(&format!("# text = {}\n", segment.text));

        for (position, token) in segment.tokens.iter().enumerate() {
            out.push_str(&format!(
                "{}\t{}\t{}\tnote={}|start={}|end={}\n",
                position + 1,
                token.form,
                token.form,
                token.category,
                segment.start_seconds,
                segment.end_seconds,
            ));
        }
    }

    out
}
