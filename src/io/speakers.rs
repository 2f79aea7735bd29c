use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::models::{SpeakerAttributes, SpeakerRecord, SpeakerTable, normalize_speaker_id};

/// One row of the demographic metadata table, with the source's column headers
#[derive(Debug, Deserialize)]
struct SpeakerRow {
    person_id: String,
    #[serde(rename = "Gender", default)]
    gender: String,
    #[serde(rename = "Age", default)]
    age: String,
    #[serde(rename = "Place of birth", default)]
    birth_place: String,
    #[serde(rename = "Residence", default)]
    residence: String,
    #[serde(rename = "Living in Bern since", default)]
    resident_since: String,
    #[serde(rename = "Nationality", default)]
    nationality: String,
    #[serde(rename = "Education", default)]
    education: String,
    #[serde(rename = "Origin of parents", default)]
    parents_origin: String,
    #[serde(rename = "Mother tongue of parents", default)]
    parents_mother_tongue: String,
    #[serde(default)]
    notes: String,
}

/// Load the speaker metadata CSV into a table keyed by normalized speaker id
pub fn load_speaker_file(path: &Path) -> Result<SpeakerTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open speaker metadata: {:?}", path))?;
    load_speaker_csv(file).with_context(|| format!("Failed to parse speaker metadata: {:?}", path))
}

/// Parse speaker metadata from any CSV reader.
///
/// Duplicate person ids keep the first occurrence. A double age like
/// `53/54` (interviewer shorthand for a birthday during the recording
/// period) is reduced to its first value.
pub fn load_speaker_csv<R: Read>(reader: R) -> Result<SpeakerTable> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut table = SpeakerTable::new();

    for row in csv_reader.deserialize() {
        let row: SpeakerRow = row.context("Malformed speaker metadata row")?;
        let speaker_id = normalize_speaker_id(&row.person_id);
        let age = row.age.split('/').next().unwrap_or_default().to_string();

        table.insert(SpeakerRecord {
            speaker_id,
            attributes: SpeakerAttributes {
                gender: row.gender,
                age,
                birth_place: row.birth_place,
                residence: row.residence,
                resident_since: row.resident_since,
                nationality: row.nationality,
                education: row.education,
                parents_origin: row.parents_origin,
                parents_mother_tongue: row.parents_mother_tongue,
                notes: row.notes,
            },
        });
    }

    debug!("Loaded {} speaker records", table.len());
    Ok(table)
}
