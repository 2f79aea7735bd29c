use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// Demographic attributes for one speaker, as recorded in the metadata table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerAttributes {
    pub gender: String,
    pub age: String,
    pub birth_place: String,
    pub residence: String,
    pub resident_since: String,
    pub nationality: String,
    pub education: String,
    pub parents_origin: String,
    pub parents_mother_tongue: String,
    pub notes: String,
}

/// One known speaker (or non-speaker tier such as background noise)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakerRecord {
    pub speaker_id: String,
    pub attributes: SpeakerAttributes,
}

impl SpeakerRecord {
    /// JSON attribute blob emitted alongside the speaker id.
    ///
    /// The birth place column is kept out of the blob, like the person id.
    pub fn attribute_blob(&self) -> serde_json::Value {
        let a = &self.attributes;
        json!({
            "gender": a.gender,
            "age": a.age,
            "residence": a.residence,
            "resident_since": a.resident_since,
            "nationality": a.nationality,
            "education": a.education,
            "parents_origin": a.parents_origin,
            "parents_mother_tongue": a.parents_mother_tongue,
            "notes": a.notes,
        })
    }
}

/// Speaker metadata table keyed by normalized speaker id.
///
/// Insertion order is preserved for output; on duplicate ids the first
/// record wins and later ones are dropped.
#[derive(Debug, Clone, Default)]
pub struct SpeakerTable {
    records: Vec<SpeakerRecord>,
    index: HashMap<String, usize>,
}

impl SpeakerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record; returns false if the speaker id was already present
    pub fn insert(&mut self, record: SpeakerRecord) -> bool {
        if self.index.contains_key(&record.speaker_id) {
            debug!("Duplicate speaker id {} dropped", record.speaker_id);
            return false;
        }
        self.index
            .insert(record.speaker_id.clone(), self.records.len());
        self.records.push(record);
        true
    }

    /// Register a tier id seen in a recording but absent from the metadata,
    /// with empty attribute values
    pub fn ensure(&mut self, speaker_id: &str) {
        if !self.index.contains_key(speaker_id) {
            debug!("Tier {} not in speaker metadata, auto-registering", speaker_id);
            self.insert(SpeakerRecord {
                speaker_id: speaker_id.to_string(),
                attributes: SpeakerAttributes::default(),
            });
        }
    }

    pub fn get(&self, speaker_id: &str) -> Option<&SpeakerRecord> {
        self.index.get(speaker_id).map(|&i| &self.records[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeakerRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Normalize a raw tier or person identifier into a speaker id
pub fn normalize_speaker_id(raw: &str) -> String {
    raw.trim().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, gender: &str) -> SpeakerRecord {
        SpeakerRecord {
            speaker_id: id.to_string(),
            attributes: SpeakerAttributes {
                gender: gender.to_string(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_normalize_speaker_id() {
        assert_eq!(normalize_speaker_id(" T1 GP01 "), "T1_GP01");
        assert_eq!(normalize_speaker_id("T2_GP05"), "T2_GP05");
    }

    #[test]
    fn test_first_record_wins() {
        let mut table = SpeakerTable::new();
        assert!(table.insert(record("T1_GP01", "f")));
        assert!(!table.insert(record("T1_GP01", "m")));

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("T1_GP01").unwrap().attributes.gender, "f");
    }

    #[test]
    fn test_ensure_registers_unknown_tier() {
        let mut table = SpeakerTable::new();
        table.insert(record("T1_GP01", "f"));

        table.ensure("Hintergrund");
        table.ensure("T1_GP01");

        assert_eq!(table.len(), 2);
        let added = table.get("Hintergrund").unwrap();
        assert_eq!(added.attributes, SpeakerAttributes::default());
        // ensure() must not overwrite existing metadata
        assert_eq!(table.get("T1_GP01").unwrap().attributes.gender, "f");
    }

    #[test]
    fn test_attribute_blob_excludes_birth_place() {
        let mut rec = record("T1_GP01", "f");
        rec.attributes.birth_place = "Bern".to_string();
        rec.attributes.age = "23".to_string();

        let blob = rec.attribute_blob();
        assert_eq!(blob["gender"], "f");
        assert_eq!(blob["age"], "23");
        assert!(blob.get("birth_place").is_none());
        assert!(blob.get("speaker_id").is_none());
    }
}
