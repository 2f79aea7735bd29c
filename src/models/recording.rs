use serde::{Deserialize, Serialize};

/// A resolved time anchor: slot id plus elapsed milliseconds (if aligned)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anchor {
    pub id: String,
    pub millis: Option<u64>,
}

/// One utterance span within a tier, still unresolved against the anchor map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    /// Source annotation id, kept as the sentence id in line-oriented output
    pub id: String,
    pub start_ref: String,
    pub end_ref: String,
    /// Raw utterance text; None or blank means the segment is dropped
    pub text: Option<String>,
}

/// A speaker channel with its annotations in document order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tier {
    /// Normalized tier id (trimmed, spaces replaced by underscores)
    pub speaker_id: String,
    pub annotations: Vec<Annotation>,
}

/// One source transcription file, parsed and ready for the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    /// Identifier derived from the file stem
    pub id: String,
    /// Associated audio file name
    pub media: String,
    /// Time anchors in document order
    pub anchors: Vec<Anchor>,
    /// Speaker tiers in document order
    pub tiers: Vec<Tier>,
}

impl Recording {
    /// Total number of annotations across all tiers
    pub fn annotation_count(&self) -> usize {
        self.tiers.iter().map(|t| t.annotations.len()).sum()
    }
}

/// Derive the audio media file name for a recording id.
///
/// Transcription files are named `{session}_T{n}`, the matching audio file
/// `{session}_A` with the given extension.
pub fn audio_media_name(recording_id: &str, extension: &str) -> String {
    let session = recording_id
        .split_once("_T")
        .map(|(head, _)| head)
        .unwrap_or(recording_id);
    format!("{}_A.{}", session, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_media_name() {
        assert_eq!(audio_media_name("BE_2019_T01_GP03", "wav"), "BE_2019_A.wav");
        assert_eq!(audio_media_name("BE_2019_T01", "mp3"), "BE_2019_A.mp3");
        // No _T part: the whole id is the session name
        assert_eq!(audio_media_name("session", "wav"), "session_A.wav");
    }

    #[test]
    fn test_annotation_count() {
        let recording = Recording {
            id: "r1".to_string(),
            media: "r1_A.wav".to_string(),
            anchors: vec![],
            tiers: vec![
                Tier {
                    speaker_id: "s1".to_string(),
                    annotations: vec![Annotation {
                        id: "a1".to_string(),
                        start_ref: "ts1".to_string(),
                        end_ref: "ts2".to_string(),
                        text: Some("hallo".to_string()),
                    }],
                },
                Tier {
                    speaker_id: "s2".to_string(),
                    annotations: vec![],
                },
            ],
        };

        assert_eq!(recording.annotation_count(), 1);
    }
}
