use std::path::Path;

use anyhow::{Context, Result};

use crate::models::{
    Anchor, Annotation, AnnotationDocument, Recording, Tier, audio_media_name,
    normalize_speaker_id,
};

/// Parse an ELAN file into a Recording
pub fn parse_elan_file(path: &Path) -> Result<Recording> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    let id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_elan_str(&id, &content)
}

/// Parse ELAN XML content into a Recording with the given id
pub fn parse_elan_str(id: &str, xml: &str) -> Result<Recording> {
    let document: AnnotationDocument =
        quick_xml::de::from_str(xml).with_context(|| format!("Failed to parse ELAN XML for {}", id))?;
    Ok(resolve_document(id, document))
}

/// Lower the vendor XML shape into the model the pipeline consumes
fn resolve_document(id: &str, document: AnnotationDocument) -> Recording {
    let anchors = document
        .time_slots()
        .iter()
        .map(|slot| Anchor {
            id: slot.id.clone(),
            millis: slot.value,
        })
        .collect();

    let tiers = document
        .tiers
        .into_iter()
        .map(|tier| Tier {
            speaker_id: normalize_speaker_id(&tier.id),
            annotations: tier
                .annotations
                .into_iter()
                .filter_map(|wrapper| wrapper.alignable)
                .map(|alignable| Annotation {
                    id: alignable.id,
                    start_ref: alignable.start_ref,
                    end_ref: alignable.end_ref,
                    text: alignable.value,
                })
                .collect(),
        })
        .collect();

    Recording {
        id: id.to_string(),
        media: audio_media_name(id, "wav"),
        anchors,
        tiers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ANNOTATION_DOCUMENT AUTHOR="" FORMAT="3.0">
    <TIME_ORDER>
        <TIME_SLOT TIME_SLOT_ID="ts1" TIME_VALUE="0"/>
        <TIME_SLOT TIME_SLOT_ID="ts2" TIME_VALUE="2000"/>
        <TIME_SLOT TIME_SLOT_ID="ts3"/>
    </TIME_ORDER>
    <TIER TIER_ID=" T1 GP01 ">
        <ANNOTATION>
            <ALIGNABLE_ANNOTATION ANNOTATION_ID="a1" TIME_SLOT_REF1="ts1" TIME_SLOT_REF2="ts2">
                <ANNOTATION_VALUE>also gut (lacht)</ANNOTATION_VALUE>
            </ALIGNABLE_ANNOTATION>
        </ANNOTATION>
    </TIER>
    <TIER TIER_ID="Hintergrund"/>
</ANNOTATION_DOCUMENT>"#;

    #[test]
    fn test_parse_elan_str() {
        let recording = parse_elan_str("BE_2019_T01_GP01", SAMPLE).unwrap();

        assert_eq!(recording.id, "BE_2019_T01_GP01");
        assert_eq!(recording.media, "BE_2019_A.wav");

        assert_eq!(recording.anchors.len(), 3);
        assert_eq!(recording.anchors[1].millis, Some(2000));
        assert_eq!(recording.anchors[2].millis, None);

        assert_eq!(recording.tiers.len(), 2);
        assert_eq!(recording.tiers[0].speaker_id, "T1_GP01");
        assert_eq!(recording.tiers[1].speaker_id, "Hintergrund");

        let annotation = &recording.tiers[0].annotations[0];
        assert_eq!(annotation.id, "a1");
        assert_eq!(annotation.text.as_deref(), Some("also gut (lacht)"));
    }

    #[test]
    fn test_invalid_xml_is_an_error() {
        assert!(parse_elan_str("broken", "<ANNOTATION_DOCUMENT>").is_err());
    }
}
