use serde::Deserialize;

/// Root element of an ELAN annotation file
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationDocument {
    #[serde(rename = "TIME_ORDER")]
    pub time_order: Option<TimeOrder>,
    #[serde(rename = "TIER", default)]
    pub tiers: Vec<ElanTier>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeOrder {
    #[serde(rename = "TIME_SLOT", default)]
    pub slots: Vec<ElanTimeSlot>,
}

/// A named anchor point on the recording timeline
#[derive(Debug, Clone, Deserialize)]
pub struct ElanTimeSlot {
    #[serde(rename = "@TIME_SLOT_ID")]
    pub id: String,
    /// Elapsed milliseconds; absent for unaligned slots
    #[serde(rename = "@TIME_VALUE")]
    pub value: Option<u64>,
}

/// One annotation channel, normally one per speaker
#[derive(Debug, Clone, Deserialize)]
pub struct ElanTier {
    #[serde(rename = "@TIER_ID")]
    pub id: String,
    #[serde(rename = "ANNOTATION", default)]
    pub annotations: Vec<ElanAnnotation>,
}

/// Wrapper element around a single annotation.
///
/// REF_ANNOTATION children (symbolic references used by dependent tiers)
/// carry no time alignment of their own and are ignored here.
#[derive(Debug, Clone, Deserialize)]
pub struct ElanAnnotation {
    #[serde(rename = "ALIGNABLE_ANNOTATION")]
    pub alignable: Option<AlignableAnnotation>,
}

/// A time-aligned utterance span
#[derive(Debug, Clone, Deserialize)]
pub struct AlignableAnnotation {
    #[serde(rename = "@ANNOTATION_ID")]
    pub id: String,
    #[serde(rename = "@TIME_SLOT_REF1")]
    pub start_ref: String,
    #[serde(rename = "@TIME_SLOT_REF2")]
    pub end_ref: String,
    #[serde(rename = "ANNOTATION_VALUE")]
    pub value: Option<String>,
}

impl AnnotationDocument {
    /// All time slots, in document order
    pub fn time_slots(&self) -> &[ElanTimeSlot] {
        self.time_order
            .as_ref()
            .map(|t| t.slots.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ANNOTATION_DOCUMENT AUTHOR="" FORMAT="3.0">
    <TIME_ORDER>
        <TIME_SLOT TIME_SLOT_ID="ts1" TIME_VALUE="0"/>
        <TIME_SLOT TIME_SLOT_ID="ts2" TIME_VALUE="2500"/>
        <TIME_SLOT TIME_SLOT_ID="ts3"/>
    </TIME_ORDER>
    <TIER TIER_ID="T1 GP01">
        <ANNOTATION>
            <ALIGNABLE_ANNOTATION ANNOTATION_ID="a1" TIME_SLOT_REF1="ts1" TIME_SLOT_REF2="ts2">
                <ANNOTATION_VALUE>also ehm ja</ANNOTATION_VALUE>
            </ALIGNABLE_ANNOTATION>
        </ANNOTATION>
    </TIER>
</ANNOTATION_DOCUMENT>"#;

    #[test]
    fn test_parse_annotation_document() {
        let doc: AnnotationDocument = quick_xml::de::from_str(SAMPLE).unwrap();

        assert_eq!(doc.time_slots().len(), 3);
        assert_eq!(doc.time_slots()[0].id, "ts1");
        assert_eq!(doc.time_slots()[1].value, Some(2500));
        assert_eq!(doc.time_slots()[2].value, None);

        assert_eq!(doc.tiers.len(), 1);
        assert_eq!(doc.tiers[0].id, "T1 GP01");

        let alignable = doc.tiers[0].annotations[0].alignable.as_ref().unwrap();
        assert_eq!(alignable.id, "a1");
        assert_eq!(alignable.start_ref, "ts1");
        assert_eq!(alignable.end_ref, "ts2");
        assert_eq!(alignable.value.as_deref(), Some("also ehm ja"));
    }

    #[test]
    fn test_missing_time_order() {
        let xml = r#"<ANNOTATION_DOCUMENT><TIER TIER_ID="x"/></ANNOTATION_DOCUMENT>"#;
        let doc: AnnotationDocument = quick_xml::de::from_str(xml).unwrap();

        assert!(doc.time_slots().is_empty());
        assert_eq!(doc.tiers.len(), 1);
        assert!(doc.tiers[0].annotations.is_empty());
    }
}
