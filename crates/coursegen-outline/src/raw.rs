//! Partial document types for producer-supplied outline JSON.
//!
//! The producer is an external generation service whose payloads drift:
//! whole lists go missing, free-text fields are omitted, and field names
//! vary between generations. Every field here is therefore optional, and
//! these types are the only ones that touch producer JSON. The rest of the
//! codebase works with the strict types in [`crate::outline`].

/// Top-level generated document as fetched from the producer.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
pub struct RawOutlineDoc {
    pub sections: Option<Vec<RawSection>>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
pub struct RawSection {
    #[serde(alias = "section_id")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub subsections: Option<Vec<RawSubsection>>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
pub struct RawSubsection {
    #[serde(alias = "subsection_id")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<f64>,
    pub pla_pillars: Option<Vec<String>>,
    pub learning_objectives: Option<Vec<String>>,
    pub content_keywords: Option<Vec<String>>,
    pub what_must_be_covered: Option<String>,
    pub video_resources: Option<Vec<RawResource>>,
    pub worksheets: Option<Vec<RawResource>>,
    pub activities: Option<Vec<RawResource>>,
}

/// One entry of a `video_resources`/`worksheets`/`activities` list.
///
/// Older producer generations used per-kind field names (`video_id`,
/// `worksheet_title`, `image_url`); the aliases keep both shapes decodable.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
pub struct RawResource {
    #[serde(alias = "video_id")]
    pub id: Option<String>,
    #[serde(alias = "worksheet_title")]
    pub title: Option<String>,
    #[serde(alias = "image_url")]
    pub url: Option<String>,
    pub description: Option<String>,
    pub source_url: Option<String>,
}
