use std::collections::BTreeSet;

use tracing::debug;

use crate::outline::{Outline, Resource, ResourceKind, Section, Subsection};
use crate::raw::{RawOutlineDoc, RawResource, RawSection, RawSubsection};

/// Projects a raw producer document into the canonical [`Outline`].
///
/// This is a shape-tolerant projection, not a content validator: missing
/// lists become empty, missing free text becomes `""`, a missing or negative
/// duration becomes 0, and identifiers are passed through verbatim when
/// present. No cross-field validation is performed; an empty objectives
/// list is as acceptable as a full one. The returned outline owns all of its
/// data and shares nothing with the input.
pub fn normalize(doc: RawOutlineDoc) -> Outline {
    let sections = doc
        .sections
        .unwrap_or_default()
        .into_iter()
        .map(normalize_section)
        .collect::<Vec<_>>();
    debug!(sections = sections.len(), "normalized outline document");
    Outline { sections }
}

fn normalize_section(raw: RawSection) -> Section {
    Section {
        id: raw.id.unwrap_or_default(),
        title: raw.title.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        subsections: raw
            .subsections
            .unwrap_or_default()
            .into_iter()
            .map(normalize_subsection)
            .collect(),
    }
}

fn normalize_subsection(raw: RawSubsection) -> Subsection {
    Subsection {
        id: raw.id.unwrap_or_default(),
        title: raw.title.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        duration_minutes: normalize_duration(raw.duration_minutes),
        pedagogy_tags: raw
            .pla_pillars
            .unwrap_or_default()
            .into_iter()
            .collect::<BTreeSet<_>>(),
        learning_objectives: raw.learning_objectives.unwrap_or_default(),
        keywords: raw.content_keywords.unwrap_or_default(),
        must_cover: raw.what_must_be_covered.unwrap_or_default(),
        video_resources: normalize_resources(raw.video_resources, ResourceKind::Video),
        worksheets: normalize_resources(raw.worksheets, ResourceKind::Worksheet),
        activities: normalize_resources(raw.activities, ResourceKind::Activity),
    }
}

fn normalize_duration(raw: Option<f64>) -> u32 {
    match raw {
        Some(minutes) if minutes.is_finite() && minutes >= 0.0 => minutes as u32,
        _ => 0,
    }
}

fn normalize_resources(raw: Option<Vec<RawResource>>, kind: ResourceKind) -> Vec<Resource> {
    raw.unwrap_or_default()
        .into_iter()
        .map(|resource| Resource {
            id: resource.id.unwrap_or_default(),
            title: resource.title.unwrap_or_default(),
            url: resource.url.unwrap_or_default(),
            description: resource.description.unwrap_or_default(),
            kind,
            source_url: resource.source_url,
        })
        .collect()
}
