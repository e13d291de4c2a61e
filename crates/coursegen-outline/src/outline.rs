use std::collections::BTreeSet;

/// Canonical course outline produced by the normalizer.
///
/// The outline is immutable by convention: it is constructed once from a raw
/// producer document and handed downstream by value. Editors that need to
/// mutate it operate on a `clone()`.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Outline {
    /// Top-level sections in presentation order.
    pub sections: Vec<Section>,
}

impl Outline {
    /// Sums `duration_minutes` across every subsection.
    pub fn total_duration_minutes(&self) -> u32 {
        self.sections
            .iter()
            .flat_map(|section| &section.subsections)
            .map(|sub| sub.duration_minutes)
            .sum()
    }

    /// Returns true when the outline has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// A top-level unit of the course.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Section {
    /// Producer-assigned identifier, passed through verbatim.
    ///
    /// Downstream UI state is keyed off these ids, so the normalizer never
    /// regenerates them.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Subsections in presentation order.
    pub subsections: Vec<Subsection>,
}

/// A teachable unit inside a section.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Subsection {
    /// Producer-assigned identifier, passed through verbatim.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Planned teaching time. Absent or negative producer values become 0.
    pub duration_minutes: u32,
    /// Pedagogy pillar tags (deduplicated, ordered deterministically).
    pub pedagogy_tags: BTreeSet<String>,
    pub learning_objectives: Vec<String>,
    pub keywords: Vec<String>,
    /// Free-text content requirements for this unit.
    pub must_cover: String,
    pub video_resources: Vec<Resource>,
    pub worksheets: Vec<Resource>,
    pub activities: Vec<Resource>,
}

/// Kind of an attached teaching resource.
///
/// The producer does not tag resource entries; the kind is derived from the
/// list an entry arrived in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Video,
    Worksheet,
    Activity,
}

/// A single teaching resource attached to a subsection.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub kind: ResourceKind,
    /// Page the resource was discovered on, when the producer recorded one.
    pub source_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_duration_sums_all_subsections() {
        let outline = Outline {
            sections: vec![
                Section {
                    subsections: vec![
                        Subsection {
                            duration_minutes: 20,
                            ..Subsection::default()
                        },
                        Subsection {
                            duration_minutes: 15,
                            ..Subsection::default()
                        },
                    ],
                    ..Section::default()
                },
                Section {
                    subsections: vec![Subsection {
                        duration_minutes: 5,
                        ..Subsection::default()
                    }],
                    ..Section::default()
                },
            ],
        };
        assert_eq!(outline.total_duration_minutes(), 40);
    }

    #[test]
    fn empty_outline_reports_empty() {
        assert!(Outline::default().is_empty());
    }
}
