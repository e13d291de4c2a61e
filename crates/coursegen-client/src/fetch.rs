use coursegen_outline::{Outline, normalize};
use tracing::debug;

use crate::backend::GenerationBackend;
use crate::errors::FetchError;

/// Retrieves the generated document for a finished job and projects it into
/// the canonical [`Outline`].
///
/// This is the single translation boundary between producer JSON and the
/// strict outline model: the backend deserializes into the partial raw
/// types, and everything past this call works with owned canonical data.
pub async fn fetch_outline(
    backend: &dyn GenerationBackend,
    curriculum_id: &str,
    teacher_id: &str,
) -> Result<Outline, FetchError> {
    let doc = backend.fetch_document(curriculum_id, teacher_id).await?;
    let outline = normalize(doc);
    debug!(
        curriculum_id,
        sections = outline.sections.len(),
        "fetched outline document"
    );
    Ok(outline)
}
