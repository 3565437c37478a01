//! Screenshot ingestion.
//!
//! Turns dropped or listed files into locally resolvable image references.
//! Anything that is not an image is skipped with a warning rather than
//! failing the whole batch.

use std::path::Path;

use mockreel_scene_model::ImageRef;

use crate::store::SceneStore;

const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg", "avif"];

/// Whether the file name carries an image extension.
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Convert image files into `file://` references, preserving order.
pub fn ingest_images<I, P>(paths: I) -> Vec<ImageRef>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut images = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if !is_image_path(path) {
            tracing::warn!(path = %path.display(), "Skipping non-image file");
            continue;
        }
        match std::fs::canonicalize(path) {
            Ok(absolute) => images.push(ImageRef::new(format!("file://{}", absolute.display()))),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable image");
            }
        }
    }
    images
}

/// Ingest files and append them to the active scene. Returns how many were
/// added.
pub fn ingest_into<I, P>(store: &mut SceneStore, paths: I) -> usize
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let images = ingest_images(paths);
    let added = images.len();
    if added > 0 {
        store.add_screenshots(images);
    }
    added
}
