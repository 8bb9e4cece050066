//! Records shared between the plan, the driver and the index page.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Metadata attached to a generation task by the plan builder and read back
/// by the driver once the task has completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Memento {
    /// Prompt name extracted from the input filename.
    pub input: String,
    pub style: String,
    pub category: String,
    /// Full prompt sent to the backend.
    pub prompt: String,
}

/// One generated image as listed on the index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedImage {
    pub category: String,
    pub path: PathBuf,
    /// Display label, `"<prompt>, #<index>"`.
    pub label: String,
}

impl GeneratedImage {
    /// Records for every file a generation produced, in output order.
    pub fn from_files(memento: &Memento, files: &[PathBuf]) -> Vec<Self> {
        files
            .iter()
            .enumerate()
            .map(|(index, path)| Self {
                category: memento.category.clone(),
                path: path.clone(),
                label: format!("{}, #{}", memento.prompt, index),
            })
            .collect()
    }

    /// Thumbnail sibling of the full image (`-full.png` → `-thumb.png`).
    pub fn thumbnail(&self) -> PathBuf {
        thumbnail_of(&self.path)
    }
}

fn thumbnail_of(path: &Path) -> PathBuf {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) if name.ends_with("-full.png") => {
            let stem = &name[..name.len() - "-full.png".len()];
            path.with_file_name(format!("{stem}-thumb.png"))
        }
        _ => path.to_path_buf(),
    }
}

/// Generated-image accumulator shared by the driver and the index task.
///
/// The driver appends after each completed generation; the index task reads
/// a snapshot when it runs. Execution is sequential, so the two never
/// overlap.
#[derive(Debug, Clone, Default)]
pub struct Gallery(Arc<Mutex<Vec<GeneratedImage>>>);

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&self, images: impl IntoIterator<Item = GeneratedImage>) {
        self.lock().extend(images);
    }

    pub fn snapshot(&self) -> Vec<GeneratedImage> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<GeneratedImage>> {
        // A poisoned lock still holds consistent data: pushes are atomic
        // from the reader's point of view.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memento() -> Memento {
        Memento {
            input: "Cat".into(),
            style: "red".into(),
            category: "Color".into(),
            prompt: "Cat, red".into(),
        }
    }

    #[test]
    fn records_label_prompt_and_index() {
        let files = vec![
            PathBuf::from("out/Color/red/Cat-0-full.png"),
            PathBuf::from("out/Color/red/Cat-1-full.png"),
        ];
        let images = GeneratedImage::from_files(&memento(), &files);
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].label, "Cat, red, #0");
        assert_eq!(images[1].label, "Cat, red, #1");
        assert_eq!(images[1].category, "Color");
        assert_eq!(images[1].path, files[1]);
    }

    #[test]
    fn no_files_no_records() {
        assert!(GeneratedImage::from_files(&memento(), &[]).is_empty());
    }

    #[test]
    fn thumbnail_path_replaces_suffix() {
        let image = GeneratedImage {
            category: "Color".into(),
            path: PathBuf::from("out/Color/red/Cat-0-full.png"),
            label: "Cat, red, #0".into(),
        };
        assert_eq!(
            image.thumbnail(),
            PathBuf::from("out/Color/red/Cat-0-thumb.png")
        );
    }

    #[test]
    fn thumbnail_path_falls_back_to_image() {
        assert_eq!(
            thumbnail_of(Path::new("a/b.png")),
            PathBuf::from("a/b.png")
        );
    }

    #[test]
    fn gallery_clones_share_storage() {
        let gallery = Gallery::new();
        let handle = gallery.clone();
        handle.extend(GeneratedImage::from_files(
            &memento(),
            &[PathBuf::from("x-0-full.png")],
        ));
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.snapshot()[0].label, "Cat, red, #0");
    }

    #[test]
    fn gallery_preserves_insertion_order() {
        let gallery = Gallery::new();
        for prompt in ["a", "b", "c"] {
            let m = Memento {
                prompt: prompt.into(),
                ..memento()
            };
            gallery.extend(GeneratedImage::from_files(&m, &[PathBuf::from("p")]));
        }
        let labels: Vec<String> = gallery.snapshot().into_iter().map(|i| i.label).collect();
        assert_eq!(labels, vec!["a, #0", "b, #0", "c, #0"]);
    }
}
