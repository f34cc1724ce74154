// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Input source handling for the `predict` command.
//!
//! A source is an image, a directory or glob of images, or a JSON file of
//! pre-computed landmarks. Landmark files hold one hand (`[[x, y, z], ...]`)
//! or a list of hands; each hand is yielded as a separate item.

use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{GestureError, Result};
use crate::landmarks::Landmark;

/// Image file extensions recognized in directories and globs.
pub const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "bmp", "gif", "webp", "tiff", "tif"];

/// Represents different input sources for recognition.
#[derive(Debug, Clone)]
pub enum Source {
    /// Path to an image file.
    Image(PathBuf),
    /// In-memory image.
    ImageBuffer(DynamicImage),
    /// JSON file of landmark sets.
    Landmarks(PathBuf),
    /// Directory containing images.
    Directory(PathBuf),
    /// Glob pattern for images.
    Glob(String),
}

impl Source {
    /// Whether this source needs a landmark model.
    #[must_use]
    pub const fn needs_landmarker(&self) -> bool {
        !matches!(self, Self::Landmarks(_))
    }
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        if s.contains('*') {
            return Self::Glob(s.to_string());
        }

        let path = PathBuf::from(s);
        if path.is_dir() {
            return Self::Directory(path);
        }
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        {
            return Self::Landmarks(path);
        }
        Self::Image(path)
    }
}

impl From<String> for Source {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Self::from(path.to_string_lossy().as_ref())
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Self::from(path.to_string_lossy().as_ref())
    }
}

impl From<DynamicImage> for Source {
    fn from(img: DynamicImage) -> Self {
        Self::ImageBuffer(img)
    }
}

/// One item to recognize.
#[derive(Debug, Clone)]
pub enum Input {
    /// Decoded image for the landmark model.
    Image(DynamicImage),
    /// Raw landmark points, not yet validated.
    Landmarks(Vec<Landmark>),
}

/// Metadata about a source item.
#[derive(Debug, Clone, Default)]
pub struct SourceMeta {
    /// Item index within the source.
    pub index: usize,
    /// Total items in the source.
    pub total: usize,
    /// Source path or identifier.
    pub path: String,
}

/// Iterator over the items of a source.
pub struct SourceIterator {
    items: std::vec::IntoIter<Pending>,
    total: usize,
    index: usize,
}

enum Pending {
    Path(PathBuf),
    Image(DynamicImage),
    Hand(PathBuf, Vec<Landmark>),
}

impl SourceIterator {
    /// Create a new source iterator.
    ///
    /// Landmark files are read up front; images are decoded lazily.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or glob cannot be listed, or a landmark
    /// file cannot be read or parsed.
    pub fn new(source: Source) -> Result<Self> {
        let items: Vec<Pending> = match source {
            Source::Image(path) => vec![Pending::Path(path)],
            Source::ImageBuffer(img) => vec![Pending::Image(img)],
            Source::Directory(path) => collect_images_from_dir(&path)?
                .into_iter()
                .map(Pending::Path)
                .collect(),
            Source::Glob(pattern) => collect_images_from_glob(&pattern)?
                .into_iter()
                .map(Pending::Path)
                .collect(),
            Source::Landmarks(path) => load_landmark_file(&path)?
                .into_iter()
                .map(|hand| Pending::Hand(path.clone(), hand))
                .collect(),
        };

        Ok(Self {
            total: items.len(),
            items: items.into_iter(),
            index: 0,
        })
    }

    /// Number of items in the source.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.total
    }

    /// Whether the source has no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl Iterator for SourceIterator {
    type Item = Result<(Input, SourceMeta)>;

    fn next(&mut self) -> Option<Self::Item> {
        let pending = self.items.next()?;
        let mut meta = SourceMeta {
            index: self.index,
            total: self.total,
            path: String::new(),
        };
        self.index += 1;

        let input = match pending {
            Pending::Image(img) => Input::Image(img),
            Pending::Hand(path, points) => {
                meta.path = path.to_string_lossy().to_string();
                Input::Landmarks(points)
            }
            Pending::Path(path) => {
                meta.path = path.to_string_lossy().to_string();
                match image::open(&path) {
                    Ok(img) => Input::Image(img),
                    Err(e) => {
                        return Some(Err(GestureError::ImageError(format!(
                            "Failed to load {}: {e}",
                            path.display()
                        ))));
                    }
                }
            }
        };
        Some(Ok((input, meta)))
    }
}

/// Read a landmark JSON file.
///
/// Accepts a single hand as `[[x, y, z], ...]` or several hands as
/// `[[[x, y, z], ...], ...]`. Point counts are not checked here.
///
/// # Errors
///
/// Returns [`GestureError::Io`] if the file cannot be read and
/// [`GestureError::InvalidInput`] if it is not a landmark list.
pub fn load_landmark_file(path: &Path) -> Result<Vec<Vec<Landmark>>> {
    let text = std::fs::read_to_string(path)?;
    parse_landmark_json(&text)
        .map_err(|e| GestureError::InvalidInput(format!("{}: {e}", path.display())))
}

fn parse_landmark_json(text: &str) -> std::result::Result<Vec<Vec<Landmark>>, serde_json::Error> {
    serde_json::from_str::<Vec<Vec<Landmark>>>(text)
        .or_else(|_| serde_json::from_str::<Vec<Landmark>>(text).map(|hand| vec![hand]))
}

/// Collect image paths from a directory.
fn collect_images_from_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(GestureError::ImageError(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_image_file(path))
        .collect();

    paths.sort();
    Ok(paths)
}

/// Collect image paths from a glob pattern.
///
/// Supports a single `*` in the file name, e.g. `"images/*.jpg"`.
fn collect_images_from_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let Some(star_pos) = pattern.find('*') else {
        return Ok(vec![PathBuf::from(pattern)]);
    };

    let dir_part = &pattern[..star_pos];
    let dir = if dir_part.is_empty() {
        Path::new(".")
    } else {
        Path::new(dir_part.trim_end_matches(['/', '\\']))
    };
    let ext_filter: Option<String> = pattern[star_pos..].strip_prefix("*.").map(str::to_lowercase);

    if !dir.is_dir() {
        return Err(GestureError::ImageError(format!(
            "Directory not found: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            ext_filter.as_ref().map_or_else(
                || is_image_file(path),
                |ext| {
                    path.extension()
                        .is_some_and(|e| e.to_string_lossy().to_lowercase() == *ext)
                },
            )
        })
        .collect();

    paths.sort();
    Ok(paths)
}

fn is_image_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        let ext = ext.to_string_lossy().to_lowercase();
        IMAGE_EXTENSIONS.contains(&ext.as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_json(n: usize) -> String {
        let points: Vec<String> = (0..n).map(|i| format!("[{}, 0.5, 0.0]", i as f32 / 100.0)).collect();
        format!("[{}]", points.join(", "))
    }

    #[test]
    fn test_source_from_string() {
        assert!(matches!(Source::from("hand.jpg"), Source::Image(_)));
        assert!(matches!(Source::from("hand.JSON"), Source::Landmarks(_)));
        assert!(matches!(Source::from("*.png"), Source::Glob(_)));
        assert!(!Source::from("hand.json").needs_landmarker());
        assert!(Source::from("hand.jpg").needs_landmarker());
    }

    #[test]
    fn test_parse_single_and_multi() {
        let single = parse_landmark_json(&hand_json(21)).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].len(), 21);

        let multi = parse_landmark_json(&format!("[{}, {}]", hand_json(21), hand_json(20))).unwrap();
        assert_eq!(multi.len(), 2);
        assert_eq!(multi[1].len(), 20);

        assert!(parse_landmark_json("{\"x\": 1}").is_err());
    }

    #[test]
    fn test_landmark_file_iterator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hands.json");
        std::fs::write(&path, format!("[{}, {}]", hand_json(21), hand_json(21))).unwrap();

        let iter = SourceIterator::new(Source::from(path.as_path())).unwrap();
        assert_eq!(iter.len(), 2);
        let items: Vec<_> = iter.map(Result::unwrap).collect();
        assert_eq!(items[1].1.index, 1);
        assert!(matches!(&items[0].0, Input::Landmarks(p) if p.len() == 21));
    }

    #[test]
    fn test_directory_lists_images_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.png"), b"").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let paths = collect_images_from_dir(dir.path()).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("a.jpg"));

        let pattern = format!("{}/*.png", dir.path().display());
        assert_eq!(collect_images_from_glob(&pattern).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_landmark_file() {
        let result = SourceIterator::new(Source::Landmarks(PathBuf::from("missing_hands.json")));
        assert!(matches!(result, Err(GestureError::Io(_))));
    }
}
