//! Card image lookup: maps free-text card names onto image files under the asset directory.
use crate::constants::{CARD_IMAGE_EXTENSIONS, CARD_MATCH_FLOOR};
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardImage {
    pub path: PathBuf,
    pub display_name: String,
}

pub struct CardCatalog {
    root: PathBuf,
    index: RwLock<Vec<CardImage>>,
}

/// Lower-case, turn underscores into spaces and collapse whitespace.
pub fn normalize_query(raw: &str) -> String {
    raw.replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Searchable name for an image file, or `None` when the file is not an image.
/// Inside `set*` directories a leading card number (`012_red_pikmin.png`) is dropped.
pub fn display_name(file_name: &str, parent_dir: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    if !CARD_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }
    let mut name = normalize_query(stem);
    if parent_dir.to_lowercase().starts_with("set")
        && let Some((number, rest)) = name.split_once(' ')
        && !number.is_empty()
        && number.chars().all(|c| c.is_ascii_digit())
    {
        name = rest.to_string();
    }
    (!name.is_empty()).then_some(name)
}

/// Similarity in `0.0..=1.0` between a normalized query and a display name.
pub fn match_score(query: &str, name: &str) -> f64 {
    if query == name {
        return 1.0;
    }
    let query_words: Vec<&str> = query.split(' ').collect();
    let name_words: Vec<&str> = name.split(' ').collect();
    if contains_words(&name_words, &query_words) || contains_words(&query_words, &name_words) {
        let (short, long) = if query.len() < name.len() {
            (query.len(), name.len())
        } else {
            (name.len(), query.len())
        };
        return 0.85 + 0.1 * (short as f64 / long as f64);
    }
    let spaced = strsim::normalized_levenshtein(query, name);
    let squashed = strsim::normalized_levenshtein(&query.replace(' ', ""), &name.replace(' ', ""));
    spaced.max(squashed).min(0.99)
}

fn contains_words(haystack: &[&str], needle: &[&str]) -> bool {
    !needle.is_empty()
        && needle.len() <= haystack.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Recursively collect every image under `root`, sorted by path.
///
/// Only an unreadable `root` is an error; a bad entry or subdirectory below it
/// is logged and skipped.
pub fn build_index(root: &Path) -> io::Result<Vec<CardImage>> {
    let mut images = Vec::new();
    collect_images(root, std::fs::read_dir(root)?, &mut images);
    images.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(images)
}

fn collect_images(dir: &Path, entries: std::fs::ReadDir, out: &mut Vec<CardImage>) {
    let parent = dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(target = "catalog.scan", dir = %dir.display(), error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();
        match entry.file_type() {
            Ok(kind) if kind.is_dir() => {
                match std::fs::read_dir(&path) {
                    Ok(sub) => collect_images(&path, sub, out),
                    Err(e) => {
                        warn!(target = "catalog.scan", dir = %path.display(), error = %e, "skipping unreadable card directory");
                    }
                }
                continue;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(target = "catalog.scan", path = %path.display(), error = %e, "skipping entry of unknown type");
                continue;
            }
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(display_name) = display_name(file_name, &parent) {
            out.push(CardImage {
                path: path.clone(),
                display_name,
            });
        }
    }
}

impl CardCatalog {
    /// Build the catalog for `root`. A missing or unreadable directory gives an empty index.
    pub async fn open(root: impl Into<PathBuf>) -> Self {
        let catalog = Self {
            root: root.into(),
            index: RwLock::new(Vec::new()),
        };
        catalog.refresh().await;
        catalog
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn len(&self) -> usize {
        self.index.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.index.read().await.is_empty()
    }

    /// Rebuild the index and return the number of images it now holds.
    /// The scan runs without holding the lock; readers see either the old or the new index.
    /// A failed scan keeps the previous index.
    pub async fn refresh(&self) -> usize {
        let root = self.root.clone();
        let scanned = tokio::task::spawn_blocking(move || build_index(&root)).await;
        let images = match scanned {
            Ok(Ok(images)) => images,
            Ok(Err(e)) => {
                let kept = self.len().await;
                warn!(target = "catalog.refresh", root = %self.root.display(), error = %e, kept, "card image directory unreadable; keeping previous index");
                return kept;
            }
            Err(e) => {
                let kept = self.len().await;
                warn!(target = "catalog.refresh", error = %e, kept, "card image scan task failed; keeping previous index");
                return kept;
            }
        };
        let count = images.len();
        *self.index.write().await = images;
        info!(target = "catalog.refresh", count, "card image index built");
        count
    }

    /// Best matching image for `query`, if any scores at least `CARD_MATCH_FLOOR`.
    pub async fn find(&self, query: &str) -> Option<PathBuf> {
        let query = normalize_query(query);
        if query.is_empty() {
            return None;
        }
        let index = self.index.read().await;
        let mut best: Option<(&CardImage, f64)> = None;
        for image in index.iter() {
            let score = match_score(&query, &image.display_name);
            if score >= CARD_MATCH_FLOOR && best.is_none_or(|(_, s)| score > s) {
                best = Some((image, score));
            }
        }
        debug!(target = "catalog.find", %query, found = ?best.map(|(i, s)| (&i.display_name, s)));
        best.map(|(image, _)| image.path.clone())
    }
}
