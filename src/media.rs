//! Media discovery: find animation folders and the frames inside them.
//!
//! An animation is a flat directory of image files. Play order is the file
//! names sorted as plain strings, so `10.png` comes before `2.png`. Zero-pad
//! frame numbers if numeric order is wanted.

use crate::Error;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// One playable animation folder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnimationEntry {
    /// Directory name, as passed to `play`
    pub name: String,
    /// Full path of the directory
    pub path: PathBuf,
    /// Number of frame files in the directory
    pub frame_count: usize,
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| matches!(e.as_str(), "png" | "jpg" | "jpeg"))
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

/// List the frame images of an animation folder in play order.
///
/// The path has to exist *and* be a directory. Subdirectories and files that
/// are not images are ignored.
pub fn frame_paths(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    if !dir.exists() || !dir.is_dir() {
        return Err(Error::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_frame_file(&path) {
            paths.push(path);
        }
    }

    paths.sort_by_cached_key(|p| file_name_of(p));

    if paths.is_empty() {
        return Err(Error::EmptyAnimation(dir.to_path_buf()));
    }

    Ok(paths)
}

/// Resolve an animation name to its folder under `root`.
pub fn animation_dir(root: &Path, name: &str) -> PathBuf {
    root.join(name)
}

/// Scan `root` for subdirectories that contain at least one frame.
pub fn list_animations(root: &Path) -> Vec<AnimationEntry> {
    let mut entries = Vec::new();

    let read_dir = match fs::read_dir(root) {
        Ok(rd) => rd,
        Err(e) => {
            tracing::warn!("Cannot read animations dir {}: {}", root.display(), e);
            return entries;
        }
    };

    for entry in read_dir.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let frame_count = fs::read_dir(&path)
            .map(|rd| {
                rd.flatten()
                    .filter(|e| e.path().is_file() && is_frame_file(&e.path()))
                    .count()
            })
            .unwrap_or(0);

        if frame_count > 0 {
            entries.push(AnimationEntry {
                name: file_name_of(&path),
                path,
                frame_count,
            });
        }
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn create_file(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"fake").unwrap();
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths.iter().map(|p| file_name_of(p)).collect()
    }

    #[test]
    fn frame_paths_sorted_as_strings() {
        let tmp = TempDir::new().unwrap();
        create_file(tmp.path(), "1.png");
        create_file(tmp.path(), "2.png");
        create_file(tmp.path(), "10.png");

        let paths = frame_paths(tmp.path()).unwrap();
        assert_eq!(names(&paths), vec!["1.png", "10.png", "2.png"]);
    }

    #[test]
    fn frame_paths_filters_non_images_and_subdirs() {
        let tmp = TempDir::new().unwrap();
        create_file(tmp.path(), "a.jpg");
        create_file(tmp.path(), "b.JPEG");
        create_file(tmp.path(), "c.png");
        create_file(tmp.path(), "notes.txt");
        std::fs::create_dir(tmp.path().join("nested.png")).unwrap();

        let paths = frame_paths(tmp.path()).unwrap();
        assert_eq!(names(&paths), vec!["a.jpg", "b.JPEG", "c.png"]);
    }

    #[test]
    fn frame_paths_missing_dir_is_directory_not_found() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        assert!(matches!(
            frame_paths(&missing),
            Err(Error::DirectoryNotFound(p)) if p == missing
        ));
    }

    #[test]
    fn frame_paths_on_a_file_is_directory_not_found() {
        let tmp = TempDir::new().unwrap();
        create_file(tmp.path(), "frame.png");
        assert!(matches!(
            frame_paths(&tmp.path().join("frame.png")),
            Err(Error::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn frame_paths_empty_dir_is_empty_animation() {
        let tmp = TempDir::new().unwrap();
        create_file(tmp.path(), "readme.txt");
        assert!(matches!(
            frame_paths(tmp.path()),
            Err(Error::EmptyAnimation(_))
        ));
    }

    #[test]
    fn animation_dir_joins_name() {
        assert_eq!(
            animation_dir(Path::new("./animations"), "sample"),
            PathBuf::from("./animations/sample")
        );
    }

    #[test]
    fn list_animations_finds_directories_with_frames() {
        let tmp = TempDir::new().unwrap();
        let flame = tmp.path().join("flame");
        let empty = tmp.path().join("empty");
        std::fs::create_dir(&flame).unwrap();
        std::fs::create_dir(&empty).unwrap();
        create_file(&flame, "frame_0001.jpg");
        create_file(&flame, "frame_0002.png");
        create_file(&empty, "notes.txt");
        create_file(tmp.path(), "loose.png");

        let entries = list_animations(tmp.path());
        assert_eq!(
            entries,
            vec![AnimationEntry {
                name: "flame".to_string(),
                path: flame,
                frame_count: 2,
            }]
        );
    }

    #[test]
    fn list_animations_sorted_alphabetically() {
        let tmp = TempDir::new().unwrap();
        for name in ["zebra", "apple", "mango"] {
            let dir = tmp.path().join(name);
            std::fs::create_dir(&dir).unwrap();
            create_file(&dir, "0.png");
        }

        let entries = list_animations(tmp.path());
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["apple", "mango", "zebra"]);
    }

    #[test]
    fn list_animations_returns_empty_when_no_root() {
        let tmp = TempDir::new().unwrap();
        assert!(list_animations(&tmp.path().join("missing")).is_empty());
    }
}
