use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::io;
use std::path::Path;

use svault_constants::{IMAGE_EXTENSIONS, NO_MEDIA, TEMP_FILE_PREFIX, VIDEO_EXTENSIONS};

use crate::entry::{MediaKind, SourceRef, StatusEntry};
use crate::path_utils::system_time_millis;

lazy_static! {
    // IMG-20231201-WA0001.jpg, VID-20231201-WA0001.mp4, ...
    static ref STATUS_FILE_PATTERN: Regex =
        Regex::new(r"^.*-WA\d+\..+$").unwrap_or_else(|e| panic!("invalid status pattern: {e}"));
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

fn has_media_extension(name: &str) -> bool {
    extension_of(name).is_some_and(|ext| {
        IMAGE_EXTENSIONS.contains(&ext.as_str()) || VIDEO_EXTENSIONS.contains(&ext.as_str())
    })
}

#[must_use]
pub fn classify(name: &str) -> MediaKind {
    match extension_of(name) {
        Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => MediaKind::Video,
        _ => MediaKind::Image,
    }
}

/// Name filter for raw directory listings.
#[must_use]
pub fn is_status_file_name(name: &str) -> bool {
    !name.eq_ignore_ascii_case(NO_MEDIA)
        && !name.starts_with(TEMP_FILE_PREFIX)
        && has_media_extension(name)
}

#[must_use]
pub fn matches_status_pattern(name: &str) -> bool {
    STATUS_FILE_PATTERN.is_match(name)
}

/// Name filter for documents listed through a tree grant. Dot-files are only admitted
/// when they follow the source app's naming pattern.
#[must_use]
pub fn is_status_document_name(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    if name.starts_with('.') && !matches_status_pattern(name) {
        return false;
    }
    let lower = name.to_ascii_lowercase();
    has_media_extension(&lower) && !lower.ends_with(NO_MEDIA)
}

#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    pub skip_empty: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self { skip_empty: true }
    }
}

/// Lists the media files directly under `root`, hidden ones included.
///
/// Only a failure to open `root` itself is returned; entries that cannot be inspected are
/// skipped. `keep_going` is polled between entries and stops the scan early when it
/// returns false.
pub fn read_media_dir(
    root: &Path,
    options: ScanOptions,
    keep_going: &dyn Fn() -> bool,
) -> io::Result<Vec<StatusEntry>> {
    let mut entries = Vec::new();

    for dir_entry in fs::read_dir(root)? {
        if !keep_going() {
            svault_logger::debug(&format!("Scan of {} interrupted", root.display()));
            break;
        }

        let Ok(dir_entry) = dir_entry else {
            continue;
        };
        let name = dir_entry.file_name().to_string_lossy().into_owned();
        if !is_status_file_name(&name) {
            continue;
        }

        let path = dir_entry.path();
        let metadata = match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => continue,
            Err(e) => {
                svault_logger::debug(&format!("Skipping {name}: {e}"));
                continue;
            }
        };
        if options.skip_empty && metadata.len() == 0 {
            svault_logger::debug(&format!("Skipping empty file {name}"));
            continue;
        }
        if let Err(e) = fs::File::open(&path) {
            svault_logger::debug(&format!("Skipping unreadable {name}: {e}"));
            continue;
        }

        let last_modified = metadata.modified().map_or(0, system_time_millis);
        let kind = classify(&name);
        entries.push(StatusEntry::new(
            SourceRef::Path(path),
            name,
            metadata.len(),
            last_modified,
            kind,
        ));
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_names_follow_the_allow_list() {
        assert!(is_status_file_name("IMG-20231201-WA0001.jpg"));
        assert!(is_status_file_name("clip.MP4"));
        assert!(is_status_file_name("photo.heic"));
        assert!(!is_status_file_name(".nomedia"));
        assert!(!is_status_file_name(".NOMEDIA"));
        assert!(!is_status_file_name("notes.txt"));
        assert!(!is_status_file_name("no_extension"));
        assert!(!is_status_file_name(".svault-abc123.part"));
    }

    #[test]
    fn classification_uses_the_video_set() {
        assert_eq!(classify("a.mp4"), MediaKind::Video);
        assert_eq!(classify("a.3GP"), MediaKind::Video);
        assert_eq!(classify("a.m4v"), MediaKind::Video);
        assert_eq!(classify("a.webp"), MediaKind::Image);
        assert_eq!(classify("a.gif"), MediaKind::Image);
    }

    #[test]
    fn document_names_admit_hidden_status_files_only() {
        assert!(is_status_document_name("IMG-20231201-WA0001.jpg"));
        assert!(is_status_document_name(".IMG-20231201-WA0007.jpg"));
        assert!(!is_status_document_name(".hidden.jpg"));
        assert!(!is_status_document_name(""));
        assert!(!is_status_document_name("VID-20231201-WA0003.txt"));
        assert!(!is_status_document_name(".nomedia"));
    }

    #[test]
    fn read_media_dir_skips_markers_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("IMG-1-WA0001.jpg"), b"jpeg").unwrap();
        fs::write(dir.path().join("VID-1-WA0002.mp4"), b"mpeg4").unwrap();
        fs::write(dir.path().join(".hidden-WA0003.png"), b"png").unwrap();
        fs::write(dir.path().join(".nomedia"), b"").unwrap();
        fs::write(dir.path().join("empty.jpg"), b"").unwrap();
        fs::write(dir.path().join("readme.txt"), b"text").unwrap();
        fs::create_dir(dir.path().join("nested.jpg")).unwrap();

        let mut entries = read_media_dir(dir.path(), ScanOptions::default(), &|| true).unwrap();
        entries.sort_by(|a, b| a.display_name.cmp(&b.display_name));

        let names: Vec<_> = entries.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(
            names,
            vec![".hidden-WA0003.png", "IMG-1-WA0001.jpg", "VID-1-WA0002.mp4"]
        );
        assert_eq!(entries[2].media_kind, MediaKind::Video);
        assert_eq!(entries[2].size_bytes, 5);
        assert!(entries.iter().all(|e| e.thumbnail.is_none()));
    }

    #[test]
    fn read_media_dir_reports_a_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        assert!(read_media_dir(&missing, ScanOptions::default(), &|| true).is_err());
    }

    #[test]
    fn read_media_dir_stops_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"a").unwrap();
        let entries = read_media_dir(dir.path(), ScanOptions::default(), &|| false).unwrap();
        assert!(entries.is_empty());
    }
}
