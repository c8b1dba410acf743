use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use svault_constants::HANDLE_SCHEME_SEPARATOR;

/// Where an entry's bytes live: a filesystem path or an opaque, externally granted handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum SourceRef {
    Path(PathBuf),
    Handle(String),
}

impl SourceRef {
    /// Strings that carry a scheme (`content://...`) and are not absolute paths are handles.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if Self::looks_like_handle(raw) {
            Self::Handle(raw.to_string())
        } else {
            Self::Path(PathBuf::from(raw))
        }
    }

    #[must_use]
    pub fn looks_like_handle(raw: &str) -> bool {
        !raw.starts_with('/') && raw.contains(HANDLE_SCHEME_SEPARATOR)
    }

    #[must_use]
    pub const fn is_handle(&self) -> bool {
        matches!(self, Self::Handle(_))
    }

    #[must_use]
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => Some(path),
            Self::Handle(_) => None,
        }
    }

    #[must_use]
    pub fn to_key(&self) -> String {
        match self {
            Self::Path(path) => path.to_string_lossy().into_owned(),
            Self::Handle(handle) => handle.clone(),
        }
    }

    /// First eight bytes of the SHA-256 of the reference string.
    #[must_use]
    pub fn stable_id(&self) -> u64 {
        let digest = Sha256::digest(self.to_key().as_bytes());
        let mut bytes = [0u8; 8];
        for (slot, byte) in bytes.iter_mut().zip(digest.iter()) {
            *slot = *byte;
        }
        u64::from_be_bytes(bytes)
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Handle(handle) => f.write_str(handle),
        }
    }
}

impl From<PathBuf> for SourceRef {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for SourceRef {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

/// Decoded preview pixels, RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// One media file seen by an enumeration. Created fresh per read and never mutated in place.
///
/// Two entries are equal when they point at the same source, whatever their metadata says.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    pub id: u64,
    pub source_ref: SourceRef,
    pub display_name: String,
    pub size_bytes: u64,
    pub last_modified: u64,
    pub media_kind: MediaKind,
    #[serde(skip)]
    pub thumbnail: Option<Arc<Thumbnail>>,
}

impl StatusEntry {
    #[must_use]
    pub fn new(
        source_ref: SourceRef,
        display_name: impl Into<String>,
        size_bytes: u64,
        last_modified: u64,
        media_kind: MediaKind,
    ) -> Self {
        Self {
            id: source_ref.stable_id(),
            source_ref,
            display_name: display_name.into(),
            size_bytes,
            last_modified,
            media_kind,
            thumbnail: None,
        }
    }

    #[must_use]
    pub const fn is_video(&self) -> bool {
        matches!(self.media_kind, MediaKind::Video)
    }

    #[must_use]
    pub fn with_thumbnail(&self, thumbnail: Thumbnail) -> Self {
        Self {
            thumbnail: Some(Arc::new(thumbnail)),
            ..self.clone()
        }
    }
}

impl PartialEq for StatusEntry {
    fn eq(&self, other: &Self) -> bool {
        self.source_ref == other.source_ref
    }
}

impl Eq for StatusEntry {}

impl Hash for StatusEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source_ref.hash(state);
    }
}
