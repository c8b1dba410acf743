use std::fmt;
use std::path::{Path, PathBuf};

use svault_constants::{APP_DIR_NAME, FAVOURITES_DIR_NAME, SAVED_DIR_NAME};
use svault_utils::{SourceRef, normalize_path, resolve_path};

/// Which managed root a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Saved,
    Favorite,
    Unknown,
}

impl Location {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::Favorite => "favourite",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The saved root and the favourites root nested inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedRoots {
    saved: PathBuf,
    favorites: PathBuf,
}

impl ManagedRoots {
    /// `<public_media_root>/StatusSaver/downloaded` and its `favourites` child.
    #[must_use]
    pub fn from_public_media_root(public_media_root: &Path) -> Self {
        Self::new(public_media_root.join(APP_DIR_NAME).join(SAVED_DIR_NAME))
    }

    #[must_use]
    pub fn new(saved: impl AsRef<Path>) -> Self {
        let saved = normalize_path(saved.as_ref());
        let favorites = saved.join(FAVOURITES_DIR_NAME);
        Self { saved, favorites }
    }

    #[must_use]
    pub fn default_public_media_root() -> PathBuf {
        dirs::picture_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    #[must_use]
    pub fn saved(&self) -> &Path {
        &self.saved
    }

    #[must_use]
    pub fn favorites(&self) -> &Path {
        &self.favorites
    }

    #[must_use]
    pub fn root_of(&self, location: Location) -> Option<&Path> {
        match location {
            Location::Saved => Some(&self.saved),
            Location::Favorite => Some(&self.favorites),
            Location::Unknown => None,
        }
    }

    /// Lexical classification; the filesystem is not consulted. Favourites are checked
    /// first since they nest inside the saved root.
    #[must_use]
    pub fn location_of(&self, path: &Path) -> Location {
        let path = normalize_path(path);
        if is_strictly_under(&path, &self.favorites) {
            Location::Favorite
        } else if is_strictly_under(&path, &self.saved) && path != self.favorites {
            Location::Saved
        } else {
            Location::Unknown
        }
    }

    /// Handles are trusted. Paths must resolve, symlinks included, to an entry strictly
    /// below one of the roots.
    #[must_use]
    pub fn contains(&self, target: &SourceRef) -> bool {
        match target {
            SourceRef::Handle(_) => true,
            SourceRef::Path(path) => {
                let resolved = resolve_path(path);
                let saved = resolve_path(&self.saved);
                let favorites = resolve_path(&self.favorites);
                resolved != favorites
                    && (is_strictly_under(&resolved, &saved)
                        || is_strictly_under(&resolved, &favorites))
            }
        }
    }

    /// The same name in the other root.
    #[must_use]
    pub fn sibling_of(&self, path: &Path) -> Option<PathBuf> {
        let name = path.file_name()?;
        match self.location_of(path) {
            Location::Saved => Some(self.favorites.join(name)),
            Location::Favorite => Some(self.saved.join(name)),
            Location::Unknown => None,
        }
    }
}

fn is_strictly_under(path: &Path, root: &Path) -> bool {
    path != root && path.starts_with(root)
}
