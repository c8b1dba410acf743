use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use svault_error::{Result, SaverError};
use svault_utils::{
    DocumentTreeAccess, ScanOptions, SourceRef, StatusEntry, disambiguated_name, file_name_of,
    is_plain_file_name, now_millis, read_media_dir,
};

use crate::file_ops::{FileOps, Publish, StdFileOps};
use crate::roots::{Location, ManagedRoots};

/// Owns the saved and favourite folders. Every mutation is checked against the roots
/// first and either completes or leaves the folders as they were.
#[derive(Clone)]
pub struct ManagedStore {
    roots: ManagedRoots,
    ops: Arc<dyn FileOps>,
    documents: Option<Arc<dyn DocumentTreeAccess>>,
}

impl ManagedStore {
    #[must_use]
    pub fn new(roots: ManagedRoots) -> Self {
        Self {
            roots,
            ops: Arc::new(StdFileOps),
            documents: None,
        }
    }

    #[must_use]
    pub fn with_file_ops(mut self, ops: Arc<dyn FileOps>) -> Self {
        self.ops = ops;
        self
    }

    #[must_use]
    pub fn with_document_access(mut self, documents: Arc<dyn DocumentTreeAccess>) -> Self {
        self.documents = Some(documents);
        self
    }

    #[must_use]
    pub fn roots(&self) -> &ManagedRoots {
        &self.roots
    }

    #[must_use]
    pub fn containment(&self, target: &SourceRef) -> bool {
        self.roots.contains(target)
    }

    #[must_use]
    pub fn location_of(&self, path: &Path) -> Location {
        self.roots.location_of(path)
    }

    #[must_use]
    pub fn is_favorite(&self, path: &Path) -> bool {
        self.location_of(path) == Location::Favorite
    }

    /// Media files directly inside the chosen root. A root that does not exist yet is empty.
    pub fn list(&self, location: Location) -> Result<Vec<StatusEntry>> {
        let Some(root) = self.roots.root_of(location) else {
            return Ok(Vec::new());
        };
        if !self.ops.exists(root) {
            return Ok(Vec::new());
        }
        let options = ScanOptions { skip_empty: false };
        read_media_dir(root, options, &|| true).map_err(|e| SaverError::io(root, e))
    }

    /// Copies `source` into the saved root as `display_name`.
    ///
    /// A name that is taken by an unreadable file or by a favourite, or a write refused with
    /// a permission or busy error, gets exactly one retry under `<base>_<millis>.<ext>`.
    pub fn save(&self, source: &SourceRef, display_name: &str) -> Result<PathBuf> {
        if !is_plain_file_name(display_name) {
            svault_logger::warn(&format!("Rejected save name '{display_name}'"));
            return Err(SaverError::SecurityViolation(display_name.to_string()));
        }

        let saved = self.roots.saved();
        self.ops
            .create_dir_all(saved)
            .map_err(|e| SaverError::io(saved, e))?;

        let target = saved.join(display_name);
        self.guard(&SourceRef::Path(target.clone()))?;

        match self.copy_into(source, &target) {
            Err(SaverError::NameCollision(taken)) => {
                let retry = saved.join(disambiguated_name(display_name, now_millis()));
                svault_logger::debug(&format!(
                    "'{taken}' is unavailable, saving as {}",
                    retry.display()
                ));
                self.copy_into(source, &retry)
            }
            other => other,
        }
    }

    /// Moves a saved file into favourites. Already-favourite names succeed without change.
    /// Handles are copied and left in place.
    pub fn mark_favorite(&self, target: &SourceRef) -> Result<SourceRef> {
        self.guard(target)?;

        match target {
            SourceRef::Handle(handle) => self.copy_handle_to_favorites(handle),
            SourceRef::Path(path) => match self.location_of(path) {
                Location::Favorite => Ok(target.clone()),
                Location::Saved => {
                    let favorites = self.roots.favorites().to_path_buf();
                    self.relocate(path, &favorites).map(SourceRef::Path)
                }
                Location::Unknown => Err(self.violation(target)),
            },
        }
    }

    /// Moves a favourite back to the saved root. Saved paths and handles are left alone.
    pub fn unmark_favorite(&self, target: &SourceRef) -> Result<SourceRef> {
        self.guard(target)?;

        match target {
            SourceRef::Handle(_) => Ok(target.clone()),
            SourceRef::Path(path) => match self.location_of(path) {
                Location::Saved => Ok(target.clone()),
                Location::Favorite => {
                    let saved = self.roots.saved().to_path_buf();
                    self.relocate(path, &saved).map(SourceRef::Path)
                }
                Location::Unknown => Err(self.violation(target)),
            },
        }
    }

    pub fn toggle_favorite(&self, target: &SourceRef) -> Result<SourceRef> {
        match target {
            SourceRef::Path(path) if self.is_favorite(path) => self.unmark_favorite(target),
            _ => self.mark_favorite(target),
        }
    }

    /// Deletes `target` and any same-named file in the other root.
    pub fn delete(&self, target: &SourceRef) -> Result<()> {
        self.guard(target)?;

        match target {
            SourceRef::Handle(handle) => self.delete_handle(handle),
            SourceRef::Path(path) => {
                if !self.ops.exists(path) {
                    return Err(SaverError::NotFound(path.display().to_string()));
                }
                self.ops
                    .remove_file(path)
                    .map_err(|e| SaverError::io(path, e))?;

                if let Some(sibling) = self.roots.sibling_of(path) {
                    self.remove_if_present(&sibling)?;
                }
                svault_logger::debug(&format!("Deleted {}", path.display()));
                Ok(())
            }
        }
    }

    fn guard(&self, target: &SourceRef) -> Result<()> {
        if self.containment(target) {
            Ok(())
        } else {
            Err(self.violation(target))
        }
    }

    fn violation(&self, target: &SourceRef) -> SaverError {
        svault_logger::warn(&format!("Refusing to modify {target}: outside the managed folders"));
        SaverError::SecurityViolation(target.to_key())
    }

    fn remove_if_present(&self, path: &Path) -> Result<()> {
        if !self.ops.exists(path) {
            return Ok(());
        }
        match self.ops.remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SaverError::io(path, e)),
        }
    }

    fn open_source(&self, source: &SourceRef) -> Result<(Box<dyn Read + Send>, Option<u64>)> {
        match source {
            SourceRef::Path(path) => {
                if !self.ops.exists(path) {
                    return Err(SaverError::NotFound(path.display().to_string()));
                }
                let expected = self.ops.len(path).map_err(|e| SaverError::io(path, e))?;
                let input = self.ops.open_read(path).map_err(|e| SaverError::io(path, e))?;
                Ok((input, Some(expected)))
            }
            SourceRef::Handle(handle) => {
                let documents = self.documents_for(handle)?;
                let expected = documents
                    .describe(handle)
                    .ok()
                    .map(|child| child.size)
                    .filter(|size| *size > 0);
                let input = documents
                    .open_read(handle)
                    .map_err(|e| SaverError::SourceUnavailable(format!("{handle}: {e}")))?;
                Ok((input, expected))
            }
        }
    }

    fn documents_for(&self, handle: &str) -> Result<&Arc<dyn DocumentTreeAccess>> {
        self.documents.as_ref().ok_or_else(|| {
            SaverError::SourceUnavailable(format!("no document access for {handle}"))
        })
    }

    /// One overwrite-publish of `source` onto `target`, verified by length.
    fn copy_into(&self, source: &SourceRef, target: &Path) -> Result<PathBuf> {
        let name = file_name_of(target).unwrap_or_default();
        if self.ops.exists(&self.roots.favorites().join(&name)) {
            return Err(SaverError::NameCollision(name));
        }
        if self.ops.exists(target) && !self.ops.is_readable(target) {
            return Err(SaverError::NameCollision(name));
        }

        let (mut input, expected) = self.open_source(source)?;
        let written = match self.ops.publish(&mut *input, target, Publish::Overwrite) {
            Ok(written) => written,
            Err(e) if is_collision(&e) => return Err(SaverError::NameCollision(name)),
            Err(e) => return Err(SaverError::io(target, e)),
        };

        self.verify(target, expected.unwrap_or(written))?;
        svault_logger::debug(&format!("Saved {source} to {}", target.display()));
        Ok(target.to_path_buf())
    }

    fn verify(&self, copy: &Path, expected: u64) -> Result<()> {
        let actual = self.ops.len(copy).map_err(|e| SaverError::io(copy, e))?;
        if actual == expected {
            return Ok(());
        }
        // The copy is incomplete; it must not survive.
        let _ = self.ops.remove_file(copy);
        Err(SaverError::io(
            copy,
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("copied {actual} of {expected} bytes"),
            ),
        ))
    }

    /// Copy, verify, then delete the original. A failed delete rolls the copy back.
    fn relocate(&self, source: &Path, dest_dir: &Path) -> Result<PathBuf> {
        let Some(name) = source.file_name() else {
            return Err(SaverError::SecurityViolation(source.display().to_string()));
        };
        let dest = dest_dir.join(name);

        if self.ops.exists(&dest) {
            return self.adopt_existing(source, dest);
        }
        if !self.ops.exists(source) {
            return Err(SaverError::NotFound(source.display().to_string()));
        }

        self.ops
            .create_dir_all(dest_dir)
            .map_err(|e| SaverError::io(dest_dir, e))?;
        let expected = self.ops.len(source).map_err(|e| SaverError::io(source, e))?;
        let mut input = self
            .ops
            .open_read(source)
            .map_err(|e| SaverError::io(source, e))?;

        match self.ops.publish(&mut *input, &dest, Publish::NoClobber) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                drop(input);
                svault_logger::debug(&format!("{} appeared during the move", dest.display()));
                return self.adopt_existing(source, dest);
            }
            Err(e) => return Err(SaverError::io(&dest, e)),
        }
        drop(input);
        self.verify(&dest, expected)?;

        match self.ops.remove_file(source) {
            Ok(()) => Ok(dest),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(dest),
            Err(e) => {
                svault_logger::warn(&format!(
                    "Could not remove {}, rolling back: {e}",
                    source.display()
                ));
                if let Err(rollback) = self.ops.remove_file(&dest) {
                    svault_logger::error(&format!(
                        "Rollback of {} failed: {rollback}",
                        dest.display()
                    ));
                }
                Err(SaverError::io(source, e))
            }
        }
    }

    /// `dest` already holds the name. An identical-length copy counts as the moved file and
    /// the source is removed; anything else is a collision and both files stay.
    fn adopt_existing(&self, source: &Path, dest: PathBuf) -> Result<PathBuf> {
        if !self.ops.exists(source) {
            return Ok(dest);
        }
        let source_len = self.ops.len(source).map_err(|e| SaverError::io(source, e))?;
        let dest_len = self.ops.len(&dest).map_err(|e| SaverError::io(&dest, e))?;
        if source_len != dest_len {
            svault_logger::warn(&format!(
                "{} differs from {}, leaving both",
                dest.display(),
                source.display()
            ));
            return Err(SaverError::NameCollision(dest.display().to_string()));
        }

        svault_logger::debug(&format!("{} already present", dest.display()));
        match self.ops.remove_file(source) {
            Ok(()) => Ok(dest),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(dest),
            Err(e) => Err(SaverError::io(source, e)),
        }
    }

    fn copy_handle_to_favorites(&self, handle: &str) -> Result<SourceRef> {
        let documents = self.documents_for(handle)?;
        let described = documents
            .describe(handle)
            .map_err(|e| SaverError::SourceUnavailable(format!("{handle}: {e}")))?;
        let name = described
            .name
            .filter(|name| is_plain_file_name(name))
            .ok_or_else(|| SaverError::SourceUnavailable(format!("{handle} has no usable name")))?;

        let favorites = self.roots.favorites();
        let dest = favorites.join(&name);
        if self.ops.exists(&dest) {
            return Ok(SourceRef::Path(dest));
        }
        self.ops
            .create_dir_all(favorites)
            .map_err(|e| SaverError::io(favorites, e))?;

        let mut input = documents
            .open_read(handle)
            .map_err(|e| SaverError::SourceUnavailable(format!("{handle}: {e}")))?;
        let written = match self.ops.publish(&mut *input, &dest, Publish::NoClobber) {
            Ok(written) => written,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Ok(SourceRef::Path(dest));
            }
            Err(e) => return Err(SaverError::io(&dest, e)),
        };
        let expected = Some(described.size).filter(|size| *size > 0);
        self.verify(&dest, expected.unwrap_or(written))?;
        Ok(SourceRef::Path(dest))
    }

    fn delete_handle(&self, handle: &str) -> Result<()> {
        let documents = self.documents_for(handle)?;
        let name = documents.describe(handle).ok().and_then(|child| child.name);

        documents.delete(handle).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SaverError::NotFound(handle.to_string()),
            _ => SaverError::io(handle, e),
        })?;

        if let Some(name) = name.filter(|name| is_plain_file_name(name)) {
            self.remove_if_present(&self.roots.favorites().join(name))?;
        }
        Ok(())
    }
}

fn is_collision(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::ResourceBusy
    )
}
