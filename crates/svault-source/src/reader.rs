use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use svault_constants::STATUS_DIR_FRAGMENT;
use svault_paths::PathResolver;
use svault_utils::{
    CatalogRow, DocumentChild, DocumentTreeAccess, MediaCatalog, MediaKind, ScanOptions,
    SourceRef, StatusEntry, classify, file_name_of, is_status_document_name,
    is_status_file_name, read_media_dir,
};

/// Enumerates status entries from the catalog, a tree grant, or a raw directory.
///
/// Every enumeration absorbs its failures: a root that cannot be read yields an empty list
/// and a single broken entry is skipped.
#[derive(Clone)]
pub struct SourceReader {
    resolver: PathResolver,
    catalog: Option<Arc<dyn MediaCatalog>>,
    tree: Option<Arc<dyn DocumentTreeAccess>>,
}

impl SourceReader {
    #[must_use]
    pub fn new(resolver: PathResolver) -> Self {
        Self {
            resolver,
            catalog: None,
            tree: None,
        }
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<dyn MediaCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    #[must_use]
    pub fn with_tree_access(mut self, tree: Arc<dyn DocumentTreeAccess>) -> Self {
        self.tree = Some(tree);
        self
    }

    #[must_use]
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    #[must_use]
    pub fn tree_access(&self) -> Option<&Arc<dyn DocumentTreeAccess>> {
        self.tree.as_ref()
    }

    pub fn enumerate(&self, source: &SourceRef, cancel: &CancellationToken) -> Vec<StatusEntry> {
        match source {
            SourceRef::Path(root) => self.enumerate_dir(root, cancel),
            SourceRef::Handle(handle) => self.enumerate_tree(handle, cancel),
        }
    }

    pub fn enumerate_dir(&self, root: &Path, cancel: &CancellationToken) -> Vec<StatusEntry> {
        match read_media_dir(root, ScanOptions::default(), &|| !cancel.is_cancelled()) {
            Ok(entries) => {
                svault_logger::debug(&format!(
                    "Found {} entries in {}",
                    entries.len(),
                    root.display()
                ));
                entries
            }
            Err(e) => {
                svault_logger::debug(&format!("Cannot list {}: {e}", root.display()));
                Vec::new()
            }
        }
    }

    pub fn enumerate_tree(&self, handle: &str, cancel: &CancellationToken) -> Vec<StatusEntry> {
        let Some(tree) = &self.tree else {
            svault_logger::debug(&format!("No tree access configured for {handle}"));
            return Vec::new();
        };

        let children = match tree.list_children(handle) {
            Ok(children) => children,
            Err(e) => {
                svault_logger::debug(&format!("Cannot list {handle}: {e}"));
                return Vec::new();
            }
        };

        let mut entries = Vec::with_capacity(children.len());
        for child in children {
            if cancel.is_cancelled() {
                break;
            }
            if let Some(entry) = entry_from_document(child) {
                entries.push(entry);
            }
        }
        entries
    }

    pub fn enumerate_via_catalog(&self, cancel: &CancellationToken) -> Vec<StatusEntry> {
        let Some(catalog) = &self.catalog else {
            return Vec::new();
        };

        let rows = match catalog.query(&format!("%{STATUS_DIR_FRAGMENT}%")) {
            Ok(rows) => rows,
            Err(e) => {
                svault_logger::debug(&format!("Media catalog query failed: {e}"));
                return Vec::new();
            }
        };

        let mut entries = Vec::new();
        for row in rows {
            if cancel.is_cancelled() {
                break;
            }
            match entry_from_catalog_row(&row) {
                Some(entry) => entries.push(entry),
                None => svault_logger::debug(&format!("Skipping catalog row {row:?}")),
            }
        }
        entries
    }

    /// Discovery cascade. An explicit selection is enumerated directly; without one the
    /// catalog is tried first, then the first detected variant that yields anything.
    pub fn read(
        &self,
        selection: Option<&SourceRef>,
        cancel: &CancellationToken,
    ) -> Vec<StatusEntry> {
        if let Some(source) = selection {
            return self.enumerate(source, cancel);
        }

        let from_catalog = self.enumerate_via_catalog(cancel);
        if !from_catalog.is_empty() {
            return from_catalog;
        }

        for (variant, dir) in self.resolver.detected_dirs() {
            if cancel.is_cancelled() {
                svault_logger::debug("Source read cancelled");
                break;
            }
            let entries = self.enumerate_dir(&dir, cancel);
            if !entries.is_empty() {
                svault_logger::debug(&format!("Using statuses of {}", variant.name));
                return entries;
            }
        }
        Vec::new()
    }

    /// Opens the bytes behind `source`, through the tree grant for handles.
    pub fn open(&self, source: &SourceRef) -> io::Result<Box<dyn Read + Send>> {
        match source {
            SourceRef::Path(path) => Ok(Box::new(std::fs::File::open(path)?)),
            SourceRef::Handle(handle) => match &self.tree {
                Some(tree) => tree.open_read(handle),
                None => Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no tree access for {handle}"),
                )),
            },
        }
    }
}

fn entry_from_document(child: DocumentChild) -> Option<StatusEntry> {
    let name = child.name?;
    if !is_status_document_name(&name) {
        return None;
    }
    let kind = match child.mime_type.as_deref() {
        Some(mime) if mime.starts_with("video/") => MediaKind::Video,
        Some(mime) if mime.starts_with("image/") => MediaKind::Image,
        _ => classify(&name),
    };
    Some(StatusEntry::new(
        SourceRef::Handle(child.uri),
        name,
        child.size,
        child.last_modified,
        kind,
    ))
}

fn entry_from_catalog_row(row: &CatalogRow) -> Option<StatusEntry> {
    let path = row.path.as_deref()?;
    if !path.contains(STATUS_DIR_FRAGMENT) {
        return None;
    }
    let name = row
        .name
        .clone()
        .or_else(|| file_name_of(Path::new(path)))?;
    if !is_status_file_name(&name) {
        return None;
    }
    let size = u64::try_from(row.size?).ok().filter(|size| *size > 0)?;
    let added_secs = u64::try_from(row.date_added?).ok()?;
    let kind = classify(&name);

    Some(StatusEntry::new(
        SourceRef::parse(path),
        name,
        size,
        added_secs.saturating_mul(1000),
        kind,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use svault_paths::VariantDescriptor;

    struct FakeTree {
        children: HashMap<String, Vec<DocumentChild>>,
    }

    impl DocumentTreeAccess for FakeTree {
        fn list_children(&self, tree: &str) -> io::Result<Vec<DocumentChild>> {
            self.children
                .get(tree)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::PermissionDenied, "revoked"))
        }

        fn open_read(&self, _document: &str) -> io::Result<Box<dyn Read + Send>> {
            Ok(Box::new(io::Cursor::new(b"bytes".to_vec())))
        }

        fn describe(&self, document: &str) -> io::Result<DocumentChild> {
            Err(io::Error::new(io::ErrorKind::NotFound, document.to_string()))
        }

        fn delete(&self, _document: &str) -> io::Result<()> {
            Ok(())
        }
    }

    struct FakeCatalog(Vec<CatalogRow>);

    impl MediaCatalog for FakeCatalog {
        fn query(&self, path_like: &str) -> io::Result<Vec<CatalogRow>> {
            assert_eq!(path_like, "%/.Statuses/%");
            Ok(self.0.clone())
        }
    }

    fn child(uri: &str, name: Option<&str>, mime: Option<&str>, size: u64) -> DocumentChild {
        DocumentChild {
            uri: uri.to_string(),
            name: name.map(str::to_string),
            mime_type: mime.map(str::to_string),
            last_modified: 1_700_000_000_000,
            size,
        }
    }

    fn row(path: Option<&str>, date_added: Option<i64>, size: Option<i64>) -> CatalogRow {
        CatalogRow {
            path: path.map(str::to_string),
            name: None,
            date_added,
            size,
        }
    }

    #[test]
    fn tree_enumeration_applies_the_document_predicate() {
        let tree = FakeTree {
            children: HashMap::from([(
                "content://tree/statuses".to_string(),
                vec![
                    child("content://doc/1", Some("IMG-1-WA0001.jpg"), Some("image/jpeg"), 10),
                    child("content://doc/2", Some(".VID-1-WA0002.mp4"), None, 20),
                    child("content://doc/3", Some(".hidden.jpg"), None, 5),
                    child("content://doc/4", Some(".nomedia"), None, 0),
                    child("content://doc/5", None, Some("image/png"), 5),
                    child("content://doc/6", Some("clip.bin.mp4"), Some("video/mp4"), 0),
                ],
            )]),
        };
        let reader =
            SourceReader::new(PathResolver::new("/nowhere")).with_tree_access(Arc::new(tree));

        let entries = reader.enumerate_tree("content://tree/statuses", &CancellationToken::new());
        let names: Vec<_> = entries.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, vec!["IMG-1-WA0001.jpg", ".VID-1-WA0002.mp4", "clip.bin.mp4"]);
        assert_eq!(entries[1].media_kind, MediaKind::Video);
        assert!(entries.iter().all(|e| e.source_ref.is_handle()));
    }

    #[test]
    fn revoked_or_missing_tree_yields_nothing() {
        let tree = FakeTree {
            children: HashMap::new(),
        };
        let with_tree =
            SourceReader::new(PathResolver::new("/nowhere")).with_tree_access(Arc::new(tree));
        assert!(with_tree.enumerate_tree("content://gone", &CancellationToken::new()).is_empty());

        let without_tree = SourceReader::new(PathResolver::new("/nowhere"));
        assert!(without_tree.enumerate_tree("content://x", &CancellationToken::new()).is_empty());
    }

    #[test]
    fn catalog_rows_are_converted_and_corrupt_rows_skipped() {
        let catalog = FakeCatalog(vec![
            row(
                Some("/s/WhatsApp/Media/.Statuses/IMG-1-WA0001.jpg"),
                Some(1_700_000_000),
                Some(42),
            ),
            row(Some("/s/WhatsApp/Media/.Statuses/VID-1-WA0002.mp4"), None, Some(42)),
            row(None, Some(1), Some(1)),
            row(Some("/s/WhatsApp/Media/.Statuses/IMG-2-WA0003.jpg"), Some(1), Some(-4)),
            row(Some("/s/DCIM/IMG-3.jpg"), Some(1), Some(1)),
            row(Some("/s/WhatsApp/Media/.Statuses/.nomedia"), Some(1), Some(1)),
        ]);
        let reader =
            SourceReader::new(PathResolver::new("/nowhere")).with_catalog(Arc::new(catalog));

        let entries = reader.enumerate_via_catalog(&CancellationToken::new());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].display_name, "IMG-1-WA0001.jpg");
        assert_eq!(entries[0].last_modified, 1_700_000_000_000);
        assert_eq!(entries[0].size_bytes, 42);
    }

    #[test]
    fn cascade_prefers_catalog_then_first_non_empty_variant() {
        let storage = tempfile::tempdir().unwrap();
        let empty = storage.path().join("A");
        let filled = storage.path().join("B");
        fs::create_dir_all(&empty).unwrap();
        fs::create_dir_all(&filled).unwrap();
        // Passes probing but holds no media.
        fs::write(empty.join(".nomedia"), b"").unwrap();
        fs::write(filled.join("IMG-1-WA0001.jpg"), b"jpeg").unwrap();

        let resolver = PathResolver::with_variants(
            storage.path(),
            vec![
                VariantDescriptor::new("a", "{storage}/A"),
                VariantDescriptor::new("b", "{storage}/B"),
            ],
        );
        let cancel = CancellationToken::new();

        let reader = SourceReader::new(resolver.clone());
        let entries = reader.read(None, &cancel);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source_ref, SourceRef::Path(filled.join("IMG-1-WA0001.jpg")));

        let catalog = FakeCatalog(vec![row(
            Some("/x/.Statuses/VID-9-WA0009.mp4"),
            Some(5),
            Some(9),
        )]);
        let with_catalog = SourceReader::new(resolver).with_catalog(Arc::new(catalog));
        let entries = with_catalog.read(None, &cancel);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].display_name, "VID-9-WA0009.mp4");
    }

    #[test]
    fn explicit_selection_bypasses_discovery() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.png"), b"png").unwrap();
        let reader = SourceReader::new(PathResolver::new("/nowhere"));

        let selection = SourceRef::Path(dir.path().to_path_buf());
        assert_eq!(reader.read(Some(&selection), &CancellationToken::new()).len(), 1);

        let missing = SourceRef::Path(dir.path().join("missing"));
        assert!(reader.read(Some(&missing), &CancellationToken::new()).is_empty());
    }

    #[test]
    fn cancelled_reads_return_early() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.png"), b"png").unwrap();
        let reader = SourceReader::new(PathResolver::new("/nowhere"));
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(reader.enumerate_dir(dir.path(), &cancel).is_empty());
    }

    #[test]
    fn open_reads_paths_and_handles() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.jpg");
        fs::write(&file, b"jpeg").unwrap();

        let tree = FakeTree {
            children: HashMap::new(),
        };
        let reader =
            SourceReader::new(PathResolver::new("/nowhere")).with_tree_access(Arc::new(tree));

        let mut buf = String::new();
        reader.open(&SourceRef::Path(file)).unwrap().read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "jpeg");

        buf.clear();
        reader
            .open(&SourceRef::Handle("content://doc/1".into()))
            .unwrap()
            .read_to_string(&mut buf)
            .unwrap();
        assert_eq!(buf, "bytes");
    }
}
