//! Capabilities the host platform hands in. The core never implements these itself.

use std::io::{self, Read};

/// One child of a granted directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChild {
    /// Opaque reference to the child, usable with [`DocumentTreeAccess::open_read`].
    pub uri: String,
    pub name: Option<String>,
    pub mime_type: Option<String>,
    /// Epoch milliseconds.
    pub last_modified: u64,
    pub size: u64,
}

/// A user-authorised handle onto a directory subtree, addressed by opaque strings rather
/// than filesystem paths.
pub trait DocumentTreeAccess: Send + Sync {
    fn list_children(&self, tree: &str) -> io::Result<Vec<DocumentChild>>;

    fn open_read(&self, document: &str) -> io::Result<Box<dyn Read + Send>>;

    fn describe(&self, document: &str) -> io::Result<DocumentChild>;

    fn delete(&self, document: &str) -> io::Result<()>;
}

/// A row from the OS media index. Fields the index could not supply are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogRow {
    pub path: Option<String>,
    pub name: Option<String>,
    /// Seconds since the epoch, as the index stores it.
    pub date_added: Option<i64>,
    pub size: Option<i64>,
}

pub trait MediaCatalog: Send + Sync {
    /// Returns rows whose storage path matches a SQL-`LIKE` style filter such as
    /// `%/.Statuses/%`.
    fn query(&self, path_like: &str) -> io::Result<Vec<CatalogRow>>;
}
