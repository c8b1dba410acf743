pub mod capability;
pub mod entry;
pub mod media;
pub mod path_utils;

pub use capability::{CatalogRow, DocumentChild, DocumentTreeAccess, MediaCatalog};
pub use entry::{MediaKind, SourceRef, StatusEntry, Thumbnail};
pub use media::{
    ScanOptions, classify, is_status_document_name, is_status_file_name, matches_status_pattern,
    read_media_dir,
};
pub use path_utils::*;
