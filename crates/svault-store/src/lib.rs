pub mod file_ops;
pub mod managed_store;
pub mod roots;

pub use file_ops::{FileOps, Publish, StdFileOps};
pub use managed_store::ManagedStore;
pub use roots::{Location, ManagedRoots};
