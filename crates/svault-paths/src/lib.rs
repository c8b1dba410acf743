pub mod path_resolver;
pub mod variant;

pub use path_resolver::{PathResolver, ProbeOutcome, probe};
pub use variant::{VariantDescriptor, builtin_variants};
