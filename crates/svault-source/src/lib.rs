pub mod reader;
pub mod thumbnail;

pub use reader::SourceReader;
pub use thumbnail::{FrameExtractor, ImageThumbnailer, Thumbnailer};
