pub mod delete;
pub mod detect;
pub mod favorite;
pub mod help;
pub mod list;
pub mod load;
pub mod location;
pub mod save;
pub mod source;

pub use delete::DeleteHandler;
pub use detect::DetectHandler;
pub use favorite::{FavoriteAction, FavoriteHandler};
pub use help::HelpHandler;
pub use list::ListHandler;
pub use load::LoadHandler;
pub use location::LocationHandler;
pub use save::SaveHandler;
pub use source::SourceHandler;
