use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::Path;

use svault_core::Location;

use crate::context::Context;

pub struct LocationHandler;

impl LocationHandler {
    pub fn handle_where(ctx: &Context, path: &Path) -> Result<()> {
        let location = ctx.vault().location_of(path);
        let label = match location {
            Location::Saved => location.as_str().bright_green().to_string(),
            Location::Favorite => location.as_str().bright_yellow().to_string(),
            Location::Unknown => location.as_str().bright_black().to_string(),
        };
        println!("{}  {}", path.display().bright_white(), label);
        Ok(())
    }
}
