use anyhow::Result;
use owo_colors::OwoColorize;

use svault_core::{SourceRef, StatusVault};

use crate::context::{Context, report};

#[derive(Debug, Clone, Copy)]
pub enum FavoriteAction {
    Mark,
    Unmark,
    Toggle,
}

pub struct FavoriteHandler;

impl FavoriteHandler {
    pub fn handle_favorite(ctx: &Context, raw: &str, action: FavoriteAction) -> Result<()> {
        let target = SourceRef::parse(raw);
        let vault: &StatusVault = ctx.vault();

        let moved = match action {
            FavoriteAction::Mark => ctx.block_on(vault.mark_favorite(&target)),
            FavoriteAction::Unmark => ctx.block_on(vault.unmark_favorite(&target)),
            FavoriteAction::Toggle => ctx.block_on(vault.toggle_favorite(&target)),
        }
        .map_err(report)?;

        let now = moved
            .as_path()
            .map_or("managed", |path| vault.location_of(path).as_str());
        println!(
            "{} {}",
            moved.to_string().bright_white(),
            format!("({now})").bright_black()
        );
        svault_logger::success("Done");
        Ok(())
    }
}
