use anyhow::Result;
use owo_colors::OwoColorize;

use svault_core::SourceRef;

use crate::context::{Context, report};

pub struct DeleteHandler;

impl DeleteHandler {
    pub fn handle_delete(ctx: &Context, raw: &str) -> Result<()> {
        println!(
            "{} {} {}",
            svault_constants::BIN_NAME.bright_cyan().bold(),
            "delete".bright_white(),
            raw.bright_white()
        );
        println!();

        ctx.block_on(ctx.vault().delete(&SourceRef::parse(raw)))
            .map_err(report)?;
        svault_logger::success(&format!("Deleted {raw}"));
        Ok(())
    }
}
