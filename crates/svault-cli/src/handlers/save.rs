use anyhow::{Result, anyhow};
use owo_colors::OwoColorize;
use std::path::Path;

use svault_core::SourceRef;

use crate::context::{Context, report};

pub struct SaveHandler;

impl SaveHandler {
    pub fn handle_save(ctx: &Context, raw: &str, name: Option<&str>) -> Result<()> {
        let source = SourceRef::parse(raw);
        let display_name = match name {
            Some(name) => name.to_string(),
            None => default_name(&source)
                .ok_or_else(|| anyhow!("Cannot tell a file name from {raw}, pass --name"))?,
        };

        println!(
            "{} {} {}",
            svault_constants::BIN_NAME.bright_cyan().bold(),
            "save".bright_white(),
            display_name.bright_white()
        );

        svault_logger::status(&format!("Copying {display_name}"));
        let saved = ctx
            .block_on(ctx.vault().save_as(&source, &display_name))
            .map_err(report)?;
        svault_logger::finish(&format!("Saved to {}", saved.display()));
        Ok(())
    }
}

fn default_name(source: &SourceRef) -> Option<String> {
    match source {
        SourceRef::Path(path) => svault_utils::file_name_of(path),
        SourceRef::Handle(handle) => handle
            .rsplit(['/', ':'])
            .next()
            .filter(|name| !name.is_empty())
            .and_then(|name| svault_utils::file_name_of(Path::new(name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_come_from_the_last_segment() {
        assert_eq!(
            default_name(&SourceRef::parse("/s/.Statuses/IMG-1-WA0001.jpg")).as_deref(),
            Some("IMG-1-WA0001.jpg")
        );
        assert_eq!(
            default_name(&SourceRef::parse("content://tree/primary:x/VID-2.mp4")).as_deref(),
            Some("VID-2.mp4")
        );
        assert_eq!(default_name(&SourceRef::parse("content://tree/")), None);
    }
}
