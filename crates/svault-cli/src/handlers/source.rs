use anyhow::Result;

use svault_core::SourceRef;

use crate::context::{Context, report};

pub struct SourceHandler;

impl SourceHandler {
    pub fn handle_set_source(ctx: &Context, value: Option<&str>, clear: bool) -> Result<()> {
        let selection = if clear { None } else { value.map(SourceRef::parse) };
        ctx.vault()
            .set_source_handle(selection.as_ref())
            .map_err(report)?;

        match selection {
            Some(source) => svault_logger::success(&format!("Reading statuses from {source}")),
            None => svault_logger::success("Cleared the stored source, detection is back on"),
        }
        Ok(())
    }
}
