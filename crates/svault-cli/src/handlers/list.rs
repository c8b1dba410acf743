use anyhow::Result;
use owo_colors::OwoColorize;

use svault_core::{Channel, LoadResult, Location, SourceRef, StatusEntry};

use crate::context::{Context, report};

pub struct ListHandler;

impl ListHandler {
    pub fn handle_list(
        ctx: &Context,
        saved: bool,
        favourites: bool,
        source: Option<&str>,
        json: bool,
    ) -> Result<()> {
        if !json {
            svault_logger::status("Reading entries");
        }
        let (title, entries) = if saved || favourites {
            let location = if favourites {
                Location::Favorite
            } else {
                Location::Saved
            };
            let entries = ctx
                .block_on(ctx.vault().list_managed(location))
                .map_err(report)?;
            (format!("{location} items"), entries)
        } else if let Some(raw) = source {
            let entries = ctx.block_on(ctx.vault().enumerate(&SourceRef::parse(raw)));
            (format!("Statuses in {raw}"), entries)
        } else {
            match ctx.block_on(ctx.vault().try_load(Channel::Source)) {
                LoadResult::Completed { snapshot, .. } => {
                    ("Statuses".to_string(), snapshot.entries.clone())
                }
                LoadResult::Failed(err) => return Err(report(err)),
                LoadResult::TimedOut(after) => {
                    anyhow::bail!(
                        "Reading statuses timed out after {}s, try again",
                        after.as_secs()
                    )
                }
                LoadResult::Busy => anyhow::bail!("Statuses are already being read"),
            }
        };

        if json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }

        svault_logger::finish_line("");
        Self::print_entries(&title, &entries);
        Ok(())
    }

    pub(crate) fn print_entries(title: &str, entries: &[StatusEntry]) {
        println!(
            "{} {}",
            title.bright_magenta().bold(),
            format!("({})", entries.len()).bright_black()
        );
        if entries.is_empty() {
            svault_logger::info("Nothing here yet");
            return;
        }

        let width = entries
            .iter()
            .map(|e| e.display_name.len())
            .max()
            .unwrap_or(0);
        for entry in entries {
            let kind = if entry.is_video() {
                entry.media_kind.as_str().bright_blue().to_string()
            } else {
                entry.media_kind.as_str().bright_green().to_string()
            };
            println!(
                "  {:width$}  {:>10}  {}",
                entry.display_name.bright_white(),
                format_size(entry.size_bytes).bright_black(),
                kind,
                width = width
            );
            if svault_logger::is_verbose() {
                println!("    {}", entry.source_ref.to_string().bright_black());
            }
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = "B";
    for next in UNITS {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    if unit == "B" {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {unit}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_are_human_readable() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
