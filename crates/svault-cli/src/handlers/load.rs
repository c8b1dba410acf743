use anyhow::Result;
use owo_colors::OwoColorize;
use serde_json::{Value, json};

use svault_core::{Channel, LoadResult};

use crate::context::Context;

pub struct LoadHandler;

impl LoadHandler {
    pub fn handle_load(ctx: &Context, as_json: bool) -> Result<()> {
        if !as_json {
            svault_logger::status("Loading statuses and managed items");
        }
        let (source, managed) = ctx.block_on(ctx.vault().load_all());

        if as_json {
            let summary = json!({
                "source": summary_json(&source),
                "managed": summary_json(&managed),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }

        svault_logger::finish("Loaded both channels");
        println!("{}", "Load summary:".bright_magenta().bold());
        for (channel, result) in [(Channel::Source, &source), (Channel::Managed, &managed)] {
            println!(
                "  {:8} {}",
                channel.as_str().bright_cyan().bold(),
                describe(result)
            );
        }

        if matches!(source, LoadResult::Failed(_)) || matches!(managed, LoadResult::Failed(_)) {
            anyhow::bail!("At least one channel failed to load");
        }
        Ok(())
    }
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

fn describe(result: &LoadResult) -> String {
    match result {
        LoadResult::Busy => "busy".bright_yellow().to_string(),
        LoadResult::Completed { snapshot, changed } => format!(
            "{} {} {}",
            format!("{} entries", snapshot.len()).bright_white(),
            short_hash(&snapshot.hash).bright_black(),
            if *changed {
                "changed".bright_green().to_string()
            } else {
                "unchanged".bright_black().to_string()
            }
        ),
        LoadResult::Failed(err) => format!(
            "{} {}",
            err.reason().as_str().bright_red().bold(),
            err.to_string().bright_black()
        ),
        LoadResult::TimedOut(after) => format!("timed out after {}s", after.as_secs())
            .bright_yellow()
            .to_string(),
    }
}

fn summary_json(result: &LoadResult) -> Value {
    match result {
        LoadResult::Busy => json!({ "state": "busy" }),
        LoadResult::Completed { snapshot, changed } => json!({
            "state": "completed",
            "entries": snapshot.len(),
            "hash": snapshot.hash,
            "changed": changed,
        }),
        LoadResult::Failed(err) => json!({
            "state": "failed",
            "reason": err.reason().as_str(),
            "message": err.to_string(),
        }),
        LoadResult::TimedOut(after) => json!({
            "state": "timed_out",
            "afterMs": u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn hashes_are_shortened_safely() {
        assert_eq!(short_hash("abc"), "abc");
        assert_eq!(short_hash("0123456789abcdef"), "0123456789ab");
    }

    #[test]
    fn timeouts_report_milliseconds() {
        let value = summary_json(&LoadResult::TimedOut(Duration::from_millis(1500)));
        assert_eq!(value["state"], "timed_out");
        assert_eq!(value["afterMs"], 1500);
        assert_eq!(summary_json(&LoadResult::Busy)["state"], "busy");
    }
}
