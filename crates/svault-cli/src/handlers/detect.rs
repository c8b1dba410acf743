use anyhow::Result;
use owo_colors::OwoColorize;

use svault_core::{ProbeOutcome, SourceRef, probe};

use crate::context::Context;

pub struct DetectHandler;

impl DetectHandler {
    pub fn handle_detect(ctx: &Context) -> Result<()> {
        let vault = ctx.vault();
        let resolver = vault.reader().resolver();
        let variants = resolver.variants();
        let total = variants.len();

        let mut rows = Vec::with_capacity(total);
        for (index, variant) in variants.iter().enumerate() {
            svault_logger::progress(&format!("Probing {}", variant.name), index + 1, total);
            let path = variant.resolve(resolver.storage_root());
            let outcome = probe(&path);
            rows.push((variant.name.clone(), path, outcome));
        }
        let ready = rows.iter().filter(|(_, _, outcome)| outcome.is_ready()).count();
        svault_logger::finish(&format!("Probed {total} locations, {ready} with statuses"));

        println!("{}", "Status folders:".bright_magenta().bold());
        let width = rows.iter().map(|(name, _, _)| name.len()).max().unwrap_or(0);
        for (name, path, outcome) in &rows {
            println!(
                "  {:width$}  {:16}  {}",
                name.bright_cyan().bold(),
                describe_outcome(*outcome),
                path.display().bright_black(),
                width = width
            );
        }

        if ready == 0 {
            svault_logger::warn(&format!(
                "No status folder has media yet, using {}",
                resolver.primary().name
            ));
        }

        if let Some(selected) = vault.source_handle() {
            println!();
            println!(
                "{} {}",
                "Selected source:".bright_magenta().bold(),
                describe_source(&selected).bright_white()
            );
        }
        Ok(())
    }
}

fn describe_outcome(outcome: ProbeOutcome) -> String {
    match outcome {
        ProbeOutcome::Ready(n) => format!("{n} entries").bright_green().to_string(),
        ProbeOutcome::Empty => "empty".bright_yellow().to_string(),
        ProbeOutcome::Missing => "missing".bright_black().to_string(),
        ProbeOutcome::NotDirectory => "not a directory".bright_red().to_string(),
        ProbeOutcome::Unreadable(kind) => format!("unreadable: {kind}").bright_red().to_string(),
    }
}

fn describe_source(source: &SourceRef) -> String {
    if source.is_handle() {
        format!("{source} (tree handle)")
    } else {
        source.to_string()
    }
}
