use anyhow::Result;
use clap::CommandFactory;
use owo_colors::OwoColorize;

use crate::commands::Cli;
use svault_constants::{BIN_NAME, COMMANDS, DESCRIPTION, EXAMPLES, VERSION};

pub struct HelpHandler;

impl HelpHandler {
    pub fn handle_help(command: Option<&str>) -> Result<()> {
        match command {
            Some(cmd) => Self::show_command_help(cmd),
            None => {
                Self::show_custom_help();
                Ok(())
            }
        }
    }

    fn show_command_help(command: &str) -> Result<()> {
        let mut cmd = Cli::command();

        if let Some(subcommand) = cmd.find_subcommand_mut(command) {
            subcommand.print_help()?;
        } else {
            println!(
                "{}: Unknown command '{}'",
                "Error".bright_red().bold(),
                command
            );
            println!();
            Self::show_custom_help();
        }

        println!();
        Ok(())
    }

    fn show_custom_help() {
        println!("{}", DESCRIPTION.bright_white().bold());
        println!(
            "{} {}",
            "Version:".bright_white().bold(),
            VERSION.bright_black().bold()
        );
        println!();

        println!("{}", "Usage:".bright_magenta().bold());
        println!(
            "  {} {} {} {}",
            BIN_NAME.bright_cyan().bold(),
            "<COMMAND>".bright_white(),
            "<OPTIONS>".bright_black().bold(),
            "[ARGS]".bright_black().bold()
        );
        println!();

        println!("{}", "Commands:".bright_magenta().bold());
        let rows: Vec<(String, String, &str)> = COMMANDS
            .iter()
            .map(|(cmd, desc, aliases)| {
                let alias_str = if aliases.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", aliases.join(", "))
                };
                ((*cmd).to_string(), alias_str, *desc)
            })
            .collect();
        let max_cmd_width = rows
            .iter()
            .map(|(cmd, alias, _)| cmd.len() + alias.len())
            .max()
            .unwrap_or(0);

        for (cmd, alias_str, desc) in rows {
            let plain_len = cmd.len() + alias_str.len();
            let colored_cmd = format!(
                "{}{}",
                cmd.bright_cyan().bold(),
                alias_str.bright_black().bold()
            );
            println!(
                "  {:width$}  # {}",
                colored_cmd,
                desc.bright_black().bold(),
                width = max_cmd_width + (colored_cmd.len() - plain_len)
            );
        }
        println!();

        println!("{}", "Options:".bright_magenta().bold());
        for (flag, desc) in [
            ("--config <PATH>", "Use another config file"),
            ("-q, --quiet", "Only print errors"),
            ("-v, --verbose", "Print probe and copy details"),
            ("-V, --version", "Print version"),
        ] {
            let colored = flag.bright_cyan().bold().to_string();
            println!(
                "  {:width$}  # {}",
                colored,
                desc.bright_black().bold(),
                width = 16 + (colored.len() - flag.len())
            );
        }
        println!();

        Self::show_examples();
    }

    fn show_examples() {
        println!("{}", "Examples:".bright_magenta().bold());
        let max_example_width = EXAMPLES.iter().map(|(cmd, _)| cmd.len()).max().unwrap_or(0);

        for (cmd, desc) in EXAMPLES {
            let formatted_cmd = format_example(cmd);
            let visual_width_diff = formatted_cmd.len() - cmd.len();
            println!(
                "  {:width$}  # {}",
                formatted_cmd,
                desc.bright_black().bold(),
                width = max_example_width + visual_width_diff
            );
        }

        println!();
        println!(
            "{}",
            "For more information about a specific command, use:".bright_magenta()
        );
        let help_cmd = format!("{BIN_NAME} help <command>");
        let formatted_help_cmd = format_example(&help_cmd);
        println!(
            "  {:width$}  # {}",
            formatted_help_cmd,
            "Show help for specific command".bright_black().bold(),
            width = max_example_width + (formatted_help_cmd.len() - help_cmd.len())
        );
        println!();
    }
}

fn format_example(cmd: &str) -> String {
    let parts: Vec<&str> = cmd.split_whitespace().collect();
    let Some((bin, rest)) = parts.split_first() else {
        return String::new();
    };

    let mut formatted = vec![bin.bright_cyan().bold().to_string()];
    for part in rest {
        if part.starts_with('-') || part.starts_with('<') {
            formatted.push(part.bright_black().bold().to_string());
        } else {
            formatted.push(part.bright_white().to_string());
        }
    }
    formatted.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_command_exists() {
        let mut cli = Cli::command();
        for (name, _, aliases) in COMMANDS {
            assert!(cli.find_subcommand_mut(name).is_some(), "{name}");
            for alias in *aliases {
                assert!(cli.find_subcommand_mut(alias).is_some(), "{alias}");
            }
        }
    }

    #[test]
    fn examples_keep_their_words() {
        let formatted = format_example("svault list --favourites");
        assert!(formatted.contains("svault"));
        assert!(formatted.contains("--favourites"));
        assert!(format_example("").is_empty());
    }
}
