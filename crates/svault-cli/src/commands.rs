use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "svault")]
#[command(version)]
#[command(propagate_version = true)]
#[command(about = "Finds messaging-app statuses and keeps saved copies safe", long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
    /// Print probe and copy details
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lists status folders found on this device
    #[command(alias = "scan")]
    Detect,
    /// Lists statuses, or saved/favourite items
    #[command(alias = "ls")]
    List {
        /// List the saved folder instead of statuses
        #[arg(long, conflicts_with = "favourites")]
        saved: bool,
        /// List favourites instead of statuses
        #[arg(long, alias = "favorites")]
        favourites: bool,
        /// Status folder or tree handle to read instead of the stored one
        #[arg(long)]
        source: Option<String>,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Copies a status into the saved folder
    #[command(alias = "s")]
    Save {
        /// Status file path or handle
        path: String,
        /// Name to save under (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Moves a saved item into favourites
    #[command(aliases = ["fav", "favourite"])]
    Favorite { path: String },
    /// Moves a favourite back to saved
    #[command(aliases = ["unfav", "unfavourite"])]
    Unfavorite { path: String },
    /// Toggles the favourite flag of a saved item
    Toggle { path: String },
    /// Deletes a saved or favourite item
    #[command(alias = "rm")]
    Delete { path: String },
    /// Shows whether a path is saved, favourite or unmanaged
    Where { path: PathBuf },
    /// Loads both channels once and prints a summary
    Load {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Remembers the status folder or tree handle to read
    SetSource {
        /// Folder path or handle; omit together with --clear to forget the selection
        #[arg(required_unless_present = "clear")]
        value: Option<String>,
        #[arg(long)]
        clear: bool,
    },
    /// Shows help information for svault or a specific command
    Help {
        /// The command to show help for (optional)
        #[arg()]
        command: Option<String>,
    },
}
