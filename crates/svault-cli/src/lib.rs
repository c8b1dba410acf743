pub mod commands;
mod context;
pub mod handlers;

use clap::Parser;

use commands::{Cli, Commands};
use context::Context;
use handlers::{
    DeleteHandler, DetectHandler, FavoriteAction, FavoriteHandler, HelpHandler, ListHandler,
    LoadHandler, LocationHandler, SaveHandler, SourceHandler,
};

pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    svault_logger::init_logger(cli.quiet, cli.verbose);

    if let Commands::Help { command } = &cli.command {
        return HelpHandler::handle_help(command.as_deref());
    }

    let ctx = Context::load(cli.config.as_deref())?;
    match &cli.command {
        Commands::Detect => DetectHandler::handle_detect(&ctx),
        Commands::List {
            saved,
            favourites,
            source,
            json,
        } => ListHandler::handle_list(&ctx, *saved, *favourites, source.as_deref(), *json),
        Commands::Save { path, name } => SaveHandler::handle_save(&ctx, path, name.as_deref()),
        Commands::Favorite { path } => {
            FavoriteHandler::handle_favorite(&ctx, path, FavoriteAction::Mark)
        }
        Commands::Unfavorite { path } => {
            FavoriteHandler::handle_favorite(&ctx, path, FavoriteAction::Unmark)
        }
        Commands::Toggle { path } => {
            FavoriteHandler::handle_favorite(&ctx, path, FavoriteAction::Toggle)
        }
        Commands::Delete { path } => DeleteHandler::handle_delete(&ctx, path),
        Commands::Where { path } => LocationHandler::handle_where(&ctx, path),
        Commands::Load { json } => LoadHandler::handle_load(&ctx, *json),
        Commands::SetSource { value, clear } => {
            SourceHandler::handle_set_source(&ctx, value.as_deref(), *clear)
        }
        Commands::Help { command } => HelpHandler::handle_help(command.as_deref()),
    }
}
