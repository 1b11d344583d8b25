use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};

use xmunge::gamedata::GAMEDATA_ENV;
use xmunge::settings::CONFIG_FILE_NAME;
use xmunge::{
    CategoryFlags, ConsolePrompt, GameDataResolver, OperatorLogger, Selection, Settings,
    read_config,
};

/// Deletes munged intermediates and level output of the data folder this is
/// run from.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Target platform: PC, PS2 or XBOX
    #[arg(short = 'p', long, default_value_t = String::from("PC"))]
    platform: String,
    /// Localized build, e.g. english, uk, french
    #[arg(short = 'l', long)]
    language: Option<String>,
    #[command(flatten)]
    categories: CategoryFlags,
    /// SWBF2 GameData folder holding the deployed addon
    #[arg(long)]
    gamedata: Option<PathBuf>,
    #[arg(short = 'd', long, default_value_t = false)]
    debug: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = Settings::new(&cli.platform, cli.language.as_deref())?;
    let config = read_config(&settings.fs_path(&PathBuf::from(CONFIG_FILE_NAME)))?;
    let settings = settings.with_config(&config);

    OperatorLogger::new(None, cli.debug)?.install()?;

    let selection = Selection::from_flags(&cli.categories);

    // Only a full clean touches the deployed addon.
    let gamedata = if selection.everything {
        let resolved = GameDataResolver::new(settings.gamedata_file_path(), ConsolePrompt)
            .explicit(cli.gamedata.clone().or_else(|| config.gamedata_dir.clone()))
            .from_env(std::env::var_os(GAMEDATA_ENV).map(PathBuf::from))
            .resolve();
        match resolved {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("{}; leaving the deployed addon alone", e);
                None
            }
        }
    } else {
        None
    };

    let failed = xmunge::clean::clean(&settings, &selection, gamedata.as_deref());
    if failed > 0 {
        warn!("{} targets could not be removed", failed);
    }
    info!("Clean done");

    Ok(())
}
