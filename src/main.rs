use std::path::PathBuf;

use clap::Parser;
use log::{error, info, warn};

use xmunge::gamedata::GAMEDATA_ENV;
use xmunge::settings::CONFIG_FILE_NAME;
use xmunge::{
    CategoryFlags, ConsolePrompt, GameDataResolver, MungeContext, OperatorLogger, Platform,
    Selection, Settings, ShimRunner, deploy, plan, read_config, run_all,
};

/// Munges the data folder this is run from into level files and copies them
/// into the game's addon folder.
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
    /// Leave XBOX output in the data folder instead of copying it to GameData
    #[arg(long = "noxboxcopy", default_value_t = false)]
    no_xbox_copy: bool,
    /// Wine prefix the compilers run in
    #[arg(long)]
    wine_prefix: Option<PathBuf>,
    /// SWBF2 GameData folder to deploy into
    #[arg(long)]
    gamedata: Option<PathBuf>,
    /// Print compiler command lines and debug output
    #[arg(short = 'd', long, default_value_t = false)]
    debug: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = Settings::new(&cli.platform, cli.language.as_deref())?;
    let config = read_config(&settings.fs_path(&PathBuf::from(CONFIG_FILE_NAME)))?;
    let settings = settings
        .with_config(&config)
        .with_wine_prefix(cli.wine_prefix.clone());

    OperatorLogger::new(Some(&settings.operator_log_path()), cli.debug)?.install()?;

    let selection = Selection::from_flags(&cli.categories);
    info!(
        "Munging {} ({}) into {}",
        settings.platform,
        settings.lang_version,
        settings.output_path().display()
    );

    let gamedata = GameDataResolver::new(settings.gamedata_file_path(), ConsolePrompt)
        .explicit(cli.gamedata.clone().or_else(|| config.gamedata_dir.clone()))
        .from_env(std::env::var_os(GAMEDATA_ENV).map(PathBuf::from))
        .resolve()?;

    let runner = ShimRunner::from_settings(&settings);
    let ctx = MungeContext::new(&settings, &runner);

    let mungers = plan(&settings, &selection);
    let aborted = run_all(&ctx, &mungers);

    if settings.platform == Platform::Xbox && cli.no_xbox_copy {
        info!("Not copying XBOX output to {}", gamedata.display());
    } else {
        match deploy::deploy(&settings, &gamedata) {
            Ok(target) => info!("Deployed to {}", target.display()),
            Err(e) => error!("{}", e),
        }
    }

    let report = ctx.into_report();
    if !report.failures.is_empty() || aborted > 0 {
        warn!(
            "{} of {} compiler steps failed, {} categories stopped early",
            report.failures.len(),
            report.steps,
            aborted
        );
    }
    info!("Done");

    Ok(())
}
