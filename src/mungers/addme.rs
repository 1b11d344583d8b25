use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use super::{MungeError, Munger, mkdir};
use crate::settings::Settings;
use crate::tools::{Category, MungeContext, MungeOptions, munge};

pub const ADDME_SCRIPT: &str = "addme.script";

/// The `addme.lua` script that registers the mod's maps with the game.
pub struct AddmeMunger {
    source_dir: PathBuf,
    script_dir: PathBuf,
    output_dir: PathBuf,
}

impl AddmeMunger {
    pub fn new(settings: &Settings) -> Self {
        let source_dir = settings.source_path(Path::new("addme"));
        let script_dir = settings.resolve(&source_dir.join("munged"));
        AddmeMunger {
            source_dir,
            script_dir,
            output_dir: settings.output_path(),
        }
    }
}

impl Munger for AddmeMunger {
    fn name(&self) -> String {
        "Addme".to_string()
    }

    fn run(&self, ctx: &MungeContext) -> Result<(), MungeError> {
        info!("Munge Addme...");
        let settings = ctx.settings;

        if !settings.fs_path(&self.source_dir).is_dir() {
            return Err(MungeError::MissingSource(self.source_dir.clone()));
        }

        mkdir(settings, &self.script_dir)?;
        mkdir(settings, &self.output_dir)?;

        munge(
            ctx,
            Category::Script,
            &["addme.lua"],
            &self.source_dir,
            &self.script_dir,
            MungeOptions::default(),
        );

        let script = settings.fs_path(&self.script_dir.join(ADDME_SCRIPT));
        let target = settings.fs_path(&self.output_dir.join(ADDME_SCRIPT));
        fs::copy(&script, &target).map_err(MungeError::io("copy", &script))?;

        Ok(())
    }
}
