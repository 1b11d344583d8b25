use std::path::{Path, PathBuf};

use log::{debug, info};

use super::{CategoryDirs, MungeError, Munger};
use crate::settings::Settings;
use crate::tools::MungeContext;

/// Sound banks and streams.
///
/// The compiler sequence for sound is not settled yet, so running this
/// munger reports an error instead of guessing at it.
pub struct SoundMunger {
    dirs: CategoryDirs,
    output_dir: PathBuf,
}

impl SoundMunger {
    pub fn new(settings: &Settings) -> Self {
        SoundMunger {
            dirs: CategoryDirs::new(settings, Path::new("Sound")),
            output_dir: settings.output_path().join("Sound"),
        }
    }
}

impl Munger for SoundMunger {
    fn name(&self) -> String {
        "Sound".to_string()
    }

    fn run(&self, _ctx: &MungeContext) -> Result<(), MungeError> {
        info!("Munge Sound...");
        debug!(
            "Sound sources {} -> {}",
            self.dirs.source_dir.display(),
            self.output_dir.display()
        );
        Err(MungeError::Unspecified("Sound"))
    }
}
