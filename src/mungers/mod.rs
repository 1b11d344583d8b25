use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{error, info};
use thiserror::Error;

use crate::paths;
use crate::selection::{Selection, Targets};
use crate::settings::Settings;
use crate::tools::MungeContext;

pub mod addme;
pub mod common;
pub mod load;
pub mod shell;
pub mod side;
pub mod sound;
pub mod world;

pub use addme::AddmeMunger;
pub use common::CommonMunger;
pub use load::LoadMunger;
pub use shell::ShellMunger;
pub use side::SideMunger;
pub use sound::SoundMunger;
pub use world::WorldMunger;

#[derive(Debug, Error)]
pub enum MungeError {
    #[error("Failed to {action} {path:?}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    #[error("{0} munging is not yet specified")]
    Unspecified(&'static str),
    #[error("Source folder {0:?} does not exist")]
    MissingSource(PathBuf),
}

impl MungeError {
    pub(crate) fn io(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> MungeError {
        let path = path.to_path_buf();
        move |source| MungeError::Io {
            action,
            path,
            source,
        }
    }
}

/// One asset category's fixed sequence of compiler and packer calls.
pub trait Munger {
    /// Label used in the log, e.g. `Sides/rep`.
    fn name(&self) -> String;

    /// Runs every step. Compiler failures are logged and skipped; an error is
    /// only returned when the munger could not do its job at all.
    fn run(&self, ctx: &MungeContext) -> Result<(), MungeError>;
}

/// Source and scratch locations of one category, both build-relative.
#[derive(Clone, Debug)]
pub struct CategoryDirs {
    pub source_dir: PathBuf,
    pub munge_dir: PathBuf,
}

impl CategoryDirs {
    pub fn new(settings: &Settings, subdir: &Path) -> Self {
        CategoryDirs {
            source_dir: settings.source_path(subdir),
            munge_dir: settings.category_munge_path(subdir),
        }
    }

    /// A path below the source directory, case-corrected.
    pub fn source(&self, settings: &Settings, rel: &str) -> PathBuf {
        settings.resolve(&self.source_dir.join(rel))
    }
}

pub(crate) fn mkdir(settings: &Settings, dir: &Path) -> Result<(), MungeError> {
    paths::mkdir_p(&settings.fs_path(dir)).map_err(MungeError::io("create", dir))
}

/// Copies loose files from `<source>/munged` straight into the munge dir.
pub(crate) fn copy_premunged_files(settings: &Settings, dirs: &CategoryDirs) {
    let premunged = dirs.source(settings, "munged");
    let entries = match fs::read_dir(settings.fs_path(&premunged)) {
        Ok(entries) => entries,
        Err(_) => return,
    };

    let files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    if files.is_empty() {
        return;
    }

    info!("Copying premunged files from {}", premunged.display());
    let target = settings.fs_path(&dirs.munge_dir);
    for file in files {
        let Some(name) = file.file_name() else {
            continue;
        };
        match fs::copy(&file, target.join(name)) {
            Ok(_) => info!("Copied {}", name.to_string_lossy()),
            Err(e) => error!("Failed to copy {}: {}", file.display(), e),
        }
    }
}

/// Names a side or world target list expands to. "Common" goes first since
/// everything else packs against its output.
pub(crate) fn expand_targets(settings: &Settings, targets: &Targets, root: &str) -> Vec<String> {
    let mut names = match targets {
        Targets::None => return Vec::new(),
        Targets::Named(names) => names.clone(),
        Targets::Everything => {
            let dir = settings.fs_path(&settings.source_path(Path::new(root)));
            paths::subdirectory_names(&dir)
        }
    };

    if let Some(idx) = names.iter().position(|n| n.eq_ignore_ascii_case("common")) {
        let common = names.remove(idx);
        names.insert(0, common);
    }
    names
}

/// Every munger a selection asks for, in run order:
/// Common, Shell, Load, Sides, Worlds, Sound, Addme.
pub fn plan(settings: &Settings, selection: &Selection) -> Vec<Box<dyn Munger>> {
    let mut mungers: Vec<Box<dyn Munger>> = Vec::new();

    if selection.common {
        mungers.push(Box::new(CommonMunger::new(settings, selection.localize)));
    }
    if selection.shell {
        mungers.push(Box::new(ShellMunger::new(settings, selection.movies)));
    }
    if selection.load {
        mungers.push(Box::new(LoadMunger::new(settings)));
    }
    for side in expand_targets(settings, &selection.sides, "Sides") {
        mungers.push(Box::new(SideMunger::new(settings, &side)));
    }
    for world in expand_targets(settings, &selection.worlds, "Worlds") {
        mungers.push(Box::new(WorldMunger::new(settings, &world)));
    }
    if selection.sound {
        mungers.push(Box::new(SoundMunger::new(settings)));
    }
    if selection.wants_addme() {
        mungers.push(Box::new(AddmeMunger::new(settings)));
    }

    mungers
}

/// Runs each munger in turn. A munger that gives up is logged and the rest
/// still run. Returns how many gave up.
pub fn run_all(ctx: &MungeContext, mungers: &[Box<dyn Munger>]) -> usize {
    let mut aborted = 0;
    for munger in mungers {
        if let Err(e) = munger.run(ctx) {
            error!("Munge {} stopped: {}", munger.name(), e);
            aborted += 1;
        }
    }
    aborted
}
