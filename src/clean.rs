use std::path::{Path, PathBuf};

use log::{error, info};

use crate::deploy;
use crate::mungers::expand_targets;
use crate::paths;
use crate::selection::Selection;
use crate::settings::Settings;

/// Build-relative `<category>/MUNGED/<PLATFORM>` directories whose contents a
/// selection clears. Other platforms' scratch output is not touched.
pub fn munge_dirs(settings: &Settings, selection: &Selection) -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    for (selected, category) in [
        (selection.common, "Common"),
        (selection.shell, "Shell"),
        (selection.load, "Load"),
        (selection.sound, "Sound"),
    ] {
        if selected {
            dirs.push(settings.category_munge_path(Path::new(category)));
        }
    }

    for side in expand_targets(settings, &selection.sides, "Sides") {
        dirs.push(settings.category_munge_path(&Path::new("Sides").join(side)));
    }
    for world in expand_targets(settings, &selection.worlds, "Worlds") {
        dirs.push(settings.category_munge_path(&Path::new("Worlds").join(world)));
    }

    if selection.addme {
        dirs.push(settings.resolve(&settings.source_path(Path::new("addme")).join("munged")));
    }

    dirs
}

/// Clears the selected scratch directories. With everything selected the
/// level output and the deployed addon levels go too. Returns how many
/// targets could not be removed.
pub fn clean(settings: &Settings, selection: &Selection, gamedata: Option<&Path>) -> usize {
    let mut failed = 0;

    for dir in munge_dirs(settings, selection) {
        match paths::clean_dir_contents(&settings.fs_path(&dir)) {
            Ok(0) => {}
            Ok(removed) => info!("Cleaned {} ({} entries)", dir.display(), removed),
            Err(e) => {
                error!("Failed to clean {}: {}", dir.display(), e);
                failed += 1;
            }
        }
    }

    if !selection.everything {
        return failed;
    }

    let mut whole_dirs = vec![settings.fs_path(&settings.output_path())];
    if let Some(gamedata) = gamedata {
        match deploy::addon_level_dir(settings, gamedata) {
            Ok(dir) => whole_dirs.push(dir),
            Err(e) => {
                error!("{}", e);
                failed += 1;
            }
        }
    }

    for dir in whole_dirs {
        match paths::remove_dir_if_exists(&dir) {
            Ok(true) => info!("Removed {}", dir.display()),
            Ok(false) => {}
            Err(e) => {
                error!("Failed to remove {}: {}", dir.display(), e);
                failed += 1;
            }
        }
    }

    failed
}
