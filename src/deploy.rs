use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::mungers::MungeError;
use crate::mungers::addme::ADDME_SCRIPT;
use crate::paths;
use crate::settings::Settings;

/// `<gamedata>/addon/<world-id>`.
pub fn addon_dir(settings: &Settings, gamedata: &Path) -> Result<PathBuf, MungeError> {
    let world_id = settings.world_id().ok_or_else(|| MungeError::Io {
        action: "derive the addon name from",
        path: settings.fs_path(&settings.data_dir),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "data folder not found"),
    })?;
    Ok(gamedata.join("addon").join(world_id))
}

/// `<gamedata>/addon/<world-id>/data/_LVL_<P>`.
pub fn addon_level_dir(settings: &Settings, gamedata: &Path) -> Result<PathBuf, MungeError> {
    Ok(addon_dir(settings, gamedata)?
        .join("data")
        .join(&settings.output_dir))
}

/// Copies the level output tree into the game's addon folder and moves the
/// addme script up to the addon root. Returns the addon level directory.
pub fn deploy(settings: &Settings, gamedata: &Path) -> Result<PathBuf, MungeError> {
    let source = settings.fs_path(&settings.output_path());
    let addon = addon_dir(settings, gamedata)?;
    let target = addon_level_dir(settings, gamedata)?;

    info!("Copying {} to {}", source.display(), target.display());
    let copied = paths::copy_tree(&source, &target).map_err(MungeError::io("copy", &source))?;
    info!("Copied {} files", copied);

    let script = target.join(ADDME_SCRIPT);
    if script.is_file() {
        let destination = addon.join(ADDME_SCRIPT);
        if fs::rename(&script, &destination).is_err() {
            fs::copy(&script, &destination).map_err(MungeError::io("copy", &script))?;
            fs::remove_file(&script).map_err(MungeError::io("delete", &script))?;
        }
        info!("Moved {} to {}", ADDME_SCRIPT, addon.display());
    } else {
        debug!("No {} in {}", ADDME_SCRIPT, target.display());
    }

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "xmunge_deploy_{}_{}_{}",
            label,
            std::process::id(),
            nanos
        ));
        let _ = fs::create_dir_all(&dir);
        dir
    }

    #[test]
    fn copies_output_and_lifts_addme() {
        let root = temp_dir("copy");
        let build = root.join("data_XYZ/_BUILD");
        let output = root.join("data_XYZ/_LVL_PC");
        fs::create_dir_all(&build).unwrap();
        fs::create_dir_all(output.join("SIDE")).unwrap();
        fs::write(output.join("core.lvl"), "core").unwrap();
        fs::write(output.join("SIDE/rep.lvl"), "rep").unwrap();
        fs::write(output.join(ADDME_SCRIPT), "addme").unwrap();
        let gamedata = root.join("GameData");

        let settings = Settings::new("PC", None).unwrap().with_build_root(&build);
        let target = deploy(&settings, &gamedata).unwrap();

        assert_eq!(target, gamedata.join("addon/XYZ/data/_LVL_PC"));
        assert!(target.join("core.lvl").is_file());
        assert!(target.join("SIDE/rep.lvl").is_file());
        assert!(!target.join(ADDME_SCRIPT).exists());
        assert_eq!(
            fs::read_to_string(gamedata.join("addon/XYZ").join(ADDME_SCRIPT)).unwrap(),
            "addme"
        );
        // Source tree is left alone
        assert!(output.join(ADDME_SCRIPT).is_file());
    }
}
