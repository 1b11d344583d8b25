use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, error, info};

use super::{CategoryDirs, MungeError, Munger, mkdir};
use crate::paths;
use crate::settings::{Platform, Settings};
use crate::tools::{Category, LevelPack, MungeContext, MungeOptions, level_pack, munge};

/// Scratch folder (in the build root) the localization files are merged into.
pub const MUNGE_TEMP_NAME: &str = "MungeTemp";

/// Common data: everything the game loads regardless of map, plus the
/// `core`/`common`/`ingame` file lists every other category packs against.
pub struct CommonMunger {
    dirs: CategoryDirs,
    output_dir: PathBuf,
    localize: bool,
}

impl CommonMunger {
    pub fn new(settings: &Settings, localize: bool) -> Self {
        CommonMunger {
            dirs: CategoryDirs::new(settings, Path::new("Common")),
            output_dir: settings.output_path(),
            localize,
        }
    }

    /// `Common/MUNGED/<P>/<name>`, as other categories reference it.
    fn list(&self, name: &str) -> String {
        format!("{}/{}", paths::arg(&self.dirs.munge_dir), name)
    }

    fn munge_sources(&self, ctx: &MungeContext) {
        let settings = ctx.settings;
        let src = &self.dirs.source_dir;
        let out = &self.dirs.munge_dir;
        let plain = MungeOptions::default();

        munge(ctx, Category::Odf, &["$*.odf"], src, out, plain);
        munge(ctx, Category::Config, &["$*.fx"], src, out, plain);
        munge(ctx, Category::Config, &["$*.combo"], src, out, plain);
        munge(ctx, Category::Script, &["$*.lua"], src, out, plain);
        munge(ctx, Category::Config, &["$*.mcfg"], src, out, plain);
        munge(ctx, Category::Config, &["$*.sanm"], src, out, plain);
        munge(ctx, Category::Config, &["$*.hud"], src, out, plain);
        munge(ctx, Category::Font, &["$*.fff"], src, out, plain);
        munge(ctx, Category::Texture, &["$*.tga", "$*.pic"], src, out, plain);
        munge(ctx, Category::Model, &["$effects/*.msh", "$MSHs/*.msh"], src, out, plain);

        if settings.platform != Platform::Ps2 {
            munge(
                ctx,
                Category::Shader,
                &["shaders/*.xml", "shaders/*.vsfrag"],
                src,
                out,
                plain,
            );
        }

        let sound_dir = self.dirs.source(settings, "Sound");
        let hashed = MungeOptions::hashed();
        munge(ctx, Category::Config, &["*.snd", "*.mus"], &sound_dir, out, hashed);
    }

    fn munge_sprites(&self, ctx: &MungeContext) {
        let settings = ctx.settings;
        let sprites_dir = self.dirs.source(settings, "Sprites");
        if !settings.fs_path(&sprites_dir).is_dir() {
            debug!("No sprites in {}", sprites_dir.display());
            return;
        }

        for folder in paths::subdirectory_names(&settings.fs_path(&sprites_dir)) {
            munge(
                ctx,
                Category::Sprite,
                &["$*.tga", "$*.pic"],
                &sprites_dir.join(&folder),
                &self.dirs.munge_dir,
                MungeOptions::default(),
            );
        }
    }

    /// Concatenates same-named `.cfg` files of `Localize/<PLATFORM>` and
    /// `Localize` into the temp dir, lowercasing names.
    pub fn merge_localize_files(
        &self,
        settings: &Settings,
        temp: &Path,
    ) -> Result<usize, MungeError> {
        let localize_dir = self.dirs.source(settings, "Localize");
        let platform_dir = localize_dir.join(settings.platform.as_str());

        info!("Merge localization files...");
        let temp_fs = settings.fs_path(temp);
        paths::mkdir_p(&temp_fs).map_err(MungeError::io("create", temp))?;

        let mut merged = 0;
        for dir in [&platform_dir, &localize_dir] {
            let dir_fs = settings.fs_path(dir);
            if !dir_fs.is_dir() {
                continue;
            }
            let files = paths::files_with_extensions(&dir_fs, &["cfg"])
                .map_err(MungeError::io("read", dir))?;
            for file in files {
                let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                let contents = fs::read_to_string(&file).map_err(MungeError::io("read", &file))?;
                let target = temp_fs.join(name.to_lowercase());
                let mut merged_file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&target)
                    .map_err(MungeError::io("open", &target))?;
                merged_file
                    .write_all(contents.as_bytes())
                    .map_err(MungeError::io("write", &target))?;
                info!("Merged {}", name);
                merged += 1;
            }
        }

        Ok(merged)
    }

    fn munge_localization(&self, ctx: &MungeContext) {
        let settings = ctx.settings;
        let temp = PathBuf::from(MUNGE_TEMP_NAME);

        match self.merge_localize_files(settings, &temp) {
            Ok(_) => {
                munge(
                    ctx,
                    Category::Localize,
                    &["*.cfg"],
                    &temp,
                    &self.dirs.munge_dir,
                    MungeOptions::default(),
                );
            }
            Err(e) => error!("Skipping localization: {}", e),
        }

        if let Err(e) = paths::remove_dir_if_exists(&settings.fs_path(&temp)) {
            error!("Failed to remove {}: {}", temp.display(), e);
        }
    }

    fn pack_levels(&self, ctx: &MungeContext) {
        let src = &self.dirs.source_dir;
        let munged = &self.dirs.munge_dir;
        let out = &self.output_dir;

        level_pack(
            ctx,
            &LevelPack::new(&["core.req"], src)
                .output(out)
                .input_dir(munged)
                .write(["core"]),
        );
        level_pack(
            ctx,
            &LevelPack::new(&["common.req"], src)
                .output(out)
                .input_dir(munged)
                .common(["core"])
                .write(["common"]),
        );
        level_pack(
            ctx,
            &LevelPack::new(&["ingame.req"], src)
                .output(out)
                .input_dir(munged)
                .common(["core", "common"])
                .write(["ingame"]),
        );
        level_pack(
            ctx,
            &LevelPack::new(&["inshell.req"], src)
                .output(out)
                .input_dir(munged)
                .common(["core", "common"])
                .write(["inshell"]),
        );
        level_pack(
            ctx,
            &LevelPack::new(&["mission/*.req"], src)
                .output(munged)
                .input_dir(munged)
                .common(["core", "common", "ingame"])
                .write(["core"]),
        );
        level_pack(
            ctx,
            &LevelPack::new(&["mission.req"], src)
                .output(out)
                .input_dir(munged)
                .write(["core"]),
        );
    }

    /// First person models, one level per `FPM/<folder>`.
    fn pack_fpm(&self, ctx: &MungeContext) {
        let settings = ctx.settings;
        let fpm_dir = self.dirs.source(settings, "FPM");
        if !settings.fs_path(&fpm_dir).is_dir() {
            debug!("No first person models in {}", fpm_dir.display());
            return;
        }

        for folder in paths::subdirectory_names(&settings.fs_path(&fpm_dir)) {
            let output = self.output_dir.join("FPM").join(folder.to_uppercase());
            if let Err(e) = mkdir(settings, &output) {
                error!("Skipping FPM {}: {}", folder, e);
                continue;
            }
            level_pack(
                ctx,
                &LevelPack::new(&["*.req"], fpm_dir.join(&folder))
                    .output(output)
                    .input_dir(&self.dirs.munge_dir)
                    .common([self.list("core"), self.list("common"), self.list("ingame")]),
            );
        }
    }
}

impl Munger for CommonMunger {
    fn name(&self) -> String {
        "Common".to_string()
    }

    fn run(&self, ctx: &MungeContext) -> Result<(), MungeError> {
        info!("Munge Common...");
        let settings = ctx.settings;

        mkdir(settings, &self.output_dir)?;
        mkdir(settings, &self.dirs.munge_dir)?;

        self.munge_sources(ctx);
        self.munge_sprites(ctx);
        if self.localize {
            self.munge_localization(ctx);
        }

        self.pack_levels(ctx);
        self.pack_fpm(ctx);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn build_root(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let root = std::env::temp_dir().join(format!(
            "xmunge_common_{}_{}_{}",
            label,
            std::process::id(),
            nanos
        ));
        let build = root.join("data_TST/_BUILD");
        fs::create_dir_all(&build).unwrap();
        build
    }

    #[test]
    fn localize_files_are_merged_case_insensitively() {
        let build = build_root("localize");
        let localize = build.join("../Common/Localize");
        fs::create_dir_all(localize.join("PC")).unwrap();
        fs::write(localize.join("PC/English.cfg"), "pc;").unwrap();
        fs::write(localize.join("english.cfg"), "base;").unwrap();
        fs::write(localize.join("notes.txt"), "ignored").unwrap();

        let settings = Settings::new("PC", None).unwrap().with_build_root(&build);
        let munger = CommonMunger::new(&settings, true);
        let merged = munger
            .merge_localize_files(&settings, Path::new(MUNGE_TEMP_NAME))
            .unwrap();

        assert_eq!(merged, 2);
        let contents = fs::read_to_string(build.join("MungeTemp/english.cfg")).unwrap();
        assert_eq!(contents, "pc;base;");
        assert!(!build.join("MungeTemp/notes.txt").exists());
    }
}
