use std::path::{Path, PathBuf};

use log::info;

use super::{CategoryDirs, MungeError, Munger, copy_premunged_files, mkdir};
use crate::paths;
use crate::settings::Settings;
use crate::tools::{Category, LevelPack, MungeContext, MungeOptions, level_pack, munge};

/// One faction under `Sides/<name>`, packed into `_LVL_<P>/SIDE`.
pub struct SideMunger {
    side: String,
    dirs: CategoryDirs,
    output_dir: PathBuf,
    common_munge_dir: PathBuf,
    sides_common_munge_dir: PathBuf,
}

impl SideMunger {
    pub fn new(settings: &Settings, side: &str) -> Self {
        SideMunger {
            side: side.to_string(),
            dirs: CategoryDirs::new(settings, &Path::new("Sides").join(side)),
            output_dir: settings.output_path().join("SIDE"),
            common_munge_dir: settings.category_munge_path(Path::new("Common")),
            sides_common_munge_dir: settings.category_munge_path(Path::new("Sides/Common")),
        }
    }

    pub fn is_common(&self) -> bool {
        self.side.eq_ignore_ascii_case("common")
    }

    fn input_dirs(&self) -> [&PathBuf; 3] {
        [&self.dirs.munge_dir, &self.sides_common_munge_dir, &self.common_munge_dir]
    }

    fn common_lists(&self) -> Vec<String> {
        ["core", "common", "ingame"]
            .iter()
            .map(|name| format!("{}/{}", paths::arg(&self.common_munge_dir), name))
            .collect()
    }
}

impl Munger for SideMunger {
    fn name(&self) -> String {
        format!("Sides/{}", self.side)
    }

    fn run(&self, ctx: &MungeContext) -> Result<(), MungeError> {
        info!("Munge Sides/{}...", self.side);
        let settings = ctx.settings;
        let src = &self.dirs.source_dir;
        let out = &self.dirs.munge_dir;
        let plain = MungeOptions::default();

        mkdir(settings, out)?;
        copy_premunged_files(settings, &self.dirs);

        munge(ctx, Category::Odf, &["$*.odf"], src, out, plain);
        munge(ctx, Category::Config, &["$effects/*.fx"], src, out, plain);
        munge(ctx, Category::Config, &["$*.combo"], src, out, plain);
        munge(ctx, Category::Model, &["$*.msh"], src, out, plain);
        munge(ctx, Category::Texture, &["$*.tga", "$*.pic"], src, out, plain);
        munge(
            ctx,
            Category::Config,
            &["*.snd", "*.mus"],
            &self.dirs.source(settings, "Sound"),
            out,
            plain,
        );

        mkdir(settings, &self.output_dir)?;

        if self.is_common() {
            return Ok(());
        }

        level_pack(
            ctx,
            &LevelPack::new(&["req/*.req"], src)
                .output(out)
                .input_dirs(self.input_dirs())
                .common(self.common_lists()),
        );
        level_pack(
            ctx,
            &LevelPack::new(&["*.req"], src)
                .output(&self.output_dir)
                .input_dirs(self.input_dirs()),
        );

        Ok(())
    }
}
