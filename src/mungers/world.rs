use std::path::{Path, PathBuf};

use log::{error, info};

use super::{CategoryDirs, MungeError, Munger, copy_premunged_files, mkdir};
use crate::paths;
use crate::settings::Settings;
use crate::tools::{
    Category, LevelPack, MungeContext, MungeOptions, WorldChunk, level_pack, munge, world_munge,
};

fn chunk(
    chunk_id: &'static str,
    ext: Option<&'static str>,
    hash_strings: bool,
) -> WorldChunk<'static> {
    WorldChunk {
        output_file: None,
        chunk_id: Some(chunk_id),
        ext,
        hash_strings,
    }
}

/// One map under `Worlds/<name>`, packed into `_LVL_<P>/<NAME>`.
pub struct WorldMunger {
    world: String,
    dirs: CategoryDirs,
    output_dir: PathBuf,
    common_munge_dir: PathBuf,
    worlds_common_munge_dir: PathBuf,
}

impl WorldMunger {
    pub fn new(settings: &Settings, world: &str) -> Self {
        WorldMunger {
            world: world.to_string(),
            dirs: CategoryDirs::new(settings, &Path::new("Worlds").join(world)),
            output_dir: settings.output_path().join(world.to_uppercase()),
            common_munge_dir: settings.category_munge_path(Path::new("Common")),
            worlds_common_munge_dir: settings.category_munge_path(Path::new("Worlds/Common")),
        }
    }

    pub fn is_common(&self) -> bool {
        self.world.eq_ignore_ascii_case("common")
    }

    fn input_dirs(&self) -> [&PathBuf; 3] {
        [&self.dirs.munge_dir, &self.worlds_common_munge_dir, &self.common_munge_dir]
    }

    fn common_lists(&self) -> Vec<String> {
        ["core", "common", "ingame"]
            .iter()
            .map(|name| format!("{}/{}", paths::arg(&self.common_munge_dir), name))
            .collect()
    }

    /// Fragment list shared by the layered packs of one `world*` folder.
    fn fragment_list(&self) -> String {
        format!("{}/MZ", paths::arg(&self.dirs.munge_dir))
    }

    /// Planning paths, one chunk per `.wld` found anywhere below the world.
    fn munge_paths(&self, ctx: &MungeContext) {
        let settings = ctx.settings;
        let source = settings.fs_path(&self.dirs.source_dir);

        let worlds = match paths::files_with_extensions_recursive(&source, &["wld"]) {
            Ok(worlds) => worlds,
            Err(e) => {
                error!("Skipping path munge for {}: {}", self.world, e);
                return;
            }
        };

        for wld in worlds {
            let Some(stem) = wld.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let pattern = format!("${}*.pth", stem);
            world_munge(
                ctx,
                &[pattern.as_str()],
                &self.dirs.source_dir,
                &self.dirs.munge_dir,
                WorldChunk {
                    output_file: Some(stem),
                    chunk_id: Some("path"),
                    ext: Some("path"),
                    hash_strings: false,
                },
            );
        }
    }

    fn munge_sources(&self, ctx: &MungeContext) {
        let settings = ctx.settings;
        let src = &self.dirs.source_dir;
        let out = &self.dirs.munge_dir;
        let plain = MungeOptions::default();

        munge(ctx, Category::Odf, &["$*.odf"], src, out, plain);
        munge(ctx, Category::Model, &["$*.msh"], src, out, plain);
        munge(ctx, Category::Texture, &["$*.tga", "$*.pic"], src, out, plain);
        munge(ctx, Category::Terrain, &["$*.ter"], src, out, plain);
        munge(ctx, Category::World, &["$*.lyr"], src, out, plain);
        munge(ctx, Category::World, &["$*.wld"], src, out, plain);

        self.munge_paths(ctx);

        munge(ctx, Category::PathPlanning, &["$*.pln"], src, out, plain);
        munge(ctx, Category::Config, &["$effects/*.fx"], src, out, plain);
        munge(ctx, Category::Config, &["$*.combo"], src, out, plain);

        world_munge(ctx, &["$*.sky"], src, out, chunk("sky", None, false));
        world_munge(ctx, &["$*.fx"], src, out, chunk("fx", Some("envfx"), false));
        world_munge(ctx, &["$*.prp"], src, out, chunk("prp", Some("prop"), true));
        world_munge(ctx, &["$*.bnd"], src, out, chunk("bnd", Some("boundary"), true));

        munge(
            ctx,
            Category::Config,
            &["$*.snd", "$*.mus", "$*.tsr"],
            &self.dirs.source(settings, "Sound"),
            out,
            MungeOptions::hashed(),
        );

        world_munge(ctx, &["$*.lgt"], src, out, chunk("lght", Some("light"), true));
        world_munge(ctx, &["$*.pvs"], src, out, chunk("PORT", Some("povs"), false));
    }

    /// Three layers per `world*` folder: the fragment list, the `.mrq`
    /// manifests consuming it, then the final `.req` levels.
    fn pack_world_layers(&self, ctx: &MungeContext) {
        let settings = ctx.settings;
        let source = settings.fs_path(&self.dirs.source_dir);
        let common = self.common_lists();

        let layers = paths::subdirectory_names(&source)
            .into_iter()
            .filter(|name| name.to_lowercase().starts_with("world"));

        for layer in layers {
            let layer_dir = self.dirs.source_dir.join(&layer);

            level_pack(
                ctx,
                &LevelPack::new(&["*.req"], &layer_dir)
                    .input_dirs(self.input_dirs())
                    .common(common.iter().cloned())
                    .write([self.fragment_list()])
                    .relative_write(),
            );
            level_pack(
                ctx,
                &LevelPack::new(&["*.mrq"], &layer_dir)
                    .output(&self.dirs.munge_dir)
                    .input_dirs(self.input_dirs())
                    .common(common.iter().cloned().chain([self.fragment_list()])),
            );
            level_pack(
                ctx,
                &LevelPack::new(&["*.req"], &layer_dir)
                    .output(&self.output_dir)
                    .input_dirs(self.input_dirs())
                    .common(common.iter().cloned()),
            );
        }
    }

    fn pack_sky(&self, ctx: &MungeContext) {
        let settings = ctx.settings;
        let common = self.common_lists();

        for sky_dir in [self.dirs.source(settings, "sky/REQ"), self.dirs.source(settings, "sky")] {
            level_pack(
                ctx,
                &LevelPack::new(&["*.req"], sky_dir)
                    .output(&self.output_dir)
                    .input_dirs(self.input_dirs())
                    .common(common.iter().cloned()),
            );
        }
    }
}

impl Munger for WorldMunger {
    fn name(&self) -> String {
        format!("Worlds/{}", self.world)
    }

    fn run(&self, ctx: &MungeContext) -> Result<(), MungeError> {
        info!("Munge Worlds/{}...", self.world);
        let settings = ctx.settings;

        mkdir(settings, &self.dirs.munge_dir)?;
        copy_premunged_files(settings, &self.dirs);

        self.munge_sources(ctx);

        mkdir(settings, &self.output_dir)?;

        if self.is_common() {
            return Ok(());
        }

        self.pack_world_layers(ctx);
        self.pack_sky(ctx);

        Ok(())
    }
}
