use std::path::{Path, PathBuf};

use log::{error, info};

use super::{CategoryDirs, MungeError, Munger, mkdir};
use crate::paths;
use crate::settings::{Platform, Settings};
use crate::tools::{
    Category, LevelPack, MungeContext, MungeOptions, level_pack, movie_munge, munge,
};

/// Front end data: menus, fonts and the `shell.lvl` archive.
pub struct ShellMunger {
    dirs: CategoryDirs,
    common_munge_dir: PathBuf,
    output_dir: PathBuf,
    movies: bool,
}

impl ShellMunger {
    pub fn new(settings: &Settings, movies: bool) -> Self {
        ShellMunger {
            dirs: CategoryDirs::new(settings, Path::new("Shell")),
            common_munge_dir: settings.category_munge_path(Path::new("Common")),
            output_dir: settings.output_path(),
            movies,
        }
    }

    /// One `.mvs` per movie list in `Movies/<PLATFORM>`.
    fn munge_movies(&self, ctx: &MungeContext) {
        let settings = ctx.settings;
        let movie_dir = self
            .dirs
            .source(settings, "Movies")
            .join(settings.platform.as_str());
        let movie_dir = settings.resolve(&movie_dir);

        let lists = match paths::files_with_extensions(&settings.fs_path(&movie_dir), &["mlst"]) {
            Ok(lists) => lists,
            Err(e) => {
                error!(
                    "No movie lists for {} in {}: {}",
                    settings.platform,
                    movie_dir.display(),
                    e
                );
                return;
            }
        };

        let movie_output = self.output_dir.join("MOVIES");
        if let Err(e) = mkdir(settings, &movie_output) {
            error!("Skipping movies: {}", e);
            return;
        }

        for list in lists {
            let Some(name) = list.file_name() else {
                continue;
            };
            movie_munge(ctx, &movie_dir.join(name), &movie_output);
        }
    }
}

impl Munger for ShellMunger {
    fn name(&self) -> String {
        "Shell".to_string()
    }

    fn run(&self, ctx: &MungeContext) -> Result<(), MungeError> {
        info!("Munge Shell...");
        let settings = ctx.settings;
        let src = &self.dirs.source_dir;
        let out = &self.dirs.munge_dir;
        let plain = MungeOptions::default();

        mkdir(settings, &self.output_dir)?;
        mkdir(settings, out)?;

        if self.movies {
            self.munge_movies(ctx);
        }

        munge(ctx, Category::Config, &["$*.fx"], src, out, plain);
        munge(ctx, Category::Script, &["$*.lua"], src, out, plain);
        munge(ctx, Category::Texture, &["$*.tga", "$*.pic"], src, out, plain);
        munge(ctx, Category::Font, &["$*.fff"], src, out, plain);
        munge(ctx, Category::Model, &["$*.msh"], src, out, plain);
        if settings.platform == Platform::Ps2 {
            munge(ctx, Category::Bin, &["$*.bin"], src, out, plain);
        }

        let mut requests = vec!["shell.req"];
        if settings.platform == Platform::Ps2 {
            requests.push("shellps2.req");
        }

        let common_list = |name: &str| format!("{}/{}", paths::arg(&self.common_munge_dir), name);
        for request in requests {
            level_pack(
                ctx,
                &LevelPack::new(&[request], src)
                    .output(&self.output_dir)
                    .input_dir(out)
                    .common([common_list("core"), common_list("common")])
                    .write(["shell"]),
            );
        }

        Ok(())
    }
}
