use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info};

use super::{CategoryDirs, MungeError, Munger, mkdir};
use crate::paths;
use crate::settings::Settings;
use crate::tools::{Category, LevelPack, MungeContext, MungeOptions, level_pack, munge};

const TEXTURE_EXTENSIONS: &[&str] = &["tga", "pic"];

/// Renders a request file with a single `REQN` section.
pub fn request_file<S: AsRef<str>>(kind: &str, names: &[S]) -> String {
    let mut content = String::from("ucft\n{\n\tREQN\n\t{\n");
    content.push_str(&format!("\t\t\"{}\"\n", kind));
    for name in names {
        content.push_str(&format!("\t\t\"{}\"\n", name.as_ref()));
    }
    content.push_str("\t}\n}\n");
    content
}

fn texture_names(files: &[PathBuf]) -> Vec<String> {
    let names: BTreeSet<String> = files
        .iter()
        .filter_map(|f| f.file_stem().and_then(|s| s.to_str()))
        .map(|s| s.to_lowercase())
        .collect();
    names.into_iter().collect()
}

/// Load screen backdrops. Each texture becomes its own level, and each
/// backdrop folder a level referencing those.
pub struct LoadMunger {
    dirs: CategoryDirs,
    output_dir: PathBuf,
}

impl LoadMunger {
    pub fn new(settings: &Settings) -> Self {
        LoadMunger {
            dirs: CategoryDirs::new(settings, Path::new("Load")),
            output_dir: settings.output_path().join("Load"),
        }
    }

    fn scratch_dir(&self) -> PathBuf {
        self.dirs.munge_dir.join("req")
    }

    /// Writes one `texture` request per texture. Returns how many were written.
    pub fn write_texture_requests(&self, settings: &Settings) -> Result<usize, MungeError> {
        let source = settings.fs_path(&self.dirs.source_dir);
        let scratch = self.scratch_dir();
        let scratch_fs = settings.fs_path(&scratch);

        let files = paths::files_with_extensions_recursive(&source, TEXTURE_EXTENSIONS)
            .map_err(MungeError::io("read", &self.dirs.source_dir))?;

        let names = texture_names(&files);
        for name in &names {
            let target = scratch_fs.join(format!("{}.req", name));
            fs::write(&target, request_file("texture", &[name]))
                .map_err(MungeError::io("write", &target))?;
        }
        Ok(names.len())
    }

    /// Writes one `lvl` request per backdrop folder listing its textures.
    pub fn write_backdrop_requests(&self, settings: &Settings) -> Result<usize, MungeError> {
        let source = settings.fs_path(&self.dirs.source_dir);
        let scratch_fs = settings.fs_path(&self.scratch_dir());

        let mut written = 0;
        for folder in paths::subdirectory_names(&source) {
            if folder.eq_ignore_ascii_case("munged") {
                continue;
            }
            let folder_dir = source.join(&folder);
            let files = paths::files_with_extensions_recursive(&folder_dir, TEXTURE_EXTENSIONS)
                .map_err(MungeError::io("read", &folder_dir))?;
            let names = texture_names(&files);
            if names.is_empty() {
                continue;
            }

            let target = scratch_fs.join(format!("{}.req", folder.to_lowercase()));
            fs::write(&target, request_file("lvl", &names))
                .map_err(MungeError::io("write", &target))?;
            written += 1;
        }
        Ok(written)
    }

    fn clear_requests(&self, settings: &Settings) -> Result<(), MungeError> {
        let scratch = self.scratch_dir();
        let files = paths::files_with_extensions(&settings.fs_path(&scratch), &["req"])
            .map_err(MungeError::io("read", &scratch))?;
        for file in files {
            fs::remove_file(&file).map_err(MungeError::io("delete", &file))?;
        }
        Ok(())
    }

    fn pack_requests(&self, ctx: &MungeContext, output: &Path) {
        level_pack(
            ctx,
            &LevelPack::new(&["*.req"], self.scratch_dir())
                .output(output)
                .input_dir(&self.dirs.munge_dir),
        );
    }
}

impl Munger for LoadMunger {
    fn name(&self) -> String {
        "Load".to_string()
    }

    fn run(&self, ctx: &MungeContext) -> Result<(), MungeError> {
        info!("Munge Load...");
        let settings = ctx.settings;
        let src = &self.dirs.source_dir;
        let out = &self.dirs.munge_dir;
        let plain = MungeOptions::default();

        mkdir(settings, out)?;
        mkdir(settings, &self.output_dir)?;

        munge(ctx, Category::Config, &["$*.cfg"], src, out, plain);
        munge(ctx, Category::Texture, &["$*.tga", "$*.pic"], src, out, plain);
        munge(ctx, Category::Model, &["$*.msh"], src, out, plain);

        mkdir(settings, &self.scratch_dir())?;

        match self.write_texture_requests(settings) {
            Ok(count) => {
                info!("Packing {} load screen textures", count);
                self.pack_requests(ctx, out);
            }
            Err(e) => error!("Skipping load texture levels: {}", e),
        }

        if let Err(e) = self.clear_requests(settings) {
            error!("{}", e);
        }

        match self.write_backdrop_requests(settings) {
            Ok(count) => {
                info!("Packing {} load screens", count);
                self.pack_requests(ctx, &self.output_dir);
            }
            Err(e) => error!("Skipping load screen levels: {}", e),
        }

        if let Err(e) = paths::remove_dir_if_exists(&settings.fs_path(&self.scratch_dir())) {
            error!("Failed to remove {}: {}", self.scratch_dir().display(), e);
        }

        Ok(())
    }
}
