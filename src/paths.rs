use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Rebuilds `path` one segment at a time, picking whichever of the original,
/// upper or lower case spelling exists below `base`. Segments with no match
/// are kept as given. The result stays relative to `base`.
pub fn resolve_case(base: &Path, path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();

    for component in path.components() {
        let part = match component {
            Component::Normal(part) => part.to_string_lossy(),
            other => {
                resolved.push(other.as_os_str());
                continue;
            }
        };

        let candidates = [part.to_string(), part.to_uppercase(), part.to_lowercase()];
        let found = candidates
            .iter()
            .find(|candidate| base.join(&resolved).join(candidate).exists());

        match found {
            Some(candidate) => resolved.push(candidate),
            None => resolved.push(&*part),
        }
    }

    resolved
}

pub fn mkdir_p(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// Deletes everything inside `dir` but keeps `dir` itself. Missing is fine.
pub fn clean_dir_contents(dir: &Path) -> io::Result<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
        removed += 1;
    }

    Ok(removed)
}

/// Removes `dir` and everything below it. Missing is fine.
pub fn remove_dir_if_exists(dir: &Path) -> io::Result<bool> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Recursively copies `src` into `dst`, overwriting existing files.
/// Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<usize> {
    fs::create_dir_all(dst)?;

    let mut copied = 0;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copied += copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Names of the immediate subdirectories of `dir`, sorted. Empty if missing.
pub fn subdirectory_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

/// Files directly inside `dir` whose extension matches one of `extensions`
/// (case-insensitive), sorted by path.
pub fn files_with_extensions(dir: &Path, extensions: &[&str]) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_extension(path, extensions))
        .collect();
    files.sort();
    Ok(files)
}

/// Every file below `dir`, at any depth, sorted by path.
pub fn files_recursive(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Like [`files_with_extensions`] but walks every subdirectory too.
pub fn files_with_extensions_recursive(
    dir: &Path,
    extensions: &[&str],
) -> io::Result<Vec<PathBuf>> {
    let mut files = files_recursive(dir)?;
    files.retain(|path| has_extension(path, extensions));
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// `data_ABC` -> `ABC`. Uses the canonical path so `..` works.
pub fn world_id(data_dir: &Path) -> Option<String> {
    let canonical = fs::canonicalize(data_dir).ok()?;
    let name = canonical.file_name()?.to_str()?.to_uppercase();
    name.rsplit('_').next().map(str::to_string)
}

/// Renders a path the way the compilers expect it on their command line.
pub fn arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
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
            "xmunge_paths_{}_{}_{}",
            label,
            std::process::id(),
            nanos
        ));
        let _ = fs::create_dir_all(&dir);
        dir
    }

    #[test]
    fn resolves_upper_case_segments() {
        let root = temp_dir("upper");
        fs::create_dir_all(root.join("SIDES/COMMON")).unwrap();

        let resolved = resolve_case(&root, Path::new("Sides/common"));
        assert_eq!(resolved, PathBuf::from("SIDES/COMMON"));
    }

    #[test]
    fn prefers_original_then_upper_then_lower() {
        let root = temp_dir("order");
        fs::create_dir_all(root.join("Worlds/abc/world1")).unwrap();

        let resolved = resolve_case(&root, Path::new("Worlds/ABC/World1"));
        assert_eq!(resolved, PathBuf::from("Worlds/abc/world1"));

        let resolved = resolve_case(&root, Path::new("Worlds/ABC"));
        assert_eq!(resolved, PathBuf::from("Worlds/abc"));
    }

    #[test]
    fn unresolved_path_is_unchanged() {
        let root = temp_dir("missing");
        let resolved = resolve_case(&root, Path::new("Sides/Rep/MUNGED/PC"));
        assert_eq!(resolved, PathBuf::from("Sides/Rep/MUNGED/PC"));
    }

    #[test]
    fn parent_segments_pass_through() {
        let root = temp_dir("parent");
        fs::create_dir_all(root.join("build")).unwrap();
        fs::create_dir_all(root.join("COMMON")).unwrap();

        let resolved = resolve_case(&root.join("build"), Path::new("../Common"));
        assert_eq!(resolved, PathBuf::from("../COMMON"));
    }

    #[test]
    fn clean_keeps_directory() {
        let root = temp_dir("clean");
        let munged = root.join("Common/MUNGED/PC");
        fs::create_dir_all(munged.join("nested")).unwrap();
        fs::write(munged.join("core.files"), "x").unwrap();
        fs::write(munged.join("nested/a.odf"), "x").unwrap();

        let removed = clean_dir_contents(&munged).unwrap();
        assert_eq!(removed, 2);
        assert!(munged.is_dir());
        assert_eq!(fs::read_dir(&munged).unwrap().count(), 0);
        assert!(root.join("Common").is_dir());
    }

    #[test]
    fn clean_missing_directory_is_noop() {
        let root = temp_dir("clean_missing");
        assert_eq!(clean_dir_contents(&root.join("nope/MUNGED")).unwrap(), 0);
        assert!(!remove_dir_if_exists(&root.join("nope")).unwrap());
    }

    #[test]
    fn copy_tree_copies_nested_files() {
        let root = temp_dir("copy");
        fs::create_dir_all(root.join("src/SIDE")).unwrap();
        fs::write(root.join("src/core.lvl"), "core").unwrap();
        fs::write(root.join("src/SIDE/rep.lvl"), "rep").unwrap();

        let copied = copy_tree(&root.join("src"), &root.join("dst/out")).unwrap();
        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(root.join("dst/out/SIDE/rep.lvl")).unwrap(), "rep");
    }

    #[test]
    fn world_id_uses_last_underscore_part() {
        let root = temp_dir("worldid");
        let data = root.join("data_abc");
        fs::create_dir_all(data.join("_BUILD")).unwrap();
        assert_eq!(world_id(&data.join("_BUILD/..")), Some("ABC".to_string()));
    }

    #[test]
    fn recursive_walk_finds_nested_files_in_order() {
        let root = temp_dir("walk");
        fs::create_dir_all(root.join("world1/sub")).unwrap();
        fs::write(root.join("world1/sub/b.wld"), "").unwrap();
        fs::write(root.join("world1/a.WLD"), "").unwrap();
        fs::write(root.join("c.req"), "").unwrap();

        let all = files_recursive(&root).unwrap();
        assert_eq!(
            all,
            vec![
                root.join("c.req"),
                root.join("world1/a.WLD"),
                root.join("world1/sub/b.wld")
            ]
        );
        let worlds = files_with_extensions_recursive(&root, &["wld"]).unwrap();
        assert_eq!(worlds.len(), 2);
    }

    #[test]
    fn extension_filter_is_case_insensitive() {
        let root = temp_dir("ext");
        fs::write(root.join("a.TGA"), "").unwrap();
        fs::write(root.join("b.pic"), "").unwrap();
        fs::write(root.join("c.msh"), "").unwrap();
        let files = files_with_extensions(&root, &["tga", "pic"]).unwrap();
        assert_eq!(files.len(), 2);
    }
}
