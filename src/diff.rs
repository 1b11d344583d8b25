use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::paths;

/// Differences between two level output trees, paths relative to the roots.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TreeDiff {
    pub left_only: Vec<PathBuf>,
    pub right_only: Vec<PathBuf>,
    pub differing: Vec<FileDiff>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum FileDiff {
    /// Sizes differ or bytes differ in a binary file.
    Binary(PathBuf),
    /// Text files, with the first line (1-based) that differs.
    Text { path: PathBuf, line: usize },
}

impl TreeDiff {
    pub fn is_empty(&self) -> bool {
        self.left_only.is_empty() && self.right_only.is_empty() && self.differing.is_empty()
    }
}

fn relative_files(root: &Path) -> io::Result<BTreeSet<PathBuf>> {
    Ok(paths::files_recursive(root)?
        .into_iter()
        .filter_map(|path| path.strip_prefix(root).ok().map(Path::to_path_buf))
        .collect())
}

fn compare_file(left: &Path, right: &Path, rel: &Path) -> io::Result<Option<FileDiff>> {
    let a = fs::read(left)?;
    let b = fs::read(right)?;
    if a == b {
        return Ok(None);
    }

    match (std::str::from_utf8(&a), std::str::from_utf8(&b)) {
        (Ok(a), Ok(b)) => {
            let mut a_lines = a.lines();
            let mut b_lines = b.lines();
            let mut line = 1;
            loop {
                match (a_lines.next(), b_lines.next()) {
                    (Some(x), Some(y)) if x == y => line += 1,
                    (None, None) => break,
                    _ => break,
                }
            }
            Ok(Some(FileDiff::Text {
                path: rel.to_path_buf(),
                line,
            }))
        }
        _ => Ok(Some(FileDiff::Binary(rel.to_path_buf()))),
    }
}

/// Walks both trees and reports what differs.
pub fn diff_trees(left: &Path, right: &Path) -> io::Result<TreeDiff> {
    let left_files = relative_files(left)?;
    let right_files = relative_files(right)?;

    let mut diff = TreeDiff {
        left_only: left_files.difference(&right_files).cloned().collect(),
        right_only: right_files.difference(&left_files).cloned().collect(),
        differing: Vec::new(),
    };

    for rel in left_files.intersection(&right_files) {
        if let Some(file_diff) = compare_file(&left.join(rel), &right.join(rel), rel)? {
            diff.differing.push(file_diff);
        }
    }

    Ok(diff)
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
            "xmunge_diff_{}_{}_{}",
            label,
            std::process::id(),
            nanos
        ));
        let _ = fs::create_dir_all(&dir);
        dir
    }

    #[test]
    fn reports_one_sided_and_changed_files() {
        let root = temp_dir("trees");
        let a = root.join("a");
        let b = root.join("b");
        fs::create_dir_all(a.join("SIDE")).unwrap();
        fs::create_dir_all(b.join("SIDE")).unwrap();

        fs::write(a.join("core.lvl"), [0u8, 1, 2, 0xff]).unwrap();
        fs::write(b.join("core.lvl"), [0u8, 1, 3, 0xff]).unwrap();
        fs::write(a.join("SIDE/rep.lvl"), "same").unwrap();
        fs::write(b.join("SIDE/rep.lvl"), "same").unwrap();
        fs::write(a.join("mission.files"), "core\ningame\n").unwrap();
        fs::write(b.join("mission.files"), "core\nshell\n").unwrap();
        fs::write(a.join("SIDE/cis.lvl"), "cis").unwrap();
        fs::write(b.join("shell.lvl"), "shell").unwrap();

        let diff = diff_trees(&a, &b).unwrap();
        assert_eq!(diff.left_only, vec![PathBuf::from("SIDE/cis.lvl")]);
        assert_eq!(diff.right_only, vec![PathBuf::from("shell.lvl")]);
        assert_eq!(
            diff.differing,
            vec![
                FileDiff::Binary(PathBuf::from("core.lvl")),
                FileDiff::Text {
                    path: PathBuf::from("mission.files"),
                    line: 2
                },
            ]
        );
    }

    #[test]
    fn identical_trees_have_no_diff() {
        let root = temp_dir("same");
        for side in ["a", "b"] {
            fs::create_dir_all(root.join(side)).unwrap();
            fs::write(root.join(side).join("core.lvl"), "core").unwrap();
        }
        assert!(diff_trees(&root.join("a"), &root.join("b")).unwrap().is_empty());
    }
}
