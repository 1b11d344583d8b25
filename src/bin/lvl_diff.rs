use std::path::PathBuf;

use clap::Parser;

use xmunge::diff::{FileDiff, diff_trees};

/// Compares two level output trees, e.g. a reference `_LVL_PC` against a
/// fresh build.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Reference tree
    left: PathBuf,
    /// Tree to check
    right: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let diff = diff_trees(&cli.left, &cli.right)?;
    if diff.is_empty() {
        println!("Trees match");
        return Ok(());
    }

    for path in &diff.left_only {
        println!("Only in {}: {}", cli.left.display(), path.display());
    }
    for path in &diff.right_only {
        println!("Only in {}: {}", cli.right.display(), path.display());
    }
    for file in &diff.differing {
        match file {
            FileDiff::Binary(path) => println!("Binary files differ: {}", path.display()),
            FileDiff::Text { path, line } => {
                println!("Text files differ: {} (first at line {})", path.display(), line)
            }
        }
    }

    std::process::exit(1);
}
