use ignore::WalkBuilder;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use tracing::warn;

pub fn collect_tree_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let walker = WalkBuilder::new(dir)
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(false)
        .add_custom_ignore_filename(".ficumignore")
        .build();

    for entry in walker.flatten() {
        let path = entry.path();
        if path.is_file() && is_tree_file(path) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    files
}

fn is_tree_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext == "yaml" || ext == "yml")
}

pub fn read_paths_from_stdin() -> Vec<PathBuf> {
    read_paths(io::stdin().lock())
}

fn read_paths(reader: impl BufRead) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        match line {
            Ok(line) if !line.trim().is_empty() => paths.push(PathBuf::from(line.trim())),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!(line = index + 1, "skipping path that is not valid UTF-8");
            }
            Err(e) => {
                warn!(line = index + 1, error = %e, "stopped reading paths");
                break;
            }
        }
    }

    paths
}
