mod selectors;
mod sources;

use clap::{ArgAction, Parser};
use ficum::{load_tree, render, Node};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, warn, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ficum",
    about = "Print FICUM expression trees as canonical query strings"
)]
struct Cli {
    #[arg(long, env = "FICUM_DIR", help = "Render every .yaml/.yml tree under this directory")]
    dir: Option<PathBuf>,

    #[arg(long, help = "Read tree file paths from stdin")]
    stdin: bool,

    #[arg(long, help = "List selectors used by the trees instead of rendering them")]
    selectors: bool,

    #[arg(long, help = "Show count for each selector (use with --selectors)")]
    count: bool,

    #[arg(short, long, action = ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,

    #[arg(help = "YAML tree files to render")]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.files.is_empty() && cli.dir.is_none() && !cli.stdin {
        eprintln!("Error: No trees specified. Pass files, --dir, --stdin or set FICUM_DIR");
        return ExitCode::from(2);
    }

    let mut paths = cli.files;
    if let Some(dir) = &cli.dir {
        let found = sources::collect_tree_files(dir);
        if found.is_empty() {
            warn!(dir = %dir.display(), "no tree files found");
        }
        paths.extend(found);
    }
    if cli.stdin {
        paths.extend(sources::read_paths_from_stdin());
    }

    let mut trees = Vec::with_capacity(paths.len());
    for path in paths {
        match load_tree(&path) {
            Ok(tree) => trees.push((path, tree)),
            Err(e) => {
                eprintln!("Tree error in {}: {}", path.display(), e);
                return ExitCode::from(2);
            }
        }
    }
    debug!(count = trees.len(), "loaded trees");

    if trees.is_empty() {
        return ExitCode::from(1);
    }

    if cli.selectors {
        return run_selectors_mode(&trees, cli.count);
    }

    run_render_mode(&trees)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string())),
        )
        .init();
}

fn run_selectors_mode(trees: &[(PathBuf, Node)], show_count: bool) -> ExitCode {
    let counts = selectors::collect_selectors(trees.iter().map(|(_, tree)| tree));

    if counts.is_empty() {
        return ExitCode::from(1);
    }

    for line in selectors::format_selectors(counts, show_count) {
        println!("{}", line);
    }

    ExitCode::from(0)
}

fn run_render_mode(trees: &[(PathBuf, Node)]) -> ExitCode {
    let prefix_paths = trees.len() > 1;

    for (path, tree) in trees {
        let query = render(tree);
        if prefix_paths {
            println!("{}\t{}", path.display(), query);
        } else {
            println!("{}", query);
        }
    }

    ExitCode::from(0)
}
