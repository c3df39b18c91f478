use std::path::{Path, PathBuf};

use clap::Parser;
use log::*;

use wgsl_reflect::*;

#[derive(Parser)]
#[command(name = "wgsl-reflect")]
#[command(
    about = "Reflects structures, entry points and bind groups of a WGSL shader",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// The .wgsl file to process
    file: PathBuf,
    /// Print the syntax tree instead of the reflection
    #[arg(long)]
    ast: bool,
    /// Print the reflection as single-line json
    #[arg(long)]
    compact: bool,
    /// Print again whenever the file changes
    #[arg(short, long)]
    watch: bool,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();

    if !cli.watch {
        return print_reflection(&cli);
    }

    if let Err(error) = print_reflection(&cli) {
        error!("{error:#}");
    }

    // editors often replace the file, so watch its directory instead
    let watch_dir = cli
        .file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut changes = watcher::watch(watch_dir)?;

    loop {
        let events = changes.wait()?;
        let touched = events
            .iter()
            .flat_map(|event| &event.paths)
            .any(|path| path.file_name() == cli.file.file_name());
        if !touched {
            continue;
        }

        debug!("{} changed", cli.file.display());
        if let Err(error) = print_reflection(&cli) {
            error!("{error:#}");
        }
    }
}

fn print_reflection(cli: &Cli) -> anyhow::Result<()> {
    if cli.ast {
        let source = util::read_source(&cli.file)?;
        let tree = SyntaxTree::parse(source)?;
        println!("{}", tree.ast(tree.root(), 2));
        return Ok(());
    }

    let reflect = Reflect::from_path(&cli.file)?;
    let reflection_json = ReflectionJson::from_reflect(&reflect);
    let reflection_json = if cli.compact {
        serde_json::to_string(&reflection_json)?
    } else {
        serde_json::to_string_pretty(&reflection_json)?
    };

    println!("{}", cli.file.display());
    println!("{reflection_json}");

    Ok(())
}
