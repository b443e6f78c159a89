// Fragment combiner: `insight-combine <inDir> <outDir>`.

use anyhow::Result;
use clap::Parser;
use insight_sync::combine::combine_files;
use insight_sync::{init_logging, parse_args};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "insight-combine")]
#[command(about = "Merge per-record JSON files into sections.json, students.json and teachers.json")]
struct Cli {
    /// directory holding the per-record JSON files
    in_dir: PathBuf,
    /// directory the combined files are written to
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    init_logging();
    let cli: Cli = parse_args();
    for path in combine_files(&cli.in_dir, &cli.out_dir)? {
        println!("wrote {}", path.display());
    }
    Ok(())
}
