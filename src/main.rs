use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use treesync::archive::{self, ArchiveKind};
use treesync::{delta, extract, manifest, snapshot, Blake3Hasher};

#[derive(Parser)]
#[command(name = "treesync", about = "Directory tree synchronization via content-addressed manifests and sparse deltas")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a manifest (names and digests, no content) of a directory
    Manifest {
        /// Directory to walk
        #[arg(long)]
        root: PathBuf,
        /// Output path for the manifest archive
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Build a full snapshot (names, digests, and content) of a directory
    Snapshot {
        /// Directory to walk
        #[arg(long)]
        root: PathBuf,
        /// Output path for the snapshot archive
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Check that every file a manifest references still exists as a regular file
    Validate {
        /// Path to the manifest archive
        #[arg(long, short)]
        manifest: PathBuf,
    },
    /// Build a full snapshot by reading exactly the files a manifest references
    Materialize {
        /// Path to the manifest archive
        #[arg(long, short)]
        manifest: PathBuf,
        /// Output path for the snapshot archive
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Diff a manifest against a live directory into a sparse delta snapshot
    Delta {
        /// Path to the manifest archive
        #[arg(long, short)]
        manifest: PathBuf,
        /// Live directory to compare against
        #[arg(long)]
        root: PathBuf,
        /// Output path for the delta archive
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Merge a snapshot onto a target directory, writing only absent or changed files
    Extract {
        /// Path to the snapshot archive
        #[arg(long, short)]
        snapshot: PathBuf,
        /// Directory to merge onto
        #[arg(long)]
        target: PathBuf,
    },
    /// Print the tree an archive contains
    Show {
        /// Path to a manifest or snapshot archive
        #[arg(long, short)]
        archive: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> anyhow::Result<ExitCode> {
    let hasher = Blake3Hasher;

    match command {
        Commands::Manifest { root, output } => {
            let start = Instant::now();
            let tree = manifest::build_manifest(&root, &hasher)?;
            archive::save_manifest(&tree, &output)?;

            println!("Manifest written to {}", output.display());
            println!("  Files: {}", tree.file_count());
            println!("  Time elapsed: {:.3}s", start.elapsed().as_secs_f64());
        }
        Commands::Snapshot { root, output } => {
            let start = Instant::now();
            let tree = snapshot::build_snapshot(&root, &hasher)?;
            archive::save_snapshot(&tree, &output)?;

            println!("Snapshot written to {}", output.display());
            println!("  Files: {}", tree.file_count());
            println!("  Content bytes: {}", tree.total_bytes());
            println!("  Time elapsed: {:.3}s", start.elapsed().as_secs_f64());
        }
        Commands::Validate { manifest: path } => {
            let tree = archive::load_manifest(&path)?;
            match manifest::validate_manifest(&tree) {
                Ok(()) => println!("OK: {} files present", tree.file_count()),
                Err(err) => {
                    eprintln!("Validation failed: {err}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Materialize { manifest: path, output } => {
            let start = Instant::now();
            let tree = archive::load_manifest(&path)?;
            let snap = snapshot::materialize(&tree)?;
            archive::save_snapshot(&snap, &output)?;

            println!("Snapshot written to {}", output.display());
            println!("  Files: {}", snap.file_count());
            println!("  Content bytes: {}", snap.total_bytes());
            println!("  Time elapsed: {:.3}s", start.elapsed().as_secs_f64());
        }
        Commands::Delta { manifest: path, root, output } => {
            let start = Instant::now();
            let tree = archive::load_manifest(&path)?;
            let delta = delta::build_delta(&tree, &root, &hasher)?;
            archive::save_snapshot(&delta, &output)?;

            println!("Delta written to {}", output.display());
            println!("  Files added or changed: {}", delta.file_count());
            println!("  Content bytes: {}", delta.total_bytes());
            println!("  Time elapsed: {:.3}s", start.elapsed().as_secs_f64());
        }
        Commands::Extract { snapshot: path, target } => {
            let start = Instant::now();
            let snap = archive::load_snapshot(&path)?;
            let summary = extract::extract_snapshot(&snap, &target, &hasher)?;

            println!("Extracted onto {}", target.display());
            println!("  Directories created: {}", summary.dirs_created);
            println!("  Files written: {}", summary.files_written);
            println!("  Files skipped (unchanged): {}", summary.files_skipped);
            println!("  Time elapsed: {:.3}s", start.elapsed().as_secs_f64());
        }
        Commands::Show { archive: path } => {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("Failed to read archive: {}", path.display()))?;
            match archive::peek_kind(&bytes)? {
                ArchiveKind::Manifest => print!("{}", archive::deserialize_manifest(&bytes)?),
                ArchiveKind::Snapshot => print!("{}", archive::deserialize_snapshot(&bytes)?),
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
