use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "raoc",
    version = "0.1.0",
    about = "De novo genome assembly for long reads using the OLC approach"
)]
pub struct Cli {
    /// Settings file in `key: value` form; overrides built-in defaults.
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv); overridden by RUST_LOG if set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Worker thread count; defaults to available parallelism.
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute overlaps between reads in a FASTA/FASTQ file.
    Overlap(OverlapArgs),

    /// Filter a precomputed overlap set: containment + transitive reduction.
    Filter(FilterArgs),

    /// Full genome assembly pipeline: filter -> graph -> simplify -> extract.
    Assemble(AssembleArgs),

    /// Inspect or migrate a Depot store.
    Depot(DepotArgs),
}

#[derive(Args)]
pub struct OverlapArgs {
    /// Input reads (FASTA or FASTQ, detected by extension).
    #[arg(short = 'r', long)]
    pub reads: String,

    /// Output overlaps, AFG form.
    #[arg(short = 'o', long, default_value = "overlaps.afg")]
    pub output: String,
}

impl From<&OverlapArgs> for crate::configs::OverlapConfig {
    fn from(args: &OverlapArgs) -> Self {
        Self { reads: args.reads.clone(), output: args.output.clone() }
    }
}

#[derive(Args)]
pub struct FilterArgs {
    /// Input reads, used for read lengths during containment checks.
    #[arg(short = 'r', long)]
    pub reads: String,

    /// Input overlaps (AFG or MHAP, detected by extension).
    #[arg(long)]
    pub overlaps: String,

    /// Output path for the filtered overlaps (AFG form).
    #[arg(short = 'o', long, default_value = "filtered.afg")]
    pub output: String,
}

impl From<&FilterArgs> for crate::configs::FilterConfig {
    fn from(args: &FilterArgs) -> Self {
        Self { reads: args.reads.clone(), overlaps: args.overlaps.clone(), output: args.output.clone() }
    }
}

#[derive(Args)]
pub struct AssembleArgs {
    /// Input reads in FASTA or FASTQ format.
    #[arg(short = 'r', long)]
    pub reads: String,

    /// Precomputed overlaps (AFG or MHAP); if omitted, overlaps are computed.
    #[arg(long)]
    pub overlaps: Option<String>,

    /// Output prefix for contig/unitig files.
    #[arg(short = 'p', long, default_value = "assembly")]
    pub output_prefix: String,

    /// Output directory.
    #[arg(short = 'o', long, default_value = ".")]
    pub output_dir: String,

    /// Also write a DOT dump of the simplified overlap graph.
    #[arg(long)]
    pub write_dot: bool,
}

impl From<&AssembleArgs> for crate::configs::AssembleConfig {
    fn from(args: &AssembleArgs) -> Self {
        Self {
            reads: args.reads.clone(),
            overlaps: args.overlaps.clone(),
            output_prefix: args.output_prefix.clone(),
            output_dir: args.output_dir.clone(),
            write_dot: args.write_dot,
        }
    }
}

#[derive(Args)]
pub struct DepotArgs {
    /// Path to the depot's data file (its index file sits alongside it).
    pub data_path: String,

    /// What to show: "reads" or "overlaps".
    #[arg(long, default_value = "reads")]
    pub kind: String,
}
