mod cli;
mod configs;

use std::collections::HashMap;
use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use raoc::config::Config;
use raoc::extractor;
use raoc::io::{afg, depot::Depot, dot, fasta, fastq, mhap};
use raoc::overlap_engine;
use raoc::overlap_filter;
use raoc::string_graph::StringGraph;
use raoc::Read;

fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_reads(path: &str) -> Result<Vec<Read>, Box<dyn std::error::Error>> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    if path.ends_with(".fa") || path.ends_with(".fasta") {
        Ok(fasta::read_fasta(reader)?)
    } else if path.ends_with(".fq") || path.ends_with(".fastq") {
        Ok(fastq::read_fastq(reader)?)
    } else {
        Ok(afg::read_reads(reader)?)
    }
}

fn load_overlaps(path: &str, reads: &[Read]) -> Result<Vec<raoc::overlap::Overlap>, Box<dyn std::error::Error>> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    if path.ends_with(".mhap") || path.ends_with(".tsv") {
        let sequences: HashMap<u32, &str> = reads.iter().map(|r| (r.id(), r.sequence())).collect();
        Ok(mhap::read_overlaps(reader, &sequences)?)
    } else {
        let lens: HashMap<u32, u32> = reads.iter().map(|r| (r.id(), r.len() as u32)).collect();
        Ok(afg::read_overlaps(reader, &lens)?)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(n) = cli.threads {
        rayon::ThreadPoolBuilder::new().num_threads(n).build_global().ok();
    }

    let run_config = match &cli.settings {
        Some(path) => Config::from_settings_file(path)?,
        None => Config::default(),
    };

    match &cli.command {
        Commands::Overlap(args) => {
            let config: crate::configs::OverlapConfig = args.into();
            let reads = load_reads(&config.reads)?;
            println!("Loaded {} reads from {}", reads.len(), config.reads);

            let overlaps = overlap_engine::compute_overlaps(&reads, &run_config);
            println!("Computed {} overlaps", overlaps.len());

            let mut writer = std::io::BufWriter::new(std::fs::File::create(&config.output)?);
            afg::write_overlaps(&mut writer, &overlaps)?;
            println!("Wrote overlaps to {}", config.output);
        }

        Commands::Filter(args) => {
            let config: crate::configs::FilterConfig = args.into();
            let reads = load_reads(&config.reads)?;
            let overlaps = load_overlaps(&config.overlaps, &reads)?;
            println!("Loaded {} overlaps", overlaps.len());

            let lens = read_lens(&reads);
            let (kept, contained) = overlap_filter::remove_contained(&overlaps, &lens);
            println!("Containment filter: removed {} reads", contained.len());

            let kept = overlap_filter::reduce_transitive(&kept, &lens);
            println!("Transitive reduction: {} overlaps remain", kept.len());

            let mut writer = std::io::BufWriter::new(std::fs::File::create(&config.output)?);
            afg::write_overlaps(&mut writer, &kept)?;
            println!("Wrote filtered overlaps to {}", config.output);
        }

        Commands::Assemble(args) => {
            let config: crate::configs::AssembleConfig = args.into();
            let out_dir = Path::new(&config.output_dir);
            std::fs::create_dir_all(out_dir)?;

            let reads = load_reads(&config.reads)?;
            println!("Loaded {} reads from {}", reads.len(), config.reads);
            let lens = read_lens(&reads);

            let raw_overlaps = match &config.overlaps {
                Some(path) => {
                    println!("Using provided overlaps from {path}");
                    load_overlaps(path, &reads)?
                }
                None => {
                    println!("\n=== COMPUTING OVERLAPS ===");
                    overlap_engine::compute_overlaps(&reads, &run_config)
                }
            };
            println!("{} candidate overlaps", raw_overlaps.len());

            println!("\n=== FILTERING OVERLAPS ===");
            let (contained_filtered, contained) = overlap_filter::remove_contained(&raw_overlaps, &lens);
            println!("Removed {} contained reads", contained.len());
            let filtered = overlap_filter::reduce_transitive(&contained_filtered, &lens);
            println!("{} overlaps survive transitive reduction", filtered.len());

            println!("\n=== BUILDING STRING GRAPH ===");
            let mut graph = StringGraph::build(&lens, &filtered);
            println!("Graph has {} vertices, {} edges", graph.num_vertices(), graph.num_edges());

            println!("\n=== SIMPLIFYING GRAPH ===");
            let sequences: Vec<&str> = reads.iter().map(|r| r.sequence()).collect();
            raoc::simplifier::simplify(&mut graph, &run_config, &sequences);
            println!(
                "Simplified graph has {} vertices, {} edges",
                graph.num_vertices(),
                graph.num_edges()
            );

            if args.write_dot {
                println!("\n=== WRITING DOT GRAPH ===");
                let dot_path = out_dir.join(format!("{}.dot", config.output_prefix));
                let mut writer = std::io::BufWriter::new(std::fs::File::create(&dot_path)?);
                dot::write_overlap_graph(&mut writer, &filtered)?;
                println!("Wrote graph visualization to {}", dot_path.display());
            }

            println!("\n=== EXTRACTING CONTIGS ===");
            let walks = extractor::extract_longest_walks(&graph, &run_config);
            println!("Extracted {} contigs", walks.len());

            let contig_seqs: Vec<(usize, String)> =
                walks.iter().enumerate().map(|(i, w)| (i, w.sequence(&graph, &sequences))).collect();

            let fasta_path = out_dir.join(format!("{}.fa", config.output_prefix));
            let mut writer = std::io::BufWriter::new(std::fs::File::create(&fasta_path)?);
            fasta::write_contigs(&mut writer, &contig_seqs)?;
            println!("Wrote contigs to {}", fasta_path.display());

            println!("\n=== ASSEMBLY COMPLETE ===");
        }

        Commands::Depot(args) => {
            let data_path = Path::new(&args.data_path);
            let index_path = data_path.with_extension("idx");
            let depot = Depot::open(data_path, index_path)?;
            match args.kind.as_str() {
                "overlaps" => {
                    let overlaps = depot.load_overlaps()?;
                    println!("Depot holds {} overlaps", overlaps.len());
                }
                _ => {
                    let reads = depot.load_reads()?;
                    println!("Depot holds {} reads", reads.len());
                }
            }
        }
    }

    Ok(())
}

fn read_lens(reads: &[Read]) -> Vec<u32> {
    reads.iter().map(|r| r.len() as u32).collect()
}
