//! Offline scene build utility
//!
//! Builds the terrain mesh plus forest and rock instance buffers from a
//! settings file (or defaults) and writes flat GPU-ready blobs with a
//! JSON stats sidecar.
//!
//! Usage:
//!     build_scene [OPTIONS] <OUTPUT_DIR>
//!
//! Options:
//!     -c, --config <FILE>     Settings JSON file (defaults when omitted)
//!     --seed <SEED>           Override the terrain seed
//!     --resolution <N>        Override the terrain grid resolution
//!     -h, --help              Show this help message

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use wildscape::core::{Error, Result};
use wildscape::generation::{GenerationPipeline, SceneSettings};
use wildscape::mesh::as_upload_bytes;

fn print_help() {
    eprintln!("build_scene - offline scene build utility");
    eprintln!();
    eprintln!("Usage: build_scene [OPTIONS] <OUTPUT_DIR>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    -c, --config <FILE>     Settings JSON file (defaults when omitted)");
    eprintln!("    --seed <SEED>           Override the terrain seed");
    eprintln!("    --resolution <N>        Override the terrain grid resolution");
    eprintln!("    -h, --help              Show this help message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("    build_scene --seed 42 ./out/scene");
    eprintln!("    build_scene -c scene.json --resolution 128 ./out/scene");
}

#[derive(Debug)]
struct Args {
    output_dir: PathBuf,
    config: Option<PathBuf>,
    seed: Option<u32>,
    resolution: Option<u32>,
}

fn parse_args() -> std::result::Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        return Err("Missing output directory".to_string());
    }

    let mut config: Option<PathBuf> = None;
    let mut seed: Option<u32> = None;
    let mut resolution: Option<u32> = None;
    let mut output_dir: Option<PathBuf> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-c" | "--config" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --config".to_string());
                }
                config = Some(PathBuf::from(&args[i]));
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --seed".to_string());
                }
                seed = Some(
                    args[i]
                        .parse()
                        .map_err(|_| format!("Invalid seed: {}", args[i]))?,
                );
            }
            "--resolution" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --resolution".to_string());
                }
                resolution = Some(
                    args[i]
                        .parse()
                        .map_err(|_| format!("Invalid resolution: {}", args[i]))?,
                );
            }
            other if other.starts_with('-') => {
                return Err(format!("Unknown option: {}", other));
            }
            other => {
                if output_dir.is_some() {
                    return Err(format!("Unexpected argument: {}", other));
                }
                output_dir = Some(PathBuf::from(other));
            }
        }
        i += 1;
    }

    let output_dir = output_dir.ok_or_else(|| "Missing output directory".to_string())?;
    Ok(Args { output_dir, config, seed, resolution })
}

fn run(args: Args) -> Result<()> {
    let mut settings = match &args.config {
        Some(path) => SceneSettings::from_file(path)?,
        None => SceneSettings::default(),
    };
    if let Some(seed) = args.seed {
        settings.terrain.seed = seed;
    }
    if let Some(resolution) = args.resolution {
        settings.resolution = resolution;
    }

    fs::create_dir_all(&args.output_dir)?;

    let start = Instant::now();
    let pipeline = GenerationPipeline::new(settings);
    let scene = pipeline.build();
    log::info!("generated scene in {:.2?}", start.elapsed());

    fs::write(args.output_dir.join("terrain.bin"), scene.terrain.as_bytes())?;
    fs::write(
        args.output_dir.join("branches.bin"),
        as_upload_bytes(&scene.forest.branches),
    )?;
    fs::write(
        args.output_dir.join("leaves.bin"),
        as_upload_bytes(&scene.forest.leaves),
    )?;
    fs::write(args.output_dir.join("rocks.bin"), as_upload_bytes(&scene.rocks))?;

    let stats = serde_json::json!({
        "terrain_vertices": scene.terrain.vertex_count(),
        "branches": scene.forest.branches.len(),
        "leaves": scene.forest.leaves.len(),
        "rocks": scene.rocks.len(),
        "trees": scene.forest.stats.trees_placed,
        "clusters_placed": scene.forest.stats.clusters_placed,
        "capped": scene.forest.stats.capped,
    });
    let stats_text = serde_json::to_string_pretty(&stats)
        .map_err(|e| Error::Export(e.to_string()))?;
    fs::write(args.output_dir.join("stats.json"), stats_text)?;

    log::info!("wrote scene buffers to {}", args.output_dir.display());
    Ok(())
}

fn main() {
    wildscape::core::logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(args) {
        log::error!("scene build failed: {}", e);
        std::process::exit(1);
    }
}
