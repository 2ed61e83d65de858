//! Terramesh CLI - heightfield terrain mesh generator.
//!
//! Generate a terrain mesh from procedural Perlin noise or a grayscale
//! heightmap image and report its buffer statistics. Use the
//! `terrain_viewer` binary for interactive rendering.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use terramesh::export::{export_height_png, sample_height_grid, PngExportOptions};
use terramesh::heightmap::load_height_grid;
use terramesh::terrain::{
    GridSource, NoiseParams, NoiseSource, TerrainMesh, TerrainMode,
};

/// Heightfield terrain mesh generator.
#[derive(Parser)]
#[command(name = "terramesh")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a terrain mesh and print its statistics.
    Generate {
        /// Grid width in vertices (noise mode).
        #[arg(long, default_value = "200")]
        width: u32,

        /// Grid height in vertices (noise mode).
        #[arg(long, default_value = "200")]
        height: u32,

        /// Height source.
        #[arg(short, long, default_value = "noise")]
        mode: ModeArg,

        /// Heightmap image path (required in image mode).
        #[arg(long)]
        heightmap: Option<PathBuf>,

        /// Vertical exaggeration applied to every height sample.
        #[arg(long, default_value = "50.0")]
        height_scale: f32,

        /// Horizontal frequency of the noise field.
        #[arg(long, default_value = "0.03")]
        noise_scale: f32,

        /// Number of noise octaves (1-16).
        #[arg(long, default_value = "6")]
        octaves: u32,

        /// Amplitude decay per octave (persistence).
        #[arg(long, default_value = "0.5")]
        persistence: f32,

        /// Random seed for reproducible noise.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Export the sampled height field as a 16-bit grayscale PNG.
        #[arg(long)]
        preview: Option<PathBuf>,
    },
    /// Print the buffer-size arithmetic for a grid size.
    Info {
        /// Grid width in vertices.
        #[arg(long, default_value = "200")]
        width: u32,

        /// Grid height in vertices.
        #[arg(long, default_value = "200")]
        height: u32,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    /// Procedural Perlin noise.
    Noise,
    /// Grayscale heightmap image.
    Image,
}

impl From<ModeArg> for TerrainMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Noise => TerrainMode::Noise,
            ModeArg::Image => TerrainMode::Image,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            width,
            height,
            mode,
            heightmap,
            height_scale,
            noise_scale,
            octaves,
            persistence,
            seed,
            preview,
        } => {
            run_generate(
                width,
                height,
                mode.into(),
                heightmap,
                height_scale,
                noise_scale,
                octaves,
                persistence,
                seed,
                preview,
            );
        }
        Commands::Info { width, height } => {
            run_info(width, height);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_generate(
    width: u32,
    height: u32,
    mode: TerrainMode,
    heightmap: Option<PathBuf>,
    height_scale: f32,
    noise_scale: f32,
    octaves: u32,
    persistence: f32,
    seed: Option<u64>,
    preview: Option<PathBuf>,
) {
    // Validate parameters
    if width < 2 || height < 2 {
        eprintln!("Error: Grid dimensions must be at least 2x2");
        std::process::exit(1);
    }

    if height_scale <= 0.0 {
        eprintln!("Error: Height scale must be positive");
        std::process::exit(1);
    }

    if noise_scale <= 0.0 {
        eprintln!("Error: Noise scale must be positive");
        std::process::exit(1);
    }

    if octaves < 1 || octaves > 16 {
        eprintln!("Error: Octaves must be between 1 and 16");
        std::process::exit(1);
    }

    if persistence <= 0.0 || persistence >= 1.0 {
        eprintln!("Error: Persistence must be strictly between 0.0 and 1.0");
        std::process::exit(1);
    }

    // Generate seed if not provided
    let seed = seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos() as u64
    });

    println!("Terramesh - Heightfield Terrain Generator");
    println!("=========================================");
    println!("Mode: {:?}", mode);
    if mode == TerrainMode::Noise {
        println!("Grid: {}x{}", width, height);
        println!("Seed: {}", seed);
    }

    let start = Instant::now();

    let params = NoiseParams {
        noise_scale,
        octaves,
        persistence,
    };

    // Build the mesh from the selected height source, keeping the sampled
    // grid around only when a preview export was requested.
    let (mesh, preview_grid, preview_options) = match mode {
        TerrainMode::Noise => {
            let source = NoiseSource::from_seed(seed, params);
            let mesh = TerrainMesh::generate(width, height, &source, height_scale);
            let grid = preview
                .is_some()
                .then(|| sample_height_grid(&source, width, height));
            (mesh, grid, PngExportOptions::noise_range())
        }
        TerrainMode::Image => {
            let Some(path) = heightmap else {
                eprintln!("Error: Image mode requires --heightmap <PATH>");
                std::process::exit(1);
            };
            let grid = load_height_grid(&path).unwrap_or_else(|e| {
                eprintln!("Error loading heightmap: {}", e);
                std::process::exit(1);
            });
            println!("Heightmap: {} ({}x{})", path.display(), grid.width, grid.height);

            let source = GridSource::new(&grid);
            let mesh = TerrainMesh::generate(grid.width, grid.height, &source, height_scale);
            let grid = preview.is_some().then_some(grid);
            (mesh, grid, PngExportOptions::default())
        }
    };

    if mesh.is_empty() {
        eprintln!("Error: Terrain generation produced an empty mesh");
        std::process::exit(1);
    }

    let gen_time = start.elapsed();
    println!("\nTerrain generated successfully in {:.2?}", gen_time);
    println!("Vertices: {}", mesh.vertex_count());
    println!("Indices: {}", mesh.index_count());
    println!("Triangles: {}", mesh.index_count() / 3);
    println!(
        "Vertex buffer: {:.1} KiB, index buffer: {:.1} KiB",
        (mesh.vertices.len() * 4) as f64 / 1024.0,
        (mesh.indices.len() * 4) as f64 / 1024.0
    );

    if let (Some(path), Some(grid)) = (preview, preview_grid) {
        export_height_png(&grid, &path, &preview_options).unwrap_or_else(|e| {
            eprintln!("Error exporting preview: {}", e);
            std::process::exit(1);
        });
        println!("Preview written to {}", path.display());
    }
}

fn run_info(width: u32, height: u32) {
    println!("Grid: {}x{}", width, height);
    println!("Vertices: {}", width as u64 * height as u64);
    println!(
        "Vertex buffer floats: {} (6 per vertex)",
        width as u64 * height as u64 * 6
    );
    if width >= 2 && height >= 2 {
        let cells = (width as u64 - 1) * (height as u64 - 1);
        println!("Cells: {}", cells);
        println!("Indices: {} (6 per cell)", cells * 6);
        println!("Triangles: {}", cells * 2);
    } else {
        println!("Cells: 0 (grid too small to triangulate)");
    }
}
