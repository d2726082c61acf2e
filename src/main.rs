use std::error::Error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use battlefield_generator::ascii;
use battlefield_generator::config::MapConfig;
use battlefield_generator::export;
use battlefield_generator::seeds::MapSeed;
use battlefield_generator::world::{self, GenerationStage};

#[derive(Parser, Debug)]
#[command(name = "battlefield_generator")]
#[command(about = "Generate procedural tank-battle maps from a seed")]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<String>,

    /// Width of the map in tiles
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Height of the map in tiles
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Noise periods across the map
    #[arg(long)]
    scale: Option<f32>,

    /// Number of noise octaves
    #[arg(long)]
    octaves: Option<u32>,

    /// Map seed, up to 10 digits (random if not specified)
    #[arg(short, long)]
    seed: Option<String>,

    /// Print the map as ASCII
    #[arg(long)]
    ascii: bool,

    /// Sample every Nth tile when printing ASCII
    #[arg(long, default_value = "4")]
    ascii_step: usize,

    /// Export the map to a PNG file
    #[arg(long)]
    export_png: Option<String>,

    /// Export the raw noise field to a grayscale PNG file
    #[arg(long)]
    export_noise: Option<String>,

    /// Export the map snapshot to a JSON file
    #[arg(long)]
    export_json: Option<String>,

    /// Export the ASCII map and statistics to a text file
    #[arg(long)]
    export_ascii: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => MapConfig::from_json_file(path)?,
        None => MapConfig::default(),
    };
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(scale) = args.scale {
        config.noise.scale = scale;
    }
    if let Some(octaves) = args.octaves {
        config.noise.octaves = octaves;
    }

    let seed = match &args.seed {
        Some(s) => MapSeed::parse(s),
        None => MapSeed::default(),
    };

    println!("Generating battlefield with seed: {}", seed);
    println!("Map size: {}x{}", config.width, config.height);

    let map = world::generate_with_progress(&config, &seed, |stage| {
        let label = match stage {
            GenerationStage::Noise => "Generating noise field...",
            GenerationStage::Classify => "Classifying terrain...",
            GenerationStage::Contour => "Tracing mid-point contour...",
            GenerationStage::Endpoints => "Choosing objective and spawn...",
            GenerationStage::Landmines => "Placing landmines...",
            GenerationStage::Turrets => "Placing turrets...",
            GenerationStage::Done => return,
        };
        println!("{}", label);
    })?;

    let total = (map.width() * map.height()) as f64;
    for (tile, count) in map.grid.counts() {
        println!("  {:<7} {:>6.1}%", tile.name(), 100.0 * count as f64 / total);
    }
    println!("Mid-points: {}", map.mid_points.len());
    println!(
        "Objective: {} ({:?}), player spawn: {} ({:?})",
        map.endpoints.objective,
        map.endpoints.objective_quadrant,
        map.endpoints.player_spawn,
        map.endpoints.spawn_quadrant,
    );
    println!("Turrets: {}, landmines: {}", map.turrets.len(), map.landmines.len());

    if args.ascii {
        print!("{}", ascii::render_ascii_map(&map, args.ascii_step));
        print!("{}", ascii::legend());
    }
    if let Some(path) = &args.export_png {
        export::export_map_png(&map, path)?;
        println!("Exported map to {}", path);
    }
    if let Some(path) = &args.export_noise {
        export::export_noise(&map.noise, path)?;
        println!("Exported noise field to {}", path);
    }
    if let Some(path) = &args.export_json {
        export::export_snapshot_json(&map, path)?;
        println!("Exported snapshot to {}", path);
    }
    if let Some(path) = &args.export_ascii {
        ascii::export_map_file(&map, path, 1)?;
        println!("Exported ASCII map to {}", path);
    }

    Ok(())
}
