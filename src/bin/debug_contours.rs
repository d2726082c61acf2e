//! Debug script to compare mid-point counts across seeds and match modes

use battlefield_generator::config::MapConfig;
use battlefield_generator::contour::{find_mid_points, ContourMatch};
use battlefield_generator::endpoints::select_endpoints;
use battlefield_generator::noise_field;
use battlefield_generator::seeds::MapSeed;
use battlefield_generator::terrain::{TerrainBands, TileType};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = MapConfig::default();
    let bands = TerrainBands::new(&config.bands)?;
    let ground = bands.require(TileType::Ground)?;
    let modes = [
        ContourMatch::Rounded { decimals: 2 },
        ContourMatch::Rounded { decimals: 3 },
        ContourMatch::Tolerance(0.01),
    ];

    let mut rng = ChaCha8Rng::seed_from_u64(12345);
    let runs = 20;
    let mut empty = [0usize; 3];
    let mut centered = [0usize; 3];

    println!("=== MID-POINT DEBUG ({}x{}, scale {}) ===", config.width, config.height, config.noise.scale);
    println!("{:<12} {:>10} {:>10} {:>10}", "seed", "round(2)", "round(3)", "tol(0.01)");

    for _ in 0..runs {
        let seed = MapSeed::random(&mut rng);
        let noise = noise_field::generate(config.width, config.height, &config.noise, seed.offset())?;

        let mut counts = [0usize; 3];
        for (i, mode) in modes.iter().enumerate() {
            let points = find_mid_points(&noise, ground, *mode);
            counts[i] = points.len();
            if points.is_empty() {
                empty[i] += 1;
            }
            let ends = select_endpoints(&points, config.width, config.height);
            if ends.objective == ends.player_spawn {
                centered[i] += 1;
            }
        }
        println!("{:<12} {:>10} {:>10} {:>10}", seed, counts[0], counts[1], counts[2]);
    }

    println!();
    for (i, mode) in modes.iter().enumerate() {
        println!(
            "{:?}: {} of {} seeds had no mid-points, {} collapsed both endpoints",
            mode, empty[i], runs, centered[i]
        );
    }
    Ok(())
}
