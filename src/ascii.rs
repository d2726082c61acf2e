//! ASCII rendering and export module for battlefield maps
//!
//! Provides functions to render a generated map as ASCII text and export it to a file.

use std::fs::File;
use std::io::{self, Write};

use chrono::Local;

use crate::placement::EnemyKind;
use crate::terrain::TileType;
use crate::tilemap::{TilePos, Tilemap};
use crate::world::GeneratedMap;

/// Get ASCII character for a tile
pub fn tile_char(tile: TileType) -> char {
    match tile {
        TileType::Ground => '.',
        TileType::Mud => ',',
        TileType::Water => '~',
        TileType::Forest => 'T',
    }
}

/// Marker characters, drawn over the terrain
const OBJECTIVE_CHAR: char = 'O';
const SPAWN_CHAR: char = 'P';
const TURRET_CHAR: char = 'x';
const LANDMINE_CHAR: char = '*';

fn marker_layer(map: &GeneratedMap) -> Tilemap<Option<char>> {
    let mut markers = Tilemap::new(map.width(), map.height());
    let mut mark = |pos: TilePos, c: char| {
        if markers.contains(pos) {
            markers.set(pos.x as usize, pos.y as usize, Some(c));
        }
    };

    for spawn in map.spawn_points() {
        let c = match spawn.kind {
            EnemyKind::Turret => TURRET_CHAR,
            EnemyKind::Landmine => LANDMINE_CHAR,
        };
        mark(spawn.pos, c);
    }
    mark(map.endpoints.player_spawn, SPAWN_CHAR);
    mark(map.endpoints.objective, OBJECTIVE_CHAR);
    markers
}

/// Render the map as ASCII, sampling every `step`-th cell in each direction.
/// Rows are printed top to bottom with the highest `y` first.
pub fn render_ascii_map(map: &GeneratedMap, step: usize) -> String {
    let step = step.max(1);
    let markers = marker_layer(map);
    let tiles = map.grid.tiles();
    let mut out = String::with_capacity((map.width() / step + 1) * (map.height() / step));

    for y in (0..map.height()).rev().step_by(step) {
        for x in (0..map.width()).step_by(step) {
            // Markers inside a sampled block win over the terrain
            let marker = (0..step)
                .flat_map(|dy| (0..step).map(move |dx| (x + dx, y.saturating_sub(dy))))
                .filter(|&(mx, my)| mx < map.width() && my < map.height())
                .find_map(|(mx, my)| *markers.get(mx, my));
            out.push(marker.unwrap_or_else(|| tile_char(*tiles.get(x, y))));
        }
        out.push('\n');
    }
    out
}

pub fn legend() -> String {
    let mut out = String::from("LEGEND:\n");
    for &tile in TileType::all() {
        out.push_str(&format!("  {} = {}\n", tile_char(tile), tile.name()));
    }
    out.push_str(&format!("  {} = Objective    {} = Player spawn\n", OBJECTIVE_CHAR, SPAWN_CHAR));
    out.push_str(&format!("  {} = Turret       {} = Landmine\n", TURRET_CHAR, LANDMINE_CHAR));
    out
}

/// Export the map, legend and statistics to a text file.
pub fn export_map_file(map: &GeneratedMap, path: &str, step: usize) -> io::Result<()> {
    let mut file = File::create(path)?;
    let total = map.width() * map.height();

    // Header
    writeln!(file, "=== BATTLEFIELD MAP ===")?;
    writeln!(file, "Seed: {}", map.seed)?;
    writeln!(file, "Size: {}x{}", map.width(), map.height())?;
    writeln!(file, "Noise scale: {}", map.config.noise.scale)?;
    writeln!(file, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(file)?;

    writeln!(file, "=== MAP ===")?;
    write!(file, "{}", render_ascii_map(map, step))?;
    writeln!(file)?;
    write!(file, "{}", legend())?;
    writeln!(file)?;

    writeln!(file, "=== STATISTICS ===")?;
    writeln!(file, "Total tiles: {}", total)?;
    for (tile, count) in map.grid.counts() {
        writeln!(file, "  {:<7} {:>7} ({:.1}%)", tile.name(), count, 100.0 * count as f64 / total as f64)?;
    }
    writeln!(file, "Mid-points: {}", map.mid_points.len())?;
    writeln!(file, "Objective: {} ({:?})", map.endpoints.objective, map.endpoints.objective_quadrant)?;
    writeln!(file, "Player spawn: {} ({:?})", map.endpoints.player_spawn, map.endpoints.spawn_quadrant)?;
    writeln!(file, "Turrets: {}", map.turrets.len())?;
    writeln!(file, "Landmines: {}", map.landmines.len())?;

    Ok(())
}
