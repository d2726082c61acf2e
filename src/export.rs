use std::fs;

use image::{ImageBuffer, Rgb, RgbImage};

use crate::error::Result;
use crate::placement::EnemyKind;
use crate::terrain::TileType;
use crate::tilemap::{TilePos, Tilemap};
use crate::world::GeneratedMap;

/// Terrain colors
pub fn tile_color(tile: TileType) -> [u8; 3] {
    match tile {
        TileType::Ground => [156, 140, 94],
        TileType::Mud => [110, 84, 52],
        TileType::Water => [52, 104, 168],
        TileType::Forest => [34, 96, 44],
    }
}

const OBJECTIVE_COLOR: [u8; 3] = [230, 40, 40];
const SPAWN_COLOR: [u8; 3] = [40, 220, 230];
const TURRET_COLOR: [u8; 3] = [250, 160, 20];
const LANDMINE_COLOR: [u8; 3] = [20, 20, 20];

/// Export a noise field as grayscale. Values are expected to be normalized (0.0-1.0).
pub fn export_noise(noise: &Tilemap<f32>, path: &str) -> Result<()> {
    let mut img: RgbImage = ImageBuffer::new(noise.width as u32, noise.height as u32);

    for (x, y, &v) in noise.iter() {
        let g = (v.clamp(0.0, 1.0) * 255.0) as u8;
        img.put_pixel(x as u32, flip_y(y, noise.height), Rgb([g, g, g]));
    }

    img.save(path)?;
    Ok(())
}

/// Render the classified map with endpoint and enemy markers.
/// Image rows run top to bottom, so the highest `y` is the first row.
pub fn render_map_image(map: &GeneratedMap) -> RgbImage {
    let (width, height) = (map.width(), map.height());
    let mut img: RgbImage = ImageBuffer::new(width as u32, height as u32);

    for (x, y, &tile) in map.grid.tiles().iter() {
        img.put_pixel(x as u32, flip_y(y, height), Rgb(tile_color(tile)));
    }

    for spawn in map.spawn_points() {
        let (color, radius) = match spawn.kind {
            EnemyKind::Turret => (TURRET_COLOR, 1),
            EnemyKind::Landmine => (LANDMINE_COLOR, 0),
        };
        draw_marker(&mut img, spawn.pos, radius, color);
    }
    draw_marker(&mut img, map.endpoints.player_spawn, 2, SPAWN_COLOR);
    draw_marker(&mut img, map.endpoints.objective, 2, OBJECTIVE_COLOR);

    img
}

pub fn export_map_png(map: &GeneratedMap, path: &str) -> Result<()> {
    render_map_image(map).save(path)?;
    Ok(())
}

/// Write the map snapshot as pretty-printed JSON.
pub fn export_snapshot_json(map: &GeneratedMap, path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(&map.snapshot())?;
    fs::write(path, json)?;
    Ok(())
}

fn flip_y(y: usize, height: usize) -> u32 {
    (height - 1 - y) as u32
}

/// Fill a square of side `2 * radius + 1` centered on a cell, clipped to the image.
fn draw_marker(img: &mut RgbImage, pos: TilePos, radius: i32, color: [u8; 3]) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let x = pos.x + dx;
            let y = pos.y + dy;
            if x >= 0 && y >= 0 && x < w && y < h {
                img.put_pixel(x as u32, (h - 1 - y) as u32, Rgb(color));
            }
        }
    }
}
