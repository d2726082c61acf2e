//! Enemy placement around the objective
//!
//! Landmines ring the objective on concentric zones: each zone is a circle
//! of evenly spaced candidate cells, kept only where a tank could drive.
//! Turrets are drawn at random from the mid-points that sit a short
//! distance from the objective.

use std::collections::HashSet;
use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{MapGenError, Result};
use crate::terrain::{ClassifiedGrid, TileType};
use crate::tilemap::TilePos;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Turret,
    Landmine,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub pos: TilePos,
    pub kind: EnemyKind,
    /// Index of the zone a landmine was placed on
    pub zone: Option<usize>,
}

/// A ring around the objective.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub radius: f32,
    /// Arc distance between landmines on this ring
    pub landmine_spacing: f32,
    #[serde(default)]
    pub label: Option<String>,
}

impl Zone {
    pub fn new(radius: f32, landmine_spacing: f32) -> Self {
        Self {
            radius,
            landmine_spacing,
            label: None,
        }
    }

    pub fn labeled(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

/// Outer, middle and inner rings; mines get denser toward the objective.
pub fn default_zones() -> Vec<Zone> {
    vec![
        Zone::new(60.0, 12.0).labeled("outer"),
        Zone::new(40.0, 8.0).labeled("middle"),
        Zone::new(20.0, 5.0).labeled("inner"),
    ]
}

/// Check radii and spacings and sort the zones by descending radius.
pub fn normalize_zones(zones: &mut [Zone]) -> Result<()> {
    for zone in zones.iter() {
        if !zone.radius.is_finite() || zone.radius < 0.0 {
            return Err(MapGenError::InvalidRadius(zone.radius));
        }
        if !zone.landmine_spacing.is_finite() || zone.landmine_spacing <= 0.0 {
            return Err(MapGenError::InvalidSpacing(zone.landmine_spacing));
        }
    }
    zones.sort_by(|a, b| b.radius.total_cmp(&a.radius));
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretParams {
    pub count: usize,
    /// Inclusive lower bound on distance from the objective
    pub min_distance: f32,
    /// Exclusive upper bound on distance from the objective
    pub max_distance: f32,
}

impl Default for TurretParams {
    fn default() -> Self {
        Self {
            count: 3,
            min_distance: 5.0,
            max_distance: 10.0,
        }
    }
}

/// Number of points `place_on_perimeter` lays out on a ring for a
/// `width` x `height` grid.
///
/// Rings needing more than two points per cell of the longest circumference
/// that fits the grid are rejected. A ring wider than the grid diagonal
/// cannot reach the grid from a center on it and gets no points.
pub fn perimeter_point_count(radius: f32, min_spacing: f32, width: usize, height: usize) -> Result<usize> {
    if !min_spacing.is_finite() || min_spacing <= 0.0 {
        return Err(MapGenError::InvalidSpacing(min_spacing));
    }
    if !radius.is_finite() || radius < 0.0 {
        return Err(MapGenError::InvalidRadius(radius));
    }

    let diagonal = (width as f64).hypot(height as f64);
    let reach = (radius as f64).min(diagonal);
    let limit = (2.0 * std::f64::consts::TAU * diagonal).ceil();
    let count = (std::f64::consts::TAU * reach / min_spacing as f64).round();
    if !count.is_finite() || count > limit {
        return Err(MapGenError::TooManyPerimeterPoints {
            radius,
            spacing: min_spacing,
            limit: limit as usize,
        });
    }
    if radius as f64 > diagonal {
        return Ok(0);
    }
    Ok(count as usize)
}

/// Evenly spaced cells on a circle, filtered to allowed tile types.
///
/// `round(2πr / min_spacing)` points are laid out starting at angle zero.
/// Off-map cells and cells whose tile type is not in `allowed` are dropped;
/// two points rounding to the same cell are kept once.
pub fn place_on_perimeter(
    center: TilePos,
    radius: f32,
    min_spacing: f32,
    grid: &ClassifiedGrid,
    allowed: &[TileType],
) -> Result<Vec<TilePos>> {
    let count = perimeter_point_count(radius, min_spacing, grid.width(), grid.height())?;
    let mut seen = HashSet::with_capacity(count);
    let mut points = Vec::with_capacity(count);

    for i in 0..count {
        let angle = TAU * i as f32 / count as f32;
        let pos = TilePos::new(
            (center.x as f32 + radius * angle.cos()).round() as i32,
            (center.y as f32 + radius * angle.sin()).round() as i32,
        );
        let Some(tile) = grid.tile_at(pos) else {
            continue;
        };
        if allowed.contains(&tile) && seen.insert(pos) {
            points.push(pos);
        }
    }

    Ok(points)
}

/// Draw `k` distinct items uniformly without replacement.
///
/// Asking for more items than exist is an error.
pub fn sample_distinct<T: Clone, R: Rng + ?Sized>(rng: &mut R, items: &[T], k: usize) -> Result<Vec<T>> {
    if k > items.len() {
        return Err(MapGenError::InsufficientCandidates {
            requested: k,
            available: items.len(),
        });
    }
    Ok(rand::seq::index::sample(rng, items.len(), k)
        .into_iter()
        .map(|i| items[i].clone())
        .collect())
}

/// One landmine ring per zone, outermost first.
pub fn landmine_sites(
    objective: TilePos,
    zones: &[Zone],
    grid: &ClassifiedGrid,
    allowed: &[TileType],
) -> Result<Vec<SpawnPoint>> {
    let mut order: Vec<usize> = (0..zones.len()).collect();
    order.sort_by(|&a, &b| zones[b].radius.total_cmp(&zones[a].radius));

    let mut sites = Vec::new();
    for index in order {
        let zone = &zones[index];
        let ring = place_on_perimeter(objective, zone.radius, zone.landmine_spacing, grid, allowed)?;
        sites.extend(ring.into_iter().map(|pos| SpawnPoint {
            pos,
            kind: EnemyKind::Landmine,
            zone: Some(index),
        }));
    }
    Ok(sites)
}

/// Mid-points at a turret-friendly distance from the objective.
pub fn turret_candidates(
    mid_points: &[TilePos],
    objective: TilePos,
    params: &TurretParams,
    grid: &ClassifiedGrid,
    allowed: &[TileType],
) -> Vec<TilePos> {
    mid_points
        .iter()
        .copied()
        .filter(|&p| {
            let d = p.distance(objective);
            d >= params.min_distance && d < params.max_distance
        })
        .filter(|&p| grid.tile_at(p).map_or(false, |t| allowed.contains(&t)))
        .collect()
}

/// Pick `params.count` turret sites from the candidates.
pub fn turret_sites<R: Rng + ?Sized>(
    rng: &mut R,
    mid_points: &[TilePos],
    objective: TilePos,
    params: &TurretParams,
    grid: &ClassifiedGrid,
    allowed: &[TileType],
) -> Result<Vec<SpawnPoint>> {
    let candidates = turret_candidates(mid_points, objective, params, grid, allowed);
    Ok(sample_distinct(rng, &candidates, params.count)?
        .into_iter()
        .map(|pos| SpawnPoint {
            pos,
            kind: EnemyKind::Turret,
            zone: None,
        })
        .collect())
}

type ZoneCallback = Box<dyn FnMut(usize, &Zone)>;

/// Tracks which zones the player has entered.
///
/// Each zone fires once, the first time the player comes within its radius.
pub struct ZoneTracker {
    center: TilePos,
    zones: Vec<Zone>,
    entered: Vec<bool>,
    callbacks: Vec<Vec<ZoneCallback>>,
}

impl ZoneTracker {
    pub fn new(center: TilePos, zones: Vec<Zone>) -> Self {
        let n = zones.len();
        Self {
            center,
            zones,
            entered: vec![false; n],
            callbacks: (0..n).map(|_| Vec::new()).collect(),
        }
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Register a callback for a zone.
    pub fn on_enter<F: FnMut(usize, &Zone) + 'static>(&mut self, index: usize, callback: F) -> Result<()> {
        let slot = self.callbacks.get_mut(index).ok_or(MapGenError::UnknownZone(index))?;
        slot.push(Box::new(callback));
        Ok(())
    }

    /// Move the player; returns the indices of newly entered zones,
    /// outermost first.
    pub fn update(&mut self, player: TilePos) -> Vec<usize> {
        let d = player.distance(self.center);
        let mut newly = Vec::new();

        let mut order: Vec<usize> = (0..self.zones.len()).collect();
        order.sort_by(|&a, &b| self.zones[b].radius.total_cmp(&self.zones[a].radius));

        for index in order {
            if self.entered[index] || d > self.zones[index].radius {
                continue;
            }
            self.entered[index] = true;
            let zone = &self.zones[index];
            for callback in self.callbacks[index].iter_mut() {
                callback(index, zone);
            }
            newly.push(index);
        }
        newly
    }

    pub fn has_entered(&self, index: usize) -> bool {
        self.entered.get(index).copied().unwrap_or(false)
    }

    /// Re-arm every zone, e.g. for a new match on the same map.
    pub fn reset(&mut self) {
        self.entered.fill(false);
    }
}
