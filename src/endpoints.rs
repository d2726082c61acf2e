//! Player spawn and objective selection
//!
//! The mid-points are split into quadrants around the map center. The
//! busiest quadrant holds the objective and the diagonally opposite one the
//! player spawn, so the player always has to cross the map.

use serde::{Deserialize, Serialize};

use crate::tilemap::TilePos;

/// Map quadrant relative to the center. Cells on a center line belong to
/// the non-negative side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    /// Fixed order, also used to break count ties.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// Quadrant of an offset `(dx, dy)` from the center.
    pub fn of(dx: i32, dy: i32) -> Self {
        match (dx >= 0, dy >= 0) {
            (false, true) => Quadrant::TopLeft,
            (true, true) => Quadrant::TopRight,
            (false, false) => Quadrant::BottomLeft,
            (true, false) => Quadrant::BottomRight,
        }
    }

    pub fn of_pos(pos: TilePos, center: TilePos) -> Self {
        Self::of(pos.x - center.x, pos.y - center.y)
    }

    pub fn opposite(&self) -> Self {
        match self {
            Quadrant::TopLeft => Quadrant::BottomRight,
            Quadrant::TopRight => Quadrant::BottomLeft,
            Quadrant::BottomLeft => Quadrant::TopRight,
            Quadrant::BottomRight => Quadrant::TopLeft,
        }
    }

    fn index(&self) -> usize {
        match self {
            Quadrant::TopLeft => 0,
            Quadrant::TopRight => 1,
            Quadrant::BottomLeft => 2,
            Quadrant::BottomRight => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointParams {
    /// Endpoints must lie within this fraction of the half-width from the center
    pub radius_fraction: f32,
}

impl Default for EndpointParams {
    fn default() -> Self {
        Self { radius_fraction: 0.85 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndPoints {
    pub objective: TilePos,
    pub player_spawn: TilePos,
    pub objective_quadrant: Quadrant,
    pub spawn_quadrant: Quadrant,
}

/// Mid-points grouped by quadrant.
#[derive(Clone, Debug, Default)]
pub struct QuadrantPartition {
    buckets: [Vec<TilePos>; 4],
}

impl QuadrantPartition {
    pub fn new(points: &[TilePos], center: TilePos) -> Self {
        let mut partition = Self::default();
        for &p in points {
            partition.buckets[Quadrant::of_pos(p, center).index()].push(p);
        }
        partition
    }

    pub fn points(&self, quadrant: Quadrant) -> &[TilePos] {
        &self.buckets[quadrant.index()]
    }

    pub fn count(&self, quadrant: Quadrant) -> usize {
        self.buckets[quadrant.index()].len()
    }

    /// Quadrant with the most points; ties go to the earliest in `Quadrant::ALL`.
    pub fn busiest(&self) -> Quadrant {
        let mut best = Quadrant::ALL[0];
        for q in Quadrant::ALL {
            if self.count(q) > self.count(best) {
                best = q;
            }
        }
        best
    }
}

pub fn select_endpoints(mid_points: &[TilePos], width: usize, height: usize) -> EndPoints {
    select_endpoints_with(mid_points, width, height, &EndpointParams::default())
}

/// Pick the objective and player spawn from the mid-points.
///
/// With no usable point in a quadrant the endpoint falls back to the center.
pub fn select_endpoints_with(
    mid_points: &[TilePos],
    width: usize,
    height: usize,
    params: &EndpointParams,
) -> EndPoints {
    let center = TilePos::new((width / 2) as i32, (height / 2) as i32);
    let max_distance = params.radius_fraction * (width as f32 / 2.0);

    let partition = QuadrantPartition::new(mid_points, center);
    let objective_quadrant = partition.busiest();
    let spawn_quadrant = objective_quadrant.opposite();

    let objective = furthest_within(partition.points(objective_quadrant), center, max_distance)
        .unwrap_or(center);
    let player_spawn = furthest_within(partition.points(spawn_quadrant), center, max_distance)
        .unwrap_or(center);

    EndPoints {
        objective,
        player_spawn,
        objective_quadrant,
        spawn_quadrant,
    }
}

/// Point furthest from `center` with distance at most `max_distance`.
/// The first such point wins on ties.
fn furthest_within(points: &[TilePos], center: TilePos, max_distance: f32) -> Option<TilePos> {
    let mut best: Option<(TilePos, f32)> = None;
    for &p in points {
        let d = p.distance(center);
        if d > max_distance {
            continue;
        }
        if best.map_or(true, |(_, best_d)| d > best_d) {
            best = Some((p, d));
        }
    }
    best.map(|(p, _)| p)
}
