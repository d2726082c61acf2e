//! Generated map container and the generation pipeline
//!
//! Bundles everything one generation produces so it can be handed to the
//! renderer, the minimap and the enemy spawner in one piece.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::MapConfig;
use crate::contour;
use crate::endpoints::{self, EndPoints};
use crate::error::Result;
use crate::noise_field;
use crate::placement::{self, SpawnPoint, TurretParams, Zone, ZoneTracker};
use crate::seeds::MapSeed;
use crate::terrain::{BandSpec, ClassifiedGrid, TerrainBands, TileType};
use crate::tile_batch::{self, TileBatch, TileSink};
use crate::tilemap::{TilePos, Tilemap};

const LOG_TARGET: &str = "battlefield::mapgen";

/// Pipeline stages, reported in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationStage {
    Noise,
    Classify,
    Contour,
    Endpoints,
    Landmines,
    Turrets,
    Done,
}

/// All generated map data bundled together
#[derive(Clone, Debug)]
pub struct GeneratedMap {
    pub seed: MapSeed,
    pub config: MapConfig,
    /// Raw noise field (0.0-1.0)
    pub noise: Tilemap<f32>,
    pub grid: ClassifiedGrid,
    /// Mid-points of the contour band
    pub mid_points: Vec<TilePos>,
    pub endpoints: EndPoints,
    pub landmines: Vec<SpawnPoint>,
    pub turrets: Vec<SpawnPoint>,
}

impl GeneratedMap {
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn is_walkable(&self, pos: TilePos) -> bool {
        self.grid.is_walkable(pos)
    }

    /// Turrets followed by landmines.
    pub fn spawn_points(&self) -> impl Iterator<Item = &SpawnPoint> {
        self.turrets.iter().chain(self.landmines.iter())
    }

    pub fn tile_batches(&self) -> Vec<TileBatch> {
        tile_batch::build_batches(&self.grid)
    }

    /// Zone tracker centered on the objective, zones outermost first.
    pub fn zone_tracker(&self) -> ZoneTracker {
        let mut zones = self.config.zones.clone();
        zones.sort_by(|a, b| b.radius.total_cmp(&a.radius));
        ZoneTracker::new(self.endpoints.objective, zones)
    }

    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            seed: self.seed.to_string(),
            bands: self.config.bands.clone(),
            tiles: self.grid.tiles().clone(),
            endpoints: self.endpoints,
            zones: self.config.zones.clone(),
            turrets: self.turrets.clone(),
            landmines: self.landmines.clone(),
        }
    }
}

/// Serializable result of one generation, sent once from the host to the
/// clients so that every player sees the same map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub seed: String,
    pub bands: Vec<BandSpec>,
    pub tiles: Tilemap<TileType>,
    pub endpoints: EndPoints,
    pub zones: Vec<Zone>,
    pub turrets: Vec<SpawnPoint>,
    pub landmines: Vec<SpawnPoint>,
}

impl MapSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_walkable(&self, pos: TilePos) -> bool {
        self.tiles
            .get_at(pos)
            .and_then(|t| self.bands.iter().find(|b| b.tile_type == *t))
            .map_or(false, |b| b.walkable)
    }
}

pub fn generate(config: &MapConfig, seed: &MapSeed) -> Result<GeneratedMap> {
    generate_with_progress(config, seed, |_| {})
}

/// Run the whole pipeline, calling `progress` as each stage starts.
pub fn generate_with_progress<F: FnMut(GenerationStage)>(
    config: &MapConfig,
    seed: &MapSeed,
    mut progress: F,
) -> Result<GeneratedMap> {
    config.validate()?;
    let (width, height) = (config.width, config.height);
    tracing::info!(target: LOG_TARGET, seed = %seed, width, height, scale = config.noise.scale, "mapgen.start");

    progress(GenerationStage::Noise);
    let noise = noise_field::generate(width, height, &config.noise, seed.offset())?;

    progress(GenerationStage::Classify);
    let bands = TerrainBands::new(&config.bands)?;
    let grid = ClassifiedGrid::classify(&noise, &bands);
    for (tile, count) in grid.counts() {
        tracing::debug!(
            target: LOG_TARGET,
            tile = tile.name(),
            count,
            ratio = count as f32 / (width * height) as f32,
            "mapgen.classify.tiles"
        );
    }

    progress(GenerationStage::Contour);
    let contour_band = bands.require(config.contour_band)?;
    let mid_points = contour::find_mid_points(&noise, contour_band, config.contour_match);
    tracing::debug!(target: LOG_TARGET, mid_points = mid_points.len(), "mapgen.contour");
    if mid_points.is_empty() {
        tracing::warn!(target: LOG_TARGET, "mapgen.contour.empty; endpoints fall back to map center");
    }

    progress(GenerationStage::Endpoints);
    let endpoints = endpoints::select_endpoints_with(&mid_points, width, height, &config.endpoints);
    tracing::info!(
        target: LOG_TARGET,
        objective = %endpoints.objective,
        player_spawn = %endpoints.player_spawn,
        objective_quadrant = ?endpoints.objective_quadrant,
        "mapgen.endpoints"
    );

    progress(GenerationStage::Landmines);
    let landmines = placement::landmine_sites(
        endpoints.objective,
        &config.zones,
        &grid,
        &config.placement_tiles,
    )?;

    progress(GenerationStage::Turrets);
    let candidates = placement::turret_candidates(
        &mid_points,
        endpoints.objective,
        &config.turrets,
        &grid,
        &config.placement_tiles,
    );
    let turret_params = if candidates.len() < config.turrets.count {
        tracing::warn!(
            target: LOG_TARGET,
            requested = config.turrets.count,
            available = candidates.len(),
            "mapgen.turrets.capped"
        );
        TurretParams { count: candidates.len(), ..config.turrets }
    } else {
        config.turrets
    };
    let mut rng = ChaCha8Rng::seed_from_u64(seed.derive("turrets"));
    let turrets = placement::turret_sites(
        &mut rng,
        &mid_points,
        endpoints.objective,
        &turret_params,
        &grid,
        &config.placement_tiles,
    )?;

    tracing::info!(
        target: LOG_TARGET,
        turrets = turrets.len(),
        landmines = landmines.len(),
        "mapgen.done"
    );
    progress(GenerationStage::Done);

    Ok(GeneratedMap {
        seed: seed.clone(),
        config: config.clone(),
        noise,
        grid,
        mid_points,
        endpoints,
        landmines,
        turrets,
    })
}

/// Owns the current map and replaces it only when a new generation succeeds.
pub struct MapGenerator {
    config: MapConfig,
    current: Option<GeneratedMap>,
}

impl MapGenerator {
    pub fn new(config: MapConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, current: None })
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn current(&self) -> Option<&GeneratedMap> {
        self.current.as_ref()
    }

    /// Generate with the stored config; the previous map is dropped only on success.
    pub fn regenerate(&mut self, seed: &MapSeed) -> Result<&GeneratedMap> {
        let map = generate(&self.config, seed)?;
        let committed: &GeneratedMap = self.current.insert(map);
        Ok(committed)
    }

    /// Generate with a new config. On failure both the old config and the old
    /// map stay in place.
    pub fn regenerate_with(&mut self, config: MapConfig, seed: &MapSeed) -> Result<&GeneratedMap> {
        let map = generate(&config, seed)?;
        self.config = config;
        let committed: &GeneratedMap = self.current.insert(map);
        Ok(committed)
    }

    /// Push the current map's tiles to a sink. Returns false if nothing has
    /// been generated yet.
    pub fn commit_to<S: TileSink + ?Sized>(&self, sink: &mut S) -> bool {
        match &self.current {
            Some(map) => {
                tile_batch::write_batches(&map.tile_batches(), sink);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::Quadrant;
    use crate::placement::EnemyKind;
    use crate::tile_batch::LayeredTilemap;

    fn reference_map() -> GeneratedMap {
        let config = MapConfig {
            noise: noise_field::NoiseParams::with_scale(20.0),
            ..MapConfig::default()
        };
        generate(&config, &MapSeed::parse("0")).unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let map = reference_map();
        let center = TilePos::new(128, 128);
        let ends = map.endpoints;

        assert_eq!(map.seed.offset(), (0, 0));
        assert!(map.grid.contains(ends.objective));
        assert!(map.grid.contains(ends.player_spawn));
        assert_ne!(ends.objective, ends.player_spawn);
        assert_eq!(Quadrant::of_pos(ends.objective, center), ends.objective_quadrant);
        assert_eq!(Quadrant::of_pos(ends.player_spawn, center), ends.objective_quadrant.opposite());
        assert!(ends.objective.distance(center) <= 0.85 * 128.0);
        assert!(ends.player_spawn.distance(center) <= 0.85 * 128.0);
    }

    #[test]
    fn test_generation_is_reproducible() {
        let a = reference_map();
        let b = reference_map();
        assert_eq!(a.noise, b.noise);
        assert_eq!(a.endpoints, b.endpoints);
        assert_eq!(a.turrets, b.turrets);
        assert_eq!(a.landmines, b.landmines);
    }

    #[test]
    fn test_spawn_points_are_on_allowed_tiles() {
        let map = reference_map();
        let allowed = &map.config.placement_tiles;
        for spawn in map.spawn_points() {
            let tile = map.grid.tile_at(spawn.pos).expect("spawn point on the map");
            assert!(allowed.contains(&tile), "{:?} on {:?}", spawn, tile);
            assert!(map.is_walkable(spawn.pos));
        }
        assert!(map.turrets.iter().all(|s| s.kind == EnemyKind::Turret));
        assert!(map.turrets.len() <= map.config.turrets.count);
        for turret in &map.turrets {
            let d = turret.pos.distance(map.endpoints.objective);
            assert!((5.0..10.0).contains(&d));
        }
    }

    #[test]
    fn test_progress_reports_every_stage_in_order() {
        let config = MapConfig { width: 64, height: 64, ..MapConfig::default() };
        let mut stages = Vec::new();
        generate_with_progress(&config, &MapSeed::parse("42"), |s| stages.push(s)).unwrap();
        assert_eq!(
            stages,
            vec![
                GenerationStage::Noise,
                GenerationStage::Classify,
                GenerationStage::Contour,
                GenerationStage::Endpoints,
                GenerationStage::Landmines,
                GenerationStage::Turrets,
                GenerationStage::Done,
            ]
        );
    }

    #[test]
    fn test_failed_regeneration_keeps_committed_map() {
        let config = MapConfig { width: 64, height: 64, ..MapConfig::default() };
        let mut generator = MapGenerator::new(config.clone()).unwrap();
        let first_endpoints = generator.regenerate(&MapSeed::parse("7")).unwrap().endpoints;

        let broken = MapConfig { bands: vec![], ..config };
        assert!(generator.regenerate_with(broken, &MapSeed::parse("8")).is_err());

        let current = generator.current().unwrap();
        assert_eq!(current.seed, MapSeed::parse("7"));
        assert_eq!(current.endpoints, first_endpoints);
        assert_eq!(generator.config().bands.len(), 4);
    }

    #[test]
    fn test_unbounded_zone_fails_instead_of_panicking() {
        let config = MapConfig {
            width: 64,
            height: 64,
            zones: vec![Zone::new(1e30, 1e-30)],
            ..MapConfig::default()
        };
        assert!(matches!(
            generate(&config, &MapSeed::parse("1")),
            Err(crate::error::MapGenError::TooManyPerimeterPoints { .. })
        ));
    }

    #[test]
    fn test_commit_writes_all_tiles() {
        let config = MapConfig { width: 32, height: 32, ..MapConfig::default() };
        let mut generator = MapGenerator::new(config).unwrap();
        let mut sink = LayeredTilemap::new(32, 32);
        assert!(!generator.commit_to(&mut sink));

        generator.regenerate(&MapSeed::parse("123")).unwrap();
        assert!(generator.commit_to(&mut sink));
        assert_eq!(sink.tile_count(), 32 * 32);

        let map = generator.current().unwrap();
        let pos = TilePos::new(3, 4);
        assert_eq!(sink.top_tile(pos), map.grid.tile_at(pos));
    }

    #[test]
    fn test_snapshot_survives_json() {
        let config = MapConfig { width: 48, height: 48, ..MapConfig::default() };
        let map = generate(&config, &MapSeed::parse("2024")).unwrap();
        let snapshot = map.snapshot();
        let restored = MapSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();

        assert_eq!(restored, snapshot);
        for y in 0..48 {
            for x in 0..48 {
                let pos = TilePos::new(x, y);
                assert_eq!(restored.is_walkable(pos), map.is_walkable(pos));
            }
        }
    }

    #[test]
    fn test_zone_tracker_is_centered_on_objective() {
        let map = reference_map();
        let mut tracker = map.zone_tracker();
        let entered = tracker.update(map.endpoints.objective);
        assert_eq!(entered.len(), map.config.zones.len());
    }
}
