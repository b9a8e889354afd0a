use crate::config::{EnemyTier, Grade, Modifier, TdConfig, TowerKind};
use crate::path::PathCurve;
use glam::Vec2;
use sim_core::Timestamp;
use slotmap::{new_key_type, SlotMap};
use std::collections::VecDeque;

new_key_type! { pub struct TowerId; }
new_key_type! { pub struct EnemyId; }
new_key_type! { pub struct ProjectileId; }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    pub x: u16,
    pub y: u16,
}

impl Tile {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellState {
    #[default]
    Empty,
    Path,
    Tower(TowerId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    pub width: u16,
    pub height: u16,
    cells: Vec<CellState>,
}

impl Grid {
    /// Grid with every tile the curve passes near marked as path.
    pub fn new(config: &TdConfig, curve: &PathCurve) -> Self {
        let width = config.grid_width;
        let height = config.grid_height;
        let mut grid = Self {
            width,
            height,
            cells: vec![CellState::Empty; (width as usize) * (height as usize)],
        };

        let clearance = config.tile_size * config.path_clearance;
        for y in 0..height {
            for x in 0..width {
                let center = config.tile_center(x as f32, y as f32);
                if curve.is_near(center, clearance, config.path_check_stride) {
                    grid.set(Tile::new(x, y), CellState::Path);
                }
            }
        }
        grid
    }

    #[inline]
    pub fn idx(&self, tile: Tile) -> usize {
        (tile.y as usize) * (self.width as usize) + (tile.x as usize)
    }

    #[inline]
    pub fn in_bounds(&self, tile: Tile) -> bool {
        tile.x < self.width && tile.y < self.height
    }

    /// Out-of-bounds tiles read as empty; callers check bounds first.
    #[inline]
    pub fn get(&self, tile: Tile) -> CellState {
        if !self.in_bounds(tile) {
            return CellState::Empty;
        }
        self.cells[self.idx(tile)]
    }

    #[inline]
    pub fn set(&mut self, tile: Tile, state: CellState) {
        if self.in_bounds(tile) {
            let idx = self.idx(tile);
            self.cells[idx] = state;
        }
    }

    pub fn path_tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, CellState::Path))
            .map(|(idx, _)| {
                let w = self.width as usize;
                Tile::new((idx % w) as u16, (idx / w) as u16)
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slow {
    pub until: Timestamp,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub tier: EnemyTier,
    pub pos: Vec2,
    pub base_speed: f32,
    pub speed: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub radius: f32,
    /// Normalized progress along the path; authoritative over `pos`.
    pub path_t: f32,
    pub reward: u32,
    pub immune_slow: bool,
    pub slow: Option<Slow>,
}

impl Enemy {
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tower {
    pub kind: TowerKind,
    pub tile: Tile,
    pub pos: Vec2,
    pub range: f32,
    pub fire_rate: f64,
    /// Seconds until the next shot; may go negative while no target is in range.
    pub cooldown: f64,
    pub projectile_speed: f32,
    pub damage: i32,
    pub level: u32,
    pub modifier: Modifier,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProjectileKind {
    Instant,
    Single,
    Splash { radius: f32 },
    Slow { pct: f32, duration: f32 },
}

impl ProjectileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectileKind::Instant => "Instant",
            ProjectileKind::Single => "Single",
            ProjectileKind::Splash { .. } => "Splash",
            ProjectileKind::Slow { .. } => "Slow",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub pos: Vec2,
    /// Weak handle; the enemy may be gone by the time the projectile arrives.
    pub target: EnemyId,
    pub source: TowerId,
    pub speed: f32,
    pub damage: i32,
    pub alive: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledSpawn {
    pub at: Timestamp,
    pub enemy: Enemy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunResult {
    Clear,
    Over,
}

impl RunResult {
    pub fn as_str(self) -> &'static str {
        match self {
            RunResult::Clear => "CLEAR",
            RunResult::Over => "OVER",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the player to start the current round.
    Building,
    Combat,
    Over { result: RunResult, grade: Grade },
}

impl Phase {
    pub fn in_combat(self) -> bool {
        matches!(self, Phase::Combat)
    }

    pub fn is_over(self) -> bool {
        matches!(self, Phase::Over { .. })
    }
}

#[derive(Clone, Debug)]
pub struct World {
    pub towers: SlotMap<TowerId, Tower>,
    pub enemies: SlotMap<EnemyId, Enemy>,
    pub projectiles: SlotMap<ProjectileId, Projectile>,
    pub grid: Grid,
    /// Ordered by `at`.
    pub spawn_queue: VecDeque<ScheduledSpawn>,
}

impl World {
    pub fn new(grid: Grid) -> Self {
        Self {
            towers: SlotMap::with_key(),
            enemies: SlotMap::with_key(),
            projectiles: SlotMap::with_key(),
            grid,
            spawn_queue: VecDeque::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TdState {
    pub config: TdConfig,
    pub curve: PathCurve,
    pub world: World,
    pub cash: u32,
    pub lives: u32,
    /// 1-indexed.
    pub round: u32,
    pub phase: Phase,
    pub score: u32,
    pub selected: Option<TowerId>,
}

impl TdState {
    pub fn new(config: TdConfig) -> Self {
        let curve = PathCurve::build(&config.control_points(), config.sample_density);
        Self::with_curve(config, curve)
    }

    fn with_curve(config: TdConfig, curve: PathCurve) -> Self {
        let grid = Grid::new(&config, &curve);
        Self {
            world: World::new(grid),
            cash: config.start_cash,
            lives: config.start_lives,
            round: 1,
            phase: Phase::Building,
            score: 0,
            selected: None,
            curve,
            config,
        }
    }

    /// Back to the starting values; the curve is reused.
    pub fn reset(&mut self) {
        let curve = std::mem::take(&mut self.curve);
        *self = Self::with_curve(self.config.clone(), curve);
    }

    pub fn tower_at(&self, tile: Tile) -> Option<TowerId> {
        match self.world.grid.get(tile) {
            CellState::Tower(id) => Some(id),
            _ => None,
        }
    }
}
