use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Cheap, fast single-target shooter.
    Rapid,
    /// Area damage around the impact point.
    Splash,
    /// Light damage plus a temporary slow.
    Frost,
    /// Unlimited range, instant hit.
    Sniper,
}

impl TowerKind {
    pub const ALL: [TowerKind; 4] = [
        TowerKind::Rapid,
        TowerKind::Splash,
        TowerKind::Frost,
        TowerKind::Sniper,
    ];

    pub fn ignores_range(self) -> bool {
        matches!(self, TowerKind::Sniper)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TowerKind::Rapid => "Rapid",
            TowerKind::Splash => "Splash",
            TowerKind::Frost => "Frost",
            TowerKind::Sniper => "Sniper",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnemyTier {
    Red,
    Blue,
    Green,
    Yellow,
    Pink,
}

impl EnemyTier {
    pub fn as_str(self) -> &'static str {
        match self {
            EnemyTier::Red => "RED",
            EnemyTier::Blue => "BLUE",
            EnemyTier::Green => "GREEN",
            EnemyTier::Yellow => "YELLOW",
            EnemyTier::Pink => "PINK",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific payload carried by a tower and copied onto its projectiles.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Modifier {
    None,
    Splash { radius: f32 },
    Slow { pct: f32, duration: f32 },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TowerSpec {
    pub price: u32,
    pub range: f32,
    /// Shots per second.
    pub fire_rate: f64,
    pub projectile_speed: f32,
    pub damage: i32,
    pub modifier: Modifier,
    /// Fire-rate multiplier applied on every upgrade; 1.0 keeps the rate.
    #[serde(default = "unit_growth")]
    pub rate_growth: f64,
}

fn unit_growth() -> f64 {
    1.0
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TierStats {
    pub hp: i32,
    /// World units per second along the path.
    pub speed: f32,
    pub reward: u32,
    pub immune_slow: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WavePlan {
    pub tier: EnemyTier,
    pub count: u32,
    /// Seconds between consecutive spawns.
    pub gap: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundPlan {
    pub waves: Vec<WavePlan>,
}

impl RoundPlan {
    pub fn enemy_count(&self) -> u32 {
        self.waves.iter().map(|w| w.count).sum()
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GradeThreshold {
    pub min_score: u32,
    pub grade: Grade,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TdConfig {
    pub grid_width: u16,
    pub grid_height: u16,
    /// Side of one tile in world units.
    pub tile_size: f32,

    /// Path control points in tile units; fractional values are allowed.
    pub control_tiles: Vec<Vec2>,
    pub sample_density: usize,
    /// Fraction of a tile within which a tile center counts as on the path.
    pub path_clearance: f32,
    pub path_check_stride: usize,

    pub start_cash: u32,
    pub start_lives: u32,

    pub enemy_radius: f32,
    /// Extra distance beyond the enemy radius at which homing projectiles connect.
    pub hit_slack: f32,

    // Economy
    pub upgrade_growth: f64,
    pub sell_ratio: f64,
    pub round_bonus_per_round: u32,
    pub build_during_combat: bool,

    // Tower specs
    pub rapid_spec: TowerSpec,
    pub splash_spec: TowerSpec,
    pub frost_spec: TowerSpec,
    pub sniper_spec: TowerSpec,

    // Enemy tiers
    pub red_stats: TierStats,
    pub blue_stats: TierStats,
    pub green_stats: TierStats,
    pub yellow_stats: TierStats,
    pub pink_stats: TierStats,

    pub rounds: Vec<RoundPlan>,
    /// Descending by `min_score`.
    pub grade_thresholds: Vec<GradeThreshold>,
}

impl TdConfig {
    pub fn tower_spec(&self, kind: TowerKind) -> &TowerSpec {
        match kind {
            TowerKind::Rapid => &self.rapid_spec,
            TowerKind::Splash => &self.splash_spec,
            TowerKind::Frost => &self.frost_spec,
            TowerKind::Sniper => &self.sniper_spec,
        }
    }

    pub fn tier_stats(&self, tier: EnemyTier) -> &TierStats {
        match tier {
            EnemyTier::Red => &self.red_stats,
            EnemyTier::Blue => &self.blue_stats,
            EnemyTier::Green => &self.green_stats,
            EnemyTier::Yellow => &self.yellow_stats,
            EnemyTier::Pink => &self.pink_stats,
        }
    }

    /// Plan for a 1-indexed round.
    pub fn round_plan(&self, round: u32) -> Option<&RoundPlan> {
        let idx = (round as usize).checked_sub(1)?;
        self.rounds.get(idx)
    }

    pub fn rounds_total(&self) -> u32 {
        self.rounds.len() as u32
    }

    /// Center of a tile in world units.
    pub fn tile_center(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(
            x * self.tile_size + self.tile_size / 2.0,
            y * self.tile_size + self.tile_size / 2.0,
        )
    }

    pub fn control_points(&self) -> Vec<Vec2> {
        self.control_tiles
            .iter()
            .map(|t| self.tile_center(t.x, t.y))
            .collect()
    }
}

fn wave(tier: EnemyTier, count: u32, gap: f64) -> WavePlan {
    WavePlan { tier, count, gap }
}

fn round(waves: Vec<WavePlan>) -> RoundPlan {
    RoundPlan { waves }
}

impl Default for TdConfig {
    fn default() -> Self {
        use EnemyTier::*;

        Self {
            grid_width: 16,
            grid_height: 10,
            tile_size: 56.0,

            control_tiles: vec![
                Vec2::new(0.0, 2.0),
                Vec2::new(3.0, 2.0),
                Vec2::new(5.0, 6.0),
                Vec2::new(8.0, 7.0),
                Vec2::new(11.0, 3.0),
                Vec2::new(14.0, 4.0),
                Vec2::new(15.5, 4.5),
            ],
            sample_density: 900,
            path_clearance: 0.45,
            path_check_stride: 6,

            start_cash: 200,
            start_lives: 25,

            enemy_radius: 16.0,
            hit_slack: 4.0,

            upgrade_growth: 1.5,
            sell_ratio: 0.7,
            round_bonus_per_round: 10,
            build_during_combat: false,

            rapid_spec: TowerSpec {
                price: 60,
                range: 170.0,
                fire_rate: 1.6,
                projectile_speed: 320.0,
                damage: 16,
                modifier: Modifier::None,
                rate_growth: 1.0,
            },
            splash_spec: TowerSpec {
                price: 100,
                range: 150.0,
                fire_rate: 0.9,
                projectile_speed: 260.0,
                damage: 20,
                modifier: Modifier::Splash { radius: 64.0 },
                rate_growth: 1.05,
            },
            frost_spec: TowerSpec {
                price: 90,
                range: 140.0,
                fire_rate: 0.8,
                projectile_speed: 220.0,
                damage: 8,
                modifier: Modifier::Slow {
                    pct: 0.35,
                    duration: 1.8,
                },
                rate_growth: 1.0,
            },
            sniper_spec: TowerSpec {
                price: 120,
                range: 9999.0,
                fire_rate: 0.7,
                projectile_speed: 9999.0,
                damage: 48,
                modifier: Modifier::None,
                rate_growth: 1.08,
            },

            red_stats: TierStats { hp: 30, speed: 80.0, reward: 5, immune_slow: false },
            blue_stats: TierStats { hp: 45, speed: 90.0, reward: 6, immune_slow: false },
            green_stats: TierStats { hp: 70, speed: 100.0, reward: 7, immune_slow: false },
            yellow_stats: TierStats { hp: 110, speed: 110.0, reward: 8, immune_slow: true },
            pink_stats: TierStats { hp: 160, speed: 120.0, reward: 10, immune_slow: true },

            rounds: vec![
                round(vec![wave(Red, 10, 0.30)]),
                round(vec![wave(Blue, 12, 0.40)]),
                round(vec![wave(Red, 8, 0.30), wave(Blue, 8, 0.40)]),
                round(vec![wave(Green, 14, 0.70)]),
                round(vec![wave(Blue, 10, 0.70), wave(Green, 10, 0.50)]),
                round(vec![wave(Yellow, 14, 0.60)]),
                round(vec![wave(Green, 10, 0.60), wave(Yellow, 10, 0.58)]),
                round(vec![wave(Pink, 12, 0.55)]),
                round(vec![
                    wave(Blue, 8, 0.60),
                    wave(Green, 8, 0.58),
                    wave(Yellow, 8, 0.56),
                ]),
                round(vec![wave(Yellow, 10, 0.54), wave(Pink, 18, 0.50)]),
            ],
            grade_thresholds: vec![
                GradeThreshold { min_score: 520, grade: Grade::S },
                GradeThreshold { min_score: 460, grade: Grade::A },
                GradeThreshold { min_score: 360, grade: Grade::B },
                GradeThreshold { min_score: 220, grade: Grade::C },
                GradeThreshold { min_score: 0, grade: Grade::D },
            ],
        }
    }
}
