//! Canonical serializable types for the path tower defense game.
//!
//! Produced by `sim_pathtd` as a read-only snapshot for display clients. Nothing in
//! here is fed back into the simulation.

use serde::{Deserialize, Serialize};

/// Point in world units (pixels of the reference board).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Grid tile coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct TileInfo {
    pub x: u16,
    pub y: u16,
}

/// Where the run currently is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(tag = "type")]
pub enum PhaseInfo {
    /// Between rounds; towers may be placed.
    Building,
    /// Enemies are spawning or still on the path.
    Combat {
        /// Enemies still waiting in the spawn queue.
        queued: u32,
    },
    /// Terminal state.
    Over {
        /// `"CLEAR"` or `"OVER"`.
        result: String,
        /// Letter grade derived from the final score.
        grade: String,
    },
}

impl Default for PhaseInfo {
    fn default() -> Self {
        Self::Building
    }
}

/// Information about a tower.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct TowerInfo {
    pub id: String,
    pub tile: TileInfo,
    pub pos: Point,
    pub tower_type: String,
    pub level: u32,
    pub damage: i32,
    pub range: f32,
    pub fire_rate: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splash_radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slow_pct: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slow_duration: Option<f32>,
    pub upgrade_cost: u32,
    pub sell_refund: u32,
    pub selected: bool,
}

/// Information about an enemy on the path.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct EnemyInfo {
    pub id: String,
    pub tier: String,
    pub pos: Point,
    pub radius: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub path_t: f32,
    pub slowed: bool,
}

/// Information about a projectile in flight.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ProjectileInfo {
    pub id: String,
    pub kind: String,
    pub pos: Point,
}

/// Full game state observation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct TdObservation {
    pub grid_width: u16,
    pub grid_height: u16,
    pub tile_size: f32,

    pub cash: u32,
    pub lives: u32,
    pub score: u32,

    pub round: u32,
    pub rounds_total: u32,
    pub phase: PhaseInfo,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Point>,

    pub towers: Vec<TowerInfo>,
    pub enemies: Vec<EnemyInfo>,
    pub projectiles: Vec<ProjectileInfo>,
}

/// JSON schema of [`TdObservation`], for clients that validate snapshots.
#[cfg(feature = "schema")]
pub fn observation_schema() -> schemars::Schema {
    schemars::schema_for!(TdObservation)
}
