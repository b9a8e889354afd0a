pub mod actions;
pub mod catalog;
pub mod config;
pub mod economy;
pub mod errors;
pub mod events;
pub mod game;
pub mod observe;
pub mod path;
pub mod systems;
pub mod waves;
pub mod world;

pub use actions::TdAction;
pub use config::{EnemyTier, Grade, TdConfig, TowerKind};
pub use errors::CommandError;
pub use events::TdEvent;
pub use game::TdGame;
pub use path::PathCurve;
pub use world::{EnemyId, Phase, ProjectileId, RunResult, TdState, Tile, TowerId};
