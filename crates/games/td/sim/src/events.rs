use crate::config::{EnemyTier, Grade, TowerKind};
use crate::errors::CommandError;
use crate::world::{EnemyId, ProjectileId, RunResult, Tile, TowerId};

#[derive(Clone, Debug, PartialEq)]
pub enum TdEvent {
    RoundStarted {
        round: u32,
        enemies: u32,
    },
    EnemySpawned {
        id: EnemyId,
        tier: EnemyTier,
    },
    EnemyKilled {
        id: EnemyId,
        tier: EnemyTier,
        reward: u32,
        by: TowerId,
    },
    EnemyLeaked {
        id: EnemyId,
        lives_left: u32,
    },
    ProjectileFired {
        id: ProjectileId,
        tower: TowerId,
        target: EnemyId,
    },
    /// The projectile's target was already gone.
    ProjectileMissed {
        id: ProjectileId,
    },
    TowerPlaced {
        id: TowerId,
        tile: Tile,
        kind: TowerKind,
        cost: u32,
    },
    TowerSelected {
        id: TowerId,
    },
    TowerUpgraded {
        id: TowerId,
        level: u32,
        cost: u32,
    },
    TowerSold {
        id: TowerId,
        tile: Tile,
        refund: u32,
    },
    RoundCleared {
        round: u32,
        bonus: u32,
    },
    GameEnded {
        result: RunResult,
        score: u32,
        grade: Grade,
    },
    GameReset,
    CommandRejected {
        reason: CommandError,
    },
}
