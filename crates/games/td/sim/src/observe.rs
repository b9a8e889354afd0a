use crate::config::Modifier;
use crate::economy::{sell_refund, upgrade_cost};
use crate::world::{Phase, TdState};
use glam::Vec2;
use pathtd_types::{
    EnemyInfo, PhaseInfo, Point, ProjectileInfo, TdObservation, TileInfo, TowerInfo,
};
use slotmap::Key;

/// Stable string form of an arena key, as exposed to display clients.
pub fn key_string<K: Key>(key: K) -> String {
    key.data().as_ffi().to_string()
}

fn point(v: Vec2) -> Point {
    Point { x: v.x, y: v.y }
}

pub fn phase_info(state: &TdState) -> PhaseInfo {
    match state.phase {
        Phase::Building => PhaseInfo::Building,
        Phase::Combat => PhaseInfo::Combat {
            queued: state.world.spawn_queue.len() as u32,
        },
        Phase::Over { result, grade } => PhaseInfo::Over {
            result: result.as_str().to_string(),
            grade: grade.as_str().to_string(),
        },
    }
}

pub fn build_observation(state: &TdState) -> TdObservation {
    let config = &state.config;

    let towers = state
        .world
        .towers
        .iter()
        .map(|(id, tower)| {
            let (splash_radius, slow_pct, slow_duration) = match tower.modifier {
                Modifier::None => (None, None, None),
                Modifier::Splash { radius } => (Some(radius), None, None),
                Modifier::Slow { pct, duration } => (None, Some(pct), Some(duration)),
            };
            TowerInfo {
                id: key_string(id),
                tile: TileInfo {
                    x: tower.tile.x,
                    y: tower.tile.y,
                },
                pos: point(tower.pos),
                tower_type: tower.kind.as_str().to_string(),
                level: tower.level,
                damage: tower.damage,
                range: tower.range,
                fire_rate: tower.fire_rate as f32,
                splash_radius,
                slow_pct,
                slow_duration,
                upgrade_cost: upgrade_cost(config, tower.kind, tower.level),
                sell_refund: sell_refund(config, tower.kind, tower.level),
                selected: state.selected == Some(id),
            }
        })
        .collect();

    let enemies = state
        .world
        .enemies
        .iter()
        .map(|(id, enemy)| EnemyInfo {
            id: key_string(id),
            tier: enemy.tier.as_str().to_string(),
            pos: point(enemy.pos),
            radius: enemy.radius,
            hp: enemy.hp,
            max_hp: enemy.max_hp,
            path_t: enemy.path_t,
            slowed: enemy.slow.is_some(),
        })
        .collect();

    let projectiles = state
        .world
        .projectiles
        .iter()
        .filter(|(_, p)| p.alive)
        .map(|(id, p)| ProjectileInfo {
            id: key_string(id),
            kind: p.kind.as_str().to_string(),
            pos: point(p.pos),
        })
        .collect();

    TdObservation {
        grid_width: config.grid_width,
        grid_height: config.grid_height,
        tile_size: config.tile_size,

        cash: state.cash,
        lives: state.lives,
        score: state.score,

        round: state.round,
        rounds_total: config.rounds_total(),
        phase: phase_info(state),

        path: state.curve.points().iter().copied().map(point).collect(),

        towers,
        enemies,
        projectiles,
    }
}
