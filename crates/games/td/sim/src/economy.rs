use crate::config::{Grade, GradeThreshold, TdConfig, TowerKind};
use crate::errors::CommandError;
use crate::events::TdEvent;
use crate::world::{CellState, TdState, Tile, Tower, TowerId};

/// Price of taking a tower of `kind` from `level` to `level + 1`.
pub fn upgrade_cost(config: &TdConfig, kind: TowerKind, level: u32) -> u32 {
    let price = config.tower_spec(kind).price as f64;
    let exp = level.saturating_sub(1) as i32;
    (price * config.upgrade_growth.powi(exp)).round() as u32
}

/// Refund for selling a tower of `kind` at `level`.
///
/// Everything paid so far is rebuilt from the level alone: the base price plus the
/// cost of every upgrade up to it.
pub fn sell_refund(config: &TdConfig, kind: TowerKind, level: u32) -> u32 {
    let price = config.tower_spec(kind).price;
    let upgrades: u32 = (1..level).map(|l| upgrade_cost(config, kind, l)).sum();
    ((price + upgrades) as f64 * config.sell_ratio).round() as u32
}

/// First threshold the score meets, scanning from the top; D if none match.
pub fn grade_for(thresholds: &[GradeThreshold], score: u32) -> Grade {
    thresholds
        .iter()
        .find(|t| score >= t.min_score)
        .map(|t| t.grade)
        .unwrap_or(Grade::D)
}

/// Tower on `tile`, if any.
pub fn select_tower(state: &TdState, tile: Tile) -> Option<TowerId> {
    state.tower_at(tile)
}

pub fn try_place_tower(
    state: &mut TdState,
    tile: Tile,
    kind: TowerKind,
    events: &mut Vec<TdEvent>,
) -> Result<TowerId, CommandError> {
    if state.phase.is_over() {
        return Err(CommandError::GameOver);
    }
    if state.phase.in_combat() && !state.config.build_during_combat {
        return Err(CommandError::CombatInProgress);
    }

    let grid = &state.world.grid;
    let (x, y) = (tile.x, tile.y);
    if !grid.in_bounds(tile) {
        return Err(CommandError::OutOfBounds { x, y });
    }
    match grid.get(tile) {
        CellState::Path => return Err(CommandError::OnPath { x, y }),
        CellState::Tower(_) => return Err(CommandError::Occupied { x, y }),
        CellState::Empty => {}
    }

    let spec = state.config.tower_spec(kind);
    let cost = spec.price;
    if state.cash < cost {
        return Err(CommandError::InsufficientCash {
            cost,
            have: state.cash,
        });
    }

    let pos = state.config.tile_center(x as f32, y as f32);
    let tower = Tower::build(kind, spec, tile, pos);
    let id = state.world.towers.insert(tower);
    state.world.grid.set(tile, CellState::Tower(id));
    state.cash -= cost;
    state.selected = Some(id);

    events.push(TdEvent::TowerPlaced {
        id,
        tile,
        kind,
        cost,
    });
    Ok(id)
}

/// Returns the price paid.
pub fn try_upgrade_tower(
    state: &mut TdState,
    tower_id: TowerId,
    events: &mut Vec<TdEvent>,
) -> Result<u32, CommandError> {
    if state.phase.is_over() {
        return Err(CommandError::GameOver);
    }
    let Some(tower) = state.world.towers.get(tower_id) else {
        return Err(CommandError::UnknownTower);
    };

    let cost = upgrade_cost(&state.config, tower.kind, tower.level);
    if state.cash < cost {
        return Err(CommandError::InsufficientCash {
            cost,
            have: state.cash,
        });
    }

    let next = tower.upgraded(state.config.tower_spec(tower.kind));
    let level = next.level;
    state.world.towers[tower_id] = next;
    state.cash -= cost;

    events.push(TdEvent::TowerUpgraded {
        id: tower_id,
        level,
        cost,
    });
    Ok(cost)
}

/// Returns the refund credited.
pub fn try_sell_tower(
    state: &mut TdState,
    tower_id: TowerId,
    events: &mut Vec<TdEvent>,
) -> Result<u32, CommandError> {
    if state.phase.is_over() {
        return Err(CommandError::GameOver);
    }
    let Some(tower) = state.world.towers.remove(tower_id) else {
        return Err(CommandError::UnknownTower);
    };

    let refund = sell_refund(&state.config, tower.kind, tower.level);
    state.cash += refund;
    state.world.grid.set(tower.tile, CellState::Empty);
    if state.selected == Some(tower_id) {
        state.selected = None;
    }

    events.push(TdEvent::TowerSold {
        id: tower_id,
        tile: tower.tile,
        refund,
    });
    Ok(refund)
}
