//! Per-frame simulation phases. `tick` runs them in order; each is public so tests can
//! drive a single phase against a hand-built state.

use crate::economy::grade_for;
use crate::events::TdEvent;
use crate::world::{
    Enemy, EnemyId, Phase, ProjectileId, ProjectileKind, RunResult, Slow, TdState, Tower,
    TowerId,
};
use glam::Vec2;
use sim_core::Timestamp;
use slotmap::SlotMap;

/// Enemies never sample the exact end of the curve; `path_t >= 1` is the leak signal.
const MAX_SAMPLE_T: f32 = 0.9999;

pub fn tick(state: &mut TdState, dt: f64, now: Timestamp, events: &mut Vec<TdEvent>) {
    if state.phase.is_over() {
        return;
    }

    intake_spawns(state, now, events);
    move_enemies(state, dt, now, events);
    if state.phase.is_over() {
        return;
    }

    fire_towers(state, dt, events);
    resolve_projectiles(state, dt, now, events);
    cleanup(state);
    update_round(state, events);
}

/// Moves every queued spawn that is due into the world.
pub fn intake_spawns(state: &mut TdState, now: Timestamp, events: &mut Vec<TdEvent>) {
    while state
        .world
        .spawn_queue
        .front()
        .is_some_and(|spawn| spawn.at <= now)
    {
        let Some(spawn) = state.world.spawn_queue.pop_front() else {
            break;
        };
        let tier = spawn.enemy.tier;
        let id = state.world.enemies.insert(spawn.enemy);
        events.push(TdEvent::EnemySpawned { id, tier });
    }
}

pub fn move_enemies(state: &mut TdState, dt: f64, now: Timestamp, events: &mut Vec<TdEvent>) {
    let total = state.curve.total_length();
    let mut leaked: Vec<EnemyId> = Vec::new();

    for (id, enemy) in state.world.enemies.iter_mut() {
        if let Some(slow) = enemy.slow {
            if now > slow.until {
                enemy.speed = enemy.base_speed;
                enemy.slow = None;
            }
        }

        enemy.path_t += enemy.speed * dt as f32 / total;
        enemy.pos = state.curve.sample_at(enemy.path_t.min(MAX_SAMPLE_T));

        if enemy.path_t >= 1.0 {
            leaked.push(id);
        }
    }

    for id in leaked {
        if state.world.enemies.remove(id).is_none() {
            continue;
        }
        state.lives = state.lives.saturating_sub(1);
        tracing::debug!(lives = state.lives, "enemy leaked");
        events.push(TdEvent::EnemyLeaked {
            id,
            lives_left: state.lives,
        });

        if state.lives == 0 {
            end_run(state, RunResult::Over, events);
            return;
        }
    }
}

/// Counts every cooldown down by `dt` and fires the towers that are ready and have a target.
pub fn fire_towers(state: &mut TdState, dt: f64, events: &mut Vec<TdEvent>) {
    let world = &mut state.world;

    for (tower_id, tower) in world.towers.iter_mut() {
        tower.cooldown -= dt;
        if tower.cooldown > 0.0 {
            continue;
        }

        // Cooldown stays at or below zero until something walks into range.
        let Some(target) = select_target(tower, &world.enemies) else {
            continue;
        };

        let projectile = tower.fire_at(tower_id, target);
        let id = world.projectiles.insert(projectile);
        tower.cooldown = 1.0 / tower.fire_rate;

        tracing::trace!(kind = tower.kind.as_str(), "tower fired");
        events.push(TdEvent::ProjectileFired {
            id,
            tower: tower_id,
            target,
        });
    }
}

/// Living enemy furthest along the path within the tower's reach; nearer wins a tie.
pub fn select_target(tower: &Tower, enemies: &SlotMap<EnemyId, Enemy>) -> Option<EnemyId> {
    let unlimited = tower.kind.ignores_range();
    let mut best: Option<(EnemyId, f32, f32)> = None;

    for (id, enemy) in enemies.iter() {
        if !enemy.is_alive() {
            continue;
        }
        let dist = tower.pos.distance(enemy.pos);
        if !unlimited && dist > tower.range {
            continue;
        }

        let dominated = match best {
            None => true,
            Some((_, best_t, best_dist)) => {
                enemy.path_t > best_t || (enemy.path_t == best_t && dist < best_dist)
            }
        };
        if dominated {
            best = Some((id, enemy.path_t, dist));
        }
    }

    best.map(|(id, _, _)| id)
}

pub fn resolve_projectiles(
    state: &mut TdState,
    dt: f64,
    now: Timestamp,
    events: &mut Vec<TdEvent>,
) {
    let ids: Vec<ProjectileId> = state.world.projectiles.keys().collect();
    let hit_slack = state.config.hit_slack;

    for id in ids {
        let Some(projectile) = state.world.projectiles.get(id).copied() else {
            continue;
        };
        if !projectile.alive {
            continue;
        }

        let target = match state.world.enemies.get(projectile.target) {
            Some(enemy) if enemy.is_alive() => (enemy.pos, enemy.radius),
            _ => {
                if let Some(p) = state.world.projectiles.get_mut(id) {
                    p.alive = false;
                }
                events.push(TdEvent::ProjectileMissed { id });
                continue;
            }
        };
        let (target_pos, target_radius) = target;

        let arrived = match projectile.kind {
            ProjectileKind::Instant => true,
            _ => projectile.pos.distance(target_pos) < target_radius + hit_slack,
        };

        if !arrived {
            if let Some(p) = state.world.projectiles.get_mut(id) {
                p.pos = step_toward(p.pos, target_pos, p.speed * dt as f32);
            }
            continue;
        }

        if let Some(p) = state.world.projectiles.get_mut(id) {
            p.alive = false;
        }

        let source = projectile.source;
        let damage = projectile.damage;
        match projectile.kind {
            ProjectileKind::Instant | ProjectileKind::Single => {
                damage_enemy(state, projectile.target, damage, source, events);
            }
            ProjectileKind::Splash { radius } => {
                let victims: Vec<EnemyId> = state
                    .world
                    .enemies
                    .iter()
                    .filter(|(_, e)| e.is_alive() && e.pos.distance(target_pos) <= radius)
                    .map(|(victim, _)| victim)
                    .collect();
                for victim in victims {
                    damage_enemy(state, victim, damage, source, events);
                }
            }
            ProjectileKind::Slow { pct, duration } => {
                let killed = damage_enemy(state, projectile.target, damage, source, events);
                if !killed {
                    apply_slow(state, projectile.target, pct, duration, now);
                }
            }
        }
    }
}

fn step_toward(from: Vec2, to: Vec2, max_step: f32) -> Vec2 {
    let delta = to - from;
    let len = delta.length();
    if len <= max_step || len == 0.0 {
        return to;
    }
    from + delta / len * max_step
}

/// Applies damage and credits the kill. Returns whether this hit killed the enemy.
fn damage_enemy(
    state: &mut TdState,
    id: EnemyId,
    damage: i32,
    by: TowerId,
    events: &mut Vec<TdEvent>,
) -> bool {
    let Some(enemy) = state.world.enemies.get_mut(id) else {
        return false;
    };
    if !enemy.is_alive() {
        return false;
    }

    enemy.hp -= damage;
    if enemy.is_alive() {
        return false;
    }

    let reward = enemy.reward;
    let tier = enemy.tier;
    state.cash += reward;
    state.score += reward;
    events.push(TdEvent::EnemyKilled {
        id,
        tier,
        reward,
        by,
    });
    true
}

/// Overwrites any earlier slow. Immune tiers are untouched.
fn apply_slow(state: &mut TdState, id: EnemyId, pct: f32, duration: f32, now: Timestamp) {
    let Some(enemy) = state.world.enemies.get_mut(id) else {
        return;
    };
    if enemy.immune_slow {
        return;
    }

    enemy.speed = enemy.base_speed * (1.0 - pct);
    enemy.slow = Some(Slow {
        until: now.after(duration as f64),
    });
}

/// Drops spent projectiles and dead enemies.
pub fn cleanup(state: &mut TdState) {
    state.world.projectiles.retain(|_, p| p.alive);
    state.world.enemies.retain(|_, e| e.is_alive());
}

/// Ends combat once nothing is queued or alive, paying the round bonus.
pub fn update_round(state: &mut TdState, events: &mut Vec<TdEvent>) {
    if !state.phase.in_combat() {
        return;
    }
    if !state.world.spawn_queue.is_empty() || !state.world.enemies.is_empty() {
        return;
    }

    let round = state.round;
    let bonus = round * state.config.round_bonus_per_round;
    state.cash += bonus;
    tracing::info!(round, bonus, cash = state.cash, "round cleared");
    events.push(TdEvent::RoundCleared { round, bonus });

    if round >= state.config.rounds_total() {
        end_run(state, RunResult::Clear, events);
    } else {
        state.round += 1;
        state.phase = Phase::Building;
    }
}

/// Freezes the run with a grade taken from the current score.
pub fn end_run(state: &mut TdState, result: RunResult, events: &mut Vec<TdEvent>) {
    let grade = grade_for(&state.config.grade_thresholds, state.score);
    state.phase = Phase::Over { result, grade };
    state.world.spawn_queue.clear();

    tracing::info!(
        result = result.as_str(),
        score = state.score,
        grade = grade.as_str(),
        "run ended"
    );
    events.push(TdEvent::GameEnded {
        result,
        score: state.score,
        grade,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnemyTier, Grade, TdConfig, TowerKind};
    use crate::world::{Projectile, Tile};

    fn state() -> TdState {
        TdState::new(TdConfig::default())
    }

    fn add_enemy(state: &mut TdState, tier: EnemyTier, pos: Vec2, path_t: f32) -> EnemyId {
        let stats = state.config.tier_stats(tier);
        let mut enemy = Enemy::spawn(tier, stats, state.config.enemy_radius, pos);
        enemy.path_t = path_t;
        state.world.enemies.insert(enemy)
    }

    fn add_tower(state: &mut TdState, kind: TowerKind, pos: Vec2) -> TowerId {
        let spec = state.config.tower_spec(kind);
        let tower = Tower::build(kind, spec, Tile::new(0, 9), pos);
        state.world.towers.insert(tower)
    }

    fn fire(state: &mut TdState, tower: TowerId, target: EnemyId, at: Vec2) -> ProjectileId {
        let mut projectile: Projectile = state.world.towers[tower].fire_at(tower, target);
        projectile.pos = at;
        state.world.projectiles.insert(projectile)
    }

    #[test]
    fn target_furthest_along_then_nearest() {
        let mut state = state();
        let tower_id = add_tower(&mut state, TowerKind::Rapid, Vec2::ZERO);
        let far = add_enemy(&mut state, EnemyTier::Red, Vec2::new(100.0, 0.0), 0.5);
        let near = add_enemy(&mut state, EnemyTier::Red, Vec2::new(50.0, 0.0), 0.5);

        let tower = &state.world.towers[tower_id];
        assert_eq!(select_target(tower, &state.world.enemies), Some(near));

        state.world.enemies[far].path_t = 0.6;
        let tower = &state.world.towers[tower_id];
        assert_eq!(select_target(tower, &state.world.enemies), Some(far));
    }

    #[test]
    fn target_respects_range_except_for_sniper() {
        let mut state = state();
        let rapid = add_tower(&mut state, TowerKind::Rapid, Vec2::ZERO);
        let sniper = add_tower(&mut state, TowerKind::Sniper, Vec2::ZERO);
        let enemy = add_enemy(&mut state, EnemyTier::Red, Vec2::new(20_000.0, 0.0), 0.1);

        assert_eq!(select_target(&state.world.towers[rapid], &state.world.enemies), None);
        assert_eq!(
            select_target(&state.world.towers[sniper], &state.world.enemies),
            Some(enemy)
        );
    }

    #[test]
    fn cooldown_gates_firing() {
        let mut state = state();
        add_tower(&mut state, TowerKind::Rapid, Vec2::ZERO);
        add_enemy(&mut state, EnemyTier::Pink, Vec2::new(10.0, 0.0), 0.2);
        let mut events = Vec::new();

        fire_towers(&mut state, 0.1, &mut events);
        assert_eq!(state.world.projectiles.len(), 1);

        // 1 / 1.6 = 0.625 s between shots
        fire_towers(&mut state, 0.5, &mut events);
        assert_eq!(state.world.projectiles.len(), 1);
        fire_towers(&mut state, 0.2, &mut events);
        assert_eq!(state.world.projectiles.len(), 2);
    }

    #[test]
    fn splash_hits_each_enemy_in_radius_once() {
        let mut state = state();
        let tower = add_tower(&mut state, TowerKind::Splash, Vec2::ZERO);
        let center = Vec2::new(300.0, 300.0);
        let target = add_enemy(&mut state, EnemyTier::Pink, center, 0.3);
        let close = add_enemy(&mut state, EnemyTier::Pink, center + Vec2::new(30.0, 0.0), 0.3);
        let edge = add_enemy(&mut state, EnemyTier::Pink, center + Vec2::new(0.0, 64.0), 0.3);
        let outside = add_enemy(&mut state, EnemyTier::Pink, center + Vec2::new(65.0, 0.0), 0.3);
        fire(&mut state, tower, target, center);

        let mut events = Vec::new();
        resolve_projectiles(&mut state, 0.016, Timestamp::ZERO, &mut events);

        for id in [target, close, edge] {
            assert_eq!(state.world.enemies[id].hp, 140);
        }
        assert_eq!(state.world.enemies[outside].hp, 160);
    }

    #[test]
    fn splash_credits_each_victim() {
        let mut state = state();
        let tower = add_tower(&mut state, TowerKind::Splash, Vec2::ZERO);
        let center = Vec2::new(300.0, 300.0);
        let target = add_enemy(&mut state, EnemyTier::Red, center, 0.3);
        let other = add_enemy(&mut state, EnemyTier::Blue, center + Vec2::new(10.0, 0.0), 0.3);
        state.world.enemies[target].hp = 5;
        state.world.enemies[other].hp = 5;
        fire(&mut state, tower, target, center);

        let mut events = Vec::new();
        resolve_projectiles(&mut state, 0.016, Timestamp::ZERO, &mut events);
        cleanup(&mut state);

        assert!(state.world.enemies.is_empty());
        assert_eq!(state.cash, 200 + 5 + 6);
        assert_eq!(state.score, 11);
        let kills = events
            .iter()
            .filter(|e| matches!(e, TdEvent::EnemyKilled { .. }))
            .count();
        assert_eq!(kills, 2);
    }

    #[test]
    fn slow_applies_then_expires() {
        let mut state = state();
        let tower = add_tower(&mut state, TowerKind::Frost, Vec2::ZERO);
        let pos = Vec2::new(100.0, 100.0);
        let red = add_enemy(&mut state, EnemyTier::Red, pos, 0.3);
        fire(&mut state, tower, red, pos);

        let now = Timestamp::from_secs(10.0);
        let mut events = Vec::new();
        resolve_projectiles(&mut state, 0.016, now, &mut events);

        let enemy = &state.world.enemies[red];
        assert_eq!(enemy.hp, 22);
        assert!((enemy.speed - 52.0).abs() < 1e-4);
        let slow = enemy.slow.expect("slow applied");
        assert!((slow.until.as_secs() - 11.8).abs() < 1e-6);

        move_enemies(&mut state, 0.0, Timestamp::from_secs(11.7), &mut events);
        assert!(state.world.enemies[red].slow.is_some());

        move_enemies(&mut state, 0.0, Timestamp::from_secs(11.81), &mut events);
        let enemy = &state.world.enemies[red];
        assert!(enemy.slow.is_none());
        assert_eq!(enemy.speed, 80.0);
    }

    #[test]
    fn later_slow_replaces_earlier_one() {
        let mut state = state();
        let weak = add_tower(&mut state, TowerKind::Frost, Vec2::ZERO);
        let strong = add_tower(&mut state, TowerKind::Frost, Vec2::ZERO);
        let upgraded = state.world.towers[strong]
            .upgraded(state.config.tower_spec(TowerKind::Frost))
            .upgraded(state.config.tower_spec(TowerKind::Frost));
        state.world.towers[strong] = upgraded;

        let pos = Vec2::new(100.0, 100.0);
        let blue = add_enemy(&mut state, EnemyTier::Blue, pos, 0.3);
        let mut events = Vec::new();

        fire(&mut state, weak, blue, pos);
        resolve_projectiles(&mut state, 0.016, Timestamp::from_secs(10.0), &mut events);
        cleanup(&mut state);
        let first = state.world.enemies[blue].slow.expect("first slow");
        assert!((first.until.as_secs() - 11.8).abs() < 1e-6);

        // level 3: 45% for 2.2 s
        fire(&mut state, strong, blue, pos);
        resolve_projectiles(&mut state, 0.016, Timestamp::from_secs(10.5), &mut events);

        let enemy = &state.world.enemies[blue];
        assert_eq!(enemy.hp, 45 - 8 - 8);
        assert!((enemy.speed - 90.0 * 0.55).abs() < 1e-3);
        let slow = enemy.slow.expect("second slow");
        assert!((slow.until.as_secs() - 12.7).abs() < 1e-5);
    }

    #[test]
    fn immune_tier_ignores_slow() {
        let mut state = state();
        let tower = add_tower(&mut state, TowerKind::Frost, Vec2::ZERO);
        let pos = Vec2::new(100.0, 100.0);
        let yellow = add_enemy(&mut state, EnemyTier::Yellow, pos, 0.3);
        fire(&mut state, tower, yellow, pos);

        let mut events = Vec::new();
        resolve_projectiles(&mut state, 0.016, Timestamp::ZERO, &mut events);

        let enemy = &state.world.enemies[yellow];
        assert_eq!(enemy.hp, 102);
        assert_eq!(enemy.speed, 110.0);
        assert!(enemy.slow.is_none());
    }

    #[test]
    fn missing_target_is_a_miss() {
        let mut state = state();
        let tower = add_tower(&mut state, TowerKind::Rapid, Vec2::ZERO);
        let enemy = add_enemy(&mut state, EnemyTier::Red, Vec2::new(50.0, 0.0), 0.3);
        let projectile = fire(&mut state, tower, enemy, Vec2::ZERO);
        state.world.enemies.remove(enemy);

        let mut events = Vec::new();
        resolve_projectiles(&mut state, 0.016, Timestamp::ZERO, &mut events);
        cleanup(&mut state);

        assert!(state.world.projectiles.is_empty());
        assert_eq!(events, vec![TdEvent::ProjectileMissed { id: projectile }]);
        assert_eq!(state.cash, 200);
    }

    #[test]
    fn homing_projectile_closes_in() {
        let mut state = state();
        let tower = add_tower(&mut state, TowerKind::Rapid, Vec2::ZERO);
        let enemy = add_enemy(&mut state, EnemyTier::Red, Vec2::new(100.0, 0.0), 0.3);
        let projectile = fire(&mut state, tower, enemy, Vec2::ZERO);

        let mut events = Vec::new();
        // 320 px/s for 0.1 s
        resolve_projectiles(&mut state, 0.1, Timestamp::ZERO, &mut events);
        let pos = state.world.projectiles[projectile].pos;
        assert!((pos.x - 32.0).abs() < 1e-3);
        assert_eq!(state.world.enemies[enemy].hp, 30);

        // 68 px left; next step lands inside radius + slack
        resolve_projectiles(&mut state, 0.2, Timestamp::ZERO, &mut events);
        resolve_projectiles(&mut state, 0.0, Timestamp::ZERO, &mut events);
        assert_eq!(state.world.enemies[enemy].hp, 14);
        assert!(!state.world.projectiles[projectile].alive);
    }

    #[test]
    fn leak_costs_a_life_and_last_life_ends_the_run() {
        let mut state = state();
        state.phase = Phase::Combat;
        state.lives = 2;
        let start = state.curve.start();
        add_enemy(&mut state, EnemyTier::Red, start, 0.9999);
        let mut events = Vec::new();

        move_enemies(&mut state, 1.0, Timestamp::ZERO, &mut events);
        assert_eq!(state.lives, 1);
        assert!(state.world.enemies.is_empty());
        assert!(!state.phase.is_over());

        add_enemy(&mut state, EnemyTier::Red, start, 0.9999);
        move_enemies(&mut state, 1.0, Timestamp::ZERO, &mut events);
        assert_eq!(state.lives, 0);
        assert_eq!(
            state.phase,
            Phase::Over {
                result: RunResult::Over,
                grade: Grade::D
            }
        );
    }

    #[test]
    fn round_clears_when_queue_and_field_are_empty() {
        let mut state = state();
        state.phase = Phase::Combat;
        let mut events = Vec::new();

        update_round(&mut state, &mut events);

        assert_eq!(state.round, 2);
        assert_eq!(state.phase, Phase::Building);
        assert_eq!(state.cash, 210);
        assert_eq!(events, vec![TdEvent::RoundCleared { round: 1, bonus: 10 }]);
    }

    #[test]
    fn final_round_clear_ends_the_run() {
        let mut state = state();
        state.phase = Phase::Combat;
        state.round = 10;
        state.score = 470;
        let mut events = Vec::new();

        update_round(&mut state, &mut events);

        assert_eq!(state.cash, 300);
        assert_eq!(
            state.phase,
            Phase::Over {
                result: RunResult::Clear,
                grade: Grade::A
            }
        );
    }
}
