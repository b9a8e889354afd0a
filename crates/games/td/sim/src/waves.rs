use crate::errors::CommandError;
use crate::events::TdEvent;
use crate::world::{Enemy, Phase, ScheduledSpawn, TdState};
use sim_core::Timestamp;
use std::collections::VecDeque;

/// Queues every enemy of the current round and enters combat.
///
/// Spawn times start at `now` and advance by each wave's gap after every enemy; later
/// waves continue from where the previous one stopped. Returns the number queued.
pub fn spawn_wave(
    state: &mut TdState,
    now: Timestamp,
    events: &mut Vec<TdEvent>,
) -> Result<u32, CommandError> {
    match state.phase {
        Phase::Over { .. } => return Err(CommandError::GameOver),
        Phase::Combat => return Err(CommandError::CombatInProgress),
        Phase::Building => {}
    }

    let round = state.round;
    let Some(plan) = state.config.round_plan(round) else {
        return Err(CommandError::NoRoundsLeft);
    };

    let start = state.curve.start();
    let mut queue = VecDeque::with_capacity(plan.enemy_count() as usize);
    let mut cursor = now;
    for wave in &plan.waves {
        let stats = state.config.tier_stats(wave.tier);
        for _ in 0..wave.count {
            queue.push_back(ScheduledSpawn {
                at: cursor,
                enemy: Enemy::spawn(wave.tier, stats, state.config.enemy_radius, start),
            });
            cursor = cursor.after(wave.gap);
        }
    }

    let enemies = queue.len() as u32;
    state.world.spawn_queue = queue;
    state.phase = Phase::Combat;

    tracing::info!(round, enemies, "round started");
    events.push(TdEvent::RoundStarted { round, enemies });
    Ok(enemies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnemyTier, TdConfig};

    #[test]
    fn first_round_is_evenly_spaced() {
        let mut state = TdState::new(TdConfig::default());
        let mut events = Vec::new();
        let now = Timestamp::from_secs(5.0);

        assert_eq!(spawn_wave(&mut state, now, &mut events), Ok(10));
        assert!(state.phase.in_combat());

        let queue = &state.world.spawn_queue;
        assert_eq!(queue.len(), 10);
        for (i, spawn) in queue.iter().enumerate() {
            let expected = 5.0 + 0.30 * i as f64;
            assert!((spawn.at.as_secs() - expected).abs() < 1e-9);
            assert_eq!(spawn.enemy.tier, EnemyTier::Red);
            assert_eq!(spawn.enemy.pos, state.curve.start());
        }
        assert_eq!(events, vec![TdEvent::RoundStarted { round: 1, enemies: 10 }]);
    }

    #[test]
    fn waves_continue_from_previous_cursor() {
        let mut state = TdState::new(TdConfig::default());
        state.round = 3;
        let mut events = Vec::new();

        spawn_wave(&mut state, Timestamp::ZERO, &mut events).unwrap();

        let queue = &state.world.spawn_queue;
        assert_eq!(queue.len(), 16);
        // eight reds at 0.30 s, then blues continue from 2.4 s at 0.40 s
        assert_eq!(queue[7].enemy.tier, EnemyTier::Red);
        assert!((queue[7].at.as_secs() - 2.1).abs() < 1e-9);
        assert_eq!(queue[8].enemy.tier, EnemyTier::Blue);
        assert!((queue[8].at.as_secs() - 2.4).abs() < 1e-9);
        assert!((queue[9].at.as_secs() - 2.8).abs() < 1e-9);
        assert!(queue.iter().zip(queue.iter().skip(1)).all(|(a, b)| a.at <= b.at));
    }

    #[test]
    fn refuses_outside_building_phase() {
        let mut state = TdState::new(TdConfig::default());
        let mut events = Vec::new();
        spawn_wave(&mut state, Timestamp::ZERO, &mut events).unwrap();

        let queued = state.world.spawn_queue.len();
        assert_eq!(
            spawn_wave(&mut state, Timestamp::from_secs(1.0), &mut events),
            Err(CommandError::CombatInProgress)
        );
        assert_eq!(state.world.spawn_queue.len(), queued);
    }

    #[test]
    fn refuses_past_last_round() {
        let mut state = TdState::new(TdConfig::default());
        state.round = 11;
        let mut events = Vec::new();
        assert_eq!(
            spawn_wave(&mut state, Timestamp::ZERO, &mut events),
            Err(CommandError::NoRoundsLeft)
        );
        assert!(!state.phase.in_combat());
        assert!(events.is_empty());
    }
}
