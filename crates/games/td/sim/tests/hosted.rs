use sim_core::{ActionEnvelope, ManualClock};
use sim_host::FrameHost;
use sim_pathtd::{TdAction, TdConfig, TdEvent, TdGame, Tile, TowerKind};

#[test]
fn host_applies_scheduled_actions_before_the_frame() {
    let mut host: FrameHost<TdGame, ManualClock> =
        FrameHost::new(TdConfig::default(), ManualClock::new());

    host.submit(ActionEnvelope {
        action_id: 1,
        intended_frame: 1,
        payload: TdAction::PlaceTower {
            tile: Tile::new(2, 0),
            kind: TowerKind::Rapid,
        },
    });
    host.submit(ActionEnvelope {
        action_id: 2,
        intended_frame: 2,
        payload: TdAction::StartRound,
    });

    let result = host.run_fixed(60, 1.0 / 30.0);
    assert_eq!(result.outcome, None);
    assert_eq!(result.final_frame, 60);

    let placed = result
        .events
        .iter()
        .position(|e| matches!(e, TdEvent::TowerPlaced { .. }))
        .expect("tower placed");
    let started = result
        .events
        .iter()
        .position(|e| matches!(e, TdEvent::RoundStarted { round: 1, enemies: 10 }))
        .expect("round started");
    assert!(placed < started);

    let state = host.game().state();
    assert!(state.phase.in_combat());
    assert_eq!(state.cash, 140 + state.score);
}
