//! Headless runner: plays a scripted defence through every round and prints a summary.
//!
//! Fast mode drives the game from a manual clock as quickly as possible; realtime mode
//! paces frames against the monotonic clock.

use clap::Parser;
use sim_core::{Clock, Game, ManualClock, MonotonicClock};
use sim_host::FrameHost;
use sim_pathtd::world::CellState;
use sim_pathtd::{economy, TdAction, TdConfig, TdEvent, TdGame, TdState, Tile, TowerKind};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "headless-runner")]
#[command(about = "Play a scripted path TD run without a display")]
struct Args {
    /// Pace frames against the wall clock
    #[arg(long, short)]
    realtime: bool,

    /// Frames per simulated second
    #[arg(long, default_value = "60")]
    fps: u32,

    /// Stop after this many simulated seconds
    #[arg(long, default_value = "1200")]
    max_secs: u32,

    /// JSON file with a full game configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of towers in the scripted defence
    #[arg(long, default_value = "12")]
    towers: usize,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,

    /// Print every event as it happens
    #[arg(long, short)]
    verbose: bool,

    /// Print the JSON schema of the snapshot and exit
    #[arg(long)]
    schema: bool,
}

const KIND_CYCLE: [TowerKind; 5] = [
    TowerKind::Rapid,
    TowerKind::Splash,
    TowerKind::Rapid,
    TowerKind::Frost,
    TowerKind::Sniper,
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    if args.schema {
        println!(
            "{}",
            serde_json::to_string_pretty(&pathtd_types::observation_schema())?
        );
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => serde_json::from_str::<TdConfig>(&std::fs::read_to_string(path)?)?,
        None => TdConfig::default(),
    };

    let frame_secs = 1.0 / args.fps.max(1) as f64;
    let max_frames = args.max_secs as u64 * args.fps.max(1) as u64;

    let events = if args.realtime {
        println!("=== Running in Real-Time Mode ({}fps) ===", args.fps);
        let mut host = FrameHost::<TdGame, _>::new(config, MonotonicClock::new());
        let frame = Duration::from_secs_f64(frame_secs);
        let mut next_frame = Instant::now();
        let events = drive(&mut host, &args, max_frames, |_| {
            next_frame += frame;
            if let Some(wait) = next_frame.checked_duration_since(Instant::now()) {
                std::thread::sleep(wait);
            }
        });
        report(&host, &events, &args)?;
        events
    } else {
        let mut host = FrameHost::<TdGame, _>::new(config, ManualClock::new());
        let events = drive(&mut host, &args, max_frames, |clock: &ManualClock| {
            clock.advance(frame_secs)
        });
        report(&host, &events, &args)?;
        events
    };

    print_event_summary(&events);
    Ok(())
}

/// Runs until the game ends or the frame budget is spent, building and starting a round
/// whenever the board is idle.
fn drive<C: Clock>(
    host: &mut FrameHost<TdGame, C>,
    args: &Args,
    max_frames: u64,
    mut before_frame: impl FnMut(&C),
) -> Vec<TdEvent> {
    let mut plan = defence_plan(host.game().state(), args.towers);
    let mut all_events = Vec::new();

    while host.current_frame() < max_frames {
        if host.game().state().phase == sim_pathtd::Phase::Building {
            let mut events = build_between_rounds(host, &mut plan);
            events.extend(host.apply_now(&TdAction::StartRound));
            log_events(host.current_frame(), &events, args.verbose);
            all_events.extend(events);
        }

        before_frame(host.clock());
        let Some(events) = host.step_one_frame() else {
            break;
        };
        log_events(host.current_frame(), &events, args.verbose);
        all_events.extend(events);
    }

    tracing::info!(frame = host.current_frame(), "run finished");
    all_events
}

/// Empty tiles bordering the path, ordered by how early the path passes them.
fn defence_plan(state: &TdState, count: usize) -> VecDeque<(Tile, TowerKind)> {
    let grid = &state.world.grid;
    let reach = state.config.tile_size * 1.5;
    let points = state.curve.points();

    let mut candidates: Vec<(usize, Tile)> = Vec::new();
    for y in 0..grid.height {
        for x in 0..grid.width {
            let tile = Tile::new(x, y);
            if grid.get(tile) != CellState::Empty {
                continue;
            }
            let center = state.config.tile_center(x as f32, y as f32);
            if let Some(first) = points.iter().position(|p| p.distance(center) <= reach) {
                candidates.push((first, tile));
            }
        }
    }
    candidates.sort_by_key(|(first, _)| *first);

    candidates
        .into_iter()
        .take(count)
        .enumerate()
        .map(|(i, (_, tile))| (tile, KIND_CYCLE[i % KIND_CYCLE.len()]))
        .collect()
}

/// Places the next planned towers while cash allows; once the plan is built, spends on
/// the cheapest upgrade instead.
fn build_between_rounds<C: Clock>(
    host: &mut FrameHost<TdGame, C>,
    plan: &mut VecDeque<(Tile, TowerKind)>,
) -> Vec<TdEvent> {
    let mut events = Vec::new();

    loop {
        let state = host.game().state();
        let cash = state.cash;

        let action = if let Some(&(tile, kind)) = plan.front() {
            if state.config.tower_spec(kind).price > cash {
                break;
            }
            plan.pop_front();
            TdAction::PlaceTower { tile, kind }
        } else {
            let cheapest = state
                .world
                .towers
                .iter()
                .map(|(id, t)| (economy::upgrade_cost(&state.config, t.kind, t.level), id))
                .min_by_key(|(cost, _)| *cost);
            match cheapest {
                Some((cost, tower_id)) if cost <= cash => TdAction::UpgradeTower { tower_id },
                _ => break,
            }
        };

        let result = host.apply_now(&action);
        let rejected = result
            .iter()
            .any(|e| matches!(e, TdEvent::CommandRejected { .. }));
        events.extend(result);
        if rejected {
            break;
        }
    }

    events
}

fn report<C: Clock>(
    host: &FrameHost<TdGame, C>,
    events: &[TdEvent],
    args: &Args,
) -> Result<(), serde_json::Error> {
    let state = host.game().state();
    let sim_secs = host.current_frame() as f64 / args.fps.max(1) as f64;

    println!("\n=== Path TD Run Complete ===");
    println!("Outcome: {:?}", host.is_terminal());
    println!("Final frame: {} ({:.1}s)", host.current_frame(), sim_secs);
    println!("Phase: {:?}", state.phase);
    println!("Round: {}/{}", state.round, state.config.rounds_total());
    println!("Lives: {}", state.lives);
    println!("Cash: {}", state.cash);
    println!("Score: {}", state.score);
    println!("Grade: {}", economy::grade_for(&state.config.grade_thresholds, state.score));
    println!("Towers: {}", state.world.towers.len());
    println!("Events: {}", events.len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&host.game().observe())?);
    }
    Ok(())
}

fn log_events(frame: u64, events: &[TdEvent], verbose: bool) {
    if !verbose {
        return;
    }
    for event in events {
        print_event(frame, event);
    }
}

fn print_event(frame: u64, event: &TdEvent) {
    match event {
        TdEvent::RoundStarted { round, enemies } => {
            println!("[{:>6}] === Round {} started ({} enemies) ===", frame, round, enemies)
        }
        TdEvent::RoundCleared { round, bonus } => {
            println!("[{:>6}] === Round {} cleared (+{}) ===", frame, round, bonus)
        }
        TdEvent::EnemyKilled { tier, reward, .. } => {
            println!("[{:>6}] {} killed (+{})", frame, tier.as_str(), reward)
        }
        TdEvent::EnemyLeaked { lives_left, .. } => {
            println!("[{:>6}] Enemy leaked, {} lives left", frame, lives_left)
        }
        TdEvent::TowerPlaced { tile, kind, cost, .. } => println!(
            "[{:>6}] {} placed at ({}, {}) for {}",
            frame,
            kind.as_str(),
            tile.x,
            tile.y,
            cost
        ),
        TdEvent::TowerUpgraded { level, cost, .. } => {
            println!("[{:>6}] Tower upgraded to level {} for {}", frame, level, cost)
        }
        TdEvent::GameEnded {
            result,
            score,
            grade,
        } => println!(
            "[{:>6}] Run ended: {} with score {} ({})",
            frame,
            result.as_str(),
            score,
            grade
        ),
        TdEvent::CommandRejected { reason } => println!("[{:>6}] Rejected: {}", frame, reason),
        _ => {}
    }
}

fn print_event_summary(events: &[TdEvent]) {
    let mut towers_placed = 0;
    let mut upgrades = 0;
    let mut rounds_started = 0;
    let mut rounds_cleared = 0;
    let mut spawned = 0;
    let mut killed = 0;
    let mut leaked = 0;
    let mut shots = 0;
    let mut misses = 0;
    let mut rejected = 0;

    for event in events {
        match event {
            TdEvent::TowerPlaced { .. } => towers_placed += 1,
            TdEvent::TowerUpgraded { .. } => upgrades += 1,
            TdEvent::RoundStarted { .. } => rounds_started += 1,
            TdEvent::RoundCleared { .. } => rounds_cleared += 1,
            TdEvent::EnemySpawned { .. } => spawned += 1,
            TdEvent::EnemyKilled { .. } => killed += 1,
            TdEvent::EnemyLeaked { .. } => leaked += 1,
            TdEvent::ProjectileFired { .. } => shots += 1,
            TdEvent::ProjectileMissed { .. } => misses += 1,
            TdEvent::CommandRejected { .. } => rejected += 1,
            TdEvent::TowerSelected { .. }
            | TdEvent::TowerSold { .. }
            | TdEvent::GameEnded { .. }
            | TdEvent::GameReset => {}
        }
    }

    println!("\n=== Event Summary ===");
    println!("Towers placed: {}", towers_placed);
    println!("Upgrades: {}", upgrades);
    println!("Rounds started: {}", rounds_started);
    println!("Rounds cleared: {}", rounds_cleared);
    println!("Enemies spawned: {}", spawned);
    println!("Enemies killed: {}", killed);
    println!("Enemies leaked: {}", leaked);
    println!("Shots fired: {}", shots);
    println!("Shots missed: {}", misses);
    println!("Rejected commands: {}", rejected);
}
