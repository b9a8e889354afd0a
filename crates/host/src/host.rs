use sim_core::{ActionEnvelope, Clock, Frame, FrameIndex, Game, ManualClock, TerminalOutcome, Timestamp};
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct RunResult<G: Game> {
    pub outcome: Option<TerminalOutcome>,
    pub final_frame: FrameIndex,
    pub events: Vec<G::Event>,
}

/// Drives a [`Game`] one frame at a time from a single clock.
///
/// Every frame reads `now` once and derives `dt` from the previous reading, so the
/// timestamps a game schedules against and the deltas it integrates never disagree.
pub struct FrameHost<G: Game, C: Clock> {
    game: G,
    clock: C,
    current_frame: FrameIndex,
    last_now: Timestamp,
    pending_actions: BTreeMap<FrameIndex, Vec<ActionEnvelope<G::Action>>>,
}

impl<G: Game, C: Clock> FrameHost<G, C> {
    pub fn new(config: G::Config, clock: C) -> Self {
        let last_now = clock.now();
        Self {
            game: G::new(config),
            clock,
            current_frame: 0,
            last_now,
            pending_actions: BTreeMap::new(),
        }
    }

    /// Submit an action to be applied right before the given frame is simulated.
    /// If `intended_frame` is the current frame or earlier, schedules for the next frame.
    /// Returns the frame the action was scheduled for.
    pub fn submit(&mut self, mut action: ActionEnvelope<G::Action>) -> FrameIndex {
        let scheduled_frame = if action.intended_frame <= self.current_frame {
            tracing::debug!(
                intended = action.intended_frame,
                current = self.current_frame,
                "action scheduled in the past, moving to next frame"
            );
            self.current_frame + 1
        } else {
            action.intended_frame
        };

        action.intended_frame = scheduled_frame;
        self.pending_actions
            .entry(scheduled_frame)
            .or_default()
            .push(action);

        scheduled_frame
    }

    /// Apply an action immediately, between frames.
    pub fn apply_now(&mut self, action: &G::Action) -> Vec<G::Event> {
        let mut events = Vec::new();
        let now = self.clock.now();
        self.game.apply(action, now, &mut events);
        events
    }

    /// Advance by one frame. Returns None if the game is already terminal, otherwise the
    /// events from this frame.
    pub fn step_one_frame(&mut self) -> Option<Vec<G::Event>> {
        if self.game.is_terminal().is_some() {
            return None;
        }

        self.current_frame += 1;

        let now = self.clock.now();
        let dt = now.secs_since(self.last_now).max(0.0);
        self.last_now = now;

        let mut actions = self
            .pending_actions
            .remove(&self.current_frame)
            .unwrap_or_default();
        actions.sort_by_key(|a| a.action_id);

        let mut frame_events = Vec::new();
        for action in &actions {
            self.game.apply(&action.payload, now, &mut frame_events);
        }
        self.game.step(Frame::new(dt, now), &mut frame_events);

        Some(frame_events)
    }

    pub fn run_for_frames(&mut self, max_frames: FrameIndex) -> RunResult<G> {
        self.run_with(max_frames, |_| {})
    }

    /// Runs up to `max_frames`, handing the clock to `before_frame` ahead of each one.
    fn run_with(
        &mut self,
        max_frames: FrameIndex,
        mut before_frame: impl FnMut(&C),
    ) -> RunResult<G> {
        let mut all_events = Vec::new();

        for _ in 0..max_frames {
            before_frame(&self.clock);
            match self.step_one_frame() {
                Some(events) => all_events.extend(events),
                None => break,
            }
        }

        RunResult {
            outcome: self.game.is_terminal(),
            final_frame: self.current_frame,
            events: all_events,
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn current_frame(&self) -> FrameIndex {
        self.current_frame
    }

    pub fn is_terminal(&self) -> Option<TerminalOutcome> {
        self.game.is_terminal()
    }
}

impl<G: Game> FrameHost<G, ManualClock> {
    /// Runs with a fixed frame length, advancing the manual clock before every frame.
    pub fn run_fixed(&mut self, max_frames: FrameIndex, frame_secs: f64) -> RunResult<G> {
        self.run_with(max_frames, |clock| clock.advance(frame_secs))
    }
}
