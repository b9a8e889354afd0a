use crate::time::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminalOutcome {
    Win,
    Lose,
}

/// Timing inputs for one simulated frame.
///
/// `dt` drives integration (movement, cooldowns) while `now` is compared against
/// absolute timestamps the game scheduled earlier. Both must come from the same clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub dt: f64,
    pub now: Timestamp,
}

impl Frame {
    pub fn new(dt: f64, now: Timestamp) -> Self {
        Self { dt, now }
    }
}

pub trait Game: Sized {
    type Config: Clone + 'static;
    type Action: Clone + 'static;
    type Observation: Clone + 'static;
    type Event: Clone + 'static;

    fn new(config: Self::Config) -> Self;

    /// Apply discrete input between frames. Rejected actions leave the game unchanged.
    fn apply(&mut self, action: &Self::Action, now: Timestamp, out_events: &mut Vec<Self::Event>);

    fn step(&mut self, frame: Frame, out_events: &mut Vec<Self::Event>);

    fn observe(&self) -> Self::Observation;

    fn is_terminal(&self) -> Option<TerminalOutcome>;
}
