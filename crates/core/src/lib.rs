pub mod envelope;
pub mod game;
pub mod time;
pub mod types;

pub use envelope::ActionEnvelope;
pub use game::{Frame, Game, TerminalOutcome};
pub use time::{Clock, ManualClock, MonotonicClock, Timestamp};
pub use types::{ActionId, FrameIndex};
