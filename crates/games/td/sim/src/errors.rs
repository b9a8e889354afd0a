use std::fmt;

/// Why a player request was declined. A declined request never changes the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// The run has ended.
    GameOver,
    /// A round is already being fought.
    CombatInProgress,
    /// Every round in the table has been played.
    NoRoundsLeft,
    /// Tile lies outside the board.
    OutOfBounds { x: u16, y: u16 },
    /// Tile is crossed by the enemy path.
    OnPath { x: u16, y: u16 },
    /// Tile already holds a tower.
    Occupied { x: u16, y: u16 },
    /// Not enough cash for the purchase.
    InsufficientCash { cost: u32, have: u32 },
    /// No tower with that id.
    UnknownTower,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::GameOver => write!(f, "the run is over"),
            CommandError::CombatInProgress => write!(f, "a round is in progress"),
            CommandError::NoRoundsLeft => write!(f, "no rounds left"),
            CommandError::OutOfBounds { x, y } => write!(f, "tile ({}, {}) is off the board", x, y),
            CommandError::OnPath { x, y } => write!(f, "tile ({}, {}) is on the path", x, y),
            CommandError::Occupied { x, y } => write!(f, "tile ({}, {}) is occupied", x, y),
            CommandError::InsufficientCash { cost, have } => {
                write!(f, "insufficient cash: need {}, have {}", cost, have)
            }
            CommandError::UnknownTower => write!(f, "tower not found"),
        }
    }
}

impl std::error::Error for CommandError {}
