use crate::actions::TdAction;
use crate::config::{TdConfig, TowerKind};
use crate::economy;
use crate::errors::CommandError;
use crate::events::TdEvent;
use crate::observe::build_observation;
use crate::systems;
use crate::waves;
use crate::world::{Phase, RunResult, TdState, Tile, TowerId};
use sim_core::{Frame, Game, TerminalOutcome, Timestamp};

pub struct TdGame {
    state: TdState,
}

impl TdGame {
    pub fn state(&self) -> &TdState {
        &self.state
    }

    /// Advances the simulation by `dt` seconds ending at `now`.
    pub fn tick(&mut self, dt: f64, now: Timestamp, events: &mut Vec<TdEvent>) {
        systems::tick(&mut self.state, dt, now, events);
    }

    pub fn start_round(
        &mut self,
        now: Timestamp,
        events: &mut Vec<TdEvent>,
    ) -> Result<u32, CommandError> {
        waves::spawn_wave(&mut self.state, now, events)
    }

    pub fn place_tower(
        &mut self,
        tile: Tile,
        kind: TowerKind,
        events: &mut Vec<TdEvent>,
    ) -> Result<TowerId, CommandError> {
        economy::try_place_tower(&mut self.state, tile, kind, events)
    }

    /// Selects the tower on `tile`. An empty tile leaves the current selection alone.
    pub fn select_tower(&mut self, tile: Tile, events: &mut Vec<TdEvent>) -> Option<TowerId> {
        let id = economy::select_tower(&self.state, tile)?;
        self.state.selected = Some(id);
        events.push(TdEvent::TowerSelected { id });
        Some(id)
    }

    /// Board click: select an existing tower, otherwise try to build `kind` there.
    pub fn click_tile(
        &mut self,
        tile: Tile,
        kind: TowerKind,
        events: &mut Vec<TdEvent>,
    ) -> Result<TowerId, CommandError> {
        if let Some(id) = self.select_tower(tile, events) {
            return Ok(id);
        }
        self.place_tower(tile, kind, events)
    }

    pub fn upgrade_tower(
        &mut self,
        id: TowerId,
        events: &mut Vec<TdEvent>,
    ) -> Result<u32, CommandError> {
        economy::try_upgrade_tower(&mut self.state, id, events)
    }

    pub fn sell_tower(&mut self, id: TowerId, events: &mut Vec<TdEvent>) -> Result<u32, CommandError> {
        economy::try_sell_tower(&mut self.state, id, events)
    }

    pub fn upgrade_selected(&mut self, events: &mut Vec<TdEvent>) -> Result<u32, CommandError> {
        let id = self.state.selected.ok_or(CommandError::UnknownTower)?;
        self.upgrade_tower(id, events)
    }

    pub fn sell_selected(&mut self, events: &mut Vec<TdEvent>) -> Result<u32, CommandError> {
        let id = self.state.selected.ok_or(CommandError::UnknownTower)?;
        self.sell_tower(id, events)
    }

    /// Upgrade price for a tower, for display.
    pub fn upgrade_cost(&self, id: TowerId) -> Option<u32> {
        let tower = self.state.world.towers.get(id)?;
        Some(economy::upgrade_cost(&self.state.config, tower.kind, tower.level))
    }

    /// Refund a tower would fetch if sold now.
    pub fn sell_refund(&self, id: TowerId) -> Option<u32> {
        let tower = self.state.world.towers.get(id)?;
        Some(economy::sell_refund(&self.state.config, tower.kind, tower.level))
    }

    pub fn reset(&mut self, events: &mut Vec<TdEvent>) {
        self.state.reset();
        tracing::info!("game reset");
        events.push(TdEvent::GameReset);
    }

    fn dispatch(
        &mut self,
        action: &TdAction,
        now: Timestamp,
        events: &mut Vec<TdEvent>,
    ) -> Result<(), CommandError> {
        match *action {
            TdAction::StartRound => self.start_round(now, events).map(drop),
            TdAction::ClickTile { tile, kind } => self.click_tile(tile, kind, events).map(drop),
            TdAction::PlaceTower { tile, kind } => self.place_tower(tile, kind, events).map(drop),
            TdAction::UpgradeTower { tower_id } => self.upgrade_tower(tower_id, events).map(drop),
            TdAction::SellTower { tower_id } => self.sell_tower(tower_id, events).map(drop),
            TdAction::Reset => {
                self.reset(events);
                Ok(())
            }
        }
    }
}

impl Game for TdGame {
    type Config = TdConfig;
    type Action = TdAction;
    type Observation = pathtd_types::TdObservation;
    type Event = TdEvent;

    fn new(config: Self::Config) -> Self {
        Self {
            state: TdState::new(config),
        }
    }

    fn apply(&mut self, action: &Self::Action, now: Timestamp, out_events: &mut Vec<Self::Event>) {
        if let Err(reason) = self.dispatch(action, now, out_events) {
            tracing::debug!(?action, %reason, "command rejected");
            out_events.push(TdEvent::CommandRejected { reason });
        }
    }

    fn step(&mut self, frame: Frame, out_events: &mut Vec<Self::Event>) {
        self.tick(frame.dt, frame.now, out_events);
    }

    fn observe(&self) -> Self::Observation {
        build_observation(&self.state)
    }

    fn is_terminal(&self) -> Option<TerminalOutcome> {
        match self.state.phase {
            Phase::Over {
                result: RunResult::Clear,
                ..
            } => Some(TerminalOutcome::Win),
            Phase::Over {
                result: RunResult::Over,
                ..
            } => Some(TerminalOutcome::Lose),
            _ => None,
        }
    }
}
