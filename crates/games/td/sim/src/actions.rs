use crate::config::TowerKind;
use crate::world::{Tile, TowerId};

#[derive(Clone, Debug)]
pub enum TdAction {
    StartRound,
    /// Selects the tower on `tile` if there is one, otherwise tries to place `kind`.
    ClickTile { tile: Tile, kind: TowerKind },
    PlaceTower { tile: Tile, kind: TowerKind },
    UpgradeTower { tower_id: TowerId },
    SellTower { tower_id: TowerId },
    Reset,
}
