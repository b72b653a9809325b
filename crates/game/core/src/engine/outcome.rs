use std::collections::BTreeMap;

use strum::{Display, IntoStaticStr};

use crate::state::{EntityId, MonsterId, SeenStatus};

/// How the encounter ended, from the player's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum CombatResult {
    Won,
    Lost,
    Draw,
    /// A side left by running; `battle_last_result` reads `"ran"`.
    #[strum(serialize = "ran")]
    RanAway,
    Captured,
}

/// One line of the player's battle history.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleRecord {
    pub opponent: String,
    pub result: CombatResult,
    pub rounds: u32,
}

/// Everything the world needs to apply after an encounter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatOutcome {
    pub result: CombatResult,
    pub winner: Option<EntityId>,
    /// Money credited to the player during the encounter.
    pub money_awarded: u64,
    /// Experience gained per monster.
    pub experience: BTreeMap<MonsterId, u64>,
    pub tuxepedia: Vec<(String, SeenStatus)>,
    pub battle_records: Vec<BattleRecord>,
    pub captured: Option<MonsterId>,
}

impl CombatOutcome {
    pub fn new(result: CombatResult) -> Self {
        Self {
            result,
            winner: None,
            money_awarded: 0,
            experience: BTreeMap::new(),
            tuxepedia: Vec::new(),
            battle_records: Vec::new(),
            captured: None,
        }
    }
}
