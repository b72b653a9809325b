//! Validation of human choices made during the decision phase.

use tracing::debug;

use super::{Combat, CombatHost, CombatPhase, CombatType, DecisionError, EnqueuedAction};
use crate::error::GameError;
use crate::monster::{TargetFlags, Technique, UseContext};
use crate::state::{EntityId, MonsterId};

/// A choice from the action menu for the monster being asked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Technique {
        monster: MonsterId,
        technique: String,
        target: MonsterId,
    },
    /// Used by the monster's trainer on `target`.
    Item {
        monster: MonsterId,
        item: String,
        target: MonsterId,
    },
    Swap {
        monster: MonsterId,
        replacement: MonsterId,
    },
    Run {
        monster: MonsterId,
    },
    Forfeit {
        monster: MonsterId,
    },
}

impl Decision {
    /// Monster the decision was made for.
    pub const fn monster(&self) -> MonsterId {
        match self {
            Self::Technique { monster, .. }
            | Self::Item { monster, .. }
            | Self::Swap { monster, .. }
            | Self::Run { monster }
            | Self::Forfeit { monster } => *monster,
        }
    }
}

impl Combat {
    /// Queues the decision for the monster currently being asked.
    ///
    /// On rejection the host is shown the localized reason and the menu stays
    /// open so the player can choose again.
    pub fn submit_decision(
        &mut self,
        host: &mut dyn CombatHost,
        decision: Decision,
    ) -> Result<(), DecisionError> {
        match self.validate_decision(&decision) {
            Ok(action) => {
                self.queue.enqueue(action);
                self.awaiting = None;
                host.pop_menu();
                Ok(())
            }
            Err(error) => {
                self.reject(host, decision.monster(), &error);
                Err(error)
            }
        }
    }

    /// Sends `monster` onto an open battlefield slot of `trainer`.
    pub fn submit_replacement(
        &mut self,
        host: &mut dyn CombatHost,
        trainer: EntityId,
        monster: MonsterId,
    ) -> Result<(), DecisionError> {
        let side = match self.validate_replacement(trainer, monster) {
            Ok(side) => side,
            Err(error) => {
                self.reject(host, monster, &error);
                return Err(error);
            }
        };
        self.add_to_battlefield(side, monster, host);
        if self.sides[side].positions_available() == 0 {
            self.replacements.retain(|id| *id != trainer);
            host.pop_menu();
        }
        Ok(())
    }

    fn reject(&self, host: &mut dyn CombatHost, monster: MonsterId, error: &DecisionError) {
        debug!(
            %monster,
            code = error.error_code(),
            severity = error.severity().as_str(),
            "decision rejected: {error}"
        );
        let name = self
            .monster(monster)
            .map(|monster| monster.name.clone())
            .unwrap_or_default();
        host.alert(&self.locale.format(error.message_key(), &[("name", &name)]));
    }

    fn validate_decision(&self, decision: &Decision) -> Result<EnqueuedAction, DecisionError> {
        if self.phase != CombatPhase::Decision {
            return Err(DecisionError::NotAcceptingDecisions);
        }
        let user = decision.monster();
        if self.awaiting != Some(user) {
            return Err(DecisionError::NotAwaiting(user));
        }
        let monster = self.monster(user).ok_or(DecisionError::NotInParty(user))?;
        let side = self
            .side_index_of(user)
            .ok_or(DecisionError::NotInParty(user))?;
        if self.combat_type == CombatType::Park
            && matches!(decision, Decision::Technique { .. } | Decision::Swap { .. })
        {
            return Err(DecisionError::NotInPark);
        }

        match decision {
            Decision::Technique {
                technique, target, ..
            } => {
                let known = monster
                    .moves
                    .iter()
                    .find(|tech| tech.slug == *technique)
                    .ok_or_else(|| DecisionError::UnknownTechnique {
                        monster: user,
                        technique: technique.clone(),
                    })?;
                if known.is_recharging() {
                    return Err(DecisionError::Recharging(known.slug.clone()));
                }
                self.check_target(side, *target, known.target)?;
                Ok(EnqueuedAction::technique(user, known.clone(), *target))
            }
            Decision::Item { item, target, .. } => {
                let npc = &self.sides[side].npc;
                if !npc.has_item(item) {
                    return Err(DecisionError::MissingItem {
                        trainer: npc.id,
                        item: item.clone(),
                    });
                }
                let def = self.catalog.item(item)?;
                if !def.usable_in(UseContext::Combat) {
                    return Err(DecisionError::NotUsableHere(item.clone()));
                }
                let aimed = self
                    .monster(*target)
                    .ok_or(DecisionError::InvalidTarget(*target))?;
                if def.is_capture_device() && aimed.owner.is_some() {
                    return Err(DecisionError::CannotCapture(*target));
                }
                self.check_target(side, *target, def.target)?;
                if !def.is_valid_target(aimed) {
                    return Err(DecisionError::InvalidTarget(*target));
                }
                Ok(EnqueuedAction::item(npc.id, def.clone(), *target))
            }
            Decision::Swap { replacement, .. } => {
                let party = &self.sides[side].npc.party;
                let benched = party
                    .get(*replacement)
                    .ok_or(DecisionError::NotInParty(*replacement))?;
                if benched.is_fainted() {
                    return Err(DecisionError::Fainted(*replacement));
                }
                if self.sides[side].in_play.contains(replacement) {
                    return Err(DecisionError::AlreadyActive(*replacement));
                }
                Ok(EnqueuedAction::technique(
                    user,
                    Technique::swap(),
                    *replacement,
                ))
            }
            Decision::Run { .. } => {
                if self.combat_type == CombatType::Trainer {
                    return Err(DecisionError::CannotRun);
                }
                Ok(EnqueuedAction::technique(user, Technique::run(), user))
            }
            Decision::Forfeit { .. } => {
                Ok(EnqueuedAction::technique(user, Technique::forfeit(), user))
            }
        }
    }

    /// Target must be a conscious battlefield monster on a side `flags` allows.
    fn check_target(
        &self,
        user_side: usize,
        target: MonsterId,
        flags: TargetFlags,
    ) -> Result<(), DecisionError> {
        let invalid = DecisionError::InvalidTarget(target);
        let target_side = self.side_index_of(target).ok_or(invalid.clone())?;
        let side = &self.sides[target_side];
        if !side.is_active() || !side.active_monsters().any(|monster| monster.id == target) {
            return Err(invalid);
        }
        let allowed = if target_side == user_side {
            flags.allows_own()
        } else {
            flags.allows_enemy()
        };
        if allowed { Ok(()) } else { Err(invalid) }
    }

    fn validate_replacement(
        &self,
        trainer: EntityId,
        monster: MonsterId,
    ) -> Result<usize, DecisionError> {
        if self.phase != CombatPhase::Housekeeping || !self.replacements.contains(&trainer) {
            return Err(DecisionError::NotAcceptingDecisions);
        }
        let side = self
            .side_index_by_trainer(trainer)
            .ok_or(DecisionError::NotInParty(monster))?;
        let candidate = self.sides[side]
            .npc
            .party
            .get(monster)
            .ok_or(DecisionError::NotInParty(monster))?;
        if candidate.is_fainted() {
            return Err(DecisionError::Fainted(monster));
        }
        if self.sides[side].in_play.contains(&monster) {
            return Err(DecisionError::AlreadyActive(monster));
        }
        Ok(side)
    }
}
