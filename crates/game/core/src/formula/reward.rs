//! Damage ledger and the money/experience award formulas.

use super::error::FormulaError;
use crate::monster::Monster;
use crate::state::MonsterId;

/// Prize money methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum MoneyMethod {
    Default,
}

/// Experience award methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ExperienceMethod {
    /// Split by total hits taken; every attacker gets the same share.
    Default,
    /// Weighted by the hits each attacker landed.
    Proportional,
    /// Split evenly over the winning trainer's conscious party.
    Transmitter,
}

impl MoneyMethod {
    pub fn parse(name: &str) -> Result<Self, FormulaError> {
        name.parse()
            .map_err(|_| FormulaError::unsupported("money", name))
    }
}

impl ExperienceMethod {
    pub fn parse(name: &str) -> Result<Self, FormulaError> {
        name.parse()
            .map_err(|_| FormulaError::unsupported("experience", name))
    }
}

/// One recorded hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hit {
    pub attacker: MonsterId,
    pub defender: MonsterId,
}

/// Every `(attacker, defender)` hit of the encounter, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DamageMap {
    hits: Vec<Hit>,
}

impl DamageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, attacker: MonsterId, defender: MonsterId) {
        self.hits.push(Hit { attacker, defender });
    }

    /// Hits taken by `defender`.
    pub fn hits_on(&self, defender: MonsterId) -> usize {
        self.hits.iter().filter(|hit| hit.defender == defender).count()
    }

    /// Hits `attacker` landed on `defender`.
    pub fn hits_by(&self, attacker: MonsterId, defender: MonsterId) -> usize {
        self.hits
            .iter()
            .filter(|hit| hit.attacker == attacker && hit.defender == defender)
            .count()
    }

    /// Distinct attackers of `defender`, in first-hit order.
    pub fn attackers_of(&self, defender: MonsterId) -> Vec<MonsterId> {
        let mut attackers = Vec::new();
        for hit in self.hits.iter().filter(|hit| hit.defender == defender) {
            if !attackers.contains(&hit.attacker) {
                attackers.push(hit.attacker);
            }
        }
        attackers
    }

    /// Forgets every hit involving `monster` on either side.
    pub fn forget(&mut self, monster: MonsterId) {
        self.hits
            .retain(|hit| hit.attacker != monster && hit.defender != monster);
    }

    pub fn clear(&mut self) {
        self.hits.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Hit counts feeding the experience formula for one winner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExperienceShare {
    /// Hits the loser took from anyone.
    pub total_hits: usize,
    /// Hits the loser took from this winner.
    pub winner_hits: usize,
    /// Conscious monsters in the winner's party.
    pub party_alive: usize,
}

/// Money awarded for defeating `loser`.
///
/// # Formula
///
/// `default`: `floor(level * money_modifier)`
pub fn award_money(loser: &Monster, method: &str) -> Result<u32, FormulaError> {
    match MoneyMethod::parse(method)? {
        MoneyMethod::Default => Ok((loser.level as f32 * loser.money_modifier).floor() as u32),
    }
}

/// Experience awarded to one winner for defeating `loser`.
///
/// # Formula
///
/// - `default`: `floor(total_experience / (level * total_hits)) * experience_modifier`
/// - `proportional`: `floor(total_experience * winner_hits / (level * total_hits)) * experience_modifier`
/// - `transmitter`: `floor(total_experience / (level * party_alive)) * experience_modifier`
///
/// A zero divisor awards nothing.
pub fn award_experience(
    loser: &Monster,
    share: ExperienceShare,
    method: &str,
) -> Result<u64, FormulaError> {
    let level = u64::from(loser.level);
    let total = loser.total_experience;
    let (numerator, divisor) = match ExperienceMethod::parse(method)? {
        ExperienceMethod::Default => (total, level * share.total_hits as u64),
        ExperienceMethod::Proportional => (
            total * share.winner_hits as u64,
            level * share.total_hits as u64,
        ),
        ExperienceMethod::Transmitter => (total, level * share.party_alive as u64),
    };
    if divisor == 0 {
        return Ok(0);
    }
    Ok(numerator / divisor * u64::from(loser.experience_modifier))
}

/// Monsters that receive experience for `loser`.
///
/// Distinct attackers for `default`/`proportional`; the supplied conscious
/// party for `transmitter` (falling back to the attackers when it is empty).
pub fn winners(
    loser: MonsterId,
    damages: &DamageMap,
    method: &str,
    party_alive: &[MonsterId],
) -> Result<Vec<MonsterId>, FormulaError> {
    let attackers = damages.attackers_of(loser);
    Ok(match ExperienceMethod::parse(method)? {
        ExperienceMethod::Default | ExperienceMethod::Proportional => attackers,
        ExperienceMethod::Transmitter if party_alive.is_empty() => attackers,
        ExperienceMethod::Transmitter => party_alive.to_vec(),
    })
}
