//! Monster stat blocks and level scaling.

/// Stat identifiers.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumString, strum::Display, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StatKind {
    Hp,
    Attack,
    Defense,
    Speed,
    SpecialAttack,
    SpecialDefense,
}

/// Six integer stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatBlock {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub special_attack: u32,
    pub special_defense: u32,
}

impl StatBlock {
    pub const fn uniform(value: u32) -> Self {
        Self {
            hp: value,
            attack: value,
            defense: value,
            speed: value,
            special_attack: value,
            special_defense: value,
        }
    }

    pub const fn get(&self, kind: StatKind) -> u32 {
        match kind {
            StatKind::Hp => self.hp,
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::Speed => self.speed,
            StatKind::SpecialAttack => self.special_attack,
            StatKind::SpecialDefense => self.special_defense,
        }
    }

    pub fn get_mut(&mut self, kind: StatKind) -> &mut u32 {
        match kind {
            StatKind::Hp => &mut self.hp,
            StatKind::Attack => &mut self.attack,
            StatKind::Defense => &mut self.defense,
            StatKind::Speed => &mut self.speed,
            StatKind::SpecialAttack => &mut self.special_attack,
            StatKind::SpecialDefense => &mut self.special_defense,
        }
    }
}

/// `[low, mid, high]` growth multipliers for one stat.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatGrowth(pub [f32; 3]);

impl StatGrowth {
    pub const FLAT: Self = Self([1.0, 1.0, 1.0]);

    /// Levels up to this bound use the low multiplier.
    pub const LOW_TIER_MAX: u32 = 20;
    /// Levels up to this bound use the mid multiplier.
    pub const MID_TIER_MAX: u32 = 50;

    pub fn factor(self, level: u32) -> f32 {
        let [low, mid, high] = self.0;
        if level <= Self::LOW_TIER_MAX {
            low
        } else if level <= Self::MID_TIER_MAX {
            mid
        } else {
            high
        }
    }
}

impl Default for StatGrowth {
    fn default() -> Self {
        Self::FLAT
    }
}

/// Growth triples for all six stats.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GrowthProfile {
    pub hp: StatGrowth,
    pub attack: StatGrowth,
    pub defense: StatGrowth,
    pub speed: StatGrowth,
    pub special_attack: StatGrowth,
    pub special_defense: StatGrowth,
}

impl GrowthProfile {
    pub const fn get(&self, kind: StatKind) -> StatGrowth {
        match kind {
            StatKind::Hp => self.hp,
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::Speed => self.speed,
            StatKind::SpecialAttack => self.special_attack,
            StatKind::SpecialDefense => self.special_defense,
        }
    }
}

/// Scales per-level base values to a concrete level.
///
/// # Formula
///
/// `stat = max(1, floor(base * (level + 7) * growth.factor(level)))`
pub fn scale_stats(base: &StatBlock, growth: &GrowthProfile, level: u32) -> StatBlock {
    use strum::IntoEnumIterator;

    let mut scaled = StatBlock::default();
    for kind in StatKind::iter() {
        let factor = growth.get(kind).factor(level);
        let value = (base.get(kind) as f32 * (level + 7) as f32 * factor).floor();
        *scaled.get_mut(kind) = (value as u32).max(1);
    }
    scaled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_tier_follows_level() {
        let growth = StatGrowth([1.0, 1.5, 2.0]);
        assert_eq!(growth.factor(5), 1.0);
        assert_eq!(growth.factor(21), 1.5);
        assert_eq!(growth.factor(80), 2.0);
    }

    #[test]
    fn scaling_uses_level_plus_seven() {
        let base = StatBlock::uniform(3);
        let stats = scale_stats(&base, &GrowthProfile::default(), 10);
        assert_eq!(stats.attack, 51);
        assert_eq!(stats.hp, 51);
    }

    #[test]
    fn scaled_stats_never_drop_to_zero() {
        let stats = scale_stats(&StatBlock::default(), &GrowthProfile::default(), 1);
        assert_eq!(stats, StatBlock::uniform(1));
    }
}
