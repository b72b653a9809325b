/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Walking speed in tiles per second.
    pub walk_rate: f32,
    /// Running speed in tiles per second.
    pub run_rate: f32,
    /// Monsters carried before new ones are sent to storage.
    pub party_limit: usize,
    /// Battlefield slots per side.
    pub battle_positions: usize,
    /// Extra tiles searched around known collision data when a map has no bounds.
    pub pathfind_margin: i32,
    /// Method used to award experience to winners.
    pub experience_method: String,
    /// Method used to award prize money.
    pub money_method: String,
    /// Combat pacing.
    pub combat: CombatTiming,
}

impl GameConfig {
    // ===== compile-time constants =====
    /// Known techniques per monster.
    pub const MAX_MOVES: usize = 4;
    pub const MAX_LEVEL: u32 = 999;
    /// Upper bound for battlefield slots per side.
    pub const MAX_BATTLE_POSITIONS: usize = 3;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_WALK_RATE: f32 = 3.75;
    pub const DEFAULT_RUN_RATE: f32 = 7.35;
    pub const DEFAULT_PARTY_LIMIT: usize = 6;
    pub const DEFAULT_BATTLE_POSITIONS: usize = 1;
    pub const DEFAULT_PATHFIND_MARGIN: i32 = 2;
    pub const DEFAULT_METHOD: &'static str = "default";

    pub fn new() -> Self {
        Self {
            walk_rate: Self::DEFAULT_WALK_RATE,
            run_rate: Self::DEFAULT_RUN_RATE,
            party_limit: Self::DEFAULT_PARTY_LIMIT,
            battle_positions: Self::DEFAULT_BATTLE_POSITIONS,
            pathfind_margin: Self::DEFAULT_PATHFIND_MARGIN,
            experience_method: Self::DEFAULT_METHOD.to_owned(),
            money_method: Self::DEFAULT_METHOD.to_owned(),
            combat: CombatTiming::default(),
        }
    }

    pub fn with_battle_positions(mut self, positions: usize) -> Self {
        self.battle_positions = positions.clamp(1, Self::MAX_BATTLE_POSITIONS);
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Delays (seconds) that pace the combat phase machine.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatTiming {
    /// Intro before the first housekeeping round.
    pub intro: f32,
    /// Phase lock after each resolved action.
    pub action: f32,
    /// Delay before fainted monsters are detected.
    pub hp_check: f32,
    /// Delay before fainted monsters leave the field.
    pub status_animation: f32,
    /// Lock after a monster is released onto the field.
    pub release: f32,
    /// Added to the shake count when timing a capture animation.
    pub capture_extra: f32,
    /// Delay before the end-of-battle prompt is shown.
    pub result_prompt: f32,
    /// Lock after the end-of-battle message.
    pub result_lock: f32,
    /// Music fade when combat closes, in milliseconds.
    pub music_fade_ms: u32,
}

impl CombatTiming {
    pub const fn new() -> Self {
        Self {
            intro: 3.0,
            action: 3.0,
            hp_check: 1.0,
            status_animation: 3.0,
            release: 3.0,
            capture_extra: 1.8,
            result_prompt: 2.0,
            result_lock: 3.0,
            music_fade_ms: 1000,
        }
    }

    /// Zero delays; every scheduled task fires on the next update.
    pub const fn instant() -> Self {
        Self {
            intro: 0.0,
            action: 0.0,
            hp_check: 0.0,
            status_animation: 0.0,
            release: 0.0,
            capture_extra: 0.0,
            result_prompt: 0.0,
            result_lock: 0.0,
            music_fade_ms: 0,
        }
    }
}

impl Default for CombatTiming {
    fn default() -> Self {
        Self::new()
    }
}
