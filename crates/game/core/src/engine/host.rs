//! Capabilities the combat engine needs from the application.
//!
//! Everything visual or interactive goes through [`CombatHost`]. The engine
//! never waits on the host; it only asks whether the host is still busy
//! before moving to the next phase.

use crate::state::{EntityId, MonsterId};

/// Menu the host should open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CombatMenu {
    /// Fight / Item / Swap / Run for one monster.
    Action { monster: MonsterId },
    /// Ball / Item / Run for park encounters.
    ParkAction { monster: MonsterId },
    /// Pick a monster to fill an empty battlefield slot.
    Replacement { trainer: EntityId },
    /// Blocks until [`crate::engine::Combat::acknowledge`] is called.
    WaitForInput,
}

/// Visual request; the engine does not track its playback.
#[derive(Clone, Debug, PartialEq)]
pub enum CombatAnimation {
    Open,
    Release { monster: MonsterId },
    Tackle { user: MonsterId, target: MonsterId },
    TakeDamage { target: MonsterId },
    Technique { slug: String, target: MonsterId },
    Hp { monster: MonsterId, current_hp: u32 },
    Faint { monster: MonsterId },
    /// Shake count comes from the capture formula.
    Capture { monster: MonsterId, shakes: u32, captured: bool },
}

pub trait CombatHost {
    /// Shows a message in the combat dialog.
    fn alert(&mut self, message: &str);

    fn push_menu(&mut self, menu: CombatMenu);

    fn pop_menu(&mut self);

    fn pop_all_menus(&mut self);

    fn play_animation(&mut self, animation: CombatAnimation);

    fn fade_music(&mut self, duration_ms: u32);

    /// True while text or animations are still playing.
    fn is_busy(&self) -> bool {
        false
    }
}

/// One call received by a [`RecordingHost`].
#[derive(Clone, Debug, PartialEq)]
pub enum HostCall {
    Alert(String),
    PushMenu(CombatMenu),
    PopMenu,
    PopAllMenus,
    Animation(CombatAnimation),
    FadeMusic(u32),
}

/// Host that records every request; never busy.
#[derive(Clone, Debug, Default)]
pub struct RecordingHost {
    pub calls: Vec<HostCall>,
    pub menus: Vec<CombatMenu>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> impl Iterator<Item = &str> {
        self.calls.iter().filter_map(|call| match call {
            HostCall::Alert(message) => Some(message.as_str()),
            _ => None,
        })
    }

    pub fn top_menu(&self) -> Option<&CombatMenu> {
        self.menus.last()
    }
}

impl CombatHost for RecordingHost {
    fn alert(&mut self, message: &str) {
        self.calls.push(HostCall::Alert(message.to_owned()));
    }

    fn push_menu(&mut self, menu: CombatMenu) {
        self.menus.push(menu.clone());
        self.calls.push(HostCall::PushMenu(menu));
    }

    fn pop_menu(&mut self) {
        self.menus.pop();
        self.calls.push(HostCall::PopMenu);
    }

    fn pop_all_menus(&mut self) {
        self.menus.clear();
        self.calls.push(HostCall::PopAllMenus);
    }

    fn play_animation(&mut self, animation: CombatAnimation) {
        self.calls.push(HostCall::Animation(animation));
    }

    fn fade_music(&mut self, duration_ms: u32) {
        self.calls.push(HostCall::FadeMusic(duration_ms));
    }
}
