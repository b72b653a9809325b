//! Host that prints to stdout.

use monster_core::engine::{CombatAnimation, CombatMenu};
use monster_core::{CombatHost, EventHost};

/// Prints alerts and dialogs; keeps a menu stack for debugging.
#[derive(Debug, Default)]
pub struct ConsoleHost {
    menus: Vec<CombatMenu>,
    printed: usize,
}

impl ConsoleHost {
    fn say(&mut self, prefix: &str, message: &str) {
        self.printed += 1;
        println!("{prefix} {message}");
    }

    pub fn printed(&self) -> usize {
        self.printed
    }

    pub fn menu_depth(&self) -> usize {
        self.menus.len()
    }
}

impl CombatHost for ConsoleHost {
    fn alert(&mut self, message: &str) {
        self.say("*", message);
    }

    fn push_menu(&mut self, menu: CombatMenu) {
        tracing::trace!(?menu, "menu opened");
        self.menus.push(menu);
    }

    fn pop_menu(&mut self) {
        self.menus.pop();
    }

    fn pop_all_menus(&mut self) {
        self.menus.clear();
    }

    fn play_animation(&mut self, animation: CombatAnimation) {
        match animation {
            CombatAnimation::Capture {
                shakes, captured, ..
            } => {
                let result = if captured { "caught" } else { "broke free" };
                self.say("~", &format!("the ball shakes {shakes} times and {result}"));
            }
            CombatAnimation::Faint { monster } => tracing::debug!(%monster, "faint"),
            other => tracing::trace!(?other, "animation"),
        }
    }

    fn fade_music(&mut self, duration_ms: u32) {
        tracing::debug!(duration_ms, "music fade");
    }
}

impl EventHost for ConsoleHost {
    fn dialog(&mut self, text: &str) {
        self.say(">", text);
    }

    fn fade_music(&mut self, duration_ms: u32) {
        CombatHost::fade_music(self, duration_ms);
    }
}
