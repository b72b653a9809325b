//! Status conditions and the per-monster status stack.

use crate::state::MonsterId;

/// Broad classification used by the replacement rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StatusCategory {
    Positive,
    Negative,
    #[default]
    Neutral,
}

/// How an incoming status treats the current head of the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StatusResponse {
    /// The stack is cleared and the new status pushed.
    Replaced,
    /// The stack is cleared and the new status discarded.
    Removed,
    /// Nothing changes.
    #[default]
    Blocked,
}

/// Effect applied to the carrier once per round, during post action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StatusTick {
    #[default]
    None,
    /// Lose `hp / 8`.
    Poison,
    /// Heal `min(hp / 16, missing)`.
    Recover,
    /// Drain into the linked monster.
    Lifeleech,
}

/// Whether the status swaps out the technique its carrier tried to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StatusSubstitute {
    #[default]
    None,
    /// The carrier loses its action.
    Skip,
    /// Half the time the carrier uses a random usable move instead.
    Confused,
}

/// One status condition instance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status {
    pub slug: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: StatusCategory,
    /// Response when the current head is positive.
    #[cfg_attr(feature = "serde", serde(default))]
    pub repl_pos: StatusResponse,
    /// Response when the current head is negative.
    #[cfg_attr(feature = "serde", serde(default))]
    pub repl_neg: StatusResponse,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tick: StatusTick,
    #[cfg_attr(feature = "serde", serde(default))]
    pub substitute: StatusSubstitute,
    /// Rounds before the status wears off; `None` lasts until combat ends.
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: Option<u32>,
    /// Rounds this status has been active.
    #[cfg_attr(feature = "serde", serde(default))]
    pub nr_turn: u32,
    /// Monster that inflicted the status, for draining effects.
    #[cfg_attr(feature = "serde", serde(default))]
    pub link: Option<MonsterId>,
}

impl Status {
    pub const FAINT: &'static str = "status_faint";

    pub fn new(slug: impl Into<String>, category: StatusCategory) -> Self {
        Self {
            slug: slug.into(),
            category,
            repl_pos: StatusResponse::Blocked,
            repl_neg: StatusResponse::Blocked,
            tick: StatusTick::None,
            substitute: StatusSubstitute::None,
            duration: None,
            nr_turn: 0,
            link: None,
        }
    }

    pub fn faint() -> Self {
        Self::new(Self::FAINT, StatusCategory::Negative)
    }

    pub fn with_tick(mut self, tick: StatusTick) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_responses(mut self, repl_pos: StatusResponse, repl_neg: StatusResponse) -> Self {
        self.repl_pos = repl_pos;
        self.repl_neg = repl_neg;
        self
    }

    pub fn with_link(mut self, link: MonsterId) -> Self {
        self.link = Some(link);
        self
    }

    pub fn is_faint(&self) -> bool {
        self.slug == Self::FAINT
    }

    /// True once `duration` rounds have elapsed.
    pub fn is_expired(&self) -> bool {
        self.duration.is_some_and(|limit| self.nr_turn >= limit)
    }
}

/// Result of [`StatusStack::apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusChange {
    /// Pushed onto an empty stack.
    Added,
    /// Previous head cleared, new status pushed.
    Replaced,
    /// Previous head cleared, new status discarded.
    Removed,
    /// The incoming status was refused.
    Blocked,
    /// A status with that slug is already present.
    AlreadyPresent,
}

impl StatusChange {
    pub const fn took_effect(self) -> bool {
        matches!(self, Self::Added | Self::Replaced | Self::Removed)
    }
}

/// Ordered status conditions; the first entry is the acting head.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StatusStack {
    entries: Vec<Status>,
}

impl StatusStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `status` following the replacement rules of the current head.
    ///
    /// - empty stack: push
    /// - same slug present: no-op
    /// - positive head: follow the newcomer's `repl_pos`
    /// - negative head: follow the newcomer's `repl_neg`
    /// - neutral head: replace
    pub fn apply(&mut self, mut status: Status) -> StatusChange {
        if self.entries.is_empty() {
            self.entries.push(status);
            return StatusChange::Added;
        }
        if self.contains(&status.slug) {
            return StatusChange::AlreadyPresent;
        }

        let response = match self.entries[0].category {
            StatusCategory::Positive => status.repl_pos,
            StatusCategory::Negative => status.repl_neg,
            StatusCategory::Neutral => StatusResponse::Replaced,
        };
        match response {
            StatusResponse::Replaced => {
                status.nr_turn = 1;
                self.entries.clear();
                self.entries.push(status);
                StatusChange::Replaced
            }
            StatusResponse::Removed => {
                self.entries.clear();
                StatusChange::Removed
            }
            StatusResponse::Blocked => StatusChange::Blocked,
        }
    }

    /// Replaces everything with the faint status.
    pub fn set_fainted(&mut self) {
        self.entries.clear();
        self.entries.push(Status::faint());
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.entries.iter().any(|status| status.slug == slug)
    }

    pub fn is_fainted(&self) -> bool {
        self.entries.iter().any(Status::is_faint)
    }

    /// True if any status other than faint is present.
    pub fn has_condition(&self) -> bool {
        self.entries.iter().any(|status| !status.is_faint())
    }

    pub fn head(&self) -> Option<&Status> {
        self.entries.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Status> {
        self.entries.iter()
    }

    pub fn get_mut(&mut self, slug: &str) -> Option<&mut Status> {
        self.entries.iter_mut().find(|status| status.slug == slug)
    }

    pub fn remove(&mut self, slug: &str) -> Option<Status> {
        let index = self.entries.iter().position(|status| status.slug == slug)?;
        Some(self.entries.remove(index))
    }

    /// Drops every status except faint.
    pub fn clear_conditions(&mut self) {
        self.entries.retain(Status::is_faint);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poison() -> Status {
        Status::new("status_poison", StatusCategory::Negative)
            .with_tick(StatusTick::Poison)
            .with_responses(StatusResponse::Replaced, StatusResponse::Blocked)
    }

    fn charged() -> Status {
        Status::new("status_chargedup", StatusCategory::Positive)
            .with_responses(StatusResponse::Blocked, StatusResponse::Removed)
    }

    #[test]
    fn empty_stack_accepts_status() {
        let mut stack = StatusStack::new();
        assert_eq!(stack.apply(poison()), StatusChange::Added);
        assert_eq!(stack.apply(poison()), StatusChange::AlreadyPresent);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn negative_head_uses_negative_response() {
        let mut stack = StatusStack::new();
        stack.apply(poison());
        assert_eq!(stack.apply(charged()), StatusChange::Removed);
        assert!(stack.is_empty());
    }

    #[test]
    fn positive_head_uses_positive_response() {
        let mut stack = StatusStack::new();
        stack.apply(charged());
        let change = stack.apply(poison());
        assert_eq!(change, StatusChange::Replaced);
        assert_eq!(stack.head().map(|s| s.slug.as_str()), Some("status_poison"));
        assert_eq!(stack.apply(charged()), StatusChange::Removed);
    }

    #[test]
    fn neutral_head_is_always_replaced() {
        let mut stack = StatusStack::new();
        stack.apply(Status::new("status_dozing", StatusCategory::Neutral));
        assert_eq!(stack.apply(charged()), StatusChange::Replaced);
    }

    #[test]
    fn clearing_conditions_keeps_faint() {
        let mut stack = StatusStack::new();
        stack.set_fainted();
        stack.clear_conditions();
        assert!(stack.is_fainted());
        assert!(!stack.has_condition());
    }
}
