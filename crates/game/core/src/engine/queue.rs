//! Actions collected during the decision phase.

use std::collections::VecDeque;

use crate::monster::{ItemDef, MethodSort, Status, Technique};
use crate::state::{EntityId, MonsterId};

/// Who performs an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionUser {
    Monster(MonsterId),
    Trainer(EntityId),
    /// Status ticks have no user.
    None,
}

impl ActionUser {
    pub const fn monster(self) -> Option<MonsterId> {
        match self {
            Self::Monster(id) => Some(id),
            _ => None,
        }
    }
}

/// What an action does.
#[derive(Clone, Debug, PartialEq)]
pub enum Method {
    Technique(Technique),
    Item(ItemDef),
    Status(Status),
}

impl Method {
    pub fn sort(&self) -> MethodSort {
        match self {
            Self::Technique(tech) => tech.sort,
            Self::Item(item) => item.sort,
            Self::Status(_) => MethodSort::Meta,
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            Self::Technique(tech) => &tech.slug,
            Self::Item(item) => &item.slug,
            Self::Status(status) => &status.slug,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnqueuedAction {
    pub user: ActionUser,
    pub method: Method,
    pub target: MonsterId,
}

impl EnqueuedAction {
    pub fn new(user: ActionUser, method: Method, target: MonsterId) -> Self {
        Self {
            user,
            method,
            target,
        }
    }

    pub fn technique(user: MonsterId, technique: Technique, target: MonsterId) -> Self {
        Self::new(ActionUser::Monster(user), Method::Technique(technique), target)
    }

    pub fn item(trainer: EntityId, item: ItemDef, target: MonsterId) -> Self {
        Self::new(ActionUser::Trainer(trainer), Method::Item(item), target)
    }

    pub fn status(status: Status, carrier: MonsterId) -> Self {
        Self::new(ActionUser::None, Method::Status(status), carrier)
    }

    /// Sort key: category rank, then a tiebreak that is always zero.
    pub fn rank(&self) -> (usize, u32) {
        (self.method.sort().rank(), 0)
    }

    pub fn involves(&self, monster: MonsterId) -> bool {
        self.target == monster || self.user == ActionUser::Monster(monster)
    }
}

/// Round queue consumed front to back.
#[derive(Clone, Debug, Default)]
pub struct ActionQueue {
    actions: VecDeque<EnqueuedAction>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, action: EnqueuedAction) {
        self.actions.push_back(action);
    }

    pub fn pop(&mut self) -> Option<EnqueuedAction> {
        self.actions.pop_front()
    }

    /// Orders by category: utility, meta, item, then everything else.
    ///
    /// The sort is stable, so actions of one category keep enqueue order.
    pub fn sort(&mut self) {
        self.actions.make_contiguous().sort_by_key(EnqueuedAction::rank);
    }

    /// Drops every action used by or aimed at `monster`.
    pub fn remove_involving(&mut self, monster: MonsterId) -> usize {
        let before = self.actions.len();
        self.actions.retain(|action| !action.involves(monster));
        before - self.actions.len()
    }

    pub fn remove_by_user(&mut self, user: ActionUser) -> usize {
        let before = self.actions.len();
        self.actions.retain(|action| action.user != user);
        before - self.actions.len()
    }

    /// Points actions aimed at `original` to `replacement`.
    pub fn rewrite_target(&mut self, original: MonsterId, replacement: MonsterId) {
        for action in self.actions.iter_mut().filter(|a| a.target == original) {
            action.target = replacement;
        }
    }

    pub fn has_action_for(&self, monster: MonsterId) -> bool {
        self.actions
            .iter()
            .any(|action| action.user == ActionUser::Monster(monster))
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnqueuedAction> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}
