//! Delayed callbacks drained once per tick.
//!
//! Sequences that span several frames (message pauses, shake animations,
//! faint checks) are queued here with a delay instead of blocking. Entries
//! fire in due-time order; ties keep scheduling order.

/// Label used to cancel a group of tasks.
pub type TaskTag = &'static str;

#[derive(Clone, Debug)]
struct Scheduled<T> {
    fire_at: f32,
    seq: u64,
    tag: Option<TaskTag>,
    task: T,
}

/// Single-threaded cooperative scheduler keyed by elapsed seconds.
#[derive(Clone, Debug)]
pub struct TaskQueue<T> {
    now: f32,
    seq: u64,
    entries: Vec<Scheduled<T>>,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            seq: 0,
            entries: Vec::new(),
        }
    }

    /// Seconds elapsed since the queue was created.
    pub fn now(&self) -> f32 {
        self.now
    }

    pub fn schedule(&mut self, delay: f32, task: T) {
        self.push(delay, None, task);
    }

    pub fn schedule_tagged(&mut self, delay: f32, tag: TaskTag, task: T) {
        self.push(delay, Some(tag), task);
    }

    fn push(&mut self, delay: f32, tag: Option<TaskTag>, task: T) {
        self.seq += 1;
        self.entries.push(Scheduled {
            fire_at: self.now + delay.max(0.0),
            seq: self.seq,
            tag,
            task,
        });
    }

    /// Advances the clock and returns every task that came due, in order.
    pub fn advance(&mut self, dt: f32) -> Vec<T> {
        self.now += dt.max(0.0);
        let now = self.now;
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|entry| entry.fire_at <= now);
        self.entries = pending;
        due.sort_by(|a, b| a.fire_at.total_cmp(&b.fire_at).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|entry| entry.task).collect()
    }

    /// Drops every task carrying `tag`; returns how many were removed.
    pub fn cancel(&mut self, tag: TaskTag) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.tag != Some(tag));
        before - self.entries.len()
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

    #[test]
    fn tasks_fire_in_due_order() {
        let mut queue = TaskQueue::new();
        queue.schedule(2.0, "late");
        queue.schedule(1.0, "early");
        queue.schedule(1.0, "early-second");

        assert!(queue.advance(0.5).is_empty());
        assert_eq!(queue.advance(0.5), vec!["early", "early-second"]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.advance(5.0), vec!["late"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn cancel_removes_only_tagged() {
        let mut queue = TaskQueue::new();
        queue.schedule_tagged(1.0, "shake", 1);
        queue.schedule_tagged(2.0, "shake", 2);
        queue.schedule(1.5, 3);

        assert_eq!(queue.cancel("shake"), 2);
        assert_eq!(queue.advance(3.0), vec![3]);
    }

    #[test]
    fn zero_delay_fires_on_next_advance() {
        let mut queue = TaskQueue::new();
        queue.schedule(0.0, 'a');
        assert_eq!(queue.advance(0.0), vec!['a']);
    }
}
