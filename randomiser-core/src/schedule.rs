/// One-shot callbacks that fire on the next scheduler tick.
///
/// There are no threads here: whoever drives the game loop calls
/// [`NextTick::take_due`] once per tick and runs what comes back. A task
/// scheduled again before it fires is moved, not duplicated, so it runs
/// exactly once.
#[derive(Debug)]
pub struct NextTick<T> {
    pending: Vec<T>,
}

impl<T> Default for NextTick<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<T: PartialEq> NextTick<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if this superseded an already pending copy.
    pub fn schedule(&mut self, task: T) -> bool {
        let superseded = self.cancel(&task);
        self.pending.push(task);
        superseded
    }

    pub fn cancel(&mut self, task: &T) -> bool {
        match self.pending.iter().position(|t| t == task) {
            Some(idx) => {
                self.pending.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, task: &T) -> bool {
        self.pending.contains(task)
    }

    /// Everything scheduled before this call, in scheduling order. Tasks
    /// scheduled while these run wait for the following tick.
    pub fn take_due(&mut self) -> Vec<T> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::NextTick;

    #[test]
    fn rescheduling_moves_the_task() {
        let mut queue = NextTick::new();
        assert!(!queue.schedule(1));
        assert!(!queue.schedule(2));
        assert!(queue.schedule(1));
        assert_eq!(queue.take_due(), vec![2, 1]);
        assert!(queue.is_empty());
    }

    #[test]
    fn cancelled_tasks_never_fire() {
        let mut queue = NextTick::new();
        queue.schedule("revert");
        assert!(queue.cancel(&"revert"));
        assert!(!queue.cancel(&"revert"));
        assert!(queue.take_due().is_empty());
    }

    #[test]
    fn tasks_added_after_a_drain_wait_for_the_next_tick() {
        let mut queue = NextTick::new();
        queue.schedule('a');
        let due = queue.take_due();
        queue.schedule('b');
        assert_eq!(due, vec!['a']);
        assert!(queue.is_pending(&'b'));
        assert_eq!(queue.len(), 1);
    }
}
