use std::time::Duration;

/// What a due timer should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// automatic vote start after a round began
    DelayedStart,
    /// post round-transition cleanup of the previous session
    SettleCleanup,
    /// seeding pass for the new round
    SeedingCheck,
    /// periodic standings broadcast while a vote runs
    PeriodicBroadcast,
}

#[derive(Debug, Clone, Copy)]
struct ScheduledTask {
    fire_at: Duration,
    kind: TaskKind,
}

/// Deadline queue for the controller's delayed work.
///
/// Time is an opaque monotonic `Duration` supplied by the caller, so
/// tests step it explicitly. At most one task per kind is armed;
/// re-arming replaces the pending one.
#[derive(Debug, Default)]
pub struct Schedule {
    tasks: Vec<ScheduledTask>,
}

impl Schedule {
    pub fn arm(&mut self, kind: TaskKind, fire_at: Duration) {
        self.cancel(kind);
        self.tasks.push(ScheduledTask { fire_at, kind });
    }

    pub fn cancel(&mut self, kind: TaskKind) {
        self.tasks.retain(|task| task.kind != kind);
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn is_armed(&self, kind: TaskKind) -> bool {
        self.tasks.iter().any(|task| task.kind == kind)
    }

    /// Earliest pending deadline, for the host's sleep.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.tasks.iter().map(|task| task.fire_at).min()
    }

    /// Removes and returns everything due at `now`, in firing order.
    pub fn fire_due(&mut self, now: Duration) -> Vec<TaskKind> {
        let (mut due, pending): (Vec<_>, Vec<_>) = self
            .tasks
            .drain(..)
            .partition(|task| task.fire_at <= now);
        self.tasks = pending;
        due.sort_by_key(|task| task.fire_at);
        due.into_iter().map(|task| task.kind).collect()
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::{Schedule, TaskKind};

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn fires_in_deadline_order() {
        let mut schedule = Schedule::default();
        schedule.arm(TaskKind::DelayedStart, secs(90));
        schedule.arm(TaskKind::SettleCleanup, secs(30));
        schedule.arm(TaskKind::SeedingCheck, secs(30));

        assert_eq!(schedule.next_deadline(), Some(secs(30)));
        assert!(schedule.fire_due(secs(29)).is_empty());

        let due = schedule.fire_due(secs(31));
        assert_eq!(due, vec![TaskKind::SettleCleanup, TaskKind::SeedingCheck]);
        assert_eq!(schedule.next_deadline(), Some(secs(90)));

        assert_eq!(schedule.fire_due(secs(90)), vec![TaskKind::DelayedStart]);
        assert_eq!(schedule.next_deadline(), None);
    }

    #[test]
    fn cancel_removes_pending_work() {
        let mut schedule = Schedule::default();
        schedule.arm(TaskKind::PeriodicBroadcast, secs(60));
        assert!(schedule.is_armed(TaskKind::PeriodicBroadcast));

        schedule.cancel(TaskKind::PeriodicBroadcast);
        assert!(!schedule.is_armed(TaskKind::PeriodicBroadcast));
        assert!(schedule.fire_due(secs(600)).is_empty());
    }

    #[test]
    fn rearming_replaces_the_deadline() {
        let mut schedule = Schedule::default();
        schedule.arm(TaskKind::DelayedStart, secs(10));
        schedule.arm(TaskKind::DelayedStart, secs(50));

        assert!(schedule.fire_due(secs(20)).is_empty());
        assert_eq!(schedule.fire_due(secs(50)), vec![TaskKind::DelayedStart]);
    }
}
