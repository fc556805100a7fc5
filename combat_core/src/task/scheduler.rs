//! Scheduler - the single-threaded tick loop every task runs on

use super::{Task, TaskContext, TaskHandle, TaskKind};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, trace};

/// A task that has been submitted and owns a handle
struct Scheduled<C: TaskContext> {
    task: Task<C>,
    handle: TaskHandle,
}

/// Cooperative, tick-driven task scheduler
///
/// Exactly one thread advances all tasks, so task bodies may mutate the world
/// without locks. Within a tick, tasks run in registration order. Tasks
/// submitted during a tick are first considered on the following tick, so a
/// task scheduled with a delay of `n` always fires `n` ticks after the tick
/// that submitted it.
pub struct Scheduler<C: TaskContext> {
    tasks: Vec<Scheduled<C>>,
    next_id: u64,
    current_tick: u64,
}

impl<C: TaskContext> Default for Scheduler<C> {
    fn default() -> Self {
        Scheduler {
            tasks: Vec::new(),
            next_id: 1,
            current_tick: 0,
        }
    }
}

impl<C: TaskContext> fmt::Debug for Scheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("current_tick", &self.current_tick)
            .field("tasks", &self.len())
            .finish()
    }
}

impl<C: TaskContext> Scheduler<C> {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task; it is first considered on the next tick
    pub fn submit(&mut self, task: Task<C>) -> TaskHandle {
        let handle = TaskHandle::new(self.next_id);
        self.next_id += 1;
        trace!(task = task.name(), id = handle.id(), "submitted");
        self.tasks.push(Scheduled {
            task,
            handle: handle.clone(),
        });
        handle
    }

    /// Number of ticks advanced so far
    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Number of live tasks (including ones submitted this tick)
    pub fn len(&self) -> usize {
        self.tasks.iter().filter(|s| s.handle.is_running()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live tasks with the given name
    pub fn count_named(&self, name: &str) -> usize {
        self.tasks
            .iter()
            .filter(|s| s.handle.is_running() && s.task.name == name)
            .count()
    }

    /// Cancel every live task bound to `owner`
    pub fn cancel_owned(&mut self, owner: C::Owner)
    where
        C::Owner: PartialEq,
    {
        for scheduled in &self.tasks {
            if scheduled.task.owner == Some(owner) {
                scheduled.handle.cancel();
            }
        }
    }

    /// Advance every live task by one tick
    pub fn tick(&mut self, ctx: &mut C) {
        self.current_tick += 1;

        // Take the list so bodies can submit into `self.tasks` while we iterate.
        let mut running = std::mem::take(&mut self.tasks);
        for scheduled in running.iter_mut() {
            if !scheduled.handle.is_running() {
                continue;
            }
            if let Some(owner) = scheduled.task.owner {
                if !ctx.is_owner_valid(owner) {
                    debug!(task = scheduled.task.name, ?owner, "owner gone, cancelling");
                    scheduled.handle.cancel();
                    continue;
                }
            }
            self.advance(scheduled, ctx);
        }

        running.append(&mut self.tasks);
        running.retain(|s| s.handle.is_running());
        self.tasks = running;
    }

    fn advance(&mut self, scheduled: &mut Scheduled<C>, ctx: &mut C) {
        let task = &mut scheduled.task;
        task.ticks_remaining = task.ticks_remaining.saturating_sub(1);
        if task.ticks_remaining > 0 {
            return;
        }
        task.ticks_remaining = task.period;

        let handle = &scheduled.handle;
        let name = task.name;
        let kind = &mut task.kind;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match kind {
            TaskKind::Periodic(body) => body(&mut *ctx, &mut *self, handle),
            TaskKind::OneShot(body) => {
                let result = body(&mut *ctx, &mut *self, handle);
                handle.cancel();
                result
            }
            TaskKind::Conditional { wait_while, action } => {
                if wait_while(&mut *ctx, handle) || !handle.is_running() {
                    return Ok(());
                }
                let result = action(&mut *ctx, &mut *self, handle);
                handle.cancel();
                result
            }
        }));

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!(task = name, id = handle.id(), error = %err, "task failed");
            }
            Err(_) => {
                error!(task = name, id = handle.id(), "task panicked, cancelling");
                handle.cancel();
            }
        }
    }
}
