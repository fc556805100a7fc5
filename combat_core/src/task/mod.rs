//! Tasks - deferred units of work advanced by the [`Scheduler`]
//!
//! Every time-delayed, periodic or condition-gated piece of game logic is a
//! task. A task is one of three shapes:
//! - `OneShot`: runs once after `delay` ticks, then cancels itself
//! - `Periodic`: runs every `period` ticks until cancelled
//! - `Conditional`: polls `wait_while` every tick; the first tick it returns
//!   `false` the action runs once and the task cancels itself
//!
//! Tasks are resumed, not suspended: a body returns from its invocation and
//! is invoked again on a later tick with whatever state its closure owns.

mod scheduler;

pub use scheduler::Scheduler;

use crate::combat::CombatError;
use crate::types::EntityId;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Error returned from a task body. Logged at the scheduler boundary.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("combat error: {0}")]
    Combat(#[from] CombatError),
    #[error("entity {0} is not registered")]
    MissingEntity(EntityId),
    #[error("{0}")]
    Failed(String),
}

/// The world a scheduler drives
pub trait TaskContext {
    /// What a task can be bound to
    type Owner: Copy + fmt::Debug;

    /// Whether an owner is still alive. Tasks bound to an invalid owner are
    /// cancelled before their next invocation.
    fn is_owner_valid(&self, owner: Self::Owner) -> bool;
}

/// Shared cancellation flag for a submitted task
///
/// Cancellation is cooperative: setting the flag never interrupts a running
/// invocation, the scheduler observes it before the next one.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: u64,
    cancelled: Rc<Cell<bool>>,
}

impl TaskHandle {
    fn new(id: u64) -> Self {
        TaskHandle {
            id,
            cancelled: Rc::new(Cell::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    /// Whether the task will be invoked again
    pub fn is_running(&self) -> bool {
        !self.cancelled.get()
    }
}

impl PartialEq for TaskHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TaskHandle {}

/// Task body, invoked with the world, the scheduler (for submitting follow-up
/// tasks) and the task's own handle (for self-cancellation)
pub type TaskFn<C> = Box<dyn FnMut(&mut C, &mut Scheduler<C>, &TaskHandle) -> Result<(), TaskError>>;

/// Wait predicate of a conditional task: `true` keeps waiting
pub type WaitFn<C> = Box<dyn FnMut(&mut C, &TaskHandle) -> bool>;

/// The shape of a task
pub enum TaskKind<C: TaskContext> {
    OneShot(TaskFn<C>),
    Periodic(TaskFn<C>),
    Conditional { wait_while: WaitFn<C>, action: TaskFn<C> },
}

/// A task ready to be submitted
pub struct Task<C: TaskContext> {
    name: &'static str,
    kind: TaskKind<C>,
    period: u32,
    ticks_remaining: u32,
    owner: Option<C::Owner>,
}

impl<C: TaskContext> Task<C> {
    /// Run `body` once, `delay` ticks after submission
    pub fn one_shot<F>(name: &'static str, delay: u32, body: F) -> Self
    where
        F: FnMut(&mut C, &mut Scheduler<C>, &TaskHandle) -> Result<(), TaskError> + 'static,
    {
        Task {
            name,
            kind: TaskKind::OneShot(Box::new(body)),
            period: delay.max(1),
            ticks_remaining: delay.max(1),
            owner: None,
        }
    }

    /// Run `body` every `period` ticks until cancelled
    pub fn periodic<F>(name: &'static str, period: u32, body: F) -> Self
    where
        F: FnMut(&mut C, &mut Scheduler<C>, &TaskHandle) -> Result<(), TaskError> + 'static,
    {
        Task {
            name,
            kind: TaskKind::Periodic(Box::new(body)),
            period: period.max(1),
            ticks_remaining: period.max(1),
            owner: None,
        }
    }

    /// Poll `wait_while` every tick; run `action` once it returns `false`
    pub fn conditional<W, F>(name: &'static str, wait_while: W, action: F) -> Self
    where
        W: FnMut(&mut C, &TaskHandle) -> bool + 'static,
        F: FnMut(&mut C, &mut Scheduler<C>, &TaskHandle) -> Result<(), TaskError> + 'static,
    {
        Task {
            name,
            kind: TaskKind::Conditional {
                wait_while: Box::new(wait_while),
                action: Box::new(action),
            },
            period: 1,
            ticks_remaining: 1,
            owner: None,
        }
    }

    /// Bind the task to an owner; it is force-cancelled once the owner is gone
    pub fn owned_by(mut self, owner: C::Owner) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    pub fn is_one_shot(&self) -> bool {
        matches!(self.kind, TaskKind::OneShot(_))
    }
}

impl<C: TaskContext> fmt::Debug for Task<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("period", &self.period)
            .field("ticks_remaining", &self.ticks_remaining)
            .field("owner", &self.owner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nothing;

    impl TaskContext for Nothing {
        type Owner = u32;

        fn is_owner_valid(&self, _owner: u32) -> bool {
            true
        }
    }

    #[test]
    fn test_handle_cancel_is_shared() {
        let handle = TaskHandle::new(7);
        let clone = handle.clone();
        assert!(clone.is_running());
        handle.cancel();
        assert!(!clone.is_running());
        assert_eq!(clone.id(), 7);
    }

    #[test]
    fn test_zero_delay_is_one_tick() {
        let task: Task<Nothing> = Task::one_shot("noop", 0, |_, _, _| Ok(()));
        assert_eq!(task.period(), 1);
        assert!(task.is_one_shot());
    }
}
