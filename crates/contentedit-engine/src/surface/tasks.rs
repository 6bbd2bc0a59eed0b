use crate::selection::HostSelection;
use crate::surface::EditingSurface;

/// What a deferred task knows about the moment it was scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskContext {
    scheduled_version: u64,
}

impl TaskContext {
    pub(crate) fn new(scheduled_version: u64) -> Self {
        Self { scheduled_version }
    }

    /// The tree was mutated after this task was scheduled; any positions or
    /// content the task captured may no longer be valid.
    pub fn is_stale<H: HostSelection>(&self, surface: &EditingSurface<H>) -> bool {
        surface.version() != self.scheduled_version
    }
}

type Task<H> = Box<dyn FnOnce(&mut EditingSurface<H>, TaskContext)>;

pub(crate) struct PendingTask<H: HostSelection> {
    context: TaskContext,
    task: Task<H>,
}

impl<H: HostSelection> PendingTask<H> {
    pub(crate) fn new<F>(context: TaskContext, task: F) -> Self
    where
        F: FnOnce(&mut EditingSurface<H>, TaskContext) + 'static,
    {
        Self {
            context,
            task: Box::new(task),
        }
    }

    pub(crate) fn run(self, surface: &mut EditingSurface<H>) {
        (self.task)(surface, self.context);
    }
}
