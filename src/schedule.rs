//! Deferred work scheduling
//!
//! The interaction layer is single-threaded and event-driven; its only
//! suspension points are render-frame boundaries and fire-and-forget timers.
//! [`TaskQueue`] makes both explicit: the host drains frame tasks at the next
//! render opportunity and timer tasks whenever its clock advances. Nothing
//! here blocks, and a due task whose element has since been removed is the
//! executor's no-op, not the queue's error.

use crate::dom::ElementHandle;

/// Delay before a specialty tag's pulse transform is cleared.
pub const TAG_PULSE_MS: u64 = 150;

/// Duration of the highlight flash on a scrolled-to service section.
pub const HIGHLIGHT_FLASH_MS: u64 = 2000;

/// Delay before the one-shot service-highlights re-layout workaround.
pub const RELAYOUT_DELAY_MS: u64 = 100;

/// A unit of deferred work owned by the page controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    /// Install the visibility machine's observers once the reference regions
    /// can exist in the render tree.
    InstallVisibilityObservers,
    /// Clear the transient scale transform on a specialty tag.
    ClearTagPulse(ElementHandle),
    /// Remove the highlight flash from a scrolled-to section.
    ClearHighlightFlash(ElementHandle),
    /// One-shot re-layout of the service highlights region.
    RefreshServiceHighlights,
}

#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    due_at_ms: u64,
    task: DeferredTask,
}

/// Frame-boundary and timer task queue.
#[derive(Debug, Default)]
pub struct TaskQueue {
    frame_tasks: Vec<DeferredTask>,
    timers: Vec<TimerEntry>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a task at the next render opportunity.
    pub fn defer_to_frame(&mut self, task: DeferredTask) {
        self.frame_tasks.push(task);
    }

    /// Run a task once `delay_ms` has elapsed past `now_ms`.
    pub fn defer_after(&mut self, task: DeferredTask, now_ms: u64, delay_ms: u64) {
        self.timers.push(TimerEntry {
            due_at_ms: now_ms.saturating_add(delay_ms),
            task,
        });
    }

    /// Drain all tasks waiting on the next frame, in submission order.
    pub fn take_frame_tasks(&mut self) -> Vec<DeferredTask> {
        std::mem::take(&mut self.frame_tasks)
    }

    /// Drain all timers due at or before `now_ms`, ordered by due time.
    pub fn take_due(&mut self, now_ms: u64) -> Vec<DeferredTask> {
        let mut due: Vec<TimerEntry> = Vec::new();
        let mut remaining: Vec<TimerEntry> = Vec::new();
        for entry in self.timers.drain(..) {
            if entry.due_at_ms <= now_ms {
                due.push(entry);
            } else {
                remaining.push(entry);
            }
        }
        self.timers = remaining;
        due.sort_by_key(|entry| entry.due_at_ms);
        due.into_iter().map(|entry| entry.task).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_tasks.is_empty() && self.timers.is_empty()
    }

    /// Drop all pending work. Used at teardown so no stale task can run
    /// against a disposed controller.
    pub fn clear(&mut self) {
        self.frame_tasks.clear();
        self.timers.clear();
    }
}
