//! ---
//! cb_section: "04-bench"
//! cb_subsection: "module"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "Task queue with lifecycle transitions and cell bindings."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---
use std::time::Duration;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, info};

use cellbench_sim::TaskProfile;

use crate::errors::{BenchError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum TaskStatus {
    Pending,
    Running,
    Paused,
    Completed,
}

/// A scheduled operation. The profile is fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub profile: TaskProfile,
    /// Run time after which the task completes; `None` runs until paused.
    pub duration: Option<Duration>,
    /// Informational nameplate capacity the operator entered, in Ah.
    pub capacity_ah: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub status: TaskStatus,
    pub elapsed: Duration,
}

impl Task {
    pub fn remaining(&self) -> Option<Duration> {
        self.duration
            .map(|duration| duration.saturating_sub(self.elapsed))
    }
}

/// Insertion-ordered task collection plus the cell-to-task binding table.
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    tasks: IndexMap<String, Task>,
    bindings: IndexMap<String, String>,
    next_index: usize,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a new task in `Pending` state and return its identifier.
    pub fn create(
        &mut self,
        profile: TaskProfile,
        duration: Option<Duration>,
        capacity_ah: Option<f64>,
    ) -> Result<String> {
        profile.validate()?;
        self.next_index += 1;
        let id = format!("task_{}", self.next_index);
        self.tasks.insert(
            id.clone(),
            Task {
                id: id.clone(),
                profile,
                duration,
                capacity_ah,
                created_at: Utc::now(),
                status: TaskStatus::Pending,
                elapsed: Duration::ZERO,
            },
        );
        info!(task = %id, kind = %profile.kind(), ?duration, "task created");
        Ok(id)
    }

    pub fn start(&mut self, id: &str) -> Result<()> {
        let task = self.task_mut(id)?;
        match task.status {
            TaskStatus::Pending | TaskStatus::Paused => {
                task.status = TaskStatus::Running;
                info!(task = %id, "task running");
                Ok(())
            }
            TaskStatus::Running => Ok(()),
            TaskStatus::Completed => Err(BenchError::InvalidTransition {
                task: id.to_owned(),
                action: "start",
                status: task.status,
            }),
        }
    }

    pub fn pause(&mut self, id: &str) -> Result<()> {
        let task = self.task_mut(id)?;
        match task.status {
            TaskStatus::Running => {
                task.status = TaskStatus::Paused;
                info!(task = %id, "task paused");
                Ok(())
            }
            TaskStatus::Paused => Ok(()),
            status => Err(BenchError::InvalidTransition {
                task: id.to_owned(),
                action: "pause",
                status,
            }),
        }
    }

    /// Pause every running task and return their identifiers.
    pub fn pause_all(&mut self) -> Vec<String> {
        let mut paused = Vec::new();
        for task in self.tasks.values_mut() {
            if task.status == TaskStatus::Running {
                task.status = TaskStatus::Paused;
                paused.push(task.id.clone());
            }
        }
        paused
    }

    /// Remove a task and release every cell bound to it.
    pub fn delete(&mut self, id: &str) -> Result<Task> {
        let task = self
            .tasks
            .shift_remove(id)
            .ok_or_else(|| BenchError::UnknownTask(id.to_owned()))?;
        self.bindings.retain(|_, task_id| task_id != id);
        info!(task = %id, "task deleted");
        Ok(task)
    }

    /// Bind `cell` to `task`. A cell follows at most one task; binding it again
    /// moves it.
    pub fn assign(&mut self, task: &str, cell: &str) -> Result<()> {
        if !self.tasks.contains_key(task) {
            return Err(BenchError::UnknownTask(task.to_owned()));
        }
        if let Some(previous) = self.bindings.insert(cell.to_owned(), task.to_owned()) {
            if previous != task {
                debug!(cell, from = %previous, to = task, "cell rebound");
            }
        }
        Ok(())
    }

    pub fn unbind(&mut self, cell: &str) -> Option<String> {
        self.bindings.shift_remove(cell)
    }

    pub fn task_for(&self, cell: &str) -> Option<&Task> {
        self.bindings
            .get(cell)
            .and_then(|task_id| self.tasks.get(task_id))
    }

    /// Profile the simulator should apply to `cell`, if its task is running.
    pub fn active_profile_for(&self, cell: &str) -> Option<TaskProfile> {
        self.task_for(cell)
            .filter(|task| task.status == TaskStatus::Running)
            .map(|task| task.profile)
    }

    pub fn bound_cells(&self, task: &str) -> Vec<&str> {
        self.bindings
            .iter()
            .filter(|(_, task_id)| task_id.as_str() == task)
            .map(|(cell, _)| cell.as_str())
            .collect()
    }

    /// Accumulate run time on running tasks; those past their duration are
    /// marked `Completed` and returned.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<String> {
        let mut completed = Vec::new();
        for task in self.tasks.values_mut() {
            if task.status != TaskStatus::Running {
                continue;
            }
            task.elapsed += elapsed;
            if task.duration.is_some_and(|limit| task.elapsed >= limit) {
                task.status = TaskStatus::Completed;
                info!(task = %task.id, elapsed_secs = task.elapsed.as_secs_f64(), "task completed");
                completed.push(task.id.clone());
            }
        }
        completed
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn task_mut(&mut self, id: &str) -> Result<&mut Task> {
        self.tasks
            .get_mut(id)
            .ok_or_else(|| BenchError::UnknownTask(id.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charge() -> TaskProfile {
        TaskProfile::cc_cv(2.0, 4.0).unwrap()
    }

    #[test]
    fn lifecycle_transitions() {
        let mut queue = TaskQueue::new();
        let id = queue.create(charge(), None, Some(10.0)).unwrap();
        assert_eq!(id, "task_1");
        assert_eq!(queue.get(&id).unwrap().status, TaskStatus::Pending);

        assert!(matches!(
            queue.pause(&id),
            Err(BenchError::InvalidTransition { .. })
        ));
        queue.start(&id).unwrap();
        queue.pause(&id).unwrap();
        assert_eq!(queue.get(&id).unwrap().status, TaskStatus::Paused);
        queue.start(&id).unwrap();
        assert_eq!(queue.get(&id).unwrap().status, TaskStatus::Running);
    }

    #[test]
    fn completed_is_terminal() {
        let mut queue = TaskQueue::new();
        let id = queue
            .create(TaskProfile::Idle, Some(Duration::from_secs(2)), None)
            .unwrap();
        queue.start(&id).unwrap();
        assert!(queue.advance(Duration::from_secs(1)).is_empty());
        assert_eq!(queue.advance(Duration::from_secs(1)), vec![id.clone()]);
        let err = queue.start(&id).unwrap_err();
        assert_eq!(err.to_string(), "task task_1 cannot start while Completed");
        assert_eq!(queue.get(&id).unwrap().remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn only_running_tasks_drive_cells() {
        let mut queue = TaskQueue::new();
        let id = queue.create(charge(), None, None).unwrap();
        queue.assign(&id, "cell_1_nmc").unwrap();
        assert_eq!(queue.active_profile_for("cell_1_nmc"), None);
        queue.start(&id).unwrap();
        assert_eq!(queue.active_profile_for("cell_1_nmc"), Some(charge()));
        assert_eq!(queue.active_profile_for("cell_2_nmc"), None);
    }

    #[test]
    fn rebinding_moves_cell_and_delete_releases() {
        let mut queue = TaskQueue::new();
        let a = queue.create(charge(), None, None).unwrap();
        let b = queue.create(TaskProfile::Idle, None, None).unwrap();
        queue.assign(&a, "c1").unwrap();
        queue.assign(&a, "c2").unwrap();
        queue.assign(&b, "c1").unwrap();
        assert_eq!(queue.bound_cells(&a), vec!["c2"]);
        assert_eq!(queue.bound_cells(&b), vec!["c1"]);

        queue.delete(&a).unwrap();
        assert!(queue.task_for("c2").is_none());
        assert!(matches!(
            queue.assign(&a, "c2"),
            Err(BenchError::UnknownTask(_))
        ));
        assert_eq!(queue.unbind("c1"), Some(b));
    }

    #[test]
    fn pause_all_only_touches_running() {
        let mut queue = TaskQueue::new();
        let a = queue.create(charge(), None, None).unwrap();
        let _b = queue.create(TaskProfile::Idle, None, None).unwrap();
        queue.start(&a).unwrap();
        assert_eq!(queue.pause_all(), vec![a]);
        assert!(queue.iter().all(|task| task.status != TaskStatus::Running));
    }

    #[test]
    fn create_rejects_invalid_profile() {
        let mut queue = TaskQueue::new();
        let bad = TaskProfile::CcCd {
            target_current: -1.0,
        };
        assert!(matches!(
            queue.create(bad, None, None),
            Err(BenchError::Model(_))
        ));
        assert!(queue.is_empty());
    }
}
