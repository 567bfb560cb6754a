//! Task workflow engine.
//!
//! Each operation is a single read-modify-write against the store. Writes
//! carry the version that was read, so two requests racing on the same task
//! cannot silently overwrite each other: the loser gets
//! [`WorkflowError::Conflict`].

use crate::backend::StoreHandle;
use shinsa_core::{
    collection, fields, DecisionRequest, DocumentId, EntityKind, Filter, FormData, NewTask, Sort,
    Stored, TaskInstance, TaskStatus, TaskTemplate, WorkflowError, WorkflowResult,
};
use tracing::{debug, info, warn};

/// Instantiates tasks from templates and moves them through their steps.
#[derive(Debug, Clone)]
pub struct TaskEngine {
    store: StoreHandle,
}

impl TaskEngine {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Creates a task by snapshotting the referenced template's steps.
    pub async fn create_task(&self, request: NewTask) -> WorkflowResult<Stored<TaskInstance>> {
        let template: Stored<TaskTemplate> = self
            .store
            .get(collection::TEMPLATES, &request.template_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::Template, &request.template_id))?;

        let task = TaskInstance::from_template(
            template.id,
            &template.body,
            request.title,
            request.assignee,
        );
        let stored = self.store.insert(collection::TASKS, &task).await?;

        info!(
            task_id = %stored.id,
            template_id = %stored.body.template_id,
            steps = stored.body.steps.len(),
            "Created task"
        );
        Ok(stored)
    }

    /// Lists tasks, newest first, optionally restricted to one status.
    pub async fn list_tasks(
        &self,
        status: Option<TaskStatus>,
    ) -> WorkflowResult<Vec<Stored<TaskInstance>>> {
        let filter = match status {
            Some(status) => Filter::new().eq("status", status.as_str()),
            None => Filter::new(),
        };
        let tasks = self
            .store
            .find(
                collection::TASKS,
                &filter,
                Some(&Sort::descending(fields::CREATED_AT)),
            )
            .await?;
        debug!(count = tasks.len(), status = ?status, "Listed tasks");
        Ok(tasks)
    }

    pub async fn get_task(&self, id: &DocumentId) -> WorkflowResult<Stored<TaskInstance>> {
        self.store
            .get(collection::TASKS, id)
            .await?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::Task, id))
    }

    /// Replaces a step's form data and puts the step in review.
    ///
    /// The data is stored as given, without checking it against the step's
    /// field definitions.
    pub async fn submit_step_form(
        &self,
        id: &DocumentId,
        step_index: i64,
        data: FormData,
    ) -> WorkflowResult<Stored<TaskInstance>> {
        let mut task = self.get_task(id).await?;
        if let Err(e) = task.body.submit_form(step_index, data) {
            warn!(task_id = %id, step_index, "Rejected form submission: {}", e);
            return Err(e);
        }

        let saved = self.persist(&task).await?;
        info!(task_id = %id, step_index, "Step form submitted");
        Ok(saved)
    }

    /// Records an approve/reject decision on a step and advances the task.
    pub async fn decide_step(
        &self,
        id: &DocumentId,
        step_index: i64,
        request: DecisionRequest,
    ) -> WorkflowResult<Stored<TaskInstance>> {
        let mut task = self.get_task(id).await?;
        let decision = match task.body.decide(step_index, request) {
            Ok(decision) => decision,
            Err(e) => {
                warn!(task_id = %id, step_index, "Rejected decision: {}", e);
                return Err(e);
            }
        };

        let saved = self.persist(&task).await?;
        info!(
            task_id = %id,
            step_index,
            decision = ?decision,
            status = %saved.body.status,
            current_step_index = saved.body.current_step_index,
            "Step decided"
        );
        Ok(saved)
    }

    async fn persist(&self, task: &Stored<TaskInstance>) -> WorkflowResult<Stored<TaskInstance>> {
        match self.store.update(collection::TASKS, task).await {
            Ok(Some(saved)) => Ok(saved),
            Ok(None) => Err(WorkflowError::not_found(EntityKind::Task, &task.id)),
            Err(e) => {
                warn!(task_id = %task.id, "Failed to persist task: {}", e);
                Err(e.into())
            }
        }
    }
}
