//! A small task-approval workflow engine.
//!
//! Templates describe an ordered list of form steps. Tasks are created from a
//! template snapshot, receive form data per step and move forward through
//! approve/reject decisions.
//!
//! # Example
//!
//! ```rust
//! use shinsa::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), WorkflowError> {
//! let store = StoreHandle::new(Backend::available(InMemoryStore::new()));
//! let templates = TemplateStore::new(store.clone());
//! let engine = TaskEngine::new(store);
//!
//! let template = templates.seed().await?;
//! let task = engine.create_task(NewTask::new(template.id)).await?;
//! assert_eq!(task.body.status, TaskStatus::Submitted);
//!
//! let task = engine
//!     .decide_step(&task.id, 0, DecisionRequest::new("approve").by("manager"))
//!     .await?;
//! assert_eq!(task.body.status, TaskStatus::InProgress);
//! assert_eq!(task.body.current_step_index, 1);
//! # Ok(())
//! # }
//! ```

mod backend;
mod engine;
mod memory;
mod templates;

// Re-export core types
pub use shinsa_core::*;

pub use backend::{Backend, StoreHandle, DEFAULT_STORE_TIMEOUT};
pub use engine::TaskEngine;
pub use memory::InMemoryStore;
pub use templates::{default_template, TemplateStore, DEFAULT_TEMPLATE_TITLE};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Backend, DecisionRequest, DocumentId, FormData, InMemoryStore, NewTask, StepStatus,
        StoreHandle, Stored, TaskEngine, TaskInstance, TaskStatus, TaskTemplate, TemplateStore,
        WorkflowError,
    };
}
