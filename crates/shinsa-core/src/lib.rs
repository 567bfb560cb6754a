//! Core types for the shinsa approval workflow.
//!
//! Holds the data model, the error types and the storage port. It does no I/O
//! and pulls in no async runtime; storage backends depend on it to implement
//! [`DocumentStore`].
//!
//! # Core Types
//!
//! - [`TaskTemplate`] - Reusable, ordered list of form steps
//! - [`TaskInstance`] - A task snapshotted from a template, with the step
//!   state machine ([`TaskInstance::submit_form`], [`TaskInstance::decide`])
//! - [`Stored`] - A persisted value with its identifier and version
//! - [`DocumentStore`] - The storage port
//! - [`WorkflowError`] / [`StoreError`] - Error types

mod error;
mod ids;
mod model;
mod store;

pub use error::{EntityKind, StoreError, StoreResult, WorkflowError, WorkflowResult};
pub use ids::{DocumentId, FieldKey, StepName};
pub use model::{
    Decision, DecisionRequest, FieldType, FormData, FormField, NewTask, StepInstance, StepStatus,
    TaskInstance, TaskStatus, TaskTemplate, TemplateStep,
};
pub use store::{
    collection, fields, to_document, Document, DocumentStore, Filter, Sort, SortOrder, Stored,
};
