//! Template store and the canonical default template.

use crate::backend::StoreHandle;
use shinsa_core::{
    collection, fields, DocumentId, EntityKind, FieldType, Filter, FormField, Sort, Stored,
    TaskTemplate, TemplateStep, WorkflowError, WorkflowResult,
};
use tracing::{debug, info};

/// Title used to find the seeded template.
pub const DEFAULT_TEMPLATE_TITLE: &str = "General Request Approval";

/// The three-step request approval template created by [`TemplateStore::seed`].
pub fn default_template() -> TaskTemplate {
    TaskTemplate::new(DEFAULT_TEMPLATE_TITLE)
        .with_description("Three-step approval with basic fields")
        .with_step(
            TemplateStep::new("Details")
                .with_description("Provide request details")
                .with_field(FormField::new("subject", "Subject", FieldType::Text).required())
                .with_field(FormField::new("amount", "Amount", FieldType::Number).required())
                .with_field(FormField::new("due_date", "Due Date", FieldType::Date)),
        )
        .with_step(
            TemplateStep::new("Manager Review")
                .with_description("Manager approves or rejects")
                .with_field(FormField::new(
                    "manager_comment",
                    "Manager Comment",
                    FieldType::Text,
                )),
        )
        .with_step(
            TemplateStep::new("Finance Review")
                .with_description("Finance verifies and approves")
                .with_field(
                    FormField::new("cost_center", "Cost Center", FieldType::Select)
                        .with_options(["1001", "2002", "3003"])
                        .required(),
                ),
        )
}

/// Holds reusable workflow definitions. Templates are read-only once stored.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    store: StoreHandle,
}

impl TemplateStore {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Ensures the default template exists and returns it.
    ///
    /// Repeated calls return the same stored template.
    pub async fn seed(&self) -> WorkflowResult<Stored<TaskTemplate>> {
        let by_title = Filter::new().eq("title", DEFAULT_TEMPLATE_TITLE);
        if let Some(existing) = self
            .store
            .find_one::<TaskTemplate>(collection::TEMPLATES, &by_title)
            .await?
        {
            debug!(template_id = %existing.id, "Default template already seeded");
            return Ok(existing);
        }

        let stored = self
            .store
            .insert(collection::TEMPLATES, &default_template())
            .await?;
        info!(template_id = %stored.id, "Seeded default template");
        Ok(stored)
    }

    /// Validates and stores a new template.
    pub async fn create(&self, template: TaskTemplate) -> WorkflowResult<Stored<TaskTemplate>> {
        template.validate()?;
        let stored = self.store.insert(collection::TEMPLATES, &template).await?;
        info!(
            template_id = %stored.id,
            steps = stored.body.steps.len(),
            "Created template"
        );
        Ok(stored)
    }

    pub async fn get(&self, id: &DocumentId) -> WorkflowResult<Stored<TaskTemplate>> {
        self.store
            .get(collection::TEMPLATES, id)
            .await?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::Template, id))
    }

    /// All templates, newest first.
    pub async fn list(&self) -> WorkflowResult<Vec<Stored<TaskTemplate>>> {
        Ok(self
            .store
            .find(
                collection::TEMPLATES,
                &Filter::new(),
                Some(&Sort::descending(fields::CREATED_AT)),
            )
            .await?)
    }
}
