//! Templates, task instances and the step state machine.

use crate::error::{WorkflowError, WorkflowResult};
use crate::ids::{DocumentId, FieldKey, StepName};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Submitted values of a step form, keyed by field key.
///
/// Values are kept as arbitrary JSON; they are not checked against the
/// step's field definitions.
pub type FormData = BTreeMap<FieldKey, Value>;

/// Input type of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text.
    #[default]
    Text,
    /// Numeric input.
    Number,
    /// Calendar date.
    Date,
    /// One of a fixed list of options.
    Select,
    /// Boolean toggle.
    Checkbox,
}

/// A single input on a step form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub key: FieldKey,
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    /// Choices for [`FieldType::Select`]; absent for every other type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl FormField {
    /// Creates an optional field with no options.
    pub fn new(key: impl Into<FieldKey>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            field_type,
            required: false,
            options: None,
        }
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the choices of a select field.
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }
}

/// One step of a [`TaskTemplate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateStep {
    pub name: StepName,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FormField>,
}

impl TemplateStep {
    pub fn new(name: impl Into<StepName>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }
}

/// A reusable workflow definition: an ordered list of form steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub steps: Vec<TemplateStep>,
}

impl TaskTemplate {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            steps: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_step(mut self, step: TemplateStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Checks the structural shape of the template.
    ///
    /// Field keys must be unique within a step but may repeat across steps.
    pub fn validate(&self) -> WorkflowResult<()> {
        if self.title.trim().is_empty() {
            return Err(WorkflowError::InvalidTemplate(
                "title must not be empty".to_string(),
            ));
        }
        if self.steps.is_empty() {
            return Err(WorkflowError::InvalidTemplate(
                "template must have at least one step".to_string(),
            ));
        }

        for step in &self.steps {
            let mut seen = HashSet::new();
            for field in &step.fields {
                if !seen.insert(field.key.as_str()) {
                    return Err(WorkflowError::InvalidTemplate(format!(
                        "duplicate field key '{}' in step '{}'",
                        field.key, step.name
                    )));
                }
                match (field.field_type, &field.options) {
                    (FieldType::Select, Some(options)) if !options.is_empty() => {}
                    (FieldType::Select, _) => {
                        return Err(WorkflowError::InvalidTemplate(format!(
                            "select field '{}' in step '{}' needs options",
                            field.key, step.name
                        )));
                    }
                    (_, Some(_)) => {
                        return Err(WorkflowError::InvalidTemplate(format!(
                            "field '{}' in step '{}' is not a select and cannot have options",
                            field.key, step.name
                        )));
                    }
                    (_, None) => {}
                }
            }
        }

        Ok(())
    }
}

/// Review state of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    InReview,
    Approved,
    Rejected,
}

impl StepStatus {
    /// Returns `true` once a decision has been recorded.
    pub fn is_decided(&self) -> bool {
        matches!(self, StepStatus::Approved | StepStatus::Rejected)
    }
}

/// A template step copied into a task, plus its review state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInstance {
    pub name: StepName,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub status: StepStatus,
    #[serde(default)]
    pub form_data: FormData,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub approved_by: Option<String>,
}

impl From<&TemplateStep> for StepInstance {
    fn from(step: &TemplateStep) -> Self {
        Self {
            name: step.name.clone(),
            description: step.description.clone(),
            fields: step.fields.clone(),
            status: StepStatus::Pending,
            form_data: FormData::new(),
            comment: None,
            approved_by: None,
        }
    }
}

/// Aggregate state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Draft,
    #[default]
    Submitted,
    InProgress,
    Approved,
    Rejected,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Draft => "draft",
            TaskStatus::Submitted => "submitted",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Approved => "approved",
            TaskStatus::Rejected => "rejected",
        }
    }

    /// Returns `true` for states the engine never leaves.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Approved | TaskStatus::Rejected)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(TaskStatus::Draft),
            "submitted" => Ok(TaskStatus::Submitted),
            "in_progress" => Ok(TaskStatus::InProgress),
            "approved" => Ok(TaskStatus::Approved),
            "rejected" => Ok(TaskStatus::Rejected),
            other => Err(WorkflowError::InvalidArgument(format!(
                "Invalid status: {}",
                other
            ))),
        }
    }
}

/// A reviewer's verdict on a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    /// The step status this decision produces.
    pub fn step_status(self) -> StepStatus {
        match self {
            Decision::Approve => StepStatus::Approved,
            Decision::Reject => StepStatus::Rejected,
        }
    }
}

impl FromStr for Decision {
    type Err = WorkflowError;

    /// Parses `approve` or `reject`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "approve" => Ok(Decision::Approve),
            "reject" => Ok(Decision::Reject),
            _ => Err(WorkflowError::InvalidArgument("Invalid action".to_string())),
        }
    }
}

/// Request to instantiate a task from a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub template_id: DocumentId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
}

impl NewTask {
    pub fn new(template_id: impl Into<DocumentId>) -> Self {
        Self {
            template_id: template_id.into(),
            title: None,
            assignee: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }
}

/// An approve/reject request for one step.
///
/// `action` stays a raw string so that an unknown action is reported only
/// after the task and step index have been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub action: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub actor: Option<String>,
}

impl DecisionRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            comment: None,
            actor: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn by(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

/// A task created from a template, tracking progress step by step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInstance {
    pub template_id: DocumentId,
    pub title: String,
    #[serde(default)]
    pub assignee: Option<String>,
    pub steps: Vec<StepInstance>,
    #[serde(default)]
    pub current_step_index: usize,
    #[serde(default)]
    pub status: TaskStatus,
}

impl TaskInstance {
    /// Snapshots the template's steps into a fresh task.
    ///
    /// A missing or empty title falls back to the template title.
    pub fn from_template(
        template_id: DocumentId,
        template: &TaskTemplate,
        title: Option<String>,
        assignee: Option<String>,
    ) -> Self {
        Self {
            template_id,
            title: title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| template.title.clone()),
            assignee,
            steps: template.steps.iter().map(StepInstance::from).collect(),
            current_step_index: 0,
            status: TaskStatus::Submitted,
        }
    }

    /// Resolves a caller-supplied step index.
    pub fn step_index(&self, index: i64) -> WorkflowResult<usize> {
        usize::try_from(index)
            .ok()
            .filter(|i| *i < self.steps.len())
            .ok_or_else(|| WorkflowError::InvalidArgument("Invalid step index".to_string()))
    }

    pub fn current_step(&self) -> Option<&StepInstance> {
        self.steps.get(self.current_step_index)
    }

    /// Replaces a step's form data and puts the step in review.
    ///
    /// Task status and `current_step_index` are untouched.
    pub fn submit_form(&mut self, index: i64, data: FormData) -> WorkflowResult<&StepInstance> {
        let index = self.step_index(index)?;
        let step = &mut self.steps[index];
        step.form_data = data;
        step.status = StepStatus::InReview;
        Ok(step)
    }

    /// Records an approve/reject decision and advances the task.
    ///
    /// An approval moves the current index to the following step, clamped to
    /// the last one. A rejection leaves it on the rejected step. The index is
    /// never moved backward, and a rejected or approved task takes no further
    /// decisions.
    pub fn decide(&mut self, index: i64, request: DecisionRequest) -> WorkflowResult<Decision> {
        let index = self.step_index(index)?;
        let decision: Decision = request.action.parse()?;
        if self.status.is_terminal() {
            return Err(WorkflowError::InvalidArgument(format!(
                "Task is already {}",
                self.status
            )));
        }

        let step = &mut self.steps[index];
        step.comment = request.comment;
        step.approved_by = request.actor;
        step.status = decision.step_status();

        let last = self.steps.len() - 1;
        let target = match decision {
            Decision::Reject => index,
            Decision::Approve => (index + 1).min(last),
        };
        self.status = match decision {
            Decision::Reject => TaskStatus::Rejected,
            Decision::Approve if index == last => TaskStatus::Approved,
            Decision::Approve => TaskStatus::InProgress,
        };
        self.current_step_index = self.current_step_index.max(target);

        Ok(decision)
    }
}
