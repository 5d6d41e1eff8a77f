//! WealthBox API request and response types.
//!
//! Resource objects are opaque `serde_json::Value`s; the typed structs here
//! cover only the fields the client itself must read (pagination metadata,
//! the current user, user lookups) plus the filter and task-creation option
//! types passed into resource methods.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

/// Pagination metadata returned by list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    /// Total number of pages for the query.
    #[serde(default = "default_total_pages")]
    pub total_pages: u32,
    /// The page this response covers (1-based).
    #[serde(default)]
    pub page: u32,
}

fn default_total_pages() -> u32 {
    1
}

/// Envelope returned by `GET me`.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUserResponse {
    pub current_user: CurrentUser,
}

/// The authenticated user, as reported by `GET me`.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A WealthBox user record, as returned by `GET users`.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// The CRM record types a task, comment, or workflow can be attached to.
///
/// Serialized lowercase into `resource_type` query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    Contact,
    Task,
    Note,
    Event,
    Workflow,
    Opportunity,
    Project,
}

impl RecordType {
    /// The wire value used in `resource_type` parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Contact => "contact",
            RecordType::Task => "task",
            RecordType::Note => "note",
            RecordType::Event => "event",
            RecordType::Workflow => "workflow",
            RecordType::Opportunity => "opportunity",
            RecordType::Project => "project",
        }
    }
}

/// Workflow status filter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStatus {
    Active,
    Completed,
    Scheduled,
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Active => "active",
            WorkflowStatus::Completed => "completed",
            WorkflowStatus::Scheduled => "scheduled",
        }
    }
}

/// Sort order for opportunity listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// How [`make_user_map`](crate::WealthBoxClient::make_user_map) renders each
/// user into its display string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserMapFormat {
    /// `"{id}; {name}; {email}"`
    Full,
    /// The user's full name.
    Name,
    /// The first whitespace-separated word of the name.
    FirstName,
}

/// Filters for `get_contacts`.
#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    /// Record kind: `Person`, `Household`, or `Organization`.
    pub kind: Option<String>,
    /// Business classification: `Client`, `Prospect`, etc.
    pub contact_type: Option<String>,
    pub tag: Option<String>,
    /// Full-text name search.
    pub name: Option<String>,
    /// ISO-8601 timestamp lower bound on `updated_at`.
    pub updated_since: Option<String>,
    /// Additional raw query parameters (e.g. `per_page`).
    pub extra: Vec<(String, String)>,
}

impl ContactFilter {
    pub(crate) fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(kind) = &self.kind {
            params.push(("type".to_string(), kind.clone()));
        }
        if let Some(contact_type) = &self.contact_type {
            params.push(("contact_type".to_string(), contact_type.clone()));
        }
        if let Some(tag) = &self.tag {
            params.push(("tag".to_string(), tag.clone()));
        }
        if let Some(name) = &self.name {
            params.push(("name".to_string(), name.clone()));
        }
        if let Some(updated_since) = &self.updated_since {
            params.push(("updated_since".to_string(), updated_since.clone()));
        }
        params.extend(self.extra.iter().cloned());
        params
    }
}

/// Filters for `get_tasks`.
///
/// Unset fields fall back to the API defaults the client always sends:
/// `resource_type=contact` and `completed=false`.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Restrict to tasks linked to this record.
    pub resource_id: Option<u64>,
    /// The linked record's type; defaults to [`RecordType::Contact`].
    pub resource_type: Option<RecordType>,
    /// Restrict to tasks assigned to this user ID.
    pub assigned_to: Option<u64>,
    /// Completion filter; defaults to `false` (open tasks).
    pub completed: Option<bool>,
    /// Additional raw query parameters (e.g. `per_page`).
    pub extra: Vec<(String, String)>,
}

impl TaskFilter {
    pub(crate) fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            (
                "resource_type".to_string(),
                self.resource_type
                    .unwrap_or(RecordType::Contact)
                    .as_str()
                    .to_string(),
            ),
            (
                "completed".to_string(),
                self.completed.unwrap_or(false).to_string(),
            ),
        ];
        if let Some(resource_id) = self.resource_id {
            params.push(("resource_id".to_string(), resource_id.to_string()));
        }
        if let Some(assigned_to) = self.assigned_to {
            params.push(("assigned_to".to_string(), assigned_to.to_string()));
        }
        params.extend(self.extra.iter().cloned());
        params
    }
}

/// Filters for `get_workflows`.
#[derive(Debug, Clone, Default)]
pub struct WorkflowFilter {
    pub resource_id: Option<u64>,
    /// Defaults to [`RecordType::Contact`].
    pub resource_type: Option<RecordType>,
    /// Defaults to [`WorkflowStatus::Active`].
    pub status: Option<WorkflowStatus>,
    pub extra: Vec<(String, String)>,
}

impl WorkflowFilter {
    pub(crate) fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            (
                "resource_type".to_string(),
                self.resource_type
                    .unwrap_or(RecordType::Contact)
                    .as_str()
                    .to_string(),
            ),
            (
                "status".to_string(),
                self.status
                    .unwrap_or(WorkflowStatus::Active)
                    .as_str()
                    .to_string(),
            ),
        ];
        if let Some(resource_id) = self.resource_id {
            params.push(("resource_id".to_string(), resource_id.to_string()));
        }
        params.extend(self.extra.iter().cloned());
        params
    }
}

/// Filters for `get_opportunities`.
#[derive(Debug, Clone, Default)]
pub struct OpportunityFilter {
    pub resource_id: Option<u64>,
    pub order: Option<SortOrder>,
    /// Defaults to `true`.
    pub include_closed: Option<bool>,
    pub extra: Vec<(String, String)>,
}

impl OpportunityFilter {
    pub(crate) fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(resource_id) = self.resource_id {
            params.push(("resource_id".to_string(), resource_id.to_string()));
        }
        if let Some(order) = self.order {
            params.push(("order".to_string(), order.as_str().to_string()));
        }
        params.push((
            "include_closed".to_string(),
            self.include_closed.unwrap_or(true).to_string(),
        ));
        params.extend(self.extra.iter().cloned());
        params
    }
}

/// Who a new task should be assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignee {
    /// A user, by numeric ID.
    User(u64),
    /// A user, resolved by display name against `GET users`.
    UserNamed(String),
    /// A team, by numeric ID.
    Team(u64),
    /// A team, resolved by name against `GET teams`.
    TeamNamed(String),
}

/// A task category, by ID or by name (resolved against the category list).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryRef {
    Id(u64),
    Named(String),
}

/// Options for [`create_task_detailed`](crate::WealthBoxClient::create_task_detailed).
///
/// Everything is optional; an absent assignee resolves to the current user.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    /// Due date, serialized as `YYYY-MM-DDT00:00:00Z`.
    pub due_date: Option<NaiveDate>,
    pub assignee: Option<Assignee>,
    /// Contact IDs the task is linked to.
    pub linked_to: Vec<u64>,
    pub description: Option<String>,
    pub category: Option<CategoryRef>,
    /// Custom field values, matched by field name against the account's
    /// custom-field definitions.
    pub custom_fields: Vec<(String, Value)>,
}

/// Format a due date the way the WealthBox API expects it.
pub(crate) fn format_due_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%dT00:00:00Z").to_string()
}
