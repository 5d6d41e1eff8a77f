//! The resource table and per-resource CRUD methods.
//!
//! Every endpoint the client knows is one [`ResourceSpec`] entry: its URL
//! path, the key its collection responses answer under, and whether list
//! responses paginate. Irregularities live in the table instead of in
//! method bodies; the one that matters is `notes`, whose list endpoint
//! answers under `status_updates`.

use serde_json::{json, Value};

use super::client::WealthBoxClient;
use super::error::Result;
use super::types::{ContactFilter, OpportunityFilter, RecordType, TaskFilter, WorkflowFilter};

/// A WealthBox API resource: URL path, collection key, pagination support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSpec {
    /// URL path relative to the base URL.
    pub path: &'static str,
    /// The key list responses hold their item array under.
    pub collection_key: &'static str,
    /// Whether list responses carry `meta.total_pages`.
    pub paginated: bool,
}

const fn resource(path: &'static str) -> ResourceSpec {
    ResourceSpec {
        path,
        collection_key: path,
        paginated: true,
    }
}

const fn keyed(path: &'static str, collection_key: &'static str) -> ResourceSpec {
    ResourceSpec {
        path,
        collection_key,
        paginated: true,
    }
}

pub const CONTACTS: ResourceSpec = resource("contacts");
pub const TASKS: ResourceSpec = resource("tasks");
pub const EVENTS: ResourceSpec = resource("events");
pub const OPPORTUNITIES: ResourceSpec = resource("opportunities");
/// Notes answer under `status_updates`, not `notes`.
pub const NOTES: ResourceSpec = keyed("notes", "status_updates");
pub const PROJECTS: ResourceSpec = resource("projects");
pub const WORKFLOWS: ResourceSpec = resource("workflows");
pub const WORKFLOW_TEMPLATES: ResourceSpec = resource("workflow_templates");
pub const USERS: ResourceSpec = resource("users");
pub const TEAMS: ResourceSpec = resource("teams");
pub const COMMENTS: ResourceSpec = resource("comments");
pub const ACTIVITY: ResourceSpec = resource("activity");
pub const CONTACT_ROLES: ResourceSpec = resource("contact_roles");
pub const USER_GROUPS: ResourceSpec = resource("user_groups");
pub const TASK_CATEGORIES: ResourceSpec = keyed("categories/task_categories", "task_categories");
pub const CUSTOM_FIELDS: ResourceSpec = keyed("categories/custom_fields", "custom_fields");
/// The current-user endpoint returns a single object, never a collection.
pub const ME: ResourceSpec = ResourceSpec {
    path: "me",
    collection_key: "current_user",
    paginated: false,
};

/// Every table entry, for auditing.
pub const ALL: &[&ResourceSpec] = &[
    &CONTACTS,
    &TASKS,
    &EVENTS,
    &OPPORTUNITIES,
    &NOTES,
    &PROJECTS,
    &WORKFLOWS,
    &WORKFLOW_TEMPLATES,
    &USERS,
    &TEAMS,
    &COMMENTS,
    &ACTIVITY,
    &CONTACT_ROLES,
    &USER_GROUPS,
    &TASK_CATEGORIES,
    &CUSTOM_FIELDS,
    &ME,
];

fn item_path(resource: &ResourceSpec, id: u64) -> String {
    format!("{}/{}", resource.path, id)
}

impl WealthBoxClient {
    // --- Contacts ---

    /// List contacts matching the filter, across all pages.
    pub fn get_contacts(&self, filter: &ContactFilter) -> Result<Vec<Value>> {
        self.list(&CONTACTS, &filter.to_params())
    }

    /// Fetch one contact by ID.
    pub fn get_contact(&self, id: u64) -> Result<Value> {
        self.api_get_single(&CONTACTS, id)
    }

    /// Search contacts by name.
    pub fn get_contact_by_name(&self, name: &str) -> Result<Vec<Value>> {
        let filter = ContactFilter {
            name: Some(name.to_string()),
            ..Default::default()
        };
        self.get_contacts(&filter)
    }

    pub fn create_contact(&self, data: &Value) -> Result<Value> {
        self.api_post(CONTACTS.path, data)
    }

    pub fn update_contact(&self, id: u64, data: &Value) -> Result<Value> {
        self.api_put(&item_path(&CONTACTS, id), data)
    }

    pub fn delete_contact(&self, id: u64) -> Result<()> {
        self.api_delete(&item_path(&CONTACTS, id))
    }

    // --- Tasks ---

    /// List tasks matching the filter, across all pages.
    pub fn get_tasks(&self, filter: &TaskFilter) -> Result<Vec<Value>> {
        self.list(&TASKS, &filter.to_params())
    }

    pub fn get_task(&self, id: u64) -> Result<Value> {
        self.api_get_single(&TASKS, id)
    }

    /// Create a task from a raw payload. See
    /// [`create_task_detailed`](Self::create_task_detailed) for the variant
    /// that resolves names to IDs first.
    pub fn create_task(&self, data: &Value) -> Result<Value> {
        self.api_post(TASKS.path, data)
    }

    pub fn update_task(&self, id: u64, data: &Value) -> Result<Value> {
        self.api_put(&item_path(&TASKS, id), data)
    }

    pub fn delete_task(&self, id: u64) -> Result<()> {
        self.api_delete(&item_path(&TASKS, id))
    }

    // --- Workflows ---

    /// List workflows matching the filter, across all pages.
    pub fn get_workflows(&self, filter: &WorkflowFilter) -> Result<Vec<Value>> {
        self.list(&WORKFLOWS, &filter.to_params())
    }

    pub fn get_workflow(&self, id: u64) -> Result<Value> {
        self.api_get_single(&WORKFLOWS, id)
    }

    pub fn create_workflow(&self, data: &Value) -> Result<Value> {
        self.api_post(WORKFLOWS.path, data)
    }

    pub fn delete_workflow(&self, id: u64) -> Result<()> {
        self.api_delete(&item_path(&WORKFLOWS, id))
    }

    pub fn get_workflow_templates(&self) -> Result<Vec<Value>> {
        self.list(&WORKFLOW_TEMPLATES, &[])
    }

    /// Update a single workflow step, e.g. `{"completed": true}`.
    pub fn update_workflow_step(&self, step_id: u64, data: &Value) -> Result<Value> {
        self.api_put(&format!("workflow_steps/{}", step_id), data)
    }

    // --- Events ---

    /// List events, optionally restricted to one linked record.
    pub fn get_events(&self, resource_id: Option<u64>) -> Result<Vec<Value>> {
        let mut params = Vec::new();
        if let Some(id) = resource_id {
            params.push(("resource_id".to_string(), id.to_string()));
        }
        self.list(&EVENTS, &params)
    }

    pub fn get_event(&self, id: u64) -> Result<Value> {
        self.api_get_single(&EVENTS, id)
    }

    pub fn create_event(&self, data: &Value) -> Result<Value> {
        self.api_post(EVENTS.path, data)
    }

    pub fn update_event(&self, id: u64, data: &Value) -> Result<Value> {
        self.api_put(&item_path(&EVENTS, id), data)
    }

    pub fn delete_event(&self, id: u64) -> Result<()> {
        self.api_delete(&item_path(&EVENTS, id))
    }

    // --- Opportunities ---

    /// List opportunities matching the filter, across all pages.
    pub fn get_opportunities(&self, filter: &OpportunityFilter) -> Result<Vec<Value>> {
        self.list(&OPPORTUNITIES, &filter.to_params())
    }

    pub fn get_opportunity(&self, id: u64) -> Result<Value> {
        self.api_get_single(&OPPORTUNITIES, id)
    }

    pub fn create_opportunity(&self, data: &Value) -> Result<Value> {
        self.api_post(OPPORTUNITIES.path, data)
    }

    pub fn update_opportunity(&self, id: u64, data: &Value) -> Result<Value> {
        self.api_put(&item_path(&OPPORTUNITIES, id), data)
    }

    pub fn delete_opportunity(&self, id: u64) -> Result<()> {
        self.api_delete(&item_path(&OPPORTUNITIES, id))
    }

    // --- Notes ---

    /// List the notes linked to a record.
    ///
    /// The notes endpoint answers under `status_updates`; the table entry
    /// handles that, so callers see plain note objects.
    pub fn get_notes(&self, resource_id: u64) -> Result<Vec<Value>> {
        let params = vec![("resource_id".to_string(), resource_id.to_string())];
        self.list(&NOTES, &params)
    }

    pub fn get_note(&self, id: u64) -> Result<Value> {
        self.api_get_single(&NOTES, id)
    }

    pub fn create_note(&self, data: &Value) -> Result<Value> {
        self.api_post(NOTES.path, data)
    }

    pub fn update_note(&self, id: u64, data: &Value) -> Result<Value> {
        self.api_put(&item_path(&NOTES, id), data)
    }

    // --- Projects ---

    pub fn get_projects(&self) -> Result<Vec<Value>> {
        self.list(&PROJECTS, &[])
    }

    pub fn get_project(&self, id: u64) -> Result<Value> {
        self.api_get_single(&PROJECTS, id)
    }

    pub fn create_project(&self, data: &Value) -> Result<Value> {
        self.api_post(PROJECTS.path, data)
    }

    pub fn update_project(&self, id: u64, data: &Value) -> Result<Value> {
        self.api_put(&item_path(&PROJECTS, id), data)
    }

    pub fn delete_project(&self, id: u64) -> Result<()> {
        self.api_delete(&item_path(&PROJECTS, id))
    }

    // --- Users, teams, and account-level lookups ---

    pub fn get_users(&self) -> Result<Vec<Value>> {
        self.list(&USERS, &[])
    }

    pub fn get_teams(&self) -> Result<Vec<Value>> {
        self.list(&TEAMS, &[])
    }

    pub fn get_user_groups(&self) -> Result<Vec<Value>> {
        self.list(&USER_GROUPS, &[])
    }

    pub fn get_contact_roles(&self) -> Result<Vec<Value>> {
        self.list(&CONTACT_ROLES, &[])
    }

    /// The account-wide activity stream.
    pub fn get_activity(&self) -> Result<Vec<Value>> {
        self.list(&ACTIVITY, &[])
    }

    pub fn get_task_categories(&self) -> Result<Vec<Value>> {
        self.list(&TASK_CATEGORIES, &[])
    }

    pub fn get_custom_fields(&self) -> Result<Vec<Value>> {
        self.list(&CUSTOM_FIELDS, &[])
    }

    // --- Comments ---

    /// List the comments attached to one record.
    pub fn get_comments(&self, resource_id: u64, resource_type: RecordType) -> Result<Vec<Value>> {
        let params = vec![
            ("resource_id".to_string(), resource_id.to_string()),
            ("resource_type".to_string(), resource_type.as_str().to_string()),
        ];
        self.list(&COMMENTS, &params)
    }

    // --- Household members ---

    /// Add a contact to a household.
    pub fn add_household_member(&self, household_id: u64, contact_id: u64) -> Result<Value> {
        let data = json!({
            "household_id": household_id,
            "contact_id": contact_id,
        });
        self.api_post("household_members", &data)
    }

    /// Remove a contact from a household.
    pub fn remove_household_member(&self, household_id: u64, contact_id: u64) -> Result<()> {
        self.api_delete(&format!("household_members/{}/{}", household_id, contact_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notes_answer_under_status_updates() {
        assert_eq!(NOTES.path, "notes");
        assert_eq!(NOTES.collection_key, "status_updates");
    }

    #[test]
    fn test_me_is_not_paginated() {
        assert!(!ME.paginated);
    }

    #[test]
    fn test_category_paths_are_nested() {
        assert_eq!(TASK_CATEGORIES.path, "categories/task_categories");
        assert_eq!(TASK_CATEGORIES.collection_key, "task_categories");
        assert_eq!(CUSTOM_FIELDS.path, "categories/custom_fields");
    }

    #[test]
    fn test_table_paths_are_unique() {
        for (i, a) in ALL.iter().enumerate() {
            for b in &ALL[i + 1..] {
                assert_ne!(a.path, b.path, "duplicate resource path");
            }
        }
    }

    #[test]
    fn test_item_path() {
        assert_eq!(item_path(&CONTACTS, 123), "contacts/123");
    }
}
