//! Composite helpers built on top of the resource methods.
//!
//! Each helper performs a base fetch plus one or more dependent requests
//! and merges the results: attaching comments to fetched records, replacing
//! user-ID references with display names, and resolving human-readable
//! names to IDs before task creation. Failure policy is all-or-nothing; the
//! first dependent fetch that fails aborts the whole call.

use std::collections::HashMap;

use serde_json::{json, Value};

use super::client::WealthBoxClient;
use super::error::{ApiError, Result};
use super::types::{
    format_due_date, Assignee, CategoryRef, NewTask, RecordType, User, UserMapFormat,
    WorkflowFilter,
};

/// Object fields whose integer values are user-ID references.
const USER_ID_FIELDS: &[&str] = &["creator", "assigned_to"];

impl WealthBoxClient {
    /// List a record's notes with each note's comments attached under a
    /// `comments` field.
    pub fn get_notes_with_comments(&self, resource_id: u64) -> Result<Vec<Value>> {
        let notes = self.get_notes(resource_id)?;
        self.attach_comments(notes, RecordType::Note)
    }

    /// List events with each event's comments attached under a `comments`
    /// field.
    pub fn get_events_with_comments(&self, resource_id: Option<u64>) -> Result<Vec<Value>> {
        let events = self.get_events(resource_id)?;
        self.attach_comments(events, RecordType::Event)
    }

    /// List a record's workflows with each workflow's comments attached
    /// under a `comments` field.
    pub fn get_workflows_with_comments(&self, resource_id: u64) -> Result<Vec<Value>> {
        let filter = WorkflowFilter {
            resource_id: Some(resource_id),
            ..Default::default()
        };
        let workflows = self.get_workflows(&filter)?;
        self.attach_comments(workflows, RecordType::Workflow)
    }

    /// Fetch comments for every item and insert them as a new `comments`
    /// field. Existing fields are left untouched; any comment-fetch failure
    /// propagates immediately.
    fn attach_comments(&self, items: Vec<Value>, kind: RecordType) -> Result<Vec<Value>> {
        items
            .into_iter()
            .map(|mut item| {
                let id = item.get("id").and_then(Value::as_u64).ok_or_else(|| {
                    ApiError::Api {
                        message: "Resource object has no numeric 'id' field".to_string(),
                        body: item.clone(),
                    }
                })?;
                let comments = self.get_comments(id, kind)?;
                if let Some(object) = item.as_object_mut() {
                    object.insert("comments".to_string(), Value::Array(comments));
                }
                Ok(item)
            })
            .collect()
    }

    /// Fetch all users once and build an ID-to-display-string map for reuse
    /// by [`enhance_user_info`](Self::enhance_user_info).
    pub fn make_user_map(&self, format: UserMapFormat) -> Result<HashMap<u64, String>> {
        let users = self.get_users()?;
        Ok(build_user_map(&users, format))
    }

    /// Recursively replace user-ID references with display names.
    ///
    /// Walks objects and arrays; integer values of the recognized fields
    /// (`creator`, `assigned_to`) are replaced with the mapped name. IDs
    /// missing from the map, and all other fields and structure, pass
    /// through unchanged.
    pub fn enhance_user_info(&self, value: &Value, user_map: &HashMap<u64, String>) -> Value {
        replace_user_refs(value, user_map)
    }

    /// Create a task, resolving names to IDs first.
    ///
    /// The assignee defaults to the current user (one `GET me`); named
    /// users, teams, and categories are resolved against their lookup
    /// endpoints; custom fields are matched against the account's
    /// custom-field definitions. The assembled payload is posted through
    /// [`create_task`](Self::create_task).
    pub fn create_task_detailed(&self, name: &str, options: &NewTask) -> Result<Value> {
        let mut payload = serde_json::Map::new();
        payload.insert("name".to_string(), Value::String(name.to_string()));

        if let Some(date) = options.due_date {
            payload.insert("due_date".to_string(), Value::String(format_due_date(date)));
        }

        match &options.assignee {
            None => {
                payload.insert("assigned_to".to_string(), json!(self.get_my_user_id()?));
            }
            Some(Assignee::User(id)) => {
                payload.insert("assigned_to".to_string(), json!(id));
            }
            Some(Assignee::UserNamed(user_name)) => {
                let id = self.resolve_user_id(user_name)?;
                payload.insert("assigned_to".to_string(), json!(id));
            }
            Some(Assignee::Team(id)) => {
                payload.insert("assigned_to_team".to_string(), json!(id));
            }
            Some(Assignee::TeamNamed(team_name)) => {
                let id = self.resolve_team_id(team_name)?;
                payload.insert("assigned_to_team".to_string(), json!(id));
            }
        }

        if !options.linked_to.is_empty() {
            let links = options
                .linked_to
                .iter()
                .map(|id| json!({"id": id, "type": "Contact"}))
                .collect();
            payload.insert("linked_to".to_string(), Value::Array(links));
        }

        if let Some(description) = &options.description {
            payload.insert(
                "description".to_string(),
                Value::String(description.clone()),
            );
        }

        if let Some(category) = &options.category {
            let id = match category {
                CategoryRef::Id(id) => *id,
                CategoryRef::Named(category_name) => self.resolve_category_id(category_name)?,
            };
            payload.insert("category".to_string(), json!(id));
        }

        if !options.custom_fields.is_empty() {
            let definitions = self.get_custom_fields()?;
            let fields = options
                .custom_fields
                .iter()
                .map(|(field_name, value)| {
                    let canonical = resolve_field_name(&definitions, field_name).ok_or_else(
                        || ApiError::NotFound(format!("custom field '{}'", field_name)),
                    )?;
                    Ok(json!({"name": canonical, "value": value}))
                })
                .collect::<Result<Vec<_>>>()?;
            payload.insert("custom_fields".to_string(), Value::Array(fields));
        }

        self.create_task(&Value::Object(payload))
    }

    fn resolve_user_id(&self, name: &str) -> Result<u64> {
        let users = self.get_users()?;
        find_by_name(&users, name).ok_or_else(|| ApiError::NotFound(format!("user '{}'", name)))
    }

    fn resolve_team_id(&self, name: &str) -> Result<u64> {
        let teams = self.get_teams()?;
        find_by_name(&teams, name).ok_or_else(|| ApiError::NotFound(format!("team '{}'", name)))
    }

    fn resolve_category_id(&self, name: &str) -> Result<u64> {
        let categories = self.get_task_categories()?;
        find_by_name(&categories, name)
            .ok_or_else(|| ApiError::NotFound(format!("task category '{}'", name)))
    }
}

fn build_user_map(users: &[Value], format: UserMapFormat) -> HashMap<u64, String> {
    users
        .iter()
        .filter_map(|user| {
            let record: User = serde_json::from_value(user.clone()).ok()?;
            let label = match format {
                UserMapFormat::Full => {
                    format!("{}; {}; {}", record.id, record.name, record.email)
                }
                UserMapFormat::Name => record.name.clone(),
                UserMapFormat::FirstName => record
                    .name
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_string(),
            };
            Some((record.id, label))
        })
        .collect()
}

fn replace_user_refs(value: &Value, user_map: &HashMap<u64, String>) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, field)| {
                    if USER_ID_FIELDS.contains(&key.as_str()) {
                        if let Some(name) =
                            field.as_u64().and_then(|id| user_map.get(&id))
                        {
                            return (key.clone(), Value::String(name.clone()));
                        }
                    }
                    (key.clone(), replace_user_refs(field, user_map))
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| replace_user_refs(item, user_map))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

/// Find a record by exact `name` and return its `id`.
fn find_by_name(records: &[Value], name: &str) -> Option<u64> {
    records
        .iter()
        .find(|record| record.get("name").and_then(Value::as_str) == Some(name))
        .and_then(|record| record.get("id").and_then(Value::as_u64))
}

/// Match a requested custom-field name against the defined field names.
///
/// Underscores count as spaces and case is ignored, so `Priority_Level`
/// matches a field defined as `Priority Level`. Returns the defined name.
fn resolve_field_name(definitions: &[Value], requested: &str) -> Option<String> {
    let wanted = normalize_field_name(requested);
    definitions
        .iter()
        .filter_map(|definition| definition.get("name").and_then(Value::as_str))
        .find(|defined| normalize_field_name(defined) == wanted)
        .map(str::to_string)
}

fn normalize_field_name(name: &str) -> String {
    name.replace('_', " ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_map() -> HashMap<u64, String> {
        let mut map = HashMap::new();
        map.insert(1, "John Doe".to_string());
        map.insert(2, "Jane Smith".to_string());
        map
    }

    #[test]
    fn test_replace_creator_field() {
        let data = json!({"id": 100, "creator": 1, "name": "Task"});
        let result = replace_user_refs(&data, &user_map());
        assert_eq!(result["creator"], "John Doe");
        assert_eq!(result["id"], 100);
        assert_eq!(result["name"], "Task");
    }

    #[test]
    fn test_replace_assigned_to_field() {
        let data = json!({"id": 100, "assigned_to": 1});
        let result = replace_user_refs(&data, &user_map());
        assert_eq!(result["assigned_to"], "John Doe");
    }

    #[test]
    fn test_replace_in_nested_list() {
        let data = json!([{"creator": 1, "items": [{"creator": 2}]}]);
        let result = replace_user_refs(&data, &user_map());
        assert_eq!(result[0]["creator"], "John Doe");
        assert_eq!(result[0]["items"][0]["creator"], "Jane Smith");
    }

    #[test]
    fn test_unknown_user_id_preserved() {
        let data = json!({"creator": 999});
        let result = replace_user_refs(&data, &user_map());
        assert_eq!(result["creator"], 999);
    }

    #[test]
    fn test_scalars_pass_through() {
        let empty = HashMap::new();
        assert_eq!(replace_user_refs(&json!("string"), &empty), json!("string"));
        assert_eq!(replace_user_refs(&json!(123), &empty), json!(123));
        assert_eq!(replace_user_refs(&json!(null), &empty), json!(null));
    }

    #[test]
    fn test_unrelated_structure_unchanged() {
        let data = json!({
            "creator": 1,
            "tags": [{"name": "vip"}],
            "meta": {"page": 2}
        });
        let result = replace_user_refs(&data, &user_map());
        assert_eq!(result["tags"], json!([{"name": "vip"}]));
        assert_eq!(result["meta"], json!({"page": 2}));
    }

    #[test]
    fn test_build_user_map_full_format() {
        let users = vec![json!({"id": 1, "name": "John Doe", "email": "john@example.com"})];
        let map = build_user_map(&users, UserMapFormat::Full);
        assert_eq!(map[&1], "1; John Doe; john@example.com");
    }

    #[test]
    fn test_build_user_map_name_format() {
        let users = vec![json!({"id": 1, "name": "John Doe", "email": "john@example.com"})];
        let map = build_user_map(&users, UserMapFormat::Name);
        assert_eq!(map[&1], "John Doe");
    }

    #[test]
    fn test_build_user_map_first_name_format() {
        let users = vec![json!({"id": 1, "name": "John Doe", "email": "john@example.com"})];
        let map = build_user_map(&users, UserMapFormat::FirstName);
        assert_eq!(map[&1], "John");
    }

    #[test]
    fn test_find_by_name_exact_match() {
        let records = vec![
            json!({"id": 10, "name": "John Doe"}),
            json!({"id": 11, "name": "Jane Doe"}),
        ];
        assert_eq!(find_by_name(&records, "Jane Doe"), Some(11));
        assert_eq!(find_by_name(&records, "Nobody"), None);
    }

    #[test]
    fn test_resolve_field_name_underscores_and_case() {
        let definitions = vec![json!({"name": "Priority Level"})];
        assert_eq!(
            resolve_field_name(&definitions, "Priority_Level"),
            Some("Priority Level".to_string())
        );
        assert_eq!(
            resolve_field_name(&definitions, "priority level"),
            Some("Priority Level".to_string())
        );
        assert_eq!(resolve_field_name(&definitions, "Unknown"), None);
    }
}
