//! WealthBox API client, resource table, and composite helpers.
//!
//! [`client`] holds the transport, retry policy, and the generic request
//! operations; [`resources`] maps each CRM resource to its endpoint and
//! provides the CRUD methods; [`composite`] layers the multi-request
//! helpers on top.

mod client;
mod composite;
mod error;
pub mod resources;
mod types;

pub use client::{ClientConfig, WealthBoxClient, DEFAULT_BASE_URL};
pub use error::{ApiError, Result};
pub use resources::ResourceSpec;
pub use types::{
    Assignee, CategoryRef, ContactFilter, CurrentUser, CurrentUserResponse, Meta, NewTask,
    OpportunityFilter, RecordType, SortOrder, TaskFilter, User, UserMapFormat, WorkflowFilter,
    WorkflowStatus,
};
