//! A blocking client library for the WealthBox CRM REST API.
//!
//! Every method is synchronous: it builds a request, sends it over a shared
//! HTTP session, decodes the JSON response, and returns. List endpoints are
//! paginated transparently, transient server failures on idempotent
//! requests are retried with exponential backoff, and rate limits surface
//! as errors carrying the server's retry-after duration.
//!
//! # Quick start
//!
//! ```no_run
//! use wealthbox::{TaskFilter, UserMapFormat, WealthBoxClient};
//!
//! fn main() -> wealthbox::Result<()> {
//!     // Reads WEALTHBOX_ACCESS_TOKEN (or the credentials file).
//!     let client = WealthBoxClient::from_env()?;
//!
//!     // List open tasks, following pagination.
//!     let tasks = client.get_tasks(&TaskFilter::default())?;
//!     println!("{} open tasks", tasks.len());
//!
//!     // Replace user-ID references with display names.
//!     let user_map = client.make_user_map(UserMapFormat::Name)?;
//!     for task in &tasks {
//!         let readable = client.enhance_user_info(task, &user_map);
//!         println!("{}", readable);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! Failures are reported through [`ApiError`], with three server-side
//! kinds: [`ApiError::Api`] for unexpected statuses or payload shapes,
//! [`ApiError::Response`] for bodies that are not valid JSON, and
//! [`ApiError::RateLimited`] for HTTP 429 (carrying the retry-after
//! duration; the client never sleeps on rate limits itself).
//!
//! # Concurrency
//!
//! The client is single-threaded by design. It reuses one HTTP session for
//! sequential calls but provides no synchronization; create one client per
//! thread for concurrent use.

pub mod api;
pub mod config;

pub use api::{
    ApiError, Assignee, CategoryRef, ClientConfig, ContactFilter, CurrentUser, Meta, NewTask,
    OpportunityFilter, RecordType, ResourceSpec, Result, SortOrder, TaskFilter, User,
    UserMapFormat, WealthBoxClient, WorkflowFilter, WorkflowStatus, DEFAULT_BASE_URL,
};
