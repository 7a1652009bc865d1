//! Google Cloud REST clients.
//!
//! Thin blocking clients for the three APIs an enforcement run touches:
//! Compute Engine (addresses, consumers, operations), Resource Manager
//! (folder listing), and Cloud Storage (the exclusion list). Credentials come
//! from the metadata server or `IPENFORCER_ACCESS_TOKEN`.

pub mod auth;
pub mod compute;
pub mod http;
pub mod projects;
pub mod storage;

pub use auth::{metadata_project_id, MetadataClient, TokenProvider, ENV_ACCESS_TOKEN};
pub use compute::{ComputeUrls, RestCompute, COMPUTE_BASE};
pub use http::GcpHttp;
pub use projects::{RestProjects, RESOURCE_MANAGER_BASE};
pub use storage::{RestStorage, STORAGE_BASE};
