//! CLI command implementations.
//!
//! - `run`: enforce the policy on the selected projects
//! - `plan`: show what a run would delete, without deleting
//! - `projects`: show the projects a run would cover
//! - `validate`: check a configuration file

pub mod plan;
pub mod projects;
pub mod run;
pub mod validate;

pub use plan::PlanCommand;
pub use projects::ProjectsCommand;
pub use run::RunCommand;
pub use validate::ValidateCommand;
