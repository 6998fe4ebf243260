//! Session lifecycle: explicit state, the reconciler that rebuilds it
//! from storage, and the workflow engine that advances it.

pub mod reconcile;
pub mod state;
pub mod workflow;

pub use reconcile::{load_aggregate, reconcile};
pub use state::{AppStep, SessionState};
pub use workflow::Workflow;
