pub mod config;
pub mod dashboard;
pub mod date;
pub mod deadline;
pub mod document;
pub mod error;
pub mod gh;
pub mod git;
pub mod io;
pub mod issue;
pub mod paths;
pub mod process;
pub mod reconcile;
pub mod remote;
pub mod sync;
pub mod types;

pub use error::{Result, SyncError};
