//! filegroup - move files that match a search text into a subfolder
//!
//! This library scans a single directory (not recursively), selects the files
//! whose names contain a search text ignoring case, and moves them into a
//! named subfolder of that directory. A file already present in the subfolder
//! is never overwritten: the incoming file gets a `_<n>` suffix instead.

pub mod cli;
pub mod config;
pub mod file_organizer;
pub mod output;

pub use config::{CompiledFilters, ConfigError, FilterConfig};
pub use file_organizer::{
    FileOrganizer, MoveOutcome, OrganizeError, OrganizeReport, OrganizeRequest, OrganizeResult,
    PreparedRun,
};

pub use cli::{Args, run_cli};
