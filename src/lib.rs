//! opendata - tabular export of survey submissions
//!
//! Turns nested form submissions (groups, repeat groups, select-multiple and
//! geopoint answers) into flat relational tables that BI tools such as Tableau
//! can consume: one root table per form plus one child table per repeat group,
//! linked by `__parent_id` / `__parent_table`.
//!
//! ```text
//! FormDefinition ──► export::schema ──► Vec<TableSchema>
//!
//! SubmissionSource ──► Submissions (lazy) ──► export::flatten ──► FlatRow stream
//!                                                                     │
//!                                              export::to_json / to_csv ◄┘
//! ```

pub mod config;
pub mod errors;
pub mod export;
pub mod form;
pub mod services;
pub mod source;
pub mod submission;

#[cfg(feature = "server")]
pub mod server;
