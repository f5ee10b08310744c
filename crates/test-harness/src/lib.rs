//! Test harness for object-graph documents.
//!
//! Provides programmatic tools for scripting document edits, checking the
//! link-graph invariants after every step and describing the result as text.
//!
//! # Key Components
//!
//! - [`DocumentBuilder`]: fluent API addressing objects by name
//! - [`assertions`]: back-link symmetry and other graph checks
//! - [`report`]: structured text description of a document
//! - [`helpers`]: error type and small value constructors

pub mod assertions;
pub mod helpers;
pub mod report;
pub mod workflow;

pub use helpers::HarnessError;
pub use report::DocumentReport;
pub use workflow::DocumentBuilder;
