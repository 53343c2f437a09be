//! # stmtfx-kernel
//!
//! Merge same-named statement declarations from many files into one
//! conflict-checked contract, and render that contract as a typed query
//! interface.
//!
//! ## Architecture
//!
//! ```text
//! InputSpec ──resolve──▶ files ──StatementSource──▶ StatementRecords
//!                                                      │
//!                                        Aggregator (first-seen variants,
//!                                        natural order of names)
//!                                                      │
//!                 merge: reconcile ─ classify ─ assign identifiers
//!                        │  structural drift → StructuralConflict (fatal)
//!                        │  benign drift     → Notice (Diagnostics)
//!                                                      │
//!                                                  Contract
//!                                                      │
//!                                     render(EmitOptions, OutputName)
//!                                                      │
//!                                        atomic write under output dir
//! ```
//!
//! [`run`] drives the whole chain; [`check`] stops after the merge.

pub mod aggregate;
pub mod classify;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod ident;
pub mod merge;
pub mod natural;
pub mod options;
pub mod pipeline;
pub mod reconcile;

pub use aggregate::{AggregateEntry, Aggregator, aggregate};
pub use classify::{OperationKind, classify};
pub use diagnostics::{Diagnostics, Notice, NoticeKind};
pub use emit::render;
pub use error::{EXIT_FAILURE, EXIT_USAGE, FxError, StructuralConflict};
pub use ident::{AssignedNames, IdentifierAssigner, method_name, sanitize_identifier};
pub use merge::{Contract, DocSource, MergedOperation, Provenance, merge};
pub use natural::natural_cmp;
pub use options::{EmitOptions, Indent, LineEnding, OutputName, StructKind};
pub use pipeline::{
    CHECK_KIND, CheckReport, GenerateRequest, OperationSummary, RunReport, check, run,
};
pub use reconcile::{ReconciledParameter, ReconciledParameterSet, reconcile};
