//! Domain models for forms, requests and their derived views.
//!
//! Nothing in this module performs I/O. Every aggregation takes already
//! fetched data and returns a fresh value.

/// Form schema: sections, fields and options with their ordering rules.
pub mod form;
pub use form::{Field, FieldOption, FieldType, Form, FormKind, Section};

/// Stored responses and their JSON-encoded values.
pub mod response;
pub use response::Response;

/// Requests, signers and the approval state machine.
pub mod request;
pub use request::{
    Comment, Request, RequestEvent, RequestStatus, Signer, SignerStatus, TransitionCommand,
    TransitionError,
};

/// Regrouping of flat responses into duplicated section instances.
pub mod duplicate;
pub use duplicate::{DuplicateSectionGroup, FieldResponse, build_duplicate_sections};

/// Unit and quantity extraction from composite item labels.
pub mod unit;
pub use unit::{extract_quantity, extract_unit, format_item_label};

/// Canvass comparison of quotations against an order.
pub mod canvass;
pub use canvass::{CanvassResult, DataShapeError, compute_canvass};

/// Row-per-item summaries of item sections.
pub mod summary;
pub use summary::{Summary, SummaryExtra, SummaryRow, build_summary_rows};

/// Single-source-of-truth rollup across orders and their related requests.
pub mod ssot;

/// Well-known field names of system-defined forms.
pub mod fields;

mod config;
pub use config::{Config, ConfigError, LeadingSections};
