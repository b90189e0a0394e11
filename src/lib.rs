//! Dynamic approval forms
//!
//! Forms are ordered trees of sections and fields. Requests answer a form,
//! and their flat response lists are regrouped into duplicated section
//! instances that feed canvass comparisons and tabular summaries.

pub mod domain;
pub use domain::{
    CanvassResult, Config, DataShapeError, DuplicateSectionGroup, Form, FormKind, Request,
    RequestStatus, Response, Section, SummaryRow,
};

/// Persistence collaborator interface and a filesystem backed implementation.
pub mod storage;
pub use storage::{
    CanvassError, Directory, DirectoryError, LoadError, NamedEntityRepository, Repository,
    load_canvass,
};
