//! The operations the core consumes from the persistence/workflow
//! collaborator.
//!
//! Implementations own transport and transactional guarantees. The core only
//! reads what they return and reacts to the status they report.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Form, Request, RequestEvent, Response, TransitionCommand};

/// Forms, requests and status changes.
///
/// `Sync` is required so that independent fetches can be fanned out across
/// threads.
pub trait Repository: Sync {
    /// Error raised by every operation.
    type Error: std::error::Error + Send + Sync + 'static;

    /// A form with its nested sections, fields and options, in stored order.
    ///
    /// # Errors
    ///
    /// Fails if the form does not exist or cannot be read.
    fn fetch_form(&self, form_id: Uuid) -> Result<Form, Self::Error>;

    /// A request with its form, responses, signers and comments.
    ///
    /// # Errors
    ///
    /// Fails if the request does not exist or cannot be read.
    fn fetch_request_with_responses(&self, request_id: Uuid) -> Result<Request, Self::Error>;

    /// Ids of pending quotations that reference the given order.
    ///
    /// # Errors
    ///
    /// Fails if the requests cannot be scanned.
    fn fetch_sibling_quotations(&self, parent_order_id: Uuid) -> Result<Vec<Uuid>, Self::Error>;

    /// Responses of a request in stored order, optionally restricted to the
    /// named fields.
    ///
    /// # Errors
    ///
    /// Fails if the request does not exist or cannot be read.
    fn fetch_responses_for_request(
        &self,
        request_id: Uuid,
        field_names: Option<&[&str]>,
    ) -> Result<Vec<Response>, Self::Error>;

    /// Records a signer's decision, moving the request's status when the
    /// signer is primary.
    ///
    /// # Errors
    ///
    /// Fails if the transition is not permitted or cannot be stored.
    fn transition_request_status(
        &self,
        command: &TransitionCommand,
    ) -> Result<RequestEvent, Self::Error>;

    /// Withdraws a pending request on behalf of its requester.
    ///
    /// # Errors
    ///
    /// Fails if the actor does not own the request or it is not pending.
    fn cancel_request(&self, request_id: Uuid, actor_id: Uuid) -> Result<RequestEvent, Self::Error>;

    /// Removes a canceled request.
    ///
    /// # Errors
    ///
    /// Fails if the request is not canceled.
    fn delete_request(&self, request_id: Uuid) -> Result<RequestEvent, Self::Error>;
}

/// The families of simple named records a team maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum NamedEntityKind {
    /// Staff who process requests.
    Processor,
    /// Staff who receive deliveries.
    Receiver,
    /// Suppliers quoted on canvasses.
    Supplier,
    /// Projects requests are raised for.
    Project,
}

impl NamedEntityKind {
    /// Stable identifier used for storage keys.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Processor => "processor",
            Self::Receiver => "receiver",
            Self::Supplier => "supplier",
            Self::Project => "project",
        }
    }
}

impl fmt::Display for NamedEntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A named record such as a processor or supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntity {
    /// Record identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Whether the record can be picked on new requests.
    #[serde(default = "available")]
    pub is_available: bool,
}

const fn available() -> bool {
    true
}

/// Lists of named records, one list per [`NamedEntityKind`].
pub trait NamedEntityRepository {
    /// Error raised by every operation.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Every record of the given kind.
    ///
    /// # Errors
    ///
    /// Fails if the list cannot be read.
    fn fetch_list(&self, kind: NamedEntityKind) -> Result<Vec<NamedEntity>, Self::Error>;

    /// Whether a record with this name already exists, ignoring case and
    /// surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Fails if the list cannot be read.
    fn check_duplicate(&self, kind: NamedEntityKind, name: &str) -> Result<bool, Self::Error> {
        let name = name.trim();
        Ok(self
            .fetch_list(kind)?
            .iter()
            .any(|entity| entity.name.trim().eq_ignore_ascii_case(name)))
    }
}
