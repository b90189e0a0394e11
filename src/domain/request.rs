use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    DuplicateSectionGroup, Form, FormKind, Response, duplicate::build_duplicate_sections,
};

/// A filled-in form routed through its signers.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Request identifier.
    pub id: Uuid,
    /// The form being answered.
    pub form: Form,
    /// Team member who submitted the request.
    pub requester: Uuid,
    /// Current approval status.
    pub status: RequestStatus,
    /// Signers, in notification order.
    pub signers: Vec<Signer>,
    /// Responses, in stored order.
    pub responses: Vec<Response>,
    /// Discussion on the request.
    pub comments: Vec<Comment>,
    /// When the request was submitted.
    pub created: DateTime<Utc>,
    /// Free-form tag used to branch follow-up forms, e.g.
    /// `AVAILABLE_INTERNALLY` or `FOR_PURCHASED`.
    pub additional_info: Option<String>,
}

impl Request {
    /// The system-defined family of the request's form, if any.
    #[must_use]
    pub fn kind(&self) -> Option<FormKind> {
        self.form.kind()
    }

    /// Every section instance of the request, in section order.
    ///
    /// Each section is expanded into one group per duplicated instance;
    /// sections with no responses contribute nothing.
    #[must_use]
    pub fn duplicate_sections(&self) -> Vec<DuplicateSectionGroup<'_>> {
        self.form
            .ordered_sections()
            .into_iter()
            .flat_map(|section| build_duplicate_sections(section, &self.responses, self.id))
            .collect()
    }

    /// Instances of every section after the first `leading` sections in
    /// section order.
    ///
    /// Leading sections are counted whether or not they were answered, so an
    /// empty leading section never shifts an item section into the skipped
    /// range.
    #[must_use]
    pub fn item_sections(&self, leading: usize) -> Vec<DuplicateSectionGroup<'_>> {
        self.form
            .ordered_sections()
            .into_iter()
            .skip(leading)
            .flat_map(|section| build_duplicate_sections(section, &self.responses, self.id))
            .collect()
    }

    /// The first response to the field with the given name.
    #[must_use]
    pub fn response_named(&self, field_name: &str) -> Option<&Response> {
        let field = self.form.field_named(field_name)?;
        self.responses
            .iter()
            .find(|response| response.field_id == field.id)
    }

    /// Whether the named back-reference field holds `target`'s id.
    #[must_use]
    pub fn references(&self, field_name: &str, target: Uuid) -> bool {
        self.response_named(field_name)
            .is_some_and(|response| response.as_text().trim() == target.to_string())
    }

    /// The signer flagged as primary, if any.
    #[must_use]
    pub fn primary_signer(&self) -> Option<&Signer> {
        self.signers.iter().find(|signer| signer.is_primary_signer)
    }

    /// Signers sorted by their order value.
    #[must_use]
    pub fn ordered_signers(&self) -> Vec<&Signer> {
        let mut signers: Vec<_> = self.signers.iter().collect();
        signers.sort_by_key(|signer| signer.order);
        signers
    }
}

/// Approval status of a request.
///
/// `Pending` is initial. `Approved`, `Rejected` and `Deleted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// Awaiting signers.
    Pending,
    /// Approved by the primary signer.
    Approved,
    /// Rejected by the primary signer.
    Rejected,
    /// Withdrawn by the requester.
    Canceled,
    /// Removed after cancellation.
    Deleted,
}

impl RequestStatus {
    /// Whether the state machine permits moving from `self` to `target`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Approved | Self::Rejected | Self::Canceled)
                | (Self::Canceled, Self::Deleted)
        )
    }

    /// Validates a transition, returning the new status.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Invalid`] for any transition not in the
    /// state machine.
    pub const fn transition(self, target: Self) -> Result<Self, TransitionError> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(TransitionError::Invalid {
                from: self,
                to: target,
            })
        }
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Deleted)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Canceled => "CANCELED",
            Self::Deleted => "DELETED",
        })
    }
}

/// A team member asked to act on a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    /// Signer identifier.
    pub id: Uuid,
    /// The team member acting as signer.
    pub team_member: Uuid,
    /// What signing means for this signer, e.g. "approved" or "noted".
    pub action: String,
    /// Whether this signer's decision settles the request.
    #[serde(default)]
    pub is_primary_signer: bool,
    /// Notification order. Not a blocking order.
    #[serde(default)]
    pub order: u32,
    /// This signer's decision on the request.
    #[serde(default)]
    pub status: SignerStatus,
}

/// A signer's decision on a single request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignerStatus {
    /// No decision yet.
    #[default]
    Pending,
    /// Signed off.
    Approved,
    /// Declined.
    Rejected,
    /// On hold.
    Paused,
}

/// A comment left on a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment identifier.
    pub id: Uuid,
    /// Team member who wrote it.
    pub author: Uuid,
    /// Comment text.
    pub content: String,
    /// When it was written.
    pub created: DateTime<Utc>,
}

/// Everything the workflow collaborator needs to move a request's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionCommand {
    /// The request being acted on.
    pub request_id: Uuid,
    /// The requested status.
    pub target: RequestStatus,
    /// The acting signer.
    pub signer_id: Uuid,
    /// Whether the acting signer is the primary signer.
    pub is_primary_signer: bool,
    /// The request owner, to be notified.
    pub owner_id: Uuid,
    /// Tag recorded on approval, used to branch follow-up forms.
    pub additional_info: Option<String>,
}

impl TransitionCommand {
    /// The signer status recorded for this command.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::NotSignable`] when the target is not a
    /// decision a signer can make.
    pub const fn signer_status(&self) -> Result<SignerStatus, TransitionError> {
        match self.target {
            RequestStatus::Approved => Ok(SignerStatus::Approved),
            RequestStatus::Rejected => Ok(SignerStatus::Rejected),
            other => Err(TransitionError::NotSignable(other)),
        }
    }
}

/// Emitted after a status change so that consumers can create comments and
/// notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestEvent {
    /// A signer recorded a decision.
    Signed {
        /// The request acted on.
        request_id: Uuid,
        /// The acting signer.
        signer_id: Uuid,
        /// The decision recorded.
        decision: SignerStatus,
        /// The request status afterwards.
        status: RequestStatus,
        /// The request owner.
        owner_id: Uuid,
    },
    /// The requester withdrew the request.
    Canceled {
        /// The request acted on.
        request_id: Uuid,
        /// Who canceled it.
        actor_id: Uuid,
    },
    /// A canceled request was removed.
    Deleted {
        /// The request acted on.
        request_id: Uuid,
    },
}

/// Errors raised when a status change is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The state machine does not permit this move.
    #[error("cannot move a request from {from} to {to}")]
    Invalid {
        /// Current status.
        from: RequestStatus,
        /// Requested status.
        to: RequestStatus,
    },
    /// Signers can only approve or reject.
    #[error("signers cannot move a request to {0}")]
    NotSignable(RequestStatus),
    /// The acting signer is not on the request.
    #[error("signer {0} is not on this request")]
    UnknownSigner(Uuid),
    /// The signer already recorded a decision.
    #[error("signer {0} has already signed")]
    AlreadySigned(Uuid),
    /// Only the requester may cancel.
    #[error("team member {0} does not own this request")]
    NotOwner(Uuid),
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::RequestStatus::{self, *};

    #[test_case(Pending, Approved)]
    #[test_case(Pending, Rejected)]
    #[test_case(Pending, Canceled)]
    #[test_case(Canceled, Deleted)]
    fn permitted(from: RequestStatus, to: RequestStatus) {
        assert_eq!(from.transition(to), Ok(to));
    }

    #[test_case(Pending, Deleted)]
    #[test_case(Pending, Pending)]
    #[test_case(Approved, Rejected)]
    #[test_case(Approved, Canceled)]
    #[test_case(Rejected, Approved)]
    #[test_case(Canceled, Approved)]
    #[test_case(Deleted, Pending)]
    fn forbidden(from: RequestStatus, to: RequestStatus) {
        assert!(from.transition(to).is_err());
    }

    #[test]
    fn terminal_states() {
        let terminal: Vec<_> = [Pending, Approved, Rejected, Canceled, Deleted]
            .into_iter()
            .filter(|status| status.is_terminal())
            .collect();
        assert_eq!(terminal, [Approved, Rejected, Deleted]);
    }
}
