//! On-disk shapes of forms and requests.
//!
//! Every record carries a `_version` tag so the layout can evolve without
//! breaking existing directories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Comment, Form, Request, RequestStatus, Response, Signer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FormVersion", into = "FormVersion")]
pub(crate) struct FormRecord(pub Form);

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum FormVersion {
    #[serde(rename = "1")]
    V1(Form),
}

impl From<FormVersion> for FormRecord {
    fn from(version: FormVersion) -> Self {
        match version {
            FormVersion::V1(form) => Self(form),
        }
    }
}

impl From<FormRecord> for FormVersion {
    fn from(record: FormRecord) -> Self {
        Self::V1(record.0)
    }
}

/// A request as stored: the form is referenced by id rather than embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RequestVersion", into = "RequestVersion")]
pub(crate) struct RequestRecord {
    pub id: Uuid,
    pub form_id: Uuid,
    pub requester: Uuid,
    pub status: RequestStatus,
    pub created: DateTime<Utc>,
    pub additional_info: Option<String>,
    pub signers: Vec<Signer>,
    pub responses: Vec<Response>,
    pub comments: Vec<Comment>,
}

impl RequestRecord {
    pub fn into_request(self, form: Form) -> Request {
        Request {
            id: self.id,
            form,
            requester: self.requester,
            status: self.status,
            signers: self.signers,
            responses: self.responses,
            comments: self.comments,
            created: self.created,
            additional_info: self.additional_info,
        }
    }
}

impl From<&Request> for RequestRecord {
    fn from(request: &Request) -> Self {
        Self {
            id: request.id,
            form_id: request.form.id,
            requester: request.requester,
            status: request.status,
            created: request.created,
            additional_info: request.additional_info.clone(),
            signers: request.signers.clone(),
            responses: request.responses.clone(),
            comments: request.comments.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum RequestVersion {
    #[serde(rename = "1")]
    V1 {
        id: Uuid,
        form_id: Uuid,
        requester: Uuid,
        status: RequestStatus,
        created: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        additional_info: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        signers: Vec<Signer>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        responses: Vec<Response>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        comments: Vec<Comment>,
    },
}

impl From<RequestVersion> for RequestRecord {
    fn from(version: RequestVersion) -> Self {
        match version {
            RequestVersion::V1 {
                id,
                form_id,
                requester,
                status,
                created,
                additional_info,
                signers,
                responses,
                comments,
            } => Self {
                id,
                form_id,
                requester,
                status,
                created,
                additional_info,
                signers,
                responses,
                comments,
            },
        }
    }
}

impl From<RequestRecord> for RequestVersion {
    fn from(record: RequestRecord) -> Self {
        let RequestRecord {
            id,
            form_id,
            requester,
            status,
            created,
            additional_info,
            signers,
            responses,
            comments,
        } = record;
        Self::V1 {
            id,
            form_id,
            requester,
            status,
            created,
            additional_info,
            signers,
            responses,
            comments,
        }
    }
}
