//! A filesystem backed store of forms and requests.
//!
//! Records live as YAML files under the directory root:
//!
//! ```text
//! config.toml
//! forms/<form id>.yaml
//! requests/<request id>.yaml
//! entities/<kind>.yaml
//! ```

use std::{
    collections::HashMap,
    ffi::OsStr,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::{
    domain::{
        Config, Form, FormKind, Request, RequestEvent, RequestStatus, Response, SignerStatus,
        TransitionCommand, TransitionError, fields,
    },
    storage::{
        NamedEntity, NamedEntityKind, NamedEntityRepository, Repository,
        record::{FormRecord, RequestRecord},
    },
};

/// A filesystem backed store of forms and requests.
#[derive(Debug, Clone)]
pub struct Directory {
    root: PathBuf,
    config: Config,
}

impl Directory {
    /// Opens the directory at `root`.
    ///
    /// A missing or unreadable `config.toml` falls back to the default
    /// configuration.
    #[must_use]
    pub fn open(root: PathBuf) -> Self {
        let config = load_config(&root);
        Self { root, config }
    }

    /// The root of the directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configuration the directory was opened with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Writes a form, replacing any form with the same id.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn save_form(&self, form: &Form) -> Result<(), LoadError> {
        write_yaml(&self.form_path(form.id), &FormRecord(form.clone()))
    }

    /// Writes a request, replacing any request with the same id.
    ///
    /// The request's form is stored separately; see [`Self::save_form`].
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn save_request(&self, request: &Request) -> Result<(), LoadError> {
        write_yaml(
            &self.request_path(request.id),
            &RequestRecord::from(request),
        )
    }

    /// Writes the list of named records of one kind.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn save_entities(
        &self,
        kind: NamedEntityKind,
        entities: &[NamedEntity],
    ) -> Result<(), LoadError> {
        write_yaml(&self.entities_path(kind), &entities)
    }

    /// Loads every request in the directory.
    ///
    /// # Errors
    ///
    /// Fails if any request file cannot be parsed, naming every such file,
    /// or if a referenced form cannot be loaded.
    pub fn requests(&self) -> Result<Vec<Request>, DirectoryError> {
        let paths = collect_yaml_paths(&self.root.join(REQUESTS));

        let (records, unrecognised): (Vec<_>, Vec<_>) = paths
            .par_iter()
            .map(|path| {
                read_yaml::<RequestRecord>(path).map_err(|e| {
                    tracing::debug!("Failed to load request from {}: {e}", path.display());
                    path.clone()
                })
            })
            .partition(Result::is_ok);

        let unrecognised: Vec<_> = unrecognised.into_iter().filter_map(Result::err).collect();
        if !unrecognised.is_empty() {
            return Err(DirectoryError::UnrecognisedFiles(unrecognised));
        }
        let records: Vec<_> = records.into_iter().filter_map(Result::ok).collect();

        let mut form_ids: Vec<_> = records.iter().map(|record| record.form_id).collect();
        form_ids.sort_unstable();
        form_ids.dedup();
        let forms: HashMap<Uuid, Form> = form_ids
            .par_iter()
            .map(|&id| self.fetch_form(id).map(|form| (id, form)))
            .collect::<Result<_, _>>()?;

        Ok(records
            .into_iter()
            .filter_map(|record| {
                let form = forms.get(&record.form_id)?.clone();
                Some(record.into_request(form))
            })
            .collect())
    }

    fn load_record(&self, request_id: Uuid) -> Result<RequestRecord, DirectoryError> {
        read_yaml(&self.request_path(request_id)).map_err(|e| match e {
            LoadError::NotFound(_) => DirectoryError::NotFound {
                kind: "request",
                id: request_id,
            },
            e => e.into(),
        })
    }

    fn store_record(&self, record: &RequestRecord) -> Result<(), DirectoryError> {
        Ok(write_yaml(&self.request_path(record.id), record)?)
    }

    fn form_path(&self, id: Uuid) -> PathBuf {
        self.root.join(FORMS).join(format!("{id}.yaml"))
    }

    fn request_path(&self, id: Uuid) -> PathBuf {
        self.root.join(REQUESTS).join(format!("{id}.yaml"))
    }

    fn entities_path(&self, kind: NamedEntityKind) -> PathBuf {
        self.root.join(ENTITIES).join(format!("{kind}.yaml"))
    }
}

const FORMS: &str = "forms";
const REQUESTS: &str = "requests";
const ENTITIES: &str = "entities";

impl Repository for Directory {
    type Error = DirectoryError;

    fn fetch_form(&self, form_id: Uuid) -> Result<Form, DirectoryError> {
        let FormRecord(form) =
            read_yaml::<FormRecord>(&self.form_path(form_id)).map_err(|e| match e {
                LoadError::NotFound(_) => DirectoryError::NotFound {
                    kind: "form",
                    id: form_id,
                },
                e => e.into(),
            })?;
        Ok(form.normalized())
    }

    fn fetch_request_with_responses(&self, request_id: Uuid) -> Result<Request, DirectoryError> {
        let record = self.load_record(request_id)?;
        let form = self.fetch_form(record.form_id)?;
        Ok(record.into_request(form))
    }

    fn fetch_sibling_quotations(&self, parent_order_id: Uuid) -> Result<Vec<Uuid>, DirectoryError> {
        let mut quotations: Vec<_> = self
            .requests()?
            .into_iter()
            .filter(|request| {
                request.kind() == Some(FormKind::Quotation)
                    && request.status == RequestStatus::Pending
                    && request.references(fields::ORDER_TO_PURCHASE_ID, parent_order_id)
            })
            .collect();
        quotations.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));

        tracing::debug!(
            order = %parent_order_id,
            count = quotations.len(),
            "found sibling quotations"
        );
        Ok(quotations.into_iter().map(|request| request.id).collect())
    }

    fn fetch_responses_for_request(
        &self,
        request_id: Uuid,
        field_names: Option<&[&str]>,
    ) -> Result<Vec<Response>, DirectoryError> {
        let request = self.fetch_request_with_responses(request_id)?;
        let Some(names) = field_names else {
            return Ok(request.responses);
        };
        let form = &request.form;
        Ok(request
            .responses
            .iter()
            .filter(|response| {
                form.field(response.field_id)
                    .is_some_and(|field| names.contains(&field.name.as_str()))
            })
            .cloned()
            .collect())
    }

    fn transition_request_status(
        &self,
        command: &TransitionCommand,
    ) -> Result<RequestEvent, DirectoryError> {
        let decision = command.signer_status()?;
        let mut record = self.load_record(command.request_id)?;
        let next = record.status.transition(command.target)?;

        let signer = record
            .signers
            .iter_mut()
            .find(|signer| signer.id == command.signer_id)
            .ok_or(TransitionError::UnknownSigner(command.signer_id))?;
        if signer.status != SignerStatus::Pending {
            return Err(TransitionError::AlreadySigned(signer.id).into());
        }
        if signer.is_primary_signer != command.is_primary_signer {
            tracing::warn!(
                signer = %signer.id,
                "primary signer flag disagrees with the stored signer, using the stored flag"
            );
        }
        signer.status = decision;

        if signer.is_primary_signer {
            record.status = next;
            if next == RequestStatus::Approved && command.additional_info.is_some() {
                record.additional_info.clone_from(&command.additional_info);
            }
        }
        self.store_record(&record)?;

        tracing::info!(
            request = %record.id,
            signer = %command.signer_id,
            status = %record.status,
            "recorded signer decision"
        );

        Ok(RequestEvent::Signed {
            request_id: record.id,
            signer_id: command.signer_id,
            decision,
            status: record.status,
            owner_id: record.requester,
        })
    }

    fn cancel_request(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
    ) -> Result<RequestEvent, DirectoryError> {
        let mut record = self.load_record(request_id)?;
        if record.requester != actor_id {
            return Err(TransitionError::NotOwner(actor_id).into());
        }
        record.status = record.status.transition(RequestStatus::Canceled)?;
        self.store_record(&record)?;

        tracing::info!(request = %request_id, "canceled request");
        Ok(RequestEvent::Canceled {
            request_id,
            actor_id,
        })
    }

    fn delete_request(&self, request_id: Uuid) -> Result<RequestEvent, DirectoryError> {
        let mut record = self.load_record(request_id)?;
        record.status = record.status.transition(RequestStatus::Deleted)?;
        self.store_record(&record)?;

        tracing::info!(request = %request_id, "deleted request");
        Ok(RequestEvent::Deleted { request_id })
    }
}

impl NamedEntityRepository for Directory {
    type Error = DirectoryError;

    fn fetch_list(&self, kind: NamedEntityKind) -> Result<Vec<NamedEntity>, DirectoryError> {
        match read_yaml(&self.entities_path(kind)) {
            Ok(entities) => Ok(entities),
            Err(LoadError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Errors that can occur when reading or writing a single record.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The record file was not found.
    #[error("{} not found", .0.display())]
    NotFound(PathBuf),
    /// An I/O error occurred.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// The file accessed.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// The YAML could not be parsed or written.
    #[error("failed to parse {}: {source}", path.display())]
    Yaml {
        /// The file accessed.
        path: PathBuf,
        /// The underlying error.
        source: serde_yaml::Error,
    },
}

/// Errors raised by the [`Directory`] repository.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// No record with this id exists.
    #[error("{kind} {id} not found")]
    NotFound {
        /// What was looked up.
        kind: &'static str,
        /// The missing id.
        id: Uuid,
    },
    /// A record could not be read or written.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// Some request files could not be parsed.
    #[error("{}", UnrecognisedFilesDisplay(.0))]
    UnrecognisedFiles(Vec<PathBuf>),
    /// The status change is not permitted.
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

struct UnrecognisedFilesDisplay<'a>(&'a [PathBuf]);

impl fmt::Display for UnrecognisedFilesDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unrecognised files: ")?;
        for (i, path) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", path.display())?;
        }
        Ok(())
    }
}

fn load_config(root: &Path) -> Config {
    let path = root.join("config.toml");
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

fn collect_yaml_paths(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension() == Some(OsStr::new("yaml")))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    serde_yaml::from_str(&text).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<(), LoadError> {
    let io_error = |source: io::Error| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let text = serde_yaml::to_string(value).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, text).map_err(io_error)
}
