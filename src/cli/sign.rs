use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use formsly::{
    Directory, RequestStatus, Repository,
    domain::{RequestEvent, TransitionCommand},
};
use tracing::instrument;
use uuid::Uuid;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
pub struct Sign {
    /// The request to act on
    request: Uuid,

    /// The acting signer
    #[arg(long)]
    signer: Uuid,

    /// Tag recorded on approval, e.g. FOR_PURCHASED
    #[arg(long)]
    additional_info: Option<String>,
}

impl Sign {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf, target: RequestStatus) -> anyhow::Result<()> {
        let directory = Directory::open(root);
        let request = directory.fetch_request_with_responses(self.request)?;
        let signer = request
            .signers
            .iter()
            .find(|signer| signer.id == self.signer)
            .with_context(|| format!("signer {} is not on request {}", self.signer, request.id))?;

        let event = directory.transition_request_status(&TransitionCommand {
            request_id: request.id,
            target,
            signer_id: signer.id,
            is_primary_signer: signer.is_primary_signer,
            owner_id: request.requester,
            additional_info: self.additional_info,
        })?;

        print_event(&event);
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Cancel {
    /// The request to cancel
    request: Uuid,

    /// The team member canceling; must be the requester
    #[arg(long)]
    actor: Uuid,
}

impl Cancel {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let event = Directory::open(root).cancel_request(self.request, self.actor)?;
        print_event(&event);
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Delete {
    /// The canceled request to delete
    request: Uuid,
}

impl Delete {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let event = Directory::open(root).delete_request(self.request)?;
        print_event(&event);
        Ok(())
    }
}

fn print_event(event: &RequestEvent) {
    match event {
        RequestEvent::Signed {
            request_id,
            decision,
            status,
            ..
        } => {
            let line = format!("Signed {request_id}: {decision:?}, request is now {status}");
            if *status == RequestStatus::Pending {
                println!("{line}");
            } else {
                println!("{}", line.success());
            }
        }
        RequestEvent::Canceled { request_id, .. } => {
            println!("{}", format!("Canceled {request_id}").warning());
        }
        RequestEvent::Deleted { request_id } => {
            println!("{}", format!("Deleted {request_id}").warning());
        }
    }
}
