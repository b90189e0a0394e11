use std::path::PathBuf;

mod canvass;
mod entities;
mod init;
mod sections;
mod sign;
mod ssot;
mod summary;
mod terminal;
mod unit;

use canvass::Canvass;
use clap::ArgAction;
use entities::Entities;
use init::Init;
use sections::Sections;
use sign::{Cancel, Delete, Sign};
use ssot::Ssot;
use summary::Summary;
use unit::Unit;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the root of the data directory
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.command.run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Create the data directory layout and a default config
    Init(Init),

    /// Show a request's responses grouped by section instance
    Sections(Sections),

    /// Show the item table of a request
    Summary(Summary),

    /// Compare the pending quotations of an order
    Canvass(Canvass),

    /// Show every order with its quotations and receiving reports
    Ssot(Ssot),

    /// Extract the unit and quantity from item labels
    Unit(Unit),

    /// Approve a request as one of its signers
    Approve(Sign),

    /// Reject a request as one of its signers
    Reject(Sign),

    /// Cancel a pending request as its requester
    Cancel(Cancel),

    /// Delete a canceled request
    Delete(Delete),

    /// List named entities such as suppliers and projects
    Entities(Entities),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        use formsly::RequestStatus;

        match self {
            Self::Init(command) => command.run(&root)?,
            Self::Sections(command) => command.run(root)?,
            Self::Summary(command) => command.run(root)?,
            Self::Canvass(command) => command.run(root)?,
            Self::Ssot(command) => command.run(root)?,
            Self::Unit(command) => command.run()?,
            Self::Approve(command) => command.run(root, RequestStatus::Approved)?,
            Self::Reject(command) => command.run(root, RequestStatus::Rejected)?,
            Self::Cancel(command) => command.run(root)?,
            Self::Delete(command) => command.run(root)?,
            Self::Entities(command) => command.run(root)?,
        }
        Ok(())
    }
}
