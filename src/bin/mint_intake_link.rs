//! Mints a patient intake link for an organization and prints it on stdout.
//!
//! ```text
//! mint_intake_link --organization-id <id> [--kind expiring|tablet] [--base-url URL]
//! ```
//!
//! The signing secret comes from `INTAKE_FORM_SECRET` and the base URL defaults to
//! `APP_BASE_URL`, both read from the environment or a `.env` file.

use clap::{Parser, ValueEnum};
use domain::intake_link;
use log::*;
use service::{config::Config, logging::Logger};

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum LinkKind {
    /// Valid for 24 hours, for sharing by email or SMS
    Expiring,
    /// Never expires, for a front-desk tablet
    Tablet,
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Mint a patient intake link", long_about = None)]
struct Cli {
    /// Organization the intake link submits to
    #[arg(long)]
    organization_id: String,

    /// Kind of intake link to mint
    #[arg(long, value_enum, default_value_t = LinkKind::Expiring)]
    kind: LinkKind,

    /// Base URL to prefix the link with, overriding APP_BASE_URL
    #[arg(long)]
    base_url: Option<String>,

    #[command(flatten)]
    config: Config,
}

impl Cli {
    fn into_parts(self) -> (Config, String, LinkKind) {
        let config = match self.base_url {
            Some(base_url) => self.config.set_app_base_url(base_url),
            None => self.config,
        };
        (config, self.organization_id, self.kind)
    }
}

fn main() {
    dotenvy::dotenv().ok();
    let (config, organization_id, kind) = Cli::parse().into_parts();

    if let Err(e) = Logger::init_stderr_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
    }

    let link = match kind {
        LinkKind::Expiring => intake_link::generate_expiring_link(&config, &organization_id),
        LinkKind::Tablet => intake_link::generate_tablet_link(&config, &organization_id),
    };

    match link {
        Ok(url) => println!("{url}"),
        Err(e) => {
            error!("Failed to mint {kind:?} intake link for organization {organization_id}: {e}");
            std::process::exit(1);
        }
    }
}
