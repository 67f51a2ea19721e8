//! Leadcap - lead capture client for the dental SEO landing site
//!
//! Drives the site's lead form from the command line: validate input, preview
//! the webhook payload, or submit a lead and follow the thank-you redirect.

mod config;
mod gateway;
mod http;
mod models;
mod navigation;
mod surface;
mod utm;
mod validator;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use gateway::WebhookGateway;
use models::LeadFormState;
use navigation::{Navigator, Route};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use surface::{Collaborators, SubmitOutcome, Surface, SurfaceKind, SurfaceSettings};
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;
use utm::StaticLocation;

#[derive(Parser, Debug)]
#[command(name = "leadcap")]
#[command(about = "Lead capture client for the dental SEO landing site", long_about = None)]
struct Args {
    /// Config file path (default: search config.toml locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a lead to the configured webhook
    Submit {
        #[command(flatten)]
        lead: LeadArgs,

        /// Use the popup surface instead of the hero form
        #[arg(long)]
        popup: bool,
    },
    /// Check the fields without sending anything
    Validate {
        #[command(flatten)]
        lead: LeadArgs,
    },
    /// Print the JSON body that would be posted
    Payload {
        #[command(flatten)]
        lead: LeadArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct LeadArgs {
    #[arg(long, default_value = "")]
    name: String,

    #[arg(long, default_value = "")]
    email: String,

    #[arg(long, default_value = "")]
    company: String,

    /// One of +1, +91, +44, +61, +81
    #[arg(long, default_value = "+1")]
    country_code: String,

    #[arg(long, default_value = "")]
    phone: String,

    #[arg(long, default_value = "")]
    message: String,

    /// Agree to the Terms & Conditions and Privacy Policy
    #[arg(long)]
    agree: bool,

    /// Query string of the landing page, e.g. "?utm_source=google"
    #[arg(long, default_value = "")]
    query: String,
}

impl LeadArgs {
    /// Text inputs keyed by their form input name
    fn inputs(&self) -> [(&'static str, &str); 6] {
        [
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("company", self.company.as_str()),
            ("countryCode", self.country_code.as_str()),
            ("phone", self.phone.as_str()),
            ("message", self.message.as_str()),
        ]
    }
}

/// Renders the thank-you page and releases the waiting `submit` command
struct ConsoleNavigator {
    home: String,
    arrived: Notify,
}

impl Navigator for ConsoleNavigator {
    fn navigate(&self, href: &str) {
        tracing::info!("Navigated to {}", href);
        println!("{}", navigation::THANK_YOU_TITLE);
        println!("{}", navigation::THANK_YOU_BODY);
        println!("Back to Home: {}", self.home);
        self.arrived.notify_one();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let cfg = config::Config::load(args.config.as_deref())?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cfg.logging.level)),
        )
        .init();

    match args.command {
        Command::Submit { lead, popup } => run_submit(&cfg, &lead, popup).await,
        Command::Validate { lead } => run_validate(&cfg, &lead),
        Command::Payload { lead } => run_payload(&cfg, &lead),
    }
}

/// Fill a form for local inspection: no webhook, no navigation
fn offline_form(cfg: &config::Config, lead: &LeadArgs) -> Result<LeadFormState> {
    let location = StaticLocation::new(lead.query.clone());
    let mut form = LeadFormState::new();
    form.set_utm(utm::capture_utm(&location, &cfg.form.default_utm_source));
    for (input, value) in lead.inputs() {
        form.set_field(input, value)?;
    }
    form.agreed_to_terms = lead.agree;
    Ok(form)
}

fn run_validate(cfg: &config::Config, lead: &LeadArgs) -> Result<()> {
    let form = offline_form(cfg, lead)?;
    let verdict = validator::validate(&form);

    if verdict.is_valid() {
        println!("Form is valid");
        return Ok(());
    }
    print_invalid(&verdict);
    bail!(verdict.message().unwrap_or_default())
}

fn print_invalid(verdict: &validator::ValidationResult) {
    for field in verdict.invalid_fields() {
        println!("invalid: {} ({})", field, field.input_name());
    }
}

fn run_payload(cfg: &config::Config, lead: &LeadArgs) -> Result<()> {
    let form = offline_form(cfg, lead)?;
    let json = serde_json::to_string_pretty(&form.to_payload())
        .context("Failed to serialize payload")?;
    println!("{}", json);
    Ok(())
}

async fn run_submit(cfg: &config::Config, lead: &LeadArgs, popup: bool) -> Result<()> {
    let endpoint = cfg.webhook_url()?;
    let client = http::HttpClient::new(&cfg.http)?;
    let navigator = Arc::new(ConsoleNavigator {
        home: Route::Landing.href(&cfg.router.basename),
        arrived: Notify::new(),
    });

    let deps = Collaborators {
        gateway: Arc::new(WebhookGateway::new(client, endpoint)),
        navigator: navigator.clone(),
        location: Arc::new(StaticLocation::new(lead.query.clone())),
    };
    let kind = if popup {
        SurfaceKind::Popup
    } else {
        SurfaceKind::Inline
    };
    let settings = SurfaceSettings::from_config(cfg);
    let redirect_delay = settings.redirect_delay;

    let surface = Surface::new(kind, settings, deps);
    surface.open();

    for (input, value) in lead.inputs() {
        surface.set_field(input, value)?;
    }
    surface.edit(|f| f.agreed_to_terms = lead.agree);

    tracing::info!("[{:?}] {}", kind, surface.submit_label());
    let outcome = surface.submit().await;
    tracing::debug!("Status: {:?}, phases: {:?}", surface.status(), surface.phases());
    if let Some(ack) = surface.acknowledgement() {
        println!("{}", ack);
    }

    let result = match outcome {
        SubmitOutcome::Submitted => {
            println!("{}", surface.submit_label());
            tokio::time::timeout(
                redirect_delay + Duration::from_secs(5),
                navigator.arrived.notified(),
            )
            .await
            .context("Redirect did not happen")
        }
        SubmitOutcome::Rejected(verdict) => {
            print_invalid(&verdict);
            Err(anyhow!(
                "Lead not submitted: {}",
                verdict.message().unwrap_or_default()
            ))
        }
        SubmitOutcome::Failed(e) => Err(e).context("Lead not submitted"),
        other => Err(anyhow!("Lead not submitted: {:?}", other)),
    };

    surface.destroy();
    result
}
