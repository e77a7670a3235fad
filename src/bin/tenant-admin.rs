use clap::{Parser, Subcommand};
use log::debug;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use tenant_admin::auth::{AuthFlow, SignupOutcome, VerificationOutcome};
use tenant_admin::config::AdminConfig;
use tenant_admin::dashboard::{
    Dashboard, Revalidator, TenantSnapshot, TierChangeOutcome, TierFilter, PAGE_SIZE_OPTIONS,
};
use tenant_admin::prelude::*;

type CliResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[clap(name = "tenant-admin", version, about = "Manage tenants and their subscription tiers")]
struct Cli {
    /// Base URL of the admin API
    #[clap(long, env = "ADMIN_API_URL")]
    api_url: Option<String>,

    /// Cognito user pool ID
    #[clap(long, env = "COGNITO_USER_POOL_ID")]
    user_pool_id: Option<String>,

    /// Cognito app client ID
    #[clap(long, env = "COGNITO_CLIENT_ID")]
    client_id: Option<String>,

    /// Operator email
    #[clap(long, env = "ADMIN_EMAIL")]
    email: Option<String>,

    /// Operator password
    #[clap(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the operator credentials
    Login,
    /// Create an operator account
    Signup {
        /// Password confirmation
        #[clap(long)]
        confirm: Option<String>,
    },
    /// Submit the emailed verification code
    Confirm { code: String },
    /// Tenant statistics and tiers
    Tenants {
        #[clap(subcommand)]
        command: TenantsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum TenantsCommand {
    /// Show one page of tenants
    List {
        #[clap(long, default_value = "")]
        search: String,
        /// "All" or a tier name
        #[clap(long, default_value = "All")]
        tier: TierFilter,
        #[clap(long, default_value = "1")]
        page: usize,
        #[clap(long, default_value = "5")]
        page_size: usize,
        /// Keep reloading on the revalidation interval
        #[clap(long)]
        watch: bool,
    },
    /// Move a tenant to another tier
    SetTier { user_id: String, tier: TierName },
}

impl Cli {
    fn config(&self) -> AdminConfig {
        let mut config = AdminConfig::from_env();
        if let Some(url) = &self.api_url {
            config = config.with_api_url(url);
        }
        if let Some(pool) = &self.user_pool_id {
            config = config.with_user_pool_id(pool);
        }
        if let Some(client) = &self.client_id {
            config = config.with_client_id(client);
        }
        config
    }

    fn credentials(&self) -> CliResult<(&str, &str)> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err("--email and --password (or ADMIN_EMAIL / ADMIN_PASSWORD) are required".into()),
        }
    }
}

fn prompt(label: &str) -> CliResult<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn print_notice(flow: &AuthFlow) {
    if let Some(notice) = flow.notice() {
        println!("{}", notice);
    }
}

async fn sign_in_if_possible(cli: &Cli, portal: &AdminPortal) -> CliResult<()> {
    if cli.email.is_none() || cli.password.is_none() {
        debug!("No credentials given, calling the admin API unauthenticated");
        return Ok(());
    }
    let (email, password) = cli.credentials()?;
    portal.auth_flow().submit_login(email, password).await?;
    Ok(())
}

async fn verify(flow: &mut AuthFlow, code: &str) -> CliResult<()> {
    match flow.submit_verification_code(code).await? {
        VerificationOutcome::SignedIn => {
            print_notice(flow);
            println!("Signed in.");
        }
        VerificationOutcome::LoginRequired => {
            print_notice(flow);
            println!("Please log in with your new account.");
        }
        VerificationOutcome::Pending => println!("The account needs further confirmation."),
    }
    Ok(())
}

/// Wait for the revalidator's first load and build the dashboard from it
async fn first_snapshot(
    revalidator: &Revalidator,
) -> CliResult<(Dashboard, tokio::sync::watch::Receiver<TenantSnapshot>)> {
    let mut snapshots = revalidator.subscribe();
    snapshots.changed().await?;
    let mut dashboard = Dashboard::default();
    dashboard.replace_tenants(snapshots.borrow_and_update().clone());
    Ok((dashboard, snapshots))
}

fn print_page(dashboard: &Dashboard) {
    for card in dashboard.cards() {
        println!("{}\n", card);
    }
    println!(
        "Page {} of {} ({} tenants, {} / page, filter: {})",
        dashboard.current_page(),
        dashboard.page_count().max(1),
        dashboard.total_filtered(),
        dashboard.page_size(),
        dashboard.selected_tier()
    );
}

async fn run(cli: Cli) -> CliResult<()> {
    let portal = AdminPortal::new(cli.config())?;
    let _listener = portal.session().listen();

    match &cli.command {
        Command::Login => {
            let (email, password) = cli.credentials()?;
            portal.auth_flow().submit_login(email, password).await?;
            portal.session().check_user().await;
            match portal.session().current_user().await {
                Some(user) => println!("Welcome, {}", user.email.unwrap_or(user.username)),
                None => println!("Signed in."),
            }
        }
        Command::Signup { confirm } => {
            let (email, password) = cli.credentials()?;
            let confirm = match confirm {
                Some(confirm) => confirm.clone(),
                None => prompt("Confirm password")?,
            };

            let mut flow = portal.auth_flow();
            match flow.submit_signup(email, password, &confirm).await? {
                SignupOutcome::VerificationRequired { email } => {
                    print_notice(&flow);
                    let code = prompt(&format!("Verification code for {}", email))?;
                    if code.is_empty() {
                        println!("Run `tenant-admin confirm <code>` once the code arrives.");
                        return Ok(());
                    }
                    verify(&mut flow, &code).await?;
                }
                SignupOutcome::Completed => print_notice(&flow),
            }
        }
        Command::Confirm { code } => {
            let email = cli.email.as_deref().ok_or("--email (or ADMIN_EMAIL) is required")?;
            let mut flow = portal.auth_flow();
            flow.resume_verification(email);
            verify(&mut flow, code).await?;
        }
        Command::Tenants { command } => {
            sign_in_if_possible(&cli, &portal).await?;
            match command {
                TenantsCommand::List {
                    search,
                    tier,
                    page,
                    page_size,
                    watch,
                } => {
                    if !PAGE_SIZE_OPTIONS.contains(page_size) {
                        debug!("Unusual page size {}", page_size);
                    }
                    let revalidator = portal.revalidator();
                    let (mut dashboard, mut snapshots) = first_snapshot(&revalidator).await?;
                    dashboard.set_tier_filter(*tier);
                    dashboard.set_page_size(*page_size);
                    dashboard.set_search_term(search.as_str());
                    dashboard.set_page(*page);
                    print_page(&dashboard);

                    if *watch {
                        let revalidate_every: Duration = portal.config().revalidate_interval;
                        while snapshots.changed().await.is_ok() {
                            let snapshot = snapshots.borrow_and_update().clone();
                            dashboard.replace_tenants(snapshot);
                            println!("\n--- reloaded every {:?} ---\n", revalidate_every);
                            print_page(&dashboard);
                        }
                    }
                }
                TenantsCommand::SetTier { user_id, tier } => {
                    let revalidator = portal.revalidator();
                    let (dashboard, mut snapshots) = first_snapshot(&revalidator).await?;
                    let tenant = dashboard
                        .tenants()
                        .iter()
                        .find(|t| &t.user_id == user_id)
                        .ok_or_else(|| format!("No tenant with ID {}", user_id))?;

                    let card = TenantCard::new(tenant);
                    let outcome = card
                        .request_tier_change(portal.api(), *tier, || revalidator.refresh())
                        .await;
                    match outcome {
                        TierChangeOutcome::Unchanged => {
                            println!("{} is already on {}.", card.title(), tier)
                        }
                        TierChangeOutcome::Changed(notification) => {
                            println!("{}", notification);
                            snapshots.changed().await?;
                            let reloaded = snapshots.borrow_and_update().clone();
                            if let Some(updated) = reloaded.iter().find(|t| &t.user_id == user_id) {
                                println!("\n{}", TenantCard::new(updated));
                            }
                        }
                        TierChangeOutcome::Failed(notification) => {
                            return Err(notification.message().into())
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
