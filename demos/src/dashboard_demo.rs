use dotenv::dotenv;
use log::info;
use std::env;
use std::time::Duration;

use tenant_admin::dashboard::{TierChangeOutcome, TierFilter};
use tenant_admin::prelude::*;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    pretty_env_logger::init();

    let config = AdminConfig::from_env().with_revalidate_interval(Duration::from_secs(5));
    let portal = AdminPortal::new(config)?;

    if let (Ok(email), Ok(password)) = (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
        portal.auth_flow().submit_login(&email, &password).await?;
    }

    let revalidator = portal.revalidator();
    let mut snapshots = revalidator.subscribe();
    snapshots.changed().await?;

    let mut dashboard = Dashboard::default();
    dashboard.replace_tenants(revalidator.latest());
    println!("Loaded {} tenants", dashboard.tenants().len());

    for card in dashboard.cards() {
        println!("{}\n", card);
    }

    let search = env::var("DEMO_SEARCH").unwrap_or_default();
    dashboard.set_search_term(search.as_str());
    dashboard.set_tier_filter(TierFilter::Only(TierName::Basic));
    println!(
        "{} tenants match '{}' on {}",
        dashboard.total_filtered(),
        search,
        dashboard.selected_tier()
    );

    let first = dashboard.visible().first().map(|t| (*t).clone());
    if let Some(tenant) = first {
        let card = TenantCard::new(&tenant);
        let outcome = card
            .request_tier_change(portal.api(), TierName::Professional, || revalidator.refresh())
            .await;

        match outcome {
            TierChangeOutcome::Changed(notification) => {
                println!("{}", notification);
                snapshots.changed().await?;
                dashboard.replace_tenants(snapshots.borrow_and_update().clone());
                info!("Dashboard reloaded after tier change");
            }
            TierChangeOutcome::Failed(notification) => println!("{}", notification),
            TierChangeOutcome::Unchanged => println!("Nothing to change"),
        }
    }

    Ok(())
}
