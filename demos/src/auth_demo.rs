use dotenv::dotenv;
use std::env;
use std::time::Duration;

use tenant_admin::auth::{Route, SessionEvent};
use tenant_admin::prelude::*;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv().ok();
    pretty_env_logger::init();

    let email = env::var("ADMIN_EMAIL").map_err(|_| "ADMIN_EMAIL must be set")?;
    let password = env::var("ADMIN_PASSWORD").map_err(|_| "ADMIN_PASSWORD must be set")?;

    let portal = AdminPortal::from_env()?;
    let session = portal.session().clone();
    let mut navigation = session.subscribe();
    let _listener = session.listen();

    println!("Starting auth demo against {}", portal.config().api_url);

    session.check_user().await;
    println!(
        "Visiting the dashboard redirects to: {:?}",
        session.redirect_for(Route::Dashboard).await
    );

    // Wrong password first, to show the mapped error message
    let mut flow = portal.auth_flow();
    if let Err(e) = flow.submit_login(&email, "definitely-not-the-password").await {
        println!("Login with a bad password failed: {}", e);
    }

    flow.submit_login(&email, &password).await?;
    println!("Login accepted");

    match tokio::time::timeout(Duration::from_secs(5), navigation.recv()).await {
        Ok(Ok(SessionEvent::Navigate(route))) => println!("Navigate to {}", route.path()),
        _ => println!("No navigation event received"),
    }

    if let Some(user) = session.current_user().await {
        println!("Welcome, {}", user.email.unwrap_or(user.username));
    }
    println!(
        "Token available: {}",
        session.get_token().await.is_some()
    );

    session.sign_out().await;
    println!("Signed out; authenticated = {}", session.is_authenticated().await);

    Ok(())
}
