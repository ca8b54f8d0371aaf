use std::io::{self, Write};

use anyhow::{Result, bail};
use client::{
    LoginFlow, RemoteApi,
    login::{LoginOutcome, Submission},
};
use rpassword::prompt_password;
use shared::models::Customer;
use tracing::warn;

use super::Context;

pub async fn login(ctx: &Context, email: Option<String>) -> Result<()> {
    if let Some(customer) = ctx.session.current_user() {
        println!(
            "Already logged in as {} <{}>; run `eatoff logout` first to switch accounts",
            customer.display_name(),
            customer.email
        );
        return Ok(());
    }

    let email = match email {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = prompt_password("Password: ")?;

    let mut flow = LoginFlow::new(ctx.session.clone());
    let (ticket, credentials) = match flow.submit(&email, &password) {
        Submission::Started {
            ticket,
            credentials,
        } => (ticket, credentials),
        Submission::Invalid(field_error) => bail!("{field_error}"),
        Submission::Ignored => bail!("a login is already in progress"),
    };

    println!("Logging in...");
    let result = ctx.api.login(&credentials.to_request()).await;
    match flow.complete(ticket, result) {
        Some(LoginOutcome::SignedIn(customer)) => {
            ctx.api.set_auth_token(ctx.session.auth_token());
            println!("Login successful!");
            print_profile(&customer);
            println!("Session saved to {}", ctx.session_path.display());
            Ok(())
        }
        Some(LoginOutcome::Failed(err)) => bail!("{err}"),
        None => bail!("login was interrupted"),
    }
}

pub async fn logout(ctx: &Context) -> Result<()> {
    let was_logged_in = ctx.session.is_authenticated();
    ctx.session.clear()?;

    if let Err(err) = ctx.api.logout().await {
        warn!(error = %err, "server-side logout failed");
        eprintln!("warning: server logout failed: {err}");
    }

    if was_logged_in {
        println!("Logged out.");
    } else {
        println!("No active session; local state cleared.");
    }
    Ok(())
}

pub fn whoami(ctx: &Context) -> Result<()> {
    match ctx.session.current_user() {
        Some(customer) => {
            print_profile(&customer);
            Ok(())
        }
        None => bail!("not logged in; run `eatoff login` first"),
    }
}

pub(crate) fn print_profile(customer: &Customer) {
    println!("{} <{}>", customer.display_name(), customer.email);
    println!("  tier:    {}", customer.tier());
    println!(
        "  points:  {} (lifetime {})",
        customer.formatted_points(),
        customer.total_points_earned
    );
    println!("  balance: {}", customer.formatted_balance());
    let address = customer.full_address();
    if !address.is_empty() {
        println!("  address: {address}");
    }
    if let Some(phone) = &customer.phone {
        println!("  phone:   {phone}");
    }
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush().ok();
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
