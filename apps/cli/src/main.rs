use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings, AppEnvironment},
    selectors::{self, extract_error_messages},
    validation::{validate_form, FormField},
    FileCredentialStore, MarketplaceClient, Outcome,
};
use serde::Serialize;
use shared::{
    domain::{CleaningId, CleaningType, FeedKind},
    protocol::{CleaningCreate, CleaningUpdate},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cleaning-market", about = "Command-line client for the cleaning marketplace API")]
struct Args {
    /// Overrides the configured API base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Shows the signed-in user.
    Me,
    Logout,
    #[command(subcommand)]
    Cleanings(CleaningsCommand),
    #[command(subcommand)]
    Offers(OffersCommand),
    /// Prints the activity feed, newest first.
    Feed {
        #[arg(long)]
        before: Option<DateTime<Utc>>,
        #[arg(long)]
        page_size: Option<usize>,
        /// Keep paging until this many pages are loaded or the feed runs out.
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
}

#[derive(Subcommand, Debug)]
enum CleaningsCommand {
    /// Lists cleaning jobs owned by the signed-in user.
    List,
    Show {
        id: String,
        /// Also load offers made on the job.
        #[arg(long)]
        with_offers: bool,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_cleaning_type, default_value = "spot_clean")]
        cleaning_type: CleaningType,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_cleaning_type)]
        cleaning_type: Option<CleaningType>,
    },
}

#[derive(Subcommand, Debug)]
enum OffersCommand {
    List {
        cleaning_id: String,
        /// Only the offer made by this user.
        #[arg(long)]
        username: Option<String>,
    },
    Create { cleaning_id: String },
    Accept { cleaning_id: String, username: String },
    Cancel { cleaning_id: String },
    Rescind { cleaning_id: String },
}

fn parse_cleaning_type(raw: &str) -> Result<CleaningType, String> {
    CleaningType::parse(raw)
        .ok_or_else(|| format!("unknown cleaning type '{raw}' (dust_up, spot_clean, full_clean)"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report<T: Serialize>(outcome: Outcome<T>) -> Result<()> {
    match outcome {
        Outcome::Success { data, .. } => print_json(&data),
        Outcome::Failure { status, error } => {
            let messages = extract_error_messages(Some(&error));
            if messages.is_empty() {
                eprintln!("error: {error}");
            }
            for message in messages {
                eprintln!("error: {message}");
            }
            match status {
                Some(status) => bail!("request failed with status {status}"),
                None => bail!("request failed"),
            }
        }
    }
}

async fn require_session(client: &MarketplaceClient) -> Result<()> {
    match client.restore_session().await {
        Some(outcome) if outcome.is_success() => Ok(()),
        Some(outcome) => report(outcome),
        None => bail!("not signed in; run `login` first"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.api_url {
        settings.environment = AppEnvironment::Production;
        settings.remote_server_url = Some(url);
    }
    let credentials = Arc::new(FileCredentialStore::new(settings.credentials_path.clone()));
    let client = MarketplaceClient::from_settings(&settings, credentials)?;
    let api = settings.api_base_url()?;
    info!(%api, "cli: client ready");

    match args.command {
        Command::Login { email, password } => {
            validate_form(&[
                (FormField::Email, email.as_str()),
                (FormField::Password, password.as_str()),
            ])?;
            report(client.login(&email, &password).await)
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            validate_form(&[
                (FormField::Username, username.as_str()),
                (FormField::Email, email.as_str()),
                (FormField::Password, password.as_str()),
            ])?;
            report(client.register(&username, &email, &password).await)
        }
        Command::Me => match client.restore_session().await {
            Some(outcome) => report(outcome),
            None => bail!("not signed in; run `login` first"),
        },
        Command::Logout => {
            client.log_user_out()?;
            println!("Signed out.");
            Ok(())
        }
        Command::Cleanings(command) => {
            require_session(&client).await?;
            run_cleanings(&client, command).await
        }
        Command::Offers(command) => {
            require_session(&client).await?;
            run_offers(&client, command).await
        }
        Command::Feed {
            before,
            page_size,
            pages,
        } => {
            require_session(&client).await?;
            let first = client.fetch_cleaning_feed_items(before, page_size).await;
            if !first.is_success() {
                return report(first);
            }
            for _ in 1..pages {
                match client.fetch_next_feed_page(page_size).await {
                    Some(outcome) if !outcome.is_success() => return report(outcome),
                    Some(_) => {}
                    None => break,
                }
            }
            let state = client.state();
            print_json(&selectors::feed_items(&state, FeedKind::Cleaning))?;
            if selectors::feed_has_next(&state, FeedKind::Cleaning) {
                eprintln!("more items available; rerun with a larger --pages");
            }
            Ok(())
        }
    }
}

async fn run_cleanings(client: &MarketplaceClient, command: CleaningsCommand) -> Result<()> {
    match command {
        CleaningsCommand::List => report(client.fetch_all_user_owned_cleaning_jobs().await),
        CleaningsCommand::Show { id, with_offers } => {
            let id = CleaningId::new(id);
            if !with_offers {
                return report(client.fetch_cleaning_job_by_id(&id).await);
            }
            let (job, offers) = client.load_cleaning_job_with_offers(&id).await;
            report(job)?;
            report(offers)?;
            let owns = client.store().read(|state| selectors::user_owns_cleaning_job(state, &id));
            println!("owned by you: {owns}");
            Ok(())
        }
        CleaningsCommand::Create {
            name,
            price,
            description,
            cleaning_type,
        } => {
            let price_text = price.to_string();
            validate_form(&[
                (FormField::Name, name.as_str()),
                (FormField::Price, price_text.as_str()),
                (FormField::CleaningType, cleaning_type.as_str()),
            ])?;
            let new_job = CleaningCreate {
                name,
                description,
                price,
                cleaning_type,
            };
            report(client.create_cleaning_job(&new_job).await)
        }
        CleaningsCommand::Update {
            id,
            name,
            price,
            description,
            cleaning_type,
        } => {
            let update = CleaningUpdate {
                name,
                description,
                price,
                cleaning_type,
            };
            report(client.update_cleaning_job(&CleaningId::new(id), &update).await)
        }
    }
}

async fn run_offers(client: &MarketplaceClient, command: OffersCommand) -> Result<()> {
    match command {
        OffersCommand::List {
            cleaning_id,
            username: Some(username),
        } => report(
            client
                .fetch_user_offer_for_cleaning_job(&CleaningId::new(cleaning_id), &username)
                .await,
        ),
        OffersCommand::List {
            cleaning_id,
            username: None,
        } => report(
            client
                .fetch_all_offers_for_cleaning_job(&CleaningId::new(cleaning_id))
                .await,
        ),
        OffersCommand::Create { cleaning_id } => report(
            client
                .create_offer_for_cleaning_job(&CleaningId::new(cleaning_id))
                .await,
        ),
        OffersCommand::Accept {
            cleaning_id,
            username,
        } => report(
            client
                .accept_users_offer_for_cleaning_job(&CleaningId::new(cleaning_id), &username)
                .await,
        ),
        OffersCommand::Cancel { cleaning_id } => report(
            client
                .cancel_user_offer_for_cleaning_job(&CleaningId::new(cleaning_id))
                .await,
        ),
        OffersCommand::Rescind { cleaning_id } => {
            let outcome = client
                .rescind_user_offer_for_cleaning_job(&CleaningId::new(cleaning_id))
                .await;
            if outcome.is_success() {
                println!("Offer rescinded.");
                return Ok(());
            }
            report(outcome)
        }
    }
}
