// ABOUTME: Pierre Meets CLI - operator tool for booking, rescheduling and inspecting meets
// ABOUTME: Runs the same services as the UI backend against the configured database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Create the schema
//! pierre-meets-cli migrate
//!
//! # Check and spend credits
//! pierre-meets-cli balance --client client-1 --coach coach-1
//! pierre-meets-cli book --client client-1 --coach coach-1 --day 2025-03-03 --time 10:00
//!
//! # Move a meet, then answer the request as the coach
//! pierre-meets-cli reschedule --meet <id> --user client-1 \
//!     --start 2025-03-04T10:00:00Z --end 2025-03-04T10:30:00Z
//! pierre-meets-cli requests --user coach-1
//! pierre-meets-cli approve --request <id> --user coach-1
//! ```

mod commands;
mod helpers;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use pierre_meets::config::{DatabaseUrl, MeetsConfig};
use pierre_meets::logging::LogFormat;
use uuid::Uuid;

use commands::Services;

#[derive(Parser)]
#[command(
    name = "pierre-meets-cli",
    about = "Pierre Meets management CLI",
    long_about = "Book, reschedule, answer and inspect coach/client meets. Every command prints JSON."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override (e.g. `sqlite:./data/meets.db`)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Create the meet tables
    Migrate,

    /// Show the credits a client holds with a coach
    Balance {
        #[arg(long)]
        client: String,
        #[arg(long)]
        coach: String,
    },

    /// Book a meet
    Book {
        /// Booking client
        #[arg(long)]
        client: String,
        /// Coach to meet
        #[arg(long)]
        coach: String,
        /// Day in the display offset (YYYY-MM-DD)
        #[arg(long)]
        day: NaiveDate,
        /// Start time in the display offset (HH:MM)
        #[arg(long, value_parser = helpers::parse_time)]
        time: NaiveTime,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        coach_name: Option<String>,
        /// Book a paid meet instead of spending a credit
        #[arg(long)]
        paid: bool,
        /// Paid meet length in minutes
        #[arg(long, default_value = "60")]
        duration: u32,
        /// Paid meet price in minor units
        #[arg(long, default_value = "0")]
        price_cents: u64,
        #[arg(long, default_value = "USD")]
        currency: String,
        /// Purchased product backing the paid meet
        #[arg(long)]
        activity_id: Option<String>,
        /// Payment was confirmed by the payment provider
        #[arg(long)]
        purchase_paid: bool,
    },

    /// Start checkout for a paid meet product
    Checkout {
        #[arg(long)]
        activity_id: String,
    },

    /// Accept or decline a meet
    Respond {
        #[arg(long)]
        meet: Uuid,
        #[arg(long)]
        user: String,
        /// Decline instead of accepting
        #[arg(long)]
        decline: bool,
    },

    /// Propose or apply a new slot for a meet
    Reschedule {
        #[arg(long)]
        meet: Uuid,
        #[arg(long)]
        user: String,
        /// New start (RFC 3339)
        #[arg(long)]
        start: DateTime<Utc>,
        /// New end (RFC 3339)
        #[arg(long)]
        end: DateTime<Utc>,
        #[arg(long)]
        note: Option<String>,
    },

    /// List reschedule requests waiting for a user's answer
    Requests {
        #[arg(long)]
        user: String,
    },

    /// Approve a reschedule request
    Approve {
        #[arg(long)]
        request: Uuid,
        #[arg(long)]
        user: String,
    },

    /// Reject a reschedule request
    Reject {
        #[arg(long)]
        request: Uuid,
        #[arg(long)]
        user: String,
    },

    /// Cancel a meet
    Cancel {
        #[arg(long)]
        meet: Uuid,
        #[arg(long)]
        user: String,
    },

    /// Mark a meet as held (coach only)
    Complete {
        #[arg(long)]
        meet: Uuid,
        #[arg(long)]
        user: String,
    },

    /// List a user's meets by start time
    Meets {
        #[arg(long)]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = MeetsConfig::from_env().context("Failed to load configuration")?;
    config.logging.format = LogFormat::Compact;
    if cli.verbose {
        config.logging.level = "debug".to_owned();
    }
    config.logging.init()?;

    if let Some(url) = &cli.database_url {
        config.database.url = DatabaseUrl::parse_url(url)?;
    }

    let services = Services::connect(&config).await?;

    match cli.command {
        Command::Migrate => commands::migrate(&services).await?,
        Command::Balance { client, coach } => commands::balance(&services, &client, &coach).await?,
        Command::Book {
            client,
            coach,
            day,
            time,
            title,
            coach_name,
            paid,
            duration,
            price_cents,
            currency,
            activity_id,
            purchase_paid,
        } => {
            let mut context = if paid {
                helpers::paid_context(&coach, day, time, duration, price_cents, currency, activity_id)
            } else {
                pierre_meets::models::BookingRequestContext::credit_meet(&coach, day, time)
            };
            context.title = title;
            context.coach_display_name = coach_name;
            context.meet_purchase_paid = purchase_paid;
            commands::book(&services, &context, &client).await?;
        }
        Command::Checkout { activity_id } => {
            commands::checkout(&config, activity_id).await?;
        }
        Command::Respond {
            meet,
            user,
            decline,
        } => commands::respond(&services, meet, &user, !decline).await?,
        Command::Reschedule {
            meet,
            user,
            start,
            end,
            note,
        } => commands::reschedule(&services, meet, &user, start, end, note.as_deref()).await?,
        Command::Requests { user } => commands::requests(&services, &user).await?,
        Command::Approve { request, user } => commands::approve(&services, request, &user).await?,
        Command::Reject { request, user } => commands::reject(&services, request, &user).await?,
        Command::Cancel { meet, user } => commands::cancel(&services, meet, &user).await?,
        Command::Complete { meet, user } => commands::complete(&services, meet, &user).await?,
        Command::Meets { user } => commands::meets(&services, &user).await?,
    }

    Ok(())
}
