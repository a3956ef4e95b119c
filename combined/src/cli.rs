//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use catalog_service_lib::query::SortOrder;
use domain::{ProductCategory, ProductCondition, UserKind};

/// Donation market - session, catalog and route guards from the command line
#[derive(Parser, Debug)]
#[command(name = "donation-market")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory for the durable session file
    #[arg(long, global = true, env = "SESSION_STORAGE_DIR", default_value = ".donation-market")]
    pub storage_dir: PathBuf,

    /// Resolve every simulated delay immediately
    #[arg(long, global = true)]
    pub no_latency: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in; unknown emails get a new account
    Login(LoginArgs),

    /// Create an account and sign in
    Register(RegisterArgs),

    /// Sign out and clear stored sessions
    Logout,

    /// Show the signed-in user and role
    Whoami,

    /// Navigate to a path through the route guards
    Visit {
        /// Path such as /admin or /product/1
        path: String,
    },

    /// Browse the catalog
    Catalog(CatalogArgs),

    /// List every known user
    Users,

    /// Add a user's email to the admin allow-list
    Promote {
        /// User ID as shown by `users`
        user_id: String,
    },

    /// Show or change moderation settings (admins only)
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Scripted walkthrough of the whole flow
    Demo,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print the stored settings
    Show,

    /// Change one or more settings
    Set {
        #[arg(long)]
        auto_approve: Option<bool>,

        #[arg(long)]
        max_daily_donations: Option<u32>,

        #[arg(long)]
        email_notifications: Option<bool>,
    },

    /// Restore the defaults
    Reset,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,

    /// Keep the session across runs
    #[arg(long)]
    pub remember_me: bool,

    /// Login URL carrying a returnUrl to continue to, e.g. /login?returnUrl=%2Fadmin
    #[arg(long)]
    pub from: Option<String>,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,

    #[arg(long)]
    pub confirm_password: String,

    #[arg(long)]
    pub phone: String,

    #[arg(long)]
    pub city: String,

    /// donor or recipient
    #[arg(long, value_parser = parse_snake::<UserKind>, default_value = "donor")]
    pub kind: UserKind,

    #[arg(long)]
    pub accept_terms: bool,
}

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// toys, clothing, books, shoes, school, furniture, electronics, other
    #[arg(long, value_parser = parse_snake::<ProductCategory>)]
    pub category: Option<ProductCategory>,

    /// new, like_new, good, fair, needs_repair
    #[arg(long, value_parser = parse_snake::<ProductCondition>)]
    pub condition: Option<ProductCondition>,

    /// Match name or description
    #[arg(long)]
    pub search: Option<String>,

    /// newest, oldest, urgent or best_condition
    #[arg(long, value_parser = parse_snake::<SortOrder>, default_value = "newest")]
    pub sort: SortOrder,

    /// Only urgent, published listings
    #[arg(long, conflicts_with = "recent")]
    pub urgent: bool,

    /// The latest published listings
    #[arg(long)]
    pub recent: bool,

    /// Print catalog statistics as well
    #[arg(long)]
    pub stats: bool,
}

/// Parse a value using its serde `snake_case` spelling
fn parse_snake<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, String> {
    let normalized = raw.trim().to_lowercase().replace('-', "_");
    serde_json::from_value(Value::String(normalized))
        .map_err(|_| format!("unrecognized value '{}'", raw))
}
