//! Greenleaf CLI - Database migrations and account management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run account database migrations
//! gl-cli migrate
//!
//! # Create the development superuser
//! gl-cli superuser create -e admin@example.com -p admin
//!
//! # Remove a staff member (demoted instead if they have orders)
//! gl-cli staff remove -e former.staff@example.com
//!
//! # Save an address and make it the default shipping address
//! gl-cli address add -e customer@example.com -t shipping --json '{"city":"Oslo","country":"NO"}'
//! gl-cli address set-default -e customer@example.com -t shipping --id 12
//! ```
//!
//! # Environment Variables
//!
//! See `greenleaf_accounts::config` (`ACCOUNTS_DATABASE_URL` is required).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use greenleaf_core::AddressType;

mod commands;

#[derive(Parser)]
#[command(name = "gl-cli")]
#[command(author, version, about = "Greenleaf account tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run account database migrations
    Migrate,
    /// Bootstrap superusers
    Superuser {
        #[command(subcommand)]
        action: SuperuserAction,
    },
    /// Manage staff accounts
    Staff {
        #[command(subcommand)]
        action: StaffAction,
    },
    /// Manage a user's address book
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Show a user's account summary
    User {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum SuperuserAction {
    /// Create a superuser unless the email is already taken
    Create {
        /// Superuser email address
        #[arg(short, long, default_value = "admin@example.com")]
        email: String,

        /// Superuser password
        #[arg(short, long, default_value = "admin")]
        password: String,
    },
}

#[derive(Subcommand)]
enum StaffAction {
    /// Remove a staff member
    Remove {
        /// Staff email address
        #[arg(short, long)]
        email: String,
    },
    /// Grant a permission to a staff member
    Grant {
        /// Staff email address
        #[arg(short, long)]
        email: String,

        /// Permission codename (e.g. `manage_orders`)
        #[arg(short, long)]
        permission: String,
    },
}

#[derive(Subcommand)]
enum AddressAction {
    /// Store an address in the user's address book
    Add {
        /// User email address
        #[arg(short, long)]
        email: String,

        /// Address type (`billing` or `shipping`)
        #[arg(short = 't', long = "type")]
        address_type: AddressType,

        /// Address fields as a JSON object
        #[arg(long)]
        json: String,
    },
    /// Make an existing address the user's default
    SetDefault {
        /// User email address
        #[arg(short, long)]
        email: String,

        /// Address type (`billing` or `shipping`)
        #[arg(short = 't', long = "type")]
        address_type: AddressType,

        /// Address ID
        #[arg(long)]
        id: i32,
    },
    /// List the user's address book
    List {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Superuser { action } => match action {
            SuperuserAction::Create { email, password } => {
                commands::superuser::create(email, password).await?;
            }
        },
        Commands::Staff { action } => match action {
            StaffAction::Remove { email } => commands::staff::remove(&email).await?,
            StaffAction::Grant { email, permission } => {
                commands::staff::grant(&email, &permission).await?;
            }
        },
        Commands::Address { action } => match action {
            AddressAction::Add {
                email,
                address_type,
                json,
            } => commands::address::add(&email, address_type, &json).await?,
            AddressAction::SetDefault {
                email,
                address_type,
                id,
            } => commands::address::set_default(&email, address_type, id).await?,
            AddressAction::List { email } => commands::address::list(&email).await?,
        },
        Commands::User { email } => commands::user::show(&email).await?,
    }
    Ok(())
}
