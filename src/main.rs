//! Teaming Admin - command line admin console
//!
//! Sign in as a Teaming administrator, look at the dashboard, browse users and
//! teams, and manage gifticons.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use teaming_admin::app::{guard, GifticonPage, Guard, Route};
use teaming_admin::services::{filter_teams, filter_users, GifticonForm};
use teaming_admin::tools::gifticon::{is_expired, GifticonFilters, SortField, SortOptions, SortOrder};
use teaming_admin::{Client, Config, Grade, LoginRequest};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const PASSWORD_ENV: &str = "TEAMING_ADMIN_PASSWORD";

#[derive(Parser)]
#[command(name = "teaming-admin")]
#[command(about = "Admin console for the Teaming service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Override the backend base URL
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with an administrator account
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Password (read from TEAMING_ADMIN_PASSWORD or stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Sign out and clear stored credentials
    Logout,

    /// Show current authentication status
    Status,

    /// Show the signed-in administrator
    Whoami,

    /// Show dashboard statistics
    Dashboard,

    /// List teams
    Teams {
        /// Only teams whose name or description contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// List member accounts
    Users {
        /// Only users whose name or email contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Manage gifticons
    Gifticons {
        #[command(subcommand)]
        action: GifticonCommand,
    },

    /// Show or change admin settings
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
}

#[derive(Subcommand)]
enum GifticonCommand {
    /// List gifticons
    List {
        /// Only expired (true) or unexpired (false) gifticons
        #[arg(long)]
        expired: Option<bool>,

        /// Only gifticons of this grade
        #[arg(long)]
        grade: Option<Grade>,

        /// Only sent (true) or unsent (false) gifticons
        #[arg(long)]
        sent: Option<bool>,

        /// Only used (true) or unused (false) gifticons
        #[arg(long)]
        used: Option<bool>,

        /// Sort key
        #[arg(long, value_enum, default_value_t = SortKey::Id)]
        sort: SortKey,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Save a new gifticon
    Add {
        /// Gifticon code
        code: String,

        /// Expiration date (YYYY-MM-DD)
        #[arg(short, long)]
        expires: String,

        /// Grade: BASIC, STANDARD or ELITE
        #[arg(short, long, default_value = "BASIC")]
        grade: Grade,
    },

    /// Delete gifticons by id
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Delete every expired gifticon that was never sent
    PurgeExpired,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print all settings
    Show,

    /// Change one setting, e.g. `system.theme dark`
    Set { path: String, value: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortKey {
    Id,
    Expiration,
}

impl From<SortKey> for SortField {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::Id => SortField::Id,
            SortKey::Expiration => SortField::ExpirationDate,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }

    match cli.command {
        Commands::Settings { action } => settings(&mut config, action),
        command => {
            let client = Client::from_config(&config).context("Failed to create client")?;
            run(&client, command).await
        }
    }
}

async fn run(client: &Arc<Client>, command: Commands) -> Result<()> {
    let session = client.session();

    match command {
        Commands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            tracing::info!("Signing in...");
            session.login(&LoginRequest { email, password }).await?;
            if let Some(user) = session.session().user {
                println!("Signed in as {} <{}>", user.name, user.email);
            }
            return Ok(());
        }
        Commands::Logout => {
            tracing::info!("Signing out...");
            session.logout().await;
            println!("Signed out.");
            return Ok(());
        }
        Commands::Status => {
            let state = session.initialize().await;
            match state.user {
                Some(user) if state.is_authenticated => {
                    println!("Signed in as {} <{}>", user.name, user.email)
                }
                _ => println!("Not signed in."),
            }
            println!("Backend: {}", client.base_url());
            return Ok(());
        }
        _ => {}
    }

    let state = session.initialize().await;
    match guard(&state, route_of(&command)) {
        Guard::Allow(_) => {}
        Guard::Loading => bail!("Session is still loading"),
        Guard::Redirect(_) => bail!("Not signed in. Run `teaming-admin login` first."),
    }

    match command {
        Commands::Whoami => {
            let user = state.user.context("No user in session")?;
            println!("ID:    {}", user.id);
            println!("Name:  {}", user.name);
            println!("Email: {}", user.email);
        }
        Commands::Dashboard => {
            let stats = client.stats().dashboard().await?;
            println!("Total users:          {}", stats.total_users);
            println!("Total teams:          {}", stats.total_teams);
            println!("Active users:         {}", stats.active_users);
            println!("New users this month: {}", stats.new_users_this_month);
        }
        Commands::Teams { search } => {
            let teams = client.teams().list().await?;
            let teams = filter_teams(&teams, search.as_deref().unwrap_or_default());
            for team in &teams {
                println!(
                    "{:<10} {:<24} {:>3} members  {}",
                    team.id,
                    team.name,
                    team.members.len(),
                    team.description
                );
            }
            println!("{} team(s)", teams.len());
        }
        Commands::Users { search } => {
            let users = client.users().list().await?;
            let users = filter_users(&users, search.as_deref().unwrap_or_default());
            for user in &users {
                println!(
                    "{:<10} {:<20} {:<32} {:?}",
                    user.id, user.name, user.email, user.role
                );
            }
            println!("{} user(s)", users.len());
        }
        Commands::Gifticons { action } => gifticons(client, action).await?,
        // handled before the guard
        Commands::Login { .. } | Commands::Logout | Commands::Status | Commands::Settings { .. } => {}
    }

    Ok(())
}

async fn gifticons(client: &Arc<Client>, action: GifticonCommand) -> Result<()> {
    let mut page = GifticonPage::new(client.gifticons());

    match action {
        GifticonCommand::List {
            expired,
            grade,
            sent,
            used,
            sort,
            desc,
        } => {
            page.set_filters(GifticonFilters {
                is_expired: expired,
                grade,
                is_sent: sent,
                is_used: used,
            });
            let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
            page.set_sort(SortOptions::new(sort.into(), order));
            page.load().await?;

            let visible = page.visible();
            for g in &visible {
                println!(
                    "{:>6}  {:<20} {:<9} {}  {:<4} {:<4}{}",
                    g.id,
                    g.code,
                    g.grade.as_str(),
                    g.expiration_date.format("%Y-%m-%d"),
                    if g.is_sent { "sent" } else { "-" },
                    if g.is_used { "used" } else { "-" },
                    if is_expired(g) { "  expired" } else { "" },
                );
            }
            println!(
                "{} of {} gifticon(s), {} expired and deletable",
                visible.len(),
                page.gifticons().len(),
                page.deletable_expired_count()
            );
        }
        GifticonCommand::Add {
            code,
            expires,
            grade,
        } => {
            let message = page.save(&GifticonForm::new(code, expires, grade)).await?;
            println!("{}", if message.is_empty() { "Gifticon saved." } else { message.as_str() });
        }
        GifticonCommand::Delete { ids } => {
            page.load().await?;
            for id in ids {
                page.delete_one(id).await?;
                println!("Deleted gifticon {}", id);
            }
        }
        GifticonCommand::PurgeExpired => {
            page.load().await?;
            let count = page.delete_expired().await?;
            println!("Deleted {} expired gifticon(s).", count);
        }
    }

    Ok(())
}

fn settings(config: &mut Config, action: SettingsCommand) -> Result<()> {
    match action {
        SettingsCommand::Show => print!("{}", config.settings),
        SettingsCommand::Set { path, value } => {
            config.settings.set(&path, &value)?;
            config.save().context("Failed to save configuration")?;
            println!("{} = {}", path, config.settings.get(&path)?);
        }
    }
    Ok(())
}

fn route_of(command: &Commands) -> Route {
    match command {
        Commands::Login { .. } => Route::Login,
        Commands::Dashboard | Commands::Whoami | Commands::Status | Commands::Logout => {
            Route::Dashboard
        }
        Commands::Teams { .. } => Route::Teams,
        Commands::Users { .. } => Route::Users,
        Commands::Gifticons { .. } => Route::Gifticon,
        Commands::Settings { .. } => Route::Settings,
    }
}

fn read_password() -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }

    print!("Password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("Password is required");
    }
    Ok(password)
}
