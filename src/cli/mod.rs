//! CLI module for the HangOut dashboard client.
//!
//! Provides subcommands that drive the backend through [`ApiClient`]:
//! - `login` / `logout` / `whoami` - Manage the persisted session
//! - `businesses`, `categories`, `users` - Admin screens
//! - `events`, `vouchers` - Business owner screens
//! - `reviews list` - Reviews for a business
//! - `geocode <query>` - Address search
//! - `config check` - Validate configuration file

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::businesses::BusinessQuery;
use crate::api::models::{CategoryInput, VoucherInput};
use crate::api::reviews::ReviewQuery;
use crate::api::{ApiClient, PageNumberQuery, PageQuery};
use crate::config::Config;
use crate::geocoding::{format_coordinate, AddressSearch, NominatimClient, SearchOutcome};
use crate::guard::{Navigation, Navigator, RouteTable};
use crate::session::{FileStorage, Role, SessionStore};

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "hangout")]
#[command(author, version, about = "Admin and business owner client for HangOut", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "hangout.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Backend origin, overrides `api.base_url` from the config file
    #[arg(long, env = "HANGOUT_API_BASE_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session
    Login {
        /// Email or phone number
        identifier: String,
        #[arg(long, env = "HANGOUT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Clear the stored session
    Logout,

    /// Show the stored session
    Whoami,

    /// Business management commands
    #[command(subcommand)]
    Businesses(BusinessesCommands),

    /// Category management commands
    #[command(subcommand)]
    Categories(CategoriesCommands),

    /// User management commands
    #[command(subcommand)]
    Users(UsersCommands),

    /// Event commands for business owners
    #[command(subcommand)]
    Events(EventsCommands),

    /// Voucher commands for business owners
    #[command(subcommand)]
    Vouchers(VouchersCommands),

    /// Review commands
    #[command(subcommand)]
    Reviews(ReviewsCommands),

    /// Search for an address
    Geocode {
        query: String,
    },

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum BusinessesCommands {
    /// List businesses
    List {
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "10")]
        size: u32,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        province: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// List businesses owned by the signed-in owner
    Mine {
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "10")]
        size: u32,
    },
    /// Show details for a business
    Show { id: String },
    /// Delete a business
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum CategoriesCommands {
    List {
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "30")]
        size: u32,
    },
    Create {
        name: String,
        #[arg(long)]
        image: Option<String>,
    },
    Update {
        id: String,
        name: String,
        #[arg(long)]
        image: Option<String>,
    },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum UsersCommands {
    List {
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "10")]
        size: u32,
    },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum EventsCommands {
    List {
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "10")]
        size: u32,
    },
    Show { id: String },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum VouchersCommands {
    List {
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "10")]
        size: u32,
        /// Only show active vouchers
        #[arg(long)]
        active: bool,
    },
    Create {
        name: String,
        /// Discount percentage (0-100)
        #[arg(long)]
        percent: f64,
        /// Start, as YYYY-MM-DD or RFC 3339
        #[arg(long)]
        valid_from: String,
        /// End, as YYYY-MM-DD or RFC 3339
        #[arg(long)]
        valid_to: String,
        #[arg(long)]
        quantity: i64,
    },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ReviewsCommands {
    List {
        /// Business ID to filter by
        #[arg(long)]
        business: Option<String>,
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "10")]
        size: u32,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

/// Everything a command handler needs
struct Dashboard {
    config: Config,
    session: SessionStore,
    client: ApiClient,
}

impl Dashboard {
    fn load(cli: &Cli) -> Result<Self> {
        let mut config = Config::load(&cli.config)?;
        if let Some(url) = &cli.api_url {
            config.api.base_url = url.clone();
        }

        let session = SessionStore::new(Arc::new(FileStorage::new(config.session.path.clone())));
        let client = ApiClient::new(&config.api, session.clone())
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            session,
            client,
        })
    }

    /// Check the guard of the dashboard screen a command belongs to
    fn require_screen(&self, path: &str) -> Result<()> {
        let mut navigator = Navigator::new(RouteTable::dashboard(), self.session.clone());
        match navigator.navigate(path) {
            Navigation::Render { .. } => Ok(()),
            Navigation::Redirect { .. } => anyhow::bail!(
                "Access denied. Log in with an account allowed to open {}.",
                path
            ),
            Navigation::NotFound => anyhow::bail!("Unknown dashboard path {}", path),
        }
    }
}

/// Run a CLI command
pub async fn run_command(cli: &Cli) -> Result<()> {
    if let Commands::Config(ConfigCommands::Check) = &cli.command {
        return cmd_config_check(cli);
    }

    let ctx = Dashboard::load(cli)?;
    match &cli.command {
        Commands::Login {
            identifier,
            password,
        } => cmd_login(&ctx, identifier, password).await,
        Commands::Logout => {
            ctx.client.logout();
            println!("Logged out.");
            Ok(())
        }
        Commands::Whoami => cmd_whoami(&ctx),
        Commands::Businesses(cmd) => cmd_businesses(&ctx, cmd).await,
        Commands::Categories(cmd) => cmd_categories(&ctx, cmd).await,
        Commands::Users(cmd) => cmd_users(&ctx, cmd).await,
        Commands::Events(cmd) => cmd_events(&ctx, cmd).await,
        Commands::Vouchers(cmd) => cmd_vouchers(&ctx, cmd).await,
        Commands::Reviews(ReviewsCommands::List {
            business,
            page,
            size,
        }) => cmd_reviews(&ctx, business.clone(), *page, *size).await,
        Commands::Geocode { query } => cmd_geocode(&ctx, query).await,
        Commands::Config(ConfigCommands::Check) => Ok(()),
    }
}

async fn cmd_login(ctx: &Dashboard, identifier: &str, password: &str) -> Result<()> {
    println!("Connecting to {}...", ctx.client.base_url());
    let role = ctx
        .client
        .login(identifier, password)
        .await
        .context("Login failed")?;

    println!();
    println!("[OK] Logged in as {}", role);
    println!("Landing page: {}", role.landing_path());
    println!();
    Ok(())
}

fn cmd_whoami(ctx: &Dashboard) -> Result<()> {
    match (ctx.session.token(), ctx.session.role()) {
        (Some(_), Some(role)) => {
            let known = Role::parse(&role)
                .map(|r| r.landing_path().to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("Role:         {}", role);
            println!("Landing page: {}", known);
            println!("Session file: {}", ctx.config.session.path.display());
        }
        _ => println!("Not logged in."),
    }
    Ok(())
}

async fn cmd_businesses(ctx: &Dashboard, cmd: &BusinessesCommands) -> Result<()> {
    match cmd {
        BusinessesCommands::List {
            page,
            size,
            category,
            province,
            name,
        } => {
            let query = BusinessQuery {
                page_number: *page,
                page_size: *size,
                category: category.clone(),
                province: province.clone(),
                business_name: name.clone(),
            };
            let feed = ctx.client.list_businesses(&query).await?;

            let hot = feed.hot_businesses();
            if !hot.is_empty() {
                println!();
                println!("Hot:");
                for business in hot {
                    println!("  {} ({} likes)", business.display_name(), business.total_like);
                }
            }

            let businesses = feed.businesses();
            if businesses.is_empty() {
                println!("No businesses found.");
                return Ok(());
            }

            println!();
            println!("{:<36}  {:<28}  {:<16}  {:<20}", "ID", "NAME", "PROVINCE", "CATEGORY");
            println!("{}", "-".repeat(106));
            for business in businesses {
                println!(
                    "{:<36}  {:<28}  {:<16}  {:<20}",
                    business.id,
                    truncate(business.display_name(), 28),
                    truncate(business.province.as_deref().unwrap_or("-"), 16),
                    truncate(business.category_name.as_deref().unwrap_or("-"), 20)
                );
            }
            println!();
        }
        BusinessesCommands::Mine { page, size } => {
            ctx.require_screen("/business-dashboard/business-owner-list")?;
            let page = ctx
                .client
                .list_owner_businesses(PageNumberQuery::new(*page, *size))
                .await?;

            if page.items.is_empty() {
                println!("No businesses found.");
                return Ok(());
            }
            println!();
            println!("{:<36}  {:<28}  {:<20}", "ID", "NAME", "OPENING HOURS");
            println!("{}", "-".repeat(88));
            for business in &page.items {
                println!(
                    "{:<36}  {:<28}  {:<20}",
                    business.id,
                    truncate(business.display_name(), 28),
                    business.opening_hours.as_deref().unwrap_or("-")
                );
            }
            println!();
            println!("Total: {}", page.total.unwrap_or(page.items.len() as u64));
        }
        BusinessesCommands::Show { id } => {
            let business = ctx.client.business_detail(id).await?;

            println!();
            println!("=== Business: {} ===", business.name.as_deref().unwrap_or("-"));
            println!();
            println!("ID:          {}", business.id);
            println!("Category:    {}", business.category.as_deref().unwrap_or("-"));
            println!("Address:     {}", business.address.as_deref().unwrap_or("-"));
            println!("Province:    {}", business.province.as_deref().unwrap_or("-"));
            if let (Some(lat), Some(lng)) = (business.latitude, business.longitude) {
                println!("Location:    {}, {}", format_coordinate(lat), format_coordinate(lng));
            }
            println!("Hours:       {}", business.opening_hours.as_deref().unwrap_or("-"));
            println!(
                "Days:        {} - {}",
                business.start_day.as_deref().unwrap_or("-"),
                business.end_day.as_deref().unwrap_or("-")
            );
            println!("Likes:       {}", business.total_like);
            if let Some(vibe) = &business.vibe {
                println!("Vibe:        {}", vibe);
            }
            if !business.images.is_empty() {
                println!("Images:      {}", business.images.len());
            }
            if !business.events.is_empty() {
                println!();
                println!("Events:");
                for event in &business.events {
                    println!("  - {}", event.name);
                }
            }
            println!();
        }
        BusinessesCommands::Delete { id } => {
            ctx.require_screen("/business")?;
            ctx.client.delete_business(id).await?;
            println!("[OK] Business {} deleted", id);
        }
    }
    Ok(())
}

async fn cmd_categories(ctx: &Dashboard, cmd: &CategoriesCommands) -> Result<()> {
    match cmd {
        CategoriesCommands::List { page, size } => {
            let page = ctx.client.list_categories(&PageQuery::new(*page, *size)).await?;
            if page.items.is_empty() {
                println!("No categories found.");
                return Ok(());
            }
            println!();
            println!("{:<36}  {:<30}", "ID", "NAME");
            println!("{}", "-".repeat(68));
            for category in &page.items {
                println!("{:<36}  {:<30}", category.id, truncate(&category.name, 30));
            }
            println!();
        }
        CategoriesCommands::Create { name, image } => {
            ctx.require_screen("/")?;
            let input = CategoryInput {
                name: name.clone(),
                image: image.clone(),
            };
            ctx.client.create_category(&input).await?;
            println!("[OK] Category {} created", name);
        }
        CategoriesCommands::Update { id, name, image } => {
            ctx.require_screen("/")?;
            let input = CategoryInput {
                name: name.clone(),
                image: image.clone(),
            };
            ctx.client.update_category(id, &input).await?;
            println!("[OK] Category {} updated", id);
        }
        CategoriesCommands::Delete { id } => {
            ctx.require_screen("/")?;
            ctx.client.delete_category(id).await?;
            println!("[OK] Category {} deleted", id);
        }
    }
    Ok(())
}

async fn cmd_users(ctx: &Dashboard, cmd: &UsersCommands) -> Result<()> {
    ctx.require_screen("/listusers")?;
    match cmd {
        UsersCommands::List { page, size } => {
            let page = ctx.client.list_users(&PageQuery::new(*page, *size)).await?;
            if page.items.is_empty() {
                println!("No users found.");
                return Ok(());
            }
            println!();
            println!("{:<36}  {:<24}  {:<30}  {:<14}", "ID", "NAME", "EMAIL", "PHONE");
            println!("{}", "-".repeat(110));
            for user in &page.items {
                println!(
                    "{:<36}  {:<24}  {:<30}  {:<14}",
                    user.user_id,
                    truncate(user.name.as_deref().unwrap_or("-"), 24),
                    truncate(user.email.as_deref().unwrap_or("-"), 30),
                    user.phone.as_deref().unwrap_or("-")
                );
            }
            println!();
            println!("Total: {}", page.total.unwrap_or(page.items.len() as u64));
        }
        UsersCommands::Delete { id } => {
            ctx.client.delete_user(id).await?;
            println!("[OK] User {} removed", id);
        }
    }
    Ok(())
}

async fn cmd_events(ctx: &Dashboard, cmd: &EventsCommands) -> Result<()> {
    match cmd {
        EventsCommands::List { page, size } => {
            ctx.require_screen("/business-dashboard")?;
            let page = ctx.client.list_my_events(&PageQuery::new(*page, *size)).await?;
            if page.items.is_empty() {
                println!("No events found.");
                return Ok(());
            }
            println!();
            println!("{:<36}  {:<28}  {:<12}  {:<12}", "ID", "NAME", "START", "DUE");
            println!("{}", "-".repeat(94));
            for event in &page.items {
                println!(
                    "{:<36}  {:<28}  {:<12}  {:<12}",
                    event.identifier().unwrap_or("-"),
                    truncate(&event.name, 28),
                    format_date(event.start_date),
                    format_date(event.due_date)
                );
            }
            println!();
        }
        EventsCommands::Show { id } => {
            let event = ctx.client.event(id).await?;
            println!();
            println!("=== Event: {} ===", event.name);
            println!();
            println!("ID:          {}", event.identifier().unwrap_or("-"));
            println!("Location:    {}", event.location.as_deref().unwrap_or("-"));
            println!("Start:       {}", format_date(event.start_date));
            println!("Due:         {}", format_date(event.due_date));
            if let Some(description) = &event.description {
                println!("Description: {}", description);
            }
            println!();
        }
        EventsCommands::Delete { id } => {
            ctx.require_screen("/business-dashboard")?;
            ctx.client.delete_event(id).await?;
            println!("[OK] Event {} deleted", id);
        }
    }
    Ok(())
}

async fn cmd_vouchers(ctx: &Dashboard, cmd: &VouchersCommands) -> Result<()> {
    ctx.require_screen("/business-dashboard")?;
    match cmd {
        VouchersCommands::List { page, size, active } => {
            let page = ctx
                .client
                .list_vouchers(PageNumberQuery::new(*page, *size))
                .await?;
            let vouchers = if *active {
                page.active()
            } else {
                page.items.iter().collect()
            };
            if vouchers.is_empty() {
                println!("No vouchers found.");
                return Ok(());
            }
            println!();
            println!(
                "{:<36}  {:<20}  {:>7}  {:<12}  {:<12}  {:>8}",
                "ID", "NAME", "PERCENT", "FROM", "TO", "QUANTITY"
            );
            println!("{}", "-".repeat(104));
            for voucher in vouchers {
                println!(
                    "{:<36}  {:<20}  {:>6}%  {:<12}  {:<12}  {:>8}",
                    voucher.id,
                    truncate(&voucher.name, 20),
                    voucher.percent,
                    voucher.valid_from.format("%Y-%m-%d"),
                    voucher.valid_to.format("%Y-%m-%d"),
                    voucher.quantity
                );
            }
            println!();
        }
        VouchersCommands::Create {
            name,
            percent,
            valid_from,
            valid_to,
            quantity,
        } => {
            let input = VoucherInput {
                name: name.clone(),
                percent: *percent,
                valid_from: parse_date_arg(valid_from)?,
                valid_to: parse_date_arg(valid_to)?,
                quantity: *quantity,
            };
            ctx.client.create_voucher(&input).await?;
            println!("[OK] Voucher {} created", name);
        }
        VouchersCommands::Delete { id } => {
            ctx.client.delete_voucher(id).await?;
            println!("[OK] Voucher {} deleted", id);
        }
    }
    Ok(())
}

async fn cmd_reviews(ctx: &Dashboard, business: Option<String>, page: u32, size: u32) -> Result<()> {
    let query = ReviewQuery {
        page: PageQuery::new(page, size),
        business_id: business,
    };
    let page = ctx.client.list_reviews(&query).await?;

    if page.items.is_empty() {
        println!("No reviews found.");
        return Ok(());
    }
    println!();
    for review in &page.items {
        let author = review
            .user
            .as_ref()
            .and_then(|u| u.name.as_deref())
            .unwrap_or("Anonymous");
        let rating = review
            .rating
            .map(|r| format!("{:.1}", r))
            .unwrap_or_else(|| "-".to_string());
        println!("[{}] {}: {}", rating, author, review.content.as_deref().unwrap_or(""));
    }
    println!();
    println!("Page {} of {} ({} reviews)", query.page.page, page.total_pages, page.total);
    Ok(())
}

async fn cmd_geocode(ctx: &Dashboard, query: &str) -> Result<()> {
    let geocoder = NominatimClient::new(&ctx.config.geocoding)?;
    let search = AddressSearch::new(Arc::new(geocoder), &ctx.config.geocoding);

    match search.search(query).await? {
        SearchOutcome::Suggestions(places) if places.is_empty() => println!("No places found."),
        SearchOutcome::Suggestions(places) => {
            println!();
            for place in places {
                let marker = if place.is_selectable() { "   " } else { "[!]" };
                println!(
                    "{} {}, {}  {}",
                    marker,
                    format_coordinate(place.lat),
                    format_coordinate(place.lon),
                    place.label()
                );
            }
            println!();
        }
        SearchOutcome::TooShort => println!(
            "Query too short, type at least {} characters.",
            ctx.config.geocoding.min_query_len
        ),
        SearchOutcome::Superseded | SearchOutcome::Cancelled => println!("Search cancelled."),
    }
    Ok(())
}

fn cmd_config_check(cli: &Cli) -> Result<()> {
    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!("[!!] Configuration file not found: {}", config_path.display());
        println!();
        println!("Built-in defaults will be used.");
        return Ok(());
    }

    match Config::load(config_path) {
        Ok(config) => {
            println!("[OK] Configuration file is valid!");
            println!();
            println!("=== Configuration Summary ===");
            println!();
            println!("API:");
            println!("  Base URL:     {}", config.api.base_url);
            println!("  Timeout:      {}s", config.api.timeout_secs);
            println!();
            println!("Session:");
            println!("  File:         {}", config.session.path.display());
            println!();
            println!("Geocoding:");
            println!("  Search URL:   {}", config.geocoding.search_url);
            println!("  Countries:    {}", config.geocoding.country_codes);
            println!("  Debounce:     {}ms", config.geocoding.debounce_ms);
            println!();
            println!("Logging:");
            println!("  Level:        {}", config.logging.level);
            println!();
            Ok(())
        }
        Err(e) => {
            println!("[!!] Configuration file is invalid!");
            println!();
            println!("Error: {:#}", e);
            anyhow::bail!("Invalid configuration")
        }
    }
}

/// `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp
fn parse_date_arg(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid date: {} (expected YYYY-MM-DD or RFC 3339)", value))
}

fn format_date(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Truncate to `max_len` characters, ending with "..."
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("Cafe", 10), "Cafe");
        assert_eq!(truncate("Quán Cà Phê Sân Thượng", 10), "Quán Cà...");
    }

    #[test]
    fn test_parse_date_arg() {
        assert_eq!(
            parse_date_arg("2026-06-01").unwrap(),
            Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_date_arg("2026-06-01T12:30:00+07:00").unwrap(),
            Utc.with_ymd_and_hms(2026, 6, 1, 5, 30, 0).unwrap()
        );
        assert!(parse_date_arg("01/06/2026").is_err());
    }

    #[test]
    fn test_cli_parses_voucher_create() {
        let cli = Cli::try_parse_from([
            "hangout",
            "vouchers",
            "create",
            "SUMMER50",
            "--percent",
            "50",
            "--valid-from",
            "2026-06-01",
            "--valid-to",
            "2026-06-30",
            "--quantity",
            "10",
        ])
        .unwrap();

        match cli.command {
            Commands::Vouchers(VouchersCommands::Create { name, percent, .. }) => {
                assert_eq!(name, "SUMMER50");
                assert_eq!(percent, 50.0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_require_screen_uses_stored_role() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("hangout.toml");
        std::fs::write(
            &config_path,
            format!(
                "[session]\npath = {:?}\n",
                dir.path().join("session.json").display().to_string()
            ),
        )
        .unwrap();

        let cli = Cli::try_parse_from(["hangout", "--config", config_path.to_str().unwrap(), "whoami"])
            .unwrap();
        let ctx = Dashboard::load(&cli).unwrap();

        assert!(ctx.require_screen("/listusers").is_err());
        ctx.session.set_session("tok", "BusinessOwner");
        assert!(ctx.require_screen("/business-dashboard").is_ok());
        assert!(ctx.require_screen("/listusers").is_err());

        // A fresh context reads the same file
        let again = Dashboard::load(&cli).unwrap();
        assert_eq!(again.session.role().as_deref(), Some("BusinessOwner"));
    }
}
