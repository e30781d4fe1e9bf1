mod cli;
mod config;
mod db;
mod models;
mod prayer_times;
mod reminders;
mod storage;
mod timeline;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use prayer_times::{AladhanClient, CachedSource};
use reminders::{DesktopAlert, DispatchSettings, Dispatcher, ReminderQueue, ReminderScheduler};
use storage::{load_city, load_preferences};
use tui::app::Services;
use utils::clock;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;
    if !AppConfig::config_path()?.exists() {
        if let Err(e) = config.save() {
            log::warn!("could not write default config: {:#}", e);
        }
    }

    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = db::open(&db_path)?;

    let city = load_city(&conn, &config.location.city());
    let client = AladhanClient::new(&config.api).context("Building HTTP client")?;
    let source = CachedSource::new(client, db::open(&db_path)?);
    let mut scheduler = ReminderScheduler::new(ReminderQueue::open(&db_path)?);

    match cli.command {
        Some(Commands::Times) => {
            let prefs = load_preferences(&conn);
            handlers::handle_times(&source, &mut scheduler, &city, &prefs)?;
        }
        Some(Commands::City { name }) => {
            handlers::handle_city(&conn, &source, &mut scheduler, &city, name.as_deref())?;
        }
        Some(Commands::Cities { query }) => {
            handlers::handle_cities(query.as_deref())?;
        }
        Some(Commands::Notify { action }) => {
            handlers::handle_notify(&conn, &source, &mut scheduler, &city, &action)?;
        }
        Some(Commands::Reminders) => {
            handlers::handle_reminders(scheduler.notifier())?;
        }
        Some(Commands::Deliver { once }) => {
            handlers::handle_deliver(&conn, &config, once)?;
        }

        // No subcommand → launch TUI
        None => {
            let initial = source.cached(&city, clock::now().date());
            let dispatcher = Dispatcher::spawn(
                db::open(&db_path)?,
                DesktopAlert::new(&config.notifications.app_name),
                DispatchSettings::from_config(&config.notifications),
            );
            let services = Services {
                store: conn,
                source: Arc::new(source),
                scheduler,
                dispatcher: Some(dispatcher),
            };
            tui::app::run(services, city, initial, config.refresh.period())?;
        }
    }

    Ok(())
}
