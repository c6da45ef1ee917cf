//! Command handlers. One module per verb group, each taking a shared
//! `AppContext` and the matching `cli::*Command` variant. Every
//! operation here is synchronous.

pub mod admin;
pub mod feedback;
pub mod peripherals;
pub mod plans;
pub mod tasks;

use std::path::PathBuf;

use tracing::info;

use crate::backup::BackupManager;
use crate::config::{Backend, Config};
use crate::error::AppResult;
use crate::notify::tray_client::{NotificationSender, TrayClient};
use crate::store::postgres::PostgresStore;
use crate::store::sqlite::SqliteStore;
use crate::store::StorageProvider;
use crate::cli::{Cli, Command};

pub struct AppContext {
    pub store: Box<dyn StorageProvider>,
    pub tray: Box<dyn NotificationSender>,
    pub backup: Option<BackupManager>,
}

impl AppContext {
    pub fn new(config: &Config, config_dir: PathBuf) -> AppResult<Self> {
        let (store, backup): (Box<dyn StorageProvider>, Option<BackupManager>) = match &config.backend {
            Backend::Embedded(path) => {
                let store = SqliteStore::new(path.clone());
                store.init()?;
                (Box::new(store), Some(BackupManager::new(path.clone())))
            }
            Backend::Remote(conn_str) => {
                let store = PostgresStore::connect(conn_str)?;
                store.init()?;
                (Box::new(store), None)
            }
        };

        let tray = TrayClient::new(config_dir);

        Ok(AppContext {
            store,
            tray: Box::new(tray),
            backup,
        })
    }
}

pub fn dispatch(cli: Cli, ctx: &AppContext) -> AppResult<()> {
    match cli.command {
        Command::Init { force, source } => admin::init(ctx, force, source),
        Command::Migrate => admin::migrate(ctx),
        Command::Doctor => admin::doctor(ctx),
        Command::Tui => admin::tui(),
        Command::Plan { date, new_revision } => plans::plan(ctx, &date, new_revision),
        Command::Now => plans::now(ctx),
        Command::Feedback { rating, note } => feedback::feedback(ctx, rating.into(), note),
        Command::Day { date } => plans::day(ctx, &date),
        Command::Debug { command } => admin::debug(ctx, command),
        Command::Validate => admin::validate(ctx),
        Command::Backup { command } => admin::backup(ctx, command),
        Command::Task { command } => tasks::task(ctx, command),
        Command::Plans { command } => plans::plans(ctx, command),
        Command::Restore { command } => admin::restore(ctx, command),
        Command::Habit { command } => peripherals::habit(ctx, command),
        Command::Ot { command } => peripherals::ot(ctx, command),
        Command::Alert { command } => peripherals::alert(ctx, command),
        Command::Keyring { command } => admin::keyring(command),
        Command::Settings {
            list,
            day_start,
            day_end,
            default_block_min,
            timezone,
            notifications_enabled,
            notify_block_start,
            notify_block_end,
            block_start_offset_min,
            block_end_offset_min,
            notification_grace_period_min,
        } => admin::settings(
            ctx,
            list,
            admin::SettingsEdits {
                day_start,
                day_end,
                default_block_min,
                timezone,
                notifications_enabled,
                notify_block_start,
                notify_block_end,
                block_start_offset_min,
                block_end_offset_min,
                notification_grace_period_min,
            },
        ),
        Command::Notify { dry_run } => admin::notify(ctx, dry_run),
    }
}

pub(crate) fn log_ok(action: &str) {
    info!(target: "daylit::cli", action, "command completed");
}
