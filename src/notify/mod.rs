//! The notification dispatcher: one `tick` invocation detects due slot
//! boundaries and alerts, persists the
//! idempotence timestamp before attempting delivery, and retries the
//! whole tick on a transient "database busy" signal.

pub mod tray_client;

use std::thread;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::warn;

use crate::error::AppResult;
use crate::models::{Alert, SlotStatus};
use crate::notify::tray_client::NotificationSender;
use crate::store::{NotificationBoundary, StorageProvider};
use crate::time::MinuteOfDay;

const MAX_BUSY_RETRIES: u32 = 3;
const BUSY_RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

/// Runs one notification tick, retrying the whole thing up to three
/// times with linear back-off if a store call reports the database as
/// busy.
pub fn tick(
    store: &dyn StorageProvider,
    tray: &dyn NotificationSender,
    today: NaiveDate,
    now_minute: MinuteOfDay,
    now: DateTime<Utc>,
    dry_run: bool,
) -> AppResult<()> {
    let mut attempt = 1;
    loop {
        match tick_once(store, tray, today, now_minute, now, dry_run) {
            Ok(()) => return Ok(()),
            Err(err) if err.is_busy() && attempt < MAX_BUSY_RETRIES => {
                thread::sleep(BUSY_RETRY_BASE_DELAY * attempt);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

fn tick_once(
    store: &dyn StorageProvider,
    tray: &dyn NotificationSender,
    today: NaiveDate,
    now_minute: MinuteOfDay,
    now: DateTime<Utc>,
    dry_run: bool,
) -> AppResult<()> {
    let settings = store.get_settings()?;
    if !settings.notifications_enabled {
        return Ok(());
    }

    if let Some(plan) = store.get_latest_plan_revision(today)? {
        for slot in &plan.slots {
            if !matches!(slot.status, SlotStatus::Accepted | SlotStatus::Done) {
                continue;
            }

            let boundaries = [
                (
                    NotificationBoundary::Start,
                    settings.notify_block_start,
                    settings.block_start_offset_min,
                    slot.last_notified_start.is_some(),
                    slot.start,
                ),
                (
                    NotificationBoundary::End,
                    settings.notify_block_end,
                    settings.block_end_offset_min,
                    slot.last_notified_end.is_some(),
                    slot.end,
                ),
            ];

            for (boundary, enabled, offset_min, already_sent, boundary_minute) in boundaries {
                if !enabled || already_sent {
                    continue;
                }
                let trigger = boundary_minute - offset_min as i32;
                if now_minute < trigger {
                    continue;
                }
                let lateness = now_minute - trigger;
                if lateness > settings.notification_grace_period_min as i32 {
                    continue;
                }
                if dry_run {
                    continue;
                }

                store.update_notification_timestamp(
                    today,
                    plan.revision,
                    slot.start,
                    &slot.task_id,
                    boundary,
                    now,
                )?;

                let label = match boundary {
                    NotificationBoundary::Start => "starting",
                    NotificationBoundary::End => "ending",
                };
                let message = format!("{} is {label} now", slot.task_id);
                if let Err(err) = tray.send(&message) {
                    warn!(target: "daylit::notify", error = %err, "slot notification delivery failed");
                }
            }
        }
    }

    for alert in store.list_alerts()? {
        deliver_alert_if_due(store, tray, &alert, today, now_minute, now, settings.notification_grace_period_min, dry_run)?;
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn deliver_alert_if_due(
    store: &dyn StorageProvider,
    tray: &dyn NotificationSender,
    alert: &Alert,
    today: NaiveDate,
    now_minute: MinuteOfDay,
    now: DateTime<Utc>,
    grace_period_min: u32,
    dry_run: bool,
) -> AppResult<()> {
    if !alert.active || !alert.schedule.is_due_on(today) {
        return Ok(());
    }
    if alert.last_sent_on(today) {
        return Ok(());
    }
    if now_minute < alert.time {
        return Ok(());
    }
    let lateness = now_minute - alert.time;
    if lateness > grace_period_min as i32 {
        return Ok(());
    }
    if dry_run {
        return Ok(());
    }

    let mut sent = alert.clone();
    sent.last_sent = Some(now);
    store.update_alert(&sent)?;

    if let Err(err) = tray.send(&alert.message) {
        warn!(target: "daylit::notify", error = %err, "alert delivery failed");
    }

    if sent.schedule.is_one_shot() {
        let mut deactivated = sent.clone();
        deactivated.active = false;
        if let Err(err) = store.update_alert(&deactivated) {
            warn!(target: "daylit::notify", error = %err, "failed to deactivate one-shot alert");
        }
    }

    Ok(())
}
