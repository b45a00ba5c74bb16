//! `watch`: run the polling coordinator and print every update.

use std::time::Duration;

use chrono::Local;

use ecovacs_core::Coordinator;

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::devices;

pub async fn handle(
    coordinator: &Coordinator,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let interval = match args.interval {
        Some(0) => {
            return Err(CliError::Validation {
                field: "interval".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        Some(secs) => Duration::from_secs(secs),
        None => coordinator.config().scan_interval,
    };

    let mut rx = coordinator.subscribe();
    let started_at = rx.borrow().refreshes;
    let handle = coordinator.spawn(interval);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = rx.borrow_and_update().clone();
                if snap.last_update_success {
                    if !global.quiet {
                        eprintln!("── {} ──", Local::now().format("%H:%M:%S"));
                    }
                    let out = devices::render_devices(global, &snap.devices)?;
                    output::print_output(&out, global.quiet);
                } else if let Some(err) = snap.last_error {
                    // Auth failures need a new key from the user.
                    if err.is_auth() {
                        coordinator.shutdown();
                        return Err(err.into());
                    }
                    eprintln!("refresh failed: {err}");
                }

                // Merged updates still count; only the latest one is printed.
                let seen = snap.refreshes.saturating_sub(started_at);
                if args.count.is_some_and(|n| seen >= n) {
                    break;
                }
            }
        }
    }

    coordinator.shutdown();
    let _ = handle.await;
    Ok(())
}
