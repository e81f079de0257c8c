use serde::Serialize;
use weekfocus_core::Notification;

use super::{open_app, print_json, CmdResult};

#[derive(Serialize)]
struct ReminderView {
    id: String,
    title: String,
    body: String,
    #[serde(flatten)]
    notification: Notification,
}

/// Schedule the recurring reminders and print what was requested.
pub fn run() -> CmdResult {
    let app = open_app()?;
    let reminders: Vec<_> = app
        .schedule_reminders()
        .into_iter()
        .map(|notification| ReminderView {
            id: notification.identifier(),
            title: notification.title(),
            body: notification.body(),
            notification,
        })
        .collect();
    print_json(&reminders)
}
