//! Initial-data import and the built-in sample week.
//!
//! The import document is the shape produced by the planning assistant that
//! seeds a new week:
//!
//! ```json
//! { "priorites": [ { "titre": "...", "importance": 4, "deadline": "2024-06-07T17:00:00Z",
//!                    "taches": [ { "titre": "...", "done": false } ] } ] }
//! ```
//!
//! English keys (`priorities`, `title`, `tasks`) are accepted as well.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{Priority, PriorityColor, Task, MAX_PRIORITIES};
use crate::error::ImportError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportDocument {
    #[serde(rename = "priorites", alias = "priorities")]
    pub priorities: Vec<ImportedPriority>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedPriority {
    #[serde(rename = "titre", alias = "title")]
    pub title: String,
    pub importance: i64,
    pub deadline: String,
    #[serde(rename = "taches", alias = "tasks", default)]
    pub tasks: Vec<ImportedTask>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedTask {
    #[serde(rename = "titre", alias = "title")]
    pub title: String,
    #[serde(default)]
    pub done: bool,
}

/// Convert an import document into native priorities.
///
/// Only the first three records are used and an empty record list is a
/// valid, empty week. An unparseable deadline becomes five days after `now`;
/// importance is clamped to 1..=5 and colors cycle by record position.
/// Imported done tasks carry no completion time.
///
/// # Errors
/// Returns an error if the text is not a valid document.
pub fn parse_initial_data(text: &str, now: DateTime<Utc>) -> Result<Vec<Priority>, ImportError> {
    let document: ImportDocument = serde_json::from_str(text)?;
    if document.priorities.len() > MAX_PRIORITIES {
        tracing::debug!(
            dropped = document.priorities.len() - MAX_PRIORITIES,
            "import holds more than the maximum number of priorities"
        );
    }

    let priorities = document
        .priorities
        .into_iter()
        .take(MAX_PRIORITIES)
        .enumerate()
        .map(|(index, record)| {
            let deadline = DateTime::parse_from_rfc3339(record.deadline.trim())
                .map(|d| d.with_timezone(&Utc))
                .unwrap_or_else(|_| now + Duration::days(Priority::DEFAULT_DEADLINE_DAYS));
            let tasks = record
                .tasks
                .into_iter()
                .map(|t| Task {
                    is_completed: t.done,
                    ..Task::new(t.title)
                })
                .collect();

            Priority::new(record.title, now)
                .with_importance(record.importance.clamp(1, 5) as u8)
                .with_deadline(deadline)
                .with_color(PriorityColor::cycled(index))
                .with_tasks(tasks)
        })
        .collect();

    Ok(priorities)
}

/// Three example priorities used on first launch.
pub fn sample_data(now: DateTime<Utc>) -> Vec<Priority> {
    let tasks = |titles: &[&str]| titles.iter().map(|t| Task::new(*t)).collect::<Vec<_>>();

    vec![
        Priority::new("Automate invoicing & payments", now)
            .with_importance(5)
            .with_deadline(now + Duration::days(3))
            .with_color(PriorityColor::Red)
            .with_tasks(tasks(&[
                "Create 'Invoices/Paid' tabs in Drive",
                "Wire invoice-to-board automation",
                "Test the full workflow",
                "Walk the team through the new process",
            ])),
        Priority::new("Boost client prospecting", now)
            .with_importance(4)
            .with_deadline(now + Duration::days(5))
            .with_color(PriorityColor::Blue)
            .with_tasks(tasks(&[
                "Write the script for video episode 1",
                "Record the episode",
                "Publish on LinkedIn and YouTube",
                "Finish the client-logo carousel on the site",
                "Add a 'Contact us' call to action",
            ])),
        Priority::new("Sleep & well-being", now)
            .with_importance(4)
            .with_deadline(now + Duration::days(7))
            .with_color(PriorityColor::Green)
            .with_tasks(tasks(&[
                "Lights out before 22:30",
                "Run or hike this weekend",
                "Dedicated family time",
                "Lighten Friday afternoon",
            ])),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap()
    }

    #[test]
    fn imports_french_keys() {
        let text = r#"{
            "priorites": [
                { "titre": "Facturation", "importance": 5, "deadline": "2024-06-06T17:00:00Z",
                  "taches": [ { "titre": "Onglets", "done": true }, { "titre": "Zapier", "done": false } ] }
            ]
        }"#;
        let priorities = parse_initial_data(text, now()).unwrap();
        assert_eq!(priorities.len(), 1);
        let p = &priorities[0];
        assert_eq!(p.title, "Facturation");
        assert_eq!(p.importance, 5);
        assert_eq!(p.deadline, Utc.with_ymd_and_hms(2024, 6, 6, 17, 0, 0).unwrap());
        assert_eq!(p.color, PriorityColor::Blue);
        assert_eq!(p.tasks.len(), 2);
        assert!(p.tasks[0].is_completed);
        assert_eq!(p.tasks[0].completed_at, None);
        assert_eq!(p.tasks[1].order, 1);
    }

    #[test]
    fn imports_english_keys_and_drops_extras() {
        let records: Vec<String> = (0..5)
            .map(|i| format!(r#"{{ "title": "P{i}", "importance": 3, "deadline": "soon", "tasks": [] }}"#))
            .collect();
        let text = format!(r#"{{ "priorities": [{}] }}"#, records.join(","));
        let priorities = parse_initial_data(&text, now()).unwrap();
        assert_eq!(priorities.len(), 3);
        assert_eq!(priorities[2].title, "P2");
        assert_eq!(priorities[2].color, PriorityColor::Orange);
        assert_eq!(priorities[0].deadline, now() + Duration::days(5));
    }

    #[test]
    fn clamps_importance() {
        let text = r#"{ "priorities": [ { "title": "x", "importance": 42, "deadline": "", "tasks": [] } ] }"#;
        assert_eq!(parse_initial_data(text, now()).unwrap()[0].importance, 5);
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(matches!(
            parse_initial_data("[]", now()),
            Err(ImportError::InvalidDocument(_))
        ));
        assert!(matches!(
            parse_initial_data(r#"{ "tasks": [] }"#, now()),
            Err(ImportError::InvalidDocument(_))
        ));
    }

    #[test]
    fn empty_record_list_is_an_empty_week() {
        let priorities = parse_initial_data(r#"{ "priorites": [] }"#, now()).unwrap();
        assert!(priorities.is_empty());
    }

    #[test]
    fn sample_data_is_three_priorities_with_dense_tasks() {
        let sample = sample_data(now());
        assert_eq!(sample.len(), 3);
        for p in &sample {
            assert!(!p.tasks.is_empty());
            assert!(p.tasks.iter().enumerate().all(|(i, t)| t.order == i && !t.is_completed));
        }
    }
}
