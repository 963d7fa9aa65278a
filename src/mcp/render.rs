//! Plain-text rendering of a merged schedule.

use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{ScheduleEntry, Todo};

const DUE: char = '○';
const DONE: char = '✓';

/// Render schedule entries one day per block, marking today.
///
/// Example output:
/// ```text
/// Tue 2024-05-14
///   ✓ Water fern
/// Wed 2024-05-15 (today)
///   ○ Mist orchid
///   ✓ Water fern
/// Thu 2024-05-16
///   ○ Water fern
/// ```
///
/// Cares are labelled with their todo's title, looked up in `todos`.
pub fn render_schedule(entries: &[ScheduleEntry], todos: &[Todo], today: NaiveDate) -> String {
    let titles: HashMap<Uuid, &str> = todos.iter().map(|t| (t.id, t.title.as_str())).collect();
    let mut output = String::new();

    for entry in entries {
        output.push_str(&entry.date.format("%a %Y-%m-%d").to_string());
        if entry.date == today {
            output.push_str(" (today)");
        }
        output.push('\n');

        for todo in &entry.todos {
            push_line(&mut output, DUE, &todo.title);
        }
        for care in &entry.cares {
            let title = titles.get(&care.todo_id).copied().unwrap_or("(deleted todo)");
            push_line(&mut output, DONE, title);
        }
    }
    output
}

fn push_line(output: &mut String, symbol: char, title: &str) {
    output.push_str("  ");
    output.push(symbol);
    output.push(' ');
    output.push_str(title);
    output.push('\n');
}
