use crate::analytics::format_date;
use crate::models::{Habit, ProgressEntry};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

const CSV_HEADER: &str = "ID,Name,Category,Description";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    export_date: DateTime<Utc>,
    habits: Vec<ExportHabit<'a>>,
    progress: Vec<ExportProgress<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportHabit<'a> {
    id: &'a str,
    name: &'a str,
    description: Option<&'a str>,
    category: &'a str,
    color: &'a str,
    icon: Option<&'a str>,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportProgress<'a> {
    habit_id: &'a str,
    date: NaiveDate,
    done: bool,
}

pub fn export_json(
    habits: &[Habit],
    progress: &[ProgressEntry],
    exported_at: DateTime<Utc>,
) -> Result<String, serde_json::Error> {
    let document = ExportDocument {
        export_date: exported_at,
        habits: habits
            .iter()
            .map(|habit| ExportHabit {
                id: &habit.id,
                name: &habit.name,
                description: habit.description.as_deref(),
                category: &habit.category,
                color: &habit.color,
                icon: habit.icon.as_deref(),
                created_at: habit.created_at,
            })
            .collect(),
        progress: progress
            .iter()
            .map(|entry| ExportProgress {
                habit_id: &entry.habit_id,
                date: entry.date,
                done: entry.done,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&document)
}

pub fn export_csv(habits: &[Habit]) -> String {
    let mut out = String::from(CSV_HEADER);
    for habit in habits {
        out.push('\n');
        let row = [
            habit.id.as_str(),
            habit.name.as_str(),
            habit.category.as_str(),
            habit.description.as_deref().unwrap_or(""),
        ];
        let fields: Vec<String> = row.iter().map(|field| csv_field(field)).collect();
        out.push_str(&fields.join(","));
    }
    out
}

pub fn export_filename(date: NaiveDate, extension: &str) -> String {
    format!("habits-export-{}.{extension}", format_date(date))
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn habit(id: &str, name: &str, description: Option<&str>) -> Habit {
        Habit {
            id: id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            category: "Wellness".to_string(),
            color: "#93c5fd".to_string(),
            icon: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn csv_quotes_only_special_fields() {
        let habits = vec![
            habit("a", "Meditation", Some("10 minutes")),
            habit("b", "Read, then write", Some("say \"hi\"\nevery day")),
            habit("c", "Water", None),
        ];

        let csv = export_csv(&habits);
        let expected = "ID,Name,Category,Description\n\
                        a,Meditation,Wellness,10 minutes\n\
                        b,\"Read, then write\",Wellness,\"say \"\"hi\"\"\nevery day\"\n\
                        c,Water,Wellness,";
        assert_eq!(csv, expected);
    }

    #[test]
    fn csv_without_habits_is_header_only() {
        assert_eq!(export_csv(&[]), "ID,Name,Category,Description");
    }

    #[test]
    fn json_uses_renamed_keys() {
        let habits = vec![habit("a", "Meditation", None)];
        let progress = vec![ProgressEntry {
            habit_id: "a".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            done: true,
        }];
        let exported_at = Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap();

        let json = export_json(&habits, &progress, exported_at).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["exportDate"], "2024-01-03T12:00:00Z");
        assert_eq!(value["habits"][0]["id"], "a");
        assert!(value["habits"][0]["createdAt"].is_null());
        assert_eq!(value["progress"][0]["habitId"], "a");
        assert_eq!(value["progress"][0]["date"], "2024-01-02");
    }

    #[test]
    fn filename_carries_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(export_filename(date, "csv"), "habits-export-2024-01-03.csv");
    }
}
