use crate::models::{AppData, DEFAULT_CATEGORY, Habit, HabitFields, ProgressEntry};
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Reverse;
use thiserror::Error;
use uuid::Uuid;

const NAME_MIN_CHARS: usize = 3;
const NAME_MAX_CHARS: usize = 50;
const DESCRIPTION_MAX_CHARS: usize = 200;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("habit not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Invalid(String),
}

pub trait HabitStore {
    fn list(&self) -> Vec<Habit>;
    fn create(&mut self, fields: HabitFields, now: DateTime<Utc>) -> Result<Habit, StoreError>;
    fn update(&mut self, id: &str, fields: HabitFields, now: DateTime<Utc>) -> Result<Habit, StoreError>;
    fn delete(&mut self, id: &str) -> Result<(), StoreError>;
}

pub trait ProgressStore {
    fn list_all(&self) -> Vec<ProgressEntry>;
    fn toggle(&mut self, habit_id: &str, date: NaiveDate) -> Result<ProgressEntry, StoreError>;
}

impl HabitStore for AppData {
    fn list(&self) -> Vec<Habit> {
        let mut habits = self.habits.clone();
        habits.sort_by_key(|habit| Reverse(habit.created_at));
        habits
    }

    fn create(&mut self, fields: HabitFields, now: DateTime<Utc>) -> Result<Habit, StoreError> {
        let fields = validate(fields)?;
        let habit = Habit {
            id: Uuid::new_v4().to_string(),
            name: fields.name,
            description: fields.description,
            category: fields.category,
            color: fields.color,
            icon: fields.icon,
            created_at: Some(now),
            updated_at: None,
        };
        self.habits.push(habit.clone());
        Ok(habit)
    }

    fn update(&mut self, id: &str, fields: HabitFields, now: DateTime<Utc>) -> Result<Habit, StoreError> {
        let fields = validate(fields)?;
        let habit = self
            .habits
            .iter_mut()
            .find(|habit| habit.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        habit.name = fields.name;
        habit.description = fields.description;
        habit.category = fields.category;
        habit.color = fields.color;
        habit.icon = fields.icon;
        habit.updated_at = Some(now);
        Ok(habit.clone())
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.habits.len();
        self.habits.retain(|habit| habit.id != id);
        if self.habits.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.progress.retain(|entry| entry.habit_id != id);
        Ok(())
    }
}

impl ProgressStore for AppData {
    fn list_all(&self) -> Vec<ProgressEntry> {
        self.progress.clone()
    }

    fn toggle(&mut self, habit_id: &str, date: NaiveDate) -> Result<ProgressEntry, StoreError> {
        if !self.habits.iter().any(|habit| habit.id == habit_id) {
            return Err(StoreError::NotFound(habit_id.to_string()));
        }

        if let Some(entry) = self
            .progress
            .iter_mut()
            .find(|entry| entry.habit_id == habit_id && entry.date == date)
        {
            entry.done = !entry.done;
            return Ok(entry.clone());
        }

        let entry = ProgressEntry {
            habit_id: habit_id.to_string(),
            date,
            done: true,
        };
        self.progress.push(entry.clone());
        Ok(entry)
    }
}

fn validate(fields: HabitFields) -> Result<HabitFields, StoreError> {
    let name = fields.name.trim().to_string();
    let name_chars = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&name_chars) {
        return Err(StoreError::Invalid(format!(
            "habit name must be {NAME_MIN_CHARS} to {NAME_MAX_CHARS} characters"
        )));
    }

    let description = fields
        .description
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());
    if description
        .as_ref()
        .is_some_and(|text| text.chars().count() > DESCRIPTION_MAX_CHARS)
    {
        return Err(StoreError::Invalid(format!(
            "description must be at most {DESCRIPTION_MAX_CHARS} characters"
        )));
    }

    let color = fields.color.trim().to_string();
    if !is_hex_color(&color) {
        return Err(StoreError::Invalid(format!("invalid color: {color}")));
    }

    let category = match fields.category.trim() {
        "" => DEFAULT_CATEGORY.to_string(),
        category => category.to_string(),
    };

    let icon = fields
        .icon
        .map(|icon| icon.trim().to_string())
        .filter(|icon| !icon.is_empty());

    Ok(HabitFields {
        name,
        description,
        category,
        color,
        icon,
    })
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(digits) => {
            matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}
