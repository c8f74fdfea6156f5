use crate::models::{
    AppData, CategoryStat, DashboardResponse, DayStat, Habit, HabitStats, HabitSummary,
    ProgressEntry, StreakSummary,
};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeSet, HashSet};

const DAYS_PER_WEEK: i64 = 7;
const DAYS_PER_YEAR: f64 = 365.0;

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_signed(Duration::days(date.weekday().num_days_from_monday() as i64))
        .unwrap_or(NaiveDate::MIN)
}

pub fn week_end(start: NaiveDate) -> Option<NaiveDate> {
    start.checked_add_signed(Duration::days(DAYS_PER_WEEK - 1))
}

// Stops early at the end of the representable calendar.
pub fn week_dates(start: NaiveDate) -> Vec<NaiveDate> {
    (0..DAYS_PER_WEEK)
        .map_while(|offset| start.checked_add_signed(Duration::days(offset)))
        .collect()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn longest_streak(progress: &[ProgressEntry], habit_id: &str) -> u32 {
    let dates = completed_dates(progress, habit_id);

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;
    for date in dates {
        run = match previous {
            Some(prev) if (date - prev).num_days() == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(date);
    }
    longest
}

// Anchored on today or yesterday.
pub fn current_streak(progress: &[ProgressEntry], habit_id: &str, today: NaiveDate) -> u32 {
    let dates = completed_dates(progress, habit_id);
    let yesterday = today.pred_opt();

    let mut cursor = if dates.contains(&today) {
        Some(today)
    } else if yesterday.is_some_and(|day| dates.contains(&day)) {
        yesterday
    } else {
        return 0;
    };

    let mut streak = 0u32;
    while let Some(day) = cursor.filter(|day| dates.contains(day)) {
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}

pub fn longest_streak_across_habits(habits: &[Habit], progress: &[ProgressEntry]) -> StreakSummary {
    best_streak(habits, |habit| longest_streak(progress, &habit.id))
}

pub fn current_streak_across_habits(
    habits: &[Habit],
    progress: &[ProgressEntry],
    today: NaiveDate,
) -> StreakSummary {
    best_streak(habits, |habit| current_streak(progress, &habit.id, today))
}

pub fn weekly_stats(habits: &[Habit], progress: &[ProgressEntry], start: NaiveDate) -> Vec<DayStat> {
    let completed = completed_pairs(habits, progress);

    week_dates(start)
        .into_iter()
        .map(|date| DayStat {
            date,
            day_label: date.format("%a").to_string(),
            completed_count: completed.iter().filter(|(_, day)| *day == date).count(),
            total_habits: habits.len(),
        })
        .collect()
}

pub fn completion_rate(habits: &[Habit], progress: &[ProgressEntry], start: NaiveDate) -> u8 {
    let possible = habits.len() * DAYS_PER_WEEK as usize;
    if possible == 0 {
        return 0;
    }

    let end = week_end(start).unwrap_or(NaiveDate::MAX);
    let completed = completed_pairs(habits, progress)
        .into_iter()
        .filter(|(_, date)| *date >= start && *date <= end)
        .count();

    percentage(completed, possible)
}

// First-seen category order.
pub fn category_distribution(habits: &[Habit], progress: &[ProgressEntry]) -> Vec<CategoryStat> {
    let mut stats: Vec<CategoryStat> = Vec::new();

    for habit in habits {
        let completed = completed_dates(progress, &habit.id).len();
        let category = habit.category_or_default();
        match stats.iter_mut().find(|stat| stat.category == category) {
            Some(stat) => {
                stat.habit_count += 1;
                stat.completed_count += completed;
            }
            None => stats.push(CategoryStat {
                category: category.to_string(),
                habit_count: 1,
                completed_count: completed,
            }),
        }
    }

    stats
}

pub fn is_perfect_day(habits: &[Habit], progress: &[ProgressEntry], today: NaiveDate) -> bool {
    !habits.is_empty()
        && habits.iter().all(|habit| {
            progress
                .iter()
                .any(|entry| entry.done && entry.habit_id == habit.id && entry.date == today)
        })
}

pub fn habit_stats(progress: &[ProgressEntry], habit_id: &str, today: NaiveDate) -> HabitStats {
    let total_days = completed_dates(progress, habit_id).len();
    let yearly = (total_days as f64 / DAYS_PER_YEAR * 100.0).round().min(100.0) as u8;

    HabitStats {
        habit_id: habit_id.to_string(),
        longest_streak: longest_streak(progress, habit_id),
        current_streak: current_streak(progress, habit_id, today),
        total_days,
        completion_rate: yearly,
    }
}

pub fn habit_week(progress: &[ProgressEntry], habit_id: &str, start: NaiveDate) -> Vec<bool> {
    let dates = completed_dates(progress, habit_id);
    week_dates(start)
        .iter()
        .map(|date| dates.contains(date))
        .collect()
}

pub fn build_dashboard_at(
    today: NaiveDate,
    reference: NaiveDate,
    data: &AppData,
) -> Option<DashboardResponse> {
    let start = week_start(reference);
    let end = week_end(start)?;
    let habits = &data.habits;
    let progress = &data.progress;

    let summaries = habits
        .iter()
        .map(|habit| HabitSummary {
            id: habit.id.clone(),
            name: habit.name.clone(),
            longest_streak: longest_streak(progress, &habit.id),
            current_streak: current_streak(progress, &habit.id, today),
            week: habit_week(progress, &habit.id, start),
        })
        .collect();

    Some(DashboardResponse {
        today,
        week_start: start,
        week_end: end,
        perfect_day: is_perfect_day(habits, progress, today),
        completion_rate: completion_rate(habits, progress, start),
        longest_streak: longest_streak_across_habits(habits, progress),
        current_streak: current_streak_across_habits(habits, progress, today),
        weekly: weekly_stats(habits, progress, start),
        categories: category_distribution(habits, progress),
        habits: summaries,
    })
}

fn completed_dates(progress: &[ProgressEntry], habit_id: &str) -> BTreeSet<NaiveDate> {
    progress
        .iter()
        .filter(|entry| entry.done && entry.habit_id == habit_id)
        .map(|entry| entry.date)
        .collect()
}

// Distinct (habit, date) completions, restricted to the given habits.
fn completed_pairs<'a>(habits: &'a [Habit], progress: &[ProgressEntry]) -> HashSet<(&'a str, NaiveDate)> {
    let known: HashSet<&str> = habits.iter().map(|habit| habit.id.as_str()).collect();
    progress
        .iter()
        .filter(|entry| entry.done)
        .filter_map(|entry| {
            known
                .get(entry.habit_id.as_str())
                .map(|id| (*id, entry.date))
        })
        .collect()
}

fn best_streak(habits: &[Habit], streak_of: impl Fn(&Habit) -> u32) -> StreakSummary {
    let mut best = StreakSummary {
        streak: 0,
        habit: None,
    };
    for habit in habits {
        let streak = streak_of(habit);
        if streak > best.streak {
            best = StreakSummary {
                streak,
                habit: Some(habit.clone()),
            };
        }
    }
    best
}

fn percentage(part: usize, whole: usize) -> u8 {
    (part as f64 * 100.0 / whole as f64).round().min(100.0) as u8
}
