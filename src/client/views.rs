use chrono::NaiveDate;

use crate::models::{ClassSchedule, DayOfWeek, Priority, Task, TaskStatus};

/// Deadline checks work on whole days. A task due later today is "due
/// today"; it only becomes overdue once the date has passed, whatever its
/// time says.
pub fn is_today(date: NaiveDate, today: NaiveDate) -> bool {
    date == today
}

pub fn is_overdue(date: NaiveDate, today: NaiveDate) -> bool {
    date < today
}

/// Tasks surfaced on the dashboard: anything pending that is marked urgent
/// or falls due today, highest priority first.
pub fn urgent_tasks<'a>(tasks: &'a [Task], today: NaiveDate) -> Vec<&'a Task> {
    let mut picked: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Completed)
        .filter(|t| t.priority == Priority::Urgent || is_today(t.deadline_date, today))
        .collect();
    picked.sort_by(|a, b| {
        b.priority
            .rank()
            .cmp(&a.priority.rank())
            .then(a.deadline_date.cmp(&b.deadline_date))
    });
    picked
}

/// All criteria are optional and combine with AND. The search needle matches
/// case-insensitively against title, description and category.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub search: String,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() {
            let hit = task.title.to_lowercase().contains(&needle)
                || task.description.to_lowercase().contains(&needle)
                || task.category.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if task.category != *category {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        true
    }
}

pub fn filter_tasks<'a>(tasks: &'a [Task], filter: &TaskFilter) -> Vec<&'a Task> {
    tasks.iter().filter(|t| filter.matches(t)).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskSort {
    #[default]
    DeadlineAsc,
    DeadlineDesc,
    Priority,
    Title,
}

/// Stable sort, so tasks that compare equal keep their list order. Deadline
/// comparisons use the date only.
pub fn sort_tasks(tasks: &mut [&Task], sort: TaskSort) {
    match sort {
        TaskSort::DeadlineAsc => tasks.sort_by_key(|t| t.deadline_date),
        TaskSort::DeadlineDesc => tasks.sort_by(|a, b| b.deadline_date.cmp(&a.deadline_date)),
        TaskSort::Priority => tasks.sort_by(|a, b| {
            b.priority
                .rank()
                .cmp(&a.priority.rank())
                .then(a.deadline_date.cmp(&b.deadline_date))
        }),
        TaskSort::Title => {
            tasks.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        }
    }
}

/// Tasks whose deadline falls on `date`, regardless of status.
pub fn tasks_on(tasks: &[Task], date: NaiveDate) -> Vec<&Task> {
    tasks.iter().filter(|t| t.deadline_date == date).collect()
}

/// The calendar dot for a day: the highest-ranked priority among pending
/// tasks due that day, or nothing when the day is clear.
pub fn day_priority(tasks: &[Task], date: NaiveDate) -> Option<Priority> {
    tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Completed && t.deadline_date == date)
        .map(|t| t.priority)
        .max_by_key(|p| p.rank())
}

pub fn schedules_on(schedules: &[ClassSchedule], day: DayOfWeek) -> Vec<&ClassSchedule> {
    schedules.iter().filter(|s| s.day == day.as_str()).collect()
}

/// The dashboard's "classes today" strip, in start-time order.
pub fn todays_schedule(schedules: &[ClassSchedule], today: NaiveDate) -> Vec<&ClassSchedule> {
    let mut rows = schedules_on(schedules, DayOfWeek::from_date(today));
    rows.sort_by(|a, b| a.start_time.cmp(&b.start_time));
    rows
}

pub struct DayGroup<'a> {
    pub day: DayOfWeek,
    pub schedules: Vec<&'a ClassSchedule>,
}

/// Groups the cached schedules into the fixed Monday-first week. Every day
/// appears, empty or not; within a day classes run in start-time order.
pub fn weekly_groups(schedules: &[ClassSchedule]) -> Vec<DayGroup<'_>> {
    DayOfWeek::WEEK
        .into_iter()
        .map(|day| {
            let mut rows = schedules_on(schedules, day);
            rows.sort_by(|a, b| a.start_time.cmp(&b.start_time));
            DayGroup {
                day,
                schedules: rows,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskCounts {
    pub total: usize,
    pub due_today: usize,
    pub overdue: usize,
}

/// Dashboard counters. Completed tasks are out of the picture entirely.
pub fn count_tasks(tasks: &[Task], today: NaiveDate) -> TaskCounts {
    let pending: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Completed)
        .collect();
    TaskCounts {
        total: pending.len(),
        due_today: pending
            .iter()
            .filter(|t| is_today(t.deadline_date, today))
            .count(),
        overdue: pending
            .iter()
            .filter(|t| is_overdue(t.deadline_date, today))
            .count(),
    }
}

pub fn format_date_short(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
