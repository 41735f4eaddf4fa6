use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::client::store::{LocalStore, Theme, UserData};
use crate::client::ClientError;
use crate::models::{Attachment, ClassSchedule, Task, TaskDraft, TaskStatus};

/// Next id for a new task: one past the current maximum, starting from 1.
/// Ids are never reused while the record holds a task with a higher id.
pub fn next_task_id(tasks: &[Task]) -> u32 {
    tasks.iter().map(|t| t.id).max().map_or(1, |max| max + 1)
}

/// An account's record loaded into memory. All task edits go through here;
/// every successful mutation is written back to the store before returning.
pub struct Workset {
    email: String,
    data: UserData,
    store: Arc<LocalStore>,
}

impl Workset {
    pub fn open(store: Arc<LocalStore>, email: &str) -> Result<Self, ClientError> {
        let data = store.load_user_data(email)?;
        Ok(Self {
            email: email.to_string(),
            data,
            store,
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn tasks(&self) -> &[Task] {
        &self.data.tasks
    }

    pub fn schedules(&self) -> &[ClassSchedule] {
        &self.data.class_schedules
    }

    pub fn theme(&self) -> Theme {
        self.data.theme
    }

    pub fn task(&self, id: u32) -> Option<&Task> {
        self.data.tasks.iter().find(|t| t.id == id)
    }

    /// Re-reads the record from the store, picking up writes made through
    /// other handles.
    pub fn reload(&mut self) -> Result<(), ClientError> {
        self.data = self.store.load_user_data(&self.email)?;
        Ok(())
    }

    fn persist(&self) -> Result<(), ClientError> {
        self.store.save_user_data(&self.email, &self.data)?;
        Ok(())
    }

    /// Validates the draft and appends the new task. Nothing is written when
    /// validation fails.
    pub fn create_task(
        &mut self,
        draft: &TaskDraft,
        attachments: Vec<Attachment>,
        now: NaiveDateTime,
    ) -> Result<u32, ClientError> {
        let (deadline_date, deadline_time) = draft.validate(now)?;
        let id = next_task_id(&self.data.tasks);
        self.data.tasks.push(Task {
            id,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            category: draft.category.trim().to_string(),
            deadline_date,
            deadline_time,
            priority: draft.priority,
            status: TaskStatus::default(),
            reminder: draft.reminder,
            attachments,
        });
        self.persist()?;
        Ok(id)
    }

    /// Full-form edit. Every field comes from the draft except `status`,
    /// which an edit never changes; attachments are replaced wholesale.
    pub fn update_task(
        &mut self,
        id: u32,
        draft: &TaskDraft,
        attachments: Vec<Attachment>,
        now: NaiveDateTime,
    ) -> Result<(), ClientError> {
        let (deadline_date, deadline_time) = draft.validate(now)?;
        let task = self
            .data
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ClientError::TaskNotFound(id))?;

        task.title = draft.title.trim().to_string();
        task.description = draft.description.trim().to_string();
        task.category = draft.category.trim().to_string();
        task.deadline_date = deadline_date;
        task.deadline_time = deadline_time;
        task.priority = draft.priority;
        task.reminder = draft.reminder;
        task.attachments = attachments;

        self.persist()
    }

    pub fn toggle_task(&mut self, id: u32) -> Result<TaskStatus, ClientError> {
        let task = self
            .data
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ClientError::TaskNotFound(id))?;
        task.status = task.status.toggled();
        let status = task.status;
        self.persist()?;
        Ok(status)
    }

    pub fn delete_task(&mut self, id: u32) -> Result<(), ClientError> {
        let before = self.data.tasks.len();
        self.data.tasks.retain(|t| t.id != id);
        if self.data.tasks.len() == before {
            return Err(ClientError::TaskNotFound(id));
        }
        self.persist()
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), ClientError> {
        self.data.theme = theme;
        self.persist()
    }

    /// Overwrites the cached schedules with the server's copy.
    pub fn replace_schedules(&mut self, schedules: Vec<ClassSchedule>) -> Result<(), ClientError> {
        self.data.class_schedules = schedules;
        self.persist()
    }

    pub fn insert_schedule(&mut self, schedule: ClassSchedule) -> Result<(), ClientError> {
        self.data.class_schedules.push(schedule);
        self.persist()
    }

    /// Replaces the cached row with the same id, or appends when the cache
    /// has drifted and no longer holds it.
    pub fn apply_schedule_update(&mut self, schedule: ClassSchedule) -> Result<(), ClientError> {
        match self
            .data
            .class_schedules
            .iter_mut()
            .find(|s| s.id == schedule.id)
        {
            Some(slot) => *slot = schedule,
            None => self.data.class_schedules.push(schedule),
        }
        self.persist()
    }

    pub fn remove_schedule(&mut self, id: i64) -> Result<(), ClientError> {
        self.data.class_schedules.retain(|s| s.id != id);
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 20)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            category: "Assignment".to_string(),
            deadline_date: Some(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()),
            deadline_time: Some("10:00".to_string()),
            ..TaskDraft::default()
        }
    }

    fn attachment(id: &str) -> Attachment {
        Attachment {
            id: id.to_string(),
            name: "notes.pdf".to_string(),
            size: 4,
            content_type: "application/pdf".to_string(),
            data: "data:application/pdf;base64,AAAA".to_string(),
            is_stored: true,
        }
    }

    fn workset() -> (tempfile::TempDir, Workset) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = Arc::new(LocalStore::open(dir.path().join("kampusku.json")));
        let ws = Workset::open(store, "budi@student.ac.id").expect("Failed to open workset");
        (dir, ws)
    }

    #[test]
    fn ids_start_at_one_and_follow_the_max() {
        assert_eq!(next_task_id(&[]), 1);

        let (_dir, mut ws) = workset();
        for title in ["a", "b", "c"] {
            ws.create_task(&draft(title), vec![], now())
                .expect("Failed to create task");
        }
        assert_eq!(
            ws.tasks().iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );

        // Deleting below the max leaves the next id untouched.
        ws.delete_task(2).expect("Failed to delete");
        let id = ws
            .create_task(&draft("d"), vec![], now())
            .expect("Failed to create task");
        assert_eq!(id, 4);
    }

    #[test]
    fn invalid_draft_leaves_the_record_untouched() {
        let (_dir, mut ws) = workset();
        let mut bad = draft("Lab report");
        bad.category = String::new();

        assert!(matches!(
            ws.create_task(&bad, vec![], now()),
            Err(ClientError::TaskForm(_))
        ));
        assert!(ws.tasks().is_empty());

        ws.reload().expect("Failed to reload");
        assert!(ws.tasks().is_empty());
    }

    #[test]
    fn toggle_flips_status_both_ways() {
        let (_dir, mut ws) = workset();
        let id = ws
            .create_task(&draft("Lab report"), vec![], now())
            .expect("Failed to create task");

        assert_eq!(ws.toggle_task(id).expect("toggle"), TaskStatus::Completed);
        assert_eq!(ws.toggle_task(id).expect("toggle"), TaskStatus::Pending);
    }

    #[test]
    fn update_replaces_attachments_and_keeps_status() {
        let (_dir, mut ws) = workset();
        let id = ws
            .create_task(&draft("Lab report"), vec![attachment("one"), attachment("two")], now())
            .expect("Failed to create task");
        ws.toggle_task(id).expect("Failed to toggle");

        let mut edited = draft("Lab report v2");
        edited.priority = crate::models::Priority::High;
        ws.update_task(id, &edited, vec![attachment("three")], now())
            .expect("Failed to update task");

        let task = ws.task(id).expect("Task missing");
        assert_eq!(task.title, "Lab report v2");
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.attachments.len(), 1);
        assert_eq!(task.attachments[0].id, "three");
    }

    #[test]
    fn theme_toggle_round_trips_through_the_store() {
        let (_dir, mut ws) = workset();
        assert_eq!(ws.theme(), Theme::Light);

        ws.set_theme(ws.theme().toggled()).expect("Failed to set theme");
        assert_eq!(ws.theme(), Theme::Dark);

        ws.reload().expect("Failed to reload");
        assert_eq!(ws.theme(), Theme::Dark);
    }

    #[test]
    fn missing_ids_are_reported() {
        let (_dir, mut ws) = workset();
        assert!(matches!(
            ws.toggle_task(9),
            Err(ClientError::TaskNotFound(9))
        ));
        assert!(matches!(
            ws.delete_task(9),
            Err(ClientError::TaskNotFound(9))
        ));
        assert!(matches!(
            ws.update_task(9, &draft("x"), vec![], now()),
            Err(ClientError::TaskNotFound(9))
        ));
    }

    #[test]
    fn edits_are_visible_through_a_second_handle() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = Arc::new(LocalStore::open(dir.path().join("kampusku.json")));

        let mut first =
            Workset::open(store.clone(), "budi@student.ac.id").expect("Failed to open workset");
        let mut second =
            Workset::open(store.clone(), "budi@student.ac.id").expect("Failed to open workset");
        let mut changes = store.subscribe();

        first
            .create_task(&draft("Lab report"), vec![], now())
            .expect("Failed to create task");

        assert_eq!(
            changes.try_recv().expect("Expected a change event"),
            "user_data_budi@student.ac.id"
        );
        second.reload().expect("Failed to reload");
        assert_eq!(second.tasks().len(), 1);
    }

    #[test]
    fn schedule_cache_merges_by_id() {
        let (_dir, mut ws) = workset();
        let row = |id: i64, course: &str| ClassSchedule {
            id,
            user_id: 1,
            day: "Mon".to_string(),
            course: course.to_string(),
            start_time: "08:00".to_string(),
            end_time: "09:40".to_string(),
            place: None,
            created_at: String::new(),
        };

        ws.replace_schedules(vec![row(1, "Algorithms"), row(2, "Calculus")])
            .expect("Failed to replace");

        ws.apply_schedule_update(row(2, "Linear Algebra"))
            .expect("Failed to update");
        assert_eq!(ws.schedules()[1].course, "Linear Algebra");

        // Unknown id falls back to append.
        ws.apply_schedule_update(row(7, "Physics"))
            .expect("Failed to update");
        assert_eq!(ws.schedules().len(), 3);

        ws.remove_schedule(1).expect("Failed to remove");
        assert!(ws.schedules().iter().all(|s| s.id != 1));
    }
}
