use crate::calendar::Granularity;
use crate::model::{Lane, ScheduleError, Task, TaskDraft, TaskId};
use crate::validate::{find_conflict, occupies_cell, Candidate};
use chrono::NaiveDate;
use log::{info, warn};
use rand::{distributions::Alphanumeric, Rng};
use std::collections::HashMap;

/// In-memory task records keyed by id, plus the fixed lane set.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    lanes: Vec<Lane>,
    tasks: HashMap<TaskId, Task>,
    order: Vec<TaskId>,
}

impl TaskStore {
    pub fn new(lanes: Vec<Lane>) -> Self {
        TaskStore {
            lanes,
            tasks: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn find_lane(&self, id: &str) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All tasks in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().filter_map(|id| self.tasks.get(id))
    }

    /// Loads a record as-is, keeping its id. Lane and range are still
    /// checked; overlap is not.
    pub fn insert_seeded(&mut self, task: Task) -> Result<(), ScheduleError> {
        self.ensure_lane(&task.lane_id)?;
        task.to_draft().ensure_range()?;
        if !self.tasks.contains_key(&task.id) {
            self.order.push(task.id.clone());
        }
        self.tasks.insert(task.id.clone(), task);
        Ok(())
    }

    pub fn create(&mut self, draft: TaskDraft) -> Result<Task, ScheduleError> {
        self.check_write(&draft, None)?;
        let id = self.generate_id();
        let task = Task::from_draft(id.clone(), draft);
        self.tasks.insert(id.clone(), task.clone());
        self.order.push(id);
        info!(
            "event=task_create id={} lane={} start={} end={}",
            task.id, task.lane_id, task.start_date, task.end_date
        );
        Ok(task)
    }

    /// Replaces every field of `id` except the id itself.
    pub fn replace(&mut self, id: &str, draft: TaskDraft) -> Result<Task, ScheduleError> {
        if !self.tasks.contains_key(id) {
            warn!("event=task_replace status=missing id={}", id);
            return Err(ScheduleError::TaskNotFound(id.to_string()));
        }
        self.check_write(&draft, Some(id))?;
        let task = Task::from_draft(id.to_string(), draft);
        self.tasks.insert(task.id.clone(), task.clone());
        info!(
            "event=task_replace id={} lane={} start={} end={}",
            task.id, task.lane_id, task.start_date, task.end_date
        );
        Ok(task)
    }

    pub fn list_by_lane(&self, lane_id: &str) -> Vec<&Task> {
        self.iter().filter(|t| t.lane_id == lane_id).collect()
    }

    pub fn list_in_cell(&self, lane_id: &str, unit: NaiveDate, granularity: Granularity) -> Vec<&Task> {
        self.iter()
            .filter(|t| t.lane_id == lane_id && occupies_cell(t, unit, granularity))
            .collect()
    }

    /// The task in `lane_id` that blocks `draft`, if any.
    pub fn conflict_for(&self, draft: &TaskDraft, exclude_id: Option<&str>) -> Option<&Task> {
        let candidate = Candidate {
            lane_id: Some(&draft.lane_id),
            start: draft.start_date,
            end: draft.end_date,
        };
        find_conflict(&candidate, self.list_by_lane(&draft.lane_id), exclude_id)
    }

    fn check_write(&self, draft: &TaskDraft, exclude_id: Option<&str>) -> Result<(), ScheduleError> {
        self.ensure_lane(&draft.lane_id)?;
        draft.ensure_range()?;
        if let Some(conflict) = self.conflict_for(draft, exclude_id) {
            warn!(
                "event=task_rejected reason=overlap lane={} conflicting={}",
                draft.lane_id, conflict.id
            );
            return Err(ScheduleError::Overlap {
                lane: draft.lane_id.clone(),
                conflicting: conflict.id.clone(),
            });
        }
        Ok(())
    }

    fn ensure_lane(&self, lane_id: &str) -> Result<(), ScheduleError> {
        match self.find_lane(lane_id) {
            Some(_) => Ok(()),
            None => Err(ScheduleError::UnknownLane(lane_id.to_string())),
        }
    }

    fn generate_id(&self) -> TaskId {
        loop {
            let suffix: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(6)
                .map(char::from)
                .collect();
            let id = format!("wo-{}", suffix.to_ascii_lowercase());
            if !self.tasks.contains_key(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn store() -> TaskStore {
        TaskStore::new(vec![
            Lane {
                id: "L1".into(),
                name: "Assembly".into(),
            },
            Lane {
                id: "L2".into(),
                name: "Packaging".into(),
            },
        ])
    }

    fn draft(lane: &str, start: &str, end: &str) -> TaskDraft {
        TaskDraft {
            lane_id: lane.into(),
            name: "Run".into(),
            status: TaskStatus::Open,
            start_date: d(start),
            end_date: d(end),
        }
    }

    #[test]
    fn test_create_then_list_by_lane() {
        let mut s = store();
        let data = draft("L1", "2026-01-01", "2026-01-10");
        let created = s.create(data.clone()).unwrap();
        assert!(created.id.starts_with("wo-"));

        let listed = s.list_by_lane("L1");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].to_draft(), data);
        assert_eq!(listed[0].id, created.id);
        assert!(s.list_by_lane("L2").is_empty());
    }

    #[test]
    fn test_create_ids_are_unique() {
        let mut s = store();
        let a = s.create(draft("L1", "2026-01-01", "2026-01-01")).unwrap();
        let b = s.create(draft("L1", "2026-01-02", "2026-01-02")).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_create_rejects_overlap_without_mutation() {
        let mut s = store();
        let first = s.create(draft("L1", "2026-01-01", "2026-01-10")).unwrap();
        let err = s.create(draft("L1", "2026-01-10", "2026-01-15")).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::Overlap {
                lane: "L1".into(),
                conflicting: first.id.clone(),
            }
        );
        assert_eq!(s.len(), 1);
        assert!(s.create(draft("L1", "2026-01-11", "2026-01-15")).is_ok());
        assert!(s.create(draft("L2", "2026-01-01", "2026-01-10")).is_ok());
    }

    #[test]
    fn test_create_rejects_unknown_lane() {
        let mut s = store();
        let err = s.create(draft("L9", "2026-01-01", "2026-01-02")).unwrap_err();
        assert_eq!(err, ScheduleError::UnknownLane("L9".into()));
        assert!(s.is_empty());
    }

    #[test]
    fn test_create_rejects_reversed_range() {
        let mut s = store();
        let err = s.create(draft("L1", "2026-01-05", "2026-01-01")).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidRange { .. }));
    }

    #[test]
    fn test_replace_keeps_id_and_ignores_own_range() {
        let mut s = store();
        let t = s.create(draft("L1", "2026-01-01", "2026-01-10")).unwrap();
        let mut edit = t.to_draft();
        edit.name = "Renamed".into();
        edit.status = TaskStatus::Complete;
        let replaced = s.replace(&t.id, edit).unwrap();
        assert_eq!(replaced.id, t.id);
        assert_eq!(s.get(&t.id).unwrap().name, "Renamed");
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_replace_can_move_lane() {
        let mut s = store();
        let t = s.create(draft("L1", "2026-01-01", "2026-01-10")).unwrap();
        s.replace(&t.id, draft("L2", "2026-01-01", "2026-01-10")).unwrap();
        assert!(s.list_by_lane("L1").is_empty());
        assert_eq!(s.list_by_lane("L2").len(), 1);
    }

    #[test]
    fn test_replace_missing_id_is_error() {
        let mut s = store();
        let err = s.replace("nope", draft("L1", "2026-01-01", "2026-01-02")).unwrap_err();
        assert_eq!(err, ScheduleError::TaskNotFound("nope".into()));
        assert!(s.is_empty());
    }

    #[test]
    fn test_replace_rejects_overlap_with_neighbour() {
        let mut s = store();
        let a = s.create(draft("L1", "2026-01-01", "2026-01-10")).unwrap();
        s.create(draft("L1", "2026-01-20", "2026-01-25")).unwrap();
        let err = s.replace(&a.id, draft("L1", "2026-01-01", "2026-01-20")).unwrap_err();
        assert!(matches!(err, ScheduleError::Overlap { .. }));
        assert_eq!(s.get(&a.id).unwrap().end_date, d("2026-01-10"));
    }

    #[test]
    fn test_list_in_cell() {
        let mut s = store();
        s.create(draft("L1", "2026-01-03", "2026-01-05")).unwrap();
        assert_eq!(s.list_in_cell("L1", d("2026-01-04"), Granularity::Day).len(), 1);
        assert!(s.list_in_cell("L1", d("2026-01-06"), Granularity::Day).is_empty());
        assert!(s.list_in_cell("L2", d("2026-01-04"), Granularity::Day).is_empty());
        assert_eq!(s.list_in_cell("L1", d("2026-01-01"), Granularity::Month).len(), 1);
    }

    #[test]
    fn test_insert_seeded_skips_overlap_check_but_not_lane() {
        let mut s = store();
        let mut t = Task::from_draft("wo-001".into(), draft("L1", "2026-01-01", "2026-01-10"));
        s.insert_seeded(t.clone()).unwrap();
        t.id = "wo-002".into();
        s.insert_seeded(t.clone()).unwrap();
        assert_eq!(s.len(), 2);
        t.id = "wo-003".into();
        t.lane_id = "ghost".into();
        assert!(s.insert_seeded(t).is_err());
    }
}
