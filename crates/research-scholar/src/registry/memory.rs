use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use super::directory::{
    DepartmentDirectory, DirectoryError, FacultyDirectory, MeetingLog, NotificationError,
    NotificationOutbox, ScholarDirectory,
};
use super::domain::{
    Department, DrcMeeting, FacultyId, FacultyMember, Notification, ScholarFilter, ScholarId,
    ScholarRecord, SupervisionLoad,
};

/// Process-local store backing every directory trait. Used by the API binary and tests.
#[derive(Default, Clone)]
pub struct MemoryStore {
    faculty: Arc<Mutex<BTreeMap<FacultyId, FacultyMember>>>,
    scholars: Arc<Mutex<BTreeMap<ScholarId, ScholarRecord>>>,
    departments: Arc<Mutex<BTreeMap<String, Department>>>,
    meetings: Arc<Mutex<Vec<DrcMeeting>>>,
}

impl MemoryStore {
    pub fn with_faculty<I>(members: I) -> Self
    where
        I: IntoIterator<Item = FacultyMember>,
    {
        let store = Self::default();
        {
            let mut guard = store.faculty.lock().expect("faculty mutex poisoned");
            for member in members {
                guard.insert(member.id.clone(), member);
            }
        }
        store
    }
}

fn unique_conflict(existing: &ScholarRecord, candidate: &ScholarRecord) -> Option<String> {
    if existing.id == candidate.id {
        return None;
    }
    if existing.roll_number == candidate.roll_number {
        return Some(format!("roll number {}", candidate.roll_number));
    }
    if existing.registration_id == candidate.registration_id {
        return Some(format!("registration id {}", candidate.registration_id));
    }
    if existing.email.eq_ignore_ascii_case(&candidate.email) {
        return Some(format!("email {}", candidate.email));
    }
    None
}

impl FacultyDirectory for MemoryStore {
    fn insert_faculty(&self, member: FacultyMember) -> Result<FacultyMember, DirectoryError> {
        let mut guard = self.faculty.lock().expect("faculty mutex poisoned");
        if guard.contains_key(&member.id) {
            return Err(DirectoryError::Conflict(format!("employee code {}", member.id)));
        }
        guard.insert(member.id.clone(), member.clone());
        Ok(member)
    }

    fn update_faculty(&self, member: FacultyMember) -> Result<(), DirectoryError> {
        let mut guard = self.faculty.lock().expect("faculty mutex poisoned");
        match guard.get_mut(&member.id) {
            Some(slot) => {
                *slot = member;
                Ok(())
            }
            None => Err(DirectoryError::NotFound),
        }
    }

    fn fetch_faculty(&self, id: &FacultyId) -> Result<Option<FacultyMember>, DirectoryError> {
        let guard = self.faculty.lock().expect("faculty mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list_faculty(&self, department: Option<&str>) -> Result<Vec<FacultyMember>, DirectoryError> {
        let guard = self.faculty.lock().expect("faculty mutex poisoned");
        Ok(guard
            .values()
            .filter(|member| {
                department
                    .map(|code| member.department.eq_ignore_ascii_case(code))
                    .unwrap_or(true)
            })
            .cloned()
            .collect())
    }
}

impl ScholarDirectory for MemoryStore {
    fn insert_scholar(&self, record: ScholarRecord) -> Result<ScholarRecord, DirectoryError> {
        let mut guard = self.scholars.lock().expect("scholar mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(DirectoryError::Conflict(format!("scholar {}", record.id)));
        }
        if let Some(field) = guard
            .values()
            .find_map(|existing| unique_conflict(existing, &record))
        {
            return Err(DirectoryError::Conflict(field));
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update_scholar(&self, record: ScholarRecord) -> Result<(), DirectoryError> {
        let mut guard = self.scholars.lock().expect("scholar mutex poisoned");
        if !guard.contains_key(&record.id) {
            return Err(DirectoryError::NotFound);
        }
        if let Some(field) = guard
            .values()
            .find_map(|existing| unique_conflict(existing, &record))
        {
            return Err(DirectoryError::Conflict(field));
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch_scholar(&self, id: &ScholarId) -> Result<Option<ScholarRecord>, DirectoryError> {
        let guard = self.scholars.lock().expect("scholar mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list_scholars(&self, filter: &ScholarFilter) -> Result<Vec<ScholarRecord>, DirectoryError> {
        let guard = self.scholars.lock().expect("scholar mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    fn supervision_load(&self, faculty_id: &FacultyId) -> Result<SupervisionLoad, DirectoryError> {
        let guard = self.scholars.lock().expect("scholar mutex poisoned");
        let mut load = SupervisionLoad::default();
        for record in guard.values().filter(|record| record.is_active) {
            if record.supervisor.as_ref() == Some(faculty_id) {
                load.supervising += 1;
            }
            if record.co_supervisor.as_ref() == Some(faculty_id) {
                load.co_supervising += 1;
            }
        }
        Ok(load)
    }
}

impl DepartmentDirectory for MemoryStore {
    fn insert_department(&self, department: Department) -> Result<Department, DirectoryError> {
        let mut guard = self.departments.lock().expect("department mutex poisoned");
        let key = department.code.to_ascii_uppercase();
        if guard.contains_key(&key) {
            return Err(DirectoryError::Conflict(format!(
                "department {}",
                department.code
            )));
        }
        guard.insert(key, department.clone());
        Ok(department)
    }

    fn list_departments(&self) -> Result<Vec<Department>, DirectoryError> {
        let guard = self.departments.lock().expect("department mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

impl MeetingLog for MemoryStore {
    fn insert_meeting(&self, meeting: DrcMeeting) -> Result<DrcMeeting, DirectoryError> {
        let mut guard = self.meetings.lock().expect("meeting mutex poisoned");
        guard.push(meeting.clone());
        Ok(meeting)
    }

    fn meetings_for(&self, scholar_id: &ScholarId) -> Result<Vec<DrcMeeting>, DirectoryError> {
        let guard = self.meetings.lock().expect("meeting mutex poisoned");
        let mut meetings: Vec<DrcMeeting> = guard
            .iter()
            .filter(|meeting| &meeting.scholar_id == scholar_id)
            .cloned()
            .collect();
        meetings.sort_by_key(|meeting| meeting.scheduled_for);
        Ok(meetings)
    }
}

/// Records notifications instead of delivering them.
#[derive(Default, Clone)]
pub struct MemoryOutbox {
    events: Arc<Mutex<HashMap<FacultyId, Vec<Notification>>>>,
}

impl MemoryOutbox {
    pub fn len(&self) -> usize {
        self.events
            .lock()
            .expect("outbox mutex poisoned")
            .values()
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationOutbox for MemoryOutbox {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("outbox mutex poisoned")
            .entry(notification.recipient.clone())
            .or_default()
            .push(notification);
        Ok(())
    }

    fn for_recipient(&self, recipient: &FacultyId) -> Result<Vec<Notification>, NotificationError> {
        let guard = self.events.lock().expect("outbox mutex poisoned");
        Ok(guard.get(recipient).cloned().unwrap_or_default())
    }
}
