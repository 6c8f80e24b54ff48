//! End-to-end behavior of the registry facade: enrolment, reassignment, soft delete and
//! the faculty load aggregates that follow them.

mod common {
    use std::sync::Arc;

    use research_scholar::config::SupervisionConfig;
    use research_scholar::registry::{
        Designation, FacultyId, FacultyRegistration, MemoryOutbox, MemoryStore,
        NotificationOutbox, RegistryService, ScholarEnrollment,
    };

    pub(super) type Service = RegistryService<MemoryStore, MemoryOutbox>;

    pub(super) fn build_service() -> (Arc<Service>, Arc<MemoryStore>, Arc<MemoryOutbox>) {
        let store = Arc::new(MemoryStore::default());
        let outbox = Arc::new(MemoryOutbox::default());
        let service = Arc::new(RegistryService::new(
            store.clone(),
            outbox.clone(),
            SupervisionConfig::default(),
        ));
        (service, store, outbox)
    }

    pub(super) fn register<N: NotificationOutbox + 'static>(
        service: &RegistryService<MemoryStore, N>,
        code: &str,
        designation: Designation,
    ) -> FacultyId {
        service
            .register_faculty(FacultyRegistration {
                employee_code: code.to_string(),
                name: format!("Dr. {code}"),
                department: "cse".to_string(),
                designation,
                is_phd: true,
                publications: 12,
            })
            .expect("faculty registers")
            .member
            .id
    }

    pub(super) fn enrollment(
        suffix: &str,
        supervisor: Option<&FacultyId>,
        co_supervisor: Option<&FacultyId>,
    ) -> ScholarEnrollment {
        ScholarEnrollment {
            roll_number: format!("PHD-{suffix}"),
            registration_id: format!("REG-{suffix}"),
            email: format!("{suffix}@univ.edu"),
            name: format!("Scholar {suffix}"),
            department: "CSE".to_string(),
            research_area: Some("Distributed systems".to_string()),
            enrolled_on: None,
            supervisor_id: supervisor.cloned(),
            co_supervisor_id: co_supervisor.cloned(),
        }
    }
}

use common::*;
use research_scholar::registry::{
    Designation, DirectoryError, FacultyId, FacultyUpdate, MeetingRequest, Notification,
    NotificationError, NotificationKind, NotificationOutbox, RegistryError, ScholarFilter,
    ScholarUpdate,
};
use research_scholar::supervision::SAME_PERSON_ERROR;
use std::thread;

#[test]
fn enrolment_updates_faculty_aggregate_and_notifies() {
    let (service, _, outbox) = build_service();
    let lead = register(&service, "F-1", Designation::Professor);
    let co = register(&service, "F-2", Designation::AssociateProfessor);
    assert!(outbox.is_empty());

    let outcome = service
        .enroll_scholar(enrollment("001", Some(&lead), Some(&co)))
        .expect("enrolment accepted");
    assert!(outcome.warnings.is_empty());
    assert_eq!(outbox.len(), 2);

    let view = service.faculty(&lead).expect("faculty view");
    assert_eq!(view.member.summary.supervising, 1);
    assert_eq!(view.member.summary.remaining, 7);
    let view = service.faculty(&co).expect("faculty view");
    assert_eq!(view.member.summary.co_supervising, 1);

    let lead_notes = outbox.for_recipient(&lead).expect("notifications");
    assert_eq!(lead_notes.len(), 1);
    assert_eq!(lead_notes[0].kind, NotificationKind::SupervisorAssigned);
    let co_notes = outbox.for_recipient(&co).expect("notifications");
    assert_eq!(co_notes[0].kind, NotificationKind::CoSupervisorAssigned);
}

#[test]
fn enrolment_over_capacity_is_rejected_and_not_saved() {
    let (service, _, _) = build_service();
    let lead = register(&service, "F-1", Designation::AssistantProfessor);
    for index in 0..4 {
        service
            .enroll_scholar(enrollment(&format!("a{index}"), Some(&lead), None))
            .expect("under capacity");
    }

    match service.enroll_scholar(enrollment("a4", Some(&lead), None)) {
        Err(RegistryError::AssignmentRejected(decision)) => {
            assert!(!decision.overall_valid);
            assert!(decision.errors[0].contains("5/4"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }

    let scholars = service
        .list_scholars(&ScholarFilter::default())
        .expect("list");
    assert_eq!(scholars.len(), 4);
}

#[test]
fn last_slot_is_accepted_with_warning() {
    let (service, _, _) = build_service();
    let lead = register(&service, "F-1", Designation::AssociateProfessor);
    for index in 0..5 {
        service
            .enroll_scholar(enrollment(&format!("b{index}"), Some(&lead), None))
            .expect("under capacity");
    }

    let outcome = service
        .enroll_scholar(enrollment("b5", Some(&lead), None))
        .expect("sixth of six accepted");
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].contains("0 remaining"));
    assert_eq!(service.faculty(&lead).expect("view").member.summary.remaining, 0);
}

#[test]
fn unrelated_update_for_faculty_at_capacity_is_not_rejected() {
    let (service, _, _) = build_service();
    let lead = register(&service, "F-1", Designation::AssistantProfessor);
    let mut last = None;
    for index in 0..4 {
        last = Some(
            service
                .enroll_scholar(enrollment(&format!("c{index}"), Some(&lead), None))
                .expect("under capacity")
                .scholar
                .id,
        );
    }
    let scholar_id = last.expect("scholar enrolled");

    let outcome = service
        .update_scholar(
            &scholar_id,
            ScholarUpdate {
                research_area: Some("Formal methods".to_string()),
                supervisor_id: Some(lead.clone()),
                ..ScholarUpdate::default()
            },
        )
        .expect("no double counting");
    assert_eq!(outcome.scholar.research_area.as_deref(), Some("Formal methods"));
}

#[test]
fn reassignment_moves_load_between_faculty() {
    let (service, _, outbox) = build_service();
    let first = register(&service, "F-1", Designation::Professor);
    let second = register(&service, "F-2", Designation::Professor);
    let scholar = service
        .enroll_scholar(enrollment("d0", Some(&first), None))
        .expect("enrolled")
        .scholar;

    service
        .update_scholar(
            &scholar.id,
            ScholarUpdate {
                supervisor_id: Some(second.clone()),
                ..ScholarUpdate::default()
            },
        )
        .expect("reassigned");

    assert_eq!(service.faculty(&first).expect("view").member.summary.total, 0);
    assert_eq!(service.faculty(&second).expect("view").member.summary.total, 1);
    assert_eq!(outbox.for_recipient(&second).expect("notes").len(), 1);
}

#[test]
fn update_cannot_make_supervisor_and_co_supervisor_equal() {
    let (service, _, _) = build_service();
    let first = register(&service, "F-1", Designation::Professor);
    let second = register(&service, "F-2", Designation::Professor);
    let scholar = service
        .enroll_scholar(enrollment("e0", Some(&first), Some(&second)))
        .expect("enrolled")
        .scholar;

    match service.update_scholar(
        &scholar.id,
        ScholarUpdate {
            co_supervisor_id: Some(first.clone()),
            ..ScholarUpdate::default()
        },
    ) {
        Err(RegistryError::AssignmentRejected(decision)) => {
            assert!(decision.errors.contains(&SAME_PERSON_ERROR.to_string()));
        }
        other => panic!("expected same-person rejection, got {other:?}"),
    }
}

#[test]
fn deactivation_frees_capacity_and_reactivation_rechecks_it() {
    let (service, _, _) = build_service();
    let lead = register(&service, "F-1", Designation::AssistantProfessor);
    let mut ids = Vec::new();
    for index in 0..4 {
        ids.push(
            service
                .enroll_scholar(enrollment(&format!("f{index}"), Some(&lead), None))
                .expect("under capacity")
                .scholar
                .id,
        );
    }

    let retired = service.deactivate_scholar(&ids[0]).expect("deactivated");
    assert!(!retired.is_active);
    assert_eq!(service.faculty(&lead).expect("view").member.summary.total, 3);

    service
        .enroll_scholar(enrollment("f4", Some(&lead), None))
        .expect("slot freed");

    assert!(matches!(
        service.reactivate_scholar(&ids[0]),
        Err(RegistryError::AssignmentRejected(_))
    ));

    service.deactivate_scholar(&ids[1]).expect("deactivated");
    let outcome = service.reactivate_scholar(&ids[0]).expect("reactivated");
    assert!(outcome.scholar.is_active);
    assert_eq!(service.faculty(&lead).expect("view").member.summary.total, 4);
}

#[test]
fn demotion_recomputes_capacity_without_touching_assignments() {
    let (service, _, _) = build_service();
    let lead = register(&service, "F-1", Designation::Professor);
    for index in 0..5 {
        service
            .enroll_scholar(enrollment(&format!("g{index}"), Some(&lead), None))
            .expect("under capacity");
    }

    let view = service
        .update_faculty(
            &lead,
            FacultyUpdate {
                designation: Some(Designation::AssistantProfessor),
                ..FacultyUpdate::default()
            },
        )
        .expect("updated");
    assert_eq!(view.max_scholars, 4);
    assert_eq!(view.member.summary.total, 5);
    assert_eq!(view.member.summary.remaining, 0);
}

#[test]
fn duplicate_roll_number_conflicts() {
    let (service, _, _) = build_service();
    service
        .enroll_scholar(enrollment("h0", None, None))
        .expect("enrolled without supervisor");
    let mut duplicate = enrollment("h1", None, None);
    duplicate.roll_number = "PHD-h0".to_string();

    assert!(matches!(
        service.enroll_scholar(duplicate),
        Err(RegistryError::Directory(DirectoryError::Conflict(_)))
    ));
}

#[test]
fn meetings_are_recorded_for_active_scholars_only() {
    let (service, _, outbox) = build_service();
    let lead = register(&service, "F-1", Designation::Professor);
    let scholar = service
        .enroll_scholar(enrollment("m0", Some(&lead), None))
        .expect("enrolled")
        .scholar;
    let date = chrono::NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date");

    let meeting = service
        .schedule_meeting(
            &scholar.id,
            MeetingRequest {
                scheduled_for: date,
                agenda: "Progress review".to_string(),
                minutes_ref: None,
            },
        )
        .expect("scheduled");
    assert_eq!(meeting.scheduled_for, date);
    assert_eq!(service.meetings_for(&scholar.id).expect("list").len(), 1);
    assert!(outbox
        .for_recipient(&lead)
        .expect("notes")
        .iter()
        .any(|note| note.kind == NotificationKind::MeetingScheduled));

    service.deactivate_scholar(&scholar.id).expect("deactivated");
    assert!(matches!(
        service.schedule_meeting(
            &scholar.id,
            MeetingRequest {
                scheduled_for: date,
                agenda: "Follow-up".to_string(),
                minutes_ref: None,
            },
        ),
        Err(RegistryError::Validation(_))
    ));
}

#[test]
fn concurrent_enrolments_never_overshoot_capacity() {
    let (service, _, _) = build_service();
    let lead = register(&service, "F-1", Designation::Professor);
    for index in 0..7 {
        service
            .enroll_scholar(enrollment(&format!("r{index}"), Some(&lead), None))
            .expect("under capacity");
    }

    let handles: Vec<_> = (0..6)
        .map(|worker| {
            let service = service.clone();
            let lead = lead.clone();
            thread::spawn(move || {
                service
                    .enroll_scholar(enrollment(&format!("race{worker}"), Some(&lead), None))
                    .is_ok()
            })
        })
        .collect();

    let accepted = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker finishes"))
        .filter(|accepted| *accepted)
        .count();

    assert_eq!(accepted, 1);
    assert_eq!(service.faculty(&lead).expect("view").member.summary.total, 8);
}

struct OfflineOutbox;

impl NotificationOutbox for OfflineOutbox {
    fn publish(&self, _notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("mail relay offline".to_string()))
    }

    fn for_recipient(&self, _recipient: &FacultyId) -> Result<Vec<Notification>, NotificationError> {
        Err(NotificationError::Transport("mail relay offline".to_string()))
    }
}

#[test]
fn undeliverable_notifications_do_not_leave_aggregates_stale() {
    use research_scholar::config::SupervisionConfig;
    use research_scholar::registry::{MemoryStore, RegistryService, ScholarDirectory};
    use std::sync::Arc;

    let store = Arc::new(MemoryStore::default());
    let service = RegistryService::new(
        store.clone(),
        Arc::new(OfflineOutbox),
        SupervisionConfig::default(),
    );
    let lead = register(&service, "F-1", Designation::Professor);
    let second = register(&service, "F-2", Designation::Professor);

    let scholar = service
        .enroll_scholar(enrollment("n0", Some(&lead), None))
        .expect("enrolment succeeds without delivery")
        .scholar;
    assert_eq!(store.supervision_load(&lead).expect("load").total(), 1);
    assert_eq!(service.faculty(&lead).expect("view").member.summary.total, 1);

    service
        .update_scholar(
            &scholar.id,
            ScholarUpdate {
                supervisor_id: Some(second.clone()),
                ..ScholarUpdate::default()
            },
        )
        .expect("reassignment succeeds without delivery");
    assert_eq!(service.faculty(&lead).expect("view").member.summary.total, 0);
    assert_eq!(service.faculty(&second).expect("view").member.summary.total, 1);
}

#[test]
fn deactivation_racing_reassignment_keeps_aggregates_in_step() {
    use research_scholar::registry::ScholarDirectory;

    for round in 0..20 {
        let (service, store, _) = build_service();
        let first = register(&service, "F-1", Designation::Professor);
        let second = register(&service, "F-2", Designation::Professor);
        let scholar = service
            .enroll_scholar(enrollment(&format!("d{round}"), Some(&first), None))
            .expect("enrolled")
            .scholar;

        let mover = {
            let service = service.clone();
            let id = scholar.id.clone();
            let second = second.clone();
            thread::spawn(move || {
                service.update_scholar(
                    &id,
                    ScholarUpdate {
                        supervisor_id: Some(second),
                        ..ScholarUpdate::default()
                    },
                )
            })
        };
        service.deactivate_scholar(&scholar.id).expect("deactivated");
        mover.join().expect("mover finishes").expect("reassigned");

        for id in [&first, &second] {
            let live = store.supervision_load(id).expect("load").total();
            let stored = service.faculty(id).expect("view").member.summary.total;
            assert_eq!(stored, live, "aggregate for {id} after round {round}");
        }
    }
}
