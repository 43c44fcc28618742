//! End-to-end workflow tests over the in-memory store and a fake mail
//! transport, so the whole registration/approval/notification flow runs
//! without Postgres or an SMTP relay.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use campus_events_server::models::{
    EventType, NewEvent, NewFeedback, NotificationStatus, Role, SignUpRequest,
};
use campus_events_server::notify::{Dispatcher, MailError, MailTransport, OutgoingEmail};
use campus_events_server::policy::Actor;
use campus_events_server::store::{MemStore, Store};
use campus_events_server::workflow::{
    AddParticipantOutcome, CancelOutcome, RegisterOutcome, WorkflowError, WorkflowService,
};

#[derive(Default)]
struct FakeMailer {
    fail: AtomicBool,
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl FakeMailer {
    fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl MailTransport for FakeMailer {
    async fn deliver(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailError::Transport("smtp unreachable".into()));
        }
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}

struct TestApp {
    store: Arc<MemStore>,
    mailer: Arc<FakeMailer>,
    service: WorkflowService,
}

fn app() -> TestApp {
    let store = Arc::new(MemStore::new());
    let mailer = Arc::new(FakeMailer::default());
    let dispatcher = Dispatcher::new(store.clone(), mailer.clone());
    let service = WorkflowService::new(store.clone(), dispatcher);
    TestApp {
        store,
        mailer,
        service,
    }
}

async fn actor_with_role(
    store: &MemStore,
    username: &str,
    email: &str,
    role: Role,
    parent_email: Option<&str>,
) -> Actor {
    let user = store.seed_user(username, email, false).await;
    let profile = store
        .create_profile(user.id, role, parent_email.map(str::to_string))
        .await
        .unwrap();
    Actor {
        user,
        profile: Some(profile),
    }
}

async fn teacher(store: &MemStore) -> Actor {
    actor_with_role(store, "ms_frizzle", "frizzle@school.example", Role::Teacher, None).await
}

async fn student(store: &MemStore, username: &str, parent_email: Option<&str>) -> Actor {
    let email = format!("{username}@school.example");
    actor_with_role(store, username, &email, Role::Student, parent_email).await
}

async fn admin(store: &MemStore) -> Actor {
    let user = store.seed_user("principal", "principal@school.example", true).await;
    Actor {
        user,
        profile: None,
    }
}

fn start_time() -> DateTime<Utc> {
    "2026-05-12T14:00:00Z".parse().unwrap()
}

fn new_event(venue_id: Option<Uuid>) -> NewEvent {
    NewEvent {
        name: "Robotics Workshop".into(),
        event_type: EventType::Workshop,
        department: "Engineering".into(),
        date_time: start_time(),
        duration_hours: Decimal::from_str_exact("1.5").unwrap(),
        material: None,
        venue_id,
        coordinator_ids: vec![],
        target_groups: "Students".into(),
        registration_required: true,
        resources: String::new(),
    }
}

/// Creates an approved event in one step, as admin.
async fn approved_event(app: &TestApp, creator: &Actor, venue_id: Option<Uuid>) -> Uuid {
    let event = app.service.create_event(creator, new_event(venue_id)).await.unwrap();
    let admin = admin(&app.store).await;
    app.service.approve_event(&admin, event.id).await.unwrap();
    event.id
}

#[tokio::test]
async fn created_events_are_pending_and_attributed_to_the_teacher() {
    let app = app();
    let teacher = teacher(&app.store).await;

    let event = app.service.create_event(&teacher, new_event(None)).await.unwrap();

    assert!(!event.approved);
    assert_eq!(event.created_by, Some(teacher.user.id));
    // Pending queue shows it; the public listing does not.
    assert_eq!(app.service.list_pending_events(&teacher).await.unwrap().len(), 1);
    assert!(app.service.list_public_events().await.unwrap().is_empty());
}

#[tokio::test]
async fn only_teachers_create_events() {
    let app = app();
    let student = student(&app.store, "amara", None).await;

    let err = app.service.create_event(&student, new_event(None)).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));
}

#[tokio::test]
async fn duration_outside_bounds_is_rejected() {
    let app = app();
    let teacher = teacher(&app.store).await;

    let mut event = new_event(None);
    event.duration_hours = Decimal::from_str_exact("8.01").unwrap();
    let err = app.service.create_event(&teacher, event).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));

    let mut event = new_event(None);
    event.duration_hours = Decimal::from_str_exact("0.19").unwrap();
    let err = app.service.create_event(&teacher, event).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));
}

#[tokio::test]
async fn venue_and_start_time_pair_is_unique() {
    let app = app();
    let teacher = teacher(&app.store).await;
    let admin = admin(&app.store).await;
    let venue = app
        .service
        .create_venue(&admin, "Main Hall".into(), 100, "Building A".into())
        .await
        .unwrap();

    app.service.create_event(&teacher, new_event(Some(venue.id))).await.unwrap();
    let err = app
        .service
        .create_event(&teacher, new_event(Some(venue.id)))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));
}

#[tokio::test]
async fn approval_is_admin_only_and_idempotent() {
    let app = app();
    let teacher = teacher(&app.store).await;
    let event = app.service.create_event(&teacher, new_event(None)).await.unwrap();

    let err = app.service.approve_event(&teacher, event.id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));

    let admin = admin(&app.store).await;
    let first = app.service.approve_event(&admin, event.id).await.unwrap();
    assert!(first.approved);

    // Second approval: same observable result, no error.
    let second = app.service.approve_event(&admin, event.id).await.unwrap();
    assert!(second.approved);
    assert_eq!(app.service.list_public_events().await.unwrap().len(), 1);
}

#[tokio::test]
async fn pending_listing_is_gated() {
    let app = app();
    let student = student(&app.store, "amara", None).await;

    let err = app.service.list_pending_events(&student).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));
}

#[tokio::test]
async fn event_detail_lists_coordinators_and_viewer_registration() {
    let app = app();
    let teacher = teacher(&app.store).await;
    let aide = app.store.seed_user("aide", "aide@school.example", false).await;

    let mut request = new_event(None);
    request.coordinator_ids = vec![aide.id];
    let event = app.service.create_event(&teacher, request).await.unwrap();
    let admin = admin(&app.store).await;
    app.service.approve_event(&admin, event.id).await.unwrap();

    let student = student(&app.store, "amara", None).await;
    app.service.register(&student, event.id).await.unwrap();

    let detail = app.service.event_detail(event.id, Some(&student)).await.unwrap();
    assert_eq!(detail.coordinator_ids, vec![aide.id]);
    assert_eq!(detail.registrations.len(), 1);
    assert!(detail.viewer_registered);

    let anonymous = app.service.event_detail(event.id, None).await.unwrap();
    assert!(!anonymous.viewer_registered);
}

#[tokio::test]
async fn registering_twice_keeps_one_row_and_stays_a_non_error() {
    let app = app();
    let teacher = teacher(&app.store).await;
    let event_id = approved_event(&app, &teacher, None).await;
    let student = student(&app.store, "amara", None).await;

    let first = app.service.register(&student, event_id).await.unwrap();
    assert!(matches!(first, RegisterOutcome::Registered(_)));

    let second = app.service.register(&student, event_id).await.unwrap();
    assert!(matches!(second, RegisterOutcome::AlreadyRegistered));

    assert_eq!(app.store.registration_count(event_id).await.unwrap(), 1);
}

#[tokio::test]
async fn unapproved_events_are_invisible_to_registration() {
    let app = app();
    let teacher = teacher(&app.store).await;
    let event = app.service.create_event(&teacher, new_event(None)).await.unwrap();
    let student = student(&app.store, "amara", None).await;

    let err = app.service.register(&student, event.id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound(_)));
}

#[tokio::test]
async fn registration_is_student_only() {
    let app = app();
    let teacher = teacher(&app.store).await;
    let event_id = approved_event(&app, &teacher, None).await;

    let err = app.service.register(&teacher, event_id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));
}

#[tokio::test]
async fn capacity_is_enforced_at_the_venue_limit() {
    let app = app();
    let teacher = teacher(&app.store).await;
    let admin = admin(&app.store).await;
    let venue = app
        .service
        .create_venue(&admin, "Small Lab".into(), 2, "Building B".into())
        .await
        .unwrap();
    let event_id = approved_event(&app, &teacher, Some(venue.id)).await;

    let a = student(&app.store, "amara", Some("parent.a@family.example")).await;
    let b = student(&app.store, "bilal", None).await;
    let c = student(&app.store, "chen", None).await;

    assert!(matches!(
        app.service.register(&a, event_id).await.unwrap(),
        RegisterOutcome::Registered(_)
    ));
    assert!(matches!(
        app.service.register(&b, event_id).await.unwrap(),
        RegisterOutcome::Registered(_)
    ));

    let err = app.service.register(&c, event_id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::CapacityFull));
    assert_eq!(app.store.registration_count(event_id).await.unwrap(), 2);
}

#[tokio::test]
async fn reregistering_at_a_full_venue_stays_a_non_error() {
    let app = app();
    let teacher = teacher(&app.store).await;
    let admin = admin(&app.store).await;
    let venue = app
        .service
        .create_venue(&admin, "Tiny Room".into(), 1, "Building D".into())
        .await
        .unwrap();
    let event_id = approved_event(&app, &teacher, Some(venue.id)).await;
    let student = student(&app.store, "amara", None).await;

    assert!(matches!(
        app.service.register(&student, event_id).await.unwrap(),
        RegisterOutcome::Registered(_)
    ));

    // The venue is now full, but the same student coming back is a
    // duplicate, not a capacity rejection.
    assert!(matches!(
        app.service.register(&student, event_id).await.unwrap(),
        RegisterOutcome::AlreadyRegistered
    ));
    assert_eq!(app.store.registration_count(event_id).await.unwrap(), 1);
}

#[tokio::test]
async fn registration_sends_student_and_parent_notifications() {
    let app = app();
    let teacher = teacher(&app.store).await;
    let event_id = approved_event(&app, &teacher, None).await;
    let student = student(&app.store, "amara", Some("parent@family.example")).await;

    app.service.register(&student, event_id).await.unwrap();

    assert_eq!(app.mailer.sent_count().await, 2);
    let logs = app.store.list_notification_logs().await.unwrap();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|log| log.status == NotificationStatus::Sent));
    assert!(logs.iter().all(|log| log.event_id == Some(event_id)));
    assert!(logs
        .iter()
        .any(|log| log.to_emails == "amara@school.example"));
    assert!(logs.iter().any(|log| log.to_emails == "parent@family.example"));
}

#[tokio::test]
async fn delivery_failure_never_rolls_back_the_registration() {
    let app = app();
    let teacher = teacher(&app.store).await;
    let event_id = approved_event(&app, &teacher, None).await;
    let student = student(&app.store, "amara", Some("parent@family.example")).await;

    app.mailer.set_failing(true);
    let outcome = app.service.register(&student, event_id).await.unwrap();
    assert!(matches!(outcome, RegisterOutcome::Registered(_)));
    assert_eq!(app.store.registration_count(event_id).await.unwrap(), 1);

    // One failed audit row per attempt, error detail preserved.
    let logs = app.store.list_notification_logs().await.unwrap();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|log| log.status == NotificationStatus::Failed));
    assert!(logs.iter().all(|log| log.error.contains("smtp unreachable")));
}

#[tokio::test]
async fn students_without_emails_trigger_no_dispatch() {
    let app = app();
    let teacher = teacher(&app.store).await;
    let event_id = approved_event(&app, &teacher, None).await;

    let user = app.store.seed_user("quiet", "", false).await;
    let profile = app
        .store
        .create_profile(user.id, Role::Student, None)
        .await
        .unwrap();
    let student = Actor {
        user,
        profile: Some(profile),
    };

    app.service.register(&student, event_id).await.unwrap();
    assert!(app.store.list_notification_logs().await.unwrap().is_empty());
}

#[tokio::test]
async fn cancelling_without_a_registration_is_an_informational_noop() {
    let app = app();
    let teacher = teacher(&app.store).await;
    let event_id = approved_event(&app, &teacher, None).await;
    let student = student(&app.store, "amara", Some("parent@family.example")).await;

    let outcome = app.service.cancel_registration(&student, event_id).await.unwrap();
    assert!(matches!(outcome, CancelOutcome::NotRegistered));
    // No audit rows beyond what already existed.
    assert!(app.store.list_notification_logs().await.unwrap().is_empty());
}

#[tokio::test]
async fn cancellation_notifies_even_when_registration_notifications_failed() {
    let app = app();
    let teacher = teacher(&app.store).await;
    let event_id = approved_event(&app, &teacher, None).await;
    let student = student(&app.store, "amara", Some("parent@family.example")).await;

    app.mailer.set_failing(true);
    app.service.register(&student, event_id).await.unwrap();
    app.mailer.set_failing(false);

    let outcome = app.service.cancel_registration(&student, event_id).await.unwrap();
    assert!(matches!(outcome, CancelOutcome::Cancelled));
    assert_eq!(app.store.registration_count(event_id).await.unwrap(), 0);

    let logs = app.store.list_notification_logs().await.unwrap();
    assert_eq!(logs.len(), 4);
    let sent = logs
        .iter()
        .filter(|log| log.status == NotificationStatus::Sent)
        .count();
    let failed = logs
        .iter()
        .filter(|log| log.status == NotificationStatus::Failed)
        .count();
    assert_eq!((sent, failed), (2, 2));
}

#[tokio::test]
async fn feedback_is_one_per_student_per_event() {
    let app = app();
    let teacher = teacher(&app.store).await;
    let event_id = approved_event(&app, &teacher, None).await;
    let student = student(&app.store, "amara", Some("parent@family.example")).await;

    let feedback = NewFeedback {
        rating: 5,
        comments: "Loved the robots.".into(),
    };
    app.service.submit_feedback(&student, event_id, feedback).await.unwrap();

    let second = NewFeedback {
        rating: 1,
        comments: "Changed my mind.".into(),
    };
    let err = app
        .service
        .submit_feedback(&student, event_id, second)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::DuplicateFeedback));
    assert_eq!(app.store.feedback_for_event(event_id).await.unwrap().len(), 1);

    // The parent heard about it exactly once.
    let logs = app.store.list_notification_logs().await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].to_emails, "parent@family.example");
}

#[tokio::test]
async fn feedback_rating_must_be_in_range() {
    let app = app();
    let teacher = teacher(&app.store).await;
    let event_id = approved_event(&app, &teacher, None).await;
    let student = student(&app.store, "amara", None).await;

    let err = app
        .service
        .submit_feedback(
            &student,
            event_id,
            NewFeedback {
                rating: 6,
                comments: "off the chart".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));
    assert!(app.store.feedback_for_event(event_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn teachers_manage_participants_on_their_own_events_only() {
    let app = app();
    let owner = teacher(&app.store).await;
    let event_id = approved_event(&app, &owner, None).await;
    let student = student(&app.store, "amara", None).await;

    // Another teacher cannot touch the participant list.
    let other =
        actor_with_role(&app.store, "mr_keating", "keating@school.example", Role::Teacher, None)
            .await;
    let err = app
        .service
        .add_participant(&other, event_id, "amara")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound(_)));

    // Owner adds by username; no notification goes out on this path.
    let (outcome, added) = app.service.add_participant(&owner, event_id, "amara").await.unwrap();
    assert!(matches!(outcome, AddParticipantOutcome::Added(_)));
    assert_eq!(added.username, "amara");
    assert_eq!(app.store.registration_count(event_id).await.unwrap(), 1);
    assert!(app.store.list_notification_logs().await.unwrap().is_empty());

    // Adding the same student again keeps one row and is not an error.
    let (outcome, _) = app.service.add_participant(&owner, event_id, "amara").await.unwrap();
    assert!(matches!(outcome, AddParticipantOutcome::AlreadyRegistered));
    assert_eq!(app.store.registration_count(event_id).await.unwrap(), 1);

    // Blank and unknown usernames are rejected before any write.
    let err = app.service.add_participant(&owner, event_id, "  ").await.unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));
    let err = app
        .service
        .add_participant(&owner, event_id, "nobody")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound(_)));

    // Removal deletes the row; removing again is a silent no-op.
    app.service
        .remove_participant(&owner, event_id, student.user.id)
        .await
        .unwrap();
    assert_eq!(app.store.registration_count(event_id).await.unwrap(), 0);
    app.service
        .remove_participant(&owner, event_id, student.user.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn full_capacity_scenario_with_approval_and_notifications() {
    let app = app();
    let teacher = teacher(&app.store).await;
    let admin = admin(&app.store).await;
    let venue = app
        .service
        .create_venue(&admin, "Lecture Hall".into(), 2, "Building C".into())
        .await
        .unwrap();

    let event = app
        .service
        .create_event(&teacher, new_event(Some(venue.id)))
        .await
        .unwrap();
    app.service.approve_event(&admin, event.id).await.unwrap();

    let a = student(&app.store, "amara", Some("parent.a@family.example")).await;
    let b = student(&app.store, "bilal", None).await;
    let c = student(&app.store, "chen", None).await;

    app.service.register(&a, event.id).await.unwrap();
    assert_eq!(app.store.registration_count(event.id).await.unwrap(), 1);
    // Student A has both an email and a parent email: two attempts.
    assert_eq!(app.store.list_notification_logs().await.unwrap().len(), 2);

    app.service.register(&b, event.id).await.unwrap();
    assert_eq!(app.store.registration_count(event.id).await.unwrap(), 2);

    let err = app.service.register(&c, event.id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::CapacityFull));
    assert_eq!(app.store.registration_count(event.id).await.unwrap(), 2);
}

#[tokio::test]
async fn sign_up_creates_profile_and_session() {
    let app = app();
    let (user, session) = app
        .service
        .sign_up(SignUpRequest {
            username: "amara".into(),
            email: "amara@school.example".into(),
            password: "correct horse battery".into(),
            role: Role::Student,
            parent_email: Some("parent@family.example".into()),
        })
        .await
        .unwrap();

    assert_eq!(session.user_id, user.id);
    let profile = app.store.profile_for_user(user.id).await.unwrap().unwrap();
    assert_eq!(profile.role, Role::Student);
    assert_eq!(profile.parent_email.as_deref(), Some("parent@family.example"));

    // The session authenticates immediately.
    let signed_in = app.store.session_user(session.token).await.unwrap().unwrap();
    assert_eq!(signed_in.id, user.id);

    // And the credentials round-trip through login.
    let (again, _) = app.service.login("amara", "correct horse battery").await.unwrap();
    assert_eq!(again.id, user.id);
    let err = app.service.login("amara", "wrong").await.unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));
}

#[tokio::test]
async fn duplicate_usernames_are_rejected_at_sign_up() {
    let app = app();
    let request = || SignUpRequest {
        username: "amara".into(),
        email: "amara@school.example".into(),
        password: "correct horse battery".into(),
        role: Role::Student,
        parent_email: None,
    };
    app.service.sign_up(request()).await.unwrap();
    let err = app.service.sign_up(request()).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));
}
