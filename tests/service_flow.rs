use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use civic_intake::{
    assistant::{self, ReplyKind},
    clock::{ManualClock, SystemClock},
    error::{IntakeError, Result},
    models::{Attachment, Category, Department, FieldManager, NewComplaint, Status, StatusUpdate, TagFacet},
    notify::RecordingNotifier,
    service::{ComplaintFilter, ComplaintService},
    store::{CollectionStore, MemoryStore, FIELD_MANAGERS},
};

struct Harness {
    service: ComplaintService,
    clock: Arc<ManualClock>,
    notifier: Arc<RecordingNotifier>,
}

fn harness() -> Harness {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 28, 9, 0, 0).unwrap()));
    let notifier = Arc::new(RecordingNotifier::new());
    let service = ComplaintService::new(Arc::new(MemoryStore::new()), notifier.clone(), clock.clone());
    Harness { service, clock, notifier }
}

fn text(description: &str) -> NewComplaint {
    NewComplaint {
        description: description.into(),
        ..NewComplaint::default()
    }
}

fn proof() -> Attachment {
    Attachment {
        name: "done.jpg".into(),
        content_type: Some("image/jpeg".into()),
        uploaded_by: Some("field002".into()),
        uploaded_at: None,
    }
}

fn resolution(remarks: &str, attachments: Vec<Attachment>) -> StatusUpdate {
    StatusUpdate {
        status: Status::Resolved,
        note: None,
        author: Some("field002".into()),
        remarks: Some(remarks.into()),
        attachments,
    }
}

async fn workload_of(service: &ComplaintService, id: &str) -> u32 {
    service
        .field_managers()
        .await
        .unwrap()
        .into_iter()
        .find(|m| m.id == id)
        .map(|m| m.workload)
        .unwrap()
}

#[tokio::test]
async fn urgent_pothole_is_classified_tagged_and_escalated() {
    let h = harness();
    h.service.seed_demo_managers().await.unwrap();

    let c = h
        .service
        .submit(text("There is a big pothole on the road causing accidents, very urgent!"))
        .await
        .unwrap();

    assert_eq!(c.category, Category::Pothole);
    assert_eq!(c.status, Status::Escalated);
    assert!(c.tags.urgency.contains("critical"));
    assert_eq!(c.tags.category.iter().collect::<Vec<_>>(), vec!["pothole"]);
    assert!(c.assigned_to.is_none());
    assert_eq!(
        h.notifier.statuses_for(&c.id),
        vec![Status::Submitted, Status::Escalated]
    );
    // escalation does not consume routing capacity
    assert_eq!(workload_of(&h.service, "field002").await, 2);
}

#[tokio::test]
async fn cctv_without_security_staff_stays_submitted() {
    let h = harness();
    h.service.seed_demo_managers().await.unwrap();

    let c = h.service.submit(text("CCTV camera is offline")).await.unwrap();
    assert_eq!(c.category, Category::Cctv);
    assert_eq!(c.status, Status::Submitted);
    assert!(c.assigned_to.is_none());

    let err = h.service.assign(&c.id, None, "officer").await.unwrap_err();
    assert!(matches!(err, IntakeError::RoutingFailure { category: Category::Cctv }));
    assert_eq!(h.service.get(&c.id).await.unwrap().status, Status::Submitted);
}

#[tokio::test]
async fn routine_complaint_goes_to_least_busy_manager() {
    let h = harness();
    h.service.seed_demo_managers().await.unwrap();
    h.service
        .register_field_manager(FieldManager {
            id: "field005".into(),
            name: "Anil Rao".into(),
            department: Department::RoadMaintenance,
            area: "Kondapur".into(),
            workload: 0,
            active: true,
        })
        .await
        .unwrap();

    let c = h.service.submit(text("crack in the road")).await.unwrap();
    assert_eq!(c.status, Status::Assigned);
    assert_eq!(c.assigned_to.as_deref(), Some("field005"));
    assert_eq!(workload_of(&h.service, "field005").await, 1);
}

#[tokio::test]
async fn empty_description_is_rejected() {
    let h = harness();
    let err = h.service.submit(text("   ")).await.unwrap_err();
    assert!(matches!(err, IntakeError::Validation(_)));

    let err = h.service.submit(text("hello there")).await.unwrap_err();
    assert!(matches!(err, IntakeError::Validation(_)));
    assert!(h.service.list(&ComplaintFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn explicit_category_overrides_classifier() {
    let h = harness();
    let c = h
        .service
        .submit(NewComplaint {
            category: Some(Category::Incident),
            description: "tree fell on a car".into(),
            ..NewComplaint::default()
        })
        .await
        .unwrap();
    assert_eq!(c.category, Category::Incident);
    assert_eq!(c.status, Status::Submitted);
}

#[tokio::test]
async fn resolve_requires_remarks_and_proof_and_releases_workload() {
    let h = harness();
    h.service.seed_demo_managers().await.unwrap();
    let c = h.service.submit(text("crack in the road")).await.unwrap();
    assert_eq!(c.assigned_to.as_deref(), Some("field002"));
    assert_eq!(workload_of(&h.service, "field002").await, 3);

    h.service
        .update_status(&c.id, StatusUpdate::to(Status::InProgress))
        .await
        .unwrap();

    let err = h
        .service
        .update_status(&c.id, resolution("", vec![proof()]))
        .await
        .unwrap_err();
    assert!(matches!(err, IntakeError::Validation(_)));

    let err = h
        .service
        .update_status(&c.id, resolution("patched", vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, IntakeError::Validation(_)));
    assert_eq!(h.service.get(&c.id).await.unwrap().status, Status::InProgress);

    h.clock.advance(Duration::hours(3));
    let done = h
        .service
        .update_status(&c.id, resolution("patched", vec![proof()]))
        .await
        .unwrap();
    assert_eq!(done.status, Status::Resolved);
    assert_eq!(workload_of(&h.service, "field002").await, 2);

    let stats = h.service.statistics().await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.by_status.get("resolved"), Some(&1));
    assert_eq!(stats.by_department.get("road-maintenance"), Some(&1));
    assert_eq!(stats.avg_resolution_hours, Some(3.0));
}

#[tokio::test]
async fn reassignment_moves_workload() {
    let h = harness();
    h.service.seed_demo_managers().await.unwrap();
    let c = h.service.submit(text("crack in the road")).await.unwrap();

    let moved = h.service.assign(&c.id, Some("field004"), "officer").await.unwrap();
    assert_eq!(moved.assigned_to.as_deref(), Some("field004"));
    assert_eq!(workload_of(&h.service, "field002").await, 2);
    assert_eq!(workload_of(&h.service, "field004").await, 2);

    let err = h.service.assign(&c.id, Some("nobody"), "officer").await.unwrap_err();
    assert!(matches!(err, IntakeError::NotFound { .. }));
}

#[tokio::test]
async fn sweep_escalates_stale_complaints_only() {
    let h = harness();
    let stale = h.service.submit(text("CCTV camera is offline")).await.unwrap();
    h.clock.advance(Duration::hours(20));
    let fresh = h.service.submit(text("fogging needed, mosquito menace")).await.unwrap();

    assert!(h.service.sweep_escalations().await.unwrap().is_empty());

    h.clock.advance(Duration::hours(5));
    let escalated = h.service.sweep_escalations().await.unwrap();
    assert_eq!(escalated, vec![stale.id.clone()]);

    let stale = h.service.get(&stale.id).await.unwrap();
    assert_eq!(stale.status, Status::Escalated);
    assert_eq!(stale.escalation_reason.as_deref(), Some("Auto-escalated based on criteria"));
    assert_eq!(h.service.get(&fresh.id).await.unwrap().status, Status::Submitted);

    // terminal complaints are left alone
    assert!(h.service.sweep_escalations().await.unwrap().is_empty());
}

#[tokio::test]
async fn custom_tags_and_lookup() {
    let h = harness();
    let c = h.service.submit(text("garbage near Madhapur market")).await.unwrap();

    assert!(h.service.add_tag(&c.id, TagFacet::Custom, "market").await.unwrap());
    assert!(!h.service.add_tag(&c.id, TagFacet::Custom, "market").await.unwrap());

    let by_custom = h.service.find_by_tag("market", Some(TagFacet::Custom)).await.unwrap();
    assert_eq!(by_custom.len(), 1);
    let by_location = h.service.find_by_tag("madhapur", None).await.unwrap();
    assert_eq!(by_location.len(), 1);
    assert!(h
        .service
        .find_by_tag("madhapur", Some(TagFacet::Custom))
        .await
        .unwrap()
        .is_empty());

    assert!(h.service.remove_tag(&c.id, TagFacet::Custom, "market").await.unwrap());
    assert!(!h.service.remove_tag(&c.id, TagFacet::Custom, "market").await.unwrap());
}

#[tokio::test]
async fn ids_are_unique_within_the_same_millisecond() {
    let h = harness();
    let a = h.service.submit(text("garbage pile")).await.unwrap();
    let b = h.service.submit(text("garbage pile again")).await.unwrap();
    assert_ne!(a.id, b.id);
    assert!(a.id.starts_with("IALA") && a.id.len() == 11);
}

#[tokio::test]
async fn notes_are_appended_in_order() {
    let h = harness();
    let c = h.service.submit(text("garbage pile")).await.unwrap();
    h.service.add_note(&c.id, "crew on the way", "officer").await.unwrap();
    let c = h.service.add_note(&c.id, "bins cleared", "field003").await.unwrap();
    let texts: Vec<_> = c.notes.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(texts, vec!["Complaint submitted", "crew on the way", "bins cleared"]);

    let err = h.service.add_note("IALA0000000", "x", "y").await.unwrap_err();
    assert!(matches!(err, IntakeError::NotFound { .. }));
}

#[tokio::test]
async fn resolve_ignores_photos_from_earlier_updates() {
    let h = harness();
    h.service.seed_demo_managers().await.unwrap();
    let c = h.service.submit(text("crack in the road")).await.unwrap();

    let mut start = StatusUpdate::to(Status::InProgress);
    start.attachments.push(Attachment {
        name: "before.jpg".into(),
        ..proof()
    });
    h.service.update_status(&c.id, start).await.unwrap();

    let err = h
        .service
        .update_status(&c.id, resolution("patched", vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, IntakeError::Validation(_)));

    let pdf = Attachment {
        name: "invoice.pdf".into(),
        content_type: Some("application/pdf".into()),
        ..proof()
    };
    let err = h
        .service
        .update_status(&c.id, resolution("patched", vec![pdf]))
        .await
        .unwrap_err();
    assert!(matches!(err, IntakeError::Validation(_)));
    assert_eq!(h.service.get(&c.id).await.unwrap().status, Status::InProgress);
}

#[tokio::test]
async fn complaint_outside_every_crew_area_stays_submitted() {
    let h = harness();
    h.service.seed_demo_managers().await.unwrap();

    let c = h
        .service
        .submit(NewComplaint {
            description: "crack in the road".into(),
            location: Some("Kondapur main road".into()),
            ..NewComplaint::default()
        })
        .await
        .unwrap();

    assert_eq!(c.status, Status::Submitted);
    assert!(c.assigned_to.is_none());
    assert_eq!(workload_of(&h.service, "field002").await, 2);
}

#[tokio::test]
async fn tracking_lists_only_the_senders_complaints() {
    let h = harness();
    let mine = h
        .service
        .submit(NewComplaint {
            description: "garbage pile".into(),
            submitted_by: Some("ravi".into()),
            ..NewComplaint::default()
        })
        .await
        .unwrap();
    h.service
        .submit(NewComplaint {
            description: "garbage on my street".into(),
            submitted_by: Some("meena".into()),
            ..NewComplaint::default()
        })
        .await
        .unwrap();

    let reply = assistant::respond(&h.service, "track my complaints", Some("ravi".into()))
        .await
        .unwrap();
    assert_eq!(reply.kind, ReplyKind::Tracking);
    let ids: Vec<_> = reply.complaints.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec![mine.id.as_str()]);

    let anonymous = assistant::respond(&h.service, "track my complaints", None).await.unwrap();
    assert_eq!(anonymous.kind, ReplyKind::Tracking);
    assert!(anonymous.complaints.is_empty());
}

/// Memory store whose field-manager writes can be made to fail.
struct FlakyManagers {
    inner: MemoryStore,
    fail: AtomicBool,
}

#[async_trait]
impl CollectionStore for FlakyManagers {
    async fn get(&self, collection: &str) -> Result<Vec<serde_json::Value>> {
        self.inner.get(collection).await
    }

    async fn put(&self, collection: &str, records: Vec<serde_json::Value>) -> Result<()> {
        if collection == FIELD_MANAGERS && self.fail.load(Ordering::SeqCst) {
            return Err(IntakeError::Store("field manager write rejected".into()));
        }
        self.inner.put(collection, records).await
    }
}

#[tokio::test]
async fn resolve_succeeds_when_workload_release_fails() {
    let store = Arc::new(FlakyManagers {
        inner: MemoryStore::new(),
        fail: AtomicBool::new(false),
    });
    let notifier = Arc::new(RecordingNotifier::new());
    let service = ComplaintService::new(store.clone(), notifier.clone(), Arc::new(SystemClock));
    service.seed_demo_managers().await.unwrap();

    let c = service.submit(text("crack in the road")).await.unwrap();
    service
        .update_status(&c.id, StatusUpdate::to(Status::InProgress))
        .await
        .unwrap();

    store.fail.store(true, Ordering::SeqCst);
    let done = service
        .update_status(&c.id, resolution("patched", vec![proof()]))
        .await
        .unwrap();

    assert_eq!(done.status, Status::Resolved);
    assert_eq!(service.get(&c.id).await.unwrap().status, Status::Resolved);
    assert_eq!(notifier.statuses_for(&c.id).last(), Some(&Status::Resolved));
}
