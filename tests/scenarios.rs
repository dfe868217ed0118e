//! End-to-end review workflow scenarios against the in-memory stores.

use chrono::{Duration, Utc};
use serde_json::json;
use statekeeper::builder::{DefinitionBuilder, StateMachineBuilder};
use statekeeper::checkpoint::StoreCheckpoint;
use statekeeper::core::{Actor, Attributes, TransitionTable};
use statekeeper::effects::{HookPhase, StateMachine, TransitionError, TransitionOutcome};
use statekeeper::state_enum;
use statekeeper::store::{
    FixedIdentity, MemoryEntity, MemoryHistoryStore, MemoryPendingStore, MemoryTable,
    PendingStore, PersistError, StatefulEntity,
};
use statekeeper::validation::{RulesBuilder, TransitionContext};
use std::collections::BTreeMap;
use std::sync::Arc;

state_enum! {
    enum Status {
        Draft = "draft",
        Submitted = "submitted",
        Approved = "approved",
        Rejected = "rejected",
    }
}

type Document = MemoryEntity<Status>;

fn review_definition(
    record_history: bool,
) -> DefinitionBuilder<Status, Document> {
    DefinitionBuilder::new()
        .allow(Status::Draft, [Status::Submitted])
        .allow(Status::Submitted, [Status::Approved, Status::Rejected])
        .default_state(Status::Draft)
        .record_history(record_history)
}

struct Workflow {
    machine: StateMachine<Status, Document>,
    documents: MemoryTable<Status>,
    history: MemoryHistoryStore<Status>,
    pending: MemoryPendingStore<Status>,
}

fn workflow(definition: DefinitionBuilder<Status, Document>) -> Workflow {
    let history = MemoryHistoryStore::new();
    let pending = MemoryPendingStore::new();
    let machine = StateMachineBuilder::<Status, Document>::new()
        .field("status")
        .definition(definition.build().unwrap())
        .history_store(Arc::new(history.clone()))
        .pending_store(Arc::new(pending.clone()))
        .build()
        .unwrap();

    Workflow {
        machine,
        documents: MemoryTable::new("document"),
        history,
        pending,
    }
}

impl Workflow {
    fn document(&self, id: &str, state: Status) -> Document {
        let mut fields = BTreeMap::new();
        fields.insert("status".to_string(), state);
        self.documents.insert(id, fields, Attributes::new())
    }
}

fn props(pairs: &[(&str, serde_json::Value)]) -> Attributes {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

#[test]
fn submitting_a_draft_records_history() {
    let flow = workflow(review_definition(true));
    let mut doc = flow.document("1", Status::Draft);
    doc.set_attribute("title", json!("Quarterly report"));

    let reviewer = Actor::new("user", "42");
    let outcome = flow
        .machine
        .transition_to(
            &mut doc,
            &Status::Draft,
            &Status::Submitted,
            props(&[("comments", json!("ready for review"))]),
            Some(reviewer.clone()),
        )
        .unwrap();

    let record = match outcome {
        TransitionOutcome::Committed {
            history: Some(record),
            cancelled: 0,
        } => record,
        other => panic!("unexpected outcome: {other:?}"),
    };
    assert_eq!(record.from, Status::Draft);
    assert_eq!(record.to, Status::Submitted);
    assert_eq!(record.responsible, Some(reviewer));
    assert_eq!(record.custom_property("comments"), Some(&json!("ready for review")));
    assert_eq!(record.changed_attribute("title"), Some(&json!("Quarterly report")));
    assert!(record.changed_attribute("status").is_none());

    assert_eq!(flow.documents.persisted("1", "status"), Some(Status::Submitted));
    assert_eq!(flow.history.len(), 1);
    assert!(flow.machine.was(&doc, &Status::Submitted).unwrap());
}

#[test]
fn commit_cancels_postponed_transition() {
    let flow = workflow(review_definition(true));
    let mut doc = flow.document("1", Status::Submitted);

    let scheduled = flow
        .machine
        .postpone_transition_to(
            &doc,
            &Status::Submitted,
            &Status::Rejected,
            Utc::now() + Duration::days(7),
            Attributes::new(),
            None,
        )
        .unwrap();
    assert!(scheduled.is_some());
    assert!(flow.machine.has_pending_transitions(&doc).unwrap());

    flow.machine
        .transition_to(
            &mut doc,
            &Status::Submitted,
            &Status::Approved,
            Attributes::new(),
            None,
        )
        .unwrap();

    assert!(!flow.machine.has_pending_transitions(&doc).unwrap());
    assert!(flow.machine.pending_transitions(&doc).unwrap().is_empty());
}

#[test]
fn skipping_review_is_not_allowed() {
    let flow = workflow(review_definition(true));
    let mut doc = flow.document("1", Status::Draft);

    let err = flow
        .machine
        .transition_to(
            &mut doc,
            &Status::Draft,
            &Status::Approved,
            Attributes::new(),
            None,
        )
        .unwrap_err();

    assert!(matches!(err, TransitionError::NotAllowed { .. }));
    assert_eq!(err.to_string(), "Transition from 'draft' to 'approved' is not allowed");
    assert_eq!(flow.machine.current_state(&doc), Some(Status::Draft));
    assert_eq!(flow.documents.persisted("1", "status"), Some(Status::Draft));
    assert!(flow.history.is_empty());
}

#[test]
fn postponing_to_current_state_is_a_noop() {
    let flow = workflow(review_definition(true));
    let doc = flow.document("1", Status::Approved);

    let scheduled = flow
        .machine
        .postpone_transition_to(
            &doc,
            &Status::Submitted,
            &Status::Approved,
            Utc::now() + Duration::hours(1),
            Attributes::new(),
            None,
        )
        .unwrap();

    assert!(scheduled.is_none());
    assert!(flow.pending.is_empty());
}

#[test]
fn disabled_history_records_nothing() {
    let flow = workflow(review_definition(false));
    let mut doc = flow.document("1", Status::Draft);

    let outcome = flow
        .machine
        .transition_to(
            &mut doc,
            &Status::Draft,
            &Status::Submitted,
            Attributes::new(),
            None,
        )
        .unwrap();

    assert_eq!(
        outcome,
        TransitionOutcome::Committed {
            history: None,
            cancelled: 0
        }
    );
    assert_eq!(flow.documents.persisted("1", "status"), Some(Status::Submitted));
    assert!(flow.machine.history(&doc).unwrap().is_empty());
}

#[test]
fn racing_handles_commit_exactly_once() {
    let flow = workflow(review_definition(true));
    let mut first = flow.document("1", Status::Submitted);
    let mut second = flow.documents.load("1").unwrap();

    let approved = flow.machine.transition_to(
        &mut first,
        &Status::Submitted,
        &Status::Approved,
        Attributes::new(),
        None,
    );
    let rejected = flow.machine.transition_to(
        &mut second,
        &Status::Submitted,
        &Status::Rejected,
        Attributes::new(),
        None,
    );

    assert!(approved.unwrap().is_committed());
    assert!(matches!(
        rejected,
        Err(TransitionError::Persist(PersistError::Conflict { .. }))
    ));
    assert_eq!(second.get("status"), Some(Status::Submitted));
    assert_eq!(flow.documents.persisted("1", "status"), Some(Status::Approved));
    assert_eq!(flow.history.len(), 1);
}

#[test]
fn fresh_document_starts_in_default_state() {
    let flow = workflow(review_definition(true));
    let mut doc = flow.documents.insert("1", BTreeMap::new(), Attributes::new());

    assert_eq!(flow.machine.current_state(&doc), None);
    assert!(flow.machine.valid_transitions(&doc, None).is_empty());

    assert_eq!(flow.machine.initialize(&mut doc), Some(Status::Draft));
    assert_eq!(
        flow.machine.valid_transitions(&doc, None),
        vec![Status::Submitted]
    );
    assert_eq!(flow.documents.persisted("1", "status"), None);

    let outcome = flow
        .machine
        .transition_to(
            &mut doc,
            &Status::Draft,
            &Status::Submitted,
            Attributes::new(),
            None,
        )
        .unwrap();

    assert!(outcome.is_committed());
    assert_eq!(flow.documents.persisted("1", "status"), Some(Status::Submitted));
    assert_eq!(doc.loaded("status"), Some(Status::Submitted));
    assert_eq!(flow.machine.times_was(&doc, &Status::Submitted).unwrap(), 1);
}

#[test]
fn validation_failures_are_all_reported() {
    let rules = RulesBuilder::<Status, Document>::new()
        .require_field(
            "title",
            |ctx: &TransitionContext<'_, Status, Document>| ctx.entity.attribute("title").is_some(),
            "is required",
        )
        .require_field(
            "pages",
            |ctx: &TransitionContext<'_, Status, Document>| ctx.entity.attribute("pages").is_some(),
            "is required",
        )
        .build();
    let flow = workflow(review_definition(true).validate_transition(
        Status::Draft,
        Status::Submitted,
        rules,
    ));
    let mut doc = flow.document("1", Status::Draft);

    let err = flow
        .machine
        .transition_to(
            &mut doc,
            &Status::Draft,
            &Status::Submitted,
            Attributes::new(),
            None,
        )
        .unwrap_err();

    let errors = err.validation_errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].field.as_deref(), Some("title"));
    assert_eq!(flow.documents.persisted("1", "status"), Some(Status::Draft));
    assert!(flow.history.is_empty());

    doc.set_attribute("title", json!("Report"));
    doc.set_attribute("pages", json!(12));
    assert!(flow
        .machine
        .transition_to(
            &mut doc,
            &Status::Draft,
            &Status::Submitted,
            Attributes::new(),
            None,
        )
        .unwrap()
        .is_committed());
}

#[test]
fn failing_after_hook_reports_committed_change() {
    let flow = workflow(
        review_definition(true)
            .after(Status::Submitted, |_, _, _| anyhow::bail!("mailer offline")),
    );
    let mut doc = flow.document("1", Status::Draft);
    flow.machine
        .postpone_transition_to(
            &doc,
            &Status::Draft,
            &Status::Submitted,
            Utc::now() + Duration::hours(1),
            Attributes::new(),
            None,
        )
        .unwrap();

    let err = flow
        .machine
        .transition_to(
            &mut doc,
            &Status::Draft,
            &Status::Submitted,
            Attributes::new(),
            None,
        )
        .unwrap_err();

    assert!(matches!(
        err,
        TransitionError::Hook {
            phase: HookPhase::After,
            ..
        }
    ));
    assert!(err.committed());
    assert_eq!(flow.documents.persisted("1", "status"), Some(Status::Submitted));
    assert_eq!(flow.history.len(), 1);
    assert!(flow.machine.has_pending_transitions(&doc).unwrap());

    assert_eq!(flow.machine.cancel_all_pending_transitions(&doc).unwrap(), 1);
    assert!(!flow.machine.has_pending_transitions(&doc).unwrap());
}

#[test]
fn role_tables_follow_the_identity_provider() {
    let definition = DefinitionBuilder::<Status, Document>::new()
        .resolver(|actor| {
            let table = TransitionTable::new().allow(Status::Draft, [Status::Submitted]);
            match actor {
                Some(actor) if actor.kind == "editor" => {
                    table.allow(Status::Submitted, [Status::Approved, Status::Rejected])
                }
                _ => table,
            }
        })
        .record_history(true)
        .build()
        .unwrap();
    let history = MemoryHistoryStore::new();
    let machine = StateMachineBuilder::<Status, Document>::new()
        .field("status")
        .definition(definition)
        .history_store(Arc::new(history.clone()))
        .identity(Arc::new(FixedIdentity(Actor::new("editor", "7"))))
        .build()
        .unwrap();

    let documents = MemoryTable::new("document");
    let mut fields = BTreeMap::new();
    fields.insert("status".to_string(), Status::Submitted);
    let mut doc = documents.insert("1", fields, Attributes::new());

    assert!(!machine.can_be(&Status::Submitted, &Status::Approved, None));
    assert_eq!(
        machine.valid_transitions(&doc, None),
        vec![Status::Approved, Status::Rejected]
    );

    machine
        .transition_to(
            &mut doc,
            &Status::Submitted,
            &Status::Approved,
            Attributes::new(),
            None,
        )
        .unwrap();

    let records = history.records();
    assert_eq!(records[0].responsible, Some(Actor::new("editor", "7")));
}

#[test]
fn scheduler_applies_due_transitions() {
    let flow = workflow(review_definition(true));
    let mut doc = flow.document("1", Status::Submitted);
    let now = Utc::now();

    flow.machine
        .postpone_transition_to(
            &doc,
            &Status::Submitted,
            &Status::Approved,
            now - Duration::minutes(1),
            props(&[("reason", json!("auto-approve"))]),
            Some(Actor::new("scheduler", "cron")),
        )
        .unwrap();

    let due = flow.pending.due(now).unwrap();
    assert_eq!(due.len(), 1);

    let outcome = flow
        .machine
        .apply_pending_transition(&mut doc, &due[0])
        .unwrap();

    assert!(outcome.is_committed());
    assert_eq!(flow.documents.persisted("1", "status"), Some(Status::Approved));
    let record = flow
        .machine
        .snapshot_when(&doc, &Status::Approved)
        .unwrap()
        .unwrap();
    assert_eq!(record.custom_property("reason"), Some(&json!("auto-approve")));
    assert_eq!(record.responsible, Some(Actor::new("scheduler", "cron")));
    assert!(flow.pending.due(now).unwrap().is_empty());
}

#[test]
fn pending_transition_for_another_document_is_rejected() {
    let flow = workflow(review_definition(true));
    let first = flow.document("1", Status::Submitted);
    let mut second = flow.document("2", Status::Submitted);

    let scheduled = flow
        .machine
        .postpone_transition_to(
            &first,
            &Status::Submitted,
            &Status::Approved,
            Utc::now(),
            Attributes::new(),
            None,
        )
        .unwrap()
        .unwrap();

    let err = flow
        .machine
        .apply_pending_transition(&mut second, &scheduled)
        .unwrap_err();
    assert!(matches!(
        err,
        TransitionError::Persist(PersistError::NotFound(_))
    ));
    assert_eq!(flow.documents.persisted("2", "status"), Some(Status::Submitted));
}

#[test]
fn checkpoint_restores_history_queries() {
    let flow = workflow(review_definition(true));
    let mut doc = flow.document("1", Status::Draft);
    flow.machine
        .transition_to(
            &mut doc,
            &Status::Draft,
            &Status::Submitted,
            Attributes::new(),
            None,
        )
        .unwrap();

    let bytes = StoreCheckpoint::capture(&flow.history, &flow.pending)
        .to_bytes()
        .unwrap();
    let (history, pending) = StoreCheckpoint::<Status>::from_bytes(&bytes)
        .unwrap()
        .restore()
        .unwrap();

    let restored = StateMachineBuilder::<Status, Document>::new()
        .field("status")
        .definition(review_definition(true).build().unwrap())
        .history_store(Arc::new(history))
        .pending_store(Arc::new(pending))
        .build()
        .unwrap();

    assert_eq!(restored.times_was(&doc, &Status::Submitted).unwrap(), 1);
    assert_eq!(
        restored.when_was(&doc, &Status::Submitted).unwrap(),
        flow.machine.when_was(&doc, &Status::Submitted).unwrap()
    );
}
