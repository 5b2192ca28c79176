//! Save/restore flows as driven by a synchronization layer.

use itol_core::{Attachment, Issue, IssueUpdate, Property, PropertyValue};

/// What the sync layer does after the service accepted a create.
fn commit(draft: Issue, server_id: &str) -> Issue {
    let mut saved = Issue::with_id(server_id, draft);
    let working = std::mem::take(saved.current_update_mut());
    saved.push_update(working.clone());
    saved.set_current_update(working);
    saved
}

#[test]
fn new_issue_becomes_persisted_with_history() {
    let mut draft = Issue::new();
    draft.set_subject("Outlook add-in crashes on send");
    draft.set_issue_type("bug");
    draft.attachments_mut().push(Attachment::new("mail.msg"));
    assert!(draft.is_null());

    let issue = commit(draft, "ITOL-42");
    assert!(!issue.is_null());
    assert_eq!(issue.updates().len(), 1);
    assert_eq!(issue.last_update(), issue.current_update());
    assert_eq!(issue.attachments().len(), 1);
}

#[test]
fn restore_from_backup_discards_edits() {
    let mut issue = commit(Issue::new(), "ITOL-1");
    issue.set_status("open");
    let backup = issue.clone();

    issue.set_status("closed");
    issue.set_description("won't fix");
    let mut changed = Vec::new();
    issue.find_changed_members(&backup, &mut changed);
    assert_eq!(changed, vec![Property::DESCRIPTION, Property::STATUS]);

    issue = backup.clone();
    assert_eq!(issue, backup);
    assert_eq!(issue.status(), "open");
}

#[test]
fn clone_does_not_alias_history() {
    let mut issue = Issue::with_id("ITOL-3", Issue::new());
    issue.push_update(IssueUpdate::from_parts(
        None,
        "alice",
        [Property::new(Property::PRIORITY, Some("high".into()))],
    ));
    let snapshot = issue.clone();

    issue.set_updates(vec![IssueUpdate::new()]);
    issue.attachments_mut().push(Attachment::new("x.png"));

    assert_eq!(snapshot.updates().len(), 1);
    assert_eq!(
        snapshot.updates()[0].value(Property::PRIORITY),
        Some(&PropertyValue::Text("high".into()))
    );
    assert!(snapshot.attachments().is_empty());
}

#[test]
fn issue_round_trips_through_json() -> Result<(), serde_json::Error> {
    let mut issue = Issue::with_id("ITOL-9", Issue::new());
    issue.set_status("open");
    issue.related_issue_ids_mut().push("ITOL-8".into());
    issue.push_update(IssueUpdate::from_parts(None, "bob", []));

    let json = serde_json::to_string(&issue)?;
    let back: Issue = serde_json::from_str(&json)?;
    assert_eq!(back, issue);
    assert_eq!(back.related_issue_ids(), ["ITOL-8".to_string()]);
    assert_eq!(back.last_modified(), issue.last_modified());
    Ok(())
}
