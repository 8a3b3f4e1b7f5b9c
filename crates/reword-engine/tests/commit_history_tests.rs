// Test suite for commit, log and reflog commands, plus reword against the
// in-memory store where write failures can be injected

mod common;

use common::{commit_msg, merge_msg, setup_repo, signature};
use reword_core::errors::ExErrorKind;
use reword_core::logging_facility::test_capture::init_test_capture;
use reword_core::store::{RefTarget, HEAD};
use reword_core::{MemoryStore, ObjectStore, RefStore};
use reword_core_types::{RequestContext, TraceId};
use reword_engine::{commit, log, reflog, reword, CommitRequest, RewordOptions};

#[test]
fn test_commit_advances_branch() {
    let (_dir, mut repo) = setup_repo();
    let ctx = RequestContext::new();

    let first = commit(&mut repo, CommitRequest::new("first", signature(1)), &ctx).unwrap();
    assert_eq!(first.ref_name, "refs/heads/main");
    assert!(first.parent_ids.is_empty());

    let second = commit(&mut repo, CommitRequest::new("second", signature(2)), &ctx).unwrap();
    assert_eq!(second.parent_ids, vec![first.snapshot_id]);
    assert_eq!(repo.resolve("HEAD").unwrap(), second.snapshot_id);
}

#[test]
fn test_commit_reflog_messages() {
    let (_dir, mut repo) = setup_repo();
    let a = commit_msg(&mut repo, "root\n\nbody text", 1);
    let b = commit_msg(&mut repo, "next", 2);
    let m = merge_msg(&mut repo, "merge a", 3, &a);
    assert_eq!(repo.get_snapshot(&m).unwrap().parent_ids, vec![b, a]);

    let messages: Vec<String> = repo
        .reflog("main")
        .unwrap()
        .into_iter()
        .map(|e| e.message)
        .collect();
    assert_eq!(
        messages,
        vec![
            "commit (initial): root".to_string(),
            "commit: next".to_string(),
            "commit (merge): merge a".to_string(),
        ]
    );
    assert_eq!(repo.reflog(HEAD).unwrap().len(), 3);
}

#[test]
fn test_commit_committer_and_content() {
    let (_dir, mut repo) = setup_repo();
    let mut request = CommitRequest::new("a", signature(1));
    request.committer = Some(signature(5));
    request.content_ref = Some("tree-1".to_string());
    let a = commit(&mut repo, request, &RequestContext::new())
        .unwrap()
        .snapshot_id;

    let b = commit_msg(&mut repo, "b", 2);

    let snap_a = repo.get_snapshot(&a).unwrap();
    assert_eq!(snap_a.committer, signature(5));
    assert_eq!(repo.reflog("main").unwrap()[0].identity, signature(5));
    // content carries over from the first parent
    assert_eq!(repo.get_snapshot(&b).unwrap().content_ref, "tree-1");
}

#[test]
fn test_commit_rejects_empty_message_and_detached_head() {
    let (_dir, mut repo) = setup_repo();
    let ctx = RequestContext::new();

    let err = commit(&mut repo, CommitRequest::new("", signature(1)), &ctx).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);

    let a = commit_msg(&mut repo, "a", 1);
    repo.set_head(&RefTarget::Direct(a)).unwrap();
    let err = commit(&mut repo, CommitRequest::new("b", signature(2)), &ctx).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::DetachedHead);
}

#[test]
fn test_log_newest_first_with_limit() {
    let (_dir, mut repo) = setup_repo();
    commit_msg(&mut repo, "a", 1);
    commit_msg(&mut repo, "b", 2);
    commit_msg(&mut repo, "c", 3);
    let ctx = RequestContext::new();

    let all: Vec<String> = log(&repo, "HEAD", None, &ctx)
        .unwrap()
        .into_iter()
        .map(|s| s.message)
        .collect();
    assert_eq!(all, vec!["c", "b", "a"]);

    let limited = log(&repo, "main~1", Some(1), &ctx).unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].message, "b");
}

#[test]
fn test_log_unknown_revision() {
    let (_dir, repo) = setup_repo();
    let err = log(&repo, "HEAD", None, &RequestContext::new()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::AmbiguousOrUnknownRevision);
    assert_eq!(err.revision(), Some("HEAD"));
}

#[test]
fn test_reflog_newest_first() {
    let (_dir, mut repo) = setup_repo();
    commit_msg(&mut repo, "a", 1);
    commit_msg(&mut repo, "b", 2);
    reword(
        &mut repo,
        "HEAD~1",
        "a2",
        RewordOptions::default(),
        &RequestContext::new(),
    )
    .unwrap();

    let entries = reflog(&repo, "main", &RequestContext::new()).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].message, "reword: message for HEAD~1");
    assert_eq!(entries[2].message, "commit (initial): a");
    assert_eq!(entries[0].old_target.as_ref(), Some(&entries[1].new_target));
}

#[test]
fn test_reword_write_failure_leaves_branch() {
    let mut store = MemoryStore::new();
    let ctx = RequestContext::new();
    commit(&mut store, CommitRequest::new("a", signature(1)), &ctx).unwrap();
    commit(&mut store, CommitRequest::new("b", signature(2)), &ctx).unwrap();
    let tip = commit(&mut store, CommitRequest::new("c", signature(3)), &ctx)
        .unwrap()
        .snapshot_id;
    let log_len = store.reflog("main").unwrap().len();

    // the rewritten target goes through, its child does not
    store.fail_writes_after(store.write_count() + 1);
    let err = reword(&mut store, "HEAD~1", "b2", RewordOptions::default(), &ctx).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::StoreWrite);
    assert_eq!(store.read_ref("main").unwrap(), Some(tip));
    assert_eq!(store.reflog("main").unwrap().len(), log_len);
}

#[test]
fn test_reword_target_outside_branch_writes_nothing() {
    let mut store = MemoryStore::new();
    let ctx = RequestContext::new();
    let a = commit(&mut store, CommitRequest::new("a", signature(1)), &ctx)
        .unwrap()
        .snapshot_id;
    let b = commit(&mut store, CommitRequest::new("b", signature(2)), &ctx)
        .unwrap()
        .snapshot_id;
    // move main back so that b is unreachable from it
    store.set_ref("main", a);
    let writes = store.write_count();

    let err = reword(
        &mut store,
        b.as_str(),
        "b2",
        RewordOptions::default(),
        &ctx,
    )
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(store.write_count(), writes);
}

#[test]
fn test_commit_logging_boundaries() {
    let capture = init_test_capture();
    let (_dir, mut repo) = setup_repo();
    let ctx = RequestContext::new();

    commit(&mut repo, CommitRequest::new("a", signature(1)), &ctx).unwrap();
    let err = commit(&mut repo, CommitRequest::new(" ", signature(2)), &ctx).unwrap_err();
    assert_eq!(err.request_id(), Some(&ctx.request_id));

    let events: Vec<String> = capture
        .events_for_request("commit", &ctx.request_id)
        .into_iter()
        .filter_map(|e| e.event)
        .collect();
    assert_eq!(events, vec!["start", "end", "start", "end_error"]);
}

#[test]
fn test_errors_carry_caller_trace() {
    let (_dir, repo) = setup_repo();
    let trace_id = TraceId::new();
    let ctx = RequestContext::new().with_trace_id(trace_id.clone());

    let err = log(&repo, "nope", None, &ctx).unwrap_err();

    assert_eq!(err.request_id(), Some(&ctx.request_id));
    assert_eq!(err.trace_id(), Some(&trace_id));
}
