use sql_session_store::prelude::*;
use sql_session_store::test_utils::{MockRuntime, RuntimeCall};

#[tokio::test]
async fn failed_read_raises_query_error_without_retry_or_transaction() {
    let runtime = MockRuntime::new(DatabaseType::MySql)
        .with_response(QueryResult::failure("Some Error!", 9).with_lock_timeout());
    let mut store = SessionStore::new(runtime);

    let error = store.read("s1").await.unwrap_err();
    match &error {
        SqlSessionError::QueryError {
            message, number, ..
        } => {
            assert_eq!(message, "Some Error!");
            assert_eq!(*number, 9);
        }
        other => panic!("expected QueryError, got {other:?}"),
    }
    // Retry classification is surfaced, but the read itself never retried.
    assert!(error.has_lock_timeout());
    assert!(error.is_retryable());

    let mock = store.runtime();
    assert_eq!(mock.queries().len(), 1);
    assert!(!mock.calls().contains(&RuntimeCall::Begin));
}

#[tokio::test]
async fn read_decodes_the_stored_base64_cell() {
    let runtime = MockRuntime::new(DatabaseType::MySql).with_response(QueryResult::with_rows(
        vec!["sessionData".to_owned()],
        vec![vec![SqlValue::Text("bXlTZXNzaW9u".to_owned())]],
    ));
    let mut store = SessionStore::new(runtime);

    let data = store.read("s1").await.unwrap();
    assert_eq!(data, Some(b"mySession".to_vec()));
}

#[tokio::test]
async fn corrupt_session_data_is_reported_not_panicked() {
    let runtime = MockRuntime::new(DatabaseType::MySql).with_response(QueryResult::with_rows(
        vec!["sessionData".to_owned()],
        vec![vec![SqlValue::Text("%%% not base64 %%%".to_owned())]],
    ));
    let mut store = SessionStore::new(runtime);

    let error = store.read("s1").await.unwrap_err();
    assert!(matches!(error, SqlSessionError::ExecutionError(_)));
}

#[tokio::test]
async fn write_aborts_before_replacing_when_the_lock_select_fails() {
    let runtime =
        MockRuntime::new(DatabaseType::MySql).with_response(QueryResult::failure("boom", 1));
    let mut store = SessionStore::new(runtime);

    let error = store.write("s1", b"data", 1000).await.unwrap_err();
    assert!(matches!(error, SqlSessionError::QueryError { .. }));

    let mock = store.runtime();
    assert_eq!(mock.queries().len(), 1, "no REPLACE after a failed lock");
    assert_eq!(mock.rollbacks(), 1);
    assert_eq!(mock.ends(), 1);
    assert_eq!(mock.commits(), 0);
}

#[tokio::test]
async fn write_rolls_back_when_the_replace_fails() {
    let runtime = MockRuntime::new(DatabaseType::MySql)
        .with_response(QueryResult::with_rows(
            vec!["sessionID".to_owned()],
            vec![vec![SqlValue::Text("s1".to_owned())]],
        ))
        .with_response(QueryResult::failure("Deadlock found", 1213).with_deadlock());
    let mut store = SessionStore::new(runtime);

    let error = store.write("s1", b"data", 1000).await.unwrap_err();
    assert!(error.has_deadlock());
    assert!(error.is_retryable());

    let mock = store.runtime();
    assert_eq!(mock.queries().len(), 2);
    assert_eq!(mock.rollbacks(), 1);
    assert_eq!(mock.ends(), 1);
    assert_eq!(mock.commits(), 0);
}

#[tokio::test]
async fn successful_write_commits_exactly_once() {
    let runtime = MockRuntime::new(DatabaseType::MySql)
        .with_response(QueryResult::with_rows(vec!["sessionID".to_owned()], vec![]))
        .with_response(QueryResult::success(1));
    let mut store = SessionStore::new(runtime);

    store.write("s1", b"data", 1000).await.unwrap();

    let mock = store.runtime();
    assert_eq!(mock.commits(), 1);
    assert_eq!(mock.rollbacks(), 0);
    assert_eq!(mock.ends(), 1);
    let queries = mock.queries();
    assert!(queries[0].contains("FOR UPDATE"));
    assert!(queries[1].starts_with("REPLACE INTO"));
}

#[tokio::test]
async fn failed_begin_leaves_no_transaction_to_clean_up() {
    let runtime = MockRuntime::new(DatabaseType::MySql).with_failing_begin();
    let mut store = SessionStore::new(runtime);

    let error = store.write("s1", b"data", 1000).await.unwrap_err();
    assert!(matches!(error, SqlSessionError::ConnectionError(_)));

    let mock = store.runtime();
    assert!(mock.queries().is_empty());
    assert_eq!(mock.rollbacks(), 0);
    assert_eq!(mock.ends(), 0);
}

#[tokio::test]
async fn delete_propagates_an_ambiguous_lock_select() {
    let runtime =
        MockRuntime::new(DatabaseType::MySql).with_response(QueryResult::failure("boom", 2));
    let mut store = SessionStore::new(runtime);

    let error = store.delete("s1").await.unwrap_err();
    assert!(matches!(error, SqlSessionError::QueryError { .. }));

    let mock = store.runtime();
    assert_eq!(mock.queries().len(), 1);
    assert_eq!(mock.rollbacks(), 1);
    assert_eq!(mock.ends(), 1);
    assert_eq!(mock.commits(), 0);
}

#[tokio::test]
async fn delete_miss_is_a_no_op() {
    let runtime = MockRuntime::new(DatabaseType::MySql)
        .with_response(QueryResult::with_rows(vec!["sessionID".to_owned()], vec![]));
    let mut store = SessionStore::new(runtime);

    store.delete("missing").await.unwrap();

    let mock = store.runtime();
    assert_eq!(mock.queries().len(), 1);
    assert_eq!(mock.rollbacks(), 1);
    assert_eq!(mock.ends(), 1);
    assert_eq!(mock.commits(), 0);
}

#[tokio::test]
async fn delete_rolls_back_when_the_delete_statement_fails() {
    let runtime = MockRuntime::new(DatabaseType::MySql)
        .with_response(QueryResult::with_rows(
            vec!["sessionID".to_owned()],
            vec![vec![SqlValue::Text("s1".to_owned())]],
        ))
        .with_response(QueryResult::failure("boom", 3));
    let mut store = SessionStore::new(runtime);

    let error = store.delete("s1").await.unwrap_err();
    assert!(matches!(error, SqlSessionError::QueryError { .. }));

    let mock = store.runtime();
    assert_eq!(mock.queries().len(), 2);
    assert_eq!(mock.rollbacks(), 1);
    assert_eq!(mock.ends(), 1);
    assert_eq!(mock.commits(), 0);
}

#[tokio::test]
async fn delete_hit_commits_after_the_delete_statement() {
    let runtime = MockRuntime::new(DatabaseType::MySql)
        .with_response(QueryResult::with_rows(
            vec!["sessionID".to_owned()],
            vec![vec![SqlValue::Text("s1".to_owned())]],
        ))
        .with_response(QueryResult::success(1));
    let mut store = SessionStore::new(runtime);

    store.delete("s1").await.unwrap();

    let mock = store.runtime();
    let queries = mock.queries();
    assert!(queries[0].contains("FOR UPDATE"));
    assert!(queries[1].starts_with("DELETE FROM"));
    assert_eq!(mock.commits(), 1);
    assert_eq!(mock.rollbacks(), 0);
    assert_eq!(mock.ends(), 1);
}

#[tokio::test]
async fn gc_failure_propagates_without_transaction_calls() {
    let runtime =
        MockRuntime::new(DatabaseType::MySql).with_response(QueryResult::failure("boom", 4));
    let mut store = SessionStore::new(runtime);

    let error = store.gc(1000).await.unwrap_err();
    assert!(matches!(error, SqlSessionError::QueryError { .. }));

    let mock = store.runtime();
    assert!(!mock.calls().contains(&RuntimeCall::Begin));
    assert_eq!(mock.rollbacks(), 0);
    assert_eq!(mock.ends(), 0);
}

#[tokio::test]
async fn sqlite_dialect_stores_render_double_quoted_statements() {
    let runtime = MockRuntime::new(DatabaseType::Sqlite)
        .with_response(QueryResult::with_rows(vec!["sessionID".to_owned()], vec![]))
        .with_response(QueryResult::success(1));
    let mut store = SessionStore::new(runtime);

    store.write("s1", b"data", 1000).await.unwrap();

    let mock = store.runtime();
    let queries = mock.queries();
    assert!(queries[0].contains("\"user_sessions\""));
    assert!(queries[1].contains("\"sessionData\""));
}
