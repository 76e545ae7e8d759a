use chrono::NaiveDate;
use sql_session_store::escaper::SqliteQueryEscaper;
use sql_session_store::prelude::*;

#[test]
fn dialects_quote_identifiers_differently() {
    let mysql = DatabaseType::MySql.escaper();
    let sqlite = DatabaseType::Sqlite.escaper();

    assert_eq!(mysql.table("user_sessions"), "`user_sessions`");
    assert_eq!(sqlite.table("user_sessions"), "\"user_sessions\"");
    assert_eq!(mysql.column("a.b"), "`a`.`b`");
    assert_eq!(sqlite.column("a.b"), "\"a\".\"b\"");
}

#[test]
fn string_escaping_follows_the_dialect() {
    let input = SqlValue::Text("it's a \\ test".into());
    assert_eq!(
        DatabaseType::MySql.escaper().value(&input).unwrap(),
        r"'it\'s a \\ test'"
    );
    assert_eq!(
        DatabaseType::Sqlite.escaper().value(&input).unwrap(),
        r"'it''s a \ test'"
    );
}

#[test]
fn scalars_render_as_quoted_literals() {
    let escaper = DatabaseType::MySql.escaper();
    assert_eq!(escaper.value(&SqlValue::Int(-3)).unwrap(), "'-3'");
    assert_eq!(escaper.value(&SqlValue::Bool(true)).unwrap(), "'1'");
    assert_eq!(escaper.value(&SqlValue::Null).unwrap(), "NULL");
    assert_eq!(
        escaper.value(&SqlValue::Blob(vec![0xDE, 0xAD])).unwrap(),
        "X'DEAD'"
    );

    let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap();
    assert_eq!(
        escaper.value(&SqlValue::Timestamp(ts)).unwrap(),
        "'2024-03-01 12:30:00'"
    );
}

#[test]
fn non_scalar_values_fail_with_invalid_argument() {
    for escaper in [DatabaseType::MySql.escaper(), DatabaseType::Sqlite.escaper()] {
        let result = escaper.value(&SqlValue::JSON(serde_json::json!([1, 2])));
        assert!(matches!(result, Err(SqlSessionError::InvalidArgument(_))));
    }
}

#[test]
fn intvalue_never_quotes() {
    let escaper = DatabaseType::MySql.escaper();
    assert_eq!(escaper.intvalue(&SqlValue::Int(1700000000)).unwrap(), "1700000000");
    assert_eq!(
        escaper.intvalue(&SqlValue::Text("42".into())).unwrap(),
        "42"
    );
    assert!(matches!(
        escaper.intvalue(&SqlValue::Text("42.5".into())),
        Err(SqlSessionError::InvalidArgument(_))
    ));
}

#[test]
fn result_column_handles_projection_wildcards() {
    let mysql = DatabaseType::MySql.escaper();
    assert_eq!(mysql.result_column("*"), "*");
    assert_eq!(mysql.result_column("s.*"), "`s`.*");
    assert_eq!(mysql.result_column("sessionData"), "`sessionData`");
}

#[test]
fn sqlite_table_hint_is_a_table_only_feature() {
    let escaper = SqliteQueryEscaper;
    assert_eq!(
        escaper.table_indexed_by("user_sessions", "idx_expires"),
        "\"user_sessions\" INDEXED BY \"idx_expires\""
    );
}

#[test]
fn escaping_is_deterministic() {
    let escaper = DatabaseType::MySql.escaper();
    let value = SqlValue::Text("same input".into());
    assert_eq!(
        escaper.value(&value).unwrap(),
        escaper.value(&value).unwrap()
    );
    assert_eq!(escaper.table("t"), escaper.table("t"));
}
