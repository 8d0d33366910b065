use crate::db::*;
use crate::error::{Error, PersistenceError};
use crate::exporter::test_helpers::{analytics_report, esg_report, generated_at};
use crate::types::{ReportId, ReportKind, ReportPayload};
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_insert_and_get_report() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let report = ReportPayload::Esg(esg_report());
    let id = db.insert_report(&report).await.unwrap();

    let stored = db.get_report(id).await.unwrap().unwrap();
    assert_eq!(stored.id, id);
    assert_eq!(stored.kind, ReportKind::Esg);
    assert_eq!(stored.title, "ESG & Sustainability Report - EcoFlow Energy Solutions");
    assert_eq!(stored.generated_at, generated_at());
    assert_eq!(stored.payload, report);

    db.close().await;
}

#[tokio::test]
async fn test_identical_saves_get_distinct_ids() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let report = ReportPayload::Analytics(analytics_report());
    let first = db.insert_report(&report).await.unwrap();
    let second = db.insert_report(&report).await.unwrap();

    assert_ne!(first, second);
    assert_eq!(db.count_reports().await.unwrap(), 2);

    db.close().await;
}

#[tokio::test]
async fn test_get_missing_report_returns_none() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    assert!(db.get_report(ReportId(42)).await.unwrap().is_none());

    db.close().await;
}

#[tokio::test]
async fn test_list_reports_most_recent_first() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let analytics = db
        .insert_report(&ReportPayload::Analytics(analytics_report()))
        .await
        .unwrap();
    let esg = db
        .insert_report(&ReportPayload::Esg(esg_report()))
        .await
        .unwrap();

    let listed = db.list_reports(10, 0).await.unwrap();
    let ids: Vec<i64> = listed.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![esg.get(), analytics.get()]);
    assert_eq!(listed[0].kind, "esg");
    assert_eq!(listed[1].title, "Advanced Analytics Report");

    let page = db.list_reports(1, 1).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, analytics.get());

    db.close().await;
}

#[tokio::test]
async fn test_corrupt_payload_is_a_persistence_error() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    sqlx::query(
        "INSERT INTO reports (kind, title, payload, generated_at, saved_at) VALUES ('esg', 't', '{', 0, 0)",
    )
    .execute(db.pool())
    .await
    .unwrap();

    let err = db.get_report(ReportId(1)).await.unwrap_err();
    assert_eq!(err.error_code(), "persistence_error");

    db.close().await;
}

/// Verify that saving after closing the pool returns an error
/// rather than hanging or panicking.
#[tokio::test]
async fn test_insert_after_pool_close_returns_error() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    db.pool().close().await;

    let result = db
        .insert_report(&ReportPayload::Analytics(analytics_report()))
        .await;
    assert!(
        result.is_err(),
        "insert_report after pool close should return an error, got: {:?}",
        result
    );
}

#[tokio::test]
async fn test_out_of_range_timestamp_is_a_corrupt_record() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let id = db
        .insert_report(&ReportPayload::Analytics(analytics_report()))
        .await
        .unwrap();
    sqlx::query("UPDATE reports SET saved_at = ? WHERE id = ?")
        .bind(i64::MAX)
        .bind(id.get())
        .execute(db.pool())
        .await
        .unwrap();

    let err = db.get_report(id).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Persistence(PersistenceError::CorruptRecord { id: row, .. }) if row == id.get()
    ));

    db.close().await;
}

#[tokio::test]
async fn test_kind_column_must_match_payload() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let id = db
        .insert_report(&ReportPayload::Esg(esg_report()))
        .await
        .unwrap();
    sqlx::query("UPDATE reports SET kind = 'analytics' WHERE id = ?")
        .bind(id.get())
        .execute(db.pool())
        .await
        .unwrap();

    let err = db.get_report(id).await.unwrap_err();
    assert_eq!(err.error_code(), "persistence_error");
    assert!(err.to_string().contains("does not match the esg payload"));

    db.close().await;
}
