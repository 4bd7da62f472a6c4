//! Audit log of inbound integration webhooks.

use chrono::Utc;

use sb_core::entities::SyncLogEntry;
use sb_core::enums::SyncType;
use sb_core::ids::PREFIX_SYNC_LOG;

use crate::error::DatabaseError;
use crate::helpers::{
    get_bool, get_opt_string, parse_datetime, parse_enum, parse_optional_datetime, to_json_text,
};
use crate::service::SkillService;

fn row_to_entry(row: &libsql::Row) -> Result<SyncLogEntry, DatabaseError> {
    let payload = row.get::<String>(2)?;
    Ok(SyncLogEntry {
        id: row.get::<String>(0)?,
        sync_type: parse_enum(&row.get::<String>(1)?)?,
        payload: serde_json::from_str(&payload)
            .map_err(|e| DatabaseError::Query(format!("Invalid sync payload JSON: {e}")))?,
        org_id: get_opt_string(row, 3)?,
        processed: get_bool(row, 4)?,
        processed_at: parse_optional_datetime(get_opt_string(row, 5)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

impl SkillService {
    /// Record an inbound webhook before acting on it.
    pub async fn insert_sync_log(
        &self,
        sync_type: SyncType,
        payload: &serde_json::Value,
        org_id: Option<&str>,
        processed: bool,
    ) -> Result<SyncLogEntry, DatabaseError> {
        let id = self.db().generate_id(PREFIX_SYNC_LOG).await?;
        let now = Utc::now();
        let payload_text = to_json_text(payload)?;
        let processed_at = processed.then(|| now.to_rfc3339());

        self.db()
            .execute_with(
                "INSERT INTO org_sync_log (id, sync_type, payload, org_id, processed, processed_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                || {
                    libsql::params![
                        id.as_str(),
                        sync_type.as_str(),
                        payload_text.as_str(),
                        org_id,
                        i64::from(processed),
                        processed_at.as_deref(),
                        now.to_rfc3339()
                    ]
                },
            )
            .await?;

        Ok(SyncLogEntry {
            id,
            sync_type,
            payload: payload.clone(),
            org_id: org_id.map(String::from),
            processed,
            processed_at: processed.then_some(now),
            created_at: now,
        })
    }

    /// Mark an entry handled, optionally attributing it to an organization.
    pub async fn mark_sync_log_processed(
        &self,
        id: &str,
        org_id: Option<&str>,
    ) -> Result<SyncLogEntry, DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let changed = self
            .db()
            .execute_with(
                "UPDATE org_sync_log SET processed = 1, processed_at = ?1, org_id = COALESCE(?2, org_id)
                 WHERE id = ?3",
                || libsql::params![now.as_str(), org_id, id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_sync_log(id).await
    }

    pub async fn get_sync_log(&self, id: &str) -> Result<SyncLogEntry, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT id, sync_type, payload, org_id, processed, processed_at, created_at
                 FROM org_sync_log WHERE id = ?1",
                || [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_entry(&row)
    }
}

#[cfg(test)]
mod tests {
    use sb_core::enums::SyncType;
    use serde_json::json;

    use crate::test_support::test_service;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn log_then_mark_processed() {
        let svc = test_service().await;
        let payload = json!({"admin_external_id": "A1", "cohort_external_id": "C1"});

        let entry = svc
            .insert_sync_log(SyncType::PaymentReceived, &payload, None, false)
            .await
            .unwrap();
        assert!(!entry.processed);

        let done = svc.mark_sync_log_processed(&entry.id, Some("org-1")).await.unwrap();
        assert!(done.processed);
        assert!(done.processed_at.is_some());
        assert_eq!(done.org_id.as_deref(), Some("org-1"));
        assert_eq!(done.payload, payload);
    }

    #[tokio::test]
    async fn processed_on_insert_is_stamped() {
        let svc = test_service().await;
        let entry = svc
            .insert_sync_log(SyncType::AdminProvisioned, &json!({}), Some("org-1"), true)
            .await
            .unwrap();
        let stored = svc.get_sync_log(&entry.id).await.unwrap();
        assert!(stored.processed);
        assert!(stored.processed_at.is_some());
        assert_eq!(stored.sync_type, SyncType::AdminProvisioned);
    }
}
