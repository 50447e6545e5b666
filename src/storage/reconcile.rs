//! Title-keyed reconciliation of scraped records against stored products

use crate::product::ProductRecord;
use crate::storage::traits::{ProductSession, StorageResult};

/// How a batch was applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub created: usize,
    pub updated: usize,
}

impl ReconcileOutcome {
    /// Total records applied
    pub fn processed(&self) -> usize {
        self.created + self.updated
    }
}

/// Applies a batch of records to a session, upserting by title
///
/// A known title has all of its fields overwritten and `updated_at` set to
/// `now`; an unknown title is inserted with `created_at = now`. The first
/// error aborts the batch, leaving rollback to the session's owner.
pub fn reconcile<S>(session: &S, records: &[ProductRecord], now: &str) -> StorageResult<ReconcileOutcome>
where
    S: ProductSession + ?Sized,
{
    let mut outcome = ReconcileOutcome::default();

    for record in records {
        match session.find_by_title(&record.title)? {
            Some(mut existing) => {
                existing.merge_from(record);
                existing.updated_at = Some(now.to_string());
                session.update_product(&existing)?;
                tracing::debug!("Updated product {}: {}", existing.id, record.title);
                outcome.updated += 1;
            }
            None => {
                let id = session.insert_product(record, now)?;
                tracing::debug!("Added product {}: {}", id, record.title);
                outcome.created += 1;
            }
        }
    }

    Ok(outcome)
}
