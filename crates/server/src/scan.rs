//! Full-namespace storage scans backing the history, stats, and folder
//! deletion endpoints.

use crate::metrics::SCAN_PAGES_FETCHED;
use futures::future::join_all;
use locker_core::{HISTORY_SCAN_CAP, RECENT_UPLOADS_COUNT, SCAN_PAGE_LIMIT};
use locker_core::path::display_name;
use locker_storage::{ListRequest, ObjectRecord, ObjectStore, StorageResult};
use serde::Serialize;
use std::cmp::Reverse;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Public URL for a key, when a public domain is configured.
pub fn public_url(domain: Option<&str>, key: &str) -> Option<String> {
    domain.map(|d| format!("{}/{}", d.trim_end_matches('/'), key))
}

/// Wire representation of a stored file.
#[derive(Debug, Serialize)]
pub struct FileSummary {
    pub key: String,
    pub name: String,
    pub size: u64,
    pub uploaded: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
}

pub fn file_summary(record: &ObjectRecord, domain: Option<&str>) -> FileSummary {
    FileSummary {
        key: record.key.clone(),
        name: display_name(&record.key).to_string(),
        size: record.size,
        uploaded: record.uploaded.and_then(|t| t.format(&Rfc3339).ok()),
        url: public_url(domain, &record.key),
        content_type: record.content_type.clone(),
    }
}

pub struct HistoryScan {
    pub files: Vec<FileSummary>,
    pub total: usize,
    pub has_more: bool,
}

/// Collect recent uploads under `prefix`, newest first.
///
/// Object listings come back in key order, not upload order, so the scan
/// pools pages and sorts by timestamp. The pool stops growing at
/// [`HISTORY_SCAN_CAP`]; past that point `total` counts only the pooled
/// objects and `has_more` is set.
pub async fn collect_history(
    store: &dyn ObjectStore,
    domain: Option<&str>,
    prefix: &str,
    limit: usize,
) -> StorageResult<HistoryScan> {
    let page_limit = limit.min(SCAN_PAGE_LIMIT);
    let mut pool: Vec<ObjectRecord> = Vec::new();
    let mut cursor: Option<String> = None;
    let mut cursor_outstanding = false;

    loop {
        let request = ListRequest {
            prefix: prefix.to_string(),
            cursor: cursor.clone(),
            limit: page_limit,
            delimiter: None,
        };
        let page = store.list(&request).await?;
        SCAN_PAGES_FETCHED.with_label_values(&["history"]).inc();
        pool.extend(page.objects);

        if !page.truncated {
            break;
        }
        if pool.len() >= HISTORY_SCAN_CAP {
            cursor_outstanding = true;
            break;
        }
        cursor = page.cursor;
    }

    // Missing timestamps sort as the epoch, landing after every dated entry.
    pool.sort_by_key(|record| Reverse(record.uploaded.unwrap_or(OffsetDateTime::UNIX_EPOCH)));

    let total = pool.len();
    let has_more = total > limit || cursor_outstanding;
    let files = pool
        .into_iter()
        .take(limit)
        .map(|record| file_summary(&record, domain))
        .collect();

    Ok(HistoryScan {
        files,
        total,
        has_more,
    })
}

#[derive(Debug, Serialize)]
pub struct RecentUpload {
    pub key: String,
    pub uploaded: Option<String>,
}

pub struct StatsScan {
    pub total_files: u64,
    pub total_size: u64,
    pub recent_uploads: Vec<RecentUpload>,
}

/// Walk the whole namespace and aggregate object counts and sizes.
///
/// The first [`RECENT_UPLOADS_COUNT`] objects in listing order are reported
/// as recent uploads.
pub async fn collect_stats(store: &dyn ObjectStore) -> StorageResult<StatsScan> {
    let mut total_files: u64 = 0;
    let mut total_size: u64 = 0;
    let mut recent_uploads = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let request = ListRequest {
            prefix: String::new(),
            cursor: cursor.clone(),
            limit: SCAN_PAGE_LIMIT,
            delimiter: None,
        };
        let page = store.list(&request).await?;
        SCAN_PAGES_FETCHED.with_label_values(&["stats"]).inc();

        for record in &page.objects {
            total_files += 1;
            total_size += record.size;
            if recent_uploads.len() < RECENT_UPLOADS_COUNT {
                recent_uploads.push(RecentUpload {
                    key: record.key.clone(),
                    uploaded: record.uploaded.and_then(|t| t.format(&Rfc3339).ok()),
                });
            }
        }

        if !page.truncated {
            break;
        }
        cursor = page.cursor;
    }

    Ok(StatsScan {
        total_files,
        total_size,
        recent_uploads,
    })
}

/// Delete every object under `prefix`, returning the number of attempts.
///
/// Each iteration re-lists the prefix from the start, so keys whose delete
/// failed are retried on the next page. A page where every delete fails
/// aborts the scan; otherwise it would re-list the same keys forever.
pub async fn delete_prefix(store: &dyn ObjectStore, prefix: &str) -> StorageResult<u64> {
    let mut deleted: u64 = 0;

    loop {
        let request = ListRequest {
            prefix: prefix.to_string(),
            cursor: None,
            limit: SCAN_PAGE_LIMIT,
            delimiter: None,
        };
        let page = store.list(&request).await?;
        SCAN_PAGES_FETCHED
            .with_label_values(&["folder_delete"])
            .inc();

        if page.objects.is_empty() {
            break;
        }

        let results = join_all(page.objects.iter().map(|record| store.delete(&record.key))).await;

        let mut failures = 0usize;
        let mut first_error = None;
        for (record, result) in page.objects.iter().zip(results) {
            if let Err(e) = result {
                tracing::warn!(key = %record.key, error = %e, "Failed to delete object");
                failures += 1;
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        deleted += page.objects.len() as u64;

        if failures == page.objects.len()
            && let Some(e) = first_error
        {
            return Err(e);
        }

        if !page.truncated {
            break;
        }
    }

    Ok(deleted)
}
