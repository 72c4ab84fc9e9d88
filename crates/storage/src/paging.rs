//! Page assembly for backends that list by walking their full key set.
//!
//! The filesystem and memory backends have no native paginated listing, so
//! they collect every matching record and carve pages here. Cursors are the
//! sort key of the last entry on a page; resuming skips everything at or
//! before the cursor, which keeps cursors valid even when earlier entries
//! were deleted in between.

use crate::traits::{ListPage, ListRequest, ObjectRecord};

enum Entry {
    Object(ObjectRecord),
    Prefix(String),
}

impl Entry {
    fn sort_key(&self) -> &str {
        match self {
            Entry::Object(record) => &record.key,
            Entry::Prefix(prefix) => prefix,
        }
    }
}

/// Assemble one page from the full set of matching records.
///
/// `records` must be sorted by key and already filtered to the request
/// prefix. With a delimiter, keys containing it past the prefix collapse
/// into one group entry apiece, interleaved in key order the way S3 merges
/// CommonPrefixes into listing output.
pub(crate) fn assemble_page(records: Vec<ObjectRecord>, request: &ListRequest) -> ListPage {
    let mut entries: Vec<Entry> = Vec::with_capacity(records.len());

    match request.delimiter.as_deref() {
        Some(delimiter) if !delimiter.is_empty() => {
            let mut last_group: Option<String> = None;
            for record in records {
                let rest = &record.key[request.prefix.len()..];
                match rest.find(delimiter) {
                    Some(index) => {
                        let end = request.prefix.len() + index + delimiter.len();
                        let group = record.key[..end].to_string();
                        if last_group.as_deref() != Some(group.as_str()) {
                            last_group = Some(group.clone());
                            entries.push(Entry::Prefix(group));
                        }
                    }
                    None => entries.push(Entry::Object(record)),
                }
            }
        }
        _ => entries.extend(records.into_iter().map(Entry::Object)),
    }

    let limit = request.normalized_limit();
    let cursor_bound = request.cursor.as_deref();

    let mut objects = Vec::new();
    let mut delimited_prefixes = Vec::new();
    let mut last_key: Option<String> = None;
    let mut taken = 0;
    let mut truncated = false;

    for entry in entries {
        if let Some(bound) = cursor_bound
            && entry.sort_key() <= bound
        {
            continue;
        }
        if taken == limit {
            truncated = true;
            break;
        }
        last_key = Some(entry.sort_key().to_string());
        match entry {
            Entry::Object(record) => objects.push(record),
            Entry::Prefix(prefix) => delimited_prefixes.push(prefix),
        }
        taken += 1;
    }

    ListPage {
        objects,
        delimited_prefixes,
        truncated,
        cursor: if truncated { last_key } else { None },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str) -> ObjectRecord {
        ObjectRecord {
            key: key.to_string(),
            size: 1,
            uploaded: None,
            content_type: None,
        }
    }

    fn request(prefix: &str, limit: usize, delimiter: Option<&str>) -> ListRequest {
        ListRequest {
            prefix: prefix.to_string(),
            cursor: None,
            limit,
            delimiter: delimiter.map(str::to_string),
        }
    }

    #[test]
    fn pages_split_at_limit_with_cursor() {
        let records: Vec<_> = (0..5).map(|i| record(&format!("k{i}"))).collect();

        let first = assemble_page(records.clone(), &request("", 2, None));
        assert_eq!(first.objects.len(), 2);
        assert!(first.truncated);
        assert_eq!(first.cursor.as_deref(), Some("k1"));

        let mut resumed = request("", 2, None);
        resumed.cursor = first.cursor;
        let second = assemble_page(records.clone(), &resumed);
        assert_eq!(second.objects[0].key, "k2");
        assert!(second.truncated);

        let mut tail = request("", 2, None);
        tail.cursor = second.cursor;
        let third = assemble_page(records, &tail);
        assert_eq!(third.objects.len(), 1);
        assert!(!third.truncated);
        assert!(third.cursor.is_none());
    }

    #[test]
    fn delimiter_groups_collapse_to_one_entry() {
        let records = vec![
            record("a.png"),
            record("docs/b.png"),
            record("docs/sub/c.png"),
            record("pics/d.png"),
        ];
        let page = assemble_page(records, &request("", 100, Some("/")));

        let keys: Vec<_> = page.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["a.png"]);
        assert_eq!(page.delimited_prefixes, vec!["docs/", "pics/"]);
        assert!(!page.truncated);
    }

    #[test]
    fn cursor_on_group_skips_its_members() {
        let records = vec![record("docs/a.png"), record("docs/b.png"), record("zzz.png")];

        let first = assemble_page(records.clone(), &request("", 1, Some("/")));
        assert_eq!(first.delimited_prefixes, vec!["docs/"]);
        assert_eq!(first.cursor.as_deref(), Some("docs/"));

        let mut resumed = request("", 10, Some("/"));
        resumed.cursor = first.cursor;
        let second = assemble_page(records, &resumed);
        // Members of the already-emitted group must not resurface as objects.
        assert!(second.delimited_prefixes.is_empty());
        let keys: Vec<_> = second.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["zzz.png"]);
    }

    #[test]
    fn mid_segment_prefix_groups_like_s3() {
        let records = vec![record("2024/08/a.png"), record("2024/09/b.png")];
        let page = assemble_page(records, &request("2024", 100, Some("/")));
        // The first delimiter past the prefix sits right after "2024".
        assert_eq!(page.delimited_prefixes, vec!["2024/"]);
        assert!(page.objects.is_empty());
    }
}
