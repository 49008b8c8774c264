use serde::Serialize;
use std::collections::BTreeMap;

/// Mean score per (site, field) over an already-produced result table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldAverage {
    pub site: String,
    pub field: String,
    pub count: u32,
    pub average_score: f64,
}

/// Aggregates result rows by (site, field). Rows without a parseable score
/// are ignored, so a table with no score column at all yields an empty
/// average table instead of an error. Unassigned rows (empty site) are
/// skipped.
pub fn field_breakdown(rows: &[BTreeMap<String, String>]) -> Vec<FieldAverage> {
    struct Bucket {
        site: String,
        field: String,
        count: u32,
        total: f64,
    }

    let mut buckets: Vec<Bucket> = Vec::new();
    for row in rows {
        let site = row.get("site").map(String::as_str).unwrap_or("");
        if site.is_empty() {
            continue;
        }
        let Some(score) = row.get("score").and_then(|raw| raw.parse::<f64>().ok()) else {
            continue;
        };
        let field = row.get("field").map(String::as_str).unwrap_or("");

        match buckets
            .iter_mut()
            .find(|bucket| bucket.site == site && bucket.field == field)
        {
            Some(bucket) => {
                bucket.count += 1;
                bucket.total += score;
            }
            None => buckets.push(Bucket {
                site: site.to_string(),
                field: field.to_string(),
                count: 1,
                total: score,
            }),
        }
    }

    buckets
        .into_iter()
        .map(|bucket| FieldAverage {
            site: bucket.site,
            field: bucket.field,
            average_score: bucket.total / f64::from(bucket.count),
            count: bucket.count,
        })
        .collect()
}
