mod analytics;

pub use analytics::{field_breakdown, FieldAverage};

use super::domain::{Assignment, Site};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Per-site slot usage after a run. Remaining never dips below zero; the
/// allocator stops handing out slots once capacity is consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteCapacityRow {
    pub site: String,
    pub capacity: u32,
    pub assigned: u32,
    pub remaining: u32,
}

/// Accepted assignments grouped by (site, field, supervisor), in the order
/// the groups were first produced by the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub site: String,
    pub field: String,
    pub supervisor: String,
    pub count: u32,
    /// "First Last + First Last", in student processing order.
    pub students: String,
}

pub fn capacity_report(sites: &[Site], assignments: &[Assignment]) -> Vec<SiteCapacityRow> {
    sites
        .iter()
        .map(|site| {
            let assigned = assignments
                .iter()
                .filter(|a| a.site_name.as_deref() == Some(site.name.as_str()))
                .count() as u32;
            SiteCapacityRow {
                site: site.name.clone(),
                capacity: site.capacity,
                assigned,
                remaining: site.capacity.saturating_sub(assigned),
            }
        })
        .collect()
}

pub fn supervisor_summary(sites: &[Site], assignments: &[Assignment]) -> Vec<SummaryRow> {
    let site_by_name: HashMap<&str, &Site> =
        sites.iter().map(|site| (site.name.as_str(), site)).collect();

    let mut rows: Vec<SummaryRow> = Vec::new();
    for assignment in assignments {
        let Some(site_name) = assignment.site_name.as_deref() else {
            continue;
        };
        let Some(site) = site_by_name.get(site_name) else {
            continue;
        };

        let student = assignment.student.full_name();
        let existing = rows.iter_mut().find(|row| {
            row.site == site.name && row.field == site.field && row.supervisor == site.supervisor
        });

        match existing {
            Some(row) => {
                row.count += 1;
                row.students.push_str(" + ");
                row.students.push_str(&student);
            }
            None => rows.push(SummaryRow {
                site: site.name.clone(),
                field: site.field.clone(),
                supervisor: site.supervisor.clone(),
                count: 1,
                students: student,
            }),
        }
    }

    rows
}

/// Canonical result table consumed by analytics and external presenters.
/// Unassigned students keep their row with empty site columns and score 0.
pub fn result_rows(sites: &[Site], assignments: &[Assignment]) -> Vec<BTreeMap<String, String>> {
    let site_by_name: HashMap<&str, &Site> =
        sites.iter().map(|site| (site.name.as_str(), site)).collect();

    assignments
        .iter()
        .map(|assignment| {
            let site = assignment
                .site_name
                .as_deref()
                .and_then(|name| site_by_name.get(name).copied());

            let mut row = BTreeMap::new();
            row.insert("student_id".to_string(), assignment.student.id.clone());
            row.insert(
                "first_name".to_string(),
                assignment.student.first_name.clone(),
            );
            row.insert(
                "last_name".to_string(),
                assignment.student.last_name.clone(),
            );
            row.insert(
                "site".to_string(),
                site.map(|s| s.name.clone()).unwrap_or_default(),
            );
            row.insert(
                "field".to_string(),
                site.map(|s| s.field.clone()).unwrap_or_default(),
            );
            row.insert(
                "supervisor".to_string(),
                site.map(|s| s.supervisor.clone()).unwrap_or_default(),
            );
            row.insert(
                "city".to_string(),
                site.map(|s| s.city.clone()).unwrap_or_default(),
            );
            row.insert("score".to_string(), assignment.score.to_string());
            row
        })
        .collect()
}
