use super::parser::RawTable;
use crate::workflows::placement::domain::{Site, Student};
use std::collections::HashMap;

/// Capacity used when the capacity column is absent or a cell does not parse.
pub(crate) const DEFAULT_CAPACITY: u32 = 1;

/// Canonical field plus the ordered header aliases accepted for it. The
/// canonical name leads every list so normalization is idempotent over its
/// own output.
struct ColumnSpec {
    canonical: &'static str,
    aliases: &'static [&'static str],
    required: bool,
}

const STUDENT_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        canonical: "id",
        aliases: &["id", "student id", "student_id", "תז", "ת.ז", "תעודת זהות"],
        required: true,
    },
    ColumnSpec {
        canonical: "first_name",
        aliases: &["first_name", "first name", "שם פרטי"],
        required: true,
    },
    ColumnSpec {
        canonical: "last_name",
        aliases: &["last_name", "last name", "שם משפחה"],
        required: true,
    },
    ColumnSpec {
        canonical: "city",
        aliases: &["city", "עיר", "עיר מגורים", "יישוב"],
        required: false,
    },
    ColumnSpec {
        canonical: "preferred_field",
        aliases: &["preferred_field", "preferred field", "field", "תחום מועדף", "תחום"],
        required: false,
    },
    ColumnSpec {
        canonical: "special_request",
        aliases: &["special_request", "special request", "request", "בקשה מיוחדת", "הערות"],
        required: false,
    },
];

const SITE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        canonical: "name",
        aliases: &["name", "site", "site name", "site_name", "מוסד", "שם מוסד"],
        required: true,
    },
    ColumnSpec {
        canonical: "field",
        aliases: &["field", "department", "תחום", "מחלקה"],
        required: true,
    },
    ColumnSpec {
        canonical: "city",
        aliases: &["city", "עיר", "יישוב"],
        required: false,
    },
    ColumnSpec {
        canonical: "capacity",
        aliases: &["capacity", "slots", "קיבולת", "מכסה"],
        required: false,
    },
    ColumnSpec {
        canonical: "supervisor",
        aliases: &["supervisor", "mentor", "מדריך", "מנחה"],
        required: false,
    },
];

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("required {entity} column '{canonical}' not found; accepted headers: {aliases:?}")]
    MissingColumn {
        entity: &'static str,
        canonical: &'static str,
        aliases: &'static [&'static str],
    },
}

pub(crate) fn normalize_students(table: &RawTable) -> Result<Vec<Student>, NormalizeError> {
    let columns = resolve_columns(&table.headers, STUDENT_COLUMNS, "student")?;

    Ok(table
        .rows
        .iter()
        .map(|row| {
            let cell = |canonical| cell_for(&columns, row, canonical);
            Student {
                id: cell("id"),
                first_name: cell("first_name"),
                last_name: cell("last_name"),
                city: cell("city"),
                preferred_field: cell("preferred_field"),
                special_request: cell("special_request"),
            }
        })
        .collect())
}

pub(crate) fn normalize_sites(table: &RawTable) -> Result<Vec<Site>, NormalizeError> {
    let columns = resolve_columns(&table.headers, SITE_COLUMNS, "site")?;

    Ok(table
        .rows
        .iter()
        .map(|row| {
            let cell = |canonical| cell_for(&columns, row, canonical);
            Site {
                name: cell("name"),
                field: cell("field"),
                city: cell("city"),
                capacity: parse_capacity(&cell("capacity")).unwrap_or(DEFAULT_CAPACITY),
                supervisor: cell("supervisor"),
            }
        })
        .collect())
}

/// Maps each canonical field to the index of the first matching alias in the
/// header row. Missing optional fields are simply absent from the map.
fn resolve_columns(
    headers: &[String],
    specs: &[ColumnSpec],
    entity: &'static str,
) -> Result<HashMap<&'static str, usize>, NormalizeError> {
    let mut by_header: HashMap<String, usize> = HashMap::with_capacity(headers.len());
    for (index, header) in headers.iter().enumerate() {
        by_header.entry(normalize_header(header)).or_insert(index);
    }

    let mut resolved = HashMap::with_capacity(specs.len());
    for spec in specs {
        let index = spec
            .aliases
            .iter()
            .find_map(|alias| by_header.get(&normalize_header(alias)).copied());

        match index {
            Some(index) => {
                resolved.insert(spec.canonical, index);
            }
            None if spec.required => {
                return Err(NormalizeError::MissingColumn {
                    entity,
                    canonical: spec.canonical,
                    aliases: spec.aliases,
                });
            }
            None => {}
        }
    }

    Ok(resolved)
}

fn cell_for(columns: &HashMap<&'static str, usize>, row: &[String], canonical: &str) -> String {
    columns
        .get(canonical)
        .and_then(|&index| row.get(index))
        .map(|value| clean_cell(value))
        .unwrap_or_default()
}

pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

/// Trims and maps missing/NaN-like cells to the empty string, never to a null.
fn clean_cell(value: &str) -> String {
    let trimmed = value.trim();
    let lowered = trimmed.to_ascii_lowercase();
    if matches!(lowered.as_str(), "" | "nan" | "null" | "none") {
        String::new()
    } else {
        trimmed.to_string()
    }
}

fn parse_capacity(raw: &str) -> Option<u32> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(value) = raw.parse::<i64>() {
        return u32::try_from(value).ok();
    }
    // Spreadsheet exports often render integers as floats ("2.0").
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Some(value.trunc() as u32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn resolves_first_matching_alias() {
        let input = table(
            &["Student ID", "First Name", "Last Name", "עיר"],
            &[&["123", "Noa", "Levi", "Haifa"]],
        );
        let students = normalize_students(&input).expect("normalize");
        assert_eq!(students[0].id, "123");
        assert_eq!(students[0].city, "Haifa");
        assert_eq!(students[0].preferred_field, "");
    }

    #[test]
    fn missing_required_column_is_fatal_for_the_whole_table() {
        let input = table(&["First Name", "Last Name"], &[&["Noa", "Levi"]]);
        let error = normalize_students(&input).expect_err("id column missing");
        match error {
            NormalizeError::MissingColumn {
                entity, canonical, ..
            } => {
                assert_eq!(entity, "student");
                assert_eq!(canonical, "id");
            }
        }
    }

    #[test]
    fn nan_like_cells_normalize_to_empty_string() {
        let input = table(
            &["id", "first_name", "last_name", "city"],
            &[&["1", "Noa", "Levi", "NaN"], &["2", "Dan", "Cohen", "null"]],
        );
        let students = normalize_students(&input).expect("normalize");
        assert_eq!(students[0].city, "");
        assert_eq!(students[1].city, "");
    }

    #[test]
    fn capacity_defaults_when_absent_or_unparseable() {
        let no_column = table(&["name", "field"], &[&["Clinic", "Hospital"]]);
        let sites = normalize_sites(&no_column).expect("normalize");
        assert_eq!(sites[0].capacity, DEFAULT_CAPACITY);

        let bad_cells = table(
            &["name", "field", "capacity"],
            &[
                &["A", "Hospital", "many"],
                &["B", "Hospital", "-3"],
                &["C", "Hospital", "2.0"],
                &["D", "Hospital", "4"],
            ],
        );
        let sites = normalize_sites(&bad_cells).expect("normalize");
        assert_eq!(sites[0].capacity, DEFAULT_CAPACITY);
        assert_eq!(sites[1].capacity, DEFAULT_CAPACITY);
        assert_eq!(sites[2].capacity, 2);
        assert_eq!(sites[3].capacity, 4);
    }

    #[test]
    fn header_matching_ignores_case_bom_and_extra_whitespace() {
        let input = table(
            &["\u{feff}Site  Name", "FIELD", "Capacity"],
            &[&["Clinic", "Hospital", "3"]],
        );
        let sites = normalize_sites(&input).expect("normalize");
        assert_eq!(sites[0].name, "Clinic");
        assert_eq!(sites[0].capacity, 3);
    }

    #[test]
    fn normalization_is_idempotent_over_canonical_output() {
        let input = table(
            &["Student ID", "First Name", "Last Name", "עיר", "תחום מועדף"],
            &[&["1", " Noa ", "Levi", "Haifa", "Hospital"]],
        );
        let first = normalize_students(&input).expect("first pass");

        let canonical = table(
            &[
                "id",
                "first_name",
                "last_name",
                "city",
                "preferred_field",
                "special_request",
            ],
            &[],
        );
        let mut canonical = canonical;
        canonical.rows = first
            .iter()
            .map(|s| {
                vec![
                    s.id.clone(),
                    s.first_name.clone(),
                    s.last_name.clone(),
                    s.city.clone(),
                    s.preferred_field.clone(),
                    s.special_request.clone(),
                ]
            })
            .collect();

        let second = normalize_students(&canonical).expect("second pass");
        assert_eq!(first, second);
    }
}
