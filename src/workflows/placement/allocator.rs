use super::domain::{Assignment, ScoreBreakdown, Site, Student};
use super::scoring::{score, Weights};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

/// Soft upper bound on accepted students per supervisor. Relaxed only when no
/// site with spare capacity remains under the cap.
pub const SUPERVISOR_CAP: u32 = 2;

/// One relaxation of the supervisor cap, kept so callers can surface it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapRelaxation {
    pub student_id: String,
    pub site_name: String,
    pub supervisor: String,
}

/// Result of one allocation run. `assignments` holds exactly one entry per
/// input student, in input order; `capacity_left` mirrors the site input
/// order and is the authoritative remaining-slot count.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementOutcome {
    pub assignments: Vec<Assignment>,
    pub relaxations: Vec<CapRelaxation>,
    pub capacity_left: Vec<u32>,
}

/// Shared mutable state of a single run, owned by the `allocate` invocation.
/// Scoring never touches it; only the acceptance step mutates it.
struct AllocationState {
    capacity_left: Vec<u32>,
    supervisor_load: HashMap<String, u32>,
}

impl AllocationState {
    fn new(sites: &[Site]) -> Self {
        Self {
            capacity_left: sites.iter().map(|site| site.capacity).collect(),
            supervisor_load: HashMap::new(),
        }
    }

    fn is_open(&self, index: usize) -> bool {
        self.capacity_left[index] > 0
    }

    fn under_cap(&self, site: &Site) -> bool {
        if site.supervisor.is_empty() {
            return true;
        }
        self.supervisor_load
            .get(&site.supervisor)
            .copied()
            .unwrap_or(0)
            < SUPERVISOR_CAP
    }

    fn accept(&mut self, index: usize, site: &Site) {
        self.capacity_left[index] -= 1;
        if !site.supervisor.is_empty() {
            *self
                .supervisor_load
                .entry(site.supervisor.clone())
                .or_insert(0) += 1;
        }
    }
}

/// Greedy, order-dependent assignment of students to sites.
///
/// Students are processed strictly in caller-supplied order; each acceptance
/// consumes capacity and supervisor headroom that later students no longer
/// see, so reordering the input changes the result. This is part of the
/// public contract, not an artifact. The pass is O(students × sites) and
/// makes no claim of global optimality.
pub fn allocate(students: &[Student], sites: &[Site], weights: &Weights) -> PlacementOutcome {
    let mut state = AllocationState::new(sites);
    let mut assignments = Vec::with_capacity(students.len());
    let mut relaxations = Vec::new();

    for student in students {
        let scored: Vec<(usize, u8, ScoreBreakdown)> = sites
            .iter()
            .enumerate()
            .filter(|(index, _)| state.is_open(*index))
            .map(|(index, site)| {
                let (total, breakdown) = score(student, site, weights);
                (index, total, breakdown)
            })
            .collect();

        let eligible = pick_best(
            scored
                .iter()
                .filter(|(index, _, _)| state.under_cap(&sites[*index])),
        );

        let (chosen, relaxed) = match eligible {
            Some(chosen) => (chosen, false),
            None => match pick_best(scored.iter()) {
                Some(chosen) => (chosen, true),
                // No site has capacity left for this student.
                None => {
                    assignments.push(Assignment::unassigned(student.clone()));
                    continue;
                }
            },
        };

        let (index, total, breakdown) = chosen;
        let site = &sites[index];

        if relaxed {
            warn!(
                student = %student.id,
                site = %site.name,
                supervisor = %site.supervisor,
                "supervisor cap relaxed to keep student placed"
            );
            relaxations.push(CapRelaxation {
                student_id: student.id.clone(),
                site_name: site.name.clone(),
                supervisor: site.supervisor.clone(),
            });
        }

        state.accept(index, site);
        assignments.push(Assignment {
            student: student.clone(),
            site_name: Some(site.name.clone()),
            score: total,
            breakdown,
            cap_relaxed: relaxed,
        });
    }

    let assigned = assignments.iter().filter(|a| a.is_assigned()).count();
    info!(
        students = students.len(),
        assigned,
        relaxations = relaxations.len(),
        "allocation run complete"
    );

    PlacementOutcome {
        assignments,
        relaxations,
        capacity_left: state.capacity_left,
    }
}

/// First maximal candidate wins; site input order is the tie-break.
fn pick_best<'a, I>(candidates: I) -> Option<(usize, u8, ScoreBreakdown)>
where
    I: Iterator<Item = &'a (usize, u8, ScoreBreakdown)>,
{
    let mut best: Option<(usize, u8, ScoreBreakdown)> = None;
    for candidate in candidates {
        match best {
            Some((_, best_score, _)) if candidate.1 <= best_score => {}
            _ => best = Some(*candidate),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: &str, city: &str, field: &str) -> Student {
        Student {
            id: id.to_string(),
            first_name: format!("First{id}"),
            last_name: format!("Last{id}"),
            city: city.to_string(),
            preferred_field: field.to_string(),
            special_request: String::new(),
        }
    }

    fn site(name: &str, city: &str, field: &str, capacity: u32, supervisor: &str) -> Site {
        Site {
            name: name.to_string(),
            field: field.to_string(),
            city: city.to_string(),
            capacity,
            supervisor: supervisor.to_string(),
        }
    }

    #[test]
    fn empty_site_collection_yields_one_unassigned_per_student_in_order() {
        let students = vec![student("1", "", ""), student("2", "", "")];
        let outcome = allocate(&students, &[], &Weights::default());

        assert_eq!(outcome.assignments.len(), 2);
        for (assignment, expected) in outcome.assignments.iter().zip(&students) {
            assert_eq!(assignment.student.id, expected.id);
            assert!(!assignment.is_assigned());
            assert_eq!(assignment.score, 0);
        }
    }

    #[test]
    fn ties_break_on_site_input_order() {
        let students = vec![student("1", "", "")];
        let sites = vec![
            site("A", "", "Hospital", 1, ""),
            site("B", "", "Hospital", 1, ""),
        ];
        let outcome = allocate(&students, &sites, &Weights::default());
        assert_eq!(outcome.assignments[0].site_name.as_deref(), Some("A"));
    }

    #[test]
    fn supervisor_cap_routes_third_student_to_alternative_site() {
        // Everyone prefers Central (field match); its supervisor tops out at two.
        let students = vec![
            student("1", "", "Hospital"),
            student("2", "", "Hospital"),
            student("3", "", "Hospital"),
        ];
        let sites = vec![
            site("Central", "", "Hospital", 3, "Dr. Cohen"),
            site("Annex", "", "Clinic", 3, "Dr. Roth"),
        ];
        let outcome = allocate(&students, &sites, &Weights::default());

        assert_eq!(outcome.assignments[0].site_name.as_deref(), Some("Central"));
        assert_eq!(outcome.assignments[1].site_name.as_deref(), Some("Central"));
        assert_eq!(outcome.assignments[2].site_name.as_deref(), Some("Annex"));
        assert!(outcome.relaxations.is_empty());
        // Central still had a slot; only the supervisor cap diverted student 3.
        assert_eq!(outcome.capacity_left[0], 1);
    }

    #[test]
    fn cap_is_relaxed_when_no_eligible_site_remains() {
        let students = vec![
            student("1", "", "Hospital"),
            student("2", "", "Hospital"),
            student("3", "", "Hospital"),
        ];
        let sites = vec![site("Central", "", "Hospital", 3, "Dr. Cohen")];
        let outcome = allocate(&students, &sites, &Weights::default());

        let third = &outcome.assignments[2];
        assert_eq!(third.site_name.as_deref(), Some("Central"));
        assert!(third.cap_relaxed);
        assert_eq!(outcome.relaxations.len(), 1);
        assert_eq!(outcome.relaxations[0].student_id, "3");
        assert_eq!(outcome.relaxations[0].supervisor, "Dr. Cohen");
    }

    #[test]
    fn empty_supervisor_name_is_never_capped() {
        let students = vec![
            student("1", "", ""),
            student("2", "", ""),
            student("3", "", ""),
        ];
        let sites = vec![site("Open House", "", "Hospital", 3, "")];
        let outcome = allocate(&students, &sites, &Weights::default());

        assert!(outcome.assignments.iter().all(Assignment::is_assigned));
        assert!(outcome.relaxations.is_empty());
    }

    #[test]
    fn zero_capacity_site_is_never_a_destination() {
        let students = vec![student("1", "", "Hospital"), student("2", "", "Hospital")];
        let sites = vec![
            site("Closed", "", "Hospital", 0, ""),
            site("Fallback", "", "Clinic", 1, ""),
        ];
        let outcome = allocate(&students, &sites, &Weights::default());

        assert_eq!(
            outcome.assignments[0].site_name.as_deref(),
            Some("Fallback")
        );
        assert!(!outcome.assignments[1].is_assigned());
        assert_eq!(outcome.capacity_left, vec![0, 0]);
    }

    #[test]
    fn student_order_is_load_bearing_under_scarcity() {
        let first_pick = student("1", "Haifa", "Hospital");
        let second_pick = student("2", "Haifa", "Hospital");
        let sites = vec![
            site("Best", "Haifa", "Hospital", 1, ""),
            site("Other", "", "Clinic", 1, ""),
        ];

        let forward = allocate(
            &[first_pick.clone(), second_pick.clone()],
            &sites,
            &Weights::default(),
        );
        let reversed = allocate(&[second_pick, first_pick], &sites, &Weights::default());

        assert_eq!(forward.assignments[0].student.id, "1");
        assert_eq!(forward.assignments[0].site_name.as_deref(), Some("Best"));
        assert_eq!(reversed.assignments[0].student.id, "2");
        assert_eq!(reversed.assignments[0].site_name.as_deref(), Some("Best"));
    }

    #[test]
    fn capacity_left_matches_capacity_minus_assigned_for_every_site() {
        let students = vec![
            student("1", "", "Hospital"),
            student("2", "", "Hospital"),
            student("3", "", "Clinic"),
        ];
        let sites = vec![
            site("A", "", "Hospital", 2, "Dr. Cohen"),
            site("B", "", "Clinic", 2, "Dr. Roth"),
        ];
        let outcome = allocate(&students, &sites, &Weights::default());

        for (index, site) in sites.iter().enumerate() {
            let assigned = outcome
                .assignments
                .iter()
                .filter(|a| a.site_name.as_deref() == Some(site.name.as_str()))
                .count() as u32;
            assert_eq!(outcome.capacity_left[index], site.capacity - assigned);
        }
    }
}
