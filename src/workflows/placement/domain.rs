use serde::{Deserialize, Serialize};

/// Normalized student record produced by intake. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Empty string when the source row carried no city.
    pub city: String,
    /// Empty string when the student expressed no field preference.
    pub preferred_field: String,
    /// Free-text request, scanned for the proximity marker during scoring.
    pub special_request: String,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Normalized placement site. Identity is the site name; remaining slots are
/// tracked by the allocator's run state, never on the site itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    pub field: String,
    pub city: String,
    pub capacity: u32,
    /// Shared across sites when several list the same person; empty when unknown.
    pub supervisor: String,
}

/// Raw component values (0-100) feeding the weighted total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub field: u8,
    pub city: u8,
    pub special: u8,
    /// Reserved for a future student-ranking input; always 0 today.
    pub priority: u8,
}

/// Outcome for a single student. `site_name` is `None` when no site with
/// spare capacity existed at the student's turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub student: Student,
    pub site_name: Option<String>,
    pub score: u8,
    pub breakdown: ScoreBreakdown,
    /// True when the supervisor cap had to be relaxed to place this student.
    pub cap_relaxed: bool,
}

impl Assignment {
    pub fn unassigned(student: Student) -> Self {
        Self {
            student,
            site_name: None,
            score: 0,
            breakdown: ScoreBreakdown::default(),
            cap_relaxed: false,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.site_name.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Student {
        Student {
            id: "s-1".to_string(),
            first_name: "Noa".to_string(),
            last_name: "Levi".to_string(),
            city: "Haifa".to_string(),
            preferred_field: "Hospital".to_string(),
            special_request: String::new(),
        }
    }

    #[test]
    fn unassigned_sentinel_has_zero_score_and_breakdown() {
        let assignment = Assignment::unassigned(student());
        assert!(!assignment.is_assigned());
        assert_eq!(assignment.score, 0);
        assert_eq!(assignment.breakdown, ScoreBreakdown::default());
        assert!(!assignment.cap_relaxed);
    }

    #[test]
    fn full_name_joins_first_and_last() {
        assert_eq!(student().full_name(), "Noa Levi");
    }
}
