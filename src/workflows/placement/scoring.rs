use super::domain::{ScoreBreakdown, Site, Student};
use serde::{Deserialize, Serialize};

/// Component value when the student expressed no field preference.
pub const NEUTRAL_FIELD: u8 = 70;
/// Component value when either side has no city on record.
pub const NEUTRAL_CITY: u8 = 50;
/// Component value when the request text carries no proximity marker.
pub const NEUTRAL_SPECIAL: u8 = 50;

/// Free-text marker meaning the student asked to be placed near home. Matched
/// as a case-insensitive substring of the special-request text.
pub const PROXIMITY_MARKER: &str = "close to home";

/// Relative weight of each score component. The three weights must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub field: f64,
    pub city: f64,
    pub special: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            field: 0.50,
            city: 0.05,
            special: 0.45,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("score weights must sum to 1.0, got {sum}")]
pub struct InvalidWeights {
    pub sum: f64,
}

impl Weights {
    pub fn validate(&self) -> Result<(), InvalidWeights> {
        let sum = self.field + self.city + self.special;
        if (sum - 1.0).abs() > 1e-9 {
            return Err(InvalidWeights { sum });
        }
        Ok(())
    }
}

/// Compatibility of one (student, site) pair: weighted total in [0, 100] plus
/// the raw component values behind it. Pure; never touches allocation state.
///
/// Each component is weighted and rounded on its own before summing, with
/// ties rounding away from zero, and the sum is clamped to [0, 100].
pub fn score(student: &Student, site: &Site, weights: &Weights) -> (u8, ScoreBreakdown) {
    let breakdown = ScoreBreakdown {
        field: field_component(student, site),
        city: city_component(student, site),
        special: special_component(student, site),
        priority: 0,
    };

    // Priority is a reserved input and carries no weight yet.
    let weighted = round_weighted(weights.field * f64::from(breakdown.field))
        + round_weighted(weights.city * f64::from(breakdown.city))
        + round_weighted(weights.special * f64::from(breakdown.special))
        + i64::from(breakdown.priority);

    (weighted.clamp(0, 100) as u8, breakdown)
}

fn field_component(student: &Student, site: &Site) -> u8 {
    if student.preferred_field.is_empty() {
        return NEUTRAL_FIELD;
    }
    let preferred = student.preferred_field.to_lowercase();
    if site.field.to_lowercase().contains(&preferred) {
        100
    } else {
        0
    }
}

fn city_component(student: &Student, site: &Site) -> u8 {
    if student.city.is_empty() || site.city.is_empty() {
        return NEUTRAL_CITY;
    }
    if same_city(student, site) {
        100
    } else {
        0
    }
}

fn special_component(student: &Student, site: &Site) -> u8 {
    let wants_proximity = student
        .special_request
        .to_lowercase()
        .contains(PROXIMITY_MARKER);
    if !wants_proximity {
        return NEUTRAL_SPECIAL;
    }
    if !student.city.is_empty() && !site.city.is_empty() && same_city(student, site) {
        100
    } else {
        0
    }
}

fn same_city(student: &Student, site: &Site) -> bool {
    student.city.to_lowercase() == site.city.to_lowercase()
}

fn round_weighted(value: f64) -> i64 {
    value.round() as i64
}
