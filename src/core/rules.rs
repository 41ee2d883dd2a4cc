use serde::Serialize;

use super::types::{MarginTier, Tier};

pub const LEAD_GUIDE_TIERS: [Tier<u32>; 4] = [
    Tier {
        min_students: 0,
        max_students: Some(25),
        value: 1,
    },
    Tier {
        min_students: 26,
        max_students: Some(125),
        value: 2,
    },
    Tier {
        min_students: 126,
        max_students: Some(149),
        value: 3,
    },
    Tier {
        min_students: 150,
        max_students: None,
        value: 4,
    },
];

pub const HEAD_OF_SCHOOL_TIERS: [Tier<u32>; 2] = [
    Tier {
        min_students: 0,
        max_students: Some(50),
        value: 0,
    },
    Tier {
        min_students: 51,
        max_students: None,
        value: 1,
    },
];

pub const PROGRAMS_PER_STUDENT_TIERS: [Tier<f64>; 2] = [
    Tier {
        min_students: 0,
        max_students: Some(30),
        value: 12_000.0,
    },
    Tier {
        min_students: 31,
        max_students: None,
        value: 8_500.0,
    },
];

pub const MARGIN_TIERS: [Tier<MarginTier>; 3] = [
    Tier {
        min_students: 0,
        max_students: Some(29),
        value: MarginTier::Breakeven,
    },
    Tier {
        min_students: 30,
        max_students: Some(100),
        value: MarginTier::Standard,
    },
    Tier {
        min_students: 101,
        max_students: None,
        value: MarginTier::Growth,
    },
];

pub const LEASE_TERM_TIERS: [Tier<u32>; 3] = [
    Tier {
        min_students: 0,
        max_students: Some(99),
        value: 2,
    },
    Tier {
        min_students: 100,
        max_students: Some(250),
        value: 5,
    },
    Tier {
        min_students: 251,
        max_students: None,
        value: 10,
    },
];

// Tables start at 0 and end open-ended, so the trailing tier is the fallback.
pub fn tier_value<T: Copy>(tiers: &[Tier<T>], student_count: u32) -> T {
    tiers
        .iter()
        .find(|tier| tier.contains(student_count))
        .or(tiers.last())
        .map(|tier| tier.value)
        .expect("tier tables are non-empty")
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginRule {
    pub min_students: u32,
    pub max_students: Option<u32>,
    pub tier: MarginTier,
    pub target_margin: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTables {
    pub lead_guides: Vec<Tier<u32>>,
    pub head_of_school: Vec<Tier<u32>>,
    pub programs_per_student: Vec<Tier<f64>>,
    pub target_margin: Vec<MarginRule>,
    pub lease_term_years: Vec<Tier<u32>>,
}

pub fn rule_tables() -> RuleTables {
    RuleTables {
        lead_guides: LEAD_GUIDE_TIERS.to_vec(),
        head_of_school: HEAD_OF_SCHOOL_TIERS.to_vec(),
        programs_per_student: PROGRAMS_PER_STUDENT_TIERS.to_vec(),
        target_margin: MARGIN_TIERS
            .iter()
            .map(|tier| MarginRule {
                min_students: tier.min_students,
                max_students: tier.max_students,
                tier: tier.value,
                target_margin: tier.value.rate(),
            })
            .collect(),
        lease_term_years: LEASE_TERM_TIERS.to_vec(),
    }
}
