use serde::Serialize;

pub const DEFAULT_TUITION_LEVELS: [f64; 3] = [40_000.0, 50_000.0, 65_000.0];

pub const LEAD_GUIDE_SALARY: f64 = 200_000.0;
pub const GUIDE_SALARY: f64 = 150_000.0;
pub const HEAD_OF_SCHOOL_SALARY: f64 = 300_000.0;
pub const ADMIN_SALARY: f64 = 60_000.0;
pub const MISC_EXPENSE_PER_STUDENT: f64 = 1_500.0;
pub const SOFTWARE_EXPENSE_PER_STUDENT: f64 = 5_000.0;
pub const STUDENTS_PER_GUIDE: f64 = 11.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginTier {
    Breakeven,
    Standard,
    Growth,
}

impl MarginTier {
    pub fn rate(self) -> f64 {
        match self {
            MarginTier::Breakeven => 0.0,
            MarginTier::Standard => 0.15,
            MarginTier::Growth => 0.25,
        }
    }
}

/// Inclusive enrollment band. `max_students: None` means the band is open-ended.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier<T> {
    pub min_students: u32,
    pub max_students: Option<u32>,
    pub value: T,
}

impl<T> Tier<T> {
    pub fn contains(&self, student_count: u32) -> bool {
        student_count >= self.min_students
            && self.max_students.is_none_or(|max| student_count <= max)
    }
}

#[derive(Debug, Clone)]
pub struct Inputs {
    pub student_count: u32,
    pub lease_allocation_percent: u32,
    pub tuition_levels: Vec<f64>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Staffing {
    pub lead_guides: u32,
    pub guides: u32,
    pub head_of_school: u32,
    pub admin: u32,
}

impl Staffing {
    pub fn total_guides(self) -> u32 {
        self.lead_guides + self.guides
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Expenses {
    pub guides_expense: f64,
    pub other_hc_expense: f64,
    pub total_headcount: f64,
    pub programs_per_student: f64,
    pub programs: f64,
    pub misc: f64,
    pub software: f64,
    pub operating_expenses: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FacilityBudget {
    pub revenue: f64,
    pub target_margin: f64,
    pub target_profit: f64,
    pub gross_available: f64,
    pub available_for_facilities: f64,
    pub lease_term_years: u32,
    pub lease_and_other_total: f64,
    pub annual_lease_amount: f64,
    pub annual_other_facilities: f64,
    pub annual_capex_depreciation: f64,
    pub total_capex_allowed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    pub tuition: f64,
    pub lead_guides: u32,
    pub guides: u32,
    pub total_guides: u32,
    pub guide_ratio: f64,
    pub head_of_school: u32,
    pub admin: u32,
    pub guides_expense: f64,
    #[serde(rename = "otherHCExpense")]
    pub other_hc_expense: f64,
    pub total_headcount: f64,
    pub programs_per_student: f64,
    pub programs: f64,
    pub misc: f64,
    pub software: f64,
    pub revenue: f64,
    pub operating_expenses: f64,
    pub target_margin: f64,
    pub target_profit: f64,
    pub gross_available: f64,
    pub available_for_facilities: f64,
    pub lease_term_years: u32,
    pub lease_and_other_total: f64,
    pub annual_lease_amount: f64,
    pub annual_other_facilities: f64,
    pub annual_capex_depreciation: f64,
    pub total_capex_allowed: f64,
    pub per_student_facility: f64,
    pub facility_margin: f64,
    pub actual_margin: f64,
}

#[derive(Debug, Clone)]
pub struct ModelResult {
    pub margin_tier: MarginTier,
    pub staffing: Staffing,
    pub lease_term_years: u32,
    pub records: Vec<ModelRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepPoint {
    pub student_count: u32,
    pub margin_tier: MarginTier,
    pub records: Vec<ModelRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViableEnrollment {
    pub tuition: f64,
    pub min_student_count: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct SweepResult {
    pub points: Vec<SweepPoint>,
    pub viable_enrollment: Vec<ViableEnrollment>,
}
