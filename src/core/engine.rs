use super::rules::{
    HEAD_OF_SCHOOL_TIERS, LEAD_GUIDE_TIERS, LEASE_TERM_TIERS, MARGIN_TIERS,
    PROGRAMS_PER_STUDENT_TIERS, tier_value,
};
use super::types::{
    ADMIN_SALARY, Expenses, FacilityBudget, GUIDE_SALARY, HEAD_OF_SCHOOL_SALARY, Inputs,
    LEAD_GUIDE_SALARY, MISC_EXPENSE_PER_STUDENT, MarginTier, ModelRecord, ModelResult,
    SOFTWARE_EXPENSE_PER_STUDENT, STUDENTS_PER_GUIDE, Staffing,
};

pub fn run_model(inputs: &Inputs) -> ModelResult {
    let staffing = derive_staffing(inputs.student_count);
    let margin_tier = margin_tier(inputs.student_count);
    let lease_term_years = lease_term_years(inputs.student_count);
    let records = evaluate(
        inputs.student_count,
        inputs.lease_allocation_percent,
        &inputs.tuition_levels,
    );

    ModelResult {
        margin_tier,
        staffing,
        lease_term_years,
        records,
    }
}

pub fn evaluate(
    student_count: u32,
    lease_allocation_percent: u32,
    tuition_levels: &[f64],
) -> Vec<ModelRecord> {
    let staffing = derive_staffing(student_count);
    let expenses = aggregate_expenses(staffing, student_count);
    let target_margin = margin_tier(student_count).rate();
    let lease_term_years = lease_term_years(student_count);

    tuition_levels
        .iter()
        .map(|&tuition| {
            let revenue = tuition * student_count as f64;
            let budget = split_facility_budget(
                revenue,
                expenses.operating_expenses,
                target_margin,
                lease_term_years,
                lease_allocation_percent,
            );
            build_record(tuition, student_count, staffing, &expenses, &budget)
        })
        .collect()
}

pub fn derive_staffing(student_count: u32) -> Staffing {
    let lead_guides = tier_value(&LEAD_GUIDE_TIERS, student_count);
    // n / 11 is never k + 0.5 for integer n, so the rounding mode cannot matter.
    let guides_needed = (student_count as f64 / STUDENTS_PER_GUIDE).round() as u32;

    Staffing {
        lead_guides,
        guides: guides_needed.saturating_sub(lead_guides),
        head_of_school: tier_value(&HEAD_OF_SCHOOL_TIERS, student_count),
        admin: 1,
    }
}

pub fn aggregate_expenses(staffing: Staffing, student_count: u32) -> Expenses {
    let students = student_count as f64;
    let guides_expense =
        staffing.lead_guides as f64 * LEAD_GUIDE_SALARY + staffing.guides as f64 * GUIDE_SALARY;
    let other_hc_expense = staffing.head_of_school as f64 * HEAD_OF_SCHOOL_SALARY
        + staffing.admin as f64 * ADMIN_SALARY;
    let total_headcount = guides_expense + other_hc_expense;

    let programs_per_student = tier_value(&PROGRAMS_PER_STUDENT_TIERS, student_count);
    let programs = programs_per_student * students;
    let misc = MISC_EXPENSE_PER_STUDENT * students;
    let software = SOFTWARE_EXPENSE_PER_STUDENT * students;

    Expenses {
        guides_expense,
        other_hc_expense,
        total_headcount,
        programs_per_student,
        programs,
        misc,
        software,
        operating_expenses: total_headcount + programs + misc + software,
    }
}

pub fn margin_tier(student_count: u32) -> MarginTier {
    tier_value(&MARGIN_TIERS, student_count)
}

pub fn lease_term_years(student_count: u32) -> u32 {
    tier_value(&LEASE_TERM_TIERS, student_count)
}

pub fn facility_budget(
    student_count: u32,
    tuition: f64,
    operating_expenses: f64,
    lease_allocation_percent: u32,
) -> FacilityBudget {
    split_facility_budget(
        tuition * student_count as f64,
        operating_expenses,
        margin_tier(student_count).rate(),
        lease_term_years(student_count),
        lease_allocation_percent,
    )
}

fn split_facility_budget(
    revenue: f64,
    operating_expenses: f64,
    target_margin: f64,
    lease_term_years: u32,
    lease_allocation_percent: u32,
) -> FacilityBudget {
    let target_profit = revenue * target_margin;
    let gross_available = revenue - operating_expenses;
    let available_for_facilities = gross_available - target_profit;

    let lease_share = lease_allocation_percent as f64 / 100.0;
    let capex_share = (100.0 - lease_allocation_percent as f64) / 100.0;

    let lease_and_other_total = available_for_facilities * lease_share;
    let half = lease_and_other_total / 2.0;
    let annual_capex_depreciation = available_for_facilities * capex_share;

    FacilityBudget {
        revenue,
        target_margin,
        target_profit,
        gross_available,
        available_for_facilities,
        lease_term_years,
        lease_and_other_total,
        annual_lease_amount: half,
        annual_other_facilities: half,
        annual_capex_depreciation,
        total_capex_allowed: annual_capex_depreciation * lease_term_years as f64,
    }
}

fn build_record(
    tuition: f64,
    student_count: u32,
    staffing: Staffing,
    expenses: &Expenses,
    budget: &FacilityBudget,
) -> ModelRecord {
    let students = student_count as f64;
    let total_guides = staffing.total_guides();

    ModelRecord {
        tuition,
        lead_guides: staffing.lead_guides,
        guides: staffing.guides,
        total_guides,
        guide_ratio: students / total_guides as f64,
        head_of_school: staffing.head_of_school,
        admin: staffing.admin,
        guides_expense: expenses.guides_expense,
        other_hc_expense: expenses.other_hc_expense,
        total_headcount: expenses.total_headcount,
        programs_per_student: expenses.programs_per_student,
        programs: expenses.programs,
        misc: expenses.misc,
        software: expenses.software,
        revenue: budget.revenue,
        operating_expenses: expenses.operating_expenses,
        target_margin: budget.target_margin,
        target_profit: budget.target_profit,
        gross_available: budget.gross_available,
        available_for_facilities: budget.available_for_facilities,
        lease_term_years: budget.lease_term_years,
        lease_and_other_total: budget.lease_and_other_total,
        annual_lease_amount: budget.annual_lease_amount,
        annual_other_facilities: budget.annual_other_facilities,
        annual_capex_depreciation: budget.annual_capex_depreciation,
        total_capex_allowed: budget.total_capex_allowed,
        per_student_facility: budget.available_for_facilities / students,
        facility_margin: budget.available_for_facilities / budget.revenue,
        actual_margin: (budget.revenue
            - expenses.operating_expenses
            - budget.available_for_facilities)
            / budget.revenue,
    }
}
