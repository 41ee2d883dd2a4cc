use super::engine::{evaluate, margin_tier};
use super::types::{SweepPoint, SweepResult, ViableEnrollment};

pub fn run_enrollment_sweep(
    lease_allocation_percent: u32,
    tuition_levels: &[f64],
    min_students: u32,
    max_students: u32,
    step: u32,
) -> SweepResult {
    let points: Vec<SweepPoint> = sweep_student_counts(min_students, max_students, step)
        .into_iter()
        .map(|student_count| SweepPoint {
            student_count,
            margin_tier: margin_tier(student_count),
            records: evaluate(student_count, lease_allocation_percent, tuition_levels),
        })
        .collect();

    let viable_enrollment = tuition_levels
        .iter()
        .enumerate()
        .map(|(idx, &tuition)| ViableEnrollment {
            tuition,
            min_student_count: points
                .iter()
                .find(|point| point.records[idx].available_for_facilities >= 0.0)
                .map(|point| point.student_count),
        })
        .collect();

    SweepResult {
        points,
        viable_enrollment,
    }
}

fn sweep_student_counts(min_students: u32, max_students: u32, step: u32) -> Vec<u32> {
    let step = step.max(1) as usize;
    let mut counts: Vec<u32> = (min_students..=max_students).step_by(step).collect();
    if counts.last().is_some_and(|&last| last != max_students) {
        counts.push(max_students);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DEFAULT_TUITION_LEVELS, MarginTier};

    #[test]
    fn sweep_counts_always_include_the_upper_bound() {
        assert_eq!(sweep_student_counts(10, 30, 10), vec![10, 20, 30]);
        assert_eq!(sweep_student_counts(10, 35, 10), vec![10, 20, 30, 35]);
        assert_eq!(sweep_student_counts(50, 50, 5), vec![50]);
        assert!(sweep_student_counts(60, 50, 5).is_empty());
    }

    #[test]
    fn sweep_points_match_single_evaluations() {
        let sweep = run_enrollment_sweep(70, &DEFAULT_TUITION_LEVELS, 10, 500, 49);
        assert_eq!(sweep.points.first().map(|p| p.student_count), Some(10));
        assert_eq!(sweep.points.last().map(|p| p.student_count), Some(500));

        for point in &sweep.points {
            assert_eq!(point.records.len(), DEFAULT_TUITION_LEVELS.len());
            assert_eq!(
                point.records,
                evaluate(point.student_count, 70, &DEFAULT_TUITION_LEVELS)
            );
        }
    }

    #[test]
    fn viable_enrollment_is_first_non_negative_budget() {
        let sweep = run_enrollment_sweep(50, &DEFAULT_TUITION_LEVELS, 10, 500, 1);
        assert_eq!(sweep.viable_enrollment.len(), 3);

        for (idx, viable) in sweep.viable_enrollment.iter().enumerate() {
            assert_eq!(viable.tuition, DEFAULT_TUITION_LEVELS[idx]);
            let Some(min_students) = viable.min_student_count else {
                continue;
            };
            for point in sweep.points.iter().filter(|p| p.student_count < min_students) {
                assert!(point.records[idx].available_for_facilities < 0.0);
            }
            let hit = evaluate(min_students, 50, &[DEFAULT_TUITION_LEVELS[idx]]);
            assert!(hit[0].available_for_facilities >= 0.0);
        }

        // Ten students at the lowest tuition do not cover fixed headcount.
        assert!(sweep.points[0].records[0].available_for_facilities < 0.0);
        assert!(sweep.viable_enrollment[0].min_student_count > Some(10));
    }

    #[test]
    fn sweep_reports_margin_tier_per_point() {
        let sweep = run_enrollment_sweep(70, &[50_000.0], 29, 101, 1);
        let tier_at = |students: u32| {
            sweep
                .points
                .iter()
                .find(|p| p.student_count == students)
                .map(|p| p.margin_tier)
        };
        assert_eq!(tier_at(29), Some(MarginTier::Breakeven));
        assert_eq!(tier_at(30), Some(MarginTier::Standard));
        assert_eq!(tier_at(101), Some(MarginTier::Growth));
    }

    #[test]
    fn unreachable_budget_reports_no_viable_enrollment() {
        let sweep = run_enrollment_sweep(70, &[1_000.0], 10, 500, 10);
        assert_eq!(sweep.viable_enrollment[0].min_student_count, None);
    }
}
