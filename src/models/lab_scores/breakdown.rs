//! 成绩聚合
//!
//! 每次批注写入后都从该成绩的全部批注重新计算 `manual_score` 与
//! `rubric_breakdown`，不做增量更新。

use std::collections::HashMap;

use super::entities::{CriterionBreakdown, LabScore, RubricBreakdown, ScoreAnnotation};
use super::responses::{CriterionSummary, LabScoreSummary};
use crate::errors::{LmsError, Result};
use crate::models::labs::entities::RubricCriterion;

/// 聚合结果
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreAggregate {
    pub manual_score: f64,
    pub breakdown: RubricBreakdown,
}

/// 得分百分比，满分为 0 时记 0
pub fn percentage(awarded: f64, max_points: f64) -> f64 {
    if max_points > 0.0 {
        awarded * 100.0 / max_points
    } else {
        0.0
    }
}

/// 校验给分区间 `0 <= points <= max_points`，超出直接拒绝
pub fn check_points(points: f64, max_points: f64) -> Result<()> {
    if !points.is_finite() {
        return Err(LmsError::validation("points_awarded must be a finite number"));
    }
    if points < 0.0 || points > max_points {
        return Err(LmsError::validation(format!(
            "points_awarded must be between 0 and {max_points}, got {points}"
        )));
    }
    Ok(())
}

/// 从全部批注重建明细并求和
///
/// 只统计细则仍存在的批注；总分按细则 ID 顺序累加，结果与批注的读取顺序无关。
pub fn aggregate(criteria: &[RubricCriterion], annotations: &[ScoreAnnotation]) -> ScoreAggregate {
    let by_id: HashMap<i64, &RubricCriterion> = criteria.iter().map(|c| (c.id, c)).collect();

    let mut breakdown = RubricBreakdown::new();
    for annotation in annotations {
        let Some(criterion) = by_id.get(&annotation.criterion_id) else {
            continue;
        };
        breakdown.insert(
            criterion.id,
            CriterionBreakdown {
                name: criterion.criterion_name.clone(),
                max_points: criterion.max_points,
                awarded_points: annotation.points_awarded,
                teacher_comment: annotation.teacher_comment.clone(),
                annotation_type: annotation.annotation_type.clone(),
                percentage: percentage(annotation.points_awarded, criterion.max_points),
            },
        );
    }

    let manual_score = breakdown.values().map(|b| b.awarded_points).sum();

    ScoreAggregate {
        manual_score,
        breakdown,
    }
}

/// 实验成绩统计
pub fn summarize(lab_id: i64, criteria: &[RubricCriterion], scores: &[LabScore]) -> LabScoreSummary {
    let graded_count = scores.len() as i64;
    let totals: Vec<f64> = scores.iter().map(|s| s.manual_score).collect();

    let average_score = mean(&totals);
    let highest_score = totals.iter().copied().reduce(f64::max);
    let lowest_score = totals.iter().copied().reduce(f64::min);
    let score_stddev = sample_stddev(&totals);

    let mut ordered: Vec<&RubricCriterion> = criteria.iter().collect();
    ordered.sort_by_key(|c| (c.order_index, c.id));

    let criteria = ordered
        .into_iter()
        .map(|criterion| {
            let awarded: Vec<&CriterionBreakdown> = scores
                .iter()
                .filter_map(|s| s.rubric_breakdown.get(&criterion.id))
                .collect();
            let points: Vec<f64> = awarded.iter().map(|b| b.awarded_points).collect();
            let percentages: Vec<f64> = awarded.iter().map(|b| b.percentage).collect();

            CriterionSummary {
                criterion_id: criterion.id,
                criterion_name: criterion.criterion_name.clone(),
                max_points: criterion.max_points,
                annotated_count: awarded.len() as i64,
                average_points: mean(&points),
                average_percentage: mean(&percentages),
            }
        })
        .collect();

    LabScoreSummary {
        lab_id,
        graded_count,
        average_score,
        highest_score,
        lowest_score,
        score_stddev,
        criteria,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// 样本标准差（n - 1），少于两个成绩时没有意义
fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn criterion(id: i64, name: &str, max_points: f64, order_index: i32) -> RubricCriterion {
        RubricCriterion {
            id,
            lab_id: 1,
            criterion_name: name.to_string(),
            criterion_description: None,
            max_points,
            order_index,
            created_at: Utc::now(),
        }
    }

    fn annotation(criterion_id: i64, points: f64) -> ScoreAnnotation {
        ScoreAnnotation {
            id: criterion_id * 10,
            score_id: 1,
            criterion_id,
            points_awarded: points,
            teacher_comment: format!("comment {criterion_id}"),
            annotation_type: "feedback".to_string(),
            created_by: 7,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_two_criteria_scenario() {
        let criteria = vec![criterion(1, "A", 5.0, 0), criterion(2, "B", 10.0, 1)];

        let first = aggregate(&criteria, &[annotation(1, 4.0), annotation(2, 7.0)]);
        assert_eq!(first.manual_score, 11.0);
        assert_eq!(first.breakdown[&1].percentage, 80.0);
        assert_eq!(first.breakdown[&2].percentage, 70.0);

        let second = aggregate(&criteria, &[annotation(1, 5.0), annotation(2, 7.0)]);
        assert_eq!(second.manual_score, 12.0);
        assert_eq!(second.breakdown[&1].percentage, 100.0);
        assert_eq!(second.breakdown[&2].percentage, 70.0);

        let again = aggregate(&criteria, &[annotation(1, 5.0), annotation(2, 7.0)]);
        assert_eq!(again, second);
    }

    #[test]
    fn test_order_independent() {
        let criteria = vec![
            criterion(1, "A", 3.3, 0),
            criterion(2, "B", 7.7, 1),
            criterion(3, "C", 1.1, 2),
        ];
        let forward = [annotation(1, 0.1), annotation(2, 0.2), annotation(3, 0.3)];
        let backward = [annotation(3, 0.3), annotation(2, 0.2), annotation(1, 0.1)];
        assert_eq!(aggregate(&criteria, &forward), aggregate(&criteria, &backward));
    }

    #[test]
    fn test_sum_matches_breakdown() {
        let criteria = vec![criterion(1, "A", 5.0, 0), criterion(2, "B", 10.0, 1)];
        let result = aggregate(&criteria, &[annotation(2, 2.5)]);
        let sum: f64 = result.breakdown.values().map(|b| b.awarded_points).sum();
        assert_eq!(result.manual_score, sum);
        assert_eq!(result.breakdown.len(), 1);
    }

    #[test]
    fn test_annotation_without_criterion_is_skipped() {
        let criteria = vec![criterion(1, "A", 5.0, 0)];
        let result = aggregate(&criteria, &[annotation(1, 1.0), annotation(99, 4.0)]);
        assert_eq!(result.manual_score, 1.0);
        assert!(!result.breakdown.contains_key(&99));
    }

    #[test]
    fn test_empty_annotations() {
        let result = aggregate(&[criterion(1, "A", 5.0, 0)], &[]);
        assert_eq!(result.manual_score, 0.0);
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn test_check_points_range() {
        assert!(check_points(0.0, 5.0).is_ok());
        assert!(check_points(5.0, 5.0).is_ok());
        assert!(check_points(-0.5, 5.0).is_err());
        assert!(check_points(5.01, 5.0).is_err());
        assert!(check_points(f64::INFINITY, 5.0).is_err());
        assert!(check_points(f64::NAN, 5.0).is_err());
    }

    #[test]
    fn test_percentage_zero_max() {
        assert_eq!(percentage(3.0, 0.0), 0.0);
        assert_eq!(percentage(1.0, 4.0), 25.0);
    }

    #[test]
    fn test_summarize() {
        let criteria = vec![criterion(2, "B", 10.0, 1), criterion(1, "A", 5.0, 0)];
        let make_score = |id: i64, a: f64, b: Option<f64>| {
            let mut anns = vec![annotation(1, a)];
            if let Some(b) = b {
                anns.push(annotation(2, b));
            }
            let agg = aggregate(&criteria, &anns);
            LabScore {
                id,
                student_id: id,
                lab_id: 1,
                manual_score: agg.manual_score,
                rubric_breakdown: agg.breakdown,
                graded_by: Some(7),
                graded_at: Some(Utc::now()),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }
        };
        let scores = vec![make_score(1, 4.0, Some(6.0)), make_score(2, 2.0, None)];

        let summary = summarize(1, &criteria, &scores);
        assert_eq!(summary.graded_count, 2);
        assert_eq!(summary.average_score, Some(6.0));
        assert_eq!(summary.highest_score, Some(10.0));
        assert_eq!(summary.lowest_score, Some(2.0));
        let stddev = summary.score_stddev.unwrap();
        assert!((stddev - 32f64.sqrt()).abs() < 1e-9, "{stddev}");

        // 按 order_index 排序
        assert_eq!(summary.criteria[0].criterion_id, 1);
        assert_eq!(summary.criteria[0].annotated_count, 2);
        assert_eq!(summary.criteria[0].average_points, Some(3.0));
        assert_eq!(summary.criteria[0].average_percentage, Some(60.0));
        assert_eq!(summary.criteria[1].annotated_count, 1);
        assert_eq!(summary.criteria[1].average_points, Some(6.0));
    }

    #[test]
    fn test_summarize_no_scores() {
        let summary = summarize(3, &[criterion(1, "A", 5.0, 0)], &[]);
        assert_eq!(summary.graded_count, 0);
        assert_eq!(summary.average_score, None);
        assert_eq!(summary.score_stddev, None);
        assert_eq!(summary.criteria[0].average_points, None);
    }

    #[test]
    fn test_stddev_needs_two_scores() {
        assert_eq!(sample_stddev(&[]), None);
        assert_eq!(sample_stddev(&[7.0]), None);
        assert_eq!(sample_stddev(&[4.0, 4.0, 4.0]), Some(0.0));
        assert_eq!(sample_stddev(&[2.0, 4.0, 6.0]), Some(2.0));
    }
}
