use serde::Deserialize;
use ts_rs::TS;

use crate::errors::{LmsError, Result};

// 创建实验请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "bindings/lab.ts")]
pub struct CreateLabRequest {
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    pub duration_minutes: Option<i32>,
    pub max_attempts: Option<i32>,
}

impl CreateLabRequest {
    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        validate_limits(self.duration_minutes, self.max_attempts)
    }
}

/// 实验更新请求
///
/// 只允许白名单内的字段，未知字段在反序列化阶段即被拒绝。
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(export, export_to = "bindings/lab.ts")]
pub struct UpdateLabRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_published: Option<bool>,
    pub duration_minutes: Option<i32>,
    pub max_attempts: Option<i32>,
}

impl UpdateLabRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.is_published.is_none()
            && self.duration_minutes.is_none()
            && self.max_attempts.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(LmsError::validation("No updatable fields provided"));
        }
        if let Some(ref title) = self.title {
            validate_title(title)?;
        }
        validate_limits(self.duration_minutes, self.max_attempts)
    }
}

// 创建评分细则请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "bindings/lab.ts")]
pub struct CreateCriterionRequest {
    pub criterion_name: String,
    pub criterion_description: Option<String>,
    pub max_points: f64,
    pub order_index: Option<i32>,
}

impl CreateCriterionRequest {
    pub fn validate(&self) -> Result<()> {
        if self.criterion_name.trim().is_empty() {
            return Err(LmsError::validation("criterion_name must not be empty"));
        }
        if !self.max_points.is_finite() || self.max_points <= 0.0 {
            return Err(LmsError::validation(
                "max_points must be a positive number",
            ));
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<()> {
    let len = title.trim().chars().count();
    if len == 0 || len > 200 {
        return Err(LmsError::validation(
            "Title length must be between 1 and 200 characters",
        ));
    }
    Ok(())
}

fn validate_limits(duration_minutes: Option<i32>, max_attempts: Option<i32>) -> Result<()> {
    if matches!(duration_minutes, Some(d) if d <= 0) {
        return Err(LmsError::validation("duration_minutes must be positive"));
    }
    if matches!(max_attempts, Some(a) if a < 1) {
        return Err(LmsError::validation("max_attempts must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_rejects_unknown_fields() {
        let err = serde_json::from_str::<UpdateLabRequest>(r#"{"course_id": 9}"#).unwrap_err();
        assert!(err.to_string().contains("unknown field"));

        let ok: UpdateLabRequest =
            serde_json::from_str(r#"{"title": "Titration", "max_attempts": 2}"#).unwrap();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_update_requires_some_field() {
        assert!(UpdateLabRequest::default().validate().is_err());
    }

    #[test]
    fn test_criterion_max_points_positive() {
        let mut req = CreateCriterionRequest {
            criterion_name: "Accuracy".into(),
            criterion_description: None,
            max_points: 0.0,
            order_index: None,
        };
        assert!(req.validate().is_err());
        req.max_points = f64::NAN;
        assert!(req.validate().is_err());
        req.max_points = 5.0;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_lab_limits() {
        let req = CreateLabRequest {
            course_id: 1,
            title: "Pendulum".into(),
            description: None,
            is_published: true,
            duration_minutes: Some(0),
            max_attempts: None,
        };
        assert!(req.validate().is_err());
    }
}
