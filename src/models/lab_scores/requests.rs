use serde::Deserialize;
use ts_rs::TS;

use super::entities::DEFAULT_ANNOTATION_TYPE;
use crate::errors::{LmsError, Result};

// 批注写入请求（来自HTTP请求）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "bindings/lab_score.ts")]
pub struct AnnotateRequest {
    pub criterion_id: Option<i64>,
    pub points_awarded: Option<f64>,
    pub teacher_comment: Option<String>,
    pub annotation_type: Option<String>,
}

/// 校验后的批注写入参数（用于存储层）
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationUpsert {
    pub criterion_id: i64,
    pub points_awarded: f64,
    pub teacher_comment: String,
    pub annotation_type: String,
}

impl AnnotateRequest {
    /// 必填字段检查，批注类型缺省为 `feedback`
    pub fn into_upsert(self) -> Result<AnnotationUpsert> {
        let (Some(criterion_id), Some(points_awarded), Some(teacher_comment)) =
            (self.criterion_id, self.points_awarded, self.teacher_comment)
        else {
            return Err(LmsError::validation(
                "criterion_id, points_awarded and teacher_comment are required",
            ));
        };

        Ok(AnnotationUpsert {
            criterion_id,
            points_awarded,
            teacher_comment,
            annotation_type: normalize_type(self.annotation_type),
        })
    }
}

// 按 ID 修改批注
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "bindings/lab_score.ts")]
pub struct UpdateAnnotationRequest {
    pub annotation_id: Option<i64>,
    pub points_awarded: Option<f64>,
    pub teacher_comment: Option<String>,
    pub annotation_type: Option<String>,
}

/// 校验后的批注修改参数，缺省字段保留原值
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationPatch {
    pub annotation_id: i64,
    pub points_awarded: Option<f64>,
    pub teacher_comment: Option<String>,
    pub annotation_type: Option<String>,
}

impl UpdateAnnotationRequest {
    pub fn into_patch(self) -> Result<AnnotationPatch> {
        let annotation_id = self
            .annotation_id
            .ok_or_else(|| LmsError::validation("annotation_id is required"))?;

        Ok(AnnotationPatch {
            annotation_id,
            points_awarded: self.points_awarded,
            teacher_comment: self.teacher_comment,
            annotation_type: trimmed_type(self.annotation_type),
        })
    }
}

fn normalize_type(annotation_type: Option<String>) -> String {
    trimmed_type(annotation_type).unwrap_or_else(|| DEFAULT_ANNOTATION_TYPE.to_string())
}

fn trimmed_type(annotation_type: Option<String>) -> Option<String> {
    annotation_type
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_rejected() {
        let req: AnnotateRequest =
            serde_json::from_str(r#"{"criterion_id": 1, "points_awarded": 3}"#).unwrap();
        let err = req.into_upsert().unwrap_err();
        assert!(matches!(err, LmsError::Validation(_)));
    }

    #[test]
    fn test_default_annotation_type() {
        let req: AnnotateRequest = serde_json::from_str(
            r#"{"criterion_id": 1, "points_awarded": 3.5, "teacher_comment": "ok"}"#,
        )
        .unwrap();
        let upsert = req.into_upsert().unwrap();
        assert_eq!(upsert.annotation_type, "feedback");
        assert_eq!(upsert.points_awarded, 3.5);
    }

    #[test]
    fn test_patch_requires_id() {
        assert!(UpdateAnnotationRequest::default().into_patch().is_err());

        let patch = UpdateAnnotationRequest {
            annotation_id: Some(4),
            annotation_type: Some("  ".into()),
            ..Default::default()
        }
        .into_patch()
        .unwrap();
        assert_eq!(patch.annotation_id, 4);
        assert_eq!(patch.annotation_type, None);
    }

    #[test]
    fn test_patch_trims_type_like_upsert() {
        let patch = UpdateAnnotationRequest {
            annotation_id: Some(4),
            annotation_type: Some("  rubric ".into()),
            ..Default::default()
        }
        .into_patch()
        .unwrap();
        assert_eq!(patch.annotation_type.as_deref(), Some("rubric"));

        let req: AnnotateRequest = serde_json::from_str(
            r#"{"criterion_id": 1, "points_awarded": 2, "teacher_comment": "ok", "annotation_type": "  rubric "}"#,
        )
        .unwrap();
        assert_eq!(req.into_upsert().unwrap().annotation_type, "rubric");
    }
}
