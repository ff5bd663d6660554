use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::StopReason;
use crate::errors::{LmsError, Result};

// 提交/自动保存请求
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/lab_session.ts")]
#[serde(deny_unknown_fields)]
pub struct SubmitLabRequest {
    pub responses: Option<serde_json::Value>,
    /// 前端沿用 camelCase，写错字段名时直接 400，不能被当成最终提交
    #[serde(default, alias = "isAutosave")]
    pub is_autosave: bool,
    #[serde(alias = "sessionId")]
    pub session_id: Option<i64>,
    /// 客户端计时器上报的已用秒数
    #[serde(alias = "elapsedSeconds")]
    pub elapsed_seconds: Option<i64>,
}

/// 校验后的提交参数（用于存储层）
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitParams {
    pub responses: serde_json::Value,
    pub is_autosave: bool,
    pub session_id: Option<i64>,
    pub elapsed_seconds: Option<i64>,
}

impl SubmitLabRequest {
    pub fn into_params(self) -> Result<SubmitParams> {
        let responses = match self.responses {
            Some(serde_json::Value::Null) | None => {
                return Err(LmsError::validation("responses are required"));
            }
            Some(v) => v,
        };

        Ok(SubmitParams {
            responses,
            is_autosave: self.is_autosave,
            session_id: self.session_id,
            elapsed_seconds: self.elapsed_seconds,
        })
    }
}

// 结束会话请求
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/lab_session.ts")]
#[serde(deny_unknown_fields)]
pub struct StopLabRequest {
    #[serde(alias = "sessionId")]
    pub session_id: Option<i64>,
    #[serde(default)]
    pub reason: StopReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_responses_required() {
        assert!(SubmitLabRequest::default().into_params().is_err());

        let req: SubmitLabRequest = serde_json::from_str(r#"{"responses": null}"#).unwrap();
        assert!(req.into_params().is_err());

        let req: SubmitLabRequest =
            serde_json::from_str(r#"{"responses": {"q1": "4.2"}, "is_autosave": true}"#).unwrap();
        let params = req.into_params().unwrap();
        assert!(params.is_autosave);
        assert_eq!(params.responses["q1"], "4.2");
    }

    #[test]
    fn test_camel_case_autosave_body() {
        let req: SubmitLabRequest = serde_json::from_str(
            r#"{"responses": {"q1": "draft"}, "isAutosave": true, "sessionId": 7, "elapsedSeconds": 42}"#,
        )
        .unwrap();
        let params = req.into_params().unwrap();
        assert!(params.is_autosave);
        assert_eq!(params.session_id, Some(7));
        assert_eq!(params.elapsed_seconds, Some(42));

        let req: StopLabRequest =
            serde_json::from_str(r#"{"sessionId": 7, "reason": "navigation"}"#).unwrap();
        assert_eq!(req.session_id, Some(7));
        assert_eq!(req.reason, StopReason::Navigation);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        // 拼错的自动保存标记不能退化成最终提交
        let err = serde_json::from_str::<SubmitLabRequest>(
            r#"{"responses": {"q1": "draft"}, "autosave": true}"#,
        );
        assert!(err.is_err());
        assert!(serde_json::from_str::<StopLabRequest>(r#"{"session": 7}"#).is_err());
    }

    #[test]
    fn test_stop_reason_default() {
        let req: StopLabRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.reason, StopReason::Manual);
        let req: StopLabRequest = serde_json::from_str(r#"{"reason": "timeout"}"#).unwrap();
        assert_eq!(req.reason, StopReason::Timeout);
    }
}
