use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 会话状态：not_started 没有对应记录，submitted 之后不可重开
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/lab_session.ts")]
pub enum SessionStatus {
    InProgress,
    Submitted,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::InProgress => write!(f, "in_progress"),
            SessionStatus::Submitted => write!(f, "submitted"),
        }
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(SessionStatus::InProgress),
            "submitted" => Ok(SessionStatus::Submitted),
            _ => Err(format!("Invalid session status: {s}")),
        }
    }
}

// 结束会话的原因
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/lab_session.ts")]
pub enum StopReason {
    #[default]
    Manual,
    Timeout,
    Submission,
    Navigation,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::Manual => write!(f, "manual"),
            StopReason::Timeout => write!(f, "timeout"),
            StopReason::Submission => write!(f, "submission"),
            StopReason::Navigation => write!(f, "navigation"),
        }
    }
}

// 实验会话（一次作答尝试）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "bindings/lab_session.ts")]
pub struct LabSession {
    pub id: i64,
    pub lab_id: i64,
    pub student_id: i64,
    pub status: SessionStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// 最近一次 stop 之后恢复的时间，计时从这里继续
    pub resumed_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub elapsed_seconds: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LabSession {
    pub fn is_in_progress(&self) -> bool {
        self.status == SessionStatus::InProgress
    }

    /// 新的已用时长：取已存值与上报值中的较大者，计时不回退
    ///
    /// 未上报时按墙钟估算，恢复过的会话只计入已结算的分钟数加上本段时长，
    /// 离开期间不算作答时间。
    pub fn next_elapsed(&self, reported: Option<i64>, now: DateTime<Utc>) -> i64 {
        let observed = reported
            .unwrap_or_else(|| {
                let banked = match self.resumed_at {
                    Some(_) => self.duration_minutes.unwrap_or(0) * 60,
                    None => 0,
                };
                banked + now.signed_duration_since(self.stint_start()).num_seconds()
            })
            .max(0);
        self.elapsed_seconds.max(observed)
    }

    /// 当前这一段计时的起点
    pub fn stint_start(&self) -> DateTime<Utc> {
        self.resumed_at.unwrap_or(self.start_time)
    }
}

/// 会话时长（分钟，四舍五入）
pub fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let secs = end.signed_duration_since(start).num_seconds().max(0);
    (secs as f64 / 60.0).round() as i64
}

// 会话作答记录，每个会话一条
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "bindings/lab_session.ts")]
pub struct LabSubmission {
    pub id: i64,
    pub session_id: i64,
    pub student_id: i64,
    pub responses: Option<serde_json::Value>,
    pub autosave_data: Option<serde_json::Value>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(elapsed: i64) -> LabSession {
        let start = Utc::now() - Duration::seconds(300);
        LabSession {
            id: 1,
            lab_id: 1,
            student_id: 1,
            status: SessionStatus::InProgress,
            start_time: start,
            end_time: None,
            resumed_at: None,
            duration_minutes: None,
            elapsed_seconds: elapsed,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn test_elapsed_never_regresses() {
        let s = session(120);
        assert_eq!(s.next_elapsed(Some(90), Utc::now()), 120);
        assert_eq!(s.next_elapsed(Some(150), Utc::now()), 150);
        assert_eq!(s.next_elapsed(Some(-5), Utc::now()), 120);
    }

    #[test]
    fn test_elapsed_falls_back_to_wall_clock() {
        let s = session(0);
        let now = s.start_time + Duration::seconds(200);
        assert_eq!(s.next_elapsed(None, now), 200);
    }

    #[test]
    fn test_resumed_session_skips_idle_gap() {
        let mut s = session(600);
        s.start_time = Utc::now() - Duration::days(3);
        s.duration_minutes = Some(10);
        s.resumed_at = Some(Utc::now() - Duration::seconds(30));

        let now = s.resumed_at.unwrap() + Duration::seconds(30);
        assert_eq!(s.stint_start(), s.resumed_at.unwrap());
        assert_eq!(s.next_elapsed(None, now), 630);
    }

    #[test]
    fn test_duration_rounding() {
        let start = Utc::now();
        assert_eq!(duration_minutes(start, start + Duration::seconds(89)), 1);
        assert_eq!(duration_minutes(start, start + Duration::seconds(90)), 2);
        assert_eq!(duration_minutes(start, start - Duration::seconds(30)), 0);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "in_progress".parse::<SessionStatus>(),
            Ok(SessionStatus::InProgress)
        );
        assert!("not_started".parse::<SessionStatus>().is_err());
    }
}
