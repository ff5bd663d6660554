use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::models::lab_sessions::entities::LabSession;

/// 作答阶段，与服务端会话状态对应，另加未开始和已结束计时
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorksheetPhase {
    NotStarted,
    InProgress,
    Submitted,
    Stopped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorksheetState {
    pub lab_id: i64,
    pub session_id: Option<i64>,
    pub phase: WorksheetPhase,
    pub is_resuming: bool,
    pub responses: Map<String, Value>,
    pub elapsed_seconds: i64,
    pub timer_active: bool,
    /// 每次修改作答加一
    pub revision: u64,
    /// 最近一次保存成功时的 revision
    pub saved_revision: u64,
    pub saving: bool,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl WorksheetState {
    pub fn new(lab_id: i64) -> Self {
        Self {
            lab_id,
            session_id: None,
            phase: WorksheetPhase::NotStarted,
            is_resuming: false,
            responses: Map::new(),
            elapsed_seconds: 0,
            timer_active: false,
            revision: 0,
            saved_revision: 0,
            saving: false,
            last_saved_at: None,
            last_error: None,
        }
    }

    /// 作答自上次保存后有改动
    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    /// 是否应触发自动保存；正在保存时跳过而不是排队
    pub fn needs_autosave(&self) -> bool {
        self.phase == WorksheetPhase::InProgress && self.is_dirty() && !self.saving
    }
}

#[derive(Debug, Clone)]
pub enum WorksheetAction {
    SessionStarted {
        session: LabSession,
        is_resuming: bool,
        autosave_data: Option<Value>,
    },
    Tick,
    SetResponse {
        key: String,
        value: Value,
    },
    SaveStarted,
    SaveSucceeded {
        revision: u64,
        at: DateTime<Utc>,
    },
    SaveFailed {
        message: String,
    },
    Submitted {
        session: LabSession,
        at: DateTime<Utc>,
    },
    Stopped,
}

pub fn reduce(state: &mut WorksheetState, action: WorksheetAction) {
    match action {
        WorksheetAction::SessionStarted {
            session,
            is_resuming,
            autosave_data,
        } => {
            state.session_id = Some(session.id);
            state.is_resuming = is_resuming;
            state.elapsed_seconds = state.elapsed_seconds.max(session.elapsed_seconds);
            if let Some(Value::Object(saved)) = autosave_data {
                state.responses = saved;
            }
            state.saved_revision = state.revision;
            state.last_error = None;
            if session.is_in_progress() {
                state.phase = WorksheetPhase::InProgress;
                state.timer_active = true;
            } else {
                state.phase = WorksheetPhase::Submitted;
                state.timer_active = false;
            }
        }
        WorksheetAction::Tick => {
            if state.timer_active && state.phase == WorksheetPhase::InProgress {
                state.elapsed_seconds += 1;
            }
        }
        WorksheetAction::SetResponse { key, value } => {
            // 已提交的作答不再修改
            if matches!(
                state.phase,
                WorksheetPhase::NotStarted | WorksheetPhase::InProgress
            ) {
                state.responses.insert(key, value);
                state.revision += 1;
            }
        }
        WorksheetAction::SaveStarted => state.saving = true,
        WorksheetAction::SaveSucceeded { revision, at } => {
            state.saving = false;
            state.saved_revision = state.saved_revision.max(revision);
            state.last_saved_at = Some(at);
            state.last_error = None;
        }
        WorksheetAction::SaveFailed { message } => {
            state.saving = false;
            state.last_error = Some(message);
        }
        WorksheetAction::Submitted { session, at } => {
            state.phase = WorksheetPhase::Submitted;
            state.timer_active = false;
            state.saved_revision = state.revision;
            state.elapsed_seconds = state.elapsed_seconds.max(session.elapsed_seconds);
            state.last_saved_at = Some(at);
        }
        WorksheetAction::Stopped => {
            state.timer_active = false;
            if state.phase == WorksheetPhase::InProgress {
                state.phase = WorksheetPhase::Stopped;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lab_sessions::entities::SessionStatus;

    fn session(status: SessionStatus, elapsed: i64) -> LabSession {
        let now = Utc::now();
        LabSession {
            id: 7,
            lab_id: 3,
            student_id: 9,
            status,
            start_time: now,
            end_time: None,
            resumed_at: None,
            duration_minutes: None,
            elapsed_seconds: elapsed,
            created_at: now,
            updated_at: now,
        }
    }

    fn started(elapsed: i64, autosave_data: Option<Value>) -> WorksheetState {
        let mut state = WorksheetState::new(3);
        reduce(
            &mut state,
            WorksheetAction::SessionStarted {
                session: session(SessionStatus::InProgress, elapsed),
                is_resuming: autosave_data.is_some(),
                autosave_data,
            },
        );
        state
    }

    #[test]
    fn test_resume_restores_autosave_and_timer() {
        let state = started(42, Some(serde_json::json!({"q1": "9.81"})));
        assert_eq!(state.phase, WorksheetPhase::InProgress);
        assert!(state.timer_active);
        assert!(state.is_resuming);
        assert_eq!(state.elapsed_seconds, 42);
        assert_eq!(state.responses["q1"], "9.81");
        assert!(!state.is_dirty());
    }

    #[test]
    fn test_tick_only_while_running() {
        let mut state = WorksheetState::new(3);
        reduce(&mut state, WorksheetAction::Tick);
        assert_eq!(state.elapsed_seconds, 0);

        let mut state = started(0, None);
        reduce(&mut state, WorksheetAction::Tick);
        reduce(&mut state, WorksheetAction::Tick);
        assert_eq!(state.elapsed_seconds, 2);

        reduce(&mut state, WorksheetAction::Stopped);
        reduce(&mut state, WorksheetAction::Tick);
        assert_eq!(state.elapsed_seconds, 2);
        assert_eq!(state.phase, WorksheetPhase::Stopped);
    }

    #[test]
    fn test_autosave_tracks_revisions() {
        let mut state = started(0, None);
        assert!(!state.needs_autosave());

        reduce(
            &mut state,
            WorksheetAction::SetResponse {
                key: "q1".into(),
                value: Value::from(1.5),
            },
        );
        assert!(state.needs_autosave());

        reduce(&mut state, WorksheetAction::SaveStarted);
        assert!(!state.needs_autosave());

        // 保存过程中又有修改，保存成功后仍需再次保存
        reduce(
            &mut state,
            WorksheetAction::SetResponse {
                key: "q2".into(),
                value: Value::from("ok"),
            },
        );
        reduce(
            &mut state,
            WorksheetAction::SaveSucceeded {
                revision: 1,
                at: Utc::now(),
            },
        );
        assert!(!state.saving);
        assert!(state.needs_autosave());
    }

    #[test]
    fn test_save_failure_is_recorded() {
        let mut state = started(0, None);
        reduce(&mut state, WorksheetAction::SaveStarted);
        reduce(
            &mut state,
            WorksheetAction::SaveFailed {
                message: "network down".into(),
            },
        );
        assert!(!state.saving);
        assert_eq!(state.last_error.as_deref(), Some("network down"));
        assert!(state.timer_active);
    }

    #[test]
    fn test_submitted_is_final() {
        let mut state = started(10, None);
        reduce(
            &mut state,
            WorksheetAction::Submitted {
                session: session(SessionStatus::Submitted, 15),
                at: Utc::now(),
            },
        );
        assert_eq!(state.phase, WorksheetPhase::Submitted);
        assert!(!state.timer_active);
        assert_eq!(state.elapsed_seconds, 15);

        reduce(
            &mut state,
            WorksheetAction::SetResponse {
                key: "q1".into(),
                value: Value::from(2),
            },
        );
        assert!(state.responses.is_empty());

        reduce(&mut state, WorksheetAction::Stopped);
        assert_eq!(state.phase, WorksheetPhase::Submitted);
    }
}
