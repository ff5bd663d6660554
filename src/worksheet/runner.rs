use chrono::Utc;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use super::sink::WorksheetSink;
use super::state::{WorksheetAction, WorksheetPhase, WorksheetState, reduce};
use crate::config::LabConfig;
use crate::errors::{LmsError, Result};
use crate::models::lab_sessions::{
    entities::StopReason,
    requests::SubmitParams,
    responses::{StartSessionResponse, StopResponse, SubmitResponse},
};

/// 计时与自动保存间隔
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    pub tick: Duration,
    pub autosave_interval: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            autosave_interval: Duration::from_secs(60),
        }
    }
}

impl RunnerOptions {
    pub fn from_config(config: &LabConfig) -> Self {
        Self {
            tick: Duration::from_millis(config.timer_tick_millis.max(1)),
            autosave_interval: Duration::from_secs(config.autosave_interval_secs.max(1)),
        }
    }
}

type SharedState = Arc<Mutex<WorksheetState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, WorksheetState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn apply(state: &SharedState, action: WorksheetAction) {
    reduce(&mut lock(state), action);
}

/// 一次实验作答的驱动
///
/// 开始后在后台任务中运行计时器和自动保存；自动保存失败只记录在状态里，
/// 不会中断计时，也不会返回给调用方。
pub struct WorksheetRunner {
    sink: Arc<dyn WorksheetSink>,
    state: SharedState,
    options: RunnerOptions,
    timer: Option<JoinHandle<()>>,
}

impl WorksheetRunner {
    pub fn new(sink: Arc<dyn WorksheetSink>, lab_id: i64, options: RunnerOptions) -> Self {
        Self {
            sink,
            state: Arc::new(Mutex::new(WorksheetState::new(lab_id))),
            options,
            timer: None,
        }
    }

    /// 当前状态的快照
    pub fn state(&self) -> WorksheetState {
        lock(&self.state).clone()
    }

    pub fn set_response(&self, key: impl Into<String>, value: Value) {
        apply(
            &self.state,
            WorksheetAction::SetResponse {
                key: key.into(),
                value,
            },
        );
    }

    /// 开始或恢复会话，并启动计时器
    pub async fn start(&mut self) -> Result<StartSessionResponse> {
        let lab_id = lock(&self.state).lab_id;
        let started = self.sink.start(lab_id).await?;

        apply(
            &self.state,
            WorksheetAction::SessionStarted {
                session: started.session.clone(),
                is_resuming: started.is_resuming,
                autosave_data: started.autosave_data.clone(),
            },
        );

        if started.session.is_in_progress() {
            self.spawn_timer();
        }
        info!(
            "Worksheet session {} for lab {} started (resuming: {})",
            started.session.id, lab_id, started.is_resuming
        );
        Ok(started)
    }

    /// 最终提交，成功后停止计时并以 `submission` 结束会话
    pub async fn submit(&mut self) -> Result<SubmitResponse> {
        let (lab_id, params) = {
            let state = lock(&self.state);
            if state.phase != WorksheetPhase::InProgress {
                return Err(LmsError::conflict("Session is no longer in progress"));
            }
            (
                state.lab_id,
                SubmitParams {
                    responses: Value::Object(state.responses.clone()),
                    is_autosave: false,
                    session_id: state.session_id,
                    elapsed_seconds: Some(state.elapsed_seconds),
                },
            )
        };

        let submitted = self.sink.save(lab_id, params).await?;
        self.stop_timer();
        apply(
            &self.state,
            WorksheetAction::Submitted {
                session: submitted.session.clone(),
                at: Utc::now(),
            },
        );

        if let Err(e) = self
            .sink
            .stop(lab_id, Some(submitted.session.id), StopReason::Submission)
            .await
        {
            warn!(
                "Failed to stop session {} after submission: {}",
                submitted.session.id, e
            );
        }

        Ok(submitted)
    }

    /// 结束计时但不提交
    pub async fn stop(&mut self, reason: StopReason) -> Result<StopResponse> {
        self.stop_timer();
        let (lab_id, session_id) = {
            let state = lock(&self.state);
            (state.lab_id, state.session_id)
        };
        if session_id.is_none() {
            return Err(LmsError::validation("No active session found"));
        }

        apply(&self.state, WorksheetAction::Stopped);
        self.sink.stop(lab_id, session_id, reason).await
    }

    fn spawn_timer(&mut self) {
        self.stop_timer();
        self.timer = Some(tokio::spawn(run_timer(
            self.sink.clone(),
            self.state.clone(),
            self.options,
        )));
    }

    fn stop_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }
}

impl Drop for WorksheetRunner {
    fn drop(&mut self) {
        self.stop_timer();
    }
}

async fn run_timer(sink: Arc<dyn WorksheetSink>, state: SharedState, options: RunnerOptions) {
    let start = Instant::now();
    let mut ticker = interval_at(start + options.tick, options.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut autosave = interval_at(
        start + options.autosave_interval,
        options.autosave_interval,
    );
    autosave.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => apply(&state, WorksheetAction::Tick),
            _ = autosave.tick() => {
                if let Some((revision, params)) = begin_autosave(&state) {
                    tokio::spawn(autosave_task(sink.clone(), state.clone(), revision, params));
                }
            }
        }
    }
}

/// 标记保存开始并取出要保存的作答；不需要保存时返回 None
fn begin_autosave(state: &SharedState) -> Option<(u64, SubmitParams)> {
    let mut guard = lock(state);
    if !guard.needs_autosave() {
        if guard.saving {
            debug!("Autosave already in flight, skipping this trigger");
        }
        return None;
    }

    reduce(&mut guard, WorksheetAction::SaveStarted);
    Some((
        guard.revision,
        SubmitParams {
            responses: Value::Object(guard.responses.clone()),
            is_autosave: true,
            session_id: guard.session_id,
            elapsed_seconds: Some(guard.elapsed_seconds),
        },
    ))
}

async fn autosave_task(
    sink: Arc<dyn WorksheetSink>,
    state: SharedState,
    revision: u64,
    params: SubmitParams,
) {
    let lab_id = lock(&state).lab_id;
    match sink.save(lab_id, params).await {
        Ok(_) => apply(
            &state,
            WorksheetAction::SaveSucceeded {
                revision,
                at: Utc::now(),
            },
        ),
        Err(e) => {
            let err = LmsError::transient_save_failure(e.message());
            warn!("Autosave failed for lab {}: {}", lab_id, err);
            apply(
                &state,
                WorksheetAction::SaveFailed {
                    message: err.to_string(),
                },
            );
        }
    }
}
