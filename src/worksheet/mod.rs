//! 学生端作答驱动
//!
//! 与界面无关：`WorksheetState` 保存一次作答的全部状态，只通过 `reduce`
//! 处理 `WorksheetAction` 修改；`WorksheetRunner` 负责计时、自动保存和提交，
//! 持久化经由 `WorksheetSink` 完成。

pub mod runner;
pub mod sink;
pub mod state;

pub use runner::{RunnerOptions, WorksheetRunner};
pub use sink::{StorageSink, WorksheetSink};
pub use state::{WorksheetAction, WorksheetPhase, WorksheetState, reduce};
