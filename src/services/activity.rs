use std::sync::Arc;
use tracing::warn;

use crate::models::activity_logs::entities::NewActivityLog;
use crate::storage::Storage;

/// 事务提交后写活动日志，失败只记警告，不影响主操作的结果
pub(crate) async fn record_activity(storage: &Arc<dyn Storage>, log: NewActivityLog) {
    let (activity_type, action) = (log.activity_type, log.action);
    if let Err(e) = storage.create_activity_log(log).await {
        warn!(
            "Failed to record activity {}/{}: {}",
            activity_type, action, e
        );
    }
}
