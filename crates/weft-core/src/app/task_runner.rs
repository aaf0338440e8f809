//! Single task execution under a deadline.
//!
//! Every path ends in exactly one `TaskOutcome`: registry miss, task error,
//! timeout and invocation cancellation are all converted here. Panics are
//! caught one level up, where the task is joined.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{FailureKind, TaskOutcome, TaskSpec};
use crate::ports::TaskRegistry;
use crate::typed::{TaskContext, TaskError};

pub const UNKNOWN_TASK_KIND: &str = "unknown task kind";

/// Stand-in for "no limit": roughly 30 years.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `now + limit`, clamped so an oversized limit (e.g. `Duration::MAX`) never
/// overflows `Instant`.
pub(crate) fn deadline_after(now: Instant, limit: Duration) -> Instant {
    now.checked_add(limit.min(FAR_FUTURE)).unwrap_or(now)
}

pub(crate) struct TaskRun {
    pub spec: TaskSpec,
    /// Own timeout of the task (constraints override or engine default).
    pub timeout: Duration,
    /// End of the invocation budget.
    pub invocation_deadline: Instant,
    pub cancel_grace: Duration,
    pub cancel: CancellationToken,
}

pub(crate) async fn run_task(registry: Arc<dyn TaskRegistry>, run: TaskRun) -> TaskOutcome {
    let kind = run.spec.kind.clone();
    let Some(task) = registry.create_task(&kind) else {
        warn!(task = %kind, "no task registered for kind");
        return TaskOutcome::failure(kind, FailureKind::UnknownKind, UNKNOWN_TASK_KIND);
    };

    // 先に来る方の期限で打ち切る。どちらで切れたかで失敗種別が変わる。
    let own_deadline = deadline_after(Instant::now(), run.timeout);
    let (deadline, expiry) = if own_deadline <= run.invocation_deadline {
        (own_deadline, FailureKind::Timeout)
    } else {
        (run.invocation_deadline, FailureKind::Cancelled)
    };

    let ctx = TaskContext::new(
        kind.clone(),
        run.spec.payload.clone(),
        run.cancel.clone(),
        deadline,
    );

    debug!(task = %kind, timeout = ?run.timeout, "starting task");
    let execution = task.run(ctx);
    tokio::pin!(execution);

    tokio::select! {
        biased;

        result = &mut execution => match result {
            Ok(()) => {
                info!(task = %kind, "task succeeded");
                TaskOutcome::success(kind, "succeeded")
            }
            Err(TaskError::Cancelled) => {
                warn!(task = %kind, "task cancelled itself");
                TaskOutcome::failure(kind, FailureKind::Cancelled, TaskError::Cancelled.to_string())
            }
            Err(err) => {
                warn!(task = %kind, error = %err, "task failed");
                TaskOutcome::failure(kind, FailureKind::Error, err.to_string())
            }
        },

        _ = tokio::time::sleep_until(deadline) => {
            run.cancel.cancel();
            // 協調的キャンセル: シグナルを出して猶予の間だけ終了を待つ。
            // 呼び出し全体の予算切れでは待たない。
            let grace = match expiry {
                FailureKind::Timeout => run.cancel_grace,
                _ => Duration::ZERO,
            };
            if tokio::time::timeout(grace, &mut execution).await.is_err() {
                debug!(task = %kind, "task ignored cancellation; dropping it");
            }
            let detail = match expiry {
                FailureKind::Timeout => format!("timed out after {:?}", run.timeout),
                _ => "invocation budget exhausted".to_string(),
            };
            warn!(task = %kind, failure = ?expiry, "{detail}");
            TaskOutcome::failure(kind, expiry, detail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_after_clamps_oversized_limits() {
        let now = Instant::now();
        assert_eq!(deadline_after(now, Duration::from_secs(5)), now + Duration::from_secs(5));
        assert_eq!(deadline_after(now, Duration::MAX), now + FAR_FUTURE);
        assert_eq!(
            deadline_after(now, Duration::from_millis(u64::MAX)),
            now + FAR_FUTURE
        );
    }
}
