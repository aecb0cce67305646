//! Run an install flow until it finishes or the user interrupts it.
//! 运行安装流程，直到完成或被用户中断。

use std::future::Future;

use pv_app::InstallWizardOrchestrator;
use pv_core::wizard::WizardSession;
use tracing::{debug, warn};

/// Drive `flow` to completion, or close the wizard once `interrupt` resolves.
///
/// The flow is never dropped mid-dispatch. On interrupt, `close()` runs
/// alongside it: cancellable steps stop right away, while a step that
/// cannot be interrupted finishes and records its artifact before the
/// abort cleanup runs.
/// 中断时不丢弃流程，`close()` 与其并发执行。
pub async fn run_until_interrupted<F, I>(
    wizard: &InstallWizardOrchestrator,
    flow: F,
    interrupt: I,
) -> anyhow::Result<WizardSession>
where
    F: Future<Output = anyhow::Result<WizardSession>>,
    I: Future,
{
    tokio::pin!(flow);
    tokio::select! {
        result = &mut flow => return result,
        _ = interrupt => warn!("interrupted, cleaning up"),
    }

    let (flow_result, session) = tokio::join!(flow, wizard.close());
    if let Err(err) = flow_result {
        debug!(error = %err, "install flow stopped by close");
    }
    Ok(session)
}
