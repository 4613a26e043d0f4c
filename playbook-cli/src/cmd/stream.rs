use playbook_exec::PlaybookRun;

use crate::output::{print_step, Nesting};
use crate::OutputArgs;

pub enum Streamed {
    Completed { failed: bool },
    Interrupted,
}

/// Prints the trace as it is produced. Ctrl-C stops reading; the caller drops
/// the run, which cancels it.
pub async fn stream_trace<T: Send + 'static>(run: &mut PlaybookRun<T>, output: &OutputArgs) -> Streamed {
    let mut nesting = Nesting::default();
    let mut failed = false;
    loop {
        let polled = tokio::select! {
            step = run.next() => Some(step),
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(step) = polled else {
            return Streamed::Interrupted;
        };
        let Some(step) = step else {
            return Streamed::Completed { failed };
        };
        failed |= step.is_failure();
        print_step(output.format, output.quiet, nesting.depth_of(&step), &step);
    }
}
