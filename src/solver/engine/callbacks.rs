/*!
Callbacks associated with an engine.

A terminate callback is checked on each iteration of a solve, and if the callback returns true the solve ends with a [Timeout](crate::solver::SatResult::Timeout).
[Monitors](crate::monitor::Monitor) use this to make cancellation interrupt a running solve.
*/

use super::Engine;

pub type CallbackTerminate = dyn FnMut() -> bool + Send;

impl Engine {
    pub fn set_callback_terminate(&mut self, callback: Box<CallbackTerminate>) {
        self.callback_terminate = Some(callback);
    }

    pub fn clear_callback_terminate(&mut self) {
        self.callback_terminate = None;
    }

    pub fn check_callback_terminate(&mut self) -> bool {
        if let Some(callback) = &mut self.callback_terminate {
            callback()
        } else {
            false
        }
    }
}
