// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `SIGINT` handling.
//!
//! The first interrupt raises the run token's stop flag. The run loop notices
//! it once the blocking dispatch returns; an interrupted `poll` hands control
//! back, and the token is checked before dispatching again. A second
//! interrupt finds the flag already raised and terminates the process with
//! the default action.

use std::io;

use signal_hook::consts::SIGINT;
use signal_hook::flag;
use wayframe_core::run::RunToken;

/// Routes `SIGINT` to `token`.
///
/// # Errors
///
/// Returns the OS error if a handler cannot be registered.
pub fn install_interrupt_handler(token: &RunToken) -> io::Result<()> {
    let stop = token.stop_flag();
    // Registered first so it sees the flag before the same delivery raises it.
    flag::register_conditional_default(SIGINT, stop.clone())?;
    flag::register(SIGINT, stop)?;
    tracing::debug!("interrupt handler installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use signal_hook::consts::SIGINT;
    use signal_hook::low_level::raise;
    use wayframe_core::run::RunToken;

    use super::install_interrupt_handler;

    #[test]
    fn first_interrupt_requests_a_stop() {
        let token = RunToken::new();
        install_interrupt_handler(&token).unwrap();
        assert!(token.is_running());

        raise(SIGINT).unwrap();
        assert!(!token.is_running());
    }
}
