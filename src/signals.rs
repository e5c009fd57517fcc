//! Routes process signals into the cancellation token.
//!
//! SIGINT and SIGTERM stop the run after saving; SIGHUP saves and keeps going.

use std::io;

use collatz_core::CancellationToken;

#[cfg(unix)]
mod unix {
    use std::{io, sync::OnceLock};

    use collatz_core::{CancellationToken, Signal};

    static TOKEN: OnceLock<CancellationToken> = OnceLock::new();

    extern "C" fn handle_signal(signum: libc::c_int) {
        let signal = match signum {
            libc::SIGHUP => Signal::Rotate,
            _ => Signal::Stop,
        };
        // Only an atomic store happens here.
        if let Some(token) = TOKEN.get() {
            token.raise(signal);
        }
    }

    pub fn install(token: &CancellationToken) -> io::Result<()> {
        if TOKEN.set(token.clone()).is_err() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "signal handlers are already installed",
            ));
        }
        for signum in [libc::SIGINT, libc::SIGTERM, libc::SIGHUP] {
            // SAFETY: the handler only touches an already-initialized atomic.
            let previous = unsafe {
                libc::signal(signum, handle_signal as *const () as libc::sighandler_t)
            };
            if previous == libc::SIG_ERR {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }
}

#[cfg(unix)]
pub fn install(token: &CancellationToken) -> io::Result<()> {
    unix::install(token)
}

#[cfg(not(unix))]
pub fn install(_token: &CancellationToken) -> io::Result<()> {
    Ok(())
}
