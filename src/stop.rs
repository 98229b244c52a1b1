use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn sigint_handler(_: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Install the SIGINT handler.
///
/// No `SA_RESTART`: a blocking read returns `EINTR` so the loop can notice the
/// stop request. `SA_RESETHAND`: a second Ctrl-C kills the process outright.
#[cfg(unix)]
pub fn install_sigint_handler() -> io::Result<()> {
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = sigint_handler as extern "C" fn(libc::c_int) as libc::sighandler_t;
        action.sa_flags = libc::SA_RESETHAND;
        libc::sigemptyset(&mut action.sa_mask);
        if libc::sigaction(libc::SIGINT, &action, std::ptr::null_mut()) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn install_sigint_handler() -> io::Result<()> {
    Ok(())
}

/// True once SIGINT has been delivered.
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Cooperative cancellation for the device loops.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    flag: Arc<AtomicBool>,
    sigint: bool,
}

impl StopToken {
    /// A token that also fires on SIGINT.
    pub fn with_sigint() -> Self {
        Self {
            flag: Arc::default(),
            sigint: true,
        }
    }

    #[cfg(test)]
    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst) || (self.sigint && interrupted())
    }
}
