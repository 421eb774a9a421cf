//! Signal handling.
//!
//! A dedicated thread waits for SIGINT or SIGTERM, prints the statistics
//! snapshot (which charges a still-running solve to the `unknown` bucket),
//! and exits. The thread only reads the shared statistics block; it never
//! touches the candidate set or the oracle. Dropping the guard deregisters
//! the handler and joins the thread.

use keel_engine::Stats;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Keeps the signal thread registered; deregisters on drop.
pub struct SignalGuard {
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

/// Installs the statistics-printing signal handler.
pub fn install(stats: Arc<Stats>, print: bool) -> io::Result<SignalGuard> {
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    let handle = signals.handle();
    let thread = thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            if print {
                println!("c caught signal {sig}");
                let _ = stats.snapshot().print(&mut io::stdout(), false);
            }
            std::process::exit(128 + sig);
        }
    });
    Ok(SignalGuard {
        handle,
        thread: Some(thread),
    })
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
