//! Cooperative cancellation shared between the computation and whatever
//! raises signals (OS handlers, the periodic save timer, tests).

use std::{
    io,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

/// Why the trajectory loop was asked to pause.
///
/// Variants are ordered by strength: a pending signal is only ever replaced by
/// a stronger one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Signal {
    /// Save on a timer and keep going.
    PeriodicRotate = 1,
    /// Save and keep going.
    Rotate = 2,
    /// Save and return.
    Stop = 3,
}

impl Signal {
    fn from_repr(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::PeriodicRotate),
            2 => Some(Self::Rotate),
            3 => Some(Self::Stop),
            _ => None,
        }
    }

    /// Whether the run continues in memory after saving.
    pub fn continues(self) -> bool {
        !matches!(self, Self::Stop)
    }
}

/// Read side of a cancellation source, polled once per transform.
pub trait CancellationSignal {
    fn poll(&self) -> Option<Signal>;

    /// Clears `signal` after it has been handled.
    fn acknowledge(&self, signal: Signal);
}

/// Lock-free single-word flag. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicU8>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self, signal: Signal) {
        self.flag.fetch_max(signal as u8, Ordering::Relaxed);
    }

    /// Raises [`Signal::PeriodicRotate`] every `interval` from a detached
    /// thread for the rest of the process lifetime.
    pub fn spawn_periodic(&self, interval: Duration) -> io::Result<JoinHandle<()>> {
        let token = self.clone();
        thread::Builder::new()
            .name("checkpoint-timer".to_string())
            .spawn(move || loop {
                thread::sleep(interval);
                token.raise(Signal::PeriodicRotate);
            })
    }
}

impl CancellationSignal for CancellationToken {
    #[inline]
    fn poll(&self) -> Option<Signal> {
        Signal::from_repr(self.flag.load(Ordering::Relaxed))
    }

    fn acknowledge(&self, signal: Signal) {
        // A stronger signal that arrived while saving stays pending.
        let _ = self.flag.compare_exchange(
            signal as u8,
            0,
            Ordering::Relaxed,
            Ordering::Relaxed,
        );
    }
}
