//! # OS signal identities and per-context subscriptions.
//!
//! [`Signal`] names a POSIX signal by its raw number. [`Subscription`] is the
//! delivery handle a root context owns for each signal it listens to; dropping
//! it revokes delivery to that context.
//!
//! ## Platforms
//! **Unix:** any signal number accepted by [`tokio::signal::unix::signal`].
//!
//! **Windows:** only [`Signal::INTERRUPT`], delivered through
//! [`tokio::signal::ctrl_c`]. Other signals cannot be subscribed.
//!
//! ## Notes
//! tokio installs its process-wide handler the first time a signal kind is
//! registered and keeps it for the life of the process. Dropping a
//! [`Subscription`] stops delivery to its owner; it does not restore the OS
//! default action.

use std::fmt;
use std::io;

/// A POSIX signal, identified by its raw number.
///
/// # Example
/// ```
/// use appvisor::Signal;
///
/// assert_eq!(Signal::INTERRUPT.as_raw(), 2);
/// assert_eq!(Signal::INTERRUPT.to_string(), "SIGINT");
/// assert_eq!(Signal::from_raw(2), Signal::INTERRUPT);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Signal(i32);

impl Signal {
    /// `SIGHUP`: controlling terminal closed.
    pub const HANGUP: Signal = Signal(1);
    /// `SIGINT`: Ctrl-C in a terminal.
    pub const INTERRUPT: Signal = Signal(2);
    /// `SIGQUIT`: quit request, often used for core dumps.
    pub const QUIT: Signal = Signal(3);
    /// `SIGTERM`: default kill signal, used by systemd/Kubernetes.
    pub const TERMINATE: Signal = Signal(15);

    /// Wraps a raw signal number.
    pub const fn from_raw(raw: i32) -> Self {
        Signal(raw)
    }

    /// Returns the raw signal number.
    pub const fn as_raw(self) -> i32 {
        self.0
    }

    /// Shell-style exit code `128 + n` for a process terminated by this signal.
    ///
    /// `None` when the number is outside `1..=127`, where `128 + n` would not
    /// fit an exit status.
    pub const fn exit_code(self) -> Option<i32> {
        match self.0 {
            1..=127 => Some(128 + self.0),
            _ => None,
        }
    }

    /// Returns the conventional name for the well-known signals.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Signal::HANGUP => Some("SIGHUP"),
            Signal::INTERRUPT => Some("SIGINT"),
            Signal::QUIT => Some("SIGQUIT"),
            Signal::TERMINATE => Some("SIGTERM"),
            _ => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "signal {}", self.0),
        }
    }
}

/// Delivery handle for one subscribed signal.
///
/// Owned by exactly one root context listener. Dropping it revokes delivery.
pub(crate) struct Subscription {
    signal: Signal,
    #[cfg(unix)]
    stream: tokio::signal::unix::Signal,
}

impl Subscription {
    /// Registers for delivery of `signal`.
    ///
    /// Must be called from within a tokio runtime.
    #[cfg(unix)]
    pub(crate) fn new(signal: Signal) -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal as subscribe};

        let stream = subscribe(SignalKind::from_raw(signal.as_raw()))?;
        Ok(Self { signal, stream })
    }

    /// Registers for delivery of `signal`.
    ///
    /// Only [`Signal::INTERRUPT`] is supported off Unix.
    #[cfg(not(unix))]
    pub(crate) fn new(signal: Signal) -> io::Result<Self> {
        if signal != Signal::INTERRUPT {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("{signal} cannot be subscribed on this platform"),
            ));
        }
        Ok(Self { signal })
    }

    /// Waits for the next delivery.
    ///
    /// Returns `None` when delivery can no longer happen (runtime shutting down).
    #[cfg(unix)]
    pub(crate) async fn recv(&mut self) -> Option<Signal> {
        self.stream.recv().await.map(|()| self.signal)
    }

    /// Waits for the next delivery.
    ///
    /// Returns `None` when delivery can no longer happen.
    #[cfg(not(unix))]
    pub(crate) async fn recv(&mut self) -> Option<Signal> {
        tokio::signal::ctrl_c().await.ok().map(|()| self.signal)
    }

    pub(crate) fn signal(&self) -> Signal {
        self.signal
    }
}

/// Subscribes to each signal, skipping (and logging) any that fail to register.
pub(crate) fn subscribe_all(signals: &[Signal]) -> Vec<Subscription> {
    let mut subs = Vec::with_capacity(signals.len());
    for &signal in signals {
        if subs.iter().any(|s: &Subscription| s.signal() == signal) {
            continue;
        }
        match Subscription::new(signal) {
            Ok(sub) => subs.push(sub),
            Err(err) => {
                tracing::warn!(%signal, error = %err, "signal subscription failed; ignoring");
            }
        }
    }
    subs
}

/// Waits until any subscription yields a signal.
///
/// Pends forever when there is nothing to wait on, or when every subscription
/// has been closed, so the caller's other branch decides.
pub(crate) async fn next_signal(subs: &mut [Subscription]) -> Signal {
    use futures::future::select_all;

    if subs.is_empty() {
        return std::future::pending().await;
    }
    let waits = subs.iter_mut().map(|s| Box::pin(s.recv()));
    match select_all(waits).await {
        (Some(signal), _, _) => signal,
        (None, _, _) => std::future::pending().await,
    }
}
