use std::net::SocketAddr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use snrr_errors::{SnrrError, SnrrResult, TransportError};

/// Status codes reported by the underlying Lokinet context, mirroring
/// libLokinet's `llarp_main_is_ready`-style polling values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LokinetContextStatus {
    /// Context not started yet.
    NotStarted,
    /// Started, still building its path to the network (`-1`).
    Bootstrapping,
    /// Started, waiting on the first published introset (`-3`).
    PublishingIntroset,
    /// Ready to resolve `.loki`/`.snode` hostnames (`0`).
    Ready,
}

impl LokinetContextStatus {
    fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Ready,
            -1 => Self::Bootstrapping,
            -3 => Self::PublishingIntroset,
            _ => Self::NotStarted,
        }
    }

    fn code(self) -> i32 {
        match self {
            Self::NotStarted => i32::MIN,
            Self::Bootstrapping => -1,
            Self::PublishingIntroset => -3,
            Self::Ready => 0,
        }
    }
}

/// Resolves a hostname to a loopback address once the context is ready.
/// Implemented by the real FFI boundary into libLokinet in production; a
/// scripted in-memory driver stands in for tests, the same way the onion
/// transport's symmetric codec is injected rather than implemented here.
pub trait LokinetResolver: Send + Sync {
    /// Start the context. Must be idempotent — called at most once
    /// logically even if invoked from multiple callers racing to use
    /// Lokinet for the first time.
    fn start(&self);

    /// Current status code, polled until `Ready`.
    fn status(&self) -> i32;

    /// Resolve a `.loki`/`.snode` hostname to a loopback socket address.
    /// Only meaningful once `status() == 0`.
    fn resolve(&self, hostname: &str) -> Option<SocketAddr>;
}

/// One Lokinet context per process (spec §5): starting it is idempotent,
/// and readiness is polled rather than assumed.
pub struct LokinetContext {
    driver: Arc<dyn LokinetResolver>,
    started: Mutex<bool>,
    last_status: AtomicI32,
}

impl LokinetContext {
    pub fn new(driver: Arc<dyn LokinetResolver>) -> Self {
        Self {
            driver,
            started: Mutex::new(false),
            last_status: AtomicI32::new(LokinetContextStatus::NotStarted.code()),
        }
    }

    /// Start the context if it hasn't been started yet. Safe to call from
    /// many concurrent callers; only the first actually starts it.
    pub fn ensure_started(&self) {
        let mut started = self.started.lock();
        if !*started {
            self.driver.start();
            *started = true;
        }
    }

    pub fn status(&self) -> LokinetContextStatus {
        let code = self.driver.status();
        self.last_status.store(code, Ordering::Relaxed);
        LokinetContextStatus::from_code(code)
    }

    /// Resolve a hostname to a loopback address. The caller is responsible
    /// for calling [`Self::ensure_started`] and polling [`Self::status`]
    /// until `Ready` beforehand; this does not start the context itself so
    /// that "not ready yet" is observable rather than silently retried.
    pub fn resolve(&self, hostname: &str) -> SnrrResult<SocketAddr> {
        match self.status() {
            LokinetContextStatus::Ready => self
                .driver
                .resolve(hostname)
                .ok_or_else(|| SnrrError::Transport(TransportError::InvalidUrl(hostname.to_string()))),
            _ => Err(SnrrError::Transport(TransportError::NotReady)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicBool;

    struct ScriptedDriver {
        ready: AtomicBool,
        routes: HashMap<&'static str, SocketAddr>,
    }

    impl LokinetResolver for ScriptedDriver {
        fn start(&self) {
            self.ready.store(true, Ordering::SeqCst);
        }

        fn status(&self) -> i32 {
            if self.ready.load(Ordering::SeqCst) { 0 } else { -1 }
        }

        fn resolve(&self, hostname: &str) -> Option<SocketAddr> {
            self.routes.get(hostname).copied()
        }
    }

    #[test]
    fn resolve_fails_with_not_ready_before_start() {
        let driver = Arc::new(ScriptedDriver {
            ready: AtomicBool::new(false),
            routes: HashMap::new(),
        });
        let ctx = LokinetContext::new(driver);
        let err = ctx.resolve("abc.snode");
        assert!(matches!(
            err,
            Err(SnrrError::Transport(TransportError::NotReady))
        ));
    }

    #[test]
    fn resolve_succeeds_once_ready() {
        let mut routes = HashMap::new();
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        routes.insert("abc.snode", addr);
        let driver = Arc::new(ScriptedDriver {
            ready: AtomicBool::new(false),
            routes,
        });
        let ctx = LokinetContext::new(driver);
        assert_eq!(ctx.resolve("abc.snode").unwrap(), addr);
    }

    #[test]
    fn start_is_idempotent() {
        let driver = Arc::new(ScriptedDriver {
            ready: AtomicBool::new(false),
            routes: HashMap::new(),
        });
        let ctx = LokinetContext::new(driver);
        ctx.ensure_started();
        ctx.ensure_started();
        assert_eq!(ctx.status(), LokinetContextStatus::Ready);
    }
}
