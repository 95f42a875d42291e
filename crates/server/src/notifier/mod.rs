//! Request status indicator.
//!
//! A notifier hands out one [`RequestSignal`] per request. The signal is
//! told the current phase and urgency and keeps no state between calls
//! beyond whatever hardware handle it holds. Nothing here can fail a
//! request: every implementation swallows its own errors.

mod gpio;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use wayback_core::{AppConfig, NotifierKind};

pub use gpio::GpioNotifier;

/// Request lifecycle phase shown by the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Working,
    Success,
    Error,
}

/// How quickly the indicator blinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Slow,
    Medium,
    Fast,
}

impl Urgency {
    /// Wall-clock length of one blink burst.
    pub fn blink_duration(self) -> Duration {
        match self {
            Urgency::Slow => Duration::from_millis(1000),
            Urgency::Medium => Duration::from_millis(500),
            Urgency::Fast => Duration::from_millis(100),
        }
    }
}

/// Source of per-request signals.
#[async_trait]
pub trait StatusNotifier: Send + Sync {
    /// Acquire a signal for one request. Never fails; a notifier that
    /// cannot reach its hardware returns a signal that does nothing.
    async fn acquire(&self) -> Box<dyn RequestSignal>;
}

/// Indicator handle scoped to a single request.
#[async_trait]
pub trait RequestSignal: Send {
    async fn notify(&mut self, phase: Phase, urgency: Urgency);

    /// Turn everything off and give the hardware back.
    fn release(&mut self);
}

/// Releases its signal when dropped, whatever way the request ended.
pub struct SignalGuard {
    signal: Box<dyn RequestSignal>,
}

impl SignalGuard {
    pub fn new(signal: Box<dyn RequestSignal>) -> Self {
        Self { signal }
    }

    pub async fn notify(&mut self, phase: Phase, urgency: Urgency) {
        self.signal.notify(phase, urgency).await;
    }
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.signal.release();
    }
}

/// Notifier that does nothing.
pub struct NoopNotifier;

struct NoopSignal;

#[async_trait]
impl RequestSignal for NoopSignal {
    async fn notify(&mut self, _phase: Phase, _urgency: Urgency) {}

    fn release(&mut self) {}
}

#[async_trait]
impl StatusNotifier for NoopNotifier {
    async fn acquire(&self) -> Box<dyn RequestSignal> {
        Box::new(NoopSignal)
    }
}

/// Notifier that reports phases as tracing events.
pub struct LogNotifier;

struct LogSignal;

#[async_trait]
impl RequestSignal for LogSignal {
    async fn notify(&mut self, phase: Phase, urgency: Urgency) {
        match phase {
            Phase::Error => tracing::warn!(?phase, ?urgency, "request status"),
            _ => tracing::debug!(?phase, ?urgency, "request status"),
        }
    }

    fn release(&mut self) {}
}

#[async_trait]
impl StatusNotifier for LogNotifier {
    async fn acquire(&self) -> Box<dyn RequestSignal> {
        Box::new(LogSignal)
    }
}

/// Build the notifier selected by configuration.
pub fn from_config(config: &AppConfig) -> Arc<dyn StatusNotifier> {
    match config.notifier {
        NotifierKind::None => Arc::new(NoopNotifier),
        NotifierKind::Log => Arc::new(LogNotifier),
        NotifierKind::Gpio => match GpioNotifier::detect(config) {
            Some(gpio) => {
                tracing::info!(
                    success_pin = config.success_pin,
                    error_pin = config.error_pin,
                    "GPIO status LEDs enabled"
                );
                Arc::new(gpio)
            }
            None => {
                tracing::warn!("GPIO notifier requested but no Raspberry Pi GPIO found, status LEDs disabled");
                Arc::new(NoopNotifier)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSignal {
        releases: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RequestSignal for CountingSignal {
        async fn notify(&mut self, _phase: Phase, _urgency: Urgency) {}

        fn release(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_blink_durations() {
        assert_eq!(Urgency::Slow.blink_duration(), Duration::from_millis(1000));
        assert_eq!(Urgency::Medium.blink_duration(), Duration::from_millis(500));
        assert_eq!(Urgency::Fast.blink_duration(), Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_guard_releases_on_drop() {
        let releases = Arc::new(AtomicUsize::new(0));
        {
            let mut guard = SignalGuard::new(Box::new(CountingSignal { releases: releases.clone() }));
            guard.notify(Phase::Working, Urgency::Fast).await;
        }
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_guard_releases_when_future_dropped() {
        let releases = Arc::new(AtomicUsize::new(0));
        let signal = Box::new(CountingSignal { releases: releases.clone() });

        let pending = async move {
            let _guard = SignalGuard::new(signal);
            std::future::pending::<()>().await;
        };
        let _ = tokio::time::timeout(Duration::from_millis(10), pending).await;

        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_from_config_falls_back_without_gpio() {
        let config = AppConfig {
            notifier: NotifierKind::Gpio,
            gpio_root: "/nonexistent/gpio".into(),
            ..Default::default()
        };
        let notifier = from_config(&config);
        let mut signal = notifier.acquire().await;
        signal.notify(Phase::Error, Urgency::Fast).await;
        signal.release();
    }
}
