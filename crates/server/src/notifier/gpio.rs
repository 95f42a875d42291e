//! Status LEDs on Raspberry Pi GPIO lines via sysfs.
//!
//! Each request exports both lines, blinks one of them per phase change,
//! and on release drives both low and unexports them again.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use wayback_core::AppConfig;

use super::{Phase, RequestSignal, StatusNotifier, Urgency};

const CPUINFO: &str = "/proc/cpuinfo";

/// Sysfs GPIO LED notifier.
#[derive(Debug, Clone)]
pub struct GpioNotifier {
    root: PathBuf,
    success_pin: u32,
    error_pin: u32,
}

impl GpioNotifier {
    pub fn new(root: impl Into<PathBuf>, success_pin: u32, error_pin: u32) -> Self {
        Self { root: root.into(), success_pin, error_pin }
    }

    /// Notifier for the configured lines, if this host is a Raspberry Pi
    /// with a sysfs GPIO tree.
    pub fn detect(config: &AppConfig) -> Option<Self> {
        if !config.gpio_root.is_dir() || !is_raspberry_pi() {
            return None;
        }
        Some(Self::new(config.gpio_root.clone(), config.success_pin, config.error_pin))
    }
}

fn is_raspberry_pi() -> bool {
    cfg!(target_os = "linux")
        && std::fs::read_to_string(CPUINFO)
            .map(|info| info.contains("Raspberry Pi"))
            .unwrap_or(false)
}

fn line_dir(root: &Path, pin: u32) -> PathBuf {
    root.join(format!("gpio{pin}"))
}

#[async_trait]
impl StatusNotifier for GpioNotifier {
    async fn acquire(&self) -> Box<dyn RequestSignal> {
        for pin in [self.success_pin, self.error_pin] {
            // EBUSY here means the line is still exported from an earlier request.
            if let Err(e) = tokio::fs::write(self.root.join("export"), pin.to_string()).await {
                tracing::debug!(pin, error = %e, "GPIO export failed");
            }
            if let Err(e) = tokio::fs::write(line_dir(&self.root, pin).join("direction"), "out").await {
                tracing::debug!(pin, error = %e, "GPIO direction failed");
            }
        }

        Box::new(GpioSignal { root: self.root.clone(), success_pin: self.success_pin, error_pin: self.error_pin })
    }
}

struct GpioSignal {
    root: PathBuf,
    success_pin: u32,
    error_pin: u32,
}

impl GpioSignal {
    async fn set(&self, pin: u32, lit: bool) -> std::io::Result<()> {
        tokio::fs::write(line_dir(&self.root, pin).join("value"), if lit { "1" } else { "0" }).await
    }
}

#[async_trait]
impl RequestSignal for GpioSignal {
    async fn notify(&mut self, phase: Phase, urgency: Urgency) {
        let pin = match phase {
            Phase::Error => self.error_pin,
            Phase::Working | Phase::Success => self.success_pin,
        };
        let burst = urgency.blink_duration();
        let interval = (burst / 100).max(Duration::from_millis(1));

        let started = Instant::now();
        let mut lit = true;
        while started.elapsed() < burst {
            if let Err(e) = self.set(pin, lit).await {
                tracing::debug!(pin, error = %e, "GPIO write failed");
                return;
            }
            lit = !lit;
            tokio::time::sleep(interval).await;
        }
    }

    // Runs from `Drop`, so it cannot await. Sysfs writes return without
    // touching a disk, which keeps these blocking calls short on the worker.
    fn release(&mut self) {
        for pin in [self.success_pin, self.error_pin] {
            if let Err(e) = std::fs::write(line_dir(&self.root, pin).join("value"), "0") {
                tracing::debug!(pin, error = %e, "GPIO reset failed");
            }
            if let Err(e) = std::fs::write(self.root.join("unexport"), pin.to_string()) {
                tracing::debug!(pin, error = %e, "GPIO unexport failed");
            }
        }
    }
}
