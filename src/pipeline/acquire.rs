//! Stream acquisition with bounded retry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::CameraError;
use crate::video::{Geometry, StreamConstraints, VideoSource};

/// Slice length used while sleeping so a stop request interrupts the backoff
const STOP_POLL: Duration = Duration::from_millis(25);

/// How often, and how patiently, acquisition retries transient failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,

    /// Fixed delay between attempts
    #[serde(with = "millis")]
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Retry without waiting, mostly useful in tests
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Duration::ZERO,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Open `source`, retrying abort-class failures
///
/// If the preferred constraints are rejected as over-constrained, acquisition
/// falls back once to [`StreamConstraints::basic`]; that fallback does not use
/// up a retry. Permission, missing-device and busy-device failures are
/// returned immediately. Setting `stop` abandons a pending backoff.
pub fn acquire<S>(
    source: &mut S,
    preferred: &StreamConstraints,
    policy: &RetryPolicy,
    stop: &AtomicBool,
) -> Result<Geometry, CameraError>
where
    S: VideoSource + ?Sized,
{
    let mut constraints = preferred.clone();
    let mut fell_back = false;
    let mut retries = 0;

    loop {
        match source.open(&constraints) {
            Ok(geometry) => {
                tracing::info!(%geometry, retries, fell_back, "Video stream acquired");
                return Ok(geometry);
            }
            Err(CameraError::OverConstrained(reason)) if !fell_back => {
                tracing::warn!(%reason, "Preferred stream constraints rejected, trying basic constraints");
                constraints = StreamConstraints::basic();
                fell_back = true;
            }
            Err(e) if e.is_retryable() && retries < policy.max_retries => {
                retries += 1;
                tracing::warn!(
                    error = %e,
                    attempt = retries,
                    max_retries = policy.max_retries,
                    "Video stream acquisition failed, retrying"
                );
                if !sleep_unless_stopped(policy.backoff, stop) {
                    tracing::debug!("Acquisition abandoned during backoff");
                    return Err(e);
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Video stream acquisition failed");
                return Err(e);
            }
        }
    }
}

/// Sleep for `duration`; false when `stop` was raised in the meantime
fn sleep_unless_stopped(duration: Duration, stop: &AtomicBool) -> bool {
    let deadline = Instant::now() + duration;
    loop {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep((deadline - now).min(STOP_POLL));
    }
}
