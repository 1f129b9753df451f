//! Chain diagnostics: per-operation timing for a single execution.
//!
//! Time is read through the [`Clock`] trait so the core stays free of a
//! platform clock. Binaries pass a clock backed by
//! `std::time::Instant`; tests pass a deterministic one.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ops::OperationKind;

/// Source of timestamps for diagnostics.
pub trait Clock {
    /// Opaque timestamp.
    type Instant;

    /// Current timestamp.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from one chain execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDiagnostics {
    /// Input width in pixels.
    pub width: usize,
    /// Input height in pixels.
    pub height: usize,
    /// One entry per operation, in execution order.
    pub operations: Vec<OperationDiagnostics>,
    /// Wall-clock duration of the whole execution, including the copy
    /// into the output buffer.
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
}

/// Timing for a single operation in the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDiagnostics {
    /// Caller-assigned id of the chain entry.
    pub id: i32,
    /// Kind of operation that ran.
    pub kind: OperationKind,
    /// Wall-clock duration of `perform`.
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

impl ChainDiagnostics {
    /// Sum of the per-operation durations.
    #[must_use]
    pub fn operations_duration(&self) -> Duration {
        self.operations.iter().map(|op| op.duration).sum()
    }

    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Chain Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.width,
            self.height,
            self.width * self.height,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<8} {:<12} {:>10} {:>10}",
            "Id", "Operation", "Duration", "% Total"
        ));
        lines.push("-".repeat(44));

        let total_ms = duration_ms(self.total_duration);
        for op in &self.operations {
            let ms = duration_ms(op.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "{:<8} {:<12} {ms:>8.3}ms {pct:>9.1}%",
                op.id,
                op.kind.to_string(),
            ));
        }
        if self.operations.is_empty() {
            lines.push("(empty chain: input copied)".to_owned());
        }

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
const fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
