//! Operation timing
//!
//! Wall-clock timing for service operations, reported through the
//! structured logger.

use std::time::Instant;

use super::logger::Logger;

/// Times one operation from construction to `finish`
#[derive(Debug)]
pub struct Timed {
    operation: &'static str,
    start: Instant,
}

impl Timed {
    /// Start timing an operation
    pub fn start(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    /// Elapsed milliseconds so far
    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }

    /// Finish and log the measured duration with an outcome tag
    pub fn finish(self, outcome: &str) {
        Logger::info(
            "OPERATION_TIMED",
            &[
                ("operation", self.operation.to_string()),
                ("elapsed_ms", self.elapsed_ms().to_string()),
                ("outcome", outcome.to_string()),
            ],
        );
    }
}
