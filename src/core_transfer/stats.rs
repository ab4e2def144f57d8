use std::fmt;
use std::time::Duration;

/// Byte count and wall time of one completed transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferStats {
    pub bytes: u64,
    pub elapsed: Duration,
}

impl TransferStats {
    /// Throughput in KiB per second; zero when nothing measurable happened.
    pub fn rate_kib(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 || self.bytes == 0 {
            return 0.0;
        }
        self.bytes as f64 / secs / 1024.0
    }
}

impl fmt::Display for TransferStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bytes in {:.3} seconds ({:.2} KB/s)",
            self.bytes,
            self.elapsed.as_secs_f64(),
            self.rate_kib()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate() {
        let stats = TransferStats {
            bytes: 2048,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(stats.rate_kib(), 1.0);
        assert_eq!(stats.to_string(), "2048 bytes in 2.000 seconds (1.00 KB/s)");
    }

    #[test]
    fn test_zero_elapsed() {
        let stats = TransferStats {
            bytes: 10,
            elapsed: Duration::ZERO,
        };
        assert_eq!(stats.rate_kib(), 0.0);
    }
}
