//! Per-minute token bucket

/// Token bucket refilling `capacity` tokens every 60 seconds.
///
/// One token is 60_000 units, so a bucket of `capacity` gains exactly
/// `capacity` units per elapsed millisecond and refill never rounds. The
/// bucket is owned by a policy entry and mutated under that entry's lock,
/// so plain fields suffice.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    units: u64,
    capacity: u32,
    last_refill_ms: i64,
}

const UNITS_PER_TOKEN: u64 = 60_000;

impl TokenBucket {
    /// Create a full bucket
    pub fn new(per_minute: u32, now_ms: i64) -> Self {
        Self {
            units: per_minute as u64 * UNITS_PER_TOKEN,
            capacity: per_minute,
            last_refill_ms: now_ms,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Apply a changed per-minute limit, keeping the current fill level
    /// within the new capacity.
    pub fn set_capacity(&mut self, per_minute: u32) {
        self.capacity = per_minute;
        self.units = self.units.min(self.max_units());
    }

    fn max_units(&self) -> u64 {
        self.capacity as u64 * UNITS_PER_TOKEN
    }

    fn refill(&mut self, now_ms: i64) {
        if now_ms <= self.last_refill_ms {
            return;
        }
        let elapsed_ms = (now_ms - self.last_refill_ms) as u64;
        let added = elapsed_ms.saturating_mul(self.capacity as u64);
        self.units = self.units.saturating_add(added).min(self.max_units());
        self.last_refill_ms = now_ms;
    }

    /// Take one token if available
    pub fn try_consume_at(&mut self, now_ms: i64) -> bool {
        self.refill(now_ms);
        if self.units >= UNITS_PER_TOKEN {
            self.units -= UNITS_PER_TOKEN;
            true
        } else {
            false
        }
    }

    /// Whole tokens currently available
    pub fn available_at(&mut self, now_ms: i64) -> u32 {
        self.refill(now_ms);
        (self.units / UNITS_PER_TOKEN) as u32
    }

    /// Milliseconds until one token is available
    pub fn retry_after_ms(&mut self, now_ms: i64) -> u64 {
        self.refill(now_ms);
        if self.units >= UNITS_PER_TOKEN || self.capacity == 0 {
            return 0;
        }
        let deficit = UNITS_PER_TOKEN - self.units;
        deficit.div_ceil(self.capacity as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_bucket_basic() {
        let mut bucket = TokenBucket::new(3, 0);

        for _ in 0..3 {
            assert!(bucket.try_consume_at(0));
        }
        assert!(!bucket.try_consume_at(0));
        assert_eq!(bucket.available_at(0), 0);
    }

    #[test]
    fn test_token_bucket_refill() {
        let mut bucket = TokenBucket::new(6, 0);
        for _ in 0..6 {
            assert!(bucket.try_consume_at(0));
        }

        // 6 per minute = one token every 10 seconds
        assert!(!bucket.try_consume_at(9_999));
        assert!(bucket.try_consume_at(10_000));
        assert!(!bucket.try_consume_at(10_000));

        assert_eq!(bucket.available_at(120_000), 6);
    }

    #[test]
    fn test_frequent_checks_still_refill() {
        let mut bucket = TokenBucket::new(1, 0);
        assert!(bucket.try_consume_at(0));

        let granted_at = (1..=3_600)
            .map(|step| step * 50)
            .find(|&now| bucket.try_consume_at(now));
        assert_eq!(granted_at, Some(60_000));
    }

    #[test]
    fn test_refill_rate_over_many_checks() {
        let mut bucket = TokenBucket::new(7, 0);
        for _ in 0..7 {
            assert!(bucket.try_consume_at(0));
        }

        // Checking every 3 ms for a minute yields the full 7 tokens
        let granted = (1..=20_000)
            .filter(|&step| bucket.try_consume_at(step * 3))
            .count();
        assert_eq!(granted, 7);
    }

    #[test]
    fn test_retry_after() {
        let mut bucket = TokenBucket::new(1, 0);
        assert_eq!(bucket.retry_after_ms(0), 0);
        assert!(bucket.try_consume_at(0));
        assert_eq!(bucket.retry_after_ms(0), 60_000);
        assert_eq!(bucket.retry_after_ms(30_000), 30_000);
    }

    #[test]
    fn test_capacity_change_clamps_tokens() {
        let mut bucket = TokenBucket::new(10, 0);
        bucket.set_capacity(2);
        assert_eq!(bucket.capacity(), 2);
        assert_eq!(bucket.available_at(0), 2);
    }
}
