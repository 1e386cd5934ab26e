//! Backoff with jitter.

use rand::Rng;
use std::time::Duration;

/// Calculate the delay before retry number `attempt` (1 = first retry).
///
/// Exponential mode doubles `base_ms` per attempt; fixed mode always waits
/// `base_ms`. Both are capped at `max_ms` and receive 0–10% jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64, exponential: bool) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let delay_ms = if exponential {
        let exponential_base = 2u64.saturating_pow(attempt - 1);
        base_ms.saturating_mul(exponential_base)
    } else {
        base_ms
    };
    let capped_delay = delay_ms.min(max_ms);

    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff() {
        let b1 = calculate_backoff(1, 100, 2000, true);
        assert!(b1.as_millis() >= 100 && b1.as_millis() < 110);

        let b2 = calculate_backoff(2, 100, 2000, true);
        assert!(b2.as_millis() >= 200 && b2.as_millis() < 220);

        let max = calculate_backoff(10, 100, 1000, true);
        assert!(max.as_millis() >= 1000 && max.as_millis() < 1100);
    }

    #[test]
    fn test_fixed_backoff() {
        for attempt in 1..5 {
            let delay = calculate_backoff(attempt, 50, 1000, false);
            assert!(delay.as_millis() >= 50 && delay.as_millis() < 55);
        }
        assert_eq!(calculate_backoff(0, 50, 1000, false), Duration::ZERO);
    }

    #[test]
    fn test_no_overflow() {
        let delay = calculate_backoff(u32::MAX, u64::MAX, 5_000, true);
        assert!(delay.as_millis() >= 5_000);
    }
}
