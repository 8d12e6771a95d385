//! Deterministic executor for time-driven tests.
//!
//! The `std` feature pins embassy-time to its mock driver, so timers only
//! fire when the test advances the clock. This harness busy-polls the future
//! and steps mock time forward one millisecond between polls.

use core::future::Future;
use core::pin::pin;
use core::task::{Context, Poll, Waker};

use embassy_time::{Duration, MockDriver};

/// Poll `fut` to completion, advancing mock time 1 ms per pending poll.
/// Panics when `limit` of mock time passes without completion.
pub fn block_on_with_time<F: Future>(fut: F, limit: Duration) -> F::Output {
    let driver = MockDriver::get();
    let mut fut = pin!(fut);
    let mut cx = Context::from_waker(Waker::noop());
    let mut elapsed = Duration::from_ticks(0);
    loop {
        if let Poll::Ready(output) = fut.as_mut().poll(&mut cx) {
            return output;
        }
        assert!(
            elapsed < limit,
            "future still pending after {} ms of mock time",
            limit.as_millis()
        );
        driver.advance(Duration::from_millis(1));
        elapsed += Duration::from_millis(1);
    }
}
