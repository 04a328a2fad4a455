use super::*;

#[test]
fn allows_up_to_the_limit_then_refuses() {
    let limiter = RateLimiter::new(3, Duration::from_secs(60));
    let now = Instant::now();

    assert!(limiter.allow("10.0.0.1", now));
    assert!(limiter.allow("10.0.0.1", now));
    assert!(limiter.allow("10.0.0.1", now));
    assert!(!limiter.allow("10.0.0.1", now));
    assert!(!limiter.allow("10.0.0.1", now + Duration::from_secs(30)));
}

#[test]
fn sources_are_independent() {
    let limiter = RateLimiter::new(1, Duration::from_secs(60));
    let now = Instant::now();
    assert!(limiter.allow("a", now));
    assert!(!limiter.allow("a", now));
    assert!(limiter.allow("b", now));
}

#[test]
fn window_rolls_over() {
    let limiter = RateLimiter::new(1, Duration::from_secs(60));
    let now = Instant::now();
    assert!(limiter.allow("a", now));
    assert!(!limiter.allow("a", now + Duration::from_secs(59)));
    assert!(limiter.allow("a", now + Duration::from_secs(60)));
}
