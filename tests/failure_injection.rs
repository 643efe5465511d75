//! Failure injection tests for the breaker state machine.

use std::time::Duration;

use circuit_breaker::{BreakerError, BreakerOptions, CircuitBreaker, CircuitState, Policy};

mod common;
use common::{breaker, sleep_ms, FlakyDependency};

#[tokio::test]
async fn test_fresh_breaker_is_closed_and_admits_first_call() {
    for policy in [Policy::MaxFails, Policy::MaxConsecutiveFails, Policy::Unbounded] {
        let cb = breaker(policy, 1, 50);
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.failures(), 0);

        let dep = FlakyDependency::new(|_| true);
        assert_eq!(cb.execute(|| dep.call()).await.unwrap(), 1);
        assert_eq!(dep.calls(), 1);
    }
}

#[tokio::test]
async fn test_consecutive_failures_open_and_refuse() {
    let cb = breaker(Policy::MaxConsecutiveFails, 3, 10_000);
    let dep = FlakyDependency::new(|_| false);

    for n in 1..=3 {
        let err = cb.execute(|| dep.call()).await.unwrap_err();
        assert_eq!(err.into_operation_error(), Some(common::DependencyError(n)));
    }
    assert_eq!(cb.state(), CircuitState::Open);

    let err = cb.execute(|| dep.call()).await.unwrap_err();
    assert!(matches!(err, BreakerError::Refused { ref name } if name == cb.name()));
    assert_eq!(dep.calls(), 3, "refused call must not reach the dependency");
}

#[tokio::test]
async fn test_success_resets_consecutive_counter() {
    let cb = breaker(Policy::MaxConsecutiveFails, 3, 10_000);
    // fail, fail, ok, fail, fail, fail
    let dep = FlakyDependency::new(|n| n == 3);

    for _ in 0..5 {
        let _ = cb.execute(|| dep.call()).await;
        assert_eq!(cb.state(), CircuitState::Closed);
    }
    assert_eq!(cb.failures(), 2);

    let _ = cb.execute(|| dep.call()).await;
    assert_eq!(cb.state(), CircuitState::Open);
}

#[tokio::test]
async fn test_no_call_admitted_until_open_interval_elapses() {
    let cb = breaker(Policy::MaxConsecutiveFails, 1, 100);
    let dep = FlakyDependency::new(|n| n > 1);

    let _ = cb.execute(|| dep.call()).await;
    assert_eq!(cb.state(), CircuitState::Open);

    for _ in 0..5 {
        sleep_ms(10).await;
        assert!(cb.execute(|| dep.call()).await.unwrap_err().is_refused());
    }
    assert_eq!(dep.calls(), 1);

    sleep_ms(150).await;
    assert_eq!(cb.state(), CircuitState::HalfOpen);
    assert!(cb.execute(|| dep.call()).await.is_ok());
    assert_eq!(dep.calls(), 2);
}

#[tokio::test]
async fn test_scenario_half_open_trial_fails() {
    let cb = breaker(Policy::MaxConsecutiveFails, 2, 50);
    let dep = FlakyDependency::new(|_| false);

    assert!(cb.execute(|| dep.call()).await.is_err());
    assert!(cb.execute(|| dep.call()).await.is_err());
    assert_eq!(cb.state(), CircuitState::Open);
    assert!(cb.execute(|| dep.call()).await.unwrap_err().is_refused());

    sleep_ms(60 + 40).await;
    assert_eq!(cb.state(), CircuitState::HalfOpen);
    let err = cb.execute(|| dep.call()).await.unwrap_err();
    assert!(!err.is_refused());
    assert_eq!(cb.state(), CircuitState::Open);
    assert_eq!(dep.calls(), 3);

    // Re-armed: refused again until another full interval passes.
    sleep_ms(20).await;
    assert!(cb.execute(|| dep.call()).await.unwrap_err().is_refused());
    sleep_ms(100).await;
    assert_eq!(cb.state(), CircuitState::HalfOpen);
}

#[tokio::test]
async fn test_scenario_half_open_trial_succeeds() {
    let cb = breaker(Policy::MaxConsecutiveFails, 2, 50);
    let dep = FlakyDependency::new(|n| n > 2);

    let _ = cb.execute(|| dep.call()).await;
    let _ = cb.execute(|| dep.call()).await;
    assert!(cb.execute(|| dep.call()).await.unwrap_err().is_refused());

    sleep_ms(100).await;
    assert_eq!(cb.execute(|| dep.call()).await.unwrap(), 3);
    assert_eq!(cb.state(), CircuitState::Closed);
    assert_eq!(cb.failures(), 0);
}

#[tokio::test]
async fn test_scenario_cumulative_failures_open() {
    let cb = breaker(Policy::MaxFails, 3, 10_000);
    // success, fail, success, fail, fail
    let dep = FlakyDependency::new(|n| n == 1 || n == 3);

    for _ in 0..4 {
        let _ = cb.execute(|| dep.call()).await;
        assert_eq!(cb.state(), CircuitState::Closed);
    }
    assert_eq!(cb.failures(), 2);

    let _ = cb.execute(|| dep.call()).await;
    assert_eq!(cb.state(), CircuitState::Open);
}

#[tokio::test]
async fn test_cumulative_counter_survives_long_healthy_run() {
    let cb = breaker(Policy::MaxFails, 3, 10_000);
    let dep = FlakyDependency::new(|n| !(n <= 2 || n == 100));

    for _ in 0..99 {
        let _ = cb.execute(|| dep.call()).await;
    }
    assert_eq!(cb.state(), CircuitState::Closed);
    assert_eq!(cb.failures(), 2);

    let _ = cb.execute(|| dep.call()).await;
    assert_eq!(cb.state(), CircuitState::Open);
}

#[tokio::test]
async fn test_reset_on_success_corrects_cumulative_counter() {
    let cb = CircuitBreaker::new(BreakerOptions {
        max_fails: Some(3),
        reset_on_success: true,
        open_interval: Some(Duration::from_secs(10)),
        ..Default::default()
    });
    let dep = FlakyDependency::new(|n| n % 3 == 0);

    for _ in 0..12 {
        let _ = cb.execute(|| dep.call()).await;
    }
    assert_eq!(cb.state(), CircuitState::Closed);
}

#[tokio::test]
async fn test_operation_error_is_not_transformed() {
    let cb = breaker(Policy::MaxFails, 5, 50);
    let res: Result<(), _> = cb
        .execute(|| async { Err(std::io::Error::new(std::io::ErrorKind::Other, "disk")) })
        .await;
    let err = res.unwrap_err().into_operation_error().unwrap();
    assert_eq!(err.kind(), std::io::ErrorKind::Other);
    assert_eq!(err.to_string(), "disk");
}

#[tokio::test]
async fn test_state_names_stay_in_domain() {
    let cb = breaker(Policy::MaxConsecutiveFails, 1, 30);
    let dep = FlakyDependency::new(|n| n % 2 == 0);
    let valid = ["closed", "open", "half-open"];

    for _ in 0..10 {
        let _ = cb.execute(|| dep.call()).await;
        assert!(valid.contains(&cb.state().as_str()));
        sleep_ms(15).await;
        assert!(valid.contains(&cb.state().to_string().as_str()));
    }
}
