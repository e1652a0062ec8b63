use std::cell::Cell;

use super::*;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn ready_target_resolves_on_first_poll() {
    let mut w = MediaWait::new("cam", ms(0), WaitPolicy::default());
    assert_eq!(w.poll(ms(0), |_| true), WaitStatus::Ready);
    assert_eq!(*w.target(), "cam");
}

#[test]
fn polls_only_once_per_interval() {
    let checks = Cell::new(0);
    let mut w = MediaWait::new((), ms(0), WaitPolicy::default());
    for t in [0, 10, 20, 49, 50, 60, 99, 100] {
        w.poll(ms(t), |_| {
            checks.set(checks.get() + 1);
            false
        });
    }
    // Due at 0, 50 and 100.
    assert_eq!(checks.get(), 3);
}

#[test]
fn times_out_after_limit() {
    let policy = WaitPolicy {
        poll_interval: ms(50),
        timeout: Some(ms(200)),
    };
    let mut w = MediaWait::new((), ms(1000), policy);
    let mut t = 1000;
    let status = loop {
        let s = w.poll(ms(t), |_| false);
        if s != WaitStatus::Pending {
            break s;
        }
        t += 10;
        assert!(t < 2000, "wait never finished");
    };
    assert_eq!(status, WaitStatus::TimedOut);
    assert!(t >= 1200);
}

#[test]
fn without_timeout_waits_forever() {
    let policy = WaitPolicy {
        poll_interval: ms(50),
        timeout: None,
    };
    let mut w = MediaWait::new((), ms(0), policy);
    assert_eq!(w.poll(ms(3_600_000), |_| false), WaitStatus::Pending);
    assert_eq!(w.poll(ms(7_200_000), |_| true), WaitStatus::Ready);
}
