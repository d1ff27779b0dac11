use std::time::Duration;

use tokio::sync::watch;

/// One-shot, waitable acknowledgment flag for a single delivery unit.
///
/// Starts `unset`; [`set`](Self::set) moves it to `set`, which is terminal.
/// Waiters that arrive after the flag is set return immediately.
#[derive(Debug)]
pub struct AckSignal {
    tx: watch::Sender<bool>,
}

impl AckSignal {
    /// Create a new, unset signal.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Set the signal, waking every current waiter.
    ///
    /// Returns `true` if this call performed the transition and `false` if the
    /// signal was already set, in which case nobody is woken again.
    pub fn set(&self) -> bool {
        self.tx.send_if_modified(|set| {
            if *set {
                false
            } else {
                *set = true;
                true
            }
        })
    }

    /// Returns `true` once the signal has been set.
    pub fn is_set(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait up to `timeout` for the signal to become set.
    ///
    /// Returns `true` if the signal is (or becomes) set within the window.
    pub async fn wait(&self, timeout: Duration) -> bool {
        let mut rx = self.tx.subscribe();
        matches!(
            tokio::time::timeout(timeout, rx.wait_for(|set| *set)).await,
            Ok(Ok(_))
        )
    }
}

impl Default for AckSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn starts_unset() {
        let signal = AckSignal::new();
        assert!(!signal.is_set());
    }

    #[test]
    fn second_set_is_a_no_op() {
        let signal = AckSignal::new();
        assert!(signal.set());
        assert!(!signal.set());
        assert!(signal.is_set());
    }

    #[tokio::test(start_paused = true)]
    async fn wait_times_out_when_never_set() {
        let signal = AckSignal::new();
        let started = tokio::time::Instant::now();
        assert!(!signal.wait(Duration::from_secs(2)).await);
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_returns_immediately_when_already_set() {
        let signal = AckSignal::new();
        signal.set();
        let started = tokio::time::Instant::now();
        assert!(signal.wait(Duration::from_secs(30)).await);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn set_wakes_waiter_before_timeout() {
        let signal = Arc::new(AckSignal::new());
        let setter = Arc::clone(&signal);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            setter.set();
        });

        let started = tokio::time::Instant::now();
        assert!(signal.wait(Duration::from_secs(5)).await);
        assert_eq!(started.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn set_wakes_every_waiter() {
        let signal = Arc::new(AckSignal::new());
        let mut waiters = Vec::new();
        for _ in 0..4 {
            let s = Arc::clone(&signal);
            waiters.push(tokio::spawn(
                async move { s.wait(Duration::from_secs(5)).await },
            ));
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        signal.set();
        for waiter in waiters {
            assert!(waiter.await.unwrap());
        }
    }
}
