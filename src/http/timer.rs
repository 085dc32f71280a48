use std::pin::Pin;
use std::time::Duration;

use tokio::time::{Instant, Sleep};

/// Per-connection idle watchdog.
///
/// Owned by the connection worker and polled from the same task, so firing is
/// observed as an ordinary `select!` branch. Once [`IdleTimer::cancel`]
/// returns the timer cannot fire.
#[derive(Debug)]
pub struct IdleTimer {
    window: Duration,
    sleep: Pin<Box<Sleep>>,
    armed: bool,
}

impl IdleTimer {
    /// Creates a disarmed timer.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            sleep: Box::pin(tokio::time::sleep(window)),
            armed: false,
        }
    }

    /// Schedules firing one window from now, replacing any earlier deadline.
    pub fn rearm(&mut self) {
        self.sleep.as_mut().reset(Instant::now() + self.window);
        self.armed = true;
    }

    pub fn cancel(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.armed.then(|| self.sleep.deadline())
    }

    /// Resolves when the armed deadline passes; never resolves while disarmed.
    ///
    /// Cancel safe: dropping the future leaves the deadline untouched.
    pub async fn expired(&mut self) {
        if !self.armed {
            std::future::pending::<()>().await;
        }
        self.sleep.as_mut().await;
        self.armed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_after_window() {
        let mut timer = IdleTimer::new(Duration::from_millis(5000));
        timer.rearm();
        let start = Instant::now();

        timer.expired().await;

        assert_eq!(start.elapsed(), Duration::from_millis(5000));
        assert!(!timer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn disarmed_timer_never_fires() {
        let mut timer = IdleTimer::new(Duration::from_millis(10));
        timer.rearm();
        timer.cancel();

        let fired = tokio::time::timeout(Duration::from_secs(60), timer.expired()).await;
        assert!(fired.is_err());
        assert_eq!(timer.deadline(), None);
    }
}
