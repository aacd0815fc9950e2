//! Request pacing against the upstream rate limit.

use std::time::Duration;

use tracing::info;

/// Sleeps after every `every` units of remote work.
///
/// One pacer per triggered run; the counter is not shared between runs.
#[derive(Debug)]
pub struct Pacer {
  every: u32,
  pause: Duration,
  count: u32,
}

impl Pacer {
  /// `every == 0` disables pacing.
  pub fn new(every: u32, pause: Duration) -> Self { Self { every, pause, count: 0 } }

  /// Count one unit of work, sleeping first if it completes a batch.
  /// Returns the counter after the call.
  pub async fn pace(&mut self) -> u32 {
    self.count += 1;
    if self.every > 0 && self.count >= self.every {
      info!(pause_secs = self.pause.as_secs(), "pacing to stay under rate limit");
      tokio::time::sleep(self.pause).await;
      self.count = 0;
    }
    self.count
  }
}

#[cfg(test)]
mod tests {
  use tokio::time::Instant;

  use super::*;

  #[tokio::test(start_paused = true)]
  async fn sleeps_once_per_batch() {
    let mut pacer = Pacer::new(3, Duration::from_secs(60));
    let start = Instant::now();

    assert_eq!(pacer.pace().await, 1);
    assert_eq!(pacer.pace().await, 2);
    assert_eq!(start.elapsed(), Duration::ZERO);

    assert_eq!(pacer.pace().await, 0);
    assert_eq!(start.elapsed(), Duration::from_secs(60));

    for _ in 0..3 {
      pacer.pace().await;
    }
    assert_eq!(start.elapsed(), Duration::from_secs(120));
  }

  #[tokio::test(start_paused = true)]
  async fn zero_disables_pacing() {
    let mut pacer = Pacer::new(0, Duration::from_secs(60));
    let start = Instant::now();
    for expected in 1..=50 {
      assert_eq!(pacer.pace().await, expected);
    }
    assert_eq!(start.elapsed(), Duration::ZERO);
  }
}
