//! Playing step sequences back onto a surface at a human-looking cadence

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Result;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::actions::map_to_actions;
use crate::frame::FrameScheduler;
use crate::surface::{read_content, SharedSurface};
use crate::text_diff::{compute_text_diff, edit_steps};

/// Cloneable flag that stops playback between steps
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, condvar) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        condvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        let (flag, _) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for `timeout` unless cancelled first; returns whether the token is cancelled
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, condvar) = &*self.inner;
        let guard = flag.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = condvar
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// Base delay between steps and how far each delay may stray from it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    pub speed: Duration,
    /// Fraction of `speed` each delay varies by in either direction, within 0.0..=1.0
    pub jitter: f64,
}

impl Pacing {
    pub fn new(speed: Duration, jitter: f64) -> Self {
        let jitter = if jitter.is_finite() { jitter.clamp(0.0, 1.0) } else { 0.0 };
        Pacing { speed, jitter }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        use crate::constants::pacing::{DEFAULT_JITTER, DEFAULT_SPEED_MS};
        Pacing::new(Duration::from_millis(DEFAULT_SPEED_MS), DEFAULT_JITTER)
    }
}

/// Delay before the next step: `speed * (1 + jitter * (2r - 1))` for uniform `r` in `[0, 1)`
pub fn jittered_delay<R: Rng>(pacing: &Pacing, rng: &mut R) -> Duration {
    let r: f64 = rng.gen();
    let factor = 1.0 + pacing.jitter * (2.0 * r - 1.0);
    Duration::try_from_secs_f64(pacing.speed.as_secs_f64() * factor.max(0.0))
        .unwrap_or(Duration::MAX)
}

/// How a playback ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Completed { steps: usize },
    Cancelled { applied: usize },
}

impl Playback {
    /// Steps scheduled before playback ended
    pub fn steps(&self) -> usize {
        match *self {
            Playback::Completed { steps } => steps,
            Playback::Cancelled { applied } => applied,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Playback::Cancelled { .. })
    }
}

/// Plays actions back one at a time with a jittered pause after each
pub struct Player {
    pacing: Pacing,
    rng: StdRng,
}

impl Player {
    pub fn new(pacing: Pacing) -> Self {
        Player {
            pacing,
            rng: StdRng::from_entropy(),
        }
    }

    /// Player with reproducible delays
    pub fn with_seed(pacing: Pacing, seed: u64) -> Self {
        Player {
            pacing,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Schedule every step in order, waiting a jittered delay after each
    ///
    /// Cancellation is checked before each step and during each wait. Paint errors
    /// reported by the frame scheduler are returned as they are.
    pub fn perform<I>(
        &mut self,
        surface: &SharedSurface,
        frames: &mut dyn FrameScheduler,
        steps: I,
        cancel: &CancelToken,
    ) -> Result<Playback>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut applied = 0;

        for action in map_to_actions(steps) {
            if cancel.is_cancelled() {
                warn!("⏹️  Playback cancelled after {} steps", applied);
                return Ok(Playback::Cancelled { applied });
            }

            action.invoke(surface, frames)?;
            applied += 1;

            if let Some(e) = frames.take_error() {
                return Err(e);
            }

            let delay = jittered_delay(&self.pacing, &mut self.rng);
            debug!("⏱️  Step {} scheduled, waiting {:?}", applied, delay);
            if cancel.wait_timeout(delay) {
                warn!("⏹️  Playback cancelled after {} steps", applied);
                return Ok(Playback::Cancelled { applied });
            }
        }

        if let Some(e) = frames.take_error() {
            return Err(e);
        }

        Ok(Playback::Completed { steps: applied })
    }

    /// Animate the surface from whatever it shows now to `target`
    pub fn edit(
        &mut self,
        surface: &SharedSurface,
        frames: &mut dyn FrameScheduler,
        target: &str,
        cancel: &CancelToken,
    ) -> Result<Playback> {
        frames.sync()?;
        let current = read_content(surface)?;

        let diff = compute_text_diff(&current, target);
        info!(
            "✏️  Editing {:?} -> {:?}: keep {}, delete {}, write {}",
            current, target, diff.overlap, diff.chars_to_delete, diff.chars_to_write
        );

        self.perform(surface, frames, edit_steps(&current, target), cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameQueue;
    use crate::surface::{shared, TextBuffer};

    fn fast() -> Pacing {
        Pacing::new(Duration::from_millis(1), 0.5)
    }

    #[test]
    fn test_delay_stays_within_jitter_bounds() {
        let pacing = Pacing::new(Duration::from_millis(60), 0.5);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let delay = jittered_delay(&pacing, &mut rng);
            assert!(delay >= Duration::from_millis(30), "{:?}", delay);
            assert!(delay <= Duration::from_millis(90), "{:?}", delay);
        }
    }

    #[test]
    fn test_zero_jitter_is_exact() {
        let pacing = Pacing::new(Duration::from_millis(60), 0.0);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(jittered_delay(&pacing, &mut rng), Duration::from_millis(60));
    }

    #[test]
    fn test_huge_speed_saturates() {
        let pacing = Pacing::new(Duration::MAX, 1.0);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let delay = jittered_delay(&pacing, &mut rng);
            assert!(delay <= Duration::MAX);
        }
    }

    #[test]
    fn test_pacing_clamps_jitter() {
        assert_eq!(Pacing::new(Duration::ZERO, 3.0).jitter, 1.0);
        assert_eq!(Pacing::new(Duration::ZERO, -1.0).jitter, 0.0);
        assert_eq!(Pacing::new(Duration::ZERO, f64::NAN).jitter, 0.0);
    }

    #[test]
    fn test_cancel_token_wakes_waiter() {
        let cancel = CancelToken::new();
        let waiter = cancel.clone();
        let handle = std::thread::spawn(move || waiter.wait_timeout(Duration::from_secs(30)));
        cancel.cancel();
        assert!(handle.join().unwrap());
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_wait_without_cancel_times_out() {
        let cancel = CancelToken::new();
        assert!(!cancel.wait_timeout(Duration::from_millis(1)));
    }

    #[test]
    fn test_perform_schedules_every_step() {
        let surface = shared(TextBuffer::new(""));
        let mut frames = FrameQueue::new();
        let mut player = Player::with_seed(fast(), 3);

        let outcome = player
            .perform(&surface, &mut frames, ["a", "ab"], &CancelToken::new())
            .unwrap();

        assert_eq!(outcome, Playback::Completed { steps: 2 });
        assert_eq!(frames.pending(), 2);
        assert_eq!(read_content(&surface).unwrap(), "");
        frames.sync().unwrap();
        assert_eq!(read_content(&surface).unwrap(), "ab");
    }

    #[test]
    fn test_perform_stops_when_cancelled() {
        let surface = shared(TextBuffer::new(""));
        let mut frames = FrameQueue::new();
        let mut player = Player::with_seed(fast(), 3);
        let cancel = CancelToken::new();
        cancel.cancel();

        let outcome = player.perform(&surface, &mut frames, ["a", "ab"], &cancel).unwrap();

        assert_eq!(outcome, Playback::Cancelled { applied: 0 });
        assert_eq!(frames.pending(), 0);
    }

    #[test]
    fn test_edit_from_current_content() {
        let surface = shared(TextBuffer::new("some text"));
        let mut frames = FrameQueue::new();
        let mut player = Player::with_seed(fast(), 3);

        let outcome = player
            .edit(&surface, &mut frames, "some other", &CancelToken::new())
            .unwrap();

        assert_eq!(outcome.steps(), 9);
        frames.sync().unwrap();
        assert_eq!(read_content(&surface).unwrap(), "some other");
    }
}
