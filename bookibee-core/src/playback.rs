//! Narration playback state machine.
//!
//! Playback is modeled as explicit states driven by the caller's audio
//! backend rather than a platform audio clock: the backend reports elapsed
//! time through [`NarrationPlayer::advance`], and the UI polls
//! [`NarrationPlayer::progress`].
//!
//! Cancelling during loading only prevents playback from starting; an
//! in-flight generation request is not cancelled, and the asset is cached
//! once generated regardless.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Playback lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Loading,
    Playing,
    Stopped,
    Completed,
}

/// Cancellation token for a playback attempt.
///
/// Cloneable and thread-safe, so it can be handed to whatever drives the
/// stop control while the narration is still loading.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Request a stop. Idempotent.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// State machine for full-story narration playback.
pub struct NarrationPlayer {
    state: PlaybackState,
    position: Duration,
    duration: Duration,
    handle: StopHandle,
}

impl NarrationPlayer {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            handle: StopHandle::default(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Enter the loading state while the narration asset is fetched or
    /// generated. Returns a fresh cancellation token for this attempt.
    pub fn begin_loading(&mut self) -> StopHandle {
        self.handle = StopHandle::default();
        self.position = Duration::ZERO;
        self.state = PlaybackState::Loading;
        self.handle.clone()
    }

    /// Start playing a clip of the given length.
    ///
    /// Refused (returning false, state `Stopped`) if the token fired while
    /// loading. Valid from `Idle` as well, for already-cached clips.
    pub fn start(&mut self, duration: Duration) -> bool {
        if self.handle.is_stopped() {
            self.state = PlaybackState::Stopped;
            return false;
        }
        if !matches!(self.state, PlaybackState::Idle | PlaybackState::Loading) {
            return false;
        }

        self.position = Duration::ZERO;
        self.duration = duration;
        self.state = PlaybackState::Playing;
        true
    }

    /// Advance the play position by the backend-reported elapsed time.
    /// Transitions to `Completed` at the end of the clip.
    pub fn advance(&mut self, elapsed: Duration) {
        if self.state != PlaybackState::Playing {
            return;
        }

        self.position += elapsed;
        if self.position >= self.duration {
            self.position = self.duration;
            self.state = PlaybackState::Completed;
        }
    }

    /// Playback progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 0.0;
        }
        (self.position.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Halt playback and reset progress. Fires the cancellation token so a
    /// concurrent loading attempt cannot start afterwards.
    pub fn stop(&mut self) {
        self.handle.stop();
        self.position = Duration::ZERO;
        if matches!(self.state, PlaybackState::Loading | PlaybackState::Playing) {
            self.state = PlaybackState::Stopped;
        }
    }

    /// Return to `Idle`, ready for a new attempt.
    pub fn reset(&mut self) {
        self.handle = StopHandle::default();
        self.position = Duration::ZERO;
        self.duration = Duration::ZERO;
        self.state = PlaybackState::Idle;
    }
}

impl Default for NarrationPlayer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut player = NarrationPlayer::new();
        assert_eq!(player.state(), PlaybackState::Idle);

        player.begin_loading();
        assert_eq!(player.state(), PlaybackState::Loading);

        assert!(player.start(Duration::from_secs(10)));
        assert_eq!(player.state(), PlaybackState::Playing);

        player.advance(Duration::from_secs(5));
        assert!((player.progress() - 0.5).abs() < 1e-6);

        player.advance(Duration::from_secs(6));
        assert_eq!(player.state(), PlaybackState::Completed);
        assert!((player.progress() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_stop_resets_progress() {
        let mut player = NarrationPlayer::new();
        player.begin_loading();
        player.start(Duration::from_secs(10));
        player.advance(Duration::from_secs(4));

        player.stop();
        assert_eq!(player.state(), PlaybackState::Stopped);
        assert_eq!(player.progress(), 0.0);
    }

    #[test]
    fn test_cancel_during_loading_refuses_start() {
        let mut player = NarrationPlayer::new();
        let handle = player.begin_loading();

        // The reader hits stop while the narration is still generating.
        handle.stop();

        assert!(!player.start(Duration::from_secs(10)));
        assert_eq!(player.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_start_from_idle_for_cached_clip() {
        let mut player = NarrationPlayer::new();
        assert!(player.start(Duration::from_secs(3)));
        assert_eq!(player.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_reset_allows_new_attempt_after_stop() {
        let mut player = NarrationPlayer::new();
        player.begin_loading();
        player.stop();
        assert_eq!(player.state(), PlaybackState::Stopped);

        player.reset();
        assert_eq!(player.state(), PlaybackState::Idle);
        player.begin_loading();
        assert!(player.start(Duration::from_secs(2)));
    }

    #[test]
    fn test_advance_ignored_outside_playing() {
        let mut player = NarrationPlayer::new();
        player.advance(Duration::from_secs(1));
        assert_eq!(player.state(), PlaybackState::Idle);
        assert_eq!(player.progress(), 0.0);
    }
}
