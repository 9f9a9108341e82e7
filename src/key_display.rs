use std::time::{Duration, Instant};

use crate::chord::{format_chord, HeldKeySet};
use crate::keys::KeyId;

/// Durations driving the chord display lifecycle. All three may be zero; a
/// zero-length timer is due on the next tick and a zero-length fade snaps the
/// label invisible. Updates take effect the next time the corresponding timer
/// is (re)started, never retroactively.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyDisplayTimings {
    /// How long the label stays after the last key is released.
    pub show: Duration,
    /// How long the fade-out animation runs once the show window elapses.
    pub fade: Duration,
    /// Grace window during which a partially released chord stays frozen.
    pub chord_hold: Duration,
}

impl Default for KeyDisplayTimings {
    fn default() -> Self {
        Self {
            show: Duration::from_millis(1200),
            fade: Duration::from_millis(600),
            chord_hold: Duration::from_millis(300),
        }
    }
}

/// Where the display currently is in its lifecycle.
///
/// `PendingHide` is the window between the last key release and the hide
/// timer firing: the label is still fully visible but nothing is held.
/// Keeping it a distinct state (rather than a flag on `Idle`) means a timer
/// can only fire in the state that armed it, so a stale fire after a new key
/// press is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPhase {
    Idle,
    Active,
    Frozen,
    PendingHide,
    FadingOut,
}

/// A restartable one-shot deadline. Created once, stopped and re-armed for
/// the lifetime of the state machine.
#[derive(Debug, Default, Clone, Copy)]
struct OneShot {
    deadline: Option<Instant>,
}

impl OneShot {
    fn start(&mut self, now: Instant, interval: Duration) {
        self.deadline = Some(now + interval);
    }

    fn stop(&mut self) {
        self.deadline = None;
    }

    /// Consumes and reports a due deadline. A stopped timer never fires.
    fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// The chord display state machine.
///
/// Consumes `(key, down|up)` notifications from both input sources and owns
/// the held-key set, the rendered label, and the show/fade/chord-hold
/// lifecycle. Every entry point, including `tick`, must be called from the
/// UI thread; cross-thread sources hand their events off through a FIFO
/// channel first (see `keyboard_hook`). Time is passed in explicitly so the
/// lifecycle is deterministic under test.
#[derive(Debug)]
pub struct KeyDisplay {
    held: HeldKeySet,
    phase: DisplayPhase,
    label: String,
    timings: KeyDisplayTimings,
    hide: OneShot,
    chord_hold: OneShot,
    fade_started: Option<Instant>,
    // Captured when the fade starts so a live timing update does not warp an
    // animation already in flight.
    fade_duration: Duration,
}

impl KeyDisplay {
    pub fn new(timings: KeyDisplayTimings) -> Self {
        Self {
            held: HeldKeySet::new(),
            phase: DisplayPhase::Idle,
            label: String::new(),
            timings,
            hide: OneShot::default(),
            chord_hold: OneShot::default(),
            fade_started: None,
            fade_duration: Duration::ZERO,
        }
    }

    /// Replace the configured durations. Applies from the next timer
    /// (re)start onward.
    pub fn set_timings(&mut self, timings: KeyDisplayTimings) {
        self.timings = timings;
    }

    pub fn timings(&self) -> KeyDisplayTimings {
        self.timings
    }

    pub fn phase(&self) -> DisplayPhase {
        self.phase
    }

    /// The label the rendering surface should show right now. Locked to the
    /// frozen snapshot while a partial release is in its grace window.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    /// A key went down. A repeat for an already-held key is a no-op, which
    /// absorbs both OS auto-repeat and duplicate delivery from the second
    /// input source. A genuine press always shows the live chord: it cancels
    /// any fade, un-freezes a frozen label and disarms both timers.
    pub fn on_key_down(&mut self, key: KeyId, _now: Instant) {
        if !self.held.add(key) {
            return;
        }
        self.label = format_chord(&self.held);
        self.hide.stop();
        self.chord_hold.stop();
        self.fade_started = None;
        self.phase = DisplayPhase::Active;
    }

    /// A key came up. A release for a key that is not held is a no-op.
    pub fn on_key_up(&mut self, key: KeyId, now: Instant) {
        if !self.held.remove(key) {
            return;
        }

        if self.held.is_empty() {
            // Last key released: drop any freeze and arm the hide timer; the
            // label stays visible until it fires.
            self.chord_hold.stop();
            self.hide.start(now, self.timings.show);
            self.phase = DisplayPhase::PendingHide;
        } else if self.phase != DisplayPhase::Frozen && !self.label.is_empty() {
            // A chord is shrinking. Freeze the label as currently rendered
            // (still including the just-released key) so the full chord stays
            // readable for the hold window. Later releases while frozen keep
            // updating the held set but not the label.
            self.chord_hold.start(now, self.timings.chord_hold);
            self.phase = DisplayPhase::Frozen;
        }
    }

    /// Evaluate due timers and advance the fade. Called from the UI loop;
    /// timers only ever fire here, on the owning thread, so they cannot race
    /// the key handlers.
    pub fn tick(&mut self, now: Instant) {
        if self.chord_hold.fire_due(now) {
            if self.held.is_empty() {
                // The hold window outlived the last release.
                self.hide.start(now, self.timings.show);
                self.phase = DisplayPhase::PendingHide;
            } else {
                // Keys are still down: show the live remainder of the chord.
                self.label = format_chord(&self.held);
                self.phase = DisplayPhase::Active;
            }
        }

        if self.hide.fire_due(now) {
            self.fade_started = Some(now);
            self.fade_duration = self.timings.fade;
            self.phase = DisplayPhase::FadingOut;
        }

        if self.phase == DisplayPhase::FadingOut {
            let done = match self.fade_started {
                Some(started) => now >= started + self.fade_duration,
                None => true,
            };
            if done {
                self.fade_started = None;
                self.label.clear();
                self.phase = DisplayPhase::Idle;
            }
        }
    }

    /// Opacity target for the rendering surface: 1 while anything is shown,
    /// 0 when idle, and a quadratic ease-out from 1 to 0 while fading.
    pub fn opacity(&self, now: Instant) -> f32 {
        match self.phase {
            DisplayPhase::Idle => 0.0,
            DisplayPhase::FadingOut => match self.fade_started {
                Some(started) if !self.fade_duration.is_zero() => {
                    let elapsed = now.saturating_duration_since(started);
                    let t = (elapsed.as_secs_f32() / self.fade_duration.as_secs_f32())
                        .clamp(0.0, 1.0);
                    (1.0 - t) * (1.0 - t)
                }
                _ => 0.0,
            },
            _ => 1.0,
        }
    }

    /// The next instant at which `tick` has work to do, if any. During a fade
    /// the caller should repaint continuously instead.
    pub fn next_deadline(&self) -> Option<Instant> {
        let fade_end = self.fade_started.map(|s| s + self.fade_duration);
        [self.hide.deadline(), self.chord_hold.deadline(), fade_end]
            .into_iter()
            .flatten()
            .min()
    }
}

impl Default for KeyDisplay {
    fn default() -> Self {
        Self::new(KeyDisplayTimings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn timings(show_ms: u64, fade_ms: u64, hold_ms: u64) -> KeyDisplayTimings {
        KeyDisplayTimings {
            show: Duration::from_millis(show_ms),
            fade: Duration::from_millis(fade_ms),
            chord_hold: Duration::from_millis(hold_ms),
        }
    }

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn repeat_down_is_a_no_op() {
        let base = Instant::now();
        let mut display = KeyDisplay::new(timings(1000, 500, 300));

        display.on_key_down(KeyId::KeyA, base);
        let label = display.label().to_string();
        display.on_key_down(KeyId::KeyA, at(base, 10));

        assert_eq!(display.label(), label);
        assert_eq!(display.phase(), DisplayPhase::Active);
        assert_eq!(display.held_count(), 1);
    }

    #[test]
    fn duplicate_up_is_a_no_op() {
        let base = Instant::now();
        let mut display = KeyDisplay::new(timings(1000, 500, 300));

        display.on_key_down(KeyId::KeyA, base);
        display.on_key_up(KeyId::KeyA, at(base, 10));
        assert_eq!(display.phase(), DisplayPhase::PendingHide);

        // Second up (other source) must not restart the hide timer or
        // otherwise change state.
        let deadline = display.next_deadline();
        display.on_key_up(KeyId::KeyA, at(base, 500));
        assert_eq!(display.next_deadline(), deadline);
        assert_eq!(display.phase(), DisplayPhase::PendingHide);
    }

    #[test]
    fn chord_shrink_freezes_the_rendered_label() {
        let base = Instant::now();
        let mut display = KeyDisplay::new(timings(1000, 500, 300));

        display.on_key_down(KeyId::LCtrl, base);
        display.on_key_down(KeyId::KeyA, at(base, 10));
        assert_eq!(display.label(), "Ctrl+A");

        display.on_key_up(KeyId::KeyA, at(base, 20));
        assert_eq!(display.phase(), DisplayPhase::Frozen);
        assert_eq!(display.label(), "Ctrl+A");

        // Still frozen until the hold window elapses.
        display.tick(at(base, 200));
        assert_eq!(display.label(), "Ctrl+A");

        // Hold expired with Ctrl still down: label becomes the live chord.
        display.tick(at(base, 330));
        assert_eq!(display.phase(), DisplayPhase::Active);
        assert_eq!(display.label(), "Ctrl");
    }

    #[test]
    fn key_down_unfreezes_and_shows_live_chord() {
        let base = Instant::now();
        let mut display = KeyDisplay::new(timings(1000, 500, 300));

        display.on_key_down(KeyId::LCtrl, base);
        display.on_key_down(KeyId::KeyA, at(base, 10));
        display.on_key_up(KeyId::KeyA, at(base, 20));
        assert_eq!(display.phase(), DisplayPhase::Frozen);

        display.on_key_down(KeyId::KeyB, at(base, 50));
        assert_eq!(display.phase(), DisplayPhase::Active);
        assert_eq!(display.label(), "Ctrl+B");

        // The superseded hold deadline must never fire.
        display.tick(at(base, 400));
        assert_eq!(display.phase(), DisplayPhase::Active);
        assert_eq!(display.label(), "Ctrl+B");
    }

    #[test]
    fn press_after_full_release_of_frozen_chord_shows_live_label() {
        let base = Instant::now();
        let mut display = KeyDisplay::new(timings(1000, 500, 300));

        display.on_key_down(KeyId::LCtrl, base);
        display.on_key_down(KeyId::KeyA, at(base, 10));
        display.on_key_up(KeyId::KeyA, at(base, 20));
        assert_eq!(display.phase(), DisplayPhase::Frozen);

        // Full release during the hold window hands off to the hide timer
        // with the frozen label still showing.
        display.on_key_up(KeyId::LCtrl, at(base, 30));
        assert_eq!(display.phase(), DisplayPhase::PendingHide);
        assert_eq!(display.label(), "Ctrl+A");

        display.on_key_down(KeyId::KeyB, at(base, 40));
        assert_eq!(display.phase(), DisplayPhase::Active);
        assert_eq!(display.label(), "B");

        // Neither the abandoned hold deadline nor the abandoned hide
        // deadline has any effect once they are passed.
        display.tick(at(base, 400));
        display.tick(at(base, 1100));
        assert_eq!(display.phase(), DisplayPhase::Active);
        assert_eq!(display.label(), "B");
        assert_eq!(display.opacity(at(base, 1100)), 1.0);
    }

    #[test]
    fn fade_reaches_zero_exactly_at_its_configured_duration() {
        let base = Instant::now();
        let mut display = KeyDisplay::new(timings(100, 500, 300));

        display.on_key_down(KeyId::KeyA, base);
        display.on_key_up(KeyId::KeyA, at(base, 10));
        display.tick(at(base, 110));
        assert_eq!(display.phase(), DisplayPhase::FadingOut);

        // Just short of the boundary the label is still faintly visible.
        display.tick(at(base, 609));
        assert_eq!(display.phase(), DisplayPhase::FadingOut);
        assert!(display.opacity(at(base, 609)) > 0.0);

        // At exactly fade-start plus the fade duration the display is idle.
        display.tick(at(base, 610));
        assert_eq!(display.phase(), DisplayPhase::Idle);
        assert_eq!(display.opacity(at(base, 610)), 0.0);
        assert_eq!(display.label(), "");
    }

    #[test]
    fn releases_while_frozen_update_the_set_but_not_the_label() {
        let base = Instant::now();
        let mut display = KeyDisplay::new(timings(1000, 500, 300));

        display.on_key_down(KeyId::LCtrl, base);
        display.on_key_down(KeyId::LShift, at(base, 5));
        display.on_key_down(KeyId::KeyA, at(base, 10));
        assert_eq!(display.label(), "Ctrl+Shift+A");

        display.on_key_up(KeyId::KeyA, at(base, 20));
        display.on_key_up(KeyId::LShift, at(base, 30));
        assert_eq!(display.label(), "Ctrl+Shift+A");
        assert_eq!(display.held_count(), 1);

        display.tick(at(base, 330));
        assert_eq!(display.label(), "Ctrl");
    }

    #[test]
    fn releasing_everything_arms_hide_then_fade_then_idle() {
        let base = Instant::now();
        let mut display = KeyDisplay::new(timings(1000, 500, 300));

        display.on_key_down(KeyId::KeyA, base);
        display.on_key_up(KeyId::KeyA, at(base, 10));
        assert_eq!(display.phase(), DisplayPhase::PendingHide);
        assert_eq!(display.opacity(at(base, 10)), 1.0);

        // Show window still open.
        display.tick(at(base, 900));
        assert_eq!(display.phase(), DisplayPhase::PendingHide);

        // Hide fires, fade begins.
        display.tick(at(base, 1011));
        assert_eq!(display.phase(), DisplayPhase::FadingOut);
        let mid = display.opacity(at(base, 1261));
        assert!(mid > 0.0 && mid < 1.0, "mid-fade opacity was {mid}");

        // Fade completes.
        display.tick(at(base, 1600));
        assert_eq!(display.phase(), DisplayPhase::Idle);
        assert_eq!(display.label(), "");
        assert_eq!(display.opacity(at(base, 1600)), 0.0);
    }

    #[test]
    fn key_down_during_fade_cancels_it() {
        let base = Instant::now();
        let mut display = KeyDisplay::new(timings(100, 500, 300));

        display.on_key_down(KeyId::KeyA, base);
        display.on_key_up(KeyId::KeyA, at(base, 10));
        display.tick(at(base, 150));
        assert_eq!(display.phase(), DisplayPhase::FadingOut);

        display.on_key_down(KeyId::KeyB, at(base, 200));
        assert_eq!(display.phase(), DisplayPhase::Active);
        assert_eq!(display.opacity(at(base, 200)), 1.0);
        assert_eq!(display.label(), "B");

        // Neither the old fade nor the old hide deadline does anything.
        display.tick(at(base, 700));
        assert_eq!(display.phase(), DisplayPhase::Active);
        assert_eq!(display.opacity(at(base, 700)), 1.0);
    }

    #[test]
    fn zero_durations_collapse_to_idle_on_next_tick() {
        let base = Instant::now();
        let mut display = KeyDisplay::new(timings(0, 0, 0));

        for order in [
            [KeyId::LCtrl, KeyId::LShift, KeyId::KeyA],
            [KeyId::KeyA, KeyId::LCtrl, KeyId::LShift],
        ] {
            for key in order.iter().copied() {
                display.on_key_down(key, base);
            }
            for key in order.iter().rev() {
                display.on_key_up(*key, base);
            }
            display.tick(base);
            display.tick(base);
            assert_eq!(display.phase(), DisplayPhase::Idle);
            assert_eq!(display.label(), "");
            assert_eq!(display.held_count(), 0);
        }
    }

    #[test]
    fn rapid_tap_does_not_get_stuck_frozen() {
        let base = Instant::now();
        let mut display = KeyDisplay::new(timings(1000, 500, 300));

        display.on_key_down(KeyId::LCtrl, base);
        display.on_key_down(KeyId::KeyA, at(base, 1));
        display.on_key_up(KeyId::KeyA, at(base, 2));
        display.on_key_up(KeyId::LCtrl, at(base, 3));

        // All keys up before any timer fired: bound for idle, not frozen.
        assert_eq!(display.phase(), DisplayPhase::PendingHide);
        display.tick(at(base, 1005));
        assert_eq!(display.phase(), DisplayPhase::FadingOut);
        display.tick(at(base, 1600));
        assert_eq!(display.phase(), DisplayPhase::Idle);
    }

    #[test]
    fn timing_updates_apply_on_next_timer_start() {
        let base = Instant::now();
        let mut display = KeyDisplay::new(timings(1000, 500, 300));

        display.on_key_down(KeyId::KeyA, base);
        display.on_key_up(KeyId::KeyA, at(base, 0));

        // Shorter show window configured while the hide timer is running:
        // the in-flight timer keeps its original deadline.
        display.set_timings(timings(100, 500, 300));
        display.tick(at(base, 500));
        assert_eq!(display.phase(), DisplayPhase::PendingHide);

        // Next arm uses the new value.
        display.on_key_down(KeyId::KeyA, at(base, 600));
        display.on_key_up(KeyId::KeyA, at(base, 610));
        display.tick(at(base, 711));
        assert_eq!(display.phase(), DisplayPhase::FadingOut);
    }

    #[test]
    fn interleaved_sources_never_double_count() {
        let base = Instant::now();
        let mut display = KeyDisplay::new(timings(1000, 500, 300));

        // Same physical press observed by hook and focused window.
        display.on_key_down(KeyId::KeyA, base);
        display.on_key_down(KeyId::KeyA, at(base, 1));
        assert_eq!(display.held_count(), 1);

        // Both sources report the release.
        display.on_key_up(KeyId::KeyA, at(base, 2));
        display.on_key_up(KeyId::KeyA, at(base, 3));
        assert_eq!(display.held_count(), 0);

        // And a second interleaving of down/up pairs.
        display.on_key_down(KeyId::KeyA, at(base, 4));
        display.on_key_up(KeyId::KeyA, at(base, 5));
        display.on_key_down(KeyId::KeyA, at(base, 6));
        display.on_key_up(KeyId::KeyA, at(base, 7));
        assert_eq!(display.held_count(), 0);
    }
}
