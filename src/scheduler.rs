//! Cooperative clock driving deferred menu work.
//!
//! Three kinds of suspended work exist, all cancellable and all carrying a
//! plain task value that the owner routes back to itself once it is due:
//! timeouts (hover intent), paint frames (deferred attribute sync) and style
//! tweens (opacity transitions). Nothing here runs on its own; the host moves
//! the clock with [`Scheduler::advance`] and drains the queues.

use std::mem;
use std::time::Duration;

use crate::dom::{Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationId(u64);

#[derive(Debug)]
struct Timer<T> {
    id: TimerId,
    due: Duration,
    task: T,
}

#[derive(Debug)]
struct Tween<T> {
    id: AnimationId,
    element: NodeId,
    property: String,
    from: f32,
    to: f32,
    start: Duration,
    duration: Duration,
    on_complete: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer<T>>,
    frames: Vec<T>,
    tweens: Vec<Tween<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            timers: Vec::new(),
            frames: Vec::new(),
            tweens: Vec::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn advance(&mut self, dt: Duration) {
        self.now += dt;
    }

    pub fn set_timeout(&mut self, delay: Duration, task: T) -> TimerId {
        let id = TimerId(self.next_id());
        self.timers.push(Timer {
            id,
            due: self.now + delay,
            task,
        });
        id
    }

    pub fn clear_timeout(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Queue `task` for the next paint frame.
    pub fn request_frame(&mut self, task: T) {
        self.frames.push(task);
    }

    /// Tween a numeric style property. `on_complete` is handed back by
    /// [`Scheduler::step_tweens`] once the tween reaches `to`, including for
    /// a zero duration.
    pub fn animate(
        &mut self,
        element: NodeId,
        property: &str,
        from: f32,
        to: f32,
        duration: Duration,
        on_complete: T,
    ) -> AnimationId {
        let id = AnimationId(self.next_id());
        self.tweens.push(Tween {
            id,
            element,
            property: property.to_string(),
            from,
            to,
            start: self.now,
            duration,
            on_complete,
        });
        id
    }

    pub fn cancel_animation(&mut self, id: AnimationId) -> bool {
        let before = self.tweens.len();
        self.tweens.retain(|t| t.id != id);
        self.tweens.len() != before
    }

    pub fn is_animating(&self, id: AnimationId) -> bool {
        self.tweens.iter().any(|t| t.id == id)
    }

    /// Tasks queued for the frame that starts now. Frames requested while
    /// these run land in the following frame.
    pub fn take_frame(&mut self) -> Vec<T> {
        mem::take(&mut self.frames)
    }

    /// Timers whose due time has passed, earliest first.
    pub fn take_due_timers(&mut self) -> Vec<T> {
        let now = self.now;
        let (mut due, pending): (Vec<_>, Vec<_>) =
            mem::take(&mut self.timers).into_iter().partition(|t| t.due <= now);
        self.timers = pending;
        due.sort_by_key(|t| (t.due, t.id.0));
        due.into_iter().map(|t| t.task).collect()
    }

    /// Write the current value of every tween into `doc` and return the
    /// completion tasks of the ones that finished.
    pub fn step_tweens(&mut self, doc: &mut Document) -> Vec<T> {
        let now = self.now;
        let mut finished = Vec::new();
        for tween in mem::take(&mut self.tweens) {
            let progress = if tween.duration.is_zero() {
                1.0
            } else {
                let elapsed = now.saturating_sub(tween.start).as_secs_f32();
                (elapsed / tween.duration.as_secs_f32()).min(1.0)
            };
            let value = tween.from + (tween.to - tween.from) * progress;
            doc.set_style(tween.element, &tween.property, format_number(value));
            if progress >= 1.0 {
                finished.push(tween.on_complete);
            } else {
                self.tweens.push(tween);
            }
        }
        finished
    }

    pub fn has_pending_work(&self) -> bool {
        !self.timers.is_empty() || !self.frames.is_empty() || !self.tweens.is_empty()
    }
}

fn format_number(value: f32) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    format!("{rounded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn timers_fire_in_due_order_and_can_be_cleared() {
        let mut s: Scheduler<&str> = Scheduler::new();
        s.set_timeout(ms(30), "late");
        s.set_timeout(ms(10), "early");
        let cancelled = s.set_timeout(ms(20), "cancelled");
        assert!(s.clear_timeout(cancelled));
        assert!(!s.clear_timeout(cancelled));

        s.advance(ms(15));
        assert_eq!(s.take_due_timers(), vec!["early"]);
        s.advance(ms(100));
        assert_eq!(s.take_due_timers(), vec!["late"]);
        assert!(!s.has_pending_work());
    }

    #[test]
    fn frames_are_taken_once() {
        let mut s: Scheduler<u8> = Scheduler::new();
        s.request_frame(1);
        s.request_frame(2);
        assert_eq!(s.take_frame(), vec![1, 2]);
        assert!(s.take_frame().is_empty());
    }

    #[test]
    fn tween_interpolates_then_completes() {
        let mut doc = Document::new();
        let el = doc.create_element("ul");
        let mut s: Scheduler<&str> = Scheduler::new();
        s.animate(el, "opacity", 0.0, 1.0, ms(100), "done");

        s.advance(ms(50));
        assert!(s.step_tweens(&mut doc).is_empty());
        assert_eq!(doc.style(el, "opacity"), Some("0.5"));

        s.advance(ms(60));
        assert_eq!(s.step_tweens(&mut doc), vec!["done"]);
        assert_eq!(doc.style(el, "opacity"), Some("1"));
    }

    #[test]
    fn zero_duration_tween_still_completes() {
        let mut doc = Document::new();
        let el = doc.create_element("ul");
        let mut s: Scheduler<&str> = Scheduler::new();
        let id = s.animate(el, "opacity", 1.0, 0.0, Duration::ZERO, "hidden");
        assert!(s.is_animating(id));
        assert_eq!(s.step_tweens(&mut doc), vec!["hidden"]);
        assert_eq!(doc.style(el, "opacity"), Some("0"));
        assert!(!s.is_animating(id));
    }

    #[test]
    fn cancelled_tween_never_reports() {
        let mut doc = Document::new();
        let el = doc.create_element("ul");
        let mut s: Scheduler<&str> = Scheduler::new();
        let id = s.animate(el, "opacity", 0.0, 1.0, ms(10), "never");
        assert!(s.cancel_animation(id));
        s.advance(ms(20));
        assert!(s.step_tweens(&mut doc).is_empty());
    }
}
