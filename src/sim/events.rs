//! Discrete input events
//!
//! `EventDispatcher` keeps listeners per event kind and calls them
//! synchronously in registration order. Every emitted event is also queued
//! so the single owner of the mood state can drain and apply it after the
//! detectors ran.
//!
//! Detectors never read a clock themselves; callers pass `now` in seconds.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::settings::EventConfig;

/// Listener registry key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    Click,
    FocusGained,
    FocusLost,
    TypingBurst,
    IdleTimeout,
    LearningMoment,
    Custom,
}

/// An event with its payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Click,
    FocusGained,
    FocusLost,
    TypingBurst { keystroke_count: usize },
    /// Idle seconds at the moment a threshold was crossed
    IdleTimeout { duration: f64 },
    /// Seconds the learning mode should last
    LearningMoment { duration: f64 },
    Custom { name: String },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Click => EventKind::Click,
            Event::FocusGained => EventKind::FocusGained,
            Event::FocusLost => EventKind::FocusLost,
            Event::TypingBurst { .. } => EventKind::TypingBurst,
            Event::IdleTimeout { .. } => EventKind::IdleTimeout,
            Event::LearningMoment { .. } => EventKind::LearningMoment,
            Event::Custom { .. } => EventKind::Custom,
        }
    }
}

/// An event plus the time it was emitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampedEvent {
    pub event: Event,
    pub timestamp: f64,
}

/// Handle returned by `add_listener`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&StampedEvent)>;

/// Listener registry and event queue
#[derive(Default)]
pub struct EventDispatcher {
    listeners: HashMap<EventKind, Vec<(ListenerId, Listener)>>,
    next_id: u64,
    queue: Vec<StampedEvent>,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listener_count())
            .field("queued", &self.queue.len())
            .finish()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener<F>(&mut self, kind: EventKind, callback: F) -> ListenerId
    where
        F: FnMut(&StampedEvent) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.entry(kind).or_default().push((id, Box::new(callback)));
        id
    }

    /// Returns false if the listener was not registered
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        for listeners in self.listeners.values_mut() {
            let before = listeners.len();
            listeners.retain(|(lid, _)| *lid != id);
            if listeners.len() != before {
                return true;
            }
        }
        false
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    /// Invoke every listener for the event's kind, in registration order,
    /// then queue the event
    pub fn emit(&mut self, event: Event, now: f64) {
        log::debug!("Event {:?} at {:.2}s", event, now);
        let stamped = StampedEvent { event, timestamp: now };
        if let Some(listeners) = self.listeners.get_mut(&stamped.event.kind()) {
            for (_, callback) in listeners.iter_mut() {
                callback(&stamped);
            }
        }
        self.queue.push(stamped);
    }

    /// Events emitted since the last drain
    pub fn pending(&self) -> &[StampedEvent] {
        &self.queue
    }

    pub fn drain(&mut self) -> Vec<StampedEvent> {
        std::mem::take(&mut self.queue)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct IdleThreshold {
    seconds: f64,
    /// Already fired during the current idle streak
    fired: bool,
}

/// Fires one idle-timeout per threshold per idle streak
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdleTracker {
    thresholds: Vec<IdleThreshold>,
    last_activity: f64,
}

impl IdleTracker {
    /// Non-positive thresholds are dropped; the rest are sorted and deduped
    pub fn new(thresholds: &[f64], now: f64) -> Self {
        let mut seconds: Vec<f64> = thresholds.iter().copied().filter(|t| *t > 0.0 && t.is_finite()).collect();
        seconds.sort_by(|a, b| a.total_cmp(b));
        seconds.dedup();
        Self {
            thresholds: seconds
                .into_iter()
                .map(|seconds| IdleThreshold { seconds, fired: false })
                .collect(),
            last_activity: now,
        }
    }

    pub fn thresholds(&self) -> Vec<f64> {
        self.thresholds.iter().map(|t| t.seconds).collect()
    }

    /// Reset the idle streak
    pub fn mark_activity(&mut self, now: f64) {
        self.last_activity = now;
        for threshold in &mut self.thresholds {
            threshold.fired = false;
        }
    }

    pub fn idle_duration(&self, now: f64) -> f64 {
        (now - self.last_activity).max(0.0)
    }

    /// Emit an idle-timeout for every newly crossed threshold; returns how many fired
    pub fn update(&mut self, now: f64, dispatcher: &mut EventDispatcher) -> usize {
        let idle = self.idle_duration(now);
        let mut fired = 0;
        for threshold in &mut self.thresholds {
            if idle >= threshold.seconds && !threshold.fired {
                threshold.fired = true;
                dispatcher.emit(Event::IdleTimeout { duration: idle }, now);
                fired += 1;
            }
        }
        fired
    }
}

/// Detects bursts of keystrokes inside a sliding time window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingDetector {
    pub burst_threshold: usize,
    /// Seconds
    pub burst_window: f64,
    keystrokes: VecDeque<f64>,
}

impl TypingDetector {
    pub fn new(burst_threshold: usize, burst_window: f64) -> Self {
        Self {
            burst_threshold: burst_threshold.max(1),
            burst_window,
            keystrokes: VecDeque::new(),
        }
    }

    /// Keystrokes currently inside the window
    pub fn window_len(&self) -> usize {
        self.keystrokes.len()
    }

    /// Record a keystroke; returns true if it completed a burst
    pub fn on_keystroke(&mut self, now: f64, dispatcher: &mut EventDispatcher) -> bool {
        self.keystrokes.push_back(now);
        while let Some(&oldest) = self.keystrokes.front() {
            if now - oldest > self.burst_window {
                self.keystrokes.pop_front();
            } else {
                break;
            }
        }

        if self.keystrokes.len() >= self.burst_threshold {
            let keystroke_count = self.keystrokes.len();
            // Clear so a held key doesn't fire every stroke
            self.keystrokes.clear();
            dispatcher.emit(Event::TypingBurst { keystroke_count }, now);
            true
        } else {
            false
        }
    }
}

/// Edge-triggered focus tracking
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FocusTracker {
    pub has_focus: bool,
}

impl Default for FocusTracker {
    fn default() -> Self {
        Self { has_focus: true }
    }
}

impl FocusTracker {
    /// Emits only when the focus flag changes; returns true if it did
    pub fn set_focus(&mut self, has_focus: bool, now: f64, dispatcher: &mut EventDispatcher) -> bool {
        if has_focus == self.has_focus {
            return false;
        }
        self.has_focus = has_focus;
        let event = if has_focus { Event::FocusGained } else { Event::FocusLost };
        dispatcher.emit(event, now);
        true
    }
}

/// Dispatcher plus the built-in detectors
#[derive(Debug)]
pub struct EventSystem {
    pub dispatcher: EventDispatcher,
    pub idle: IdleTracker,
    pub typing: TypingDetector,
    pub focus: FocusTracker,
}

impl EventSystem {
    pub fn new(config: &EventConfig, now: f64) -> Self {
        Self {
            dispatcher: EventDispatcher::new(),
            idle: IdleTracker::new(&config.idle_thresholds, now),
            typing: TypingDetector::new(config.typing_burst_threshold, config.typing_burst_window),
            focus: FocusTracker::default(),
        }
    }

    /// Run periodic detectors (call every tick)
    pub fn update(&mut self, now: f64) {
        self.idle.update(now, &mut self.dispatcher);
    }

    pub fn on_click(&mut self, now: f64) {
        self.idle.mark_activity(now);
        self.dispatcher.emit(Event::Click, now);
    }

    pub fn on_keystroke(&mut self, now: f64) {
        self.idle.mark_activity(now);
        self.typing.on_keystroke(now, &mut self.dispatcher);
    }

    pub fn on_focus_change(&mut self, has_focus: bool, now: f64) {
        self.focus.set_focus(has_focus, now, &mut self.dispatcher);
        if has_focus {
            self.idle.mark_activity(now);
        }
    }

    pub fn trigger_learning_moment(&mut self, duration: f64, now: f64) {
        self.idle.mark_activity(now);
        self.dispatcher.emit(Event::LearningMoment { duration }, now);
    }

    pub fn emit_custom(&mut self, name: impl Into<String>, now: f64) {
        self.dispatcher.emit(Event::Custom { name: name.into() }, now);
    }

    pub fn add_listener<F>(&mut self, kind: EventKind, callback: F) -> ListenerId
    where
        F: FnMut(&StampedEvent) + 'static,
    {
        self.dispatcher.add_listener(kind, callback)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.dispatcher.remove_listener(id)
    }

    pub fn drain(&mut self) -> Vec<StampedEvent> {
        self.dispatcher.drain()
    }

    pub fn idle_duration(&self, now: f64) -> f64 {
        self.idle.idle_duration(now)
    }
}
