use std::fmt;

use crate::PlaybackState;

pub type StateObserver = Box<dyn FnMut(PlaybackState)>;
pub type TimeObserver = Box<dyn FnMut(f32)>;
pub type ErrorObserver = Box<dyn FnMut(&str)>;
pub type LoadedObserver = Box<dyn FnMut()>;

/// Single-slot observer registry for the four player event channels.
///
/// Registering an observer replaces whatever was in that slot. Dispatch is
/// synchronous on the caller's thread; events on an empty channel are
/// dropped.
#[derive(Default)]
pub struct EventNotifier {
    on_state_changed: Option<StateObserver>,
    on_time_update: Option<TimeObserver>,
    on_error: Option<ErrorObserver>,
    on_loaded: Option<LoadedObserver>,
}

impl EventNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_on_state_changed(&mut self, observer: impl FnMut(PlaybackState) + 'static) {
        self.on_state_changed = Some(Box::new(observer));
    }

    pub fn set_on_time_update(&mut self, observer: impl FnMut(f32) + 'static) {
        self.on_time_update = Some(Box::new(observer));
    }

    pub fn set_on_error(&mut self, observer: impl FnMut(&str) + 'static) {
        self.on_error = Some(Box::new(observer));
    }

    pub fn set_on_loaded(&mut self, observer: impl FnMut() + 'static) {
        self.on_loaded = Some(Box::new(observer));
    }

    pub fn state_changed(&mut self, state: PlaybackState) {
        if let Some(observer) = self.on_state_changed.as_mut() {
            observer(state);
        }
    }

    pub fn time_updated(&mut self, seconds: f32) {
        if let Some(observer) = self.on_time_update.as_mut() {
            observer(seconds);
        }
    }

    pub fn error(&mut self, message: &str) {
        if let Some(observer) = self.on_error.as_mut() {
            observer(message);
        }
    }

    pub fn loaded(&mut self) {
        if let Some(observer) = self.on_loaded.as_mut() {
            observer();
        }
    }
}

impl fmt::Debug for EventNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventNotifier")
            .field("on_state_changed", &self.on_state_changed.is_some())
            .field("on_time_update", &self.on_time_update.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_loaded", &self.on_loaded.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[test]
    fn empty_channels_drop_events() {
        let mut notifier = EventNotifier::new();
        notifier.state_changed(PlaybackState::Playing);
        notifier.time_updated(1.0);
        notifier.error("nobody listening");
        notifier.loaded();
    }

    #[test]
    fn registering_replaces_previous_observer() {
        let first = Rc::new(RefCell::new(Vec::new()));
        let second = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = EventNotifier::new();

        let sink = first.clone();
        notifier.set_on_time_update(move |t| sink.borrow_mut().push(t));
        notifier.time_updated(0.5);

        let sink = second.clone();
        notifier.set_on_time_update(move |t| sink.borrow_mut().push(t));
        notifier.time_updated(1.5);

        assert_eq!(*first.borrow(), vec![0.5]);
        assert_eq!(*second.borrow(), vec![1.5]);
    }

    #[test]
    fn channels_are_independent() {
        let errors = Rc::new(RefCell::new(Vec::<String>::new()));
        let loads = Rc::new(RefCell::new(0));
        let mut notifier = EventNotifier::new();

        let sink = errors.clone();
        notifier.set_on_error(move |message| sink.borrow_mut().push(message.to_string()));
        let counter = loads.clone();
        notifier.set_on_loaded(move || *counter.borrow_mut() += 1);

        notifier.error("bad file");
        notifier.loaded();
        notifier.state_changed(PlaybackState::Error);

        assert_eq!(*errors.borrow(), vec!["bad file".to_string()]);
        assert_eq!(*loads.borrow(), 1);
    }
}
