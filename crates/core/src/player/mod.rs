//! Playback controller: transport state machine, time cursor and mixing
//! state for a single score, driven by caller commands and clock ticks.

mod load;


use crate::{
    transport::{advance, clamp_tempo, clamp_to, clamp_volume, Advance},
    Clock, EventNotifier, PlaybackState, PlayerConfig, ScoreMetadata, SessionStore,
    SubscriptionId, TrackInfo, TrackRegistry,
};

pub use load::LoadTicket;

/// Controller for one score player instance.
///
/// All commands are synchronous and infallible: out-of-range numbers are
/// clamped, unknown track indices are ignored and load failures surface as the
/// [`PlaybackState::Error`] state plus an error event. The player owns at most
/// one clock subscription, held only while [`PlaybackState::Playing`].
#[derive(Debug)]
pub struct Player<C: Clock> {
    config: PlayerConfig,
    clock: C,
    subscription: Option<SubscriptionId>,
    state: PlaybackState,
    current_time: f32,
    tempo: f32,
    volume: f32,
    looping: bool,
    loaded: bool,
    resident: bool,
    tracks: TrackRegistry,
    session: SessionStore,
    events: EventNotifier,
    next_ticket: u64,
    pending: Option<LoadTicket>,
}

impl<C: Clock> Player<C> {
    /// Creates an unloaded, stopped player using the default configuration.
    pub fn new(clock: C) -> Self {
        Self::with_config(PlayerConfig::default(), clock)
    }

    pub fn with_config(config: PlayerConfig, clock: C) -> Self {
        Self {
            tempo: clamp_tempo(config.initial_tempo),
            volume: clamp_volume(config.initial_volume),
            looping: config.initial_loop,
            config,
            clock,
            subscription: None,
            state: PlaybackState::Stopped,
            current_time: 0.0,
            loaded: false,
            resident: false,
            tracks: TrackRegistry::new(),
            session: SessionStore::new(),
            events: EventNotifier::new(),
            next_ticket: 0,
            pending: None,
        }
    }

    // Transport commands.

    /// Starts or resumes playback. Does nothing until a score is loaded or
    /// while already playing. Starting from `Stopped` rewinds to zero.
    pub fn play(&mut self) {
        if !self.loaded {
            tracing::debug!(state = %self.state, "play ignored, no score loaded");
            return;
        }
        if self.state == PlaybackState::Playing {
            return;
        }
        if self.state == PlaybackState::Stopped {
            self.move_cursor(0.0);
        }
        self.start_clock();
        self.set_state(PlaybackState::Playing);
    }

    /// Pauses playback, keeping the cursor. Only meaningful while playing.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.release_clock();
        self.set_state(PlaybackState::Paused);
    }

    /// Stops playback from any state and rewinds to zero.
    pub fn stop(&mut self) {
        self.release_clock();
        self.move_cursor(0.0);
        self.set_state(PlaybackState::Stopped);
    }

    /// Moves the cursor to `seconds`, clamped to the score. Always reports the
    /// resulting time, even when the cursor did not move.
    pub fn seek(&mut self, seconds: f32) {
        self.current_time = clamp_to(seconds, 0.0, self.session.duration());
        self.events.time_updated(self.current_time);
    }

    /// Handles one clock tick. Ignored unless playing.
    pub fn tick(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }

        let delta = if self.config.tempo_scaled_ticks {
            self.config.tick_period().as_secs_f32() * self.tempo
        } else {
            self.config.tick_period().as_secs_f32()
        };

        match advance(self.current_time, delta, self.session.duration(), self.looping) {
            Advance::Within(position) => {
                self.current_time = position;
                self.events.time_updated(position);
            }
            Advance::Wrapped(position) => {
                tracing::debug!(position, "reached end of score, looping");
                self.current_time = position;
                self.events.time_updated(position);
            }
            Advance::Finished => {
                tracing::debug!("reached end of score");
                self.stop();
            }
        }
    }

    /// Handles a tick delivered by a clock subscription. Ticks from any
    /// subscription other than the current one are stale and dropped.
    pub fn tick_from(&mut self, id: SubscriptionId) {
        if self.subscription != Some(id) {
            tracing::debug!(subscription = id.raw(), "dropping stale tick");
            return;
        }
        self.tick();
    }

    // Settings. None of these touch the transport or emit events.

    pub fn set_tempo(&mut self, factor: f32) {
        self.tempo = clamp_tempo(factor);
    }

    pub fn set_volume(&mut self, level: f32) {
        self.volume = clamp_volume(level);
    }

    pub fn set_loop(&mut self, enabled: bool) {
        self.looping = enabled;
    }

    pub fn set_track_muted(&mut self, index: usize, muted: bool) {
        self.tracks.set_muted(index, muted);
    }

    pub fn set_track_volume(&mut self, index: usize, level: f32) {
        self.tracks.set_volume(index, level);
    }

    // Queries.

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn duration(&self) -> f32 {
        self.session.duration()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn tempo(&self) -> f32 {
        self.tempo
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn metadata(&self) -> &ScoreMetadata {
        self.session.metadata()
    }

    pub fn track_count(&self) -> usize {
        self.tracks.count()
    }

    pub fn track(&self, index: usize) -> Option<&TrackInfo> {
        self.tracks.get(index)
    }

    /// Track at `index`, or an empty default when the index is out of range.
    pub fn track_info(&self, index: usize) -> TrackInfo {
        self.tracks.get(index).cloned().unwrap_or_default()
    }

    pub fn tracks(&self) -> &[TrackInfo] {
        self.tracks.as_slice()
    }

    /// Gain a renderer should apply to a track: master volume times track
    /// volume, or silence when the track is muted or unknown.
    pub fn effective_track_gain(&self, index: usize) -> f32 {
        match self.tracks.get(index) {
            Some(track) if !track.muted => self.volume * track.volume,
            _ => 0.0,
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Subscription currently held on the clock, if playing.
    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.subscription
    }

    // Event registration. Each call replaces the previous observer.

    pub fn on_state_changed(&mut self, observer: impl FnMut(PlaybackState) + 'static) {
        self.events.set_on_state_changed(observer);
    }

    pub fn on_time_update(&mut self, observer: impl FnMut(f32) + 'static) {
        self.events.set_on_time_update(observer);
    }

    pub fn on_error(&mut self, observer: impl FnMut(&str) + 'static) {
        self.events.set_on_error(observer);
    }

    pub fn on_loaded(&mut self, observer: impl FnMut() + 'static) {
        self.events.set_on_loaded(observer);
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state == state {
            return;
        }
        tracing::debug!(from = %self.state, to = %state, "transport state changed");
        self.state = state;
        self.events.state_changed(state);
    }

    fn move_cursor(&mut self, seconds: f32) {
        if self.current_time != seconds {
            self.current_time = seconds;
            self.events.time_updated(seconds);
        }
    }

    fn start_clock(&mut self) {
        if self.subscription.is_some() {
            return;
        }
        let id = self.clock.subscribe(self.config.tick_period());
        tracing::debug!(subscription = id.raw(), "clock subscribed");
        self.subscription = Some(id);
    }

    fn release_clock(&mut self) {
        if let Some(id) = self.subscription.take() {
            tracing::debug!(subscription = id.raw(), "clock released");
            self.clock.unsubscribe(id);
        }
    }
}

impl<C: Clock> Drop for Player<C> {
    fn drop(&mut self) {
        self.release_clock();
    }
}
