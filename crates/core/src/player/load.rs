use crate::{
    Clock, DecodedScore, FetchedScore, PlaybackState, Result, ScoreDecoder,
};

use super::Player;

/// Identifies one load attempt. Only the most recently issued, unresolved
/// ticket may complete or fail a load; older tickets are superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl<C: Clock> Player<C> {
    /// Enters `Loading` and returns the ticket the eventual
    /// [`complete_load`](Self::complete_load) or [`fail_load`](Self::fail_load)
    /// must present. Any load already in flight is superseded.
    ///
    /// Transport commands issued while loading see `is_loaded() == false`. A
    /// previously loaded score stays resident so a failed reload can fall
    /// back to it.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.next_ticket += 1;
        let ticket = LoadTicket(self.next_ticket);
        if let Some(previous) = self.pending.replace(ticket) {
            tracing::debug!(superseded = previous.raw(), ticket = ticket.raw(), "load superseded");
        }

        self.release_clock();
        self.loaded = false;
        self.set_state(PlaybackState::Loading);
        ticket
    }

    /// Installs a decoded score for `ticket`. Returns `false` without touching
    /// the session when the ticket is stale.
    pub fn complete_load(&mut self, ticket: LoadTicket, score: DecodedScore) -> bool {
        if !self.accepts(ticket) {
            tracing::debug!(ticket = ticket.raw(), "ignoring stale load completion");
            return false;
        }
        self.pending = None;

        self.tracks.replace(score.tracks);
        self.session.populate(score.metadata, score.duration_seconds);
        self.resident = true;
        self.loaded = true;
        self.move_cursor(0.0);

        tracing::info!(
            title = %self.session.metadata().title,
            tracks = self.tracks.count(),
            duration = self.session.duration(),
            "score loaded"
        );

        // Completion always reports `Stopped`, even if a stop arrived while
        // the load was in flight.
        self.state = PlaybackState::Stopped;
        self.events.state_changed(PlaybackState::Stopped);
        self.events.loaded();
        true
    }

    /// Fails the load identified by `ticket`. The player enters `Error` and
    /// reports `reason`; a score loaded before this attempt stays playable.
    /// Returns `false` when the ticket is stale.
    pub fn fail_load(&mut self, ticket: LoadTicket, reason: &str) -> bool {
        if !self.accepts(ticket) {
            tracing::debug!(ticket = ticket.raw(), reason, "ignoring stale load failure");
            return false;
        }
        self.pending = None;

        tracing::warn!(reason, kept_previous = self.resident, "score load failed");
        self.loaded = self.resident;
        self.set_state(PlaybackState::Error);
        self.events.error(reason);
        true
    }

    /// Starts loading a remote score. The host fetches `url` out of band and
    /// hands the result to [`deliver_fetch`](Self::deliver_fetch).
    pub fn load_from_url(&mut self, url: &str) -> LoadTicket {
        let ticket = self.begin_load();
        tracing::debug!(url, ticket = ticket.raw(), "waiting for score fetch");
        ticket
    }

    /// Resolves a fetch started by [`load_from_url`](Self::load_from_url):
    /// decodes the bytes and completes the load, or fails it with the fetch or
    /// decode error. Stale tickets are dropped before decoding. Returns
    /// whether a score was installed.
    pub fn deliver_fetch(
        &mut self,
        ticket: LoadTicket,
        fetched: Result<FetchedScore>,
        decoder: &impl ScoreDecoder,
    ) -> bool {
        if !self.accepts(ticket) {
            tracing::debug!(ticket = ticket.raw(), "ignoring stale fetch result");
            return false;
        }

        match fetched.and_then(|score| decoder.decode(&score.bytes, &score.filename)) {
            Ok(score) => self.complete_load(ticket, score),
            Err(err) => {
                self.fail_load(ticket, &err.to_string());
                false
            }
        }
    }

    /// Loads a score already in memory. Returns whether it decoded.
    pub fn load_from_buffer(
        &mut self,
        bytes: &[u8],
        filename: &str,
        decoder: &impl ScoreDecoder,
    ) -> bool {
        let ticket = self.begin_load();
        match decoder.decode(bytes, filename) {
            Ok(score) => self.complete_load(ticket, score),
            Err(err) => {
                self.fail_load(ticket, &err.to_string());
                false
            }
        }
    }

    /// Stops playback and forgets the loaded score. Cancels any load in
    /// flight. Tempo, volume and loop settings are kept.
    pub fn unload(&mut self) {
        if let Some(ticket) = self.pending.take() {
            tracing::debug!(ticket = ticket.raw(), "pending load cancelled by unload");
        }

        self.stop();
        self.tracks.clear();
        self.session.reset();
        self.resident = false;
        self.loaded = false;
        tracing::info!("score unloaded");
    }

    /// Ticket of the load currently in flight, if any.
    pub fn pending_load(&self) -> Option<LoadTicket> {
        self.pending
    }

    fn accepts(&self, ticket: LoadTicket) -> bool {
        self.pending == Some(ticket)
    }
}
