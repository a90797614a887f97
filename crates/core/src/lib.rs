//! Core library for the Score Player application.
//!
//! The crate is the playback-control layer of a score player. It owns the
//! transport state machine, the time cursor and per-track mixing state, and
//! reports changes through single-observer event channels. Decoding, fetching
//! and the periodic clock are collaborators expressed as traits so hosts can
//! plug in their own.

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod player;
pub mod session;
pub mod source;
pub mod tracks;
pub mod transport;

pub use clock::{Clock, IntervalClock, ManualClock, SubscriptionId};
pub use config::PlayerConfig;
pub use error::{PlayerError, Result};
pub use events::EventNotifier;
pub use player::{LoadTicket, Player};
pub use session::{ScoreMetadata, SessionStore};
pub use source::{DecodedScore, FetchedScore, ManifestDecoder, ScoreDecoder, ScoreFetcher};
pub use tracks::{TrackInfo, TrackRegistry, TrackSpec};
pub use transport::PlaybackState;
