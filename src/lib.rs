//! Presentation timeline engine for a music slideshow.
//!
//! A single epoch drives three schedulers: image cycling with crossfades,
//! the backdrop palette, and a single-shot music session whose end closes
//! the presentation. The crate never reads a clock or touches a device; the
//! caller pumps [`PresentationController`] with monotonic milliseconds and
//! plugs in an [`audio::AudioSink`].

pub mod audio;
pub mod bands;
pub mod config;
pub mod constants;
pub mod controller;
pub mod cycle;
pub mod error;
pub mod palette;
pub mod sparkle;
pub mod state;
pub mod timer;
pub mod volume;

pub use bands::BandTable;
pub use config::PresentationConfig;
pub use controller::{PresentationController, PresentationView, SubmitOutcome};
pub use cycle::CycleState;
pub use error::{AudioLoadError, ConfigError, Error, Result, ValidationError};
pub use palette::{PaletteCatalog, PaletteId};
pub use state::PresentationPhase;
pub use volume::VolumeControl;
