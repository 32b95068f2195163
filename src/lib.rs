pub mod audio;
pub mod engine;
pub mod error;
pub mod events;
pub mod midi;
pub mod session;
pub mod settings;
pub mod timing;
pub mod transform;
pub mod ui;

pub use engine::SynthEngine;
pub use error::{AudioError, MidiError, PlaybackError, SessionError, SettingsError, TransformError};
pub use midi::MidiDocument;
pub use session::{Session, SessionDriver, SourceFile, Status};
pub use settings::Settings;
pub use timing::{PlaybackHandle, PlaybackScheduler};
pub use transform::{HttpTransformService, TransformService};
pub use ui::MidiaApp;
