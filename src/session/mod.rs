//! Upload / process / result lifecycle of one user file.

mod driver;
mod source;
mod state;

pub use driver::SessionDriver;
pub use source::{SourceFile, is_midi_file_name};
pub use state::{Download, Session, Status, Ticket, TransformRequest};
