pub mod band;
pub mod error;
pub mod state;

pub use band::Band;
pub use error::{NoteError, Result};
pub use state::{round1, Reading, Tick};
