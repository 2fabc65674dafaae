//! Turning what a snippet printed into text that can be compared with a stored answer.

pub mod address;
pub mod compare;
pub mod go;
pub mod normalise;
pub mod python;
pub mod timed;

pub use compare::{diff, matches, DiffLine, Hunk};
pub use normalise::{normalise, Verbosity};
pub use timed::{build, TimedChunk};
