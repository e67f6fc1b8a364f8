//! Audio buffer and WAV I/O
//!
//! This module provides the decoded audio representation and file I/O.

mod buffer;
mod io;

pub use buffer::AudioBuffer;
pub use io::{load_wav, write_pcm16_wav};
