//! Corpus handling: loading, delimiter splitting, and sub-range selection.
//!
//! The helpers in this module provide the three steps that turn a corpus
//! file into the sections handed to indexing:
//!
//! * [`source`] reads the corpus file into memory.
//! * [`sections`] splits the text on a literal delimiter, verbatim.
//! * [`window`] selects a contiguous, clamped sub-range of sections.

pub mod sections;
pub mod source;
pub mod window;

pub use sections::split_sections;
pub use source::read_corpus;
pub use window::SelectionWindow;
