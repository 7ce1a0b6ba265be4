//! Generic structures, not specific to feature models or satisfiability.

pub mod index_heap;
pub mod luby;
pub mod minimal_pcg;
pub mod ring_buffer;
