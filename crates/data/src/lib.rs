//! Content pack loading for the Fool's Gambit engine. Owns all file IO the
//! core crate refuses to do, and ships the builtin pack as embedded assets.

pub mod load;

pub use load::*;
