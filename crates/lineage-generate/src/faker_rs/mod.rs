//! Plausible names, places and job titles backed by the `fake` crate.

pub mod adapter;
pub mod locales;
mod names;

pub use adapter::{FakeRsAdapter, FakerCategory, FakerSource};
pub use locales::LocaleKey;
