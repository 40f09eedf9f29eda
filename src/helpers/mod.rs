//! Helper functions shared by front-matter parsing and template filters

mod date;

pub use date::*;
