//! Idea intake
//!
//! Validates open merge requests before they are listed as ideas.

pub mod format;
mod validator;

pub use validator::*;
