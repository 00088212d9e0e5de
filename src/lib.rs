//! Generate Gherkin test cases from requirements tickets and reconcile them
//! with the tests already linked in the tracker.
//!
//! The pure core lives in [`text`], [`identity`], [`feature`], [`document`]
//! and [`sync`]. [`tracker`] and [`generate`] hold the collaborators, and
//! [`workflow`] drives a full run through them.

pub mod cli;
pub mod document;
pub mod feature;
pub mod generate;
pub mod identity;
pub mod report;
pub mod sync;
pub mod text;
pub mod trace;
pub mod tracker;
pub mod workflow;
