//! Calendar aggregation core for leadcal.
//!
//! This crate holds everything the CRM calendar view needs below the UI:
//! - `event` for the unified `CalendarEvent` shape both sources normalize into
//! - `deriver` for synthesizing deadline/demo/follow-up events from leads
//! - `navigation` for the month/week/day cursor that drives the visible window
//! - `aggregator` for fetching, merging and querying local + remote events
//! - `local` and `remote` for the two event sources the aggregator talks to

pub mod aggregator;
pub mod config;
pub mod constants;
pub mod date_range;
pub mod deriver;
pub mod error;
pub mod event;
pub mod integrations;
pub mod lead;
pub mod local;
pub mod navigation;
pub mod remote;

pub use error::{LeadcalError, LeadcalResult};
pub use event::*;
