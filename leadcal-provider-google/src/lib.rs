//! leadcal-provider-google - Google Calendar provider for leadcal
//!
//! Implements `leadcal_core::remote::CalendarProvider` on top of the
//! `google-calendar` client. Tokens come from the CRM's OAuth flow and are
//! read from the `[google]` config section.

mod convert;
mod provider;

pub use convert::{FromGoogle, ToGoogle};
pub use provider::GoogleProvider;
