mod from_google;
mod to_google;

pub(crate) use from_google::is_cancelled;
pub use from_google::FromGoogle;
pub use to_google::ToGoogle;
