/// Number of days fetched in each direction when no window is given.
pub const DEFAULT_SYNC_DAYS: i64 = 90;

/// Header carrying the opaque user identifier on every local-store request.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Pipeline stage that produces a demo event.
pub const DEMO_SCHEDULED_STAGE: &str = "demo_scheduled";

/// Pipeline stage that produces a follow-up event.
pub const CONTACT_MADE_STAGE: &str = "contact_made";

/// Length of a derived demo slot, in minutes.
pub const DEMO_DURATION_MINUTES: i64 = 60;

/// Days between first contact and the derived follow-up.
pub const FOLLOW_UP_AFTER_DAYS: i64 = 7;

/// Location used for demos when the lead carries none.
pub const DEFAULT_DEMO_LOCATION: &str = "Online";

/// Cells in the month grid (6 rows of 7 days).
pub const MONTH_GRID_DAYS: i64 = 42;
