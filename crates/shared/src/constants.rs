pub const APP_NAME: &str = "Tandem";

// Limits
pub const MAX_MESSAGE_LENGTH: usize = 4000;
pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_FULL_NAME_LENGTH: usize = 100;
pub const MIN_FULL_NAME_LENGTH: usize = 2;
pub const MIN_PASSWORD_LENGTH: usize = 8;

// Chat
pub const NEAR_BOTTOM_PX: f64 = 100.0;
pub const REPLY_PREVIEW_CHARS: usize = 80;
pub const REPLY_MISSING_PLACEHOLDER: &str = "Original message unavailable";

// Session booking
pub const CONFLICT_WINDOW_BEFORE_HOURS: i64 = 2;
pub const CONFLICT_WINDOW_AFTER_HOURS: i64 = 4;
pub const DEFAULT_SESSION_MINUTES: i64 = 60;
