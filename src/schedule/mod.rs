/// Rule validation, wake computation and the watch loop
pub mod conflict;
pub mod countdown;
pub mod lifecycle;
pub mod manager;
pub mod rtcwake;
pub mod wake_timer;

// Re-export public types and functions
pub use conflict::ConflictValidator;
pub use countdown::{Confirmation, Countdown, confirm};
pub use lifecycle::{Operation, RuleLifecycle};
pub use manager::run_watch;
pub use rtcwake::{RtcwakeArgs, custom_schedule, get_upcoming_on, validate_args};
pub use wake_timer::{Rtcwake, WakeTimer};
