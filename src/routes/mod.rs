mod health;
mod waitlist;

pub use health::health_check;
pub use waitlist::{WaitlistError, join_waitlist};
