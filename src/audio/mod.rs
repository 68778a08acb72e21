//! Audio output for the end-of-timer alert

mod alert;

pub use alert::{frequency_at, gain_at, synthesize, AlertPlayer, ALERT_DURATION};
