use chrono::{Local, NaiveDateTime};

/// Source of the current local wall-clock time.
///
/// Callers read it once per request and thread the value through every core
/// call so that all of them agree on "today".
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
