use chrono::{Local, NaiveDateTime};

/// Current local wall-clock time.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
