pub mod calculator;
pub mod refresh;

use std::sync::{Arc, RwLock};

use crate::models::Schedule;

pub use calculator::{compute, DayMinute, TimelineView};
pub use refresh::{RefreshLoop, RefreshTick};

/// The currently loaded schedule, shared between the dashboard and its refresh loop.
pub type SharedSchedule = Arc<RwLock<Option<Schedule>>>;
