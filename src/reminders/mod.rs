pub mod dispatcher;
pub mod notifier;
pub mod planner;
pub mod queue;
pub mod scheduler;

pub use dispatcher::{DesktopAlert, DispatchSettings, Dispatcher};
pub use notifier::Notifier;
pub use queue::ReminderQueue;
pub use scheduler::ReminderScheduler;
