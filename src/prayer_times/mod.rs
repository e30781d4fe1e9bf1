pub mod cache;
pub mod client;
pub mod fetcher;

pub use cache::CachedSource;
pub use client::{AladhanClient, Fetched, Origin, ScheduleSource};
pub use fetcher::{FetchOutcome, ScheduleFetcher};
