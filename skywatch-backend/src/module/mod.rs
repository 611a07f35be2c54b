pub mod climacell;
pub mod formatter;
pub mod jobs;
pub mod notifier;
pub mod query;
pub mod scheduled;
