//! In-process adapter implementations of the application ports.

#![forbid(unsafe_code)]

mod in_memory_request_repository;
mod tracing_notifier;

pub use in_memory_request_repository::InMemoryRequestRepository;
pub use tracing_notifier::TracingNotifier;
