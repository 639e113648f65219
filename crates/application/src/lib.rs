//! Application services and ports for the asset request engine.

#![forbid(unsafe_code)]

mod request_ports;
mod request_service;

pub use request_ports::{Notifier, RequestRepository, Severity};
pub use request_service::RequestService;
