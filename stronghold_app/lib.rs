pub mod app;
pub mod clock;
pub mod command_handlers;
pub mod config;
pub mod construction;
pub mod cqrs;
pub mod locks;
pub mod queries_handlers;
pub mod repository;
pub mod sweeper;
pub mod uow;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
