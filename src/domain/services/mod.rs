pub mod auth_service;
pub mod notifications;
pub mod reporting;
