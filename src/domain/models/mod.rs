pub mod auth;
pub mod category;
pub mod event;
pub mod registration;
pub mod report;
pub mod user;
