pub mod auth;
pub mod category;
pub mod event;
pub mod health;
pub mod notification;
pub mod registration;
pub mod report;
pub mod user;
