use std::sync::Arc;
use crate::domain::ports::{
    AuthRepository, CategoryRepository, EventRepository, RegistrationRepository,
    ReportRepository, UserRepository,
};
use crate::domain::services::auth_service::AuthService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub auth_repo: Arc<dyn AuthRepository>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub registration_repo: Arc<dyn RegistrationRepository>,
    pub report_repo: Arc<dyn ReportRepository>,
    pub auth_service: Arc<AuthService>,
}
