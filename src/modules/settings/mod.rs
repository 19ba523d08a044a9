// Company settings module

pub mod controllers;
pub mod models;
pub mod repositories;

pub use models::{CompanySettings, CompanySettingsInput};
pub use repositories::SettingsRepository;
