// Clients module

pub mod controllers;
pub mod models;
pub mod repositories;

pub use models::{Client, ClientInput};
pub use repositories::ClientRepository;
