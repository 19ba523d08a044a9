pub mod client_controller;
