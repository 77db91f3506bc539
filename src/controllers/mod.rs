pub mod home_controller;
pub mod alerts_controller;
