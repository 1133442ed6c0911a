pub mod auth;
pub mod exercises;
pub mod health;
pub mod routines;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
