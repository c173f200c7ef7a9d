use serde::{Deserialize, Serialize};

use crate::models::Priority;

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub username: String,
    pub token: String,
}

// -- Tasks --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddTaskRequest {
    pub text: String,
    pub priority: Priority,
}

// -- Ideas --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddIdeaRequest {
    pub text: String,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "General".to_string()
}

// -- Chat --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AskRequest {
    pub text: String,
}
