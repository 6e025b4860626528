//! Wire records for `/api/beta-signup` and `/api/beta-verify`

use serde::{Deserialize, Serialize};

use super::Tier;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub plan: Tier,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub plan: Option<Tier>,
    #[serde(default)]
    pub already_registered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VerifyResponse {
    pub plan: Tier,
}
