//! Public settings the invitation page needs at load time

use axum::extract::State;
use serde::Serialize;
use shared::error::ApiResponse;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub recaptcha_site_key: String,
    pub recaptcha_action: String,
}

pub async fn site_config(State(state): State<AppState>) -> ApiResponse<SiteConfig> {
    ApiResponse::success(SiteConfig {
        recaptcha_site_key: state.site_key.clone(),
        recaptcha_action: state.recaptcha_action.clone(),
    })
}
