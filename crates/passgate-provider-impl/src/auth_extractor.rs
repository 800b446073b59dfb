use passgate_provider_core::{Headers, header_set};

pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const USER_PROJECT: &str = "X-Goog-User-Project";

pub fn set_bearer(headers: &mut Headers, access_token: &str) {
    header_set(headers, AUTHORIZATION, format!("Bearer {access_token}"));
}

pub fn set_content_type_json(headers: &mut Headers) {
    header_set(headers, CONTENT_TYPE, "application/json");
}

/// Bills the request to `project_id` instead of the credential's own project.
pub fn set_user_project(headers: &mut Headers, project_id: &str) {
    header_set(headers, USER_PROJECT, project_id);
}
