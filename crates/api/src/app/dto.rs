use serde::Serialize;

use userdesk_core::User;

use crate::app::validation::FieldError;

// -------------------------
// Literal messages
// -------------------------

pub const USER_NOT_FOUND: &str = "User could not be found!";
pub const USER_DELETED: &str = "User has been deleted successfully!!";
pub const USERS_DELETED: &str = "Users deleted successfully";
pub const BULK_DELETE_FAILED: &str = "Error deleting transaction numbers";
pub const SIGNUP_REDIRECT: &str = "/verify";
pub const SIGNUP_MESSAGE: &str = "signup successful, please login";

/// Name of the cookie carrying the session token.
pub const AUTH_COOKIE: &str = "jwt";

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub success: bool,
    pub user: User,
    pub redirect: &'static str,
    pub message: &'static str,
}

impl SignupResponse {
    pub fn new(user: User) -> Self {
        Self {
            success: true,
            user,
            redirect: SIGNUP_REDIRECT,
            message: SIGNUP_MESSAGE,
        }
    }
}

/// `{ status, message, result? }` envelope used by login.
#[derive(Debug, Serialize)]
pub struct StatusEnvelope {
    pub status: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl StatusEnvelope {
    pub fn logged_in(token: String) -> Self {
        Self {
            status: "OK!",
            message: "Successfully login",
            result: Some(token),
        }
    }

    pub fn wrong_credentials() -> Self {
        Self {
            status: "Bad Request!",
            message: "Wrong email or Password",
            result: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

// -------------------------
// Header helpers
// -------------------------

/// `Set-Cookie` value for a freshly issued session token.
///
/// HttpOnly keeps the token away from page scripts. Secure and SameSite are
/// left unset.
pub fn auth_cookie(token: &str) -> String {
    format!("{AUTH_COOKIE}={token}; Path=/; HttpOnly")
}
