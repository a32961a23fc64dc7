//! Signup, login and account handlers

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Extension;
use axum::Form;
use axum::Json;
use rand::Rng;
use tracing::info;
use tracing::warn;

use super::db;
use super::ok_message;
use super::AppState;
use crate::api::error::ApiError;
use crate::api::error::ApiResult;
use crate::api::password::hash_password;
use crate::api::password::verify_password;
use crate::api::session::UserSession;
use crate::api::types::LoginForm;
use crate::api::types::PhoneForm;
use crate::api::types::ProfileForm;
use crate::api::types::ResetPasswordForm;
use crate::api::types::SignUpForm;
use crate::api::types::TokenForm;
use crate::models::InitiateSignUpResponse;
use crate::models::Role;
use crate::models::User;
use crate::validate;

/// Four-digit one-time code
fn new_code() -> String {
    rand::thread_rng().gen_range(1000..=9999).to_string()
}

/// Digit sum and product of (digit + 1), enough for the app to pre-check an entered code
#[must_use]
pub fn otp_challenge(code: &str) -> InitiateSignUpResponse {
    code.chars()
        .filter_map(|c| c.to_digit(10))
        .fold(InitiateSignUpResponse { sum: 0, product: 1 }, |acc, d| {
            InitiateSignUpResponse {
                sum: acc.sum + d,
                product: acc.product * (d + 1),
            }
        })
}

/// Start a session and answer with the user JSON and its cookie
async fn logged_in(state: &AppState, user: &User, role: Role) -> ApiResult<Response> {
    let session = state
        .sessions
        .create_session(user.id, &user.phone, role)
        .await
        .map_err(|e| ApiError::internal("Failed to create session").caused_by(&e))?;
    Ok((
        [(header::SET_COOKIE, state.sessions.cookie(&session.session_id))],
        Json(user),
    )
        .into_response())
}

/// Send an OTP to a new or still unverified phone (POST /initiateSignUp)
pub async fn initiate_signup(
    State(state): State<AppState>,
    Form(form): Form<PhoneForm>,
) -> ApiResult<Json<InitiateSignUpResponse>> {
    let phone = validate::initiate_signup(&form.phone)?;

    let code = match state
        .database
        .get_user_by_phone(&phone)
        .await
        .map_err(db("Failed to get user Details"))?
    {
        Some(user) if user.is_verified() => {
            return Err(ApiError::bad_request("User with same phone number exists"));
        }
        Some(user) => user.code.unwrap_or_default(),
        None => {
            let code = new_code();
            state
                .database
                .create_unverified_user(&phone, &code)
                .await
                .map_err(db("Unable to Add user"))?;
            code
        }
    };

    state
        .notifier
        .sms
        .send_otp(&phone, &code)
        .await
        .map_err(|e| ApiError::internal("Failed to send sms").caused_by(&e))?;

    Ok(Json(otp_challenge(&code)))
}

/// Complete signup with the OTP (POST /signup)
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignUpForm>,
) -> ApiResult<Response> {
    let fields = validate::signup(&form.phone, &form.code, &form.name, &form.password)?;

    let user = state
        .database
        .get_user_by_phone(&fields.phone)
        .await
        .map_err(db("Failed to get user Details"))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    if user.is_verified() {
        return Err(ApiError::bad_request("User already verified"));
    }
    if user.code.as_deref() != Some(fields.code.as_str()) {
        return Err(ApiError::bad_request("Invalid OTP"));
    }

    let hash = hash_password(&fields.password)
        .map_err(|e| ApiError::internal("Error processing the password").caused_by(&e))?;
    let user = state
        .database
        .verify_user(&fields.phone, &fields.name, &hash)
        .await
        .map_err(db("Unable to Add User"))?;

    info!("✅ User {} signed up", user.id);
    logged_in(&state, &user, Role::User).await
}

/// Password login (POST /login)
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    let (phone, password) = validate::login(&form.phone, &form.password)?;

    let user = state
        .database
        .get_user_by_phone(&phone)
        .await
        .map_err(db("Failed to get user Details"))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    if !user.is_verified() {
        return Err(ApiError::unauthorized("User not verified"));
    }

    let stored = user.password.as_deref().unwrap_or_default();
    let matches = verify_password(&password, stored)
        .map_err(|e| ApiError::internal("Password Check failed").caused_by(&e))?;
    if !matches {
        return Err(ApiError::unauthorized("Wrong Password"));
    }

    let role = state
        .database
        .get_user_role(user.id)
        .await
        .map_err(db("Failed to get user Details"))?;
    logged_in(&state, &user, role).await
}

/// Drop the session and expire the cookie (GET /logout)
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
) -> ApiResult<Response> {
    state
        .sessions
        .delete_session(&session.session_id)
        .await
        .map_err(|e| ApiError::internal("Failed to end session").caused_by(&e))?;
    Ok((
        [(header::SET_COOKIE, state.sessions.expired_cookie())],
        ok_message("SuccessFully Logged Out"),
    )
        .into_response())
}

/// Text a password reset code (POST /forgotPassword)
pub async fn forgot_password(
    State(state): State<AppState>,
    Form(form): Form<PhoneForm>,
) -> ApiResult<impl IntoResponse> {
    let phone = validate::phone(&form.phone)?;
    let user = state
        .database
        .get_user_by_phone(&phone)
        .await
        .map_err(db("Failed to get user Details"))?
        .ok_or_else(|| ApiError::not_found(format!("No User Exists for {phone}")))?;
    if !user.is_verified() {
        return Err(ApiError::bad_request("User not verified"));
    }

    let code = new_code();
    state
        .database
        .set_reset_token(&phone, &code)
        .await
        .map_err(db("Failed to update password reset token"))?;
    state
        .notifier
        .sms
        .send_reset_otp(&phone, &code)
        .await
        .map_err(|e| ApiError::internal("Failed to send reset code").caused_by(&e))?;

    if let Some(email) = user.email.as_deref().filter(|e| validate::is_valid_email(e)) {
        let name = user.first_name.as_deref().unwrap_or_default();
        if let Err(e) = state.notifier.mail.forgot_password_email(email, name, &code).await {
            warn!("Failed to e-mail reset code to user {}: {}", user.id, e);
        }
    }

    Ok(ok_message("Reset code sent"))
}

/// Set a new password using the texted code (POST /resetPassword)
pub async fn reset_password(
    State(state): State<AppState>,
    Form(form): Form<ResetPasswordForm>,
) -> ApiResult<impl IntoResponse> {
    let phone = validate::phone(&form.phone)?;
    if form.reset_password_token.chars().count() < 4 {
        return Err(ApiError::bad_request("Invalid reset token"));
    }

    let user = state
        .database
        .get_user_by_phone(&phone)
        .await
        .map_err(db("Failed to get user Details"))?
        .ok_or_else(|| ApiError::not_found(format!("No User Exists for {phone}")))?;
    if !user.is_verified() {
        return Err(ApiError::bad_request("User not verified"));
    }
    if user.reset_password_token.as_deref() != Some(form.reset_password_token.as_str()) {
        warn!("Reset token mismatch for user {}", user.id);
        return Err(ApiError::bad_request("Invalid reset token"));
    }

    validate::password(&form.new_password)?;
    if form.new_password != form.new_password_repeat {
        return Err(ApiError::bad_request(
            "New Password Mismatch . Please make sure new password is entered correctly",
        ));
    }

    let hash = hash_password(&form.new_password)
        .map_err(|e| ApiError::internal("Error processing the password").caused_by(&e))?;
    state
        .database
        .reset_password(&phone, &hash)
        .await
        .map_err(db("Failed to reset password"))?;

    Ok(ok_message("Password SuccessFully updated!"))
}

/// POST /editprofile
pub async fn edit_profile(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Form(form): Form<ProfileForm>,
) -> ApiResult<impl IntoResponse> {
    if form.first_name.is_empty() {
        return Err(ApiError::bad_request("Name cannot be empty"));
    }
    state
        .database
        .update_profile(session.user_id, &form.first_name, &form.last_name, &form.gender)
        .await
        .map_err(db("Failed to update profile"))?;
    Ok(ok_message("Updated SuccessFully!"))
}

/// Store the device's push token (POST /fbtoken)
pub async fn update_push_token(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Form(form): Form<TokenForm>,
) -> ApiResult<impl IntoResponse> {
    if form.token.is_empty() {
        return Err(ApiError::bad_request("Token cannot be empty"));
    }
    state
        .database
        .update_push_token(session.user_id, &form.token)
        .await
        .map_err(db("Failed to update the instance token"))?;
    Ok(ok_message("Token Updated SuccessFully!"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_challenge() {
        let challenge = otp_challenge("1234");
        assert_eq!(challenge.sum, 10);
        assert_eq!(challenge.product, 2 * 3 * 4 * 5);

        let challenge = otp_challenge("9000");
        assert_eq!(challenge.sum, 9);
        assert_eq!(challenge.product, 10);
    }

    #[test]
    fn test_new_code_is_four_digits() {
        for _ in 0..100 {
            let code = new_code();
            assert_eq!(code.len(), 4);
            let n: u32 = code.parse().unwrap();
            assert!((1000..=9999).contains(&n));
        }
    }
}
