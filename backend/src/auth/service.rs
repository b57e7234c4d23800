//! Core business logic for the authentication system.
//!
//! The service composes the identity store, password hasher, OTP service,
//! and token codec into the account lifecycle workflows. A user starts
//! unverified and inactive; the only transition to the verified, active
//! state is a successful registration-purpose OTP verification.

use crate::auth::models::*;
use crate::config::Config;
use crate::database::models::{CreateRefreshToken, CreateUser, OtpChannel, OtpPurpose};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::refresh_token_repository::RefreshTokenRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::otp_service::OtpService;
use crate::utils::jwt::JwtUtils;
use crate::utils::security::PasswordHasher;
use chrono::Utc;
use sqlx::SqlitePool;
use validator::Validate;

/// Authentication service for handling registration, login, OTP
/// verification, and token management
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
    config: &'a Config,
    jwt_utils: JwtUtils,
    otp_service: OtpService<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService instance
    pub fn new(pool: &'a SqlitePool, config: &'a Config) -> Self {
        AuthService {
            pool,
            config,
            jwt_utils: JwtUtils::new(config),
            otp_service: OtpService::new(pool, config),
        }
    }

    /// Register a new user and issue the registration OTP.
    ///
    /// The created user is unverified and inactive until the OTP is
    /// confirmed. The verification email is best-effort; registration
    /// succeeds even if delivery fails.
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<RegisterResponse> {
        validate_request(&request)?;
        validate_password_strength(&request.password, self.config.password_min_length)?;

        let user_repo = UserRepository::new(self.pool);

        // Fast-path existence checks; the unique constraints below remain
        // the source of truth under concurrent registration.
        if user_repo.email_exists(&request.email).await? {
            return Err(ServiceError::already_exists(
                "User with email",
                &request.email,
            ));
        }

        if let Some(ref phone) = request.phone {
            if user_repo.phone_exists(phone).await? {
                return Err(ServiceError::already_exists("User with phone", phone));
            }
        }

        let password_hash = PasswordHasher::hash_password(&request.password)?;

        let user = user_repo
            .create_user(CreateUser {
                email: request.email.clone(),
                phone: request.phone.clone(),
                password_hash,
                full_name: request.full_name,
            })
            .await
            .map_err(|e| {
                let error_msg = e.to_string();
                if error_msg.contains("UNIQUE constraint failed: users.email") {
                    ServiceError::already_exists("User with email", &request.email)
                } else if error_msg.contains("UNIQUE constraint failed: users.phone") {
                    ServiceError::already_exists(
                        "User with phone",
                        request.phone.as_deref().unwrap_or_default(),
                    )
                } else {
                    ServiceError::Database { source: e }
                }
            })?;

        self.otp_service
            .send_otp(&user, OtpChannel::Email, OtpPurpose::Registration)
            .await?;

        Ok(RegisterResponse {
            user: UserInfo::from(user),
            message: "Registration successful. Please verify your account with the code sent to your email.".to_string(),
        })
    }

    /// Authenticate a verified, active user and issue the token pair.
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResponse> {
        validate_request(&request)?;

        let user_repo = UserRepository::new(self.pool);
        let user = user_repo.get_user_by_email(&request.email).await?;

        // One message for both unknown email and wrong password, so a
        // caller cannot probe which accounts exist.
        let user = match user {
            Some(user) if PasswordHasher::verify_password(&request.password, &user.password_hash) => {
                user
            }
            _ => return Err(ServiceError::unauthorized("Incorrect email or password")),
        };

        if !user.is_verified {
            return Err(ServiceError::forbidden("Please verify your account first"));
        }

        if !user.is_active {
            return Err(ServiceError::forbidden("Account is inactive"));
        }

        let access_token = self.jwt_utils.generate_access_token(&user.email, None)?;
        let refresh_token = self.jwt_utils.generate_refresh_token(&user.email)?;

        let refresh_repo = RefreshTokenRepository::new(self.pool);
        refresh_repo
            .create_refresh_token(CreateRefreshToken {
                user_id: user.id,
                token: refresh_token.clone(),
                expires_at: Utc::now() + self.jwt_utils.refresh_ttl(),
            })
            .await?;

        Ok(LoginResponse {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.config.access_token_expire_minutes * 60,
            user: UserInfo::from(user),
        })
    }

    /// Issue a fresh OTP for an existing user.
    ///
    /// Safe to call repeatedly: each call invalidates the previous code
    /// and sends a new delivery.
    pub async fn request_otp(&self, request: OtpRequest) -> ServiceResult<OtpResponse> {
        validate_request(&request)?;

        let user_repo = UserRepository::new(self.pool);
        let user = user_repo
            .get_user_by_email(&request.email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &request.email))?;

        self.otp_service
            .send_otp(&user, request.otp_type, request.purpose)
            .await?;

        Ok(OtpResponse {
            message: format!("OTP sent to {}", user.email),
            otp_type: request.otp_type,
            expires_in: self.config.otp_expire_minutes,
        })
    }

    /// Verify a presented OTP, consuming it on success.
    ///
    /// A registration-purpose verification additionally transitions the
    /// user to the verified, active state.
    pub async fn verify_otp(&self, request: OtpVerifyRequest) -> ServiceResult<VerifyOtpResponse> {
        validate_request(&request)?;

        let user_repo = UserRepository::new(self.pool);
        let mut user = user_repo
            .get_user_by_email(&request.email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &request.email))?;

        let is_valid = self
            .otp_service
            .verify_otp(user.id, &request.otp_code, request.purpose)
            .await?;

        if !is_valid {
            return Err(ServiceError::validation("Invalid or expired OTP"));
        }

        if request.purpose == OtpPurpose::Registration {
            user = user_repo
                .verify_user(&request.email)
                .await?
                .ok_or_else(|| ServiceError::not_found("User", &request.email))?;
        }

        Ok(VerifyOtpResponse {
            message: "OTP verified successfully".to_string(),
            user: UserInfo::from(user),
        })
    }

    /// Mint a new access token from a valid refresh token.
    ///
    /// The refresh token itself is not rotated. A token whose persisted
    /// record has been revoked is rejected even when its signature and
    /// expiry still check out.
    pub async fn refresh_token(
        &self,
        request: RefreshTokenRequest,
    ) -> ServiceResult<RefreshTokenResponse> {
        validate_request(&request)?;

        let claims = self
            .jwt_utils
            .verify_token(&request.refresh_token)
            .filter(|claims| claims.is_refresh())
            .ok_or_else(|| ServiceError::unauthorized("Invalid refresh token"))?;

        let refresh_repo = RefreshTokenRepository::new(self.pool);
        if let Some(record) = refresh_repo.get_by_token(&request.refresh_token).await? {
            if record.is_revoked {
                return Err(ServiceError::unauthorized(
                    "Refresh token has been revoked",
                ));
            }
        }

        let user_repo = UserRepository::new(self.pool);
        let user = user_repo
            .get_user_by_email(claims.subject())
            .await?
            .ok_or_else(|| ServiceError::unauthorized("User not found"))?;

        let access_token = self.jwt_utils.generate_access_token(&user.email, None)?;

        Ok(RefreshTokenResponse {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.config.access_token_expire_minutes * 60,
        })
    }

    /// Reset a password after confirming the reset-purpose OTP.
    ///
    /// Outstanding refresh tokens are revoked so stolen tokens stop
    /// working once the owner resets.
    pub async fn reset_password(
        &self,
        request: ResetPasswordRequest,
    ) -> ServiceResult<MessageResponse> {
        validate_request(&request)?;

        self.verify_otp(OtpVerifyRequest {
            email: request.email.clone(),
            otp_code: request.otp_code,
            purpose: OtpPurpose::ResetPassword,
        })
        .await?;

        let user_repo = UserRepository::new(self.pool);
        let user = user_repo
            .get_user_by_email(&request.email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &request.email))?;

        let password_hash = PasswordHasher::hash_password(&request.new_password)?;
        user_repo
            .update_password_hash(user.id, &password_hash)
            .await?;

        RefreshTokenRepository::new(self.pool)
            .revoke_all_for_user(user.id)
            .await?;

        Ok(MessageResponse {
            message: "Password reset successfully".to_string(),
        })
    }

    /// Revoke the presented refresh token.
    ///
    /// Always succeeds: a token without a backing record simply has
    /// nothing to revoke.
    pub async fn logout(&self, request: LogoutRequest) -> ServiceResult<MessageResponse> {
        validate_request(&request)?;

        RefreshTokenRepository::new(self.pool)
            .revoke(&request.refresh_token)
            .await?;

        Ok(MessageResponse {
            message: "Logged out successfully".to_string(),
        })
    }
}

/// Runs the validator-derived checks and flattens field errors into one
/// validation failure.
fn validate_request<T: Validate>(request: &T) -> ServiceResult<()> {
    if let Err(validation_errors) = request.validate() {
        let error_messages: Vec<String> = validation_errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    format!(
                        "{}: {}",
                        field,
                        error.message.as_ref().unwrap_or(&"Invalid value".into())
                    )
                })
            })
            .collect();
        return Err(ServiceError::validation(error_messages.join(", ")));
    }
    Ok(())
}

/// Password policy: configured minimum length, at least one digit, at
/// least one uppercase letter.
fn validate_password_strength(password: &str, min_length: usize) -> ServiceResult<()> {
    if password.len() < min_length {
        return Err(ServiceError::validation(format!(
            "Password must be at least {min_length} characters"
        )));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ServiceError::validation(
            "Password must contain at least one digit",
        ));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(ServiceError::validation(
            "Password must contain at least one uppercase letter",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::otp_repository::OtpRepository;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    async fn setup_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    fn test_config() -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout_seconds: 3,
            server_port: 3000,
            jwt_secret: "unit-test-secret".to_string(),
            access_token_expire_minutes: 30,
            refresh_token_expire_days: 7,
            otp_expire_minutes: 10,
            otp_code_length: 6,
            password_min_length: 8,
            max_login_attempts: 5,
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            from_email: None,
            from_name: "AuthGate".to_string(),
        }
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "Passw0rd".to_string(),
            full_name: Some("Test User".to_string()),
            phone: None,
        }
    }

    /// Reads the live registration code straight from the store, standing
    /// in for the email the user would have received.
    async fn issued_code(pool: &SqlitePool, user_id: i64, purpose: OtpPurpose) -> String {
        let otp = sqlx::query_as::<_, crate::database::models::Otp>(
            "SELECT * FROM otps WHERE user_id = ? AND purpose = ? AND is_used = 0",
        )
        .bind(user_id)
        .bind(purpose)
        .fetch_one(pool)
        .await
        .unwrap();
        otp.otp_code
    }

    #[tokio::test]
    async fn test_register_creates_unverified_user() {
        let pool = setup_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        let response = service.register(register_request("a@x.com")).await.unwrap();
        assert!(!response.user.is_active);
        assert!(!response.user.is_verified);

        // A registration OTP was issued alongside.
        let code = issued_code(&pool, response.user.id, OtpPurpose::Registration).await;
        assert_eq!(code.len(), 6);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let pool = setup_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        service.register(register_request("a@x.com")).await.unwrap();
        let err = service
            .register(register_request("a@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_register_rejects_weak_passwords() {
        let pool = setup_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        for password in ["short1A", "passw0rd", "PASSWORD"] {
            let err = service
                .register(RegisterRequest {
                    email: "weak@x.com".to_string(),
                    password: password.to_string(),
                    full_name: None,
                    phone: None,
                })
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Validation { .. }), "{password}");
        }
    }

    #[tokio::test]
    async fn test_register_rejects_bad_phone() {
        let pool = setup_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        let err = service
            .register(RegisterRequest {
                email: "p@x.com".to_string(),
                password: "Passw0rd".to_string(),
                full_name: None,
                phone: Some("12-34".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_login_lifecycle_gates() {
        let pool = setup_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        let registered = service.register(register_request("a@x.com")).await.unwrap();

        // Unknown user and wrong password produce the same unauthorized error.
        let unknown = service
            .login(LoginRequest {
                email: "nobody@x.com".to_string(),
                password: "Passw0rd".to_string(),
            })
            .await
            .unwrap_err();
        let wrong = service
            .login(LoginRequest {
                email: "a@x.com".to_string(),
                password: "WrongPassw0rd".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());

        // Correct credentials before verification are forbidden.
        let err = service
            .login(LoginRequest {
                email: "a@x.com".to_string(),
                password: "Passw0rd".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden { .. }));

        // Verify with the issued code, then login succeeds.
        let code = issued_code(&pool, registered.user.id, OtpPurpose::Registration).await;
        let verified = service
            .verify_otp(OtpVerifyRequest {
                email: "a@x.com".to_string(),
                otp_code: code,
                purpose: OtpPurpose::Registration,
            })
            .await
            .unwrap();
        assert!(verified.user.is_active);
        assert!(verified.user.is_verified);

        let login = service
            .login(LoginRequest {
                email: "a@x.com".to_string(),
                password: "Passw0rd".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login.token_type, TOKEN_TYPE_BEARER);
        assert_eq!(login.expires_in, config.access_token_expire_minutes * 60);
        assert!(!login.access_token.is_empty());
        assert!(!login.refresh_token.is_empty());
    }

    #[tokio::test]
    async fn test_verify_otp_with_wrong_code_keeps_user_unverified() {
        let pool = setup_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        let registered = service.register(register_request("a@x.com")).await.unwrap();
        let code = issued_code(&pool, registered.user.id, OtpPurpose::Registration).await;
        // A syntactically valid code that differs from the issued one.
        let wrong_code = if code == "000000" { "000001" } else { "000000" };

        let err = service
            .verify_otp(OtpVerifyRequest {
                email: "a@x.com".to_string(),
                otp_code: wrong_code.to_string(),
                purpose: OtpPurpose::Registration,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));

        let user = UserRepository::new(&pool)
            .get_user_by_email("a@x.com")
            .await
            .unwrap()
            .unwrap();
        assert!(!user.is_verified);
        assert!(!user.is_active);
    }

    #[tokio::test]
    async fn test_request_otp_supersedes_previous_code() {
        let pool = setup_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        let registered = service.register(register_request("a@x.com")).await.unwrap();
        let first = issued_code(&pool, registered.user.id, OtpPurpose::Registration).await;

        service
            .request_otp(OtpRequest {
                email: "a@x.com".to_string(),
                otp_type: OtpChannel::Email,
                purpose: OtpPurpose::Registration,
            })
            .await
            .unwrap();
        let second = issued_code(&pool, registered.user.id, OtpPurpose::Registration).await;

        if first != second {
            let stale = OtpRepository::new(&pool)
                .get_valid_otp(registered.user.id, &first, OtpPurpose::Registration)
                .await
                .unwrap();
            assert!(stale.is_none());
        }
    }

    #[tokio::test]
    async fn test_request_otp_unknown_user_not_found() {
        let pool = setup_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        let err = service
            .request_otp(OtpRequest {
                email: "nobody@x.com".to_string(),
                otp_type: OtpChannel::Email,
                purpose: OtpPurpose::Login,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_tokens_and_accepts_refresh() {
        let pool = setup_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        let registered = service.register(register_request("a@x.com")).await.unwrap();
        let code = issued_code(&pool, registered.user.id, OtpPurpose::Registration).await;
        service
            .verify_otp(OtpVerifyRequest {
                email: "a@x.com".to_string(),
                otp_code: code,
                purpose: OtpPurpose::Registration,
            })
            .await
            .unwrap();
        let login = service
            .login(LoginRequest {
                email: "a@x.com".to_string(),
                password: "Passw0rd".to_string(),
            })
            .await
            .unwrap();

        // An access token must not mint new access tokens.
        let err = service
            .refresh_token(RefreshTokenRequest {
                refresh_token: login.access_token.clone(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized { .. }));

        let refreshed = service
            .refresh_token(RefreshTokenRequest {
                refresh_token: login.refresh_token.clone(),
            })
            .await
            .unwrap();
        assert_eq!(refreshed.token_type, TOKEN_TYPE_BEARER);
        assert!(!refreshed.access_token.is_empty());
    }

    #[tokio::test]
    async fn test_logout_revokes_refresh_token() {
        let pool = setup_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        let registered = service.register(register_request("a@x.com")).await.unwrap();
        let code = issued_code(&pool, registered.user.id, OtpPurpose::Registration).await;
        service
            .verify_otp(OtpVerifyRequest {
                email: "a@x.com".to_string(),
                otp_code: code,
                purpose: OtpPurpose::Registration,
            })
            .await
            .unwrap();
        let login = service
            .login(LoginRequest {
                email: "a@x.com".to_string(),
                password: "Passw0rd".to_string(),
            })
            .await
            .unwrap();

        service
            .logout(LogoutRequest {
                refresh_token: login.refresh_token.clone(),
            })
            .await
            .unwrap();

        let err = service
            .refresh_token(RefreshTokenRequest {
                refresh_token: login.refresh_token,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_reset_password_flow() {
        let pool = setup_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        let registered = service.register(register_request("a@x.com")).await.unwrap();
        let code = issued_code(&pool, registered.user.id, OtpPurpose::Registration).await;
        service
            .verify_otp(OtpVerifyRequest {
                email: "a@x.com".to_string(),
                otp_code: code,
                purpose: OtpPurpose::Registration,
            })
            .await
            .unwrap();
        let login = service
            .login(LoginRequest {
                email: "a@x.com".to_string(),
                password: "Passw0rd".to_string(),
            })
            .await
            .unwrap();

        service
            .request_otp(OtpRequest {
                email: "a@x.com".to_string(),
                otp_type: OtpChannel::Email,
                purpose: OtpPurpose::ResetPassword,
            })
            .await
            .unwrap();
        let reset_code = issued_code(&pool, registered.user.id, OtpPurpose::ResetPassword).await;

        service
            .reset_password(ResetPasswordRequest {
                email: "a@x.com".to_string(),
                new_password: "NewPassw0rd".to_string(),
                otp_code: reset_code.clone(),
            })
            .await
            .unwrap();

        // The reset code was consumed with the reset.
        let err = service
            .reset_password(ResetPasswordRequest {
                email: "a@x.com".to_string(),
                new_password: "OtherPassw0rd1".to_string(),
                otp_code: reset_code,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));

        // Refresh tokens issued before the reset are revoked.
        let err = service
            .refresh_token(RefreshTokenRequest {
                refresh_token: login.refresh_token,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized { .. }));

        // Old password no longer works; the new one does.
        assert!(
            service
                .login(LoginRequest {
                    email: "a@x.com".to_string(),
                    password: "Passw0rd".to_string(),
                })
                .await
                .is_err()
        );
        service
            .login(LoginRequest {
                email: "a@x.com".to_string(),
                password: "NewPassw0rd".to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_deleting_user_cascades_dependent_records() {
        let pool = setup_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        let registered = service.register(register_request("a@x.com")).await.unwrap();
        let user_id = registered.user.id;

        UserRepository::new(&pool).delete_user(user_id).await.unwrap();

        let otp_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM otps WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(otp_count, 0);
    }
}
