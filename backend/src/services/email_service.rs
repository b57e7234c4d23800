use crate::config::EmailConfig;
use crate::database::models::OtpPurpose;
use crate::errors::{ServiceError, ServiceResult};
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::str::FromStr;

pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    config: EmailConfig,
}

impl EmailService {
    /// Creates a new EmailService instance
    pub fn new(config: EmailConfig) -> ServiceResult<Self> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| ServiceError::external_service(format!("Invalid SMTP host: {e}")))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self { mailer, config })
    }

    /// Sends a one-time passcode to the specified recipient
    pub async fn send_otp_email(
        &self,
        recipient_email: &str,
        otp_code: &str,
        purpose: OtpPurpose,
        expires_in_minutes: i64,
    ) -> ServiceResult<()> {
        let subject = Self::subject_for(purpose);
        let html_content = self.build_otp_html(purpose, otp_code, expires_in_minutes);
        let text_content = self.build_otp_text(purpose, otp_code, expires_in_minutes);

        self.send_email(recipient_email, subject, &html_content, &text_content)
            .await
    }

    /// Sends a generic email
    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> ServiceResult<()> {
        let from_mailbox = Mailbox::from_str(&format!(
            "{} <{}>",
            self.config.from_name, self.config.from_email
        ))
        .map_err(|e| ServiceError::validation(format!("Invalid from email: {e}")))?;

        let to_mailbox = Mailbox::from_str(to_email)
            .map_err(|e| ServiceError::validation(format!("Invalid recipient email: {e}")))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                lettre::message::MultiPart::alternative()
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_content.to_string()),
                    )
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_content.to_string()),
                    ),
            )
            .map_err(|e| ServiceError::validation(format!("Failed to build email: {e}")))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| ServiceError::external_service(format!("Failed to send email: {e}")))?;

        Ok(())
    }

    fn subject_for(purpose: OtpPurpose) -> &'static str {
        match purpose {
            OtpPurpose::Registration => "Verify Your Account",
            OtpPurpose::Login => "Your Login Code",
            OtpPurpose::ResetPassword => "Reset Your Password",
        }
    }

    fn heading_for(purpose: OtpPurpose) -> &'static str {
        match purpose {
            OtpPurpose::Registration => "Verify your account",
            OtpPurpose::Login => "Login verification",
            OtpPurpose::ResetPassword => "Reset your password",
        }
    }

    fn build_otp_html(
        &self,
        purpose: OtpPurpose,
        otp_code: &str,
        expires_in_minutes: i64,
    ) -> String {
        format!(
            r#"
            <!DOCTYPE html>
            <html>
            <head>
                <meta charset="UTF-8">
                <title>{}</title>
            </head>
            <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
                <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
                    <h2 style="color: #2c3e50;">{}</h2>

                    <p>Your verification code is:</p>

                    <div style="text-align: center; margin: 30px 0;">
                        <span style="font-size: 28px; letter-spacing: 8px; font-weight: bold;">
                            {}
                        </span>
                    </div>

                    <p>This code will expire in {} minutes.</p>

                    <hr style="border: none; border-top: 1px solid #ecf0f1; margin: 30px 0;">

                    <p style="font-size: 12px; color: #7f8c8d;">
                        If you didn't request this code, you can safely ignore this email.
                    </p>
                </div>
            </body>
            </html>
            "#,
            Self::subject_for(purpose),
            Self::heading_for(purpose),
            otp_code,
            expires_in_minutes
        )
    }

    fn build_otp_text(
        &self,
        purpose: OtpPurpose,
        otp_code: &str,
        expires_in_minutes: i64,
    ) -> String {
        format!(
            r#"{}

Your verification code is: {}

This code will expire in {} minutes.

If you didn't request this code, you can safely ignore this email.
            "#,
            Self::heading_for(purpose),
            otp_code,
            expires_in_minutes
        )
    }
}
