//! Module for core business logic services.
//!
//! This module encapsulates services that perform specific business
//! operations and orchestrate interactions between different parts of the
//! application, such as OTP issuance and email delivery.

pub mod email_service;
pub mod otp_service;
