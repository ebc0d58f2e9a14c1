//! Client-side form validation
//!
//! Every form is validated before anything is sent to the backend. A form
//! that fails validation never produces a request value, so an invalid
//! submission cannot reach the network. All field errors are reported at
//! once so a dashboard can highlight every bad field in one pass.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::api::dto::{
    CreateDonationRequest, CreateTicketRequest, LoginRequest, RegisterRequest,
};
use crate::store::{DonationKind, VolunteerDetails};

/// Longest free-text message accepted
pub const MESSAGE_MAX_CHARS: usize = 2000;

/// Longest volunteer proposal title accepted
pub const TITLE_MAX_CHARS: usize = 120;

/// Shortest password accepted at registration
pub const PASSWORD_MIN_CHARS: usize = 8;

/// Currency used when a donation form does not name one
pub const DEFAULT_CURRENCY: &str = "EUR";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

/// `local@domain.tld` with no whitespace
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// Parse a user-typed amount ("12", "12.5", "12,50") into cents
pub fn parse_amount(input: &str) -> Result<i64, String> {
    let normalized = input.trim().replace(',', ".");
    if normalized.is_empty() {
        return Err("Amount is required".to_string());
    }

    let (whole, fraction) = match normalized.split_once('.') {
        Some((w, f)) => (w, f),
        None => (normalized.as_str(), ""),
    };

    let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if whole.is_empty() || !digits_only(whole) || !digits_only(fraction) {
        return Err(format!("'{}' is not a valid amount", input.trim()));
    }
    if fraction.len() > 2 {
        return Err("Amount can have at most two decimals".to_string());
    }

    let whole: i64 = whole
        .parse()
        .map_err(|_| format!("'{}' is too large", input.trim()))?;
    let cents: i64 = format!("{:0<2}", fraction).parse().unwrap_or(0);

    whole
        .checked_mul(100)
        .and_then(|w| w.checked_add(cents))
        .ok_or_else(|| format!("'{}' is too large", input.trim()))
}

/// A single invalid field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All problems found in one form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Record an error when `value` is blank
    fn require(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, format!("{} is required", field));
        }
    }

    fn max_chars(&mut self, field: &'static str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(field, format!("{} exceeds {} characters", field, max));
        }
    }

    fn email(&mut self, value: &str) {
        if value.trim().is_empty() {
            self.add("email", "email is required");
        } else if !is_valid_email(value) {
            self.add("email", format!("'{}' is not a valid email", value.trim()));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Whether a given field failed
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ============================================
// FORMS
// ============================================

/// Public donation form
#[derive(Debug, Clone)]
pub struct DonationForm {
    pub name: String,
    pub email: String,
    /// Amount as typed; ignored for goods donations when left blank
    pub amount: String,
    pub currency: Option<String>,
    pub kind: DonationKind,
    pub message: String,
}

impl DonationForm {
    pub fn validate(&self) -> Result<CreateDonationRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name);
        errors.email(&self.email);
        errors.max_chars("message", &self.message, MESSAGE_MAX_CHARS);

        let amount_cents = match (self.kind, self.amount.trim().is_empty()) {
            (DonationKind::Goods, true) => 0,
            _ => match parse_amount(&self.amount) {
                Ok(0) if self.kind == DonationKind::Money => {
                    errors.add("amount", "amount must be greater than zero");
                    0
                }
                Ok(cents) => cents,
                Err(message) => {
                    errors.add("amount", message);
                    0
                }
            },
        };

        errors.into_result(|| CreateDonationRequest {
            donor_name: self.name.trim().to_string(),
            donor_email: self.email.trim().to_string(),
            amount_cents,
            currency: self
                .currency
                .as_deref()
                .and_then(optional)
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
                .to_uppercase(),
            kind: self.kind,
            message: optional(&self.message),
        })
    }
}

/// Support/contact form that opens a ticket
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    pub fn validate(&self) -> Result<CreateTicketRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name);
        errors.email(&self.email);
        errors.require("subject", &self.subject);
        errors.require("message", &self.message);
        errors.max_chars("message", &self.message, MESSAGE_MAX_CHARS);

        errors.into_result(|| CreateTicketRequest {
            subject: self.subject.trim().to_string(),
            donor_name: optional(&self.name),
            donor_email: optional(&self.email),
            donor_phone: optional(&self.phone),
            message: self.message.trim().to_string(),
        })
    }
}

/// A user's proposal for a new volunteering opportunity
#[derive(Debug, Clone, Default)]
pub struct VolunteerProposalForm {
    pub title: String,
    pub description: String,
    pub schedule: String,
    pub location: String,
}

impl VolunteerProposalForm {
    pub fn validate(&self) -> Result<VolunteerDetails, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title);
        errors.max_chars("title", &self.title, TITLE_MAX_CHARS);
        errors.require("description", &self.description);
        errors.max_chars("description", &self.description, MESSAGE_MAX_CHARS);
        errors.require("schedule", &self.schedule);
        errors.require("location", &self.location);

        errors.into_result(|| VolunteerDetails {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            schedule: self.schedule.trim().to_string(),
            location: self.location.trim().to_string(),
        })
    }
}

/// Account registration form
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name);
        errors.email(&self.email);
        if self.password.chars().count() < PASSWORD_MIN_CHARS {
            errors.add(
                "password",
                format!("password must have at least {} characters", PASSWORD_MIN_CHARS),
            );
        }
        if self.password != self.confirm_password {
            errors.add("confirm_password", "passwords do not match");
        }

        errors.into_result(|| RegisterRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

/// Login form
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.email(&self.email);
        errors.require("password", &self.password);

        errors.into_result(|| LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}
