//! Client-side input checks.
//!
//! These run synchronously before any request is sent.

use alloy::primitives::Address;
use std::collections::HashSet;
use thiserror::Error;

use crate::actions::action::CreateSessionParams;

/// Rejected user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("malformed address '{0}'")]
    InvalidAddress(String),

    #[error("user name must not be empty")]
    EmptyName,

    #[error("{0} appears more than once in the participant list")]
    DuplicateParticipant(Address),

    #[error("{count} participants invited, session allows at most {maximum}")]
    TooManyParticipants { count: usize, maximum: u32 },

    #[error("minimum users ({minimum}) must be between 2 and maximum users ({maximum})")]
    UserBounds { minimum: u32, maximum: u32 },

    #[error("remaining users ({remaining}) must be at least 1 and below minimum users ({minimum})")]
    RemainingUsers { remaining: u32, minimum: u32 },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("at least one glove is required")]
    NoGloves,

    #[error("glove {0} is listed more than once")]
    DuplicateGlove(Address),
}

/// Parse a `0x`-prefixed, 40 hex digit address.
pub fn parse_address(input: &str) -> Result<Address, ValidationError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| ValidationError::InvalidAddress(input.to_string()))?;
    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidAddress(input.to_string()));
    }
    digits
        .parse()
        .map_err(|_| ValidationError::InvalidAddress(input.to_string()))
}

pub(crate) fn check_user_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

pub(crate) fn check_gloves(gloves: &[Address]) -> Result<(), ValidationError> {
    if gloves.is_empty() {
        return Err(ValidationError::NoGloves);
    }
    let mut seen = HashSet::with_capacity(gloves.len());
    match gloves.iter().find(|glove| !seen.insert(*glove)) {
        Some(glove) => Err(ValidationError::DuplicateGlove(*glove)),
        None => Ok(()),
    }
}

pub(crate) fn check_create_session(p: &CreateSessionParams) -> Result<(), ValidationError> {
    if p.minimum_user < 2 || p.minimum_user > p.maximum_user {
        return Err(ValidationError::UserBounds {
            minimum: p.minimum_user,
            maximum: p.maximum_user,
        });
    }
    if p.remaining_user == 0 || p.remaining_user >= p.minimum_user {
        return Err(ValidationError::RemainingUsers {
            remaining: p.remaining_user,
            minimum: p.minimum_user,
        });
    }
    for (field, value) in [
        ("maxRounds", u64::from(p.max_rounds)),
        ("roundLength", p.round_length),
        ("roundInterval", p.round_interval),
        ("initialHealthPoint", u64::from(p.initial_health_point)),
        ("numberOfGloves", u64::from(p.number_of_gloves)),
    ] {
        if value == 0 {
            return Err(ValidationError::Zero(field));
        }
    }

    let mut seen = HashSet::with_capacity(p.users.len());
    for user in &p.users {
        if !seen.insert(user) {
            return Err(ValidationError::DuplicateParticipant(*user));
        }
    }
    if p.users.len() > p.maximum_user as usize {
        return Err(ValidationError::TooManyParticipants {
            count: p.users.len(),
            maximum: p.maximum_user,
        });
    }
    Ok(())
}
