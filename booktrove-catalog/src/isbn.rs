//! ISBN-10 / ISBN-13 validation and conversion.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IsbnError {
    #[error("ISBN must have 10 or 13 digits, got {0}")]
    BadLength(usize),
    #[error("Invalid character '{0}' in ISBN")]
    BadChar(char),
    #[error("ISBN checksum mismatch: {0}")]
    BadChecksum(String),
}

/// A validated ISBN, stored without separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Isbn {
    Isbn10(String),
    Isbn13(String),
}

impl Isbn {
    /// Parse an ISBN, ignoring spaces and hyphens.
    pub fn parse(value: &str) -> Result<Self, IsbnError> {
        let mut cleaned = String::with_capacity(13);
        for ch in value.chars() {
            match ch {
                '-' | ' ' => {}
                '0'..='9' => cleaned.push(ch),
                'x' | 'X' => cleaned.push('X'),
                other => return Err(IsbnError::BadChar(other)),
            }
        }

        match cleaned.len() {
            10 if valid_isbn10(&cleaned) => Ok(Self::Isbn10(cleaned)),
            13 if valid_isbn13(&cleaned) => Ok(Self::Isbn13(cleaned)),
            10 | 13 => Err(IsbnError::BadChecksum(cleaned)),
            n => Err(IsbnError::BadLength(n)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Isbn10(s) | Self::Isbn13(s) => s,
        }
    }

    /// The 13-digit (EAN) form. ISBN-10s get the 978 prefix.
    pub fn to_isbn13(&self) -> String {
        match self {
            Self::Isbn13(s) => s.clone(),
            Self::Isbn10(s) => {
                let base = format!("978{}", &s[..9]);
                let check = isbn13_check_digit(&base);
                format!("{base}{check}")
            }
        }
    }

    /// The 10-digit form, only available for 978-prefixed ISBN-13s.
    pub fn to_isbn10(&self) -> Option<String> {
        match self {
            Self::Isbn10(s) => Some(s.clone()),
            Self::Isbn13(s) if s.starts_with("978") => {
                let base = &s[3..12];
                let sum: u32 = base
                    .chars()
                    .enumerate()
                    .filter_map(|(i, c)| c.to_digit(10).map(|d| d * (10 - i as u32)))
                    .sum();
                let check = (11 - sum % 11) % 11;
                let check = if check == 10 {
                    'X'
                } else {
                    char::from_digit(check, 10)?
                };
                Some(format!("{base}{check}"))
            }
            Self::Isbn13(_) => None,
        }
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize user input to a bare ISBN string, or `None` if it isn't one.
pub fn normalize_isbn(value: &str) -> Option<String> {
    Isbn::parse(value).ok().map(|isbn| isbn.as_str().to_string())
}

fn valid_isbn10(value: &str) -> bool {
    let mut sum = 0;
    for (i, ch) in value.chars().enumerate() {
        let digit = match (i, ch) {
            (9, 'X') => 10,
            (_, c) => match c.to_digit(10) {
                Some(d) => d,
                None => return false,
            },
        };
        sum += digit * (10 - i as u32);
    }
    sum % 11 == 0
}

fn valid_isbn13(value: &str) -> bool {
    if value.contains('X') {
        return false;
    }
    let check = value[12..].chars().next().and_then(|c| c.to_digit(10));
    check == Some(isbn13_check_digit(&value[..12]))
}

fn isbn13_check_digit(first12: &str) -> u32 {
    let sum: u32 = first12
        .chars()
        .enumerate()
        .filter_map(|(i, c)| c.to_digit(10).map(|d| if i % 2 == 0 { d } else { d * 3 }))
        .sum();
    (10 - sum % 10) % 10
}
