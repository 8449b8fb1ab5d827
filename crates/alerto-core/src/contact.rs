//! Emergency contacts and the local roster.
//!
//! A contact number is `+` followed by 10–15 digits — the same rule the
//! original app enforced when saving contacts. The roster keeps insertion
//! order and rejects duplicates; its first entry is the preferred contact
//! used for dispatches when no explicit contact is configured.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── EmergencyContact ────────────────────────────────────────────────────────

/// A validated emergency phone number in `+<digits>` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmergencyContact(String);

impl EmergencyContact {
  /// Parse and validate a number. Accepts `+` followed by 10–15 ASCII
  /// digits, nothing else.
  pub fn parse(s: &str) -> Result<Self> {
    let digits = s
      .strip_prefix('+')
      .ok_or_else(|| Error::InvalidContact(s.to_string()))?;

    if !(10..=15).contains(&digits.len())
      || !digits.bytes().all(|b| b.is_ascii_digit())
    {
      return Err(Error::InvalidContact(s.to_string()));
    }
    Ok(Self(s.to_string()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl std::fmt::Display for EmergencyContact {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── ContactBook ─────────────────────────────────────────────────────────────

/// The local emergency-contact roster, persisted by the CLI as TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactBook {
  #[serde(default)]
  pub contacts: Vec<EmergencyContact>,
}

impl ContactBook {
  /// Validate and append a number. Errors on bad format or duplicates.
  pub fn add(&mut self, number: &str) -> Result<()> {
    let contact = EmergencyContact::parse(number)?;
    if self.contacts.contains(&contact) {
      return Err(Error::DuplicateContact(number.to_string()));
    }
    self.contacts.push(contact);
    Ok(())
  }

  /// Remove a number. Errors if it is not in the roster.
  pub fn remove(&mut self, number: &str) -> Result<EmergencyContact> {
    let idx = self
      .contacts
      .iter()
      .position(|c| c.as_str() == number)
      .ok_or_else(|| Error::UnknownContact(number.to_string()))?;
    Ok(self.contacts.remove(idx))
  }

  /// The contact a dispatch should carry: the first roster entry.
  pub fn preferred(&self) -> Option<&EmergencyContact> {
    self.contacts.first()
  }

  pub fn is_empty(&self) -> bool { self.contacts.is_empty() }

  pub fn len(&self) -> usize { self.contacts.len() }
}
