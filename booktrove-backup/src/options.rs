//! What to put in (or take out of) an archive.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A data category carried by an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Books,
    Covers,
    Preferences,
    Styles,
}

impl RecordType {
    pub const ALL: [RecordType; 4] = [
        RecordType::Books,
        RecordType::Covers,
        RecordType::Preferences,
        RecordType::Styles,
    ];

    fn bit(self) -> u8 {
        match self {
            Self::Books => 1,
            Self::Covers => 1 << 1,
            Self::Preferences => 1 << 2,
            Self::Styles => 1 << 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Books => "books",
            Self::Covers => "covers",
            Self::Preferences => "preferences",
            Self::Styles => "styles",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown record type '{s}'"))
    }
}

/// A set of [`RecordType`]s.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordTypes(u8);

impl RecordTypes {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        RecordType::ALL.into_iter().collect()
    }

    pub fn contains(&self, t: RecordType) -> bool {
        self.0 & t.bit() != 0
    }

    pub fn insert(&mut self, t: RecordType) {
        self.0 |= t.bit();
    }

    pub fn remove(&mut self, t: RecordType) {
        self.0 &= !t.bit();
    }

    pub fn without(mut self, t: RecordType) -> Self {
        self.remove(t);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = RecordType> + '_ {
        RecordType::ALL.into_iter().filter(|t| self.contains(*t))
    }
}

impl FromIterator<RecordType> for RecordTypes {
    fn from_iter<I: IntoIterator<Item = RecordType>>(iter: I) -> Self {
        let mut set = Self::empty();
        for t in iter {
            set.insert(t);
        }
        set
    }
}

impl fmt::Debug for RecordTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// What to do with an incoming book whose uuid already exists locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Keep the local book. Only new books are added.
    #[default]
    Skip,
    /// Replace the local book.
    Overwrite,
    /// Replace the local book only if the incoming one was updated later.
    Sync,
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub record_types: RecordTypes,
    /// Only books changed since the last full backup.
    pub incremental: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            record_types: RecordTypes::all(),
            incremental: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub record_types: RecordTypes,
    pub policy: UpdatePolicy,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            record_types: RecordTypes::all(),
            policy: UpdatePolicy::Skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_operations() {
        let mut set = RecordTypes::empty();
        assert!(set.is_empty());
        set.insert(RecordType::Books);
        set.insert(RecordType::Styles);
        assert!(set.contains(RecordType::Books));
        assert!(!set.contains(RecordType::Covers));
        set.remove(RecordType::Books);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![RecordType::Styles]);

        let all = RecordTypes::all();
        assert!(RecordType::ALL.iter().all(|t| all.contains(*t)));
        assert!(!all.without(RecordType::Covers).contains(RecordType::Covers));
    }

    #[test]
    fn parses_record_type_names() {
        assert_eq!("Covers".parse::<RecordType>(), Ok(RecordType::Covers));
        assert!("bookmarks".parse::<RecordType>().is_err());
    }
}
