use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// RoleCode
///
/// Stable numeric identifier of a role as carried inside bearer tokens.
/// Codes are part of the external contract and must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleCode(pub u32);

impl fmt::Display for RoleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for RoleCode {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

/// Role
///
/// The closed set of roles known to the school portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Teacher,
    Maintainer,
    Inactive,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Teacher, Role::Maintainer, Role::Inactive];

    pub const fn name(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Maintainer => "maintainer",
            Role::Inactive => "inactive",
        }
    }

    pub const fn code(self) -> RoleCode {
        match self {
            Role::Admin => RoleCode(6794),
            Role::Teacher => RoleCode(2938),
            Role::Maintainer => RoleCode(5150),
            Role::Inactive => RoleCode(1001),
        }
    }

    pub fn from_name(name: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.name() == name)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("role name {0:?} is registered more than once")]
    DuplicateName(String),

    #[error("role code {0} is assigned to more than one role")]
    DuplicateCode(RoleCode),

    #[error("unknown role name {0:?}")]
    UnknownRole(String),
}

/// RoleRegistry
///
/// Bidirectional name <-> code mapping. Built once at startup from a fixed list of
/// pairs and read-only afterwards, so it can be shared across request tasks without locking.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    by_name: HashMap<String, RoleCode>,
    by_code: BTreeMap<RoleCode, String>,
}

impl RoleRegistry {
    /// Registry holding every variant of [`Role`].
    pub fn standard() -> Self {
        let mut by_name = HashMap::with_capacity(Role::ALL.len());
        let mut by_code = BTreeMap::new();
        for role in Role::ALL {
            by_name.insert(role.name().to_string(), role.code());
            by_code.insert(role.code(), role.name().to_string());
        }
        Self { by_name, by_code }
    }

    /// Builds a registry from arbitrary pairs, rejecting anything that would break
    /// the one-to-one mapping between names and codes.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (S, RoleCode)>,
        S: Into<String>,
    {
        let mut by_name = HashMap::new();
        let mut by_code = BTreeMap::new();

        for (name, code) in pairs {
            let name = name.into();
            if by_name.contains_key(&name) {
                return Err(RegistryError::DuplicateName(name));
            }
            if by_code.contains_key(&code) {
                return Err(RegistryError::DuplicateCode(code));
            }
            by_name.insert(name.clone(), code);
            by_code.insert(code, name);
        }

        Ok(Self { by_name, by_code })
    }

    /// Maps names to codes. Unknown names are dropped, never reported.
    ///
    /// An empty result means no registered role matched; callers must not treat it
    /// as "no restriction".
    pub fn codes_for<I, S>(&self, names: I) -> BTreeSet<RoleCode>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|name| self.by_name.get(name.as_ref()).copied())
            .collect()
    }

    /// Strict counterpart of [`codes_for`](Self::codes_for): the first unknown name is an error.
    pub fn try_codes_for<I, S>(&self, names: I) -> Result<BTreeSet<RoleCode>, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                self.by_name
                    .get(name)
                    .copied()
                    .ok_or_else(|| RegistryError::UnknownRole(name.to_string()))
            })
            .collect()
    }

    /// Maps codes back to names, dropping codes that are not registered.
    pub fn names_for<I>(&self, codes: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = RoleCode>,
    {
        codes
            .into_iter()
            .filter_map(|code| self.by_code.get(&code).cloned())
            .collect()
    }

    pub fn is_valid_code(&self, code: RoleCode) -> bool {
        self.by_code.contains_key(&code)
    }

    /// Registered `(name, code)` pairs, ordered by code.
    pub fn entries(&self) -> impl Iterator<Item = (&str, RoleCode)> + '_ {
        self.by_code.iter().map(|(code, name)| (name.as_str(), *code))
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
