//! The Machine type and its identity model.
//!
//! A machine is uniquely identified by the pair (mac, arch). The identity
//! is a SHA-256 [`Fingerprint`] over the canonical form of both fields,
//! never over the name or the provision flag, so two boot requests that
//! agree on (mac, arch) always resolve to the same record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;
use crate::name::default_name;

/// CPU architecture reported by a booting machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arch {
    #[serde(rename = "x86_64")]
    X86_64,
    #[serde(rename = "aarch64")]
    Aarch64,
}

impl Arch {
    /// Machine-readable architecture string for selectors and hashing.
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::Aarch64 => "aarch64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x86_64" => Ok(Arch::X86_64),
            "aarch64" => Ok(Arch::Aarch64),
            other => Err(ModelError::UnknownArch(other.to_string())),
        }
    }
}

/// Physical address in canonical form: uppercase hex octets joined by `-`.
///
/// Input accepts `:` or `-` separators in any case; the canonical form is
/// what gets stored, compared, and hashed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddr(String);

impl MacAddr {
    /// Parse and canonicalize a textual MAC address.
    pub fn parse(s: &str) -> Result<Self, ModelError> {
        let octets: Vec<&str> = s.split(|c| c == ':' || c == '-').collect();
        let valid = octets.len() == 6
            && octets
                .iter()
                .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()));
        if !valid {
            return Err(ModelError::InvalidMac(s.to_string()));
        }
        Ok(MacAddr(octets.join("-").to_ascii_uppercase()))
    }

    /// Canonical textual form, e.g. `AA-BB-CC-DD-EE-FF`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The address as a 48-bit integer, device-specific bits lowest.
    pub fn as_u64(&self) -> u64 {
        let hex: String = self.0.chars().filter(|c| c.is_ascii_hexdigit()).collect();
        u64::from_str_radix(&hex, 16).unwrap_or(0)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MacAddr {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MacAddr::parse(s)
    }
}

impl TryFrom<String> for MacAddr {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        MacAddr::parse(&s)
    }
}

impl From<MacAddr> for String {
    fn from(mac: MacAddr) -> Self {
        mac.0
    }
}

/// Identity fingerprint: SHA-256 over the canonical (mac, arch) pair.
///
/// Stable across reboots and input formatting. The fingerprint is the key
/// under which a machine record lives in the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint for an identity pair.
    pub fn compute(mac: &MacAddr, arch: Arch) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(mac.as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(arch.as_str().as_bytes());
        Fingerprint(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A network-booting machine and its provisioning state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    /// Human-readable label. Never part of identity.
    pub name: String,
    pub mac: MacAddr,
    pub arch: Arch,
    /// Whether this machine should be provisioned on its next boot.
    pub provision: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Machine {
    /// Build the record for a machine seen for the first time.
    ///
    /// New machines default to `provision = true` and get a deterministic
    /// word-based name derived from the MAC.
    pub fn first_boot(mac: MacAddr, arch: Arch) -> Self {
        let now = Utc::now();
        Machine {
            name: default_name(&mac),
            mac,
            arch,
            provision: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Identity of this record.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::compute(&self.mac, self.arch)
    }
}
