//! Durable vendor defaults store
//!
//! The store is the learned mapping that makes repeat merchants classify
//! automatically: a YAML file mapping each account name to the vendor
//! descriptions historically classified to it. It is loaded once at
//! startup, owned explicitly by the run (never a hidden global), passed by
//! reference into the classifier and review components, and flushed on
//! normal completion and on the interrupt path.
//!
//! # File shape
//!
//! ```yaml
//! accounts:
//!   Expenses:Food:
//!     - COFFEE SHOP
//!     - GROCER
//! ```
//!
//! # Persistence
//!
//! The file is rewritten wholesale on every save, never appended, so a
//! crash between saves loses at most the in-flight decision and never
//! corrupts previously durable ones.
//!
//! # Known limitation
//!
//! Nothing stops a vendor from being saved under a second account later;
//! both associations are retained and lookup then resolves by account-name
//! order. Enforcing single-account-per-vendor is a product decision that
//! has not been made, so the permissive behavior stands.

use crate::types::ImportError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Serialized shape of the defaults file
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct DefaultsData {
    #[serde(default)]
    accounts: BTreeMap<String, Vec<String>>,
}

/// Learned vendor-to-account mapping with file-backed persistence
#[derive(Debug)]
pub struct DefaultsStore {
    path: PathBuf,
    data: DefaultsData,
}

impl DefaultsStore {
    /// Load the defaults store from a file
    ///
    /// A missing file is not an error and yields an empty store; an
    /// existing file that cannot be read or parsed is.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ImportError> {
        let path = path.into();
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let data: DefaultsData = serde_yaml::from_str(&contents)
                    .map_err(ImportError::defaults_load)?;
                Ok(DefaultsStore { path, data })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(DefaultsStore {
                path,
                data: DefaultsData::default(),
            }),
            Err(e) => Err(ImportError::defaults_load(e)),
        }
    }

    /// Look up the account a vendor was previously classified to
    ///
    /// The mapping is stored account-to-vendors, so this is a reverse
    /// scan. When a vendor appears under several accounts the first match
    /// in account-name order wins (see the module-level limitation note).
    pub fn check_vendor(&self, vendor: &str) -> Option<&str> {
        self.data
            .accounts
            .iter()
            .find(|(_, vendors)| vendors.iter().any(|v| v == vendor))
            .map(|(account, _)| account.as_str())
    }

    /// Record a vendor's account in the in-memory mapping
    ///
    /// Idempotent: re-saving an existing pair leaves the store
    /// content-equivalent. Saving the same vendor under a different
    /// account retains both associations.
    pub fn save_vendor(&mut self, vendor: &str, account: &str) {
        let vendors = self.data.accounts.entry(account.to_string()).or_default();
        if !vendors.iter().any(|v| v == vendor) {
            vendors.push(vendor.to_string());
        }
    }

    /// Rewrite the defaults file with the current mapping
    pub fn persist(&self) -> Result<(), ImportError> {
        let encoded =
            serde_yaml::to_string(&self.data).map_err(ImportError::defaults_save)?;
        fs::write(&self.path, encoded).map_err(ImportError::defaults_save)
    }

    /// Path the store persists to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of accounts with at least one learned vendor
    pub fn account_count(&self) -> usize {
        self.data.accounts.len()
    }
}
