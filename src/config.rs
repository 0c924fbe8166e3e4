//! Explicit configuration for the resource layer.
//!
//! Configuration is constructed by the caller and handed down - never looked
//! up from the process environment at arbitrary call depth. The environment
//! is read in exactly one place, at the edge, through [`VaultConfig::from_env`]
//! and [`StorageConfig::from_env`], and a missing variable is an error the
//! caller handles rather than a process abort.
//!
//! ```rust
//! use breakwater::config::{Identity, VaultConfig};
//!
//! let config = VaultConfig::new("contoso-vault", Identity::SystemAssigned);
//! assert_eq!(config.vault_url(), "https://contoso-vault.vault.azure.net");
//! ```

use std::fmt;

/// Environment variable naming the key vault.
pub const KEYVAULT_VAULT_NAME_VAR: &str = "KEYVAULT_VAULT_NAME";
/// Environment variable carrying a user-assigned identity's client ID.
pub const MSI_CLIENT_ID_VAR: &str = "MSI_USER_ASSIGNED_CLIENTID";
/// Environment variable naming the storage account.
pub const STORAGE_ACCOUNT_VAR: &str = "ACCOUNT_NAME";
/// Environment variable naming the storage account's resource group.
pub const RESOURCE_GROUP_VAR: &str = "RESOURCE_GROUP";
/// Environment variable carrying the subscription ID.
pub const SUBSCRIPTION_ID_VAR: &str = "SUBID";

/// Error constructing configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable was absent from the lookup.
    MissingVar {
        /// The variable's name.
        name: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingVar { name } => write!(f, "{} must be set", name),
        }
    }
}

impl std::error::Error for ConfigError {}

/// The managed identity a client authenticates as.
///
/// A compute instance can carry one system-assigned identity and any number
/// of user-assigned ones; picking a user-assigned identity means naming its
/// client ID. The identity is pure configuration here - token exchange itself
/// is the platform's job, behind the [`crate::source`] seams.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Identity {
    /// The instance's own system-assigned identity.
    SystemAssigned,
    /// A user-assigned identity, selected by client ID.
    UserAssigned {
        /// Client ID of the user-assigned identity.
        client_id: String,
    },
}

impl Identity {
    /// Select an identity from an optional client ID.
    ///
    /// `None` and the empty string both mean system-assigned - the
    /// convention the original environment variables use.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use breakwater::config::Identity;
    ///
    /// assert_eq!(Identity::from_client_id(None), Identity::SystemAssigned);
    /// assert_eq!(
    ///     Identity::from_client_id(Some(String::new())),
    ///     Identity::SystemAssigned
    /// );
    /// assert_eq!(
    ///     Identity::from_client_id(Some("abc-123".into())),
    ///     Identity::UserAssigned { client_id: "abc-123".into() }
    /// );
    /// ```
    pub fn from_client_id(client_id: Option<String>) -> Self {
        match client_id {
            Some(id) if !id.is_empty() => Identity::UserAssigned { client_id: id },
            _ => Identity::SystemAssigned,
        }
    }

    /// The client ID, if this is a user-assigned identity.
    pub fn client_id(&self) -> Option<&str> {
        match self {
            Identity::SystemAssigned => None,
            Identity::UserAssigned { client_id } => Some(client_id),
        }
    }
}

/// Endpoint-suffix data for one cloud environment.
///
/// Sovereign clouds use different DNS suffixes; everything else in the crate
/// takes the suffixes from here instead of hard-coding them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cloud {
    /// Key vault token resource endpoint, with trailing slash.
    pub key_vault_endpoint: String,
    /// DNS suffix for key vault instances.
    pub key_vault_dns_suffix: String,
    /// DNS suffix for blob storage accounts.
    pub blob_host_suffix: String,
}

impl Cloud {
    /// The public cloud environment.
    pub fn public() -> Self {
        Self {
            key_vault_endpoint: "https://vault.azure.net/".to_string(),
            key_vault_dns_suffix: "vault.azure.net".to_string(),
            blob_host_suffix: "blob.core.windows.net".to_string(),
        }
    }

    /// The key vault token resource: the endpoint without its trailing slash.
    ///
    /// Token endpoints reject the resource when the slash is present.
    pub fn key_vault_resource(&self) -> &str {
        self.key_vault_endpoint.trim_end_matches('/')
    }
}

impl Default for Cloud {
    fn default() -> Self {
        Self::public()
    }
}

/// Configuration for a key vault client.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VaultConfig {
    /// Name of the vault instance.
    pub vault_name: String,
    /// Identity to authenticate as.
    pub identity: Identity,
    /// Cloud environment the vault lives in.
    pub cloud: Cloud,
}

impl VaultConfig {
    /// Create a configuration for the public cloud.
    pub fn new(vault_name: impl Into<String>, identity: Identity) -> Self {
        Self {
            vault_name: vault_name.into(),
            identity,
            cloud: Cloud::public(),
        }
    }

    /// Target a different cloud environment.
    pub fn with_cloud(mut self, cloud: Cloud) -> Self {
        self.cloud = cloud;
        self
    }

    /// The vault's base URL.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use breakwater::config::{Identity, VaultConfig};
    ///
    /// let config = VaultConfig::new("contoso-vault", Identity::SystemAssigned);
    /// assert_eq!(config.vault_url(), "https://contoso-vault.vault.azure.net");
    /// ```
    pub fn vault_url(&self) -> String {
        format!("https://{}.{}", self.vault_name, self.cloud.key_vault_dns_suffix)
    }

    /// Read the configuration from the process environment.
    ///
    /// Requires `KEYVAULT_VAULT_NAME`; `MSI_USER_ASSIGNED_CLIENTID` is
    /// optional and selects a user-assigned identity when present and
    /// non-empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration from an arbitrary variable lookup.
    ///
    /// `from_env` is this with `std::env::var`; tests inject a closure over a
    /// map instead of mutating process state.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use breakwater::config::VaultConfig;
    ///
    /// let config = VaultConfig::from_lookup(|name| match name {
    ///     "KEYVAULT_VAULT_NAME" => Some("contoso-vault".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(config.vault_name, "contoso-vault");
    /// assert_eq!(config.identity.client_id(), None);
    /// ```
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let vault_name = lookup(KEYVAULT_VAULT_NAME_VAR).ok_or(ConfigError::MissingVar {
            name: KEYVAULT_VAULT_NAME_VAR,
        })?;
        let identity = Identity::from_client_id(lookup(MSI_CLIENT_ID_VAR));

        Ok(Self::new(vault_name, identity))
    }
}

/// Configuration for a blob storage client.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StorageConfig {
    /// Name of the storage account.
    pub account_name: String,
    /// Resource group the account lives in.
    pub resource_group: String,
    /// Subscription owning the resource group.
    pub subscription_id: String,
    /// Cloud environment the account lives in.
    pub cloud: Cloud,
}

impl StorageConfig {
    /// Create a configuration for the public cloud.
    pub fn new(
        account_name: impl Into<String>,
        resource_group: impl Into<String>,
        subscription_id: impl Into<String>,
    ) -> Self {
        Self {
            account_name: account_name.into(),
            resource_group: resource_group.into(),
            subscription_id: subscription_id.into(),
            cloud: Cloud::public(),
        }
    }

    /// Target a different cloud environment.
    pub fn with_cloud(mut self, cloud: Cloud) -> Self {
        self.cloud = cloud;
        self
    }

    /// The account's blob service endpoint.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use breakwater::config::StorageConfig;
    ///
    /// let config = StorageConfig::new("demostore", "demo-rg", "sub-1");
    /// assert_eq!(
    ///     config.blob_endpoint(),
    ///     "https://demostore.blob.core.windows.net"
    /// );
    /// ```
    pub fn blob_endpoint(&self) -> String {
        format!("https://{}.{}", self.account_name, self.cloud.blob_host_suffix)
    }

    /// Read the configuration from the process environment.
    ///
    /// Requires `ACCOUNT_NAME`, `RESOURCE_GROUP`, and `SUBID`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration from an arbitrary variable lookup.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let require = |name: &'static str| {
            lookup(name).ok_or(ConfigError::MissingVar { name })
        };

        Ok(Self::new(
            require(STORAGE_ACCOUNT_VAR)?,
            require(RESOURCE_GROUP_VAR)?,
            require(SUBSCRIPTION_ID_VAR)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_vault_config_from_lookup_system_assigned() {
        let config =
            VaultConfig::from_lookup(vars(&[(KEYVAULT_VAULT_NAME_VAR, "contoso-vault")])).unwrap();

        assert_eq!(config.vault_name, "contoso-vault");
        assert_eq!(config.identity, Identity::SystemAssigned);
        assert_eq!(config.vault_url(), "https://contoso-vault.vault.azure.net");
    }

    #[test]
    fn test_vault_config_from_lookup_user_assigned() {
        let config = VaultConfig::from_lookup(vars(&[
            (KEYVAULT_VAULT_NAME_VAR, "contoso-vault"),
            (MSI_CLIENT_ID_VAR, "abc-123"),
        ]))
        .unwrap();

        assert_eq!(config.identity.client_id(), Some("abc-123"));
    }

    #[test]
    fn test_vault_config_empty_client_id_means_system_assigned() {
        let config = VaultConfig::from_lookup(vars(&[
            (KEYVAULT_VAULT_NAME_VAR, "contoso-vault"),
            (MSI_CLIENT_ID_VAR, ""),
        ]))
        .unwrap();

        assert_eq!(config.identity, Identity::SystemAssigned);
    }

    #[test]
    fn test_vault_config_missing_name_is_an_error() {
        let err = VaultConfig::from_lookup(|_| None).unwrap_err();

        assert_eq!(
            err,
            ConfigError::MissingVar {
                name: KEYVAULT_VAULT_NAME_VAR
            }
        );
        assert_eq!(err.to_string(), "KEYVAULT_VAULT_NAME must be set");
    }

    #[test]
    fn test_storage_config_from_lookup() {
        let config = StorageConfig::from_lookup(vars(&[
            (STORAGE_ACCOUNT_VAR, "demostore"),
            (RESOURCE_GROUP_VAR, "demo-rg"),
            (SUBSCRIPTION_ID_VAR, "sub-1"),
        ]))
        .unwrap();

        assert_eq!(config.account_name, "demostore");
        assert_eq!(config.resource_group, "demo-rg");
        assert_eq!(config.subscription_id, "sub-1");
        assert_eq!(
            config.blob_endpoint(),
            "https://demostore.blob.core.windows.net"
        );
    }

    #[test]
    fn test_storage_config_reports_first_missing_var() {
        let err = StorageConfig::from_lookup(vars(&[(RESOURCE_GROUP_VAR, "demo-rg")])).unwrap_err();

        assert_eq!(
            err,
            ConfigError::MissingVar {
                name: STORAGE_ACCOUNT_VAR
            }
        );
    }

    #[test]
    fn test_key_vault_resource_trims_trailing_slash() {
        let cloud = Cloud::public();

        assert_eq!(cloud.key_vault_resource(), "https://vault.azure.net");
    }

    #[test]
    fn test_custom_cloud_flows_into_urls() {
        let sovereign = Cloud {
            key_vault_endpoint: "https://vault.example.test/".to_string(),
            key_vault_dns_suffix: "vault.example.test".to_string(),
            blob_host_suffix: "blob.example.test".to_string(),
        };

        let vault = VaultConfig::new("v", Identity::SystemAssigned).with_cloud(sovereign.clone());
        assert_eq!(vault.vault_url(), "https://v.vault.example.test");

        let storage = StorageConfig::new("a", "rg", "sub").with_cloud(sovereign);
        assert_eq!(storage.blob_endpoint(), "https://a.blob.example.test");
    }
}
