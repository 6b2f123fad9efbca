//! Configuration for Profiles

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilesConfig {
    #[serde(default)]
    pub ldap: LdapConfigSection,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub avatar: AvatarConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ProfilesConfig {
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("PROFILES_LDAP_URL") {
            config.ldap.server_url = url;
        }
        if let Ok(dn) = std::env::var("PROFILES_LDAP_BIND_DN") {
            config.ldap.bind_dn = dn;
        }
        if let Ok(pw) = std::env::var("PROFILES_LDAP_BIND_PASSWORD") {
            config.ldap.bind_password = pw;
        }
        if let Ok(base) = std::env::var("PROFILES_LDAP_BASE_DN") {
            config.ldap.base_dn = base;
        }
        if std::env::var("PROFILES_LDAP_START_TLS").map(|v| v == "true").unwrap_or(false) {
            config.ldap.start_tls = true;
        }
        if let Ok(timeout) = std::env::var("PROFILES_LDAP_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                config.ldap.timeout_seconds = t;
            }
        }
        if let Ok(entries) = std::env::var("PROFILES_CACHE_MAX_ENTRIES") {
            if let Ok(n) = entries.parse() {
                config.cache.max_entries = n;
            }
        }
        if let Ok(domain) = std::env::var("PROFILES_MAIL_DOMAIN") {
            config.avatar.mail_domain = domain;
        }
        if let Ok(level) = std::env::var("PROFILES_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("PROFILES_LOG_FORMAT") {
            config.logging.format = format;
        }

        config
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.ldap.validate()?;

        if self.cache.max_entries == 0 {
            return Err(crate::Error::Config(
                "cache.max_entries must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

/// LDAP directory connection and layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapConfigSection {
    /// LDAP server URL (ldap:// or ldaps://)
    #[serde(default = "default_ldap_url")]
    pub server_url: String,

    /// Use STARTTLS
    #[serde(default)]
    pub start_tls: bool,

    /// Bind DN for the service account
    #[serde(default)]
    pub bind_dn: String,

    /// Bind password
    #[serde(default)]
    pub bind_password: String,

    /// Root of the directory tree, used for free-text member search
    #[serde(default = "default_base_dn")]
    pub base_dn: String,

    /// Base DN holding member accounts
    #[serde(default = "default_user_base_dn")]
    pub user_base_dn: String,

    /// Base DN holding groups
    #[serde(default = "default_group_base_dn")]
    pub group_base_dn: String,

    /// Base DN holding directorship (committee) entries
    #[serde(default = "default_committee_base_dn")]
    pub committee_base_dn: String,

    /// Connection timeout in seconds
    #[serde(default = "default_ldap_timeout")]
    pub timeout_seconds: u64,
}

fn default_ldap_url() -> String {
    "ldaps://ldap.csh.rit.edu:636".to_string()
}

fn default_base_dn() -> String {
    "dc=csh,dc=rit,dc=edu".to_string()
}

fn default_user_base_dn() -> String {
    "cn=users,cn=accounts,dc=csh,dc=rit,dc=edu".to_string()
}

fn default_group_base_dn() -> String {
    "cn=groups,cn=accounts,dc=csh,dc=rit,dc=edu".to_string()
}

fn default_committee_base_dn() -> String {
    "ou=Committees,dc=csh,dc=rit,dc=edu".to_string()
}

fn default_ldap_timeout() -> u64 {
    10
}

impl Default for LdapConfigSection {
    fn default() -> Self {
        Self {
            server_url: default_ldap_url(),
            start_tls: false,
            bind_dn: String::new(),
            bind_password: String::new(),
            base_dn: default_base_dn(),
            user_base_dn: default_user_base_dn(),
            group_base_dn: default_group_base_dn(),
            committee_base_dn: default_committee_base_dn(),
            timeout_seconds: default_ldap_timeout(),
        }
    }
}

impl LdapConfigSection {
    pub fn validate(&self) -> crate::Result<()> {
        if self.server_url.is_empty() {
            return Err(crate::Error::Config("Server URL is required".into()));
        }

        if !self.server_url.starts_with("ldap://") && !self.server_url.starts_with("ldaps://") {
            return Err(crate::Error::Config(
                "Server URL must start with ldap:// or ldaps://".into(),
            ));
        }

        if self.bind_dn.is_empty() {
            return Err(crate::Error::Config("Bind DN is required".into()));
        }

        for (name, dn) in [
            ("base_dn", &self.base_dn),
            ("user_base_dn", &self.user_base_dn),
            ("group_base_dn", &self.group_base_dn),
            ("committee_base_dn", &self.committee_base_dn),
        ] {
            if dn.is_empty() {
                return Err(crate::Error::Config(format!("{} is required", name)));
            }
        }

        Ok(())
    }
}

/// Query cache sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum entries per cached query before least-recently-used eviction
    #[serde(default = "default_cache_entries")]
    pub max_entries: u64,
}

fn default_cache_entries() -> u64 {
    crate::DEFAULT_CACHE_MAX_ENTRIES
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_cache_entries(),
        }
    }
}

/// Fallback avatar settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarConfig {
    #[serde(default = "default_mail_domain")]
    pub mail_domain: String,

    #[serde(default = "default_gravatar_url")]
    pub gravatar_url: String,

    /// Gravatar `d` parameter
    #[serde(default = "default_image")]
    pub default_image: String,

    /// Gravatar `s` parameter, in pixels
    #[serde(default = "default_avatar_size")]
    pub size: u32,
}

fn default_mail_domain() -> String {
    crate::DEFAULT_MAIL_DOMAIN.to_string()
}

fn default_gravatar_url() -> String {
    "https://gravatar.com/avatar/".to_string()
}

fn default_image() -> String {
    "mm".to_string()
}

fn default_avatar_size() -> u32 {
    250
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            mail_domain: default_mail_domain(),
            gravatar_url: default_gravatar_url(),
            default_image: default_image(),
            size: default_avatar_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProfilesConfig::default();
        assert_eq!(config.cache.max_entries, 1024);
        assert_eq!(config.avatar.mail_domain, "csh.rit.edu");
        assert_eq!(config.avatar.size, 250);
        assert_eq!(
            config.ldap.group_base_dn,
            "cn=groups,cn=accounts,dc=csh,dc=rit,dc=edu"
        );
    }

    #[test]
    fn test_partial_toml() {
        let config = ProfilesConfig::from_toml(
            r#"
            [ldap]
            server_url = "ldap://localhost:389"
            bind_dn = "uid=profiles,cn=users,cn=accounts,dc=csh,dc=rit,dc=edu"

            [cache]
            max_entries = 16
            "#,
        )
        .unwrap();

        assert_eq!(config.ldap.server_url, "ldap://localhost:389");
        assert_eq!(config.ldap.base_dn, "dc=csh,dc=rit,dc=edu");
        assert_eq!(config.cache.max_entries, 16);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ProfilesConfig::default();

        // Should fail - no bind DN
        assert!(config.validate().is_err());

        config.ldap.bind_dn = "cn=admin,dc=csh,dc=rit,dc=edu".to_string();
        assert!(config.validate().is_ok());

        config.ldap.server_url = "http://ldap.csh.rit.edu".to_string();
        assert!(config.validate().is_err());

        config.ldap.server_url = "ldap://localhost".to_string();
        config.cache.max_entries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let err = ProfilesConfig::from_toml("[cache]\nmax_entries = \"lots\"").unwrap_err();
        assert_eq!(err.code(), "ConfigError");
    }
}
