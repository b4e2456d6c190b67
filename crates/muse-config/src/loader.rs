use std::path::Path;

use anyhow::Context;
use secrecy::ExposeSecret;

use crate::{Config, UsageStoreKind};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).context("failed to parse config")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first inconsistency found
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_session()?;
        self.validate_quota()?;
        self.validate_providers()?;
        Ok(())
    }

    fn validate_session(&self) -> anyhow::Result<()> {
        if self.session.jwt_secret.expose_secret().is_empty() {
            anyhow::bail!("session.jwt_secret must not be empty");
        }

        if self.session.plan_claim.is_empty() {
            anyhow::bail!("session.plan_claim must not be empty");
        }

        Ok(())
    }

    fn validate_quota(&self) -> anyhow::Result<()> {
        if self.quota.free_limit == 0 {
            anyhow::bail!("quota.free_limit must be greater than 0");
        }

        if self.quota.commit_attempts == 0 {
            anyhow::bail!("quota.commit_attempts must be at least 1");
        }

        if self.quota.commit_concurrency == 0 {
            anyhow::bail!("quota.commit_concurrency must be at least 1");
        }

        if self.quota.store == UsageStoreKind::Clerk && self.identity.is_none() {
            anyhow::bail!("quota.store = \"clerk\" requires an [identity] section");
        }

        if let Some(ref identity) = self.identity {
            if identity.secret_key.expose_secret().is_empty() {
                anyhow::bail!("identity.secret_key must not be empty");
            }

            if identity.timeout_secs == 0 {
                anyhow::bail!("identity.timeout_secs must be greater than 0");
            }
        }

        Ok(())
    }

    fn validate_providers(&self) -> anyhow::Result<()> {
        if self.providers.timeout_secs == 0 {
            anyhow::bail!("providers.timeout_secs must be greater than 0");
        }

        if let Some(ref text) = self.providers.text {
            if text.api_key.expose_secret().is_empty() {
                anyhow::bail!("providers.text.api_key must not be empty");
            }

            if text.model.is_empty() {
                anyhow::bail!("providers.text.model must not be empty");
            }
        }

        if let Some(ref image) = self.providers.image
            && image.api_key.expose_secret().is_empty()
        {
            anyhow::bail!("providers.image.api_key must not be empty");
        }

        if let Some(ref hosting) = self.providers.hosting {
            if hosting.cloud_name.is_empty() || hosting.api_key.is_empty() {
                anyhow::bail!("providers.hosting requires cloud_name and api_key");
            }

            if hosting.api_secret.expose_secret().is_empty() {
                anyhow::bail!("providers.hosting.api_secret must not be empty");
            }
        }

        if self.providers.text.is_none() {
            tracing::warn!("no text provider configured; text generations will fail");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    const MINIMAL: &str = r#"
        [session]
        jwt_secret = "session-secret"

        [quota]
        store = "memory"
    "#;

    #[test]
    fn minimal_config_is_valid() {
        let config = Config::from_toml(MINIMAL).unwrap();
        assert_eq!(config.quota.free_limit, 10);
        assert_eq!(config.session.plan_claim, "plan");
        assert!(config.database.url.is_none());
        assert!(config.server.health.enabled);
    }

    #[test]
    fn missing_session_secret_is_rejected() {
        let err = Config::from_toml("[quota]\nstore = \"memory\"").unwrap_err();
        assert!(err.to_string().contains("jwt_secret"));
    }

    #[test]
    fn clerk_store_requires_identity() {
        let err = Config::from_toml("[session]\njwt_secret = \"s\"").unwrap_err();
        assert!(err.to_string().contains("[identity]"));
    }

    #[test]
    fn zero_free_limit_is_rejected() {
        let err = Config::from_toml(&format!("{MINIMAL}\nfree_limit = 0")).unwrap_err();
        assert!(err.to_string().contains("free_limit"));
    }

    #[test]
    fn empty_vendor_secrets_are_rejected() {
        let cases = [
            ("[providers.text]\napi_key = \"\"", "providers.text.api_key"),
            ("[providers.image]\napi_key = \"\"", "providers.image.api_key"),
            (
                "[providers.hosting]\ncloud_name = \"demo\"\napi_key = \"123\"\napi_secret = \"\"",
                "providers.hosting.api_secret",
            ),
        ];

        for (section, field) in cases {
            let err = Config::from_toml(&format!("{MINIMAL}\n{section}")).unwrap_err();
            assert!(err.to_string().contains(field), "expected {field} in: {err}");
        }
    }

    #[test]
    fn zero_identity_timeout_is_rejected() {
        let raw = "[session]\njwt_secret = \"s\"\n\n[identity]\nsecret_key = \"sk\"\ntimeout_secs = 0";

        let err = Config::from_toml(raw).unwrap_err();
        assert!(err.to_string().contains("identity.timeout_secs"));
    }

    #[test]
    fn zero_commit_concurrency_is_rejected() {
        let err = Config::from_toml(&format!("{MINIMAL}\ncommit_concurrency = 0")).unwrap_err();
        assert!(err.to_string().contains("commit_concurrency"));
    }

    #[test]
    fn unknown_sections_are_rejected() {
        assert!(Config::from_toml(&format!("{MINIMAL}\n[billing]\nenabled = true")).is_err());
    }

    #[test]
    fn full_config_with_env_expansion() {
        let raw = r#"
            [server]
            listen_address = "127.0.0.1:4000"

            [server.cors]
            origins = ["https://app.muse.dev"]

            [session]
            jwt_secret = "{{ env.MUSE_TEST_JWT }}"
            plan_claim = "metadata.plan"

            [identity]
            secret_key = "{{ env.MUSE_TEST_CLERK }}"

            [providers.text]
            api_key = "gsk"

            [providers.image]
            api_key = "clipdrop"

            [providers.hosting]
            cloud_name = "demo"
            api_key = "123"
            api_secret = "{{ env.MUSE_TEST_CLOUD_SECRET | default("unset") }}"

            [database]
            url = "postgres://localhost/muse"

            [telemetry]
            log_format = "json"
        "#;

        let vars = [
            ("MUSE_TEST_JWT", Some("jwt")),
            ("MUSE_TEST_CLERK", Some("sk_test")),
            ("MUSE_TEST_CLOUD_SECRET", None),
        ];
        temp_env::with_vars(vars, || {
            let config = Config::from_toml(raw).unwrap();
            assert_eq!(config.session.jwt_secret.expose_secret(), "jwt");
            assert_eq!(config.quota.store, UsageStoreKind::Clerk);
            assert_eq!(
                config.providers.hosting.as_ref().unwrap().api_secret.expose_secret(),
                "unset"
            );
            assert_eq!(
                config.server.listen_address,
                Some("127.0.0.1:4000".parse().unwrap())
            );
            assert_eq!(
                config.telemetry.as_ref().unwrap().log_format,
                crate::telemetry::LogFormat::Json
            );
        });
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.quota.store, UsageStoreKind::Memory);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(Path::new("/nonexistent/muse.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
