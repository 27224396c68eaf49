use std::path::Path;

use crate::Config;

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
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if a status range is malformed, the health path is
    /// not absolute, or enabled notifications lack a sender or recipients
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_policy()?;
        self.validate_health()?;
        self.validate_notification()?;
        Ok(())
    }

    /// Status ranges must be non-empty and inside the HTTP code space
    fn validate_policy(&self) -> anyhow::Result<()> {
        for (name, set) in self.policy.sets() {
            for [start, end] in &set.ranges {
                if !(100..=1000).contains(start) || !(100..=1000).contains(end) || start >= end {
                    anyhow::bail!("policy.{name}: invalid status range [{start}, {end}]");
                }
            }
        }

        Ok(())
    }

    fn validate_health(&self) -> anyhow::Result<()> {
        let health = &self.server.health;
        if health.enabled && !health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/': {}", health.path);
        }

        Ok(())
    }

    /// Enabled notifications need someone to send to
    fn validate_notification(&self) -> anyhow::Result<()> {
        let Some(ref notification) = self.notification else {
            return Ok(());
        };

        if !notification.enabled {
            return Ok(());
        }

        if notification.from.trim().is_empty() {
            anyhow::bail!("notification.from must not be empty when notifications are enabled");
        }

        if notification.recipients.is_empty() {
            anyhow::bail!("notification.recipients must not be empty when notifications are enabled");
        }

        Ok(())
    }
}
