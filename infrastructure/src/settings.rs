//! In-memory settings adapter.

use std::path::PathBuf;

use toolbelt_application::SettingsPort;
use toolbelt_domain::CommandConfig;

/// Fixed-value [`SettingsPort`] for tests and embedders that have no
/// configuration store of their own.
#[derive(Debug, Clone)]
pub struct StaticSettings {
    command_config: CommandConfig,
    project_path: PathBuf,
}

impl StaticSettings {
    pub fn new(command_config: CommandConfig, project_path: impl Into<PathBuf>) -> Self {
        Self {
            command_config,
            project_path: project_path.into(),
        }
    }
}

impl Default for StaticSettings {
    /// The stock defaults: `/bin/bash` with `ls *` allowed, files
    /// materialized into the current directory.
    fn default() -> Self {
        Self::new(CommandConfig::default(), ".")
    }
}

impl SettingsPort for StaticSettings {
    fn command_config(&self) -> CommandConfig {
        self.command_config.clone()
    }

    fn project_path(&self) -> PathBuf {
        self.project_path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolbelt_domain::DEFAULT_SHELL;

    #[test]
    fn test_default_settings() {
        let settings = StaticSettings::default();

        assert_eq!(settings.command_config().shell, DEFAULT_SHELL);
        assert_eq!(settings.project_path(), PathBuf::from("."));
    }
}
