use anyhow::{anyhow, Result};
use cr_core::ports::SettingsMigrationPort;
use cr_core::settings::model::{Settings, CURRENT_SCHEMA_VERSION};

pub struct SettingsMigrator {
    migrations: Vec<Box<dyn SettingsMigrationPort>>,
}

impl SettingsMigrator {
    pub fn new() -> Self {
        Self {
            migrations: vec![
                // Box::new(MigrationV1ToV2),
            ],
        }
    }

    pub fn with_migrations(migrations: Vec<Box<dyn SettingsMigrationPort>>) -> Self {
        Self { migrations }
    }

    pub fn migrate_to_latest(&self, mut settings: Settings) -> Result<Settings> {
        while settings.schema_version < CURRENT_SCHEMA_VERSION {
            let current = settings.schema_version;
            let migration = self
                .migrations
                .iter()
                .find(|m| m.from_version() == current)
                .ok_or_else(|| anyhow!("no settings migration from version {current}"))?;

            settings = migration.migrate(settings);
            settings.schema_version = migration.to_version();
        }

        Ok(settings)
    }
}

impl Default for SettingsMigrator {
    fn default() -> Self {
        Self::new()
    }
}
