//! Server configuration: built-in defaults overlaid with `IDSTORE_DB_*`
//! environment variables.

use figment::Figment;
use figment::providers::{Env, Serialized};
use idstore_db::DbConfig;

pub const ENV_PREFIX: &str = "IDSTORE_DB_";

pub fn figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(DbConfig::default()))
        .merge(Env::prefixed(ENV_PREFIX))
}

pub fn load() -> Result<DbConfig, figment::Error> {
    figment().extract()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("IDSTORE_DB_NAMESPACE", "staging");
            jail.set_env("IDSTORE_DB_URL", "db.internal:8000");

            let config = load()?;
            assert_eq!(config.namespace, "staging");
            assert_eq!(config.url, "db.internal:8000");
            assert_eq!(config.database, "main");
            Ok(())
        });
    }

    #[test]
    fn defaults_apply_without_environment() {
        figment::Jail::expect_with(|_| {
            assert_eq!(load()?, DbConfig::default());
            Ok(())
        });
    }
}
