//! Choosing a storage backend by name.
//!
//! Backend crates implement [`RepositoryFactory`]. The CLI registers the
//! backends it links against and opens whichever one the `[database]`
//! section of its config names.

use async_trait::async_trait;

use super::repository::{PayrollRepository, RepositoryError};

/// Where payroll data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Backend name, matched against [`RepositoryFactory::backend_name`]
    /// ignoring ASCII case.
    pub backend: String,
    /// Handed to the backend as-is. For SQLite this is a file path, a
    /// `sqlite:` URL or `:memory:`.
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// Connects and brings the schema and statutory rate seeds up to date.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn PayrollRepository>, RepositoryError>;
}

/// The backends compiled into a binary.
#[derive(Default)]
pub struct RepositoryRegistry {
    backends: Vec<Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `factory`, replacing any backend already registered under its name.
    pub fn register(&mut self, factory: Box<dyn RepositoryFactory>) {
        let name = factory.backend_name();
        self.backends.retain(|b| b.backend_name() != name);
        self.backends.push(factory);
    }

    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.backends.iter().map(|b| b.backend_name()).collect();
        names.sort_unstable();
        names
    }

    /// Opens the repository for `config.backend`.
    ///
    /// An unregistered backend is a [`RepositoryError::Configuration`];
    /// connection and migration failures come from the backend itself.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn PayrollRepository>, RepositoryError> {
        let Some(factory) = self
            .backends
            .iter()
            .find(|b| b.backend_name().eq_ignore_ascii_case(&config.backend))
        else {
            return Err(RepositoryError::Configuration(format!(
                "unsupported database backend '{}' (compiled in: {})",
                config.backend,
                self.available_backends().join(", ")
            )));
        };

        factory.create(config).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::InMemoryRepository;

    /// Opens an empty in-memory store and counts how often it was asked to.
    struct CountingBackend {
        name: &'static str,
        opened: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RepositoryFactory for CountingBackend {
        fn backend_name(&self) -> &'static str {
            self.name
        }

        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn PayrollRepository>, RepositoryError> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(InMemoryRepository::default()))
        }
    }

    struct UnreachableBackend;

    #[async_trait]
    impl RepositoryFactory for UnreachableBackend {
        fn backend_name(&self) -> &'static str {
            "postgres"
        }

        async fn create(
            &self,
            config: &DbConfig,
        ) -> Result<Box<dyn PayrollRepository>, RepositoryError> {
            Err(RepositoryError::Connection(format!(
                "could not reach {}",
                config.connection_string
            )))
        }
    }

    fn counting(name: &'static str) -> (Box<dyn RepositoryFactory>, Arc<AtomicUsize>) {
        let opened = Arc::new(AtomicUsize::new(0));
        let backend = CountingBackend {
            name,
            opened: Arc::clone(&opened),
        };
        (Box::new(backend), opened)
    }

    fn config(backend: &str, connection_string: &str) -> DbConfig {
        DbConfig {
            backend: backend.to_string(),
            connection_string: connection_string.to_string(),
        }
    }

    #[test]
    fn default_config_is_a_throwaway_sqlite_database() {
        assert_eq!(DbConfig::default(), config("sqlite", ":memory:"));
    }

    #[tokio::test]
    async fn opens_only_the_configured_backend() {
        let mut registry = RepositoryRegistry::new();
        let (sqlite, sqlite_opened) = counting("sqlite");
        let (mysql, mysql_opened) = counting("mysql");
        registry.register(sqlite);
        registry.register(mysql);

        let repo = registry.create(&config("SQLite", "payroll.db")).await.unwrap();

        assert!(repo.list_employees(false).await.unwrap().is_empty());
        assert_eq!(sqlite_opened.load(Ordering::SeqCst), 1);
        assert_eq!(mysql_opened.load(Ordering::SeqCst), 0);
        assert_eq!(registry.available_backends(), vec!["mysql", "sqlite"]);
    }

    #[tokio::test]
    async fn registering_a_name_again_replaces_the_backend() {
        let mut registry = RepositoryRegistry::new();
        let (stale, stale_opened) = counting("sqlite");
        let (fresh, fresh_opened) = counting("sqlite");
        registry.register(stale);
        registry.register(fresh);

        registry.create(&DbConfig::default()).await.unwrap();

        assert_eq!(registry.available_backends(), vec!["sqlite"]);
        assert_eq!(stale_opened.load(Ordering::SeqCst), 0);
        assert_eq!(fresh_opened.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unsupported_backend_is_a_configuration_error() {
        let mut registry = RepositoryRegistry::new();
        let (sqlite, _) = counting("sqlite");
        registry.register(sqlite);
        registry.register(Box::new(UnreachableBackend));

        let err = registry.create(&config("oracle", "hr")).await.err();

        assert_eq!(
            err,
            Some(RepositoryError::Configuration(
                "unsupported database backend 'oracle' (compiled in: postgres, sqlite)"
                    .to_string()
            ))
        );
    }

    #[tokio::test]
    async fn backend_connection_errors_pass_through() {
        let mut registry = RepositoryRegistry::new();
        registry.register(Box::new(UnreachableBackend));

        let err = registry.create(&config("postgres", "db.internal:5432")).await.err();

        assert_eq!(
            err,
            Some(RepositoryError::Connection(
                "could not reach db.internal:5432".to_string()
            ))
        );
    }
}
