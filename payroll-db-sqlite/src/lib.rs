//! SQLite backend for [`payroll_core::PayrollRepository`].

mod decimal;
pub mod factory;
pub mod repository;

pub use factory::SqliteRepositoryFactory;
pub use repository::SqliteRepository;
