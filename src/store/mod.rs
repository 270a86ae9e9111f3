//! Storage seam for the catalog. `PgStore` backs the server; `MemoryStore` serves tests and
//! local experiments with identical observable behavior.

mod database;
mod memory;
mod postgres;

pub use database::ensure_database_exists;
pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::AppError;
use crate::filter::{AstronomerFilter, BodyFilter, ObservationFilter, Page};
use crate::schema::{
    AstronomerCreate, AstronomerRead, AstronomerStatistics, AstronomerUpdate, BodyStatistics,
    CelestialBodyCreate, CelestialBodyRead, CelestialBodyUpdate, NewUser, ObservationCreate,
    ObservationRead, ObservationUpdate, User,
};
use async_trait::async_trait;

/// Persistence operations. Inserts return the new id and updates return whether the row
/// existed; callers re-read to obtain derived fields. Unique and foreign key violations
/// surface as `AppError::Conflict` and `AppError::NotFound` respectively.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn ping(&self) -> Result<(), AppError>;

    async fn insert_body(&self, new: &CelestialBodyCreate) -> Result<i64, AppError>;
    async fn get_body(&self, id: i64) -> Result<Option<CelestialBodyRead>, AppError>;
    async fn find_body_by_name(&self, name: &str) -> Result<Option<i64>, AppError>;
    async fn list_bodies(
        &self,
        filter: &BodyFilter,
        page: Page,
    ) -> Result<Vec<CelestialBodyRead>, AppError>;
    async fn update_body(&self, id: i64, changes: &CelestialBodyUpdate) -> Result<bool, AppError>;
    /// Nulls the parent link of children and removes the body's observations.
    async fn delete_body(&self, id: i64) -> Result<bool, AppError>;
    /// `None` when the body does not exist, `Some(parent)` otherwise.
    async fn body_parent(&self, id: i64) -> Result<Option<Option<i64>>, AppError>;
    async fn body_statistics(&self) -> Result<BodyStatistics, AppError>;

    async fn insert_astronomer(&self, new: &AstronomerCreate) -> Result<i64, AppError>;
    async fn get_astronomer(&self, id: i64) -> Result<Option<AstronomerRead>, AppError>;
    async fn astronomer_exists(&self, id: i64) -> Result<bool, AppError>;
    async fn find_astronomer_by_name(&self, first: &str, last: &str)
        -> Result<Option<i64>, AppError>;
    async fn list_astronomers(
        &self,
        filter: &AstronomerFilter,
        page: Page,
    ) -> Result<Vec<AstronomerRead>, AppError>;
    async fn update_astronomer(&self, id: i64, changes: &AstronomerUpdate)
        -> Result<bool, AppError>;
    /// Removes the astronomer's observations too.
    async fn delete_astronomer(&self, id: i64) -> Result<bool, AppError>;
    async fn astronomer_statistics(&self) -> Result<AstronomerStatistics, AppError>;

    async fn insert_observation(&self, new: &ObservationCreate) -> Result<i64, AppError>;
    async fn get_observation(&self, id: i64) -> Result<Option<ObservationRead>, AppError>;
    async fn list_observations(
        &self,
        filter: &ObservationFilter,
        page: Page,
    ) -> Result<Vec<ObservationRead>, AppError>;
    async fn update_observation(&self, id: i64, changes: &ObservationUpdate)
        -> Result<bool, AppError>;
    async fn delete_observation(&self, id: i64) -> Result<bool, AppError>;

    async fn insert_user(&self, new: &NewUser) -> Result<User, AppError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn delete_user(&self, id: i64) -> Result<bool, AppError>;
}
