//! Catalog operations: existence and uniqueness checks around store calls, then a re-read so
//! responses carry derived fields.

use super::hierarchy::ensure_acyclic;
use crate::error::AppError;
use crate::filter::{AstronomerFilter, BodyFilter, ObservationFilter, Page};
use crate::schema::{
    AstronomerCreate, AstronomerRead, AstronomerStatistics, AstronomerUpdate, BodyStatistics,
    CelestialBodyCreate, CelestialBodyRead, CelestialBodyUpdate, ObservationCreate,
    ObservationRead, ObservationUpdate,
};
use crate::store::CatalogStore;

pub struct CatalogService;

fn body_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("celestial body {} not found", id))
}

fn astronomer_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("astronomer {} not found", id))
}

fn observation_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("observation {} not found", id))
}

impl CatalogService {
    pub async fn create_body(
        store: &dyn CatalogStore,
        new: CelestialBodyCreate,
    ) -> Result<CelestialBodyRead, AppError> {
        if store.find_body_by_name(&new.name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "celestial body '{}' already exists",
                new.name
            )));
        }
        if let Some(parent) = new.parent_id {
            if store.body_parent(parent).await?.is_none() {
                return Err(AppError::NotFound(format!(
                    "parent celestial body {} not found",
                    parent
                )));
            }
        }
        let id = store.insert_body(&new).await?;
        tracing::info!(id, name = %new.name, body_type = %new.body_type, "celestial body created");
        Self::get_body(store, id).await
    }

    pub async fn get_body(store: &dyn CatalogStore, id: i64) -> Result<CelestialBodyRead, AppError> {
        store.get_body(id).await?.ok_or_else(|| body_not_found(id))
    }

    pub async fn list_bodies(
        store: &dyn CatalogStore,
        filter: &BodyFilter,
        page: Page,
    ) -> Result<Vec<CelestialBodyRead>, AppError> {
        store.list_bodies(filter, page).await
    }

    pub async fn update_body(
        store: &dyn CatalogStore,
        id: i64,
        changes: CelestialBodyUpdate,
    ) -> Result<CelestialBodyRead, AppError> {
        let current = Self::get_body(store, id).await?;
        if let Some(name) = &changes.name {
            if *name != current.body.name && store.find_body_by_name(name).await?.is_some() {
                return Err(AppError::Conflict(format!(
                    "celestial body '{}' already exists",
                    name
                )));
            }
        }
        if let Some(Some(parent)) = changes.parent_id {
            if current.body.parent_id != Some(parent) {
                ensure_acyclic(store, id, parent).await?;
            }
        }
        if !store.update_body(id, &changes).await? {
            return Err(body_not_found(id));
        }
        Self::get_body(store, id).await
    }

    pub async fn delete_body(store: &dyn CatalogStore, id: i64) -> Result<(), AppError> {
        if !store.delete_body(id).await? {
            return Err(body_not_found(id));
        }
        tracing::info!(id, "celestial body deleted");
        Ok(())
    }

    pub async fn body_statistics(store: &dyn CatalogStore) -> Result<BodyStatistics, AppError> {
        store.body_statistics().await
    }

    pub async fn create_astronomer(
        store: &dyn CatalogStore,
        new: AstronomerCreate,
    ) -> Result<AstronomerRead, AppError> {
        if store
            .find_astronomer_by_name(&new.first_name, &new.last_name)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "astronomer '{} {}' already exists",
                new.first_name, new.last_name
            )));
        }
        let id = store.insert_astronomer(&new).await?;
        tracing::info!(id, "astronomer created");
        Self::get_astronomer(store, id).await
    }

    pub async fn get_astronomer(
        store: &dyn CatalogStore,
        id: i64,
    ) -> Result<AstronomerRead, AppError> {
        store.get_astronomer(id).await?.ok_or_else(|| astronomer_not_found(id))
    }

    pub async fn list_astronomers(
        store: &dyn CatalogStore,
        filter: &AstronomerFilter,
        page: Page,
    ) -> Result<Vec<AstronomerRead>, AppError> {
        store.list_astronomers(filter, page).await
    }

    pub async fn update_astronomer(
        store: &dyn CatalogStore,
        id: i64,
        changes: AstronomerUpdate,
    ) -> Result<AstronomerRead, AppError> {
        let current = Self::get_astronomer(store, id).await?;
        let (first, last) = changes.resulting_name(&current.astronomer);
        let renamed = first != current.astronomer.first_name || last != current.astronomer.last_name;
        if renamed && store.find_astronomer_by_name(first, last).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "astronomer '{} {}' already exists",
                first, last
            )));
        }
        if !store.update_astronomer(id, &changes).await? {
            return Err(astronomer_not_found(id));
        }
        Self::get_astronomer(store, id).await
    }

    /// Observations of the astronomer go with it.
    pub async fn delete_astronomer(store: &dyn CatalogStore, id: i64) -> Result<(), AppError> {
        if !store.delete_astronomer(id).await? {
            return Err(astronomer_not_found(id));
        }
        tracing::info!(id, "astronomer deleted");
        Ok(())
    }

    pub async fn astronomer_statistics(
        store: &dyn CatalogStore,
    ) -> Result<AstronomerStatistics, AppError> {
        store.astronomer_statistics().await
    }

    pub async fn create_observation(
        store: &dyn CatalogStore,
        new: ObservationCreate,
    ) -> Result<ObservationRead, AppError> {
        if !store.astronomer_exists(new.astronomer_id).await? {
            return Err(astronomer_not_found(new.astronomer_id));
        }
        if store.body_parent(new.celestial_body_id).await?.is_none() {
            return Err(body_not_found(new.celestial_body_id));
        }
        let id = store.insert_observation(&new).await?;
        tracing::info!(
            id,
            astronomer_id = new.astronomer_id,
            celestial_body_id = new.celestial_body_id,
            "observation recorded"
        );
        Self::get_observation(store, id).await
    }

    pub async fn get_observation(
        store: &dyn CatalogStore,
        id: i64,
    ) -> Result<ObservationRead, AppError> {
        store.get_observation(id).await?.ok_or_else(|| observation_not_found(id))
    }

    pub async fn list_observations(
        store: &dyn CatalogStore,
        filter: &ObservationFilter,
        page: Page,
    ) -> Result<Vec<ObservationRead>, AppError> {
        store.list_observations(filter, page).await
    }

    pub async fn update_observation(
        store: &dyn CatalogStore,
        id: i64,
        changes: ObservationUpdate,
    ) -> Result<ObservationRead, AppError> {
        if !store.update_observation(id, &changes).await? {
            return Err(observation_not_found(id));
        }
        Self::get_observation(store, id).await
    }

    pub async fn delete_observation(store: &dyn CatalogStore, id: i64) -> Result<(), AppError> {
        if !store.delete_observation(id).await? {
            return Err(observation_not_found(id));
        }
        tracing::info!(id, "observation deleted");
        Ok(())
    }
}
