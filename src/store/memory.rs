//! In-memory store for tests and development. Mirrors the PostgreSQL constraints: unique
//! names, foreign keys, `ON DELETE SET NULL` for parents and `ON DELETE CASCADE` for
//! observations.

use super::CatalogStore;
use crate::error::AppError;
use crate::filter::{AstronomerFilter, BodyFilter, ObservationFilter, Page};
use crate::schema::{
    Astronomer, AstronomerCreate, AstronomerRead, AstronomerStatistics, AstronomerUpdate,
    BodyStatistics, CelestialBody, CelestialBodyCreate, CelestialBodyRead, CelestialBodyUpdate,
    NewUser, NumericSummary, Observation, ObservationCreate, ObservationRead, ObservationUpdate,
    User,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    bodies: BTreeMap<i64, CelestialBody>,
    astronomers: BTreeMap<i64, Astronomer>,
    observations: BTreeMap<i64, Observation>,
    users: BTreeMap<i64, User>,
    last_body_id: i64,
    last_astronomer_id: i64,
    last_observation_id: i64,
    last_user_id: i64,
}

impl Tables {
    fn body_read(&self, b: &CelestialBody) -> CelestialBodyRead {
        let observations: Vec<&Observation> = self
            .observations
            .values()
            .filter(|o| o.celestial_body_id == b.id)
            .collect();
        let observers: BTreeSet<String> = observations
            .iter()
            .filter_map(|o| self.astronomers.get(&o.astronomer_id))
            .map(Astronomer::full_name)
            .collect();
        CelestialBodyRead {
            parent_name: b
                .parent_id
                .and_then(|p| self.bodies.get(&p))
                .map(|p| p.name.clone()),
            children_count: self.bodies.values().filter(|c| c.parent_id == Some(b.id)).count() as i64,
            observations_count: observations.len() as i64,
            observers: observers.into_iter().collect(),
            body: b.clone(),
        }
    }

    fn astronomer_read(&self, a: &Astronomer) -> AstronomerRead {
        let bodies: Vec<i64> = self
            .observations
            .values()
            .filter(|o| o.astronomer_id == a.id)
            .map(|o| o.celestial_body_id)
            .collect();
        AstronomerRead {
            full_name: a.full_name(),
            observations_count: bodies.len() as i64,
            observed_bodies_count: bodies.iter().collect::<BTreeSet<_>>().len() as i64,
            astronomer: a.clone(),
        }
    }

    fn observation_read(&self, o: &Observation) -> Option<ObservationRead> {
        let astronomer = self.astronomers.get(&o.astronomer_id)?;
        let body = self.bodies.get(&o.celestial_body_id)?;
        Some(ObservationRead {
            astronomer_name: astronomer.full_name(),
            celestial_body_name: body.name.clone(),
            observation: o.clone(),
        })
    }

    fn body_name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.bodies
            .values()
            .any(|b| b.name == name && Some(b.id) != except)
    }

    fn astronomer_name_taken(&self, first: &str, last: &str, except: Option<i64>) -> bool {
        self.astronomers
            .values()
            .any(|a| a.first_name == first && a.last_name == last && Some(a.id) != except)
    }

    fn require_body(&self, id: i64) -> Result<(), AppError> {
        if self.bodies.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("celestial body {} not found", id)))
        }
    }

    fn require_astronomer(&self, id: i64) -> Result<(), AppError> {
        if self.astronomers.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("astronomer {} not found", id)))
        }
    }
}

fn page_of<T>(rows: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    rows.skip(page.skip as usize).take(page.limit as usize).collect()
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, AppError> {
        self.tables
            .read()
            .map_err(|e| AppError::Internal(format!("failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, AppError> {
        self.tables
            .write()
            .map_err(|e| AppError::Internal(format!("failed to acquire write lock: {}", e)))
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        self.read().map(|_| ())
    }

    async fn insert_body(&self, new: &CelestialBodyCreate) -> Result<i64, AppError> {
        let mut t = self.write()?;
        if t.body_name_taken(&new.name, None) {
            return Err(AppError::Conflict("celestial body name already exists".into()));
        }
        if let Some(parent) = new.parent_id {
            t.require_body(parent)?;
        }
        t.last_body_id += 1;
        let id = t.last_body_id;
        let now = Utc::now();
        t.bodies.insert(
            id,
            CelestialBody {
                id,
                name: new.name.clone(),
                body_type: new.body_type,
                mass: new.mass,
                radius: new.radius,
                temperature: new.temperature,
                distance: new.distance,
                apparent_magnitude: new.apparent_magnitude,
                absolute_magnitude: new.absolute_magnitude,
                spectral_class: new.spectral_class.clone(),
                right_ascension: new.right_ascension,
                declination: new.declination,
                description: new.description.clone(),
                parent_id: new.parent_id,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn get_body(&self, id: i64) -> Result<Option<CelestialBodyRead>, AppError> {
        let t = self.read()?;
        Ok(t.bodies.get(&id).map(|b| t.body_read(b)))
    }

    async fn find_body_by_name(&self, name: &str) -> Result<Option<i64>, AppError> {
        let t = self.read()?;
        Ok(t.bodies.values().find(|b| b.name == name).map(|b| b.id))
    }

    async fn list_bodies(
        &self,
        filter: &BodyFilter,
        page: Page,
    ) -> Result<Vec<CelestialBodyRead>, AppError> {
        let t = self.read()?;
        let rows = t.bodies.values().filter(|b| filter.matches(b));
        Ok(page_of(rows, page).into_iter().map(|b| t.body_read(b)).collect())
    }

    async fn update_body(&self, id: i64, changes: &CelestialBodyUpdate) -> Result<bool, AppError> {
        let mut t = self.write()?;
        let Some(mut body) = t.bodies.get(&id).cloned() else {
            return Ok(false);
        };
        changes.apply(&mut body);
        if t.body_name_taken(&body.name, Some(id)) {
            return Err(AppError::Conflict("celestial body name already exists".into()));
        }
        if let Some(parent) = body.parent_id {
            t.require_body(parent)?;
        }
        body.updated_at = Utc::now();
        t.bodies.insert(id, body);
        Ok(true)
    }

    async fn delete_body(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.write()?;
        if t.bodies.remove(&id).is_none() {
            return Ok(false);
        }
        for child in t.bodies.values_mut().filter(|c| c.parent_id == Some(id)) {
            child.parent_id = None;
        }
        t.observations.retain(|_, o| o.celestial_body_id != id);
        Ok(true)
    }

    async fn body_parent(&self, id: i64) -> Result<Option<Option<i64>>, AppError> {
        let t = self.read()?;
        Ok(t.bodies.get(&id).map(|b| b.parent_id))
    }

    async fn body_statistics(&self) -> Result<BodyStatistics, AppError> {
        let t = self.read()?;
        let mut by_type = BTreeMap::new();
        for b in t.bodies.values() {
            *by_type.entry(b.body_type.to_string()).or_insert(0) += 1;
        }
        Ok(BodyStatistics {
            total: t.bodies.len() as i64,
            by_type,
            distance: NumericSummary::from_values(t.bodies.values().filter_map(|b| b.distance)),
            apparent_magnitude: NumericSummary::from_values(
                t.bodies.values().filter_map(|b| b.apparent_magnitude),
            ),
        })
    }

    async fn insert_astronomer(&self, new: &AstronomerCreate) -> Result<i64, AppError> {
        let mut t = self.write()?;
        if t.astronomer_name_taken(&new.first_name, &new.last_name, None) {
            return Err(AppError::Conflict("astronomer with this name already exists".into()));
        }
        t.last_astronomer_id += 1;
        let id = t.last_astronomer_id;
        let now = Utc::now();
        t.astronomers.insert(
            id,
            Astronomer {
                id,
                first_name: new.first_name.clone(),
                last_name: new.last_name.clone(),
                email: new.email.clone(),
                institution: new.institution.clone(),
                country: new.country.clone(),
                birth_date: new.birth_date,
                specialization: new.specialization.clone(),
                biography: new.biography.clone(),
                is_active: new.is_active,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn get_astronomer(&self, id: i64) -> Result<Option<AstronomerRead>, AppError> {
        let t = self.read()?;
        Ok(t.astronomers.get(&id).map(|a| t.astronomer_read(a)))
    }

    async fn astronomer_exists(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.read()?.astronomers.contains_key(&id))
    }

    async fn find_astronomer_by_name(
        &self,
        first: &str,
        last: &str,
    ) -> Result<Option<i64>, AppError> {
        let t = self.read()?;
        Ok(t.astronomers
            .values()
            .find(|a| a.first_name == first && a.last_name == last)
            .map(|a| a.id))
    }

    async fn list_astronomers(
        &self,
        filter: &AstronomerFilter,
        page: Page,
    ) -> Result<Vec<AstronomerRead>, AppError> {
        let t = self.read()?;
        let rows = t.astronomers.values().filter(|a| filter.matches(a));
        Ok(page_of(rows, page).into_iter().map(|a| t.astronomer_read(a)).collect())
    }

    async fn update_astronomer(
        &self,
        id: i64,
        changes: &AstronomerUpdate,
    ) -> Result<bool, AppError> {
        let mut t = self.write()?;
        let Some(mut astronomer) = t.astronomers.get(&id).cloned() else {
            return Ok(false);
        };
        changes.apply(&mut astronomer);
        if t.astronomer_name_taken(&astronomer.first_name, &astronomer.last_name, Some(id)) {
            return Err(AppError::Conflict("astronomer with this name already exists".into()));
        }
        astronomer.updated_at = Utc::now();
        t.astronomers.insert(id, astronomer);
        Ok(true)
    }

    async fn delete_astronomer(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.write()?;
        if t.astronomers.remove(&id).is_none() {
            return Ok(false);
        }
        t.observations.retain(|_, o| o.astronomer_id != id);
        Ok(true)
    }

    async fn astronomer_statistics(&self) -> Result<AstronomerStatistics, AppError> {
        let t = self.read()?;
        let mut by_country = BTreeMap::new();
        for country in t.astronomers.values().filter_map(|a| a.country.clone()) {
            *by_country.entry(country).or_insert(0) += 1;
        }
        Ok(AstronomerStatistics::from_counts(
            t.astronomers.len() as i64,
            t.astronomers.values().filter(|a| a.is_active).count() as i64,
            by_country,
            t.observations.len() as i64,
        ))
    }

    async fn insert_observation(&self, new: &ObservationCreate) -> Result<i64, AppError> {
        let mut t = self.write()?;
        t.require_astronomer(new.astronomer_id)?;
        t.require_body(new.celestial_body_id)?;
        t.last_observation_id += 1;
        let id = t.last_observation_id;
        let now = Utc::now();
        t.observations.insert(
            id,
            Observation {
                id,
                astronomer_id: new.astronomer_id,
                celestial_body_id: new.celestial_body_id,
                observation_date: new.observation_date,
                location: new.location.clone(),
                equipment: new.equipment.clone(),
                duration_minutes: new.duration_minutes,
                weather_conditions: new.weather_conditions.clone(),
                notes: new.notes.clone(),
                data: new.data.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn get_observation(&self, id: i64) -> Result<Option<ObservationRead>, AppError> {
        let t = self.read()?;
        Ok(t.observations.get(&id).and_then(|o| t.observation_read(o)))
    }

    async fn list_observations(
        &self,
        filter: &ObservationFilter,
        page: Page,
    ) -> Result<Vec<ObservationRead>, AppError> {
        let t = self.read()?;
        let rows = t
            .observations
            .values()
            .filter(|o| filter.matches(o))
            .filter_map(|o| t.observation_read(o));
        Ok(page_of(rows, page))
    }

    async fn update_observation(
        &self,
        id: i64,
        changes: &ObservationUpdate,
    ) -> Result<bool, AppError> {
        let mut t = self.write()?;
        let Some(observation) = t.observations.get_mut(&id) else {
            return Ok(false);
        };
        changes.apply(observation);
        observation.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete_observation(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.write()?.observations.remove(&id).is_some())
    }

    async fn insert_user(&self, new: &NewUser) -> Result<User, AppError> {
        let mut t = self.write()?;
        if t.users.values().any(|u| u.username == new.username) {
            return Err(AppError::Conflict("username already registered".into()));
        }
        if t.users.values().any(|u| u.email == new.email) {
            return Err(AppError::Conflict("email already registered".into()));
        }
        t.last_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: t.last_user_id,
            username: new.username.clone(),
            email: new.email.clone(),
            hashed_password: new.hashed_password.clone(),
            full_name: new.full_name.clone(),
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let t = self.read()?;
        Ok(t.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let t = self.read()?;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.write()?.users.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BodyType;

    fn body(name: &str, parent_id: Option<i64>) -> CelestialBodyCreate {
        CelestialBodyCreate {
            name: name.into(),
            body_type: BodyType::Planet,
            mass: None,
            radius: None,
            temperature: None,
            distance: Some(1.0),
            apparent_magnitude: None,
            absolute_magnitude: None,
            spectral_class: None,
            right_ascension: None,
            declination: None,
            description: None,
            parent_id,
        }
    }

    fn astronomer(first: &str, last: &str) -> AstronomerCreate {
        AstronomerCreate {
            first_name: first.into(),
            last_name: last.into(),
            email: None,
            institution: None,
            country: Some("USA".into()),
            birth_date: None,
            specialization: None,
            biography: None,
            is_active: true,
        }
    }

    fn observation(astronomer_id: i64, celestial_body_id: i64) -> ObservationCreate {
        ObservationCreate {
            astronomer_id,
            celestial_body_id,
            observation_date: Utc::now(),
            location: None,
            equipment: None,
            duration_minutes: Some(30),
            weather_conditions: None,
            notes: None,
            data: None,
        }
    }

    #[tokio::test]
    async fn duplicate_body_name_conflicts() {
        let store = MemoryStore::new();
        store.insert_body(&body("Mars", None)).await.unwrap();
        let err = store.insert_body(&body("Mars", None)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        store.insert_body(&body("mars", None)).await.unwrap();
    }

    #[tokio::test]
    async fn derived_fields_follow_relationships() {
        let store = MemoryStore::new();
        let sun = store.insert_body(&body("Sun", None)).await.unwrap();
        let earth = store.insert_body(&body("Earth", Some(sun))).await.unwrap();
        let a = store.insert_astronomer(&astronomer("Vera", "Rubin")).await.unwrap();
        let b = store.insert_astronomer(&astronomer("Annie", "Cannon")).await.unwrap();
        store.insert_observation(&observation(a, sun)).await.unwrap();
        store.insert_observation(&observation(a, sun)).await.unwrap();
        store.insert_observation(&observation(b, sun)).await.unwrap();

        let read = store.get_body(sun).await.unwrap().unwrap();
        assert_eq!(read.children_count, 1);
        assert_eq!(read.observations_count, 3);
        assert_eq!(read.observers, vec!["Annie Cannon", "Vera Rubin"]);
        let child = store.get_body(earth).await.unwrap().unwrap();
        assert_eq!(child.parent_name.as_deref(), Some("Sun"));

        let vera = store.get_astronomer(a).await.unwrap().unwrap();
        assert_eq!(vera.observations_count, 2);
        assert_eq!(vera.observed_bodies_count, 1);
    }

    #[tokio::test]
    async fn observers_sort_bytewise() {
        let store = MemoryStore::new();
        let sun = store.insert_body(&body("Sun", None)).await.unwrap();
        for (first, last) in [("annie", "cannon"), ("Vera", "Rubin"), ("Annie", "Cannon")] {
            let id = store.insert_astronomer(&astronomer(first, last)).await.unwrap();
            store.insert_observation(&observation(id, sun)).await.unwrap();
        }
        let read = store.get_body(sun).await.unwrap().unwrap();
        assert_eq!(read.observers, vec!["Annie Cannon", "Vera Rubin", "annie cannon"]);
    }

    #[tokio::test]
    async fn deleting_body_orphans_children_and_drops_observations() {
        let store = MemoryStore::new();
        let sun = store.insert_body(&body("Sun", None)).await.unwrap();
        let earth = store.insert_body(&body("Earth", Some(sun))).await.unwrap();
        let a = store.insert_astronomer(&astronomer("Vera", "Rubin")).await.unwrap();
        let obs = store.insert_observation(&observation(a, sun)).await.unwrap();

        assert!(store.delete_body(sun).await.unwrap());
        assert_eq!(store.body_parent(earth).await.unwrap(), Some(None));
        assert!(store.get_observation(obs).await.unwrap().is_none());
        assert!(!store.delete_body(sun).await.unwrap());
    }

    #[tokio::test]
    async fn observation_requires_existing_references() {
        let store = MemoryStore::new();
        let a = store.insert_astronomer(&astronomer("Vera", "Rubin")).await.unwrap();
        let err = store.insert_observation(&observation(a, 99)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn pagination_skips_then_limits() {
        let store = MemoryStore::new();
        for i in 0..15 {
            store.insert_body(&body(&format!("Body {i}"), None)).await.unwrap();
        }
        let filter = BodyFilter::default();
        let first = store.list_bodies(&filter, Page::new(Some(0), Some(10))).await.unwrap();
        let rest = store.list_bodies(&filter, Page::new(Some(10), Some(10))).await.unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(rest.len(), 5);
        assert_eq!(rest[0].body.name, "Body 10");
    }

    #[tokio::test]
    async fn statistics_group_and_summarize() {
        let store = MemoryStore::new();
        store.insert_body(&body("Mars", None)).await.unwrap();
        let mut star = body("Vega", None);
        star.body_type = BodyType::Star;
        star.distance = Some(25.0);
        store.insert_body(&star).await.unwrap();

        let stats = store.body_statistics().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.by_type.get("planet"), Some(&1));
        assert_eq!(stats.by_type.get("star"), Some(&1));
        assert_eq!(stats.distance.max, Some(25.0));
        assert_eq!(stats.apparent_magnitude.avg, None);
    }
}
