//! PostgreSQL store. Derived read fields are computed with correlated subqueries so each
//! read is a single round trip.

use super::CatalogStore;
use crate::error::AppError;
use crate::filter::{AstronomerFilter, BodyFilter, ObservationFilter, Page};
use crate::schema::{
    AstronomerCreate, AstronomerRead, AstronomerStatistics, AstronomerUpdate, BodyStatistics,
    CelestialBodyCreate, CelestialBodyRead, CelestialBodyUpdate, NewUser, NumericSummary,
    ObservationCreate, ObservationRead, ObservationUpdate, User,
};
use crate::sql::{
    astronomer_conditions, body_conditions, insert, observation_conditions, update_by_id,
    Assignment, QueryBuf,
};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use std::collections::BTreeMap;

const BODY_TYPE: &str = "celestial_body_type";

const SELECT_BODY: &str = "SELECT b.id, b.name, b.body_type, b.mass, b.radius, b.temperature, \
    b.distance, b.apparent_magnitude, b.absolute_magnitude, b.spectral_class, \
    b.right_ascension, b.declination, b.description, b.parent_id, b.created_at, b.updated_at, \
    p.name AS parent_name, \
    (SELECT COUNT(*) FROM celestial_bodies c WHERE c.parent_id = b.id) AS children_count, \
    (SELECT COUNT(*) FROM observations o WHERE o.celestial_body_id = b.id) AS observations_count, \
    ARRAY(SELECT DISTINCT (a.first_name || ' ' || a.last_name) COLLATE \"C\" FROM observations o \
        JOIN astronomers a ON a.id = o.astronomer_id \
        WHERE o.celestial_body_id = b.id ORDER BY 1) AS observers \
    FROM celestial_bodies b LEFT JOIN celestial_bodies p ON p.id = b.parent_id";

const SELECT_ASTRONOMER: &str = "SELECT a.id, a.first_name, a.last_name, a.email, \
    a.institution, a.country, a.birth_date, a.specialization, a.biography, a.is_active, \
    a.created_at, a.updated_at, \
    a.first_name || ' ' || a.last_name AS full_name, \
    (SELECT COUNT(*) FROM observations o WHERE o.astronomer_id = a.id) AS observations_count, \
    (SELECT COUNT(DISTINCT o.celestial_body_id) FROM observations o \
        WHERE o.astronomer_id = a.id) AS observed_bodies_count \
    FROM astronomers a";

const SELECT_OBSERVATION: &str = "SELECT o.id, o.astronomer_id, o.celestial_body_id, \
    o.observation_date, o.location, o.equipment, o.duration_minutes, o.weather_conditions, \
    o.notes, o.data, o.created_at, o.updated_at, \
    a.first_name || ' ' || a.last_name AS astronomer_name, \
    b.name AS celestial_body_name \
    FROM observations o \
    JOIN astronomers a ON a.id = o.astronomer_id \
    JOIN celestial_bodies b ON b.id = o.celestial_body_id";

const SELECT_USER: &str = "SELECT id, username, email, hashed_password, full_name, is_active, \
    created_at, updated_at FROM users";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_all<T>(&self, q: &QueryBuf) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        tracing::debug!(sql = %q.sql, "query");
        let mut query = sqlx::query_as::<_, T>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn fetch_optional<T>(&self, q: &QueryBuf) -> Result<Option<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        tracing::debug!(sql = %q.sql, "query");
        let mut query = sqlx::query_as::<_, T>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_optional(&self.pool).await?)
    }

    /// Run an INSERT .. RETURNING id.
    async fn insert_returning_id(&self, q: &QueryBuf) -> Result<i64, AppError> {
        let row: Option<(i64,)> = self.fetch_optional(q).await?;
        row.map(|(id,)| id)
            .ok_or_else(|| AppError::Internal("insert returned no id".into()))
    }

    /// Run an UPDATE .. RETURNING id; false when no row matched.
    async fn update_returning_id(&self, q: &QueryBuf) -> Result<bool, AppError> {
        let row: Option<(i64,)> = self.fetch_optional(q).await?;
        Ok(row.is_some())
    }

    async fn delete_by_id(&self, table: &str, id: i64) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", table);
        tracing::debug!(sql = %sql, "query");
        let done = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(done.rows_affected() > 0)
    }

    async fn by_id<T>(&self, select: &str, alias: &str, id: i64) -> Result<Option<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut q = QueryBuf::new(select);
        let ph = q.push_param(id);
        q.sql.push_str(&format!(" WHERE {}.id = {}", alias, ph));
        self.fetch_optional(&q).await
    }

    async fn user_by(&self, column: &str, value: &str) -> Result<Option<User>, AppError> {
        let sql = format!("{} WHERE {} = $1", SELECT_USER, column);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn summary(&self, column: &str) -> Result<NumericSummary, AppError> {
        let sql = format!(
            "SELECT AVG({c}), MIN({c}), MAX({c}) FROM celestial_bodies",
            c = column
        );
        let (avg, min, max): (Option<f64>, Option<f64>, Option<f64>) =
            sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(NumericSummary { avg, min, max })
    }
}

fn body_assignments(new: &CelestialBodyCreate) -> Vec<Assignment> {
    vec![
        Assignment::new("name", new.name.as_str()),
        Assignment::new("body_type", new.body_type.as_str()).cast(BODY_TYPE),
        Assignment::new("mass", new.mass),
        Assignment::new("radius", new.radius),
        Assignment::new("temperature", new.temperature),
        Assignment::new("distance", new.distance),
        Assignment::new("apparent_magnitude", new.apparent_magnitude),
        Assignment::new("absolute_magnitude", new.absolute_magnitude),
        Assignment::new("spectral_class", new.spectral_class.clone()),
        Assignment::new("right_ascension", new.right_ascension),
        Assignment::new("declination", new.declination),
        Assignment::new("description", new.description.clone()),
        Assignment::new("parent_id", new.parent_id),
    ]
}

/// Assignment for each present field of a partial update.
macro_rules! changed {
    ($changes:expr, $out:ident; $($field:ident),* $(,)?) => {
        $(if let Some(v) = &$changes.$field {
            $out.push(Assignment::new(stringify!($field), v.clone()));
        })*
    };
}

fn body_changes(changes: &CelestialBodyUpdate) -> Vec<Assignment> {
    let mut out = Vec::new();
    changed!(changes, out; name);
    if let Some(t) = changes.body_type {
        out.push(Assignment::new("body_type", t.as_str()).cast(BODY_TYPE));
    }
    changed!(changes, out;
        mass, radius, temperature, distance, apparent_magnitude, absolute_magnitude,
        spectral_class, right_ascension, declination, description, parent_id);
    out
}

fn astronomer_changes(changes: &AstronomerUpdate) -> Vec<Assignment> {
    let mut out = Vec::new();
    changed!(changes, out;
        first_name, last_name, email, institution, country, birth_date, specialization,
        biography, is_active);
    out
}

fn observation_changes(changes: &ObservationUpdate) -> Vec<Assignment> {
    let mut out = Vec::new();
    changed!(changes, out;
        observation_date, location, equipment, duration_minutes, weather_conditions, notes,
        data);
    out
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_body(&self, new: &CelestialBodyCreate) -> Result<i64, AppError> {
        let q = insert("celestial_bodies", &body_assignments(new));
        self.insert_returning_id(&q).await
    }

    async fn get_body(&self, id: i64) -> Result<Option<CelestialBodyRead>, AppError> {
        self.by_id(SELECT_BODY, "b", id).await
    }

    async fn find_body_by_name(&self, name: &str) -> Result<Option<i64>, AppError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM celestial_bodies WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(id,)| id))
    }

    async fn list_bodies(
        &self,
        filter: &BodyFilter,
        page: Page,
    ) -> Result<Vec<CelestialBodyRead>, AppError> {
        let mut q = QueryBuf::new(SELECT_BODY);
        let conditions = body_conditions(&mut q, filter, "b");
        q.push_where(&conditions);
        q.push_page("b", page);
        self.fetch_all(&q).await
    }

    async fn update_body(&self, id: i64, changes: &CelestialBodyUpdate) -> Result<bool, AppError> {
        let q = update_by_id("celestial_bodies", id, &body_changes(changes));
        self.update_returning_id(&q).await
    }

    async fn delete_body(&self, id: i64) -> Result<bool, AppError> {
        // children: ON DELETE SET NULL; observations: ON DELETE CASCADE
        self.delete_by_id("celestial_bodies", id).await
    }

    async fn body_parent(&self, id: i64) -> Result<Option<Option<i64>>, AppError> {
        let row: Option<(Option<i64>,)> =
            sqlx::query_as("SELECT parent_id FROM celestial_bodies WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(parent,)| parent))
    }

    async fn body_statistics(&self) -> Result<BodyStatistics, AppError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM celestial_bodies")
            .fetch_one(&self.pool)
            .await?;
        let by_type: Vec<(String, i64)> = sqlx::query_as(
            "SELECT body_type::text, COUNT(*) FROM celestial_bodies GROUP BY body_type",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(BodyStatistics {
            total,
            by_type: by_type.into_iter().collect(),
            distance: self.summary("distance").await?,
            apparent_magnitude: self.summary("apparent_magnitude").await?,
        })
    }

    async fn insert_astronomer(&self, new: &AstronomerCreate) -> Result<i64, AppError> {
        let q = insert(
            "astronomers",
            &[
                Assignment::new("first_name", new.first_name.as_str()),
                Assignment::new("last_name", new.last_name.as_str()),
                Assignment::new("email", new.email.clone()),
                Assignment::new("institution", new.institution.clone()),
                Assignment::new("country", new.country.clone()),
                Assignment::new("birth_date", new.birth_date),
                Assignment::new("specialization", new.specialization.clone()),
                Assignment::new("biography", new.biography.clone()),
                Assignment::new("is_active", new.is_active),
            ],
        );
        self.insert_returning_id(&q).await
    }

    async fn get_astronomer(&self, id: i64) -> Result<Option<AstronomerRead>, AppError> {
        self.by_id(SELECT_ASTRONOMER, "a", id).await
    }

    async fn astronomer_exists(&self, id: i64) -> Result<bool, AppError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM astronomers WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn find_astronomer_by_name(
        &self,
        first: &str,
        last: &str,
    ) -> Result<Option<i64>, AppError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM astronomers WHERE first_name = $1 AND last_name = $2",
        )
        .bind(first)
        .bind(last)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(id,)| id))
    }

    async fn list_astronomers(
        &self,
        filter: &AstronomerFilter,
        page: Page,
    ) -> Result<Vec<AstronomerRead>, AppError> {
        let mut q = QueryBuf::new(SELECT_ASTRONOMER);
        let conditions = astronomer_conditions(&mut q, filter, "a");
        q.push_where(&conditions);
        q.push_page("a", page);
        self.fetch_all(&q).await
    }

    async fn update_astronomer(
        &self,
        id: i64,
        changes: &AstronomerUpdate,
    ) -> Result<bool, AppError> {
        let q = update_by_id("astronomers", id, &astronomer_changes(changes));
        self.update_returning_id(&q).await
    }

    async fn delete_astronomer(&self, id: i64) -> Result<bool, AppError> {
        self.delete_by_id("astronomers", id).await
    }

    async fn astronomer_statistics(&self) -> Result<AstronomerStatistics, AppError> {
        let (total, active): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active) FROM astronomers",
        )
        .fetch_one(&self.pool)
        .await?;
        let by_country: Vec<(String, i64)> = sqlx::query_as(
            "SELECT country, COUNT(*) FROM astronomers WHERE country IS NOT NULL GROUP BY country",
        )
        .fetch_all(&self.pool)
        .await?;
        let (total_observations,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM observations")
            .fetch_one(&self.pool)
            .await?;
        Ok(AstronomerStatistics::from_counts(
            total,
            active,
            by_country.into_iter().collect::<BTreeMap<_, _>>(),
            total_observations,
        ))
    }

    async fn insert_observation(&self, new: &ObservationCreate) -> Result<i64, AppError> {
        let q = insert(
            "observations",
            &[
                Assignment::new("astronomer_id", new.astronomer_id),
                Assignment::new("celestial_body_id", new.celestial_body_id),
                Assignment::new("observation_date", new.observation_date),
                Assignment::new("location", new.location.clone()),
                Assignment::new("equipment", new.equipment.clone()),
                Assignment::new("duration_minutes", new.duration_minutes),
                Assignment::new("weather_conditions", new.weather_conditions.clone()),
                Assignment::new("notes", new.notes.clone()),
                Assignment::new("data", new.data.clone()),
            ],
        );
        self.insert_returning_id(&q).await
    }

    async fn get_observation(&self, id: i64) -> Result<Option<ObservationRead>, AppError> {
        self.by_id(SELECT_OBSERVATION, "o", id).await
    }

    async fn list_observations(
        &self,
        filter: &ObservationFilter,
        page: Page,
    ) -> Result<Vec<ObservationRead>, AppError> {
        let mut q = QueryBuf::new(SELECT_OBSERVATION);
        let conditions = observation_conditions(&mut q, filter, "o");
        q.push_where(&conditions);
        q.push_page("o", page);
        self.fetch_all(&q).await
    }

    async fn update_observation(
        &self,
        id: i64,
        changes: &ObservationUpdate,
    ) -> Result<bool, AppError> {
        let q = update_by_id("observations", id, &observation_changes(changes));
        self.update_returning_id(&q).await
    }

    async fn delete_observation(&self, id: i64) -> Result<bool, AppError> {
        self.delete_by_id("observations", id).await
    }

    async fn insert_user(&self, new: &NewUser) -> Result<User, AppError> {
        let q = insert(
            "users",
            &[
                Assignment::new("username", new.username.as_str()),
                Assignment::new("email", new.email.as_str()),
                Assignment::new("hashed_password", new.hashed_password.as_str()),
                Assignment::new("full_name", new.full_name.clone()),
                Assignment::new("is_active", new.is_active),
            ],
        );
        let id = self.insert_returning_id(&q).await?;
        let sql = format!("{} WHERE id = $1", SELECT_USER);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.user_by("username", username).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.user_by("email", email).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        self.delete_by_id("users", id).await
    }
}
