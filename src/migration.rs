//! Catalog DDL: enum type, tables, foreign keys, and indexes. Every statement is idempotent so
//! start-up can apply it unconditionally.

use crate::error::AppError;
use sqlx::PgPool;

const CREATE_BODY_TYPE: &str = r#"
DO $$ BEGIN
    CREATE TYPE celestial_body_type AS ENUM
        ('planet', 'star', 'galaxy', 'nebula', 'comet', 'asteroid', 'black_hole');
EXCEPTION
    WHEN duplicate_object THEN NULL;
END $$
"#;

const CREATE_BODIES: &str = r#"
CREATE TABLE IF NOT EXISTS celestial_bodies (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL UNIQUE,
    body_type celestial_body_type NOT NULL,
    mass DOUBLE PRECISION,
    radius DOUBLE PRECISION,
    temperature DOUBLE PRECISION,
    distance DOUBLE PRECISION,
    apparent_magnitude DOUBLE PRECISION,
    absolute_magnitude DOUBLE PRECISION,
    spectral_class VARCHAR(10),
    right_ascension DOUBLE PRECISION,
    declination DOUBLE PRECISION,
    description TEXT,
    parent_id BIGINT REFERENCES celestial_bodies(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_ASTRONOMERS: &str = r#"
CREATE TABLE IF NOT EXISTS astronomers (
    id BIGSERIAL PRIMARY KEY,
    first_name VARCHAR(50) NOT NULL,
    last_name VARCHAR(50) NOT NULL,
    email VARCHAR(255),
    institution VARCHAR(200),
    country VARCHAR(100),
    birth_date DATE,
    specialization VARCHAR(200),
    biography TEXT,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_astronomers_name UNIQUE (first_name, last_name)
)
"#;

const CREATE_OBSERVATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS observations (
    id BIGSERIAL PRIMARY KEY,
    astronomer_id BIGINT NOT NULL REFERENCES astronomers(id) ON DELETE CASCADE,
    celestial_body_id BIGINT NOT NULL REFERENCES celestial_bodies(id) ON DELETE CASCADE,
    observation_date TIMESTAMPTZ NOT NULL,
    location VARCHAR(200),
    equipment VARCHAR(200),
    duration_minutes INTEGER,
    weather_conditions VARCHAR(200),
    notes TEXT,
    data JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id BIGSERIAL PRIMARY KEY,
    username VARCHAR(50) NOT NULL UNIQUE,
    email VARCHAR(255) NOT NULL UNIQUE,
    hashed_password VARCHAR(255) NOT NULL,
    full_name VARCHAR(100),
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// (index name, table, column list).
const INDEXES: &[(&str, &str, &str)] = &[
    ("ix_celestial_bodies_name", "celestial_bodies", "name"),
    ("ix_celestial_bodies_type_distance", "celestial_bodies", "body_type, distance"),
    ("ix_celestial_bodies_magnitude", "celestial_bodies", "apparent_magnitude"),
    ("ix_observations_date", "observations", "observation_date"),
    ("ix_observations_astronomer_body", "observations", "astronomer_id, celestial_body_id"),
];

fn index_ddl(name: &str, table: &str, columns: &str) -> String {
    format!("CREATE INDEX IF NOT EXISTS {} ON {} ({})", name, table, columns)
}

/// Create the catalog schema. Order follows the foreign key dependencies.
pub async fn apply_migrations(pool: &PgPool) -> Result<(), AppError> {
    for ddl in [
        CREATE_BODY_TYPE,
        CREATE_BODIES,
        CREATE_ASTRONOMERS,
        CREATE_OBSERVATIONS,
        CREATE_USERS,
    ] {
        sqlx::query(ddl).execute(pool).await?;
    }
    for (name, table, columns) in INDEXES {
        sqlx::query(&index_ddl(name, table, columns))
            .execute(pool)
            .await?;
    }
    tracing::info!("catalog schema is up to date");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_statements_are_idempotent() {
        assert_eq!(
            index_ddl("ix_observations_date", "observations", "observation_date"),
            "CREATE INDEX IF NOT EXISTS ix_observations_date ON observations (observation_date)"
        );
        assert_eq!(INDEXES.len(), 5);
    }

    #[test]
    fn enum_lists_every_body_type() {
        for t in crate::schema::BodyType::ALL {
            assert!(CREATE_BODY_TYPE.contains(&format!("'{}'", t.as_str())));
        }
    }
}
