//! Builds parameterized statements. Identifiers come from code only; values are always
//! bound as parameters.

use super::PgBindValue;
use crate::filter::{AstronomerFilter, BodyFilter, ObservationFilter, Page};

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    pub fn new(sql: impl Into<String>) -> Self {
        QueryBuf {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Register a parameter and return its placeholder (`$n`).
    pub fn push_param(&mut self, v: impl Into<PgBindValue>) -> String {
        self.params.push(v.into());
        format!("${}", self.params.len())
    }

    /// Append `WHERE a AND b ...` when there are conditions.
    pub fn push_where(&mut self, conditions: &[String]) {
        if !conditions.is_empty() {
            self.sql.push_str(" WHERE ");
            self.sql.push_str(&conditions.join(" AND "));
        }
    }

    /// Append `ORDER BY <alias>.id LIMIT .. OFFSET ..`.
    pub fn push_page(&mut self, alias: &str, page: Page) {
        self.sql.push_str(&format!(
            " ORDER BY {}.id LIMIT {} OFFSET {}",
            alias, page.limit, page.skip
        ));
    }
}

/// Escape LIKE metacharacters so user input matches literally (default `\` escape).
pub fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn contains_pattern(s: &str) -> String {
    format!("%{}%", escape_like(s))
}

pub fn body_conditions(q: &mut QueryBuf, f: &BodyFilter, alias: &str) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(s) = &f.search {
        let ph = q.push_param(contains_pattern(s));
        parts.push(format!("{}.name ILIKE {}", alias, ph));
    }
    if let Some(t) = f.body_type {
        let ph = q.push_param(t.as_str());
        parts.push(format!("{}.body_type = {}::celestial_body_type", alias, ph));
    }
    if let Some(v) = f.min_distance {
        let ph = q.push_param(v);
        parts.push(format!("{}.distance >= {}", alias, ph));
    }
    if let Some(v) = f.max_distance {
        let ph = q.push_param(v);
        parts.push(format!("{}.distance <= {}", alias, ph));
    }
    if let Some(v) = f.min_magnitude {
        let ph = q.push_param(v);
        parts.push(format!("{}.apparent_magnitude >= {}", alias, ph));
    }
    if let Some(v) = f.max_magnitude {
        let ph = q.push_param(v);
        parts.push(format!("{}.apparent_magnitude <= {}", alias, ph));
    }
    if let Some(s) = &f.spectral_class {
        let ph = q.push_param(s.as_str());
        parts.push(format!("{}.spectral_class = {}", alias, ph));
    }
    parts
}

pub fn astronomer_conditions(q: &mut QueryBuf, f: &AstronomerFilter, alias: &str) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(s) = &f.search {
        let ph = q.push_param(contains_pattern(s));
        parts.push(format!(
            "({a}.first_name ILIKE {p} OR {a}.last_name ILIKE {p} OR {a}.institution ILIKE {p})",
            a = alias,
            p = ph
        ));
    }
    if let Some(v) = f.is_active {
        let ph = q.push_param(v);
        parts.push(format!("{}.is_active = {}", alias, ph));
    }
    if let Some(c) = &f.country {
        let ph = q.push_param(c.as_str());
        parts.push(format!("{}.country = {}", alias, ph));
    }
    parts
}

pub fn observation_conditions(q: &mut QueryBuf, f: &ObservationFilter, alias: &str) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(id) = f.astronomer_id {
        let ph = q.push_param(id);
        parts.push(format!("{}.astronomer_id = {}", alias, ph));
    }
    if let Some(id) = f.celestial_body_id {
        let ph = q.push_param(id);
        parts.push(format!("{}.celestial_body_id = {}", alias, ph));
    }
    if let Some(d) = f.date_from {
        let ph = q.push_param(d);
        parts.push(format!("{}.observation_date >= {}", alias, ph));
    }
    if let Some(d) = f.date_to {
        let ph = q.push_param(d);
        parts.push(format!("{}.observation_date <= {}", alias, ph));
    }
    parts
}

/// One `column = value` pair for INSERT or UPDATE. `cast` names a SQL type for the
/// placeholder (needed for the body type enum).
#[derive(Clone, Debug)]
pub struct Assignment {
    pub column: &'static str,
    pub value: PgBindValue,
    pub cast: Option<&'static str>,
}

impl Assignment {
    pub fn new(column: &'static str, value: impl Into<PgBindValue>) -> Self {
        Assignment {
            column,
            value: value.into(),
            cast: None,
        }
    }

    pub fn cast(mut self, ty: &'static str) -> Self {
        self.cast = Some(ty);
        self
    }

    fn placeholder(&self, q: &mut QueryBuf) -> String {
        let ph = q.push_param(self.value.clone());
        match self.cast {
            Some(t) => format!("{}::{}", ph, t),
            None => ph,
        }
    }
}

/// INSERT returning the new id.
pub fn insert(table: &str, values: &[Assignment]) -> QueryBuf {
    let mut q = QueryBuf::new("");
    let mut cols = Vec::with_capacity(values.len());
    let mut placeholders = Vec::with_capacity(values.len());
    for a in values {
        cols.push(a.column);
        placeholders.push(a.placeholder(&mut q));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING id",
        table,
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

/// UPDATE by id: sets the given columns and refreshes `updated_at`. Returns the id, so no
/// row means the id does not exist.
pub fn update_by_id(table: &str, id: i64, changes: &[Assignment]) -> QueryBuf {
    let mut q = QueryBuf::new("");
    let mut sets: Vec<String> = changes
        .iter()
        .map(|a| format!("{} = {}", a.column, a.placeholder(&mut q)))
        .collect();
    sets.push("updated_at = NOW()".into());
    let id_ph = q.push_param(id);
    q.sql = format!(
        "UPDATE {} SET {} WHERE id = {} RETURNING id",
        table,
        sets.join(", "),
        id_ph
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BodyType;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(contains_pattern("M31"), "%M31%");
    }

    #[test]
    fn empty_filter_adds_no_where() {
        let mut q = QueryBuf::new("SELECT b.id FROM celestial_bodies b");
        let conds = body_conditions(&mut q, &BodyFilter::default(), "b");
        q.push_where(&conds);
        q.push_page("b", Page::default());
        assert_eq!(
            q.sql,
            "SELECT b.id FROM celestial_bodies b ORDER BY b.id LIMIT 100 OFFSET 0"
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn body_filter_predicates_are_numbered_in_order() {
        let f = BodyFilter {
            search: Some("alpha".into()),
            body_type: Some(BodyType::Star),
            max_distance: Some(10.0),
            ..Default::default()
        };
        let mut q = QueryBuf::new("SELECT b.id FROM celestial_bodies b");
        let conds = body_conditions(&mut q, &f, "b");
        q.push_where(&conds);
        assert_eq!(
            q.sql,
            "SELECT b.id FROM celestial_bodies b WHERE b.name ILIKE $1 \
             AND b.body_type = $2::celestial_body_type AND b.distance <= $3"
        );
        assert_eq!(q.params[0], PgBindValue::from("%alpha%"));
        assert_eq!(q.params[2], PgBindValue::from(10.0));
    }

    #[test]
    fn astronomer_search_reuses_one_parameter() {
        let f = AstronomerFilter {
            search: Some("palomar".into()),
            is_active: Some(true),
            ..Default::default()
        };
        let mut q = QueryBuf::new("");
        let conds = astronomer_conditions(&mut q, &f, "a");
        assert_eq!(
            conds,
            vec![
                "(a.first_name ILIKE $1 OR a.last_name ILIKE $1 OR a.institution ILIKE $1)".to_string(),
                "a.is_active = $2".to_string(),
            ]
        );
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn update_sets_timestamp_and_binds_id_last() {
        let q = update_by_id(
            "celestial_bodies",
            7,
            &[
                Assignment::new("mass", None::<f64>),
                Assignment::new("body_type", "comet").cast("celestial_body_type"),
            ],
        );
        assert_eq!(
            q.sql,
            "UPDATE celestial_bodies SET mass = $1, body_type = $2::celestial_body_type, \
             updated_at = NOW() WHERE id = $3 RETURNING id"
        );
        assert_eq!(q.params[2], PgBindValue::I64(Some(7)));
    }

    #[test]
    fn insert_lists_columns_in_order() {
        let q = insert(
            "users",
            &[Assignment::new("username", "hubble"), Assignment::new("is_active", true)],
        );
        assert_eq!(
            q.sql,
            "INSERT INTO users (username, is_active) VALUES ($1, $2) RETURNING id"
        );
    }
}
