//! Typed values that sqlx can bind into dynamically built statements.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::{Database, Type};

/// A nullable value bound to a PostgreSQL query. Each variant reports its real column type
/// so NULLs bind without an explicit cast.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Bool(Option<bool>),
    I32(Option<i32>),
    I64(Option<i64>),
    F64(Option<f64>),
    Text(Option<String>),
    Date(Option<NaiveDate>),
    Timestamp(Option<DateTime<Utc>>),
    Json(Option<Value>),
}

macro_rules! bind_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for PgBindValue {
                fn from(v: $ty) -> Self {
                    PgBindValue::$variant(Some(v.into()))
                }
            }

            impl From<Option<$ty>> for PgBindValue {
                fn from(v: Option<$ty>) -> Self {
                    PgBindValue::$variant(v.map(Into::into))
                }
            }
        )*
    };
}

bind_from! {
    bool => Bool,
    i32 => I32,
    i64 => I64,
    f64 => F64,
    String => Text,
    &str => Text,
    NaiveDate => Date,
    DateTime<Utc> => Timestamp,
    Value => Json,
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        match self {
            PgBindValue::Bool(v) => <Option<bool> as Encode<Postgres>>::encode_by_ref(v, buf),
            PgBindValue::I32(v) => <Option<i32> as Encode<Postgres>>::encode_by_ref(v, buf),
            PgBindValue::I64(v) => <Option<i64> as Encode<Postgres>>::encode_by_ref(v, buf),
            PgBindValue::F64(v) => <Option<f64> as Encode<Postgres>>::encode_by_ref(v, buf),
            PgBindValue::Text(v) => <Option<String> as Encode<Postgres>>::encode_by_ref(v, buf),
            PgBindValue::Date(v) => <Option<NaiveDate> as Encode<Postgres>>::encode_by_ref(v, buf),
            PgBindValue::Timestamp(v) => {
                <Option<DateTime<Utc>> as Encode<Postgres>>::encode_by_ref(v, buf)
            }
            PgBindValue::Json(v) => <Option<Value> as Encode<Postgres>>::encode_by_ref(v, buf),
        }
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            PgBindValue::Bool(_) => <bool as Type<Postgres>>::type_info(),
            PgBindValue::I32(_) => <i32 as Type<Postgres>>::type_info(),
            PgBindValue::I64(_) => <i64 as Type<Postgres>>::type_info(),
            PgBindValue::F64(_) => <f64 as Type<Postgres>>::type_info(),
            PgBindValue::Text(_) => <String as Type<Postgres>>::type_info(),
            PgBindValue::Date(_) => <NaiveDate as Type<Postgres>>::type_info(),
            PgBindValue::Timestamp(_) => <DateTime<Utc> as Type<Postgres>>::type_info(),
            PgBindValue::Json(_) => <Value as Type<Postgres>>::type_info(),
        })
    }
}

impl Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }

    fn compatible(_ty: &PgTypeInfo) -> bool {
        true
    }
}
