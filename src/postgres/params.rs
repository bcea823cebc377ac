use std::error::Error;

use chrono::{DateTime, Utc};
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes;

use crate::types::RowValues;

/// Container for Postgres parameters with lifetime tracking
pub struct Params<'a> {
    references: Vec<&'a (dyn ToSql + Sync)>,
}

impl<'a> Params<'a> {
    /// Convert from a slice of `RowValues` to Postgres parameters
    #[must_use]
    pub fn convert(params: &'a [RowValues]) -> Params<'a> {
        let mut references = Vec::with_capacity(params.len());
        for p in params {
            references.push(p as &(dyn ToSql + Sync));
        }
        Params { references }
    }

    /// Get a reference to the underlying parameter array
    #[must_use]
    pub fn as_refs(&self) -> &[&(dyn ToSql + Sync)] {
        &self.references
    }
}

fn narrow<T: TryFrom<i64>>(value: i64, ty: &Type) -> Result<T, Box<dyn Error + Sync + Send>> {
    T::try_from(value).map_err(|_| format!("integer {value} out of range for {ty}").into())
}

impl ToSql for RowValues {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            // Ids are BIGINT, but the wire format must still match whatever
            // width the server inferred for the placeholder.
            RowValues::Int(i) => match *ty {
                Type::INT2 => narrow::<i16>(*i, ty)?.to_sql(ty, out),
                Type::INT4 => narrow::<i32>(*i, ty)?.to_sql(ty, out),
                _ => (*i).to_sql(ty, out),
            },
            #[allow(clippy::cast_possible_truncation)]
            RowValues::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                _ => (*f).to_sql(ty, out),
            },
            RowValues::Text(s) => s.to_sql(ty, out),
            RowValues::Bool(b) => (*b).to_sql(ty, out),
            RowValues::Timestamp(dt) => match *ty {
                Type::TIMESTAMPTZ => DateTime::<Utc>::from_naive_utc_and_offset(*dt, Utc).to_sql(ty, out),
                _ => dt.to_sql(ty, out),
            },
            RowValues::Null => Ok(IsNull::Yes),
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::TEXT
                | Type::VARCHAR
                | Type::CHAR
                | Type::BPCHAR
                | Type::NAME
                | Type::BOOL
                | Type::TIMESTAMP
                | Type::TIMESTAMPTZ
        )
    }

    to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ints_narrow_to_the_inferred_width() {
        let mut out = bytes::BytesMut::new();
        RowValues::Int(42).to_sql(&Type::INT4, &mut out).unwrap();
        assert_eq!(out.len(), 4);

        out.clear();
        RowValues::Int(42).to_sql(&Type::INT8, &mut out).unwrap();
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn out_of_range_int_is_an_error() {
        let mut out = bytes::BytesMut::new();
        let res = RowValues::Int(i64::from(i32::MAX) + 1).to_sql(&Type::INT4, &mut out);
        assert!(res.is_err());
    }

    #[test]
    fn null_binds_as_null() {
        let mut out = bytes::BytesMut::new();
        let res = RowValues::Null.to_sql(&Type::TEXT, &mut out).unwrap();
        assert!(matches!(res, IsNull::Yes));
    }

    #[test]
    fn convert_keeps_order() {
        let values = vec![RowValues::Int(1), RowValues::Text("x".into())];
        let params = Params::convert(&values);
        assert_eq!(params.as_refs().len(), 2);
    }
}
