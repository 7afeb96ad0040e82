// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

use serde::de::value::BorrowedStrDeserializer;
use serde::de::{self, DeserializeOwned, DeserializeSeed, IntoDeserializer, Visitor};
use serde::{forward_to_deserialize_any, Deserializer};
use std::collections::btree_map;
use std::fmt;

use crate::{Record, Value};

/// A record deserialization specific error enum
#[derive(Debug, Clone, PartialEq)]
pub enum DeError {
    /// The field value cannot be read as the requested type
    Unexpected {
        /// Requested type
        expected: &'static str,
        /// Field value
        found: Value,
    },
    /// Serde specific error
    Custom(String),
}

impl fmt::Display for DeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DeError::Unexpected { expected, found } => {
                write!(f, "Expecting {expected}, got {found:?}")
            }
            DeError::Custom(s) => write!(f, "{s}"),
        }
    }
}

impl std::error::Error for DeError {}

impl de::Error for DeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        DeError::Custom(msg.to_string())
    }
}

/// Builds a `T` from a record, field names matching record keys.
///
/// `Value::Empty` fields are treated as absent so they fill `Option` fields
/// with `None`. The function has the constructor shape expected by
/// [`to_objects`](crate::to_objects).
///
/// # Examples
/// ```
/// use odsmap::{from_record, Record, Value};
/// use serde_derive::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Item {
///     name: String,
///     count: u32,
///     note: Option<String>,
/// }
///
/// let mut record = Record::new();
/// record.insert("name".to_string(), Value::from("bolt"));
/// record.insert("count".to_string(), Value::from("12"));
/// record.insert("note".to_string(), Value::Empty);
///
/// let item: Item = from_record(record).unwrap();
/// assert_eq!(item.name, "bolt");
/// assert_eq!(item.count, 12);
/// assert_eq!(item.note, None);
/// ```
pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T, DeError> {
    deserialize_record(&record)
}

/// Same as [`from_record`] without consuming the record
pub fn deserialize_record<T: DeserializeOwned>(record: &Record) -> Result<T, DeError> {
    T::deserialize(RecordDeserializer::new(record))
}

/// A deserializer over the fields of a [`Record`]
pub struct RecordDeserializer<'a> {
    iter: btree_map::Iter<'a, String, Value>,
    peek: Option<&'a Value>,
}

impl<'a> RecordDeserializer<'a> {
    /// Creates a new deserializer over `record`
    pub fn new(record: &'a Record) -> Self {
        RecordDeserializer {
            iter: record.iter(),
            peek: None,
        }
    }
}

impl<'de, 'a: 'de> Deserializer<'de> for RecordDeserializer<'a> {
    type Error = DeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_map(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 u8 u16 u32 u64 f32 f64 char str string bytes
        byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

impl<'de, 'a: 'de> de::MapAccess<'de> for RecordDeserializer<'a> {
    type Error = DeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        for (key, value) in self.iter.by_ref() {
            if !value.is_empty() {
                self.peek = Some(value);
                let de = BorrowedStrDeserializer::<Self::Error>::new(key);
                return seed.deserialize(de).map(Some);
            }
        }
        Ok(None)
    }

    fn next_value_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<K::Value, Self::Error> {
        let value = self
            .peek
            .take()
            .ok_or_else(|| DeError::Custom("value requested before key".to_string()))?;
        seed.deserialize(ValueDeserializer::new(value))
    }
}

macro_rules! deserialize_int {
    ($typ:ty, $method:ident, $visit:ident) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value, Self::Error>
        where
            V: Visitor<'de>,
        {
            let v = match self.value {
                Value::Int(v) => <$typ>::try_from(*v).ok(),
                // the upper bound is exclusive since `MAX as f64` may round up
                Value::Float(v)
                    if v.is_finite()
                        && *v >= <$typ>::MIN as f64
                        && *v < <$typ>::MAX as f64 + 1. =>
                {
                    Some(*v as $typ)
                }
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            };
            match v {
                Some(v) => visitor.$visit(v),
                None => Err(self.unexpected(stringify!($typ))),
            }
        }
    };
}

macro_rules! deserialize_float {
    ($typ:ty, $method:ident, $visit:ident) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value, Self::Error>
        where
            V: Visitor<'de>,
        {
            let v = match self.value {
                Value::Int(v) => Some(*v as $typ),
                Value::Float(v) if !v.is_finite() || v.abs() <= <$typ>::MAX as f64 => {
                    Some(*v as $typ)
                }
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            };
            match v {
                Some(v) => visitor.$visit(v),
                None => Err(self.unexpected(stringify!($typ))),
            }
        }
    };
}

/// A deserializer for the `Value` type.
pub struct ValueDeserializer<'a> {
    value: &'a Value,
}

impl<'a> ValueDeserializer<'a> {
    /// Creates a new deserializer over `value`
    pub fn new(value: &'a Value) -> Self {
        ValueDeserializer { value }
    }

    fn unexpected(&self, expected: &'static str) -> DeError {
        DeError::Unexpected {
            expected,
            found: self.value.clone(),
        }
    }
}

impl<'de> IntoDeserializer<'de, DeError> for ValueDeserializer<'_> {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

impl<'de> serde::Deserializer<'de> for ValueDeserializer<'_> {
    type Error = DeError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::String(v) => visitor.visit_str(v),
            Value::Float(v) => visitor.visit_f64(*v),
            Value::Bool(v) => visitor.visit_bool(*v),
            Value::Int(v) => visitor.visit_i64(*v),
            Value::Empty => visitor.visit_unit(),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::String(v) => visitor.visit_str(v),
            Value::Empty => visitor.visit_str(""),
            v => visitor.visit_str(&v.to_string()),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::String(v) => visitor.visit_bytes(v.as_bytes()),
            Value::Empty => visitor.visit_bytes(&[]),
            _ => Err(self.unexpected("bytes")),
        }
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Bool(v) => visitor.visit_bool(*v),
            Value::String(v) => match v.trim() {
                "TRUE" | "true" | "True" | "1" => visitor.visit_bool(true),
                "FALSE" | "false" | "False" | "0" => visitor.visit_bool(false),
                _ => Err(self.unexpected("bool")),
            },
            Value::Empty => visitor.visit_bool(false),
            Value::Float(v) => visitor.visit_bool(*v != 0.),
            Value::Int(v) => visitor.visit_bool(*v != 0),
        }
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if let Value::String(s) = self.value {
            let mut chars = s.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                return visitor.visit_char(c);
            }
        }
        Err(self.unexpected("char"))
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Empty => visitor.visit_unit(),
            _ => Err(self.unexpected("unit")),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Empty => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_enum(s.as_str().into_deserializer()),
            _ => Err(self.unexpected("enum")),
        }
    }

    deserialize_int!(i64, deserialize_i64, visit_i64);
    deserialize_int!(i32, deserialize_i32, visit_i32);
    deserialize_int!(i16, deserialize_i16, visit_i16);
    deserialize_int!(i8, deserialize_i8, visit_i8);
    deserialize_int!(u64, deserialize_u64, visit_u64);
    deserialize_int!(u32, deserialize_u32, visit_u32);
    deserialize_int!(u16, deserialize_u16, visit_u16);
    deserialize_int!(u8, deserialize_u8, visit_u8);
    deserialize_float!(f64, deserialize_f64, visit_f64);
    deserialize_float!(f32, deserialize_f32, visit_f32);

    forward_to_deserialize_any! {
        unit_struct seq tuple tuple_struct map struct identifier ignored_any
    }
}
