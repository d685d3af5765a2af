//! Defaulting lookups into loosely-typed JSON.
//!
//! Paths are JSON Pointers (RFC 6901), e.g. `/main/temp` or `/weather/0/id`.
//! Every miss along the way (absent key, absent parent, index out of range,
//! scalar where a container was expected, wrong leaf type) is `None`.

use serde_json::{Number, Value};

pub trait JsonLookup {
    /// Value at `pointer`, if every step of the path resolves.
    fn at(&self, pointer: &str) -> Option<&Value>;

    /// Any JSON number at `pointer`, widened to `f64`.
    fn f64_at(&self, pointer: &str) -> Option<f64> {
        self.at(pointer).and_then(Value::as_f64)
    }

    /// An integral JSON number at `pointer`. Fractional values miss.
    fn i64_at(&self, pointer: &str) -> Option<i64> {
        self.at(pointer).and_then(Value::as_i64)
    }

    /// Any JSON number at `pointer`, exactly as the document wrote it.
    fn number_at(&self, pointer: &str) -> Option<Number> {
        match self.at(pointer)? {
            Value::Number(n) => Some(n.clone()),
            _ => None,
        }
    }

    fn str_at(&self, pointer: &str) -> Option<&str> {
        self.at(pointer).and_then(Value::as_str)
    }

    fn string_at(&self, pointer: &str) -> Option<String> {
        self.str_at(pointer).map(str::to_owned)
    }
}

impl JsonLookup for Value {
    fn at(&self, pointer: &str) -> Option<&Value> {
        match self.pointer(pointer)? {
            Value::Null => None,
            found => Some(found),
        }
    }
}
