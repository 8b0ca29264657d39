//! Lenient deserialization helpers for grid protocol payloads.
//!
//! Grid clients send the same logical value in different shapes depending on
//! how the request was encoded: `"draw": 3` from a JSON body, `"draw": "3"`
//! after a form-encoded round trip. These helpers accept both.

use serde::{Deserialize, Deserializer};

/// Helper that accepts either a JSON number or a string when deserializing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StringOrNumber {
    /// A JSON integer.
    Integer(i64),
    /// A JSON number with a fractional part or exponent.
    Float(f64),
    /// A JSON string.
    Text(String),
}

impl StringOrNumber {
    /// Interprets the value as an integer.
    ///
    /// Strings are trimmed and parsed; whole-valued floats are accepted.
    /// Returns `None` for anything non-numeric.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            StringOrNumber::Integer(n) => Some(*n),
            StringOrNumber::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            StringOrNumber::Float(_) => None,
            StringOrNumber::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && f.fract() == 0.0)
                        .map(|f| f as i64)
                })
            }
        }
    }
}

/// Helper that accepts either a single value or an array when deserializing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SingleOrVec<T> {
    /// An array of values.
    Vec(Vec<T>),
    /// A lone value.
    Single(T),
}

impl<T> SingleOrVec<T> {
    /// Flattens into a vector.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            SingleOrVec::Single(value) => vec![value],
            SingleOrVec::Vec(values) => values,
        }
    }
}

impl<T> Default for SingleOrVec<T> {
    fn default() -> Self {
        SingleOrVec::Vec(Vec::new())
    }
}

/// Splits a comma-separated id list, dropping empty entries.
pub fn split_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Deserializes an id list given as `"a,b"`, `["a", "b"]` or `[1, 2]`.
pub fn deserialize_id_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<SingleOrVec<StringOrNumber>>::deserialize(deserializer)?;
    Ok(raw.map(|ids| {
        ids.into_vec()
            .into_iter()
            .flat_map(|id| match id {
                StringOrNumber::Text(s) => split_ids(&s),
                StringOrNumber::Integer(n) => vec![n.to_string()],
                StringOrNumber::Float(f) => vec![f.to_string()],
            })
            .collect()
    }))
}

/// Deserializes a flag given as a JSON boolean or as `"true"`/`"false"`.
///
/// Unrecognised strings fall back to `true`, matching the protocol default
/// for `searchable` and `orderable`.
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Text(s)) => !s.trim().eq_ignore_ascii_case("false"),
        None => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_or_number_as_i64() {
        let n: StringOrNumber = serde_json::from_value(json!(7)).unwrap();
        assert_eq!(n.as_i64(), Some(7));

        let s: StringOrNumber = serde_json::from_value(json!(" 12 ")).unwrap();
        assert_eq!(s.as_i64(), Some(12));

        let f: StringOrNumber = serde_json::from_value(json!(3.0)).unwrap();
        assert_eq!(f.as_i64(), Some(3));

        let bad: StringOrNumber = serde_json::from_value(json!("abc")).unwrap();
        assert_eq!(bad.as_i64(), None);

        let frac: StringOrNumber = serde_json::from_value(json!(2.5)).unwrap();
        assert_eq!(frac.as_i64(), None);
    }

    #[test]
    fn test_split_ids() {
        assert_eq!(split_ids("a, b,,c"), vec!["a", "b", "c"]);
        assert!(split_ids("").is_empty());
    }

    #[test]
    fn test_deserialize_id_list() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(default, deserialize_with = "deserialize_id_list")]
            ids: Option<Vec<String>>,
        }

        let h: Holder = serde_json::from_value(json!({"ids": "x,y"})).unwrap();
        assert_eq!(h.ids, Some(vec!["x".to_string(), "y".to_string()]));

        let h: Holder = serde_json::from_value(json!({"ids": ["x", 2]})).unwrap();
        assert_eq!(h.ids, Some(vec!["x".to_string(), "2".to_string()]));

        let h: Holder = serde_json::from_value(json!({})).unwrap();
        assert_eq!(h.ids, None);
    }

    #[test]
    fn test_deserialize_flag() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(default = "yes", deserialize_with = "deserialize_flag")]
            flag: bool,
        }
        fn yes() -> bool {
            true
        }

        let h: Holder = serde_json::from_value(json!({"flag": "false"})).unwrap();
        assert!(!h.flag);
        let h: Holder = serde_json::from_value(json!({"flag": false})).unwrap();
        assert!(!h.flag);
        let h: Holder = serde_json::from_value(json!({"flag": "true"})).unwrap();
        assert!(h.flag);
        let h: Holder = serde_json::from_value(json!({})).unwrap();
        assert!(h.flag);
    }
}
