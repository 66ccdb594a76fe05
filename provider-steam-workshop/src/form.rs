//! `application/x-www-form-urlencoded` body builder
//!
//! Steam's Web API takes list parameters as indexed keys
//! (`publishedfileids[0]=…&publishedfileids[1]=…`), which generic form
//! serializers do not produce.

use std::fmt::Display;

#[derive(Debug, Default, Clone)]
pub struct FormBody {
    pairs: Vec<(String, String)>,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scalar field
    pub fn field(mut self, key: &str, value: impl Display) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a list as `key[0]`, `key[1]`, …
    pub fn list<V: Display>(mut self, key: &str, values: &[V]) -> Self {
        for (index, value) in values.iter().enumerate() {
            self.pairs
                .push((format!("{}[{}]", key, index), value.to_string()));
        }
        self
    }

    /// Percent-encode keys and values and join them with `&`
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_fields() {
        let body = FormBody::new()
            .field("id", "123")
            .field("childid", 456)
            .encode();

        assert_eq!(body, "id=123&childid=456");
    }

    #[test]
    fn test_list_expands_to_indexed_keys() {
        let ids = vec!["10".to_string(), "20".to_string()];
        let body = FormBody::new()
            .field("collectioncount", ids.len())
            .list("publishedfileids", &ids)
            .encode();

        assert_eq!(
            body,
            "collectioncount=2&publishedfileids%5B0%5D=10&publishedfileids%5B1%5D=20"
        );
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let body = FormBody::new().field("sessionid", "a b&c=d").encode();
        assert_eq!(body, "sessionid=a%20b%26c%3Dd");
    }

    #[test]
    fn test_empty_form() {
        assert_eq!(FormBody::new().encode(), "");
        let empty: [&str; 0] = [];
        assert_eq!(FormBody::new().list("ids", &empty).encode(), "");
    }
}
