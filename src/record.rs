use serde::{Deserialize, Serialize};

/// Document stored in the example collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Foo {
    #[serde(default)]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_name_decodes_as_empty() {
        let foo: Foo = serde_json::from_value(json!({"_key": "k1"})).unwrap();
        assert_eq!(foo.name, "");
    }

    #[test]
    fn test_non_string_name_is_rejected() {
        let result: Result<Foo, _> = serde_json::from_value(json!({"name": 7}));
        assert!(result.is_err());
    }
}
