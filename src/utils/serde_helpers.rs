use serde::{Deserialize, Deserializer};

/// Deserializes an optional string, treating empty or whitespace-only values as None.
/// Portal forms submit "" for fields the user left blank.
pub fn blank_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "blank_string_as_none")]
        notes: Option<String>,
    }

    #[test]
    fn blank_strings_become_none() {
        let form: Form = serde_json::from_str(r#"{ "notes": "   " }"#).unwrap();
        assert_eq!(form.notes, None);
        let form: Form = serde_json::from_str(r#"{ "notes": "Net 30" }"#).unwrap();
        assert_eq!(form.notes.as_deref(), Some("Net 30"));
        let form: Form = serde_json::from_str("{}").unwrap();
        assert_eq!(form.notes, None);
    }
}
