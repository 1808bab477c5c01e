//! Embedded starter configuration, compiled into the binary via include_str!().

const RULES_YAML: &str = include_str!("../rules/rules.yaml");
const MODEL_YAML: &str = include_str!("../rules/model.yaml");

/// Look up an embedded file by name.
pub fn get(name: &str) -> Option<&'static str> {
    match name {
        "rules.yaml" => Some(RULES_YAML),
        "model.yaml" => Some(MODEL_YAML),
        _ => None,
    }
}

/// Return all embedded files as (name, content) pairs.
pub fn all_files() -> Vec<(&'static str, &'static str)> {
    vec![("rules.yaml", RULES_YAML), ("model.yaml", MODEL_YAML)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_rules_yaml() {
        let content = get("rules.yaml");
        assert!(content.is_some(), "rules.yaml must be embedded");
        assert!(content.unwrap().contains("llm_as_judge"));
    }

    #[test]
    fn test_get_model_yaml() {
        let content = get("model.yaml");
        assert!(content.is_some(), "model.yaml must be embedded");
        assert!(content.unwrap().contains("command:"));
    }

    #[test]
    fn test_get_nonexistent_returns_none() {
        assert!(get("nonexistent.yaml").is_none());
    }

    #[test]
    fn test_all_files_returns_both() {
        let files = all_files();
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|(name, _)| *name == "rules.yaml"));
        assert!(files.iter().any(|(name, _)| *name == "model.yaml"));
    }
}
