use std::collections::HashMap;

use crate::error::{Error, Result};

#[derive(Debug, PartialEq)]
pub struct ParsedInput {
    /// Tokens without a `key:` prefix, in order.
    pub positional: Vec<String>,
    pub metadata: HashMap<String, String>,
}

/// Split `key:value` tokens from bare tokens. Only the first `:` separates,
/// so `photo:C:/pics/a.jpg` keeps the drive letter in the value.
pub fn parse_args(args: &[String]) -> ParsedInput {
    let mut positional = Vec::new();
    let mut metadata = HashMap::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once(':') {
            if !key.is_empty() && key.chars().all(|c| c.is_ascii_alphabetic()) {
                metadata.insert(key.to_lowercase(), value.to_string());
                continue;
            }
        }
        positional.push(arg.clone());
    }

    ParsedInput {
        positional,
        metadata,
    }
}

pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String> {
    // 1. Exact match
    if candidates.contains(&key) {
        return Ok(key.to_string());
    }

    // 2. Prefix match
    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| c.starts_with(key))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(Error::UnknownKey(key.to_string())),
        _ => Err(Error::AmbiguousKey {
            key: key.to_string(),
            candidates: matches.into_iter().map(String::from).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_simple() {
        let parsed = parse_args(&args(&["72.5", "2100", "date:yesterday", "photo:/tmp/a.jpg"]));
        assert_eq!(parsed.positional, vec!["72.5", "2100"]);
        assert_eq!(parsed.metadata.get("date"), Some(&"yesterday".to_string()));
        assert_eq!(parsed.metadata.get("photo"), Some(&"/tmp/a.jpg".to_string()));
    }

    #[test]
    fn test_parse_keeps_colons_in_value() {
        let parsed = parse_args(&args(&["photo:C:/pics/a.jpg", "2:mon"]));
        assert_eq!(parsed.metadata.get("photo"), Some(&"C:/pics/a.jpg".to_string()));
        // numeric prefix is not a key
        assert_eq!(parsed.positional, vec!["2:mon"]);
    }

    #[test]
    fn test_expand_key() {
        let candidates = vec!["date", "weight", "calories", "photo"];

        assert_eq!(expand_key("d", &candidates).unwrap(), "date");
        assert_eq!(expand_key("w", &candidates).unwrap(), "weight");
        assert_eq!(expand_key("cal", &candidates).unwrap(), "calories");
        assert_eq!(expand_key("photo", &candidates).unwrap(), "photo");

        assert!(matches!(expand_key("x", &candidates), Err(Error::UnknownKey(_))));

        let with_duplicates = vec!["calories", "cal_goal"];
        assert!(matches!(
            expand_key("cal", &with_duplicates),
            Err(Error::AmbiguousKey { .. })
        ));
    }
}
