//! Store key normalization

/// Turn an object's display name into its store key
///
/// Surrounding whitespace is trimmed, the rest is lowercased and every
/// whitespace character becomes `_`. Other punctuation is left alone, so
/// `esxi-host-b` and `esxi_host_b` stay distinct keys.
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut key = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        if c.is_whitespace() {
            key.push('_');
        } else {
            key.extend(c.to_lowercase());
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "ESXi Host A",
        "esxi-host-b",
        "ESXI_HOST_C",
        "  padded name  ",
        "tab\tseparated\nlines",
        "Double  Space",
        "Ünïcödé Datastore",
        "",
        "   ",
        "already_normal",
    ];

    #[test]
    fn test_whitespace_only_replacement() {
        assert_eq!(normalize_name("ESXi Host A"), "esxi_host_a");
        assert_eq!(normalize_name("esxi-host-b"), "esxi-host-b");
        assert_eq!(normalize_name("ESXI_HOST_C"), "esxi_host_c");
        assert_eq!(normalize_name("  padded name  "), "padded_name");
        assert_eq!(normalize_name("Double  Space"), "double__space");
        assert_eq!(normalize_name("tab\tseparated\nlines"), "tab_separated_lines");
    }

    #[test]
    fn test_idempotent() {
        for sample in SAMPLES {
            let once = normalize_name(sample);
            assert_eq!(normalize_name(&once), once, "input: {sample:?}");
        }
    }

    #[test]
    fn test_output_lowercase_without_whitespace() {
        for sample in SAMPLES {
            let key = normalize_name(sample);
            assert!(!key.chars().any(char::is_whitespace), "input: {sample:?}");
            assert!(!key.chars().any(char::is_uppercase), "input: {sample:?}");
        }
    }

    #[test]
    fn test_blank_input_yields_empty_key() {
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name(" \t "), "");
    }
}
