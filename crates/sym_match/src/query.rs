//! Query normalization.

/// Normalizes a raw query into a comparison key: trims the edges,
/// collapses every internal whitespace run to one space, and lowercases.
///
/// Pure and total. An empty result means "no query" and callers must
/// short-circuit to an empty result set without touching any shard.
pub fn normalize(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    for segment in raw.split_whitespace() {
        if !key.is_empty() {
            key.push(' ');
        }
        for ch in segment.chars() {
            key.extend(ch.to_lowercase());
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn trims_and_lowercases() {
        assert_eq!(normalize("  Mesh "), "mesh");
        assert_eq!(normalize("MeshFactory"), "meshfactory");
    }

    #[test]
    fn collapses_internal_whitespace() {
        assert_eq!(normalize("mesh \t  factory"), "mesh factory");
        assert_eq!(normalize("a\n\nb"), "a b");
    }

    #[test]
    fn whitespace_only_becomes_empty() {
        assert_eq!(normalize("   \t\n "), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn handles_non_ascii() {
        assert_eq!(normalize("Größe"), "größe");
    }
}
