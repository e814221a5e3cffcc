/// Diagnostic keyword catalogue: terrain types, then features, then sizes.
const CATALOGUE: &[&str] = &[
    // Terrain
    "mountain", "mountains", "hill", "hills", "valley", "valleys",
    "flat", "plain", "plains", "plateau", "mesa",
    // Features
    "river", "stream", "water", "rough", "smooth", "jagged",
    "gentle", "steep", "rocky", "grassy", "forest",
    // Size
    "large", "big", "huge", "small", "tiny", "massive", "mini",
];

/// Catalogue words contained in `text`, in catalogue order.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    CATALOGUE
        .iter()
        .filter(|word| text.contains(**word))
        .map(|word| word.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_order_not_text_order() {
        assert_eq!(
            extract_keywords("Small forest by the river under MOUNTAINS"),
            vec!["mountain", "mountains", "river", "forest", "small"]
        );
    }

    #[test]
    fn substring_hits_are_kept() {
        assert_eq!(extract_keywords("minimal plainness"), vec!["plain", "mini"]);
    }

    #[test]
    fn nothing_matches() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("a desert of glass").is_empty());
    }

    #[test]
    fn catalogue_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        assert!(CATALOGUE.iter().all(|w| seen.insert(*w)));
    }
}
