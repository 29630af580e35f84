//! Search functionality for filtering items.
//!
//! Matching is a case-insensitive substring test. An empty query matches
//! everything, so a filtered view with no query is the full list.

/// A compiled search query.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    needle: String,
}

impl Matcher {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Check if `text` contains the query, ignoring case.
    ///
    /// ```ignore
    /// let matcher = Matcher::new("cut");
    /// assert!(matcher.matches("Haircut"));
    /// assert!(!matcher.matches("Manicure"));
    /// ```
    pub fn matches(&self, text: &str) -> bool {
        self.is_empty() || text.to_lowercase().contains(&self.needle)
    }
}

/// Indices of the items whose key matches `query`, in their original order.
pub fn filter_indices<T>(items: &[T], query: &str, key: impl Fn(&T) -> &str) -> Vec<usize> {
    let matcher = Matcher::new(query);
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| matcher.matches(key(item)))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: &[&str] = &[
        "Haircut",
        "Hair wash",
        "Manicure",
        "Pedicure",
        "Facial care",
        "HAIR coloring",
        "Cắt tóc",
    ];

    fn names(query: &str) -> Vec<&'static str> {
        filter_indices(NAMES, query, |n| *n)
            .into_iter()
            .map(|i| NAMES[i])
            .collect()
    }

    #[test]
    fn test_empty_query_keeps_everything() {
        assert_eq!(names(""), NAMES);
    }

    #[test]
    fn test_case_insensitive_substring() {
        assert_eq!(names("hair"), vec!["Haircut", "Hair wash", "HAIR coloring"]);
        assert_eq!(names("CURE"), vec!["Manicure", "Pedicure"]);
        assert_eq!(names("CẮT"), vec!["Cắt tóc"]);
        assert!(names("massage").is_empty());
    }

    #[test]
    fn test_filtered_view_is_exact_subset() {
        for query in ["", "a", "ir", "care", "x", " ", "HAIR C"] {
            let matcher = Matcher::new(query);
            let kept = filter_indices(NAMES, query, |n| *n);

            for (i, name) in NAMES.iter().enumerate() {
                let matches = name.to_lowercase().contains(&query.to_lowercase());
                assert_eq!(kept.contains(&i), matches, "query {query:?}, name {name:?}");
                assert_eq!(matcher.matches(name), matches);
            }
            assert!(kept.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
