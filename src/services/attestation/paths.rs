/// Ordered list of path prefixes that require an attestation token.
///
/// A prefix gates itself and every sub-path: `/payments` matches `/payments`
/// and `/payments/42`, not `/paymentsx`. `/` matches everything. An empty
/// selector gates nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSelector {
    prefixes: Vec<String>,
}

impl PathSelector {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefixes = prefixes
            .into_iter()
            .filter_map(|p| normalize_prefix(p.as_ref()))
            .collect();
        Self { prefixes }
    }

    /// Parse a comma separated list, e.g. `/checkout, /payments`.
    pub fn from_csv(value: &str) -> Self {
        Self::new(value.split(','))
    }

    /// Gate everything.
    pub fn all() -> Self {
        Self::new(["/"])
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    pub fn matches(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| prefix_matches(prefix, path))
    }
}

fn normalize_prefix(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let without_slash = trimmed.trim_end_matches('/');
    if without_slash.is_empty() {
        return Some("/".to_string());
    }

    if without_slash.starts_with('/') {
        Some(without_slash.to_string())
    } else {
        Some(format!("/{}", without_slash))
    }
}

fn prefix_matches(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
