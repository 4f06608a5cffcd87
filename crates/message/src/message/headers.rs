use serde::{Deserialize, Serialize};

/// Insertion-ordered multimap of header names to value sequences.
///
/// Names are matched by exact byte equality, not case-insensitively:
/// `Host` and `host` are distinct entries. This mirrors the interchange
/// model this crate implements and is deliberate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers {
    entries: Vec<(String, Vec<String>)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Values stored under `name`, in insertion order; empty when absent.
    pub fn get(&self, name: &str) -> &[String] {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, values)| values.as_slice()).unwrap_or(&[])
    }

    /// Values for `name` joined with `,` into a single line.
    pub fn line(&self, name: &str) -> String {
        self.get(name).join(",")
    }

    /// Replaces the whole value sequence for `name`; a new name goes to the
    /// end of the listing.
    pub fn set(&mut self, name: impl Into<String>, values: impl Into<HeaderValues>) {
        let name = name.into();
        let values = values.into().into_vec();

        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((name, values)),
        }
    }

    /// Appends values to the sequence for `name`, creating the entry when
    /// absent.
    pub fn append(&mut self, name: impl Into<String>, values: impl Into<HeaderValues>) {
        let name = name.into();
        let mut values = values.into().into_vec();

        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => existing.append(&mut values),
            None => self.entries.push((name, values)),
        }
    }

    /// Removes the entry for `name` entirely. No-op when absent.
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(n, _)| n != name);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(name, values)| (name.as_str(), values.as_slice()))
    }
}

/// Normalizes a raw header listing: scalars become one-element sequences,
/// sequences are kept verbatim, repeated names merge in first-seen order.
impl<N: Into<String>, V: Into<HeaderValues>> FromIterator<(N, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut headers = Self::new();
        for (name, values) in iter {
            headers.append(name, values);
        }

        headers
    }
}

/// Header value sequence accepted by the mutation APIs.
///
/// A single scalar becomes a one-element sequence; an explicit sequence is
/// stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderValues(Vec<String>);

impl HeaderValues {
    pub(crate) fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for HeaderValues {
    fn from(value: &str) -> Self {
        Self(vec![value.to_string()])
    }
}

impl From<String> for HeaderValues {
    fn from(value: String) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<String>> for HeaderValues {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl From<Vec<&str>> for HeaderValues {
    fn from(values: Vec<&str>) -> Self {
        Self(values.into_iter().map(ToString::to_string).collect())
    }
}

impl From<&[&str]> for HeaderValues {
    fn from(values: &[&str]) -> Self {
        Self(values.iter().map(ToString::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_append_extends() {
        let mut headers = Headers::new();

        headers.set("Accept", "text/html");
        assert_eq!(headers.get("Accept"), ["text/html"]);

        headers.set("Accept", "application/json");
        assert_eq!(headers.get("Accept"), ["application/json"]);

        headers.append("Accept", "text/plain");
        assert_eq!(headers.get("Accept"), ["application/json", "text/plain"]);
    }

    #[test]
    fn name_matching_is_exact() {
        let mut headers = Headers::new();
        headers.set("Host", "example.com");

        assert!(headers.contains("Host"));
        assert!(!headers.contains("host"));
        assert!(headers.get("HOST").is_empty());
    }

    #[test]
    fn line_joins_with_a_comma() {
        let mut headers = Headers::new();
        headers.set("Accept", vec!["text/html", "text/plain"]);

        assert_eq!(headers.line("Accept"), "text/html,text/plain");
        assert_eq!(headers.line("Missing"), "");
    }

    #[test]
    fn remove_is_a_noop_when_absent() {
        let mut headers = Headers::new();
        headers.set("One", "1");

        headers.remove("Missing");
        headers.remove("One");

        assert!(headers.is_empty());
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut headers = Headers::new();
        headers.set("B", "2");
        headers.set("A", "1");
        headers.set("C", "3");
        headers.set("A", "updated");

        let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["B", "A", "C"]);
    }

    #[test]
    fn from_iterator_normalizes_scalars_and_merges_repeats() {
        let headers =
            Headers::from_iter([("Accept", "text/html"), ("Host", "example.com"), ("Accept", "text/plain")]);

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("Accept"), ["text/html", "text/plain"]);
        assert_eq!(headers.get("Host"), ["example.com"]);
    }
}
