pub mod tables;

use bytes::Bytes;

/// Wire protocol the codec negotiated for a stream. Selects which header
/// validator the factory hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http09,
    Http1,
    Http2,
    Other,
}

/// One (name, value) pair in codec order. Names and values are raw bytes;
/// values may carry obs-text, so they are not guaranteed to be UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    name: Bytes,
    value: Bytes,
}

impl HeaderEntry {
    pub fn new(name: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn is_pseudo(&self) -> bool {
        self.name.first() == Some(&b':')
    }
}

/// Ordered multimap of header entries.
///
/// The codec guarantees ordering but not uniqueness, and places
/// pseudo-headers before regular headers. Leading and trailing OWS is
/// already stripped from values before they reach this type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<HeaderEntry>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<N, V, I>(pairs: I) -> Self
    where
        N: Into<Bytes>,
        V: Into<Bytes>,
        I: IntoIterator<Item = (N, V)>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(name, value)| HeaderEntry::new(name, value))
                .collect(),
        }
    }

    pub fn append(&mut self, name: impl Into<Bytes>, value: impl Into<Bytes>) {
        self.entries.push(HeaderEntry::new(name, value));
    }

    /// First value stored under `name`, compared ASCII-case-insensitively.
    pub fn get(&self, name: &[u8]) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
            .map(HeaderEntry::value)
    }

    pub fn contains(&self, name: &[u8]) -> bool {
        self.get(name).is_some()
    }

    /// Removes every occurrence of `name`, returning how many were dropped.
    pub fn remove(&mut self, name: &[u8]) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|entry| !entry.name.eq_ignore_ascii_case(name));
        before - self.entries.len()
    }

    /// Replaces the value of the first `name` entry, appending when absent.
    pub fn set(&mut self, name: impl Into<Bytes>, value: impl Into<Bytes>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.name.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.value = value,
            None => self.entries.push(HeaderEntry { name, value }),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HeaderEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn method(&self) -> Option<&[u8]> {
        self.get(b":method")
    }

    pub fn scheme(&self) -> Option<&[u8]> {
        self.get(b":scheme")
    }

    pub fn path(&self) -> Option<&[u8]> {
        self.get(b":path")
    }

    pub fn authority(&self) -> Option<&[u8]> {
        self.get(b":authority")
    }

    pub fn status(&self) -> Option<&[u8]> {
        self.get(b":status")
    }

    /// The request host: `:authority` when present, the `host` header
    /// otherwise.
    pub fn host(&self) -> Option<&[u8]> {
        self.authority().or_else(|| self.get(b"host"))
    }

    pub fn set_path(&mut self, path: impl Into<Bytes>) {
        self.set(&b":path"[..], path);
    }
}

impl<'a> IntoIterator for &'a HeaderMap {
    type Item = &'a HeaderEntry;
    type IntoIter = std::slice::Iter<'a, HeaderEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
