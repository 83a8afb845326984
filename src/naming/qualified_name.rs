use std::fmt;

use smol_str::SmolStr;

use crate::base::constants::QUALIFIED_NAME_DELIMITER;

/// An ordered sequence of name segments, e.g. `pkg.sub.Type`.
///
/// Uniqueness is decided by the scope a name is looked up in, never here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    segments: Vec<SmolStr>,
}

impl QualifiedName {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn single(segment: impl Into<SmolStr>) -> Self {
        Self {
            segments: vec![segment.into()],
        }
    }

    /// Split `a.b.c` on the default delimiter. Empty segments are dropped.
    pub fn from_dotted(text: &str) -> Self {
        Self::new(
            text.split(QUALIFIED_NAME_DELIMITER)
                .filter(|segment| !segment.is_empty()),
        )
    }

    pub fn segments(&self) -> &[SmolStr] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(SmolStr::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(SmolStr::as_str)
    }

    /// `self` followed by all segments of `other`.
    pub fn append(&self, other: &QualifiedName) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    pub fn append_segment(&self, segment: impl Into<SmolStr>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn skip_first(&self, count: usize) -> Self {
        Self {
            segments: self.segments.iter().skip(count).cloned().collect(),
        }
    }

    pub fn skip_last(&self, count: usize) -> Self {
        let keep = self.segments.len().saturating_sub(count);
        Self {
            segments: self.segments[..keep].to_vec(),
        }
    }

    pub fn starts_with(&self, prefix: &QualifiedName) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    pub fn to_lowercase(&self) -> Self {
        Self::new(self.segments.iter().map(|s| s.to_lowercase()))
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(QUALIFIED_NAME_DELIMITER)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl From<&str> for QualifiedName {
    fn from(text: &str) -> Self {
        Self::from_dotted(text)
    }
}
