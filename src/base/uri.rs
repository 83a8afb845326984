//! Stable node addresses.
//!
//! A [`Uri`] is a [`ResourceUri`] plus a [`Fragment`]. The fragment is the
//! containment path from the resource root: `/` is the root, every further
//! step is `/@feature` (single-valued feature) or `/@feature.index`
//! (multi-valued feature). The first element of the root's `types` list is
//! therefore `//@types.0`, and the full textual form is
//! `foo.types#//@types.0`.

use std::fmt;
use std::str::FromStr;

use smol_str::{SmolStr, format_smolstr};

use super::constants::{FEATURE_STEP_PREFIX, FRAGMENT_SEPARATOR, INDEX_SEPARATOR, ROOT_FRAGMENT};
use crate::{Error, Result};

// ============================================================================
// RESOURCE URI
// ============================================================================

/// Identifier of a resource (file or stream path).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceUri(SmolStr);

impl ResourceUri {
    pub fn new(uri: impl AsRef<str>) -> Self {
        Self(SmolStr::new(uri.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The file extension, without the dot.
    pub fn file_extension(&self) -> Option<&str> {
        let file_name = self.file_name();
        let (stem, ext) = file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            None
        } else {
            Some(ext)
        }
    }

    /// The last path segment.
    pub fn file_name(&self) -> &str {
        self.0.rsplit(['/', '\\']).next().unwrap_or(self.as_str())
    }

    /// Address a node inside this resource.
    pub fn with_fragment(&self, fragment: Fragment) -> Uri {
        Uri::new(self.clone(), fragment)
    }

    /// Address this resource's root node.
    pub fn root_uri(&self) -> Uri {
        self.with_fragment(Fragment::root())
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceUri {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ResourceUri {
    fn from(s: String) -> Self {
        Self(SmolStr::from(s))
    }
}

// ============================================================================
// FRAGMENT
// ============================================================================

/// One `@feature[.index]` step of a fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FragmentStep<'a> {
    pub feature: &'a str,
    pub index: Option<usize>,
}

/// Containment path from the resource root to a node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fragment(SmolStr);

impl Fragment {
    /// The fragment of a resource's root node.
    pub fn root() -> Self {
        Self(SmolStr::new_static(ROOT_FRAGMENT))
    }

    /// Parse and validate a fragment.
    pub fn parse(text: &str) -> Result<Self> {
        let fragment = Self(SmolStr::new(text));
        fragment.steps()?;
        Ok(fragment)
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_FRAGMENT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The fragment of a child reached through `feature` (at `index` for
    /// multi-valued features).
    pub fn child(&self, feature: &str, index: Option<usize>) -> Self {
        match index {
            Some(index) => Self(format_smolstr!(
                "{}/{FEATURE_STEP_PREFIX}{feature}{INDEX_SEPARATOR}{index}",
                self.0
            )),
            None => Self(format_smolstr!("{}/{FEATURE_STEP_PREFIX}{feature}", self.0)),
        }
    }

    /// Decode the steps from the root down to the addressed node.
    pub fn steps(&self) -> Result<Vec<FragmentStep<'_>>> {
        let text = self.as_str();
        let rest = text
            .strip_prefix(ROOT_FRAGMENT)
            .ok_or_else(|| Error::invalid_uri(text, "fragment must start with '/'"))?;
        if rest.is_empty() {
            return Ok(Vec::new());
        }
        let rest = rest
            .strip_prefix('/')
            .ok_or_else(|| Error::invalid_uri(text, "expected '/' before the first step"))?;

        rest.split('/').map(|step| parse_step(text, step)).collect()
    }
}

fn parse_step<'a>(fragment: &str, step: &'a str) -> Result<FragmentStep<'a>> {
    let body = step
        .strip_prefix(FEATURE_STEP_PREFIX)
        .ok_or_else(|| Error::invalid_uri(fragment, format!("step '{step}' must start with '@'")))?;
    let (feature, index) = match body.split_once(INDEX_SEPARATOR) {
        Some((feature, index)) => {
            let index = index.parse::<usize>().map_err(|_| {
                Error::invalid_uri(fragment, format!("step '{step}' has an invalid index"))
            })?;
            (feature, Some(index))
        }
        None => (body, None),
    };
    if feature.is_empty() {
        return Err(Error::invalid_uri(fragment, format!("step '{step}' names no feature")));
    }
    Ok(FragmentStep { feature, index })
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// URI
// ============================================================================

/// Globally unique address of a node: resource identifier plus fragment.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uri {
    resource: ResourceUri,
    fragment: Fragment,
}

impl Uri {
    pub fn new(resource: ResourceUri, fragment: Fragment) -> Self {
        Self { resource, fragment }
    }

    pub fn resource(&self) -> &ResourceUri {
        &self.resource
    }

    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }

    /// True if this URI points into `resource`.
    pub fn is_in(&self, resource: &ResourceUri) -> bool {
        &self.resource == resource
    }
}

impl FromStr for Uri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (resource, fragment) = s
            .split_once(FRAGMENT_SEPARATOR)
            .ok_or_else(|| Error::invalid_uri(s, "missing '#' fragment separator"))?;
        if resource.is_empty() {
            return Err(Error::invalid_uri(s, "missing resource part"));
        }
        Ok(Self::new(ResourceUri::new(resource), Fragment::parse(fragment)?))
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{FRAGMENT_SEPARATOR}{}", self.resource, self.fragment)
    }
}
