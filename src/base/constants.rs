//! Domain constants shared across the crate.

/// Separator between the resource part and the fragment of a [`Uri`](super::Uri).
pub const FRAGMENT_SEPARATOR: char = '#';

/// Fragment addressing a resource's root node.
pub const ROOT_FRAGMENT: &str = "/";

/// Prefix of a feature step inside a fragment (`/@types.0`).
pub const FEATURE_STEP_PREFIX: char = '@';

/// Separator between a feature name and a list index inside a fragment step.
pub const INDEX_SEPARATOR: char = '.';

/// Default delimiter used when rendering or parsing qualified names.
pub const QUALIFIED_NAME_DELIMITER: &str = ".";

/// Attribute read by the default naming policies.
pub const NAME_FEATURE: &str = "name";

/// File extension of the bundled reference language.
pub const TYPES_FILE_EXTENSION: &str = "types";

/// Namespace URI of the bundled reference language's metamodel.
pub const TYPES_NS_URI: &str = "http://loom/types";
