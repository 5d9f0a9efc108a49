//! Configuration
//!
//! Options for the replay engine and the buffer creator, plus the SAX
//! feature table: the processor answers the standard feature URIs the same
//! way an XML reader would.

use std::num::NonZeroUsize;

use log::warn;

use crate::buffer::stream::capacity;
use crate::error::FeatureError;
use crate::strings::DEFAULT_INTERNER_CAPACITY;

/// Standard SAX feature URIs
pub mod features {
    pub const NAMESPACES: &str = "http://xml.org/sax/features/namespaces";
    pub const NAMESPACE_PREFIXES: &str = "http://xml.org/sax/features/namespace-prefixes";
    pub const STRING_INTERNING: &str = "http://xml.org/sax/features/string-interning";
    pub const EXTERNAL_GENERAL_ENTITIES: &str =
        "http://xml.org/sax/features/external-general-entities";
    pub const EXTERNAL_PARAMETER_ENTITIES: &str =
        "http://xml.org/sax/features/external-parameter-entities";
}

/// Replay engine options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Surface namespace declarations as `xmlns` attributes as well
    pub namespace_prefixes: bool,
    /// Deduplicate produced name strings
    pub string_interning: bool,
    /// Maximum element nesting; `None` means unlimited
    pub max_depth: Option<usize>,
    /// Names retained by the interner
    pub interner_capacity: NonZeroUsize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        ProcessorConfig {
            namespace_prefixes: false,
            string_interning: false,
            max_depth: None,
            interner_capacity: NonZeroUsize::new(DEFAULT_INTERNER_CAPACITY)
                .unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl ProcessorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namespace_prefixes(mut self, enabled: bool) -> Self {
        self.namespace_prefixes = enabled;
        self
    }

    pub fn string_interning(mut self, enabled: bool) -> Self {
        self.string_interning = enabled;
        self
    }

    pub fn max_depth(mut self, limit: Option<usize>) -> Self {
        self.max_depth = limit;
        self
    }

    pub fn interner_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.interner_capacity = capacity;
        self
    }

    /// Current value of a SAX feature
    pub fn feature(&self, name: &str) -> Result<bool, FeatureError> {
        match name {
            features::NAMESPACES => Ok(true),
            features::NAMESPACE_PREFIXES => Ok(self.namespace_prefixes),
            features::STRING_INTERNING => Ok(self.string_interning),
            features::EXTERNAL_GENERAL_ENTITIES | features::EXTERNAL_PARAMETER_ENTITIES => Ok(true),
            _ => Err(FeatureError::NotRecognized(name.to_string())),
        }
    }

    /// Set a SAX feature
    ///
    /// Namespace processing is always on; turning it off is not supported.
    /// Entity features are accepted and ignored since a buffer never refers
    /// to external entities.
    pub fn set_feature(&mut self, name: &str, value: bool) -> Result<(), FeatureError> {
        match name {
            features::NAMESPACES => {
                if value {
                    Ok(())
                } else {
                    Err(FeatureError::NotSupported(format!("{name}:{value}")))
                }
            }
            features::NAMESPACE_PREFIXES => {
                self.namespace_prefixes = value;
                Ok(())
            }
            features::STRING_INTERNING => {
                self.string_interning = value;
                Ok(())
            }
            features::EXTERNAL_GENERAL_ENTITIES | features::EXTERNAL_PARAMETER_ENTITIES => {
                warn!("ignoring feature {name}={value}: buffers hold no external entities");
                Ok(())
            }
            _ => Err(FeatureError::NotRecognized(name.to_string())),
        }
    }
}

/// Buffer creator options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorConfig {
    /// Store character content as copies in the object stream instead of
    /// runs in the character stream
    pub copy_characters: bool,
    pub structure_capacity: usize,
    pub structure_string_capacity: usize,
    pub content_character_capacity: usize,
    pub content_object_capacity: usize,
}

impl Default for CreatorConfig {
    fn default() -> Self {
        CreatorConfig {
            copy_characters: false,
            structure_capacity: capacity::STRUCTURE,
            structure_string_capacity: capacity::STRUCTURE_STRINGS,
            content_character_capacity: capacity::CONTENT_CHARACTERS,
            content_object_capacity: capacity::CONTENT_OBJECTS,
        }
    }
}

impl CreatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copy_characters(mut self, enabled: bool) -> Self {
        self.copy_characters = enabled;
        self
    }

    /// Segment capacity of the content-character stream
    pub fn content_character_capacity(mut self, capacity: usize) -> Self {
        self.content_character_capacity = capacity;
        self
    }

    /// Use one segment capacity for every stream
    pub fn segment_capacity(mut self, capacity: usize) -> Self {
        self.structure_capacity = capacity;
        self.structure_string_capacity = capacity;
        self.content_character_capacity = capacity;
        self.content_object_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_features() {
        let config = ProcessorConfig::default();
        assert_eq!(config.feature(features::NAMESPACES), Ok(true));
        assert_eq!(config.feature(features::NAMESPACE_PREFIXES), Ok(false));
        assert_eq!(config.feature(features::STRING_INTERNING), Ok(false));
        assert_eq!(config.feature(features::EXTERNAL_GENERAL_ENTITIES), Ok(true));
    }

    #[test]
    fn test_set_features() {
        let mut config = ProcessorConfig::default();
        config.set_feature(features::NAMESPACE_PREFIXES, true).unwrap();
        config.set_feature(features::STRING_INTERNING, true).unwrap();
        config.set_feature(features::EXTERNAL_PARAMETER_ENTITIES, false).unwrap();

        assert!(config.namespace_prefixes);
        assert!(config.string_interning);
        assert_eq!(config.feature(features::EXTERNAL_PARAMETER_ENTITIES), Ok(true));
    }

    #[test]
    fn test_namespaces_cannot_be_disabled() {
        let mut config = ProcessorConfig::default();
        assert!(config.set_feature(features::NAMESPACES, true).is_ok());
        assert!(matches!(
            config.set_feature(features::NAMESPACES, false),
            Err(FeatureError::NotSupported(_))
        ));
    }

    #[test]
    fn test_unknown_feature() {
        let mut config = ProcessorConfig::default();
        let unknown = "http://example.com/unknown";
        assert_eq!(
            config.feature(unknown),
            Err(FeatureError::NotRecognized(unknown.to_string()))
        );
        assert!(config.set_feature(unknown, true).is_err());
    }

    #[test]
    fn test_builders() {
        let config = ProcessorConfig::new()
            .namespace_prefixes(true)
            .max_depth(Some(8));
        assert!(config.namespace_prefixes);
        assert_eq!(config.max_depth, Some(8));

        let creator = CreatorConfig::new().copy_characters(true).segment_capacity(16);
        assert!(creator.copy_characters);
        assert_eq!(creator.content_object_capacity, 16);
    }
}
