//! Attribute type strings: `"integer,optional"`, `"string,primarykey"`, `"array,$tag"`.
//!
//! The grammar is a comma-separated token list. Flag tokens (`optional`,
//! `primarykey`/`primary`, `array`) may appear in any order; exactly one token
//! should remain, naming either a primitive semantic type or a `$`-prefixed
//! object reference.

use std::fmt;

/// Closed set of primitive types an attribute may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SemanticType {
    Date,
    Datetime,
    Int,
    Integer,
    Integer16,
    Integer32,
    Integer64,
    Decimal,
    Double,
    Real,
    Float,
    String,
    Text,
    Boolean,
}

impl SemanticType {
    /// Looks up a schema type name. Returns `None` for anything outside the closed table.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let semantic_type = match name {
            "date" => Self::Date,
            "datetime" => Self::Datetime,
            "int" => Self::Int,
            "integer" => Self::Integer,
            "integer16" => Self::Integer16,
            "integer32" => Self::Integer32,
            "integer64" => Self::Integer64,
            "decimal" => Self::Decimal,
            "double" => Self::Double,
            "real" => Self::Real,
            "float" => Self::Float,
            "string" => Self::String,
            "text" => Self::Text,
            "boolean" => Self::Boolean,
            _ => return None,
        };
        Some(semantic_type)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Int => "int",
            Self::Integer => "integer",
            Self::Integer16 => "integer16",
            Self::Integer32 => "integer32",
            Self::Integer64 => "integer64",
            Self::Decimal => "decimal",
            Self::Double => "double",
            Self::Real => "real",
            Self::Float => "float",
            Self::String => "string",
            Self::Text => "text",
            Self::Boolean => "boolean",
        }
    }

    /// Persistent-store attribute type (Core Data `NS*AttributeType`).
    #[must_use]
    pub fn storage_type(self) -> &'static str {
        match self {
            Self::Date | Self::Datetime => "NSDateAttributeType",
            Self::Int | Self::Integer | Self::Integer32 => "NSInteger32AttributeType",
            Self::Integer16 => "NSInteger16AttributeType",
            Self::Integer64 => "NSInteger64AttributeType",
            Self::Decimal => "NSDecimalAttributeType",
            Self::Double | Self::Real => "NSDoubleAttributeType",
            Self::Float => "NSFloatAttributeType",
            Self::String | Self::Text => "NSStringAttributeType",
            Self::Boolean => "NSBooleanAttributeType",
        }
    }

    /// Runtime class holding the value on the generated object.
    #[must_use]
    pub fn runtime_type(self) -> &'static str {
        match self {
            Self::Date | Self::Datetime => "NSDate",
            Self::String | Self::Text => "NSString",
            Self::Int
            | Self::Integer
            | Self::Integer16
            | Self::Integer32
            | Self::Integer64
            | Self::Decimal
            | Self::Double
            | Self::Real
            | Self::Float
            | Self::Boolean => "NSNumber",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Flags extracted from an attribute string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeFlags {
    pub optional: bool,
    pub primary: bool,
    pub array: bool,
}

/// What the single remaining token names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Primitive(SemanticType),
    /// Object name with the `$` prefix removed.
    Object(String),
}

/// Outcome of resolving one attribute string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAttribute {
    pub type_ref: TypeRef,
    pub flags: AttributeFlags,
    /// Tokens left over after the authoritative type token. Non-empty means the
    /// string was ambiguous.
    pub ignored: Vec<String>,
}

/// Why an attribute string could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    /// Only flag tokens (or nothing at all) were given.
    MissingType,
    UnknownType(String),
}

/// Splits `raw` into flags and a type token.
///
/// When more than one non-flag token remains, the first one is authoritative
/// and the rest are returned in `ignored`.
///
/// # Errors
///
/// Returns `AttributeError::MissingType` when no type token remains and
/// `AttributeError::UnknownType` when the token is neither an object reference
/// nor in the primitive table.
pub fn resolve(raw: &str) -> Result<ResolvedAttribute, AttributeError> {
    let mut flags = AttributeFlags::default();
    let mut remaining: Vec<String> = Vec::new();

    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token {
            "optional" => flags.optional = true,
            "primarykey" | "primary" => flags.primary = true,
            "array" => flags.array = true,
            other => remaining.push(other.to_string()),
        }
    }

    if remaining.is_empty() {
        return Err(AttributeError::MissingType);
    }
    let type_token: String = remaining.remove(0);

    let type_ref: TypeRef = if let Some(object_name) = type_token.strip_prefix('$') {
        TypeRef::Object(object_name.to_string())
    } else {
        match SemanticType::from_name(&type_token) {
            Some(semantic_type) => TypeRef::Primitive(semantic_type),
            None => return Err(AttributeError::UnknownType(type_token)),
        }
    };

    Ok(ResolvedAttribute {
        type_ref,
        flags,
        ignored: remaining,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(optional: bool, primary: bool, array: bool) -> AttributeFlags {
        AttributeFlags {
            optional,
            primary,
            array,
        }
    }

    #[test]
    fn bare_primitive_has_no_flags() {
        let resolved: ResolvedAttribute = resolve("string").unwrap();
        assert_eq!(resolved.type_ref, TypeRef::Primitive(SemanticType::String));
        assert_eq!(resolved.flags, AttributeFlags::default());
        assert!(resolved.ignored.is_empty());
    }

    #[test]
    fn flags_are_order_independent() {
        let permutations: [&str; 6] = [
            "integer,optional,primary,array",
            "optional,integer,array,primary",
            "array,primary,optional,integer",
            "primary,array,integer,optional",
            "integer,array,optional,primary",
            "optional,array,primary,integer",
        ];
        for raw in permutations {
            let resolved: ResolvedAttribute = resolve(raw).unwrap();
            assert_eq!(
                resolved.type_ref,
                TypeRef::Primitive(SemanticType::Integer),
                "{raw}"
            );
            assert_eq!(resolved.flags, flags(true, true, true), "{raw}");
        }
    }

    #[test]
    fn every_flag_subset_is_extracted() {
        let tokens: [&str; 3] = ["optional", "primary", "array"];
        for mask in 0_u8..8 {
            let mut parts: Vec<&str> = vec!["date"];
            for (bit, token) in tokens.into_iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    parts.insert(0, token);
                }
            }
            let resolved: ResolvedAttribute = resolve(&parts.join(",")).unwrap();
            assert_eq!(resolved.type_ref, TypeRef::Primitive(SemanticType::Date));
            assert_eq!(
                resolved.flags,
                flags(mask & 1 != 0, mask & 2 != 0, mask & 4 != 0)
            );
        }
    }

    #[test]
    fn primarykey_and_primary_merge() {
        let resolved: ResolvedAttribute = resolve("string,primarykey,primary").unwrap();
        assert!(resolved.flags.primary);
        assert!(resolved.ignored.is_empty());
    }

    #[test]
    fn whitespace_around_tokens_is_ignored() {
        let resolved: ResolvedAttribute = resolve(" text , optional ").unwrap();
        assert_eq!(resolved.type_ref, TypeRef::Primitive(SemanticType::Text));
        assert!(resolved.flags.optional);
    }

    #[test]
    fn object_reference_strips_dollar() {
        let resolved: ResolvedAttribute = resolve("array,$tag").unwrap();
        assert_eq!(resolved.type_ref, TypeRef::Object("tag".to_string()));
        assert!(resolved.flags.array);
    }

    #[test]
    fn leftover_tokens_keep_first_as_authoritative() {
        let resolved: ResolvedAttribute = resolve("string,integer,optional").unwrap();
        assert_eq!(resolved.type_ref, TypeRef::Primitive(SemanticType::String));
        assert_eq!(resolved.ignored, vec!["integer".to_string()]);
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert_eq!(
            resolve("uuid,optional").unwrap_err(),
            AttributeError::UnknownType("uuid".to_string())
        );
    }

    #[test]
    fn flags_without_type_are_rejected() {
        assert_eq!(resolve("optional").unwrap_err(), AttributeError::MissingType);
        assert_eq!(resolve("").unwrap_err(), AttributeError::MissingType);
    }

    #[test]
    fn type_tables_cover_aliases() {
        assert_eq!(
            SemanticType::Real.storage_type(),
            SemanticType::Double.storage_type()
        );
        assert_eq!(SemanticType::Datetime.runtime_type(), "NSDate");
        assert_eq!(SemanticType::Boolean.runtime_type(), "NSNumber");
        assert_eq!(
            SemanticType::Int.storage_type(),
            "NSInteger32AttributeType"
        );
    }

    #[test]
    fn names_round_trip_through_table() {
        for name in [
            "date",
            "datetime",
            "int",
            "integer",
            "integer16",
            "integer32",
            "integer64",
            "decimal",
            "double",
            "real",
            "float",
            "string",
            "text",
            "boolean",
        ] {
            let semantic_type: SemanticType = SemanticType::from_name(name).unwrap();
            assert_eq!(semantic_type.name(), name);
        }
    }
}
