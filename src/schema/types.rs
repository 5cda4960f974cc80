//! Declared types of leaf and leaf-list nodes.

use std::fmt;
use std::rc::Rc;

use crate::qname::QName;

/// Die acht eingebauten Integer-Typen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerKind {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
}

impl IntegerKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
        }
    }

    /// Inklusiver Wertebereich.
    pub fn range(self) -> (i128, i128) {
        match self {
            Self::Int8 => (i8::MIN.into(), i8::MAX.into()),
            Self::Int16 => (i16::MIN.into(), i16::MAX.into()),
            Self::Int32 => (i32::MIN.into(), i32::MAX.into()),
            Self::Int64 => (i64::MIN.into(), i64::MAX.into()),
            Self::Uint8 => (0, u8::MAX.into()),
            Self::Uint16 => (0, u16::MAX.into()),
            Self::Uint32 => (0, u32::MAX.into()),
            Self::Uint64 => (0, u64::MAX.into()),
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }
}

/// Type declaration of a leaf or leaf-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDefinition {
    String,
    Boolean,
    Empty,
    Integer(IntegerKind),
    /// decimal64 mit 1..=18 Nachkommastellen.
    Decimal64 { fraction_digits: u8 },
    Enumeration(Vec<Rc<str>>),
    Bits(Vec<Rc<str>>),
    Binary,
    /// identityref; `identities` enthaelt alle zulaessigen (abgeleiteten) Identities.
    /// Leer = keine Einschraenkung.
    IdentityRef { base: QName, identities: Vec<QName> },
    Union(Vec<TypeDefinition>),
    /// leafref mit bereits aufgeloestem Zieltyp.
    LeafRef { path: Rc<str>, target: Box<TypeDefinition> },
    InstanceIdentifier,
    /// Benannter typedef ueber einem Basistyp.
    Derived {
        name: QName,
        base: Box<TypeDefinition>,
        default: Option<Rc<str>>,
        description: Option<Rc<str>>,
    },
}

impl TypeDefinition {
    pub fn enumeration<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self::Enumeration(names.into_iter().map(Rc::from).collect())
    }

    pub fn bits<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self::Bits(names.into_iter().map(Rc::from).collect())
    }

    pub fn derived(name: QName, base: TypeDefinition) -> Self {
        Self::Derived {
            name,
            base: Box::new(base),
            default: None,
            description: None,
        }
    }

    pub fn leafref(path: &str, target: TypeDefinition) -> Self {
        Self::LeafRef {
            path: Rc::from(path),
            target: Box::new(target),
        }
    }

    /// Name des eingebauten Typs (fuer `Derived` der Name des typedef ohne Modul).
    pub fn builtin_name(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Empty => "empty",
            Self::Integer(kind) => kind.name(),
            Self::Decimal64 { .. } => "decimal64",
            Self::Enumeration(_) => "enumeration",
            Self::Bits(_) => "bits",
            Self::Binary => "binary",
            Self::IdentityRef { .. } => "identityref",
            Self::Union(_) => "union",
            Self::LeafRef { .. } => "leafref",
            Self::InstanceIdentifier => "instance-identifier",
            Self::Derived { name, .. } => name.local_name(),
        }
    }

    /// Default-Wert aus der typedef-Kette.
    pub fn default_value(&self) -> Option<&str> {
        match self {
            Self::Derived { default: Some(d), .. } => Some(d),
            Self::Derived { base, .. } => base.default_value(),
            _ => None,
        }
    }

    /// Letzter nicht-abgeleiteter Typ.
    pub fn resolved(&self) -> &TypeDefinition {
        match self {
            Self::Derived { base, .. } => base.resolved(),
            other => other,
        }
    }
}

impl fmt::Display for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.builtin_name())
    }
}
