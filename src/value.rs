//! Typed leaf values and the decoder turning element text into them.
//!
//! Der Parser ruft den [`ValueDecoder`] mit dem unveraenderten Elementtext
//! auf. Whitespace-Behandlung ist Sache des Decoders: `string` bleibt exakt
//! erhalten, alle anderen eingebauten Typen werden vor dem Parsen getrimmt.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use base64::Engine;

use crate::namespace::NamespaceContext;
use crate::qname::QName;
use crate::schema::{IntegerKind, TypeDefinition};
use crate::{Error, Result};

// ============================================================================
// TypedValue
// ============================================================================

/// A decoded leaf or leaf-list value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    String(String),
    Boolean(bool),
    Empty,
    Int(i64),
    Uint(u64),
    /// decimal64: `value / 10^fraction_digits`.
    Decimal { value: i64, fraction_digits: u8 },
    Enum(Rc<str>),
    /// Gesetzte Bits in Deklarationsreihenfolge.
    Bits(Vec<Rc<str>>),
    Binary(Vec<u8>),
    /// identityref; `prefix` ist der im Dokument verwendete XML-Prefix.
    IdentityRef { identity: QName, prefix: Option<Rc<str>> },
    InstanceIdentifier(String),
}

impl TypedValue {
    /// Kanonische lexikalische Form (RFC 7950, XML-Encoding).
    pub fn to_lexical(&self) -> Cow<'_, str> {
        match self {
            Self::String(s) => Cow::Borrowed(s),
            Self::Boolean(true) => Cow::Borrowed("true"),
            Self::Boolean(false) => Cow::Borrowed("false"),
            Self::Empty => Cow::Borrowed(""),
            Self::Int(v) => Cow::Owned(v.to_string()),
            Self::Uint(v) => Cow::Owned(v.to_string()),
            Self::Decimal { value, fraction_digits } => Cow::Owned(format_decimal64(*value, *fraction_digits)),
            Self::Enum(name) => Cow::Borrowed(name),
            Self::Bits(bits) => Cow::Owned(bits.join(" ")),
            Self::Binary(bytes) => Cow::Owned(base64::engine::general_purpose::STANDARD.encode(bytes)),
            Self::IdentityRef { identity, prefix } => match prefix {
                Some(prefix) => Cow::Owned(format!("{prefix}:{}", identity.local_name())),
                None => Cow::Borrowed(identity.local_name()),
            },
            Self::InstanceIdentifier(path) => Cow::Borrowed(path),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_lexical())
    }
}

/// Kanonisch: mindestens eine Nachkommastelle, keine weiteren Nullen am Ende.
fn format_decimal64(value: i64, fraction_digits: u8) -> String {
    let scale = 10u64.pow(u32::from(fraction_digits));
    let magnitude = value.unsigned_abs();
    let integral = magnitude / scale;
    let fractional = magnitude % scale;
    let mut digits = format!("{fractional:0width$}", width = usize::from(fraction_digits));
    while digits.len() > 1 && digits.ends_with('0') {
        digits.pop();
    }
    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}{integral}.{digits}")
}

// ============================================================================
// ValueDecoder
// ============================================================================

/// Translates element text into a typed value for a declared type.
pub trait ValueDecoder {
    /// Fehler sind `Error::InvalidValue`; der Parser ersetzt den Knotennamen.
    fn decode(&self, ty: &TypeDefinition, namespaces: &NamespaceContext, text: &str) -> Result<TypedValue>;
}

/// Decoder for the built-in YANG types in their XML encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinDecoder;

impl ValueDecoder for BuiltinDecoder {
    fn decode(&self, ty: &TypeDefinition, namespaces: &NamespaceContext, text: &str) -> Result<TypedValue> {
        match ty {
            TypeDefinition::String => Ok(TypedValue::String(text.to_owned())),
            TypeDefinition::Boolean => match text.trim() {
                "true" => Ok(TypedValue::Boolean(true)),
                "false" => Ok(TypedValue::Boolean(false)),
                other => Err(invalid(ty, format!("invalid boolean: {other:?}"))),
            },
            TypeDefinition::Empty => {
                if text.trim().is_empty() {
                    Ok(TypedValue::Empty)
                } else {
                    Err(invalid(ty, "type empty must not carry a value"))
                }
            }
            TypeDefinition::Integer(kind) => decode_integer(*kind, text.trim()).map_err(|msg| invalid(ty, msg)),
            TypeDefinition::Decimal64 { fraction_digits } => {
                decode_decimal64(*fraction_digits, text.trim()).map_err(|msg| invalid(ty, msg))
            }
            TypeDefinition::Enumeration(names) => {
                let text = text.trim();
                names
                    .iter()
                    .find(|n| &***n == text)
                    .map(|n| TypedValue::Enum(Rc::clone(n)))
                    .ok_or_else(|| invalid(ty, format!("{text:?} is not a valid enum")))
            }
            TypeDefinition::Bits(names) => decode_bits(names, text).map_err(|msg| invalid(ty, msg)),
            TypeDefinition::Binary => {
                let compact: Vec<u8> = text.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
                base64::engine::general_purpose::STANDARD
                    .decode(compact)
                    .map(TypedValue::Binary)
                    .map_err(|e| invalid(ty, format!("invalid base64: {e}")))
            }
            TypeDefinition::IdentityRef { identities, .. } => {
                decode_identityref(identities, namespaces, text.trim()).map_err(|msg| invalid(ty, msg))
            }
            TypeDefinition::Union(members) => members
                .iter()
                .find_map(|member| self.decode(member, namespaces, text).ok())
                .ok_or_else(|| invalid(ty, format!("{:?} matches no union member", text.trim()))),
            TypeDefinition::LeafRef { target, .. } => self.decode(target, namespaces, text),
            TypeDefinition::InstanceIdentifier => {
                let path = text.trim();
                if path.starts_with('/') {
                    Ok(TypedValue::InstanceIdentifier(path.to_owned()))
                } else {
                    Err(invalid(ty, format!("instance-identifier must be absolute: {path:?}")))
                }
            }
            TypeDefinition::Derived { base, .. } => self.decode(base, namespaces, text),
        }
    }
}

fn invalid(ty: &TypeDefinition, message: impl Into<Cow<'static, str>>) -> Error {
    Error::invalid_value(ty.builtin_name(), message)
}

/// Dezimal, `0x` hexadezimal oder fuehrende `0` oktal, jeweils mit Vorzeichen.
fn decode_integer(kind: IntegerKind, text: &str) -> std::result::Result<TypedValue, String> {
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = if let Some(hex) = unsigned.strip_prefix("0x").or_else(|| unsigned.strip_prefix("0X")) {
        (16, hex)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (8, &unsigned[1..])
    } else {
        (10, unsigned)
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("invalid {}: {text:?}", kind.name()));
    }
    let magnitude =
        i128::from_str_radix(digits, radix).map_err(|_| format!("invalid {}: {text:?}", kind.name()))?;
    let value = if negative { -magnitude } else { magnitude };
    let (min, max) = kind.range();
    if value < min || value > max {
        return Err(format!("{text} is out of range for {}", kind.name()));
    }
    // Bereich ist geprueft, die Konvertierungen koennen nicht fehlschlagen
    if kind.is_signed() {
        i64::try_from(value).map(TypedValue::Int).map_err(|e| e.to_string())
    } else {
        u64::try_from(value).map(TypedValue::Uint).map_err(|e| e.to_string())
    }
}

fn decode_decimal64(fraction_digits: u8, text: &str) -> std::result::Result<TypedValue, String> {
    if !(1..=18).contains(&fraction_digits) {
        return Err(format!("fraction-digits {fraction_digits} outside 1..=18"));
    }
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (integral, fractional) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if integral.is_empty() || !all_digits(integral) || !all_digits(fractional) {
        return Err(format!("invalid decimal64: {text:?}"));
    }
    if fractional.len() > usize::from(fraction_digits) {
        return Err(format!("{text} has more than {fraction_digits} fraction digits"));
    }
    let scaled = format!("{integral}{fractional:0<width$}", width = usize::from(fraction_digits));
    let magnitude: i128 = scaled
        .parse()
        .map_err(|_| format!("invalid decimal64: {text:?}"))?;
    let value = if negative { -magnitude } else { magnitude };
    let value = i64::try_from(value).map_err(|_| format!("{text} is out of range for decimal64"))?;
    Ok(TypedValue::Decimal { value, fraction_digits })
}

fn decode_bits(names: &[Rc<str>], text: &str) -> std::result::Result<TypedValue, String> {
    let mut set = Vec::new();
    for token in text.split_ascii_whitespace() {
        if !names.iter().any(|n| &**n == token) {
            return Err(format!("{token:?} is not a valid bit"));
        }
        if set.contains(&token) {
            return Err(format!("bit {token:?} set twice"));
        }
        set.push(token);
    }
    Ok(TypedValue::Bits(
        names
            .iter()
            .filter(|n| set.contains(&&***n))
            .cloned()
            .collect(),
    ))
}

fn decode_identityref(
    identities: &[QName],
    namespaces: &NamespaceContext,
    text: &str,
) -> std::result::Result<TypedValue, String> {
    let (prefix, local) = match text.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, text),
    };
    if local.is_empty() {
        return Err("empty identityref".to_owned());
    }
    let namespace = namespaces
        .lookup(prefix.unwrap_or(""))
        .ok_or_else(|| format!("prefix of {text:?} is not bound"))?;
    let identity = QName::new(namespace, local);
    if !identities.is_empty() && !identities.contains(&identity) {
        return Err(format!("{identity} is not derived from the identityref base"));
    }
    Ok(TypedValue::IdentityRef {
        identity,
        prefix: prefix.map(Rc::from),
    })
}
