//! Named field layouts used to resolve `register:type.member` offsets.
//!
//! A [`Type`] is built one member at a time while a `.type` block is open and
//! becomes immutable once handed to the [`TypeRegistry`].

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::error::AsmError;

/// Built-in primitive types as `(name, size)`. Alignment equals size.
pub const PRIMITIVES: &[(&str, u64)] = &[
    ("byte", 1),
    ("int16", 2),
    ("int32", 4),
    ("int64", 8),
    ("float", 4),
    ("double", 8),
];

/// One member of a [`Type`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Member {
    /// Member name.
    pub name: String,
    /// Name of the member's type.
    pub type_name: String,
    /// Element count (1 unless declared as `name[count]`).
    pub count: u64,
    /// Byte offset within the parent type.
    pub offset: u64,
}

/// A named field layout.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Type {
    name: String,
    size: u64,
    align: u64,
    packed: bool,
    members: Vec<Member>,
}

impl Type {
    /// Create an empty aggregate.
    pub fn new(name: &str, packed: bool) -> Self {
        Self {
            name: name.to_string(),
            size: 0,
            align: 1,
            packed,
            members: Vec::new(),
        }
    }

    /// Create a primitive whose alignment equals its size.
    pub fn primitive(name: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            size,
            align: size.max(1),
            packed: false,
            members: Vec::new(),
        }
    }

    /// Type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unpadded size: the end of the last member.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Alignment in bytes (a power of two).
    pub fn align(&self) -> u64 {
        self.align
    }

    /// Whether members are laid out without padding.
    pub fn is_packed(&self) -> bool {
        self.packed
    }

    /// Size including tail padding up to the type's own alignment.
    /// Packed types are never padded.
    pub fn effective_size(&self) -> u64 {
        if self.packed {
            self.size
        } else {
            // add_member keeps the padded size representable.
            align_up(self.size, self.align).unwrap_or(self.size)
        }
    }

    /// Members in declaration order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Look up a member by name.
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Append `count` consecutive elements of `ty` as member `name`.
    ///
    /// # Errors
    ///
    /// Returns [`AsmError::DuplicateMember`] if `name` is already a member
    /// and [`AsmError::TypeTooLarge`] if the layout no longer fits in a `u64`.
    pub fn add_member(&mut self, name: &str, ty: &Type, count: u64) -> Result<u64, AsmError> {
        if self.member(name).is_some() {
            return Err(AsmError::DuplicateMember {
                type_name: self.name.clone(),
                member: name.to_string(),
            });
        }
        let too_large = || AsmError::TypeTooLarge {
            type_name: self.name.clone(),
            member: name.to_string(),
        };
        let offset = if self.packed {
            Some(self.size)
        } else {
            align_up(self.size, ty.align)
        }
        .ok_or_else(too_large)?;
        let size = ty
            .effective_size()
            .checked_mul(count)
            .and_then(|bytes| offset.checked_add(bytes))
            .ok_or_else(too_large)?;
        let align = self.align.max(ty.align);
        if !self.packed && align_up(size, align).is_none() {
            return Err(too_large());
        }
        self.size = size;
        self.align = align;
        self.members.push(Member {
            name: name.to_string(),
            type_name: ty.name.clone(),
            count,
            offset,
        });
        Ok(offset)
    }
}

fn align_up(value: u64, align: u64) -> Option<u64> {
    if align <= 1 {
        return Some(value);
    }
    value.checked_next_multiple_of(align)
}

/// Owns every registered [`Type`], keyed by name.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: BTreeMap<String, Type>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// A registry holding only the built-in primitives.
    pub fn new() -> Self {
        let mut types = BTreeMap::new();
        for &(name, size) in PRIMITIVES {
            types.insert(name.to_string(), Type::primitive(name, size));
        }
        Self { types }
    }

    /// Register a finished type.
    ///
    /// # Errors
    ///
    /// Returns [`AsmError::DuplicateType`] if the name is taken.
    pub fn register(&mut self, ty: Type) -> Result<(), AsmError> {
        if self.types.contains_key(&ty.name) {
            return Err(AsmError::DuplicateType { name: ty.name });
        }
        log::debug!(
            "registered type '{}' (size {}, align {}, {} members)",
            ty.name,
            ty.effective_size(),
            ty.align,
            ty.members.len()
        );
        self.types.insert(ty.name.clone(), ty);
        Ok(())
    }

    /// Whether a type with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Number of registered types, primitives included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always false: the primitives are registered up front.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Look up a type by name.
    ///
    /// # Errors
    ///
    /// Returns [`AsmError::UnknownType`] if absent.
    pub fn type_of(&self, name: &str) -> Result<&Type, AsmError> {
        self.types.get(name).ok_or_else(|| AsmError::UnknownType {
            name: name.to_string(),
        })
    }

    /// Byte offset of a `type.member.member…` path from the start of `type`.
    ///
    /// A bare type name has offset 0.
    ///
    /// # Errors
    ///
    /// Returns [`AsmError::UnknownType`] if the leading type does not exist
    /// and [`AsmError::UnknownMember`] for the first missing member.
    pub fn offset_of(&self, path: &str) -> Result<u64, AsmError> {
        let mut parts = path.split('.');
        let head = parts.next().unwrap_or_default();
        let mut current = self.type_of(head)?;
        let mut offset = 0;
        for part in parts {
            let member = current.member(part).ok_or_else(|| AsmError::UnknownMember {
                path: path.to_string(),
                member: part.to_string(),
            })?;
            offset += member.offset;
            current = self.type_of(&member.type_name)?;
        }
        Ok(offset)
    }

    /// Resolve an identifier used inside a constant expression: a bare type
    /// name yields its effective size, a dotted path its member offset.
    ///
    /// Returns `Ok(None)` when the first segment is not a registered type,
    /// so that register names and other words read as "not a number".
    pub(crate) fn resolve_symbol(&self, ident: &str) -> Result<Option<i128>, AsmError> {
        let head = ident.split('.').next().unwrap_or_default();
        let Some(ty) = self.types.get(head) else {
            return Ok(None);
        };
        if head.len() == ident.len() {
            return Ok(Some(ty.effective_size() as i128));
        }
        self.offset_of(ident).map(|off| Some(off as i128))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int32() -> Type {
        Type::primitive("int32", 4)
    }

    #[test]
    fn primitives_are_preregistered() {
        let reg = TypeRegistry::new();
        for &(name, size) in PRIMITIVES {
            let ty = reg.type_of(name).unwrap();
            assert_eq!(ty.size(), size);
            assert_eq!(ty.align(), size);
        }
        assert_eq!(reg.len(), PRIMITIVES.len());
    }

    #[test]
    fn packed_layout_has_no_padding() {
        let mut t = Type::new("p", true);
        t.add_member("f1", &int32(), 1).unwrap();
        t.add_member("f2", &Type::primitive("byte", 1), 1).unwrap();
        assert_eq!(t.member("f1").unwrap().offset, 0);
        assert_eq!(t.member("f2").unwrap().offset, 4);
        assert_eq!(t.effective_size(), 5);
    }

    #[test]
    fn unpacked_byte_after_int32_needs_no_padding() {
        let mut t = Type::new("u", false);
        t.add_member("f1", &int32(), 1).unwrap();
        t.add_member("f2", &Type::primitive("byte", 1), 1).unwrap();
        assert_eq!(t.member("f2").unwrap().offset, 4);
        assert_eq!(t.size(), 5);
        assert_eq!(t.effective_size(), 8);
    }

    #[test]
    fn unpacked_double_after_int32_pads_to_eight() {
        let mut t = Type::new("u", false);
        t.add_member("a", &int32(), 1).unwrap();
        t.add_member("b", &Type::primitive("double", 8), 1).unwrap();
        assert_eq!(t.member("b").unwrap().offset, 8);
        assert_eq!(t.align(), 8);
        assert_eq!(t.effective_size(), 16);
    }

    #[test]
    fn array_members_take_count_elements() {
        let mut t = Type::new("buf", false);
        t.add_member("len", &int32(), 1).unwrap();
        t.add_member("data", &Type::primitive("byte", 1), 10).unwrap();
        t.add_member("tail", &int32(), 1).unwrap();
        assert_eq!(t.member("data").unwrap().offset, 4);
        assert_eq!(t.member("tail").unwrap().offset, 16);
    }

    #[test]
    fn oversized_array_is_rejected() {
        let mut t = Type::new("t", false);
        let err = t
            .add_member("a", &Type::primitive("int64", 8), 0x7fff_ffff_ffff_ffff)
            .unwrap_err();
        assert_eq!(
            err,
            AsmError::TypeTooLarge {
                type_name: "t".into(),
                member: "a".into()
            }
        );
        assert_eq!(t.size(), 0);
        assert!(t.members().is_empty());
    }

    #[test]
    fn padding_past_u64_is_rejected() {
        let mut t = Type::new("t", false);
        t.add_member("a", &Type::primitive("byte", 1), u64::MAX - 2).unwrap();
        let err = t.add_member("b", &int32(), 1).unwrap_err();
        assert!(matches!(err, AsmError::TypeTooLarge { .. }));
        assert_eq!(t.members().len(), 1);

        let mut packed = Type::new("p", true);
        packed.add_member("a", &Type::primitive("byte", 1), u64::MAX).unwrap();
        assert!(packed.add_member("b", &Type::primitive("byte", 1), 1).is_err());
    }

    #[test]
    fn duplicate_member_rejected() {
        let mut t = Type::new("t", false);
        t.add_member("x", &int32(), 1).unwrap();
        let err = t.add_member("x", &int32(), 1).unwrap_err();
        assert!(matches!(err, AsmError::DuplicateMember { .. }));
    }

    #[test]
    fn duplicate_type_rejected() {
        let mut reg = TypeRegistry::new();
        reg.register(Type::new("point", false)).unwrap();
        let err = reg.register(Type::new("point", true)).unwrap_err();
        assert_eq!(
            err,
            AsmError::DuplicateType {
                name: "point".into()
            }
        );
        let err = reg.register(Type::new("int32", false)).unwrap_err();
        assert!(matches!(err, AsmError::DuplicateType { .. }));
    }

    #[test]
    fn unknown_type_lookup() {
        let reg = TypeRegistry::new();
        assert!(matches!(
            reg.type_of("nope"),
            Err(AsmError::UnknownType { .. })
        ));
        assert!(matches!(
            reg.offset_of("nope.x"),
            Err(AsmError::UnknownType { .. })
        ));
    }

    #[test]
    fn nested_offset_accumulates() {
        let mut reg = TypeRegistry::new();
        let mut point = Type::new("point", false);
        point.add_member("x", &int32(), 1).unwrap();
        point.add_member("y", &int32(), 1).unwrap();
        reg.register(point).unwrap();

        let mut rect = Type::new("rect", false);
        rect.add_member("tag", &Type::primitive("byte", 1), 1).unwrap();
        let point = reg.type_of("point").unwrap().clone();
        rect.add_member("min", &point, 1).unwrap();
        rect.add_member("max", &point, 1).unwrap();
        reg.register(rect).unwrap();

        assert_eq!(reg.offset_of("rect").unwrap(), 0);
        assert_eq!(reg.offset_of("rect.min").unwrap(), 4);
        assert_eq!(reg.offset_of("rect.max.y").unwrap(), 16);
        let err = reg.offset_of("rect.max.z").unwrap_err();
        assert_eq!(
            err,
            AsmError::UnknownMember {
                path: "rect.max.z".into(),
                member: "z".into()
            }
        );
    }

    #[test]
    fn resolve_symbol_distinguishes_sizes_offsets_and_words() {
        let mut reg = TypeRegistry::new();
        let mut point = Type::new("point", false);
        point.add_member("x", &int32(), 1).unwrap();
        point.add_member("y", &int32(), 1).unwrap();
        reg.register(point).unwrap();

        assert_eq!(reg.resolve_symbol("point").unwrap(), Some(8));
        assert_eq!(reg.resolve_symbol("point.y").unwrap(), Some(4));
        assert_eq!(reg.resolve_symbol("rax").unwrap(), None);
        assert!(reg.resolve_symbol("point.w").is_err());
    }
}
