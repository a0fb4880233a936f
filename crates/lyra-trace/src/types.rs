//! Specialization metadata referenced by frames
//!
//! The compiler owns a record per compiled specialization of a function:
//! its display name and the concrete parameter types it was compiled for.
//! Frames hold only a weak reference to these records (`Weak<SpecMeta>`),
//! so a frame stays usable after the metadata is discarded or the frame is
//! transferred to another process.

use crate::symbol::Sym;
use std::fmt;

/// Compiled-function metadata, owned by the runtime's method tables.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecMeta {
    /// Display name recorded at compile time.
    pub name: Sym,
    /// Concrete parameter types of this specialization, callee type first.
    /// Absent when the specialization was compiled without type records.
    pub param_types: Option<Vec<TypeDesc>>,
}

/// Description of one runtime type in a specialization signature.
#[derive(Debug, Clone)]
pub enum TypeDesc {
    /// A nominal runtime type, printed by name.
    Named {
        /// Fully-rendered type name, parameters included.
        name: Sym,
        /// Whether the type is fully concrete (no free parameters).
        concrete: bool,
    },
    /// A function-object type.
    Function {
        /// Name of the function object's type (e.g. `#inner#2`).
        type_name: Sym,
        /// Name the function dispatches under (e.g. `inner`).
        dispatch_name: Sym,
        /// Number of captured fields. Zero for plain named functions.
        field_count: usize,
        /// What the defining scope binds under `dispatch_name`, if anything.
        scope_binding: Option<Box<ScopeBinding>>,
    },
    /// The type of a type. A call through one of these is a construction
    /// call when the inner type is concrete.
    TypeOf(Box<TypeDesc>),
}

/// A name→type binding snapshot from a function type's defining scope.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeBinding {
    /// Bound name in the defining scope.
    pub name: Sym,
    /// Type of the bound value.
    pub ty: TypeDesc,
}

impl TypeDesc {
    /// Whether this type is fully concrete.
    pub fn is_concrete(&self) -> bool {
        match self {
            TypeDesc::Named { concrete, .. } => *concrete,
            TypeDesc::Function { .. } => true,
            TypeDesc::TypeOf(inner) => inner.is_concrete(),
        }
    }
}

/// Equality is over a type's identity: its names and shape. The
/// `scope_binding` snapshot is auxiliary display data and is excluded;
/// including it would make "the scope binds this exact type" structurally
/// unsatisfiable for any finite value, since the binding would have to
/// contain itself.
impl PartialEq for TypeDesc {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                TypeDesc::Named { name: a, concrete: ac },
                TypeDesc::Named { name: b, concrete: bc },
            ) => a == b && ac == bc,
            (
                TypeDesc::Function {
                    type_name: at,
                    dispatch_name: ad,
                    field_count: af,
                    ..
                },
                TypeDesc::Function {
                    type_name: bt,
                    dispatch_name: bd,
                    field_count: bf,
                    ..
                },
            ) => at == bt && ad == bd && af == bf,
            (TypeDesc::TypeOf(a), TypeDesc::TypeOf(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for TypeDesc {}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Named { name, .. } => write!(f, "{}", name),
            TypeDesc::Function { type_name, .. } => write!(f, "{}", type_name),
            TypeDesc::TypeOf(inner) => write!(f, "Type{{{}}}", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, concrete: bool) -> TypeDesc {
        TypeDesc::Named {
            name: Sym::intern(name),
            concrete,
        }
    }

    #[test]
    fn test_concrete_propagates_through_type_of() {
        let t = TypeDesc::TypeOf(Box::new(named("Point", true)));
        assert!(t.is_concrete());
        let u = TypeDesc::TypeOf(Box::new(named("AbstractPoint", false)));
        assert!(!u.is_concrete());
    }

    #[test]
    fn test_function_type_equality_ignores_scope_binding() {
        let bare = TypeDesc::Function {
            type_name: Sym::intern("typeof(inner)"),
            dispatch_name: Sym::intern("inner"),
            field_count: 0,
            scope_binding: None,
        };
        let bound = TypeDesc::Function {
            type_name: Sym::intern("typeof(inner)"),
            dispatch_name: Sym::intern("inner"),
            field_count: 0,
            scope_binding: Some(Box::new(ScopeBinding {
                name: Sym::intern("inner"),
                ty: bare.clone(),
            })),
        };
        assert_eq!(bare, bound);
    }

    #[test]
    fn test_display() {
        assert_eq!(named("Int64", true).to_string(), "Int64");
        let t = TypeDesc::TypeOf(Box::new(named("Point", true)));
        assert_eq!(t.to_string(), "Type{Point}");
        let f = TypeDesc::Function {
            type_name: Sym::intern("#fold#7"),
            dispatch_name: Sym::intern("fold"),
            field_count: 1,
            scope_binding: None,
        };
        assert_eq!(f.to_string(), "#fold#7");
    }
}
