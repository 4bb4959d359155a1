//! The struct universe: every struct definition seen across the loaded
//! packages, keyed by `(package path, type name)`.
//!
//! This is the analyzer's view of "struct types reachable by name". The
//! field catalog walks it at query time to answer embedded-field and
//! whole-struct sensitivity questions, including for types declared in
//! other loaded packages.

use rustc_hash::{FxHashMap, FxHashSet};

use super::GoType;

/// One field group of a struct definition.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Declared names; empty for embedded fields.
    pub names: Vec<String>,
    pub ty: GoType,
    /// Tag text with surrounding quotes stripped.
    pub tag: Option<String>,
    pub embedded: bool,
}

impl FieldDef {
    /// The name an embedded field is promoted under: the base name of its
    /// type, pointer embedding included.
    pub fn embedded_name(&self) -> Option<&str> {
        if !self.embedded {
            return None;
        }
        self.ty.deref_once().as_named().map(|(_, name)| name)
    }
}

/// A struct type definition.
#[derive(Debug, Clone)]
pub struct StructDef {
    pub pkg: String,
    pub name: String,
    pub fields: Vec<FieldDef>,
}

/// All struct definitions from the loaded packages.
#[derive(Debug, Default)]
pub struct TypeUniverse {
    structs: FxHashMap<(String, String), StructDef>,
}

impl TypeUniverse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, def: StructDef) {
        self.structs
            .insert((def.pkg.clone(), def.name.clone()), def);
    }

    pub fn get(&self, pkg: &str, name: &str) -> Option<&StructDef> {
        self.structs.get(&(pkg.to_string(), name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.structs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }

    /// The type of field `field` on struct `(pkg, name)`, following
    /// embedded structs for promoted fields. Embedded fields themselves
    /// are addressable by their type's base name.
    pub fn field_type(&self, pkg: &str, name: &str, field: &str) -> Option<GoType> {
        let mut visited = FxHashSet::default();
        self.field_type_inner(pkg, name, field, &mut visited)
    }

    fn field_type_inner(
        &self,
        pkg: &str,
        name: &str,
        field: &str,
        visited: &mut FxHashSet<(String, String)>,
    ) -> Option<GoType> {
        if !visited.insert((pkg.to_string(), name.to_string())) {
            return None;
        }
        let def = self.get(pkg, name)?;

        for f in &def.fields {
            if f.names.iter().any(|n| n == field) {
                return Some(f.ty.clone());
            }
            if f.embedded && f.embedded_name() == Some(field) {
                return Some(f.ty.clone());
            }
        }

        // Promoted fields through embedded structs.
        for f in &def.fields {
            if !f.embedded {
                continue;
            }
            if let Some((epkg, ename)) = f.ty.deref_once().as_named() {
                let (epkg, ename) = (epkg.to_string(), ename.to_string());
                if let Some(t) = self.field_type_inner(&epkg, &ename, field, visited) {
                    return Some(t);
                }
            }
        }
        None
    }
}
