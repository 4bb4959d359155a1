//! The field catalog: which fields and which struct types are sensitive.
//!
//! A field is sensitive when its tag contains `sensitive:"true"` (the
//! back-slash-escaped spelling is accepted too). A struct type is
//! sensitive when it declares a sensitive field or embeds — by value or
//! by pointer, transitively — a struct that is. Embedded walks run over
//! the type universe with a visited set, so cyclic named types terminate.

use std::sync::LazyLock;

use aho_corasick::AhoCorasick;
use rustc_hash::FxHashSet;

use crate::resolve::TypeUniverse;
use crate::syntax::ast::{Decl, File, TypeDeclKind};

/// Both accepted spellings of the sensitive tag.
static SENSITIVE_TAG_AC: LazyLock<AhoCorasick> = LazyLock::new(|| {
    AhoCorasick::new([r#"sensitive:"true""#, r#"sensitive:\"true\""#]).expect("valid patterns")
});

/// Whether a raw tag string marks its field sensitive.
#[inline]
pub fn has_sensitive_tag(tag: &str) -> bool {
    SENSITIVE_TAG_AC.is_match(tag)
}

/// Sensitive fields and struct types of one package, plus query-time
/// access to foreign struct types through the universe. Frozen after
/// [`FieldCatalog::build`].
pub struct FieldCatalog<'a> {
    universe: &'a TypeUniverse,
    /// `(type name, field name)` pairs with an explicit sensitive tag,
    /// short names scoped to the analyzed package.
    fields: FxHashSet<(String, String)>,
    /// Type names of the analyzed package with at least one explicitly
    /// tagged field.
    tagged_types: FxHashSet<String>,
}

impl<'a> FieldCatalog<'a> {
    /// Collect explicitly tagged fields from the package's type
    /// declarations. Embedded sensitivity is resolved lazily at query time.
    pub fn build(files: &[File], universe: &'a TypeUniverse) -> Self {
        let mut fields = FxHashSet::default();
        let mut tagged_types = FxHashSet::default();

        for file in files {
            for decl in &file.decls {
                let Decl::Type(td) = decl else { continue };
                let TypeDeclKind::Struct(st) = &td.kind else {
                    continue;
                };
                for field in &st.fields {
                    let Some(tag) = &field.tag else { continue };
                    if !has_sensitive_tag(tag) {
                        continue;
                    }
                    for name in &field.names {
                        fields.insert((td.name.name.clone(), name.name.clone()));
                    }
                    tagged_types.insert(td.name.name.clone());
                }
            }
        }

        tracing::debug!(
            sensitive_fields = fields.len(),
            "field catalog built"
        );

        Self {
            universe,
            fields,
            tagged_types,
        }
    }

    /// Whether field `field` of type `name` (declared in package `pkg`)
    /// is sensitive, either by direct tag or through an embedded struct
    /// that promotes a sensitive field of that name.
    pub fn is_sensitive_field(&self, pkg: &str, name: &str, field: &str) -> bool {
        if self.fields.contains(&(name.to_string(), field.to_string())) {
            return true;
        }
        let mut visited = FxHashSet::default();
        self.field_has_tag(pkg, name, field, &mut visited)
    }

    fn field_has_tag(
        &self,
        pkg: &str,
        name: &str,
        field: &str,
        visited: &mut FxHashSet<(String, String)>,
    ) -> bool {
        if !visited.insert((pkg.to_string(), name.to_string())) {
            return false;
        }
        let Some(def) = self.universe.get(pkg, name) else {
            return false;
        };
        for f in &def.fields {
            if f.names.iter().any(|n| n == field) {
                return f.tag.as_deref().is_some_and(has_sensitive_tag);
            }
            if f.embedded {
                if let Some((epkg, ename)) = f.ty.deref_once().as_named() {
                    let (epkg, ename) = (epkg.to_string(), ename.to_string());
                    if self.field_has_tag(&epkg, &ename, field, visited) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Whether struct type `name` (declared in package `pkg`) contains any
    /// sensitive field, directly or through embedding.
    pub fn struct_is_sensitive(&self, pkg: &str, name: &str) -> bool {
        if self.tagged_types.contains(name) {
            return true;
        }
        let mut visited = FxHashSet::default();
        self.struct_has_sensitive(pkg, name, &mut visited)
    }

    fn struct_has_sensitive(
        &self,
        pkg: &str,
        name: &str,
        visited: &mut FxHashSet<(String, String)>,
    ) -> bool {
        if !visited.insert((pkg.to_string(), name.to_string())) {
            return false;
        }
        let Some(def) = self.universe.get(pkg, name) else {
            return false;
        };
        for f in &def.fields {
            if f.tag.as_deref().is_some_and(has_sensitive_tag) {
                return true;
            }
            if f.embedded {
                if let Some((epkg, ename)) = f.ty.deref_once().as_named() {
                    let (epkg, ename) = (epkg.to_string(), ename.to_string());
                    if self.struct_has_sensitive(&epkg, &ename, visited) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::build_universe;
    use crate::syntax::parser::GoParser;
    use crate::syntax::{FileSet, NodeIdGen};

    fn catalog_for(source: &str) -> (Vec<File>, TypeUniverse) {
        let mut fset = FileSet::new();
        let id = fset.add("test.go");
        let mut ids = NodeIdGen::new();
        let file = GoParser::new()
            .unwrap()
            .parse_file(id, "test.go", source, &mut ids)
            .unwrap();
        let files = vec![file];
        let universe = build_universe("p", &files);
        (files, universe)
    }

    #[test]
    fn test_has_sensitive_tag_both_spellings() {
        assert!(has_sensitive_tag(r#"sensitive:"true""#));
        assert!(has_sensitive_tag(r#"json:"pw" sensitive:"true""#));
        assert!(has_sensitive_tag(r#"sensitive:\"true\""#));
        assert!(!has_sensitive_tag(r#"sensitive:"false""#));
        assert!(!has_sensitive_tag(r#"json:"password""#));
    }

    #[test]
    fn test_direct_field() {
        let (files, universe) = catalog_for(
            r#"
package p

type User struct {
	Name     string
	Password string `sensitive:"true"`
}
"#,
        );
        let catalog = FieldCatalog::build(&files, &universe);
        assert!(catalog.is_sensitive_field("p", "User", "Password"));
        assert!(!catalog.is_sensitive_field("p", "User", "Name"));
        assert!(catalog.struct_is_sensitive("p", "User"));
    }

    #[test]
    fn test_embedded_struct_sensitivity() {
        let (files, universe) = catalog_for(
            r#"
package p

type Inner struct {
	S string `sensitive:"true"`
}

type Outer struct {
	Inner
	D string
}

type PtrOuter struct {
	*Inner
}
"#,
        );
        let catalog = FieldCatalog::build(&files, &universe);
        assert!(catalog.struct_is_sensitive("p", "Outer"));
        assert!(catalog.struct_is_sensitive("p", "PtrOuter"));
        // Promoted field is reachable through the embedding walk.
        assert!(catalog.is_sensitive_field("p", "Outer", "S"));
        assert!(!catalog.is_sensitive_field("p", "Outer", "D"));
    }

    #[test]
    fn test_cyclic_embedding_terminates_and_detects() {
        let (files, universe) = catalog_for(
            r#"
package p

type A struct {
	*B
}

type B struct {
	*A
	Token string `sensitive:"true"`
}

type Clean struct {
	*Empty
}

type Empty struct {
	*Clean
}
"#,
        );
        let catalog = FieldCatalog::build(&files, &universe);
        assert!(catalog.struct_is_sensitive("p", "A"));
        assert!(catalog.struct_is_sensitive("p", "B"));
        assert!(!catalog.struct_is_sensitive("p", "Clean"));
    }

    #[test]
    fn test_unknown_type_is_not_sensitive() {
        let (files, universe) = catalog_for("package p\n");
        let catalog = FieldCatalog::build(&files, &universe);
        assert!(!catalog.struct_is_sensitive("p", "Missing"));
        assert!(!catalog.is_sensitive_field("p", "Missing", "F"));
    }
}
