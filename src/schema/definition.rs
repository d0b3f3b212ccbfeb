//! Collection definitions
//!
//! The per-type field table plus an encoder closure compiled once at
//! registration. The encoder captures exactly that type's getters in
//! declaration order.

use std::collections::HashSet;
use std::fmt;

use super::document::Document;
use super::errors::{SchemaError, SchemaResult};
use super::field::FieldDef;
use crate::value::ValueMap;

type Encoder<T> = Box<dyn Fn(&T) -> ValueMap + Send + Sync>;

/// Ordered field set and compiled encoder for one document type.
///
/// Immutable once built.
pub struct CollectionDefinition<T> {
    type_name: &'static str,
    fields: Vec<FieldDef<T>>,
    encoder: Encoder<T>,
}

impl<T: Document> CollectionDefinition<T> {
    /// Build the definition from `T::fields()`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if a field name is empty or declared twice.
    pub fn build() -> SchemaResult<Self> {
        let type_name = T::type_name();
        let fields = T::fields();

        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if field.name().is_empty() {
                return Err(SchemaError::EmptyFieldName { type_name });
            }
            if !seen.insert(field.name().to_string()) {
                return Err(SchemaError::DuplicateField {
                    type_name,
                    field: field.name().to_string(),
                });
            }
        }

        let encoder = compile_encoder(&fields);

        Ok(Self {
            type_name,
            fields,
            encoder,
        })
    }
}

impl<T> CollectionDefinition<T> {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[FieldDef<T>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef<T>> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// True when the type declares no fields and maps the raw map verbatim.
    pub fn is_passthrough(&self) -> bool {
        self.fields.is_empty()
    }

    /// Run the compiled encoder.
    pub fn encode(&self, doc: &T) -> ValueMap {
        (self.encoder)(doc)
    }
}

fn compile_encoder<T: Document>(fields: &[FieldDef<T>]) -> Encoder<T> {
    if fields.is_empty() {
        return Box::new(|doc: &T| doc.raw().cloned().unwrap_or_default());
    }

    let fields: Vec<FieldDef<T>> = fields.to_vec();
    Box::new(move |doc: &T| {
        fields
            .iter()
            .map(|field| (field.name().to_string(), field.read(doc)))
            .collect()
    })
}

impl<T> fmt::Debug for CollectionDefinition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionDefinition")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::UntypedDocument;
    use crate::value::Value;

    #[derive(Default)]
    struct Post {
        title: String,
        tags: Vec<String>,
        views: Option<i64>,
    }

    impl Document for Post {
        fn fields() -> Vec<FieldDef<Self>> {
            vec![
                FieldDef::required("title", |p: &Post| &p.title, |p: &mut Post| &mut p.title),
                FieldDef::required("tags", |p: &Post| &p.tags, |p: &mut Post| &mut p.tags),
                FieldDef::optional("views", |p: &Post| &p.views, |p: &mut Post| &mut p.views),
            ]
        }
    }

    #[derive(Default)]
    struct Clashing {
        a: String,
    }

    impl Document for Clashing {
        fn fields() -> Vec<FieldDef<Self>> {
            vec![
                FieldDef::required("a", |c: &Clashing| &c.a, |c: &mut Clashing| &mut c.a),
                FieldDef::optional("a", |c: &Clashing| &c.a, |c: &mut Clashing| &mut c.a),
            ]
        }
    }

    #[test]
    fn test_fields_keep_declaration_order() {
        let def = CollectionDefinition::<Post>::build().unwrap();
        let names: Vec<&str> = def.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["title", "tags", "views"]);
        assert_eq!(def.type_name(), "Post");
        assert!(!def.is_passthrough());
        assert!(def.field("tags").is_some());
        assert!(def.field("missing").is_none());
    }

    #[test]
    fn test_encoder_includes_nulls() {
        let def = CollectionDefinition::<Post>::build().unwrap();
        let post = Post {
            title: "Hello".into(),
            tags: vec!["rust".into()],
            views: None,
        };

        let map = def.encode(&post);
        assert_eq!(map.len(), 3);
        assert_eq!(map["title"], Value::from("Hello"));
        assert_eq!(map["tags"], Value::List(vec![Value::from("rust")]));
        assert_eq!(map["views"], Value::Null);
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = CollectionDefinition::<Clashing>::build().unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateField {
                type_name: "Clashing",
                field: "a".into()
            }
        );
    }

    #[test]
    fn test_passthrough_encoder_returns_raw_map() {
        let def = CollectionDefinition::<UntypedDocument>::build().unwrap();
        assert!(def.is_passthrough());

        let mut doc = UntypedDocument::default();
        doc.data.insert("free".into(), Value::from("form"));
        assert_eq!(def.encode(&doc), doc.data);
    }
}
