//! Mapping context
//!
//! Explicit handle holding the frozen schema registry, the incident reporter
//! and the global config. Built once at startup and shared (usually behind an
//! `Arc`) by every mapping, store and listener call.

use std::sync::Arc;

use tracing::debug;

use super::coerce::coerce;
use super::errors::{MappingError, MappingResult};
use super::record::Record;
use crate::config::MappingConfig;
use crate::incident::{Incident, IncidentReceiver, IncidentReporter, MappingBehavior};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{AnyDocument, Document, SchemaRegistry};
use crate::store::DocumentStore;
use crate::value::{DocumentRef, ValueMap};

/// Decode and encode entry point
#[derive(Debug)]
pub struct MappingContext {
    registry: Arc<SchemaRegistry>,
    reporter: IncidentReporter,
    config: MappingConfig,
}

impl MappingContext {
    pub fn new(registry: SchemaRegistry, config: MappingConfig) -> Self {
        Self::with_registry(Arc::new(registry), config)
    }

    /// Build a context over a registry shared with other contexts.
    pub fn with_registry(registry: Arc<SchemaRegistry>, config: MappingConfig) -> Self {
        log_event_with_fields(
            Event::ContextInitialized,
            &[
                ("behavior", config.behavior.as_str()),
                ("dispatch", config.default_dispatch.as_str()),
            ],
        );

        Self {
            registry,
            reporter: IncidentReporter::new(config.behavior),
            config,
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn reporter(&self) -> &IncidentReporter {
        &self.reporter
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    pub fn behavior(&self) -> MappingBehavior {
        self.config.behavior
    }

    /// Receive every incident declared in lenient mode.
    pub fn subscribe_incidents(&self) -> IncidentReceiver {
        self.reporter.subscribe()
    }

    /// Decode a raw field map into a typed record.
    ///
    /// Every field is evaluated before any incident is reported, so the
    /// returned record always carries the full incident list.
    ///
    /// # Errors
    ///
    /// - `Schema` if `T` is not registered
    /// - `Incident` in strict mode, carrying the first incident found
    pub fn decode<T: Document>(
        &self,
        reference: DocumentRef,
        raw: ValueMap,
    ) -> MappingResult<Record<T>> {
        let definition = self.registry.definition::<T>()?;
        let mut data = T::default();
        let mut incidents = Vec::new();

        if definition.is_passthrough() {
            data.absorb_raw(raw);
        } else {
            for field in definition.fields() {
                let value = match raw.get(field.name()) {
                    Some(value) if !value.is_null() => value,
                    _ => {
                        if field.is_required() {
                            incidents.push(Incident::missing_field(
                                reference.clone(),
                                definition.type_name(),
                                field.name(),
                            ));
                        }
                        continue;
                    }
                };

                let written = match coerce(value, field.shape()) {
                    Ok(coerced) => field.write(&mut data, coerced).is_ok(),
                    Err(failure) => {
                        debug!(
                            document = %reference,
                            field = field.name(),
                            shape = %field.shape(),
                            %failure,
                            "Coercion failed"
                        );
                        false
                    }
                };

                if !written {
                    incidents.push(Incident::invalid_type(
                        reference.clone(),
                        definition.type_name(),
                        field.name(),
                        field.slot_type(),
                        value.clone(),
                    ));
                }
            }
        }

        self.reporter.declare_all(&incidents)?;

        Ok(Record {
            reference,
            data,
            incidents,
        })
    }

    /// Encode through the compiled encoder of `T`. No coercion is applied.
    pub fn encode<T: Document>(&self, doc: &T) -> MappingResult<ValueMap> {
        Ok(self.registry.definition::<T>()?.encode(doc))
    }

    /// Encode through the definition of the document's runtime type.
    pub fn encode_dyn(&self, doc: &dyn AnyDocument) -> MappingResult<ValueMap> {
        Ok(self.registry.encode_dyn(doc)?)
    }

    /// Fetch and decode one document.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the document does not exist.
    pub async fn get<T, S>(&self, store: &S, reference: &DocumentRef) -> MappingResult<Record<T>>
    where
        T: Document,
        S: DocumentStore,
    {
        let raw = store
            .get(reference)
            .await?
            .ok_or_else(|| MappingError::NotFound(reference.clone()))?;
        self.decode(reference.clone(), raw)
    }

    /// Run a query and decode every document, in store order.
    ///
    /// In strict mode the first offending document fails the whole batch and
    /// no list is returned.
    pub async fn query<T, S>(&self, store: &S, query: &S::Query) -> MappingResult<Vec<Record<T>>>
    where
        T: Document,
        S: DocumentStore,
    {
        store
            .run_query(query)
            .await?
            .into_iter()
            .map(|doc| self.decode(doc.reference, doc.fields))
            .collect()
    }

    pub async fn exists<S: DocumentStore>(&self, store: &S, query: &S::Query) -> MappingResult<bool> {
        Ok(store.exists(query).await?)
    }

    /// Create the record's document. Fails if it already exists.
    pub async fn insert<T, S>(&self, store: &S, record: &Record<T>) -> MappingResult<()>
    where
        T: Document,
        S: DocumentStore,
    {
        let fields = self.encode(&record.data)?;
        store.create(&record.reference, fields).await?;
        Ok(())
    }

    /// Merge the record's fields into its document, creating it if needed.
    pub async fn update<T, S>(&self, store: &S, record: &Record<T>) -> MappingResult<()>
    where
        T: Document,
        S: DocumentStore,
    {
        let fields = self.encode(&record.data)?;
        store.merge(&record.reference, fields).await?;
        Ok(())
    }

    pub async fn delete<T, S>(&self, store: &S, record: &Record<T>) -> MappingResult<()>
    where
        T: Document,
        S: DocumentStore,
    {
        store.delete(&record.reference).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incident::IncidentKind;
    use crate::schema::{FieldDef, UntypedDocument};
    use crate::store::{CollectionQuery, MemoryStore};
    use crate::value::{Timestamp, Value};
    use chrono::{DateTime, Utc};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Player {
        name: String,
        level: i32,
        tags: Vec<String>,
        joined: Option<DateTime<Utc>>,
    }

    impl Document for Player {
        fn fields() -> Vec<FieldDef<Self>> {
            vec![
                FieldDef::required("name", |p: &Player| &p.name, |p: &mut Player| &mut p.name),
                FieldDef::required("level", |p: &Player| &p.level, |p: &mut Player| &mut p.level),
                FieldDef::optional("tags", |p: &Player| &p.tags, |p: &mut Player| &mut p.tags),
                FieldDef::optional(
                    "joined",
                    |p: &Player| &p.joined,
                    |p: &mut Player| &mut p.joined,
                ),
            ]
        }
    }

    fn context(config: MappingConfig) -> MappingContext {
        let mut builder = SchemaRegistry::builder();
        builder
            .register::<Player>()
            .unwrap()
            .register::<UntypedDocument>()
            .unwrap();
        MappingContext::new(builder.build(), config)
    }

    fn reference(id: &str) -> DocumentRef {
        DocumentRef::new("players", id).unwrap()
    }

    fn raw(json: serde_json::Value) -> ValueMap {
        Value::map_from_json(json).unwrap()
    }

    #[test]
    fn test_decode_coerces_fields() {
        let ctx = context(MappingConfig::strict());
        let mut fields = raw(serde_json::json!({
            "name": "ada",
            "level": 3.0,
            "tags": ["a", 1, true],
        }));
        fields.insert(
            "joined".into(),
            Value::from(Timestamp::new(1_700_000_000, 0)),
        );

        let record: Record<Player> = ctx.decode(reference("p1"), fields).unwrap();
        assert!(record.is_valid());
        assert_eq!(record.data.name, "ada");
        assert_eq!(record.data.level, 3);
        assert_eq!(record.data.tags, vec!["a", "1", "true"]);
        assert_eq!(record.data.joined.map(|d| d.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn test_decode_collects_all_incidents_in_order() {
        let ctx = context(MappingConfig::lenient());
        let fields = raw(serde_json::json!({ "level": "high", "tags": "solo" }));

        let record: Record<Player> = ctx.decode(reference("p1"), fields).unwrap();
        let kinds: Vec<_> = record.incidents.iter().map(|i| (i.kind(), i.field())).collect();
        assert_eq!(
            kinds,
            vec![
                (IncidentKind::MissingField, "name"),
                (IncidentKind::InvalidType, "level"),
                (IncidentKind::InvalidType, "tags"),
            ]
        );
        assert_eq!(record.data, Player::default());
    }

    #[test]
    fn test_i32_overflow_is_invalid_type() {
        let ctx = context(MappingConfig::lenient());
        let fields = raw(serde_json::json!({ "name": "x", "level": 10_000_000_000i64 }));

        let record: Record<Player> = ctx.decode(reference("p1"), fields).unwrap();
        assert_eq!(record.incidents.len(), 1);
        assert_eq!(record.incidents[0].raw_value(), Some(&Value::from(10_000_000_000i64)));
        assert_eq!(record.data.level, 0);
    }

    #[test]
    fn test_strict_fails_on_first_incident() {
        let ctx = context(MappingConfig::strict());
        let fields = raw(serde_json::json!({ "level": "high" }));

        let err = ctx.decode::<Player>(reference("p1"), fields).unwrap_err();
        assert_eq!(err.code(), "DOCSYNC_MISSING_FIELD");
        assert_eq!(err.incident().map(|i| i.field()), Some("name"));
    }

    #[test]
    fn test_unregistered_type_is_fatal() {
        #[derive(Debug, Default)]
        struct Stranger;
        impl Document for Stranger {
            fn fields() -> Vec<FieldDef<Self>> {
                Vec::new()
            }
        }

        let ctx = context(MappingConfig::lenient());
        let err = ctx
            .decode::<Stranger>(reference("s"), ValueMap::new())
            .unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.code(), "DOCSYNC_UNREGISTERED_TYPE");
    }

    #[test]
    fn test_passthrough_keeps_raw_map() {
        let ctx = context(MappingConfig::strict());
        let fields = raw(serde_json::json!({ "anything": [1, 2], "x": null }));

        let record: Record<UntypedDocument> = ctx.decode(reference("u"), fields.clone()).unwrap();
        assert_eq!(record.data.data, fields);
        assert_eq!(ctx.encode(&record.data).unwrap(), fields);
    }

    #[test]
    fn test_encode_includes_nulls() {
        let ctx = context(MappingConfig::strict());
        let player = Player {
            name: "ada".into(),
            level: 2,
            ..Player::default()
        };

        let map = ctx.encode(&player).unwrap();
        assert_eq!(map["name"], Value::from("ada"));
        assert_eq!(map["level"], Value::from(2i64));
        assert_eq!(map["tags"], Value::List(Vec::new()));
        assert_eq!(map["joined"], Value::Null);
    }

    #[tokio::test]
    async fn test_store_round_trip() {
        let ctx = context(MappingConfig::strict());
        let store = MemoryStore::new();
        let record = Record::new(
            reference("p1"),
            Player {
                name: "ada".into(),
                level: 7,
                ..Player::default()
            },
        );

        ctx.insert(&store, &record).await.unwrap();
        let fetched: Record<Player> = ctx.get(&store, &reference("p1")).await.unwrap();
        assert_eq!(fetched.data, record.data);

        let mut changed = fetched.clone();
        changed.data.level = 8;
        ctx.update(&store, &changed).await.unwrap();

        let all: Vec<Record<Player>> = ctx
            .query(&store, &CollectionQuery::new("players"))
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].data.level, 8);
        assert!(ctx.exists(&store, &CollectionQuery::new("players")).await.unwrap());

        ctx.delete(&store, &changed).await.unwrap();
        let err = ctx.get::<Player, _>(&store, &reference("p1")).await.unwrap_err();
        assert_eq!(err.code(), "DOCSYNC_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_strict_query_returns_no_partial_list() {
        let ctx = context(MappingConfig::strict());
        let store = MemoryStore::new();
        store
            .create(&reference("a"), raw(serde_json::json!({ "name": "a", "level": 1 })))
            .await
            .unwrap();
        store
            .create(&reference("b"), raw(serde_json::json!({ "level": 2 })))
            .await
            .unwrap();

        let result = ctx
            .query::<Player, _>(&store, &CollectionQuery::new("players"))
            .await;
        assert!(matches!(result, Err(MappingError::Incident(_))));
    }
}
