//! Consumer relation resolution
//!
//! For every event-type API entity already admitted to the catalog, the
//! processor resolves the workload identifiers in `metadata.consumedBy`
//! to concrete Component entities through the store's paginated search
//! and emits one `apiConsumedBy`/`consumesApi` edge pair per resolved
//! component. Entities of any other shape pass through untouched.

use crate::catalog::{
    ApiEntity, ApiSpecType, CatalogResult, CatalogStore, EntityFilter, EntityQuery, EntityRef,
    GraphEntity, ProcessorResult, RefKind, Relation, RelationType,
};
use futures::stream::{try_unfold, Stream, StreamExt};
use std::pin::pin;
use std::sync::Arc;
use tracing::{debug, error};

/// Default page limit; large enough that pagination is a single round
/// trip in the common case
pub const DEFAULT_QUERY_PAGE_LIMIT: usize = 10_000;

/// Resolves consumer identifiers into relation edges
pub struct EventMeshProcessor {
    store: Arc<dyn CatalogStore>,
    page_limit: usize,
}

impl EventMeshProcessor {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        EventMeshProcessor {
            store,
            page_limit: DEFAULT_QUERY_PAGE_LIMIT,
        }
    }

    /// Override the query page limit; tests use small limits to exercise
    /// multi-page accumulation
    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit;
        self
    }

    pub fn processor_name(&self) -> &'static str {
        "knative-event-mesh-processor"
    }

    /// Resolve one entity's consumers and emit relation edges through
    /// `emit`. The entity is always returned unchanged and the call never
    /// fails: a query failure for one consumer identifier yields zero
    /// components for that identifier and resolution moves on.
    pub async fn resolve(
        &self,
        entity: GraphEntity,
        emit: &mut dyn FnMut(ProcessorResult),
    ) -> GraphEntity {
        let api = match &entity {
            GraphEntity::Api(api) if api.spec.spec_type == ApiSpecType::EventType => api,
            _ => return entity,
        };

        let namespace = &api.metadata.namespace;
        let name = &api.metadata.name;
        debug!(entity = %format!("{}/{}", namespace, name), "processing event type entity");

        if api.metadata.consumed_by.is_empty() {
            debug!(entity = %format!("{}/{}", namespace, name), "no consumers defined");
            return entity;
        }

        // consumers resolve strictly sequentially; edges for one
        // identifier are fully emitted before the next query starts
        for consumer_id in &api.metadata.consumed_by {
            let components = self.find_components_by_consumer_id(namespace, consumer_id).await;
            debug!(
                entity = %format!("{}/{}", namespace, name),
                consumer = %consumer_id,
                found = components.len(),
                "resolved consumer identifier"
            );

            for component in &components {
                emit_relation_pair(api, component, emit);
            }
        }

        entity
    }

    /// All components in `namespace` carrying `consumer_id` as their
    /// workload identifier, accumulated across every page. On any query
    /// failure the identifier resolves to zero components.
    async fn find_components_by_consumer_id(
        &self,
        namespace: &str,
        consumer_id: &str,
    ) -> Vec<GraphEntity> {
        let mut pages = pin!(self.page_stream(namespace, consumer_id));
        let mut components = Vec::new();

        while let Some(page) = pages.next().await {
            match page {
                Ok(items) => components.extend(items),
                Err(err) => {
                    error!(
                        processor = self.processor_name(),
                        namespace = %namespace,
                        consumer = %consumer_id,
                        message = %err,
                        "failed to find components by consumer id"
                    );
                    return Vec::new();
                }
            }
        }

        components
    }

    /// Lazy sequence of result pages for one consumer identifier. Each
    /// page is fetched only when consumed; the sequence ends on the first
    /// page without a continuation cursor, regardless of item count.
    fn page_stream<'a>(
        &'a self,
        namespace: &'a str,
        consumer_id: &'a str,
    ) -> impl Stream<Item = CatalogResult<Vec<GraphEntity>>> + 'a {
        // state: Some(cursor) = next page to fetch, None = terminated
        try_unfold(Some(None::<String>), move |state| async move {
            let cursor = match state {
                Some(cursor) => cursor,
                None => return Ok(None),
            };

            let page = self
                .store
                .query_entities(EntityQuery {
                    filter: EntityFilter::component_consumer(namespace, consumer_id),
                    cursor,
                    limit: self.page_limit,
                })
                .await?;

            let next_state = page.page_info.next_cursor.map(Some);
            Ok(Some((page.items, next_state)))
        })
    }
}

fn emit_relation_pair(
    api: &ApiEntity,
    component: &GraphEntity,
    emit: &mut dyn FnMut(ProcessorResult),
) {
    let api_ref = EntityRef {
        kind: RefKind::Api,
        namespace: api.metadata.namespace.clone(),
        name: api.metadata.name.clone(),
    };
    let component_ref = EntityRef {
        kind: RefKind::Component,
        namespace: component.metadata().namespace.clone(),
        name: component.metadata().name.clone(),
    };

    emit(ProcessorResult::Relation {
        relation: Relation {
            relation_type: RelationType::ApiConsumedBy,
            source: api_ref.clone(),
            target: component_ref.clone(),
        },
    });
    emit(ProcessorResult::Relation {
        relation: Relation {
            relation_type: RelationType::ConsumesApi,
            source: component_ref,
            target: api_ref,
        },
    });
}
