//! Pure mapping from raw mesh records to catalog entities
//!
//! Both builders are total: any record maps to an entity, with absent
//! optionals defaulted per the catalog's schema. Provenance annotations
//! always point at the source base URL, overwriting any caller-supplied
//! values for those keys.

use crate::catalog::{
    ApiEntity, ApiSpec, ApiSpecType, ComponentEntity, ComponentSpec, EntityLink, EntityMetadata,
    GraphEntity, ANNOTATION_LOCATION, ANNOTATION_ORIGIN_LOCATION, API_VERSION,
};
use crate::mesh::{Broker, EventType};
use indexmap::IndexMap;

/// `spec.type` of broker components
pub const TYPE_BROKER: &str = "broker";

/// `spec.system` of every entity produced by this crate
pub const SYSTEM_EVENT_MESH: &str = "knative-event-mesh";

/// `spec.owner` of every entity produced by this crate
pub const OWNER_EVENT_MESH: &str = "knative";

fn provenance_annotations(
    annotations: Option<IndexMap<String, String>>,
    base_url: &str,
) -> IndexMap<String, String> {
    let mut annotations = annotations.unwrap_or_default();
    let location = format!("url:{}", base_url);
    annotations.insert(ANNOTATION_LOCATION.to_string(), location.clone());
    annotations.insert(ANNOTATION_ORIGIN_LOCATION.to_string(), location);
    annotations
}

/// Build the API entity for an event type. `env` is the provider id and
/// becomes the entity's lifecycle.
pub fn build_event_type_entity(event_type: &EventType, base_url: &str, env: &str) -> GraphEntity {
    let mut links = Vec::new();
    if let Some(schema_url) = &event_type.schema_url {
        links.push(EntityLink {
            title: "View external schema".to_string(),
            icon: "scaffolder".to_string(),
            url: schema_url.clone(),
        });
    }

    GraphEntity::Api(ApiEntity {
        api_version: API_VERSION.to_string(),
        metadata: EntityMetadata {
            name: event_type.name.clone(),
            namespace: event_type.namespace.clone(),
            title: Some(format!(
                "{} - ({}/{})",
                event_type.event_type, event_type.namespace, event_type.name
            )),
            description: event_type.description.clone(),
            labels: event_type.labels.clone().unwrap_or_default(),
            annotations: provenance_annotations(event_type.annotations.clone(), base_url),
            // tags are not used
            tags: Vec::new(),
            links,
            consumed_by: event_type.consumed_by.clone().unwrap_or_default(),
        },
        spec: ApiSpec {
            spec_type: ApiSpecType::EventType,
            lifecycle: env.to_string(),
            system: SYSTEM_EVENT_MESH.to_string(),
            owner: OWNER_EVENT_MESH.to_string(),
            // the definition field is required downstream, so an absent
            // schema becomes a valid-but-empty document
            definition: event_type
                .schema_data
                .clone()
                .unwrap_or_else(|| "{}".to_string()),
        },
    })
}

/// Build the Component entity for a broker
pub fn build_broker_entity(broker: &Broker, base_url: &str, env: &str) -> GraphEntity {
    GraphEntity::Component(ComponentEntity {
        api_version: API_VERSION.to_string(),
        metadata: EntityMetadata {
            name: broker.name.clone(),
            namespace: broker.namespace.clone(),
            title: None,
            description: None,
            labels: broker.labels.clone().unwrap_or_default(),
            annotations: provenance_annotations(broker.annotations.clone(), base_url),
            tags: Vec::new(),
            links: Vec::new(),
            consumed_by: Vec::new(),
        },
        spec: ComponentSpec {
            spec_type: TYPE_BROKER.to_string(),
            lifecycle: env.to_string(),
            system: SYSTEM_EVENT_MESH.to_string(),
            owner: OWNER_EVENT_MESH.to_string(),
            provides_apis: broker
                .provided_event_types
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|event_type| format!("api:{}", event_type))
                .collect(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_URL: &str = "http://eventmesh.example.com";

    fn event_type() -> EventType {
        EventType {
            name: "et-1".to_string(),
            namespace: "default".to_string(),
            event_type: "com.example.created".to_string(),
            uid: "uid-1".to_string(),
            ..Default::default()
        }
    }

    fn api(entity: GraphEntity) -> ApiEntity {
        match entity {
            GraphEntity::Api(api) => api,
            _ => panic!("expected API entity"),
        }
    }

    fn component(entity: GraphEntity) -> ComponentEntity {
        match entity {
            GraphEntity::Component(component) => component,
            _ => panic!("expected Component entity"),
        }
    }

    #[test]
    fn test_event_type_entity_basics() {
        let entity = api(build_event_type_entity(&event_type(), BASE_URL, "dev"));

        assert_eq!(entity.api_version, API_VERSION);
        assert_eq!(entity.metadata.name, "et-1");
        assert_eq!(entity.metadata.namespace, "default");
        assert_eq!(
            entity.metadata.title.as_deref(),
            Some("com.example.created - (default/et-1)")
        );
        assert_eq!(entity.spec.spec_type, ApiSpecType::EventType);
        assert_eq!(entity.spec.lifecycle, "dev");
        assert_eq!(entity.spec.system, SYSTEM_EVENT_MESH);
        assert_eq!(entity.spec.owner, OWNER_EVENT_MESH);
        assert!(entity.metadata.tags.is_empty());
    }

    #[test]
    fn test_no_schema_url_means_no_links() {
        let entity = api(build_event_type_entity(&event_type(), BASE_URL, "dev"));
        assert!(entity.metadata.links.is_empty());
    }

    #[test]
    fn test_schema_url_becomes_single_link() {
        let et = EventType {
            schema_url: Some("https://example.com/schema.json".to_string()),
            ..event_type()
        };
        let entity = api(build_event_type_entity(&et, BASE_URL, "dev"));

        assert_eq!(
            entity.metadata.links,
            vec![EntityLink {
                title: "View external schema".to_string(),
                icon: "scaffolder".to_string(),
                url: "https://example.com/schema.json".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_schema_data_defaults_to_empty_document() {
        let entity = api(build_event_type_entity(&event_type(), BASE_URL, "dev"));
        assert_eq!(entity.spec.definition, "{}");

        let et = EventType {
            schema_data: Some("{\"field\":\"string\"}".to_string()),
            ..event_type()
        };
        let entity = api(build_event_type_entity(&et, BASE_URL, "dev"));
        assert_eq!(entity.spec.definition, "{\"field\":\"string\"}");
    }

    #[test]
    fn test_description_stays_absent_when_absent() {
        let entity = api(build_event_type_entity(&event_type(), BASE_URL, "dev"));
        assert!(entity.metadata.description.is_none());

        let et = EventType {
            description: Some(String::new()),
            ..event_type()
        };
        let entity = api(build_event_type_entity(&et, BASE_URL, "dev"));
        // empty and absent descriptions are distinct downstream
        assert_eq!(entity.metadata.description.as_deref(), Some(""));
    }

    #[test]
    fn test_provenance_overwrites_caller_annotations() {
        let mut annotations = IndexMap::new();
        annotations.insert("team".to_string(), "payments".to_string());
        annotations.insert(ANNOTATION_LOCATION.to_string(), "url:http://spoofed".to_string());
        annotations.insert(
            ANNOTATION_ORIGIN_LOCATION.to_string(),
            "url:http://spoofed".to_string(),
        );
        let et = EventType {
            annotations: Some(annotations),
            ..event_type()
        };

        let entity = api(build_event_type_entity(&et, BASE_URL, "dev"));
        let expected = format!("url:{}", BASE_URL);
        assert_eq!(
            entity.metadata.annotations.get(ANNOTATION_LOCATION),
            Some(&expected)
        );
        assert_eq!(
            entity.metadata.annotations.get(ANNOTATION_ORIGIN_LOCATION),
            Some(&expected)
        );
        // unrelated annotations are preserved
        assert_eq!(
            entity.metadata.annotations.get("team"),
            Some(&"payments".to_string())
        );
    }

    #[test]
    fn test_consumed_by_round_trip_preserves_order() {
        let et = EventType {
            consumed_by: Some(vec![
                "consumer-b".to_string(),
                "consumer-a".to_string(),
                "consumer-c".to_string(),
            ]),
            ..event_type()
        };
        let entity = api(build_event_type_entity(&et, BASE_URL, "dev"));
        assert_eq!(
            entity.metadata.consumed_by,
            vec!["consumer-b", "consumer-a", "consumer-c"]
        );
    }

    #[test]
    fn test_absent_consumed_by_becomes_empty_list() {
        let entity = api(build_event_type_entity(&event_type(), BASE_URL, "dev"));
        assert!(entity.metadata.consumed_by.is_empty());
    }

    #[test]
    fn test_broker_entity_basics() {
        let broker = Broker {
            name: "broker-1".to_string(),
            namespace: "default".to_string(),
            uid: "uid-2".to_string(),
            ..Default::default()
        };
        let entity = component(build_broker_entity(&broker, BASE_URL, "prod"));

        assert_eq!(entity.api_version, API_VERSION);
        assert_eq!(entity.metadata.name, "broker-1");
        assert_eq!(entity.spec.spec_type, TYPE_BROKER);
        assert_eq!(entity.spec.lifecycle, "prod");
        assert!(entity.spec.provides_apis.is_empty());

        let expected = format!("url:{}", BASE_URL);
        assert_eq!(
            entity.metadata.annotations.get(ANNOTATION_LOCATION),
            Some(&expected)
        );
        assert_eq!(
            entity.metadata.annotations.get(ANNOTATION_ORIGIN_LOCATION),
            Some(&expected)
        );
    }

    #[test]
    fn test_provided_event_types_get_api_prefix_in_order() {
        let broker = Broker {
            name: "broker-1".to_string(),
            namespace: "default".to_string(),
            uid: "uid-2".to_string(),
            provided_event_types: Some(vec![
                "default/et-2".to_string(),
                "default/et-1".to_string(),
            ]),
            ..Default::default()
        };
        let entity = component(build_broker_entity(&broker, BASE_URL, "dev"));
        assert_eq!(
            entity.spec.provides_apis,
            vec!["api:default/et-2", "api:default/et-1"]
        );
    }
}
