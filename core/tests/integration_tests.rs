use std::collections::BTreeSet;
use std::thread;

use composite_schema_core::{
    AdditionalProperties, BINDING_PHASES, FieldSpec, GeneratedResource, GeneratedSchema,
    MergeError, ObjectLevel, ResourceRole, SchemaNode, SchemaType, TOP_LEVEL_KEYS, build_schema,
    contract, validate_schema,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn property_names(node: &SchemaNode) -> BTreeSet<&str> {
    node.properties.keys().map(String::as_str).collect()
}

fn required_names(node: &SchemaNode) -> BTreeSet<&str> {
    node.required.iter().map(String::as_str).collect()
}

fn sample_spec_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::required("region", SchemaNode::string()),
        FieldSpec::optional("storageGB", SchemaNode::integer()),
        FieldSpec::required(
            "engine",
            SchemaNode::object()
                .with_required_property("name", SchemaNode::string().with_enum(["postgres", "mysql"]))
                .with_property("version", SchemaNode::string()),
        ),
        FieldSpec::optional(
            "labels",
            SchemaNode::object().with_additional_properties(AdditionalProperties::Schema(
                Box::new(SchemaNode::string()),
            )),
        ),
    ]
}

fn sample_status_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::optional("endpoint", SchemaNode::string()),
        FieldSpec::required("port", SchemaNode::integer()),
    ]
}

// ---------------------------------------------------------------------------
// Concrete scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_composite_defaults_scenario() {
    let built = build_schema(ResourceRole::CompositeResource, &[], &[]).unwrap();

    let root = built.schema.root();
    assert_eq!(
        property_names(root),
        TOP_LEVEL_KEYS.into_iter().collect::<BTreeSet<_>>()
    );

    let spec = built.schema.spec().unwrap();
    assert_eq!(
        property_names(spec),
        BTreeSet::from([
            "claimRef",
            "compositionRef",
            "compositionSelector",
            "resourceRefs",
            "writeConnectionSecretToRef",
        ])
    );
    assert!(spec.required.is_empty());

    let status = built.schema.status().unwrap();
    assert_eq!(
        property_names(status),
        BTreeSet::from([
            "bindingPhase",
            "composedResources",
            "conditions",
            "readyResources",
        ])
    );
    let phase = status.property("bindingPhase").unwrap();
    assert_eq!(phase.enum_values.len(), 4);
    assert_eq!(phase.enum_values, BINDING_PHASES.map(serde_json::Value::from));
}

#[test]
fn test_claim_with_required_region_scenario() {
    let region = FieldSpec::required("region", SchemaNode::string());
    let built = build_schema(ResourceRole::Claim, &[region], &[]).unwrap();

    let spec = built.schema.spec().unwrap();
    assert!(spec.property("resourceRef").is_some());
    assert!(spec.property("resourceRefs").is_none());
    assert!(spec.property("claimRef").is_none());
    assert!(spec.property("region").is_some());

    let secret_ref = spec.property("writeConnectionSecretToRef").unwrap();
    assert_eq!(required_names(secret_ref), BTreeSet::from(["name"]));

    assert_eq!(required_names(spec), BTreeSet::from(["region"]));
}

#[test]
fn test_claim_resource_ref_collision_scenario() {
    let clash = FieldSpec::optional("resourceRef", SchemaNode::string());
    let err = build_schema(ResourceRole::Claim, &[clash], &[]).unwrap_err();

    assert_eq!(err.level, ObjectLevel::Spec);
    assert!(err.is_collision());
    assert!(matches!(
        &err.source,
        MergeError::Collision { field, level: ObjectLevel::Spec, .. } if field == "resourceRef"
    ));
}

#[test]
fn test_claim_resource_ref_collision_despite_invalid_fields() {
    let malformed = FieldSpec::optional("resourceRef", SchemaNode::new(SchemaType::Array));
    let err = build_schema(ResourceRole::Claim, &[malformed], &[]).unwrap_err();
    assert!(err.is_collision());
    assert_eq!(err.field(), "resourceRef");

    let fields = vec![
        FieldSpec::optional("resourceRef", SchemaNode::string()),
        FieldSpec::optional("aZones", SchemaNode::new(SchemaType::Array)),
    ];
    let err = build_schema(ResourceRole::Claim, &fields, &[]).unwrap_err();
    assert!(matches!(
        &err.source,
        MergeError::Collision { field, level: ObjectLevel::Spec, .. } if field == "resourceRef"
    ));
}

// ---------------------------------------------------------------------------
// Properties over both roles
// ---------------------------------------------------------------------------

#[test]
fn test_required_is_union_for_disjoint_fields() {
    let spec_fields = sample_spec_fields();
    let status_fields = sample_status_fields();

    for role in ResourceRole::ALL {
        let built = build_schema(role, &spec_fields, &status_fields).unwrap();

        for (level, custom) in [
            (ObjectLevel::Spec, &spec_fields),
            (ObjectLevel::Status, &status_fields),
        ] {
            let mut expected: BTreeSet<&str> =
                contract(role, level).required().iter().map(String::as_str).collect();
            expected.extend(custom.iter().filter(|f| f.required).map(|f| f.name.as_str()));

            let node = built.schema.level(level).unwrap();
            assert_eq!(required_names(node), expected, "{role} {level}");
            for field in custom {
                assert_eq!(node.property(&field.name), Some(&field.schema));
            }
        }
    }
}

#[test]
fn test_identical_overlap_is_idempotent_for_every_reserved_field() {
    for role in ResourceRole::ALL {
        for level in ObjectLevel::ALL {
            let block = contract(role, level);
            let overlap: Vec<FieldSpec> = block.fields().to_vec();

            let (spec, status) = match level {
                ObjectLevel::Spec => (overlap.as_slice(), &[][..]),
                ObjectLevel::Status => (&[][..], overlap.as_slice()),
            };
            let built = build_schema(role, spec, status).unwrap();
            let baseline = build_schema(role, &[], &[]).unwrap();

            assert_eq!(built.schema, baseline.schema, "{role} {level}");
        }
    }
}

#[test]
fn test_different_shape_overlap_fails_for_every_reserved_field() {
    for role in ResourceRole::ALL {
        for level in ObjectLevel::ALL {
            for reserved in contract(role, level).fields() {
                let replacement = if reserved.schema.schema_type == SchemaType::Boolean {
                    SchemaNode::string()
                } else {
                    SchemaNode::boolean()
                };
                let malformed = SchemaNode::new(SchemaType::Array);

                let cases = [
                    vec![FieldSpec::optional(&reserved.name, replacement.clone())],
                    vec![FieldSpec::optional(&reserved.name, malformed.clone())],
                    // An invalid field that sorts first must not mask the clash.
                    vec![
                        FieldSpec::optional(&reserved.name, replacement.clone()),
                        FieldSpec::optional("aaInvalid", malformed.clone()),
                    ],
                    vec![
                        FieldSpec::optional(&reserved.name, reserved.schema.clone()),
                        FieldSpec::optional(&reserved.name, replacement.clone()),
                    ],
                    vec![
                        FieldSpec::optional(&reserved.name, replacement),
                        FieldSpec::optional(&reserved.name, malformed),
                    ],
                ];

                for clash in cases {
                    let result = match level {
                        ObjectLevel::Spec => build_schema(role, &clash, &[]),
                        ObjectLevel::Status => build_schema(role, &[], &clash),
                    };
                    let err = result.unwrap_err();
                    assert!(err.is_collision(), "{role} {level} {}: {err}", reserved.name);
                    assert_eq!(err.field(), reserved.name);
                    assert_eq!(err.level, level);
                }
            }
        }
    }
}

#[test]
fn test_generated_schemas_are_structurally_valid() {
    for role in ResourceRole::ALL {
        let built = build_schema(role, &sample_spec_fields(), &sample_status_fields()).unwrap();
        assert!(validate_schema(built.schema.root()).is_empty(), "{role}");
    }
}

#[test]
fn test_custom_names_do_not_leak_between_levels() {
    let built = build_schema(
        ResourceRole::Claim,
        &[FieldSpec::optional("region", SchemaNode::string())],
        &[FieldSpec::optional("endpoint", SchemaNode::string())],
    )
    .unwrap();

    assert!(built.schema.spec().unwrap().property("endpoint").is_none());
    assert!(built.schema.status().unwrap().property("region").is_none());
}

// ---------------------------------------------------------------------------
// Wire representation
// ---------------------------------------------------------------------------

#[test]
fn test_json_round_trip() {
    let built = build_schema(
        ResourceRole::CompositeResource,
        &sample_spec_fields(),
        &sample_status_fields(),
    )
    .unwrap();

    let json = serde_json::to_string_pretty(&built).unwrap();
    let decoded: GeneratedResource = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, built);
}

#[test]
fn test_yaml_round_trip() {
    let built = build_schema(ResourceRole::Claim, &sample_spec_fields(), &[]).unwrap();

    let yaml = serde_yaml::to_string(&built.schema).unwrap();
    let decoded: GeneratedSchema = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(decoded, built.schema);
}

#[test]
fn test_wire_names_of_reserved_fields() {
    let built = build_schema(ResourceRole::CompositeResource, &[], &[]).unwrap();
    let json = serde_json::to_value(&built.schema).unwrap();

    assert_eq!(json["type"], "object");
    assert_eq!(json["properties"]["metadata"]["type"], "object");
    assert_eq!(
        json["properties"]["spec"]["properties"]["compositionSelector"]["properties"]
            ["matchLabels"]["additionalProperties"]["type"],
        "string"
    );
    assert_eq!(
        json["properties"]["spec"]["properties"]["resourceRefs"]["items"]["required"],
        serde_json::json!(["apiVersion", "kind", "name"])
    );
    assert_eq!(
        json["properties"]["status"]["properties"]["conditions"]["items"]["properties"]
            ["lastTransitionTime"]["format"],
        "date-time"
    );
    assert_eq!(
        json["properties"]["status"]["properties"]["bindingPhase"]["enum"],
        serde_json::json!(["Unbindable", "Unbound", "Bound", "Released"])
    );
    assert!(json["properties"]["spec"].get("required").is_none());
}

#[test]
fn test_serialization_is_independent_of_input_order() {
    let fields = sample_spec_fields();
    let mut reversed = fields.clone();
    reversed.reverse();

    let a = build_schema(ResourceRole::Claim, &fields, &[]).unwrap();
    let b = build_schema(ResourceRole::Claim, &reversed, &[]).unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn test_concurrent_builds_agree() {
    let expected = build_schema(ResourceRole::CompositeResource, &sample_spec_fields(), &[]).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            thread::spawn(|| {
                build_schema(ResourceRole::CompositeResource, &sample_spec_fields(), &[]).unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
