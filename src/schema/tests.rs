#[cfg(test)]
use super::*;
#[cfg(test)]
use rstest::rstest;
#[cfg(test)]
use serde_json::json;
#[cfg(test)]
use std::io::Write;

fn schema(v: Json) -> Schema {
    Schema::from_json("test.schema.json", v).expect("Failed to load schema")
}

fn validate(doc: Json, s: &Schema) -> Result<(), CfgError> {
    JsonSchemaValidator.validate(&Value::from(doc), s)
}

fn workflow_schema() -> Schema {
    schema(json!({
        "type": "object",
        "required": ["name", "steps"],
        "properties": {
            "name": {"type": "string", "minLength": 1},
            "retries": {"type": "integer", "minimum": 0, "maximum": 5},
            "steps": {
                "type": "array",
                "minItems": 1,
                "items": {"$ref": "#/definitions/step"}
            }
        },
        "additionalProperties": false,
        "definitions": {
            "step": {
                "type": "object",
                "required": ["run"],
                "properties": {
                    "run": {"type": "string", "pattern": "^[a-z]+"},
                    "disabled": {"type": "boolean"},
                    "shell": {"enum": ["bash", "sh"]}
                }
            }
        }
    }))
}

#[test]
fn test_conforming_document_passes() {
    let doc = json!({"name": "ci", "retries": 2, "steps": [{"run": "build", "shell": "bash"}, {"run": "test", "disabled": true}]});
    assert!(validate(doc, &workflow_schema()).is_ok());
}

#[test]
fn test_violation_reports_pointer_and_schema() {
    let doc = json!({"name": "ci", "steps": [{"run": "build"}, {"run": "Test"}]});
    let err = validate(doc, &workflow_schema()).unwrap_err();
    match err {
        CfgError::Conformance { schema, pointer, message, code, .. } => {
            assert_eq!(schema, "test.schema.json");
            assert_eq!(pointer, "#/steps/1/run");
            assert!(message.contains("Test"), "message: {}", message);
            assert_eq!(code, Some(450));
        }
        other => panic!("Expected Conformance, got {:?}", other),
    }
}

#[test]
fn test_required_and_additional_properties() {
    let missing = validate(json!({"name": "ci"}), &workflow_schema()).unwrap_err();
    assert!(matches!(missing, CfgError::Conformance { ref message, .. } if message.contains("steps")));

    let extra = validate(json!({"name": "ci", "steps": [{"run": "x"}], "bogus": 1}), &workflow_schema()).unwrap_err();
    assert!(matches!(extra, CfgError::Conformance { ref message, .. } if message.contains("bogus")));
}

#[test]
fn test_type_and_bounds() {
    let s = workflow_schema();
    assert!(validate(json!({"name": "ci", "retries": 9, "steps": [{"run": "x"}]}), &s).is_err());
    assert!(validate(json!({"name": "ci", "retries": 1.5, "steps": [{"run": "x"}]}), &s).is_err());
    assert!(validate(json!({"name": "ci", "retries": 2.0, "steps": [{"run": "x"}]}), &s).is_ok());
    assert!(validate(json!({"name": "ci", "steps": []}), &s).is_err());
}

#[test]
fn test_string_null_is_not_null() {
    let s = schema(json!({"properties": {"v": {"type": "null"}}}));
    assert!(validate(json!({"v": null}), &s).is_ok());
    assert!(validate(json!({"v": "null"}), &s).is_err());
}

#[rstest]
#[case(json!({"type": "object", "minProperties": 2}), json!({"a": 1}), "#")]
#[case(json!({"maxProperties": 1}), json!({"a": 1, "b": 2}), "#")]
#[case(json!({"properties": {"n": {"multipleOf": 2}}}), json!({"n": 7}), "#/n")]
#[case(json!({"patternProperties": {"^x_": {"type": "integer"}}}), json!({"x_a": "s"}), "#/x_a")]
#[case(json!({"propertyNames": {"maxLength": 3}}), json!({"long_name": 1}), "#")]
#[case(
    json!({"if": {"properties": {"env": {"const": "prod"}}}, "then": {"required": ["approver"]}}),
    json!({"env": "prod"}),
    "#"
)]
#[case(json!({"contains": {"const": "build"}}), json!(["lint", "test"]), "#")]
#[case(json!({"dependencies": {"deploy": ["target"]}}), json!({"deploy": true}), "#")]
#[case(json!({"items": [{"type": "string"}], "additionalItems": false}), json!(["a", 1]), "#")]
#[case(json!({"anyOf": [{"type": "string"}, {"type": "integer"}]}), json!(true), "#")]
#[case(json!({"oneOf": [{"minimum": 0}, {"maximum": 10}]}), json!(5), "#")]
#[case(json!({"not": {"const": "forbidden"}}), json!("forbidden"), "#")]
#[case(json!({"enum": [1, "two"]}), json!(2), "#")]
#[case(json!({"uniqueItems": true}), json!([1, 1.0]), "#")]
fn test_keyword_violations(#[case] s: Json, #[case] doc: Json, #[case] pointer: &str) {
    match validate(doc, &schema(s)) {
        Err(CfgError::Conformance { pointer: at, .. }) => assert_eq!(at, pointer),
        other => panic!("Expected Conformance, got {:?}", other),
    }
}

#[rstest]
#[case(json!({"type": "object", "minProperties": 2}), json!({"a": 1, "b": 2}))]
#[case(json!({"properties": {"n": {"multipleOf": 2}}}), json!({"n": 8}))]
#[case(
    json!({"if": {"properties": {"env": {"const": "prod"}}}, "then": {"required": ["approver"]}}),
    json!({"env": "dev"})
)]
#[case(json!({"contains": {"const": "build"}}), json!(["build", "test"]))]
#[case(json!({"oneOf": [{"minimum": 0}, {"maximum": 10}]}), json!(-5))]
#[case(json!({"enum": [1, "two"]}), json!(1.0))]
fn test_keyword_passes(#[case] s: Json, #[case] doc: Json) {
    assert!(validate(doc, &schema(s)).is_ok());
}

#[test]
fn test_boolean_schemas() {
    assert!(validate(json!({"any": 1}), &schema(json!(true))).is_ok());
    assert!(validate(json!({"any": 1}), &schema(json!(false))).is_err());
}

#[test]
fn test_malformed_schemas_rejected() {
    let cases = [
        json!(42),
        json!({"type": "strin"}),
        json!({"properties": []}),
        json!({"required": "name"}),
        json!({"pattern": "("}),
        json!({"minItems": -1}),
        json!({"anyOf": []}),
        json!({"items": {"type": 7}}),
        json!({"$ref": "#/definitions/missing"}),
    ];

    for case in cases {
        let err = Schema::from_json("bad.json", case.clone()).unwrap_err();
        assert!(
            matches!(err, CfgError::MalformedSchema { .. }),
            "expected MalformedSchema for {}, got {:?}",
            case,
            err
        );
    }
}

#[test]
fn test_mutual_ref_cycle_rejected() {
    let cyclic = json!({
        "definitions": {
            "a": {"$ref": "#/definitions/b"},
            "b": {"$ref": "#/definitions/a"}
        },
        "$ref": "#/definitions/a"
    });
    let err = Schema::from_json("cycle.json", cyclic).unwrap_err();
    assert!(matches!(err, CfgError::MalformedSchema { code: Some(322), .. }));

    let through_all_of = json!({"definitions": {"a": {"allOf": [{"$ref": "#/definitions/a"}]}}});
    let err = Schema::from_json("cycle.json", through_all_of).unwrap_err();
    assert!(matches!(err, CfgError::MalformedSchema { code: Some(322), .. }));
}

#[test]
fn test_recursion_through_properties_is_allowed() {
    let tree = schema(json!({
        "definitions": {
            "node": {
                "type": "object",
                "properties": {"children": {"type": "array", "items": {"$ref": "#/definitions/node"}}}
            }
        },
        "$ref": "#/definitions/node"
    }));
    assert!(validate(json!({"children": [{"children": []}]}), &tree).is_ok());
    assert!(validate(json!({"children": [1]}), &tree).is_err());
}

#[test]
fn test_declared_draft_is_honoured() {
    let s = schema(json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "dependentRequired": {"deploy": ["target"]}
    }));
    assert!(validate(json!({"deploy": 1, "target": "prod"}), &s).is_ok());
    assert!(validate(json!({"deploy": 1}), &s).is_err());
}

#[test]
fn test_schema_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"type": "object"}}"#).unwrap();
    let s = Schema::from_file(file.path()).expect("Failed to load schema file");
    assert_eq!(s.root(), &json!({"type": "object"}));
}

#[test]
fn test_schema_file_errors() {
    let missing = Schema::from_file("/definitely/not/here.json").unwrap_err();
    assert_eq!(missing.code(), Some(301));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();
    let bad = Schema::from_file(file.path()).unwrap_err();
    assert!(matches!(bad, CfgError::MalformedSchema { code: Some(320), .. }));
}
