use arazzo_runner_core::{parse_document_str, validate_document, DocumentFormat};

fn minimal_valid_yaml() -> &'static str {
    r#"
arazzo: 1.0.1
info:
  title: Example
  version: 0.0.1
sourceDescriptions:
  - name: jsonPlaceholderAPI
    url: https://example.com/openapi.yaml
    type: openapi
workflows:
  - workflowId: getUserInfo
    steps:
      - stepId: fetchUser
        operationId: getUser
"#
}

#[test]
fn parse_yaml_and_validate_ok() {
    let parsed = parse_document_str(minimal_valid_yaml(), DocumentFormat::Yaml).unwrap();
    validate_document(&parsed.document).unwrap();
}

#[test]
fn parse_auto_detects_yaml() {
    let parsed = parse_document_str(minimal_valid_yaml(), DocumentFormat::Auto).unwrap();
    assert_eq!(parsed.format, DocumentFormat::Yaml);
}

#[test]
fn parse_auto_detects_json() {
    let json = r#"{ "arazzo": "1.0.1", "info": { "title": "Example", "version": "0.0.1" }, "sourceDescriptions": [ { "name": "src1", "url": "https://example.com/openapi.yaml" } ], "workflows": [ { "workflowId": "w1", "steps": [ { "stepId": "s1", "operationId": "op1" } ] } ] }"#;
    let parsed = parse_document_str(json, DocumentFormat::Auto).unwrap();
    assert_eq!(parsed.format, DocumentFormat::Json);
    validate_document(&parsed.document).unwrap();
}

#[test]
fn invalid_spec_version_is_rejected() {
    let bad = minimal_valid_yaml().replace("arazzo: 1.0.1", "arazzo: 2.0.0");
    let parsed = parse_document_str(&bad, DocumentFormat::Yaml).unwrap();
    let err = validate_document(&parsed.document).unwrap_err();
    assert!(err.violations.iter().any(|v| v.path == "$.arazzo"));
}

#[test]
fn duplicate_workflow_ids_are_rejected() {
    let bad = r#"
arazzo: 1.0.1
info:
  title: Example
  version: 0.0.1
sourceDescriptions:
  - name: api
    url: https://example.com/openapi.yaml
workflows:
  - workflowId: w1
    steps:
      - stepId: s1
        operationId: op1
  - workflowId: w1
    steps:
      - stepId: s2
        operationId: op2
"#;
    let parsed = parse_document_str(bad, DocumentFormat::Yaml).unwrap();
    let err = validate_document(&parsed.document).unwrap_err();
    assert!(err
        .violations
        .iter()
        .any(|v| v.message.contains("must be unique")));
}

#[test]
fn duplicate_step_ids_are_rejected() {
    let bad = r#"
arazzo: 1.0.1
info:
  title: Example
  version: 0.0.1
sourceDescriptions:
  - name: api
    url: https://example.com/openapi.yaml
workflows:
  - workflowId: w1
    steps:
      - stepId: s1
        operationId: op1
      - stepId: s1
        operationId: op2
"#;
    let parsed = parse_document_str(bad, DocumentFormat::Yaml).unwrap();
    let err = validate_document(&parsed.document).unwrap_err();
    assert!(err
        .violations
        .iter()
        .any(|v| v.message.contains("unique within the workflow")));
}

#[test]
fn step_must_target_exactly_one_operation_reference() {
    let bad = r#"
arazzo: 1.0.1
info:
  title: Example
  version: 0.0.1
sourceDescriptions:
  - name: api
    url: https://example.com/openapi.yaml
workflows:
  - workflowId: w1
    steps:
      - stepId: s1
"#;
    let parsed = parse_document_str(bad, DocumentFormat::Yaml).unwrap();
    let err = validate_document(&parsed.document).unwrap_err();
    assert!(err
        .violations
        .iter()
        .any(|v| v.message.contains("exactly one of")));
}

#[test]
fn malformed_output_expression_is_rejected() {
    let bad = r#"
arazzo: 1.0.1
info:
  title: Example
  version: 0.0.1
sourceDescriptions:
  - name: api
    url: https://example.com/openapi.yaml
workflows:
  - workflowId: w1
    steps:
      - stepId: s1
        operationId: op1
        outputs:
          user: $bogus.thing
"#;
    let parsed = parse_document_str(bad, DocumentFormat::Yaml).unwrap();
    let err = validate_document(&parsed.document).unwrap_err();
    assert!(err
        .violations
        .iter()
        .any(|v| v.message.contains("invalid runtime expression")));
}

#[test]
fn array_index_expressions_validate() {
    let doc = r#"
arazzo: 1.0.1
info:
  title: Example
  version: 0.0.1
sourceDescriptions:
  - name: api
    url: https://example.com/openapi.yaml
workflows:
  - workflowId: w1
    steps:
      - stepId: fetchPosts
        operationId: getPosts
        outputs:
          posts: $response.body
      - stepId: fetchComments
        operationId: getComments
        parameters:
          - name: postId
            in: query
            value: $steps.fetchPosts.outputs.posts[0].id
"#;
    let parsed = parse_document_str(doc, DocumentFormat::Yaml).unwrap();
    validate_document(&parsed.document).unwrap();
}

#[test]
fn non_extension_unknown_fields_are_rejected() {
    let bad = minimal_valid_yaml().replace(
        "type: openapi",
        "type: openapi\n    bogusField: nope",
    );
    let parsed = parse_document_str(&bad, DocumentFormat::Yaml).unwrap();
    let err = validate_document(&parsed.document).unwrap_err();
    assert!(err.violations.iter().any(|v| v.path.contains("bogusField")));
}
