use super::*;
use kres_common::LanguageFeature;
use std::io::Write;

const MULTIPLATFORM: &str = r#"{
    "language": { "enabledFeatures": ["ImplicitSignedToUnsignedIntegerConversion"] },
    "modules": [
        { "name": "jvm", "dependencies": ["stdlib"], "dependsOn": ["common"] },
        { "name": "common", "dependencies": ["stdlib"] },
        { "name": "stdlib", "kind": "library" },
        { "name": "jvmTest", "dependencies": ["jvm"], "friends": ["jvm"] }
    ]
}"#;

fn names_in_order(config: &ProjectConfig) -> Vec<&str> {
    config
        .topological_order()
        .expect("acyclic")
        .into_iter()
        .map(|position| config.modules[position].name.as_str())
        .collect()
}

fn parse_error(source: &str) -> String {
    format!("{:#}", ProjectConfig::parse(source).expect_err("invalid config"))
}

#[test]
fn test_parse_defaults_and_camel_case_fields() {
    let config = ProjectConfig::parse(MULTIPLATFORM).expect("valid config");

    assert!(
        config
            .language
            .supports_feature(LanguageFeature::ImplicitSignedToUnsignedIntegerConversion)
    );
    let jvm = config.module("jvm").expect("jvm");
    assert_eq!(jvm.kind, ModuleKind::Source);
    assert_eq!(jvm.depends_on, vec!["common".to_string()]);
    assert_eq!(config.module("stdlib").expect("stdlib").kind, ModuleKind::Library);
    assert_eq!(
        config.module("jvmTest").expect("jvmTest").edges().collect::<Vec<_>>(),
        vec!["jvm", "jvm"]
    );
}

#[test]
fn test_topological_order_puts_dependencies_first_and_keeps_ties_stable() {
    let config = ProjectConfig::parse(MULTIPLATFORM).expect("valid config");
    assert_eq!(names_in_order(&config), vec!["stdlib", "common", "jvm", "jvmTest"]);

    let independent = ProjectConfig::parse(
        r#"{ "modules": [ { "name": "b" }, { "name": "a" }, { "name": "c" } ] }"#,
    )
    .expect("valid config");
    assert_eq!(names_in_order(&independent), vec!["b", "a", "c"]);
}

#[test]
fn test_duplicate_module_is_rejected() {
    let message = parse_error(r#"{ "modules": [ { "name": "app" }, { "name": "app" } ] }"#);
    assert!(message.contains("duplicate module `app`"), "{message}");
}

#[test]
fn test_reserved_module_name_is_rejected() {
    let message = parse_error(&format!(r#"{{ "modules": [ {{ "name": "{LIBRARY_BUCKET}" }} ] }}"#));
    assert!(message.contains("reserved"), "{message}");
}

#[test]
fn test_unknown_dependency_is_rejected() {
    let message = parse_error(r#"{ "modules": [ { "name": "app", "friends": ["core"] } ] }"#);
    assert!(message.contains("unknown module `core`"), "{message}");
}

#[test]
fn test_library_depending_on_source_is_rejected() {
    let message = parse_error(
        r#"{ "modules": [
            { "name": "app" },
            { "name": "lib", "kind": "library", "dependencies": ["app"] }
        ] }"#,
    );
    assert!(message.contains("cannot depend on source module `app`"), "{message}");
}

#[test]
fn test_library_language_override_is_rejected() {
    let message = parse_error(
        r#"{ "modules": [ { "name": "lib", "kind": "library", "language": {} } ] }"#,
    );
    assert!(message.contains("cannot override language settings"), "{message}");
}

#[test]
fn test_depends_on_cycle_is_reported_as_a_path() {
    let message = parse_error(
        r#"{ "modules": [
            { "name": "a", "dependsOn": ["b"] },
            { "name": "b", "dependsOn": ["c"] },
            { "name": "c", "dependsOn": ["a"] }
        ] }"#,
    );
    assert!(message.contains("dependsOn cycle: a -> b -> c -> a"), "{message}");
}

#[test]
fn test_mixed_edge_cycle_is_rejected() {
    let message = parse_error(
        r#"{ "modules": [
            { "name": "a", "dependencies": ["b"] },
            { "name": "b", "friends": ["a"] },
            { "name": "c" }
        ] }"#,
    );
    assert!(message.contains("dependency cycle among modules: a, b"), "{message}");
}

#[test]
fn test_malformed_json_has_context() {
    let message = parse_error(r#"{ "modules": [ { "name": 1 } ] }"#);
    assert!(message.starts_with("failed to parse project JSON"), "{message}");
}

#[test]
fn test_load_reads_file_and_names_it_in_errors() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("project.json");
    std::fs::File::create(&path)
        .and_then(|mut file| file.write_all(MULTIPLATFORM.as_bytes()))
        .expect("write config");
    let config = ProjectConfig::load(&path).expect("load");
    assert_eq!(config.modules.len(), 4);

    let missing = dir.path().join("missing.json");
    let message = format!("{:#}", ProjectConfig::load(&missing).expect_err("missing file"));
    assert!(message.contains("failed to read project config"), "{message}");
    assert!(message.contains("missing.json"), "{message}");

    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, r#"{ "modules": [ { "name": "x", "dependsOn": ["x"] } ] }"#)
        .expect("write config");
    let message = format!("{:#}", ProjectConfig::load(&broken).expect_err("self cycle"));
    assert!(message.contains("invalid project config"), "{message}");
    assert!(message.contains("dependsOn cycle: x -> x"), "{message}");
}
