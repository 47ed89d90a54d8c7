//! Template library and placeholder engine tests.
use ahash::AHashMap;

use botforge::templates::{
    TemplateLibrary, escape_py_string, extract_placeholders, replace_placeholders,
    sanitize_identifier, validate_template,
};

fn values(pairs: &[(&str, &str)]) -> AHashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn replace_substitutes_all_supplied_keys() {
    let out = replace_placeholders(
        "Hello {name}, welcome to {place}. Bye {name}.",
        &values(&[("name", "Ada"), ("place", "town")]),
    );
    assert_eq!(out, "Hello Ada, welcome to town. Bye Ada.");
}

#[test]
fn replace_leaves_unknown_placeholders_untouched() {
    let out = replace_placeholders("{known} and {unknown}", &values(&[("known", "yes")]));
    assert_eq!(out, "yes and {unknown}");
}

#[test]
fn extract_reports_unique_placeholders_in_order() {
    let found = extract_placeholders("{b} then {a} then {b} again");
    assert_eq!(found, vec!["b".to_string(), "a".to_string()]);
}

#[test]
fn extract_handles_empty_and_unbalanced_braces() {
    assert_eq!(extract_placeholders("no markers"), Vec::<String>::new());
    assert_eq!(extract_placeholders("{}"), vec!["".to_string()]);
    assert_eq!(extract_placeholders("dangling { brace"), Vec::<String>::new());
}

#[test]
fn validate_lists_only_missing_keys() {
    let missing = validate_template("{bot_name} here", &["bot_name", "bot_token"]);
    assert_eq!(missing, vec!["bot_token".to_string()]);
    assert!(validate_template("{a}{b}", &["a", "b"]).is_empty());
}

#[test]
fn escape_handles_quotes_backslashes_and_newlines() {
    assert_eq!(
        escape_py_string("He said \"hi\"\nC:\\path\tend"),
        "He said \\\"hi\\\"\\nC:\\\\path\\tend"
    );
}

#[test]
fn sanitize_maps_punctuation_and_leading_digits() {
    assert_eq!(sanitize_identifier("node-1.a"), "node_1_a");
    assert_eq!(sanitize_identifier("7start"), "_7start");
    assert_eq!(sanitize_identifier("plain"), "plain");
}

#[test]
fn cache_grows_once_per_template() {
    let library = TemplateLibrary::new();
    assert_eq!(library.cache_size(), 0);

    let first = library.imports();
    assert_eq!(library.cache_size(), 1);
    let second = library.imports();
    assert_eq!(library.cache_size(), 1);
    assert_eq!(first, second);

    library.bot_init();
    assert_eq!(library.cache_size(), 2);
}

#[test]
fn clear_cache_empties_the_registry() {
    let library = TemplateLibrary::new();
    library.encoding();
    library.main_function();
    assert_eq!(library.cache_size(), 2);
    library.clear_cache();
    assert_eq!(library.cache_size(), 0);
    // Still usable after a clear.
    assert!(!library.encoding().is_empty());
}

#[test]
fn handler_skeletons_cache_per_kind() {
    let library = TemplateLibrary::new();
    library.handler_skeleton("message");
    library.handler_skeleton("callback");
    library.handler_skeleton("message");
    assert_eq!(library.cache_size(), 2);
}

#[test]
fn unknown_handler_kind_yields_placeholder_comment() {
    let library = TemplateLibrary::new();
    let skeleton = library.handler_skeleton("quiz");
    assert!(skeleton.contains("# TODO: no handler template for kind 'quiz'"));
}

#[test]
fn bot_init_exposes_expected_placeholders() {
    let library = TemplateLibrary::new();
    let init = library.bot_init();
    for key in ["bot_name", "bot_token", "project_id", "api_base_url"] {
        assert!(
            extract_placeholders(&init).iter().any(|p| p == key),
            "bot_init is missing the '{}' placeholder",
            key
        );
    }
}
