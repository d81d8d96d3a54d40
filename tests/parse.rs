use envfile::{Environment, parse_str_with_env};

#[test]
fn parses_the_basic_fixture() {
    let fixture = include_str!("fixtures/basic.env");
    let output = parse_str_with_env(fixture, &Environment::memory());

    assert!(output.diagnostics.is_empty());
    let document = output.document;

    assert_eq!(document.get("APP_ENV"), Some("development"));
    assert_eq!(document.get("APP_NAME"), Some("demo app"));
    assert_eq!(document.get("APP_MOTD"), Some("hello $USER"));
    assert_eq!(document.get("DB_HOST"), Some("localhost"));
    assert_eq!(document.get("DB_PORT"), Some("5432"));
    assert_eq!(document.get("DB_URL"), Some("postgres://localhost:5432/app"));
    assert_eq!(document.get("EMPTY"), Some(""));
    assert_eq!(document.get("DOTTED.KEY"), Some("allowed"));
    assert_eq!(document.get("QUOTE"), Some("with \"inner\" quotes"));
    assert_eq!(document.get("LITERAL_DOLLAR"), Some("price: $5"));
}

#[test]
fn fixture_keys_keep_file_order() {
    let fixture = include_str!("fixtures/basic.env");
    let output = parse_str_with_env(fixture, &Environment::memory());

    let keys: Vec<&str> = output.document.keys().collect();
    assert_eq!(
        keys,
        vec![
            "APP_ENV",
            "APP_NAME",
            "APP_MOTD",
            "DB_HOST",
            "DB_PORT",
            "DB_URL",
            "EMPTY",
            "DOTTED.KEY",
            "QUOTE",
            "LITERAL_DOLLAR",
        ]
    );
}
