//! End-to-end rendering against the real process environment.

use envtmpl_core::{generate_template, RenderConfig, TemplateError, TemplateRenderer, ValueError};

fn render(source: &str) -> Result<String, TemplateError> {
    generate_template(source.as_bytes()).map(|bytes| String::from_utf8(bytes).unwrap())
}

#[test]
fn test_hello_world_when_unset() {
    temp_env::with_var_unset("ENVTMPL_IT_NAME", || {
        let out = render(r#"Hello {{env "ENVTMPL_IT_NAME" | default "World"}}!"#).unwrap();
        assert_eq!(out, "Hello World!");
    });
}

#[test]
fn test_hello_name_when_set() {
    temp_env::with_var("ENVTMPL_IT_NAME", Some("Ann"), || {
        let out = render(r#"Hello {{env "ENVTMPL_IT_NAME" | default "World"}}!"#).unwrap();
        assert_eq!(out, "Hello Ann!");
    });
}

#[test]
fn test_set_to_empty_beats_fallback() {
    temp_env::with_var("ENVTMPL_IT_EMPTY", Some(""), || {
        let out = render(r#"[{{default (env "ENVTMPL_IT_EMPTY") "fallback"}}]"#).unwrap();
        assert_eq!(out, "[]");
    });
}

#[test]
fn test_fallback_chain() {
    temp_env::with_vars(
        [
            ("ENVTMPL_IT_PRIMARY", None),
            ("ENVTMPL_IT_SECONDARY", Some("second")),
        ],
        || {
            let out = render(
                r#"{{default (env "ENVTMPL_IT_PRIMARY") (env "ENVTMPL_IT_SECONDARY") "third"}}"#,
            )
            .unwrap();
            assert_eq!(out, "second");
        },
    );
}

#[test]
fn test_required_set() {
    temp_env::with_var("ENVTMPL_IT_MUST_SET", Some("x"), || {
        assert_eq!(render(r#"{{required (env "ENVTMPL_IT_MUST_SET")}}"#).unwrap(), "x");
    });
}

#[test]
fn test_required_unset_lenient_by_default() {
    temp_env::with_var_unset("ENVTMPL_IT_MUST_SET", || {
        assert_eq!(render(r#"{{required (env "ENVTMPL_IT_MUST_SET")}}"#).unwrap(), "");
    });
}

#[test]
fn test_required_unset_fails_when_strict() {
    temp_env::with_var_unset("ENVTMPL_IT_MUST_SET", || {
        let renderer = TemplateRenderer::new()
            .with_config(RenderConfig {
                strict_required: true,
                ..RenderConfig::default()
            })
            .unwrap();
        let err = renderer
            .generate_template(br#"{{required (env "ENVTMPL_IT_MUST_SET")}}"#)
            .unwrap_err();
        assert_eq!(err.value_error(), Some(&ValueError::RequiredAbsent));
    });
}

#[test]
fn test_unsupported_type_names_type() {
    let err = render("{{default 42}}").unwrap_err();
    assert_eq!(
        err.value_error(),
        Some(&ValueError::UnsupportedType { type_name: "int" })
    );
    assert!(err.to_string().contains("unsupported type 'int'"));
}

#[test]
fn test_required_nil_message() {
    let err = render("{{required nil}}").unwrap_err();
    assert!(err.to_string().contains("required argument is missing"));
}

#[test]
fn test_no_partial_output_on_failure() {
    let err = generate_template(b"lots of text before {{ default nil }} and after").unwrap_err();
    let TemplateError::Exec(exec) = &err else {
        panic!("expected an execution error, got {err:?}");
    };
    assert_eq!(exec.func, "default");
    assert_eq!(err.value_error(), Some(&ValueError::AllAbsent));
    let message = err.to_string();
    assert!(!message.contains("lots of text before"));
    assert!(!message.contains("and after"));
}

#[test]
fn test_non_utf8_source_passes_through() {
    let source = b"caf\xe9 = 1\n";
    assert_eq!(generate_template(source).unwrap(), source);
}

#[test]
fn test_conditional_on_env() {
    let source = r#"{{if eq (env "ENVTMPL_IT_MODE") "prod"}}tls on{{else}}tls off{{end}}"#;
    temp_env::with_var("ENVTMPL_IT_MODE", Some("prod"), || {
        assert_eq!(render(source).unwrap(), "tls on");
    });
    temp_env::with_var_unset("ENVTMPL_IT_MODE", || {
        assert_eq!(render(source).unwrap(), "tls off");
    });
}

#[test]
fn test_with_and_printf() {
    temp_env::with_var("ENVTMPL_IT_PORT", Some("5432"), || {
        let out = render(
            r#"{{with env "ENVTMPL_IT_PORT"}}{{printf "port=%s" .}}{{else}}no port{{end}}"#,
        )
        .unwrap();
        assert_eq!(out, "port=5432");
    });
}

#[test]
fn test_unclosed_directive_fails_at_parse() {
    let err = render("value: {{ env \"X\" ").unwrap_err();
    assert!(matches!(err, TemplateError::Parse(_)));
    assert_eq!(
        err.to_string(),
        "failed to create template: template: file:1: unclosed action"
    );
}

#[test]
fn test_config_file_shape() {
    let vars = [("ENVTMPL_IT_PORT", Some("8080")), ("ENVTMPL_IT_ROOT", None)];
    temp_env::with_vars(vars, || {
        let source = "\
server {
    {{- /* port falls back to 80 */}}
    listen {{ env \"ENVTMPL_IT_PORT\" | default \"80\" }};
    root   {{ env \"ENVTMPL_IT_ROOT\" | default `/var/www` }};
}
";
        let expected = "\
server {
    listen 8080;
    root   /var/www;
}
";
        assert_eq!(render(source).unwrap(), expected);
    });
}

#[test]
fn test_concurrent_renders_share_renderer() {
    let renderer = TemplateRenderer::new()
        .with_environment(envtmpl_core::MapEnv::new().with("WHO", "thread"));
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let out = renderer.render_str(r#"{{env "WHO"}}"#).unwrap();
                assert_eq!(out, "thread");
            });
        }
    });
}
