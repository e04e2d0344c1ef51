use assert_cmd::Command;
use predicates::prelude::*;

fn envtmpl() -> Command {
    let mut cmd = Command::cargo_bin("envtmpl").unwrap();
    cmd.env_remove("ENVTMPL_CONFIG").env_remove("RUST_LOG");
    cmd
}

const HELLO: &str = r#"Hello {{env "ENVTMPL_CLI_NAME" | default "World"}}!"#;

#[test]
fn test_render_stdin_unset() {
    envtmpl()
        .args(["render", "-"])
        .env_remove("ENVTMPL_CLI_NAME")
        .write_stdin(HELLO)
        .assert()
        .success()
        .stdout("Hello World!");
}

#[test]
fn test_render_stdin_set() {
    envtmpl()
        .args(["render", "-"])
        .env("ENVTMPL_CLI_NAME", "Ann")
        .write_stdin(HELLO)
        .assert()
        .success()
        .stdout("Hello Ann!");
}

#[test]
fn test_render_to_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("app.conf.tmpl");
    let output = dir.path().join("app.conf");
    std::fs::write(&input, "port = {{ env \"ENVTMPL_CLI_PORT\" | default \"80\" }}\n").unwrap();

    envtmpl()
        .arg("render")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .env("ENVTMPL_CLI_PORT", "8080")
        .assert()
        .success()
        .stdout("");

    assert_eq!(std::fs::read_to_string(&output).unwrap(), "port = 8080\n");
}

#[test]
fn test_unknown_function_fails_at_create() {
    envtmpl()
        .args(["render", "-"])
        .write_stdin("{{ nope }}")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("failed to create template"))
        .stderr(predicate::str::contains("function \"nope\" not defined"));
}

#[test]
fn test_error_names_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.tmpl");
    std::fs::write(&input, "line one\n{{ required nil }}\n").unwrap();

    envtmpl()
        .arg("render")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("template: broken.tmpl:2:"))
        .stderr(predicate::str::contains("required argument is missing"));
}

#[test]
fn test_failed_render_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.tmpl");
    let output = dir.path().join("out.txt");
    std::fs::write(&input, "prefix {{ default nil }} suffix").unwrap();

    envtmpl()
        .arg("render")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to transform template"));

    assert!(!output.exists());
}

#[test]
fn test_failed_render_to_stdout_prints_nothing() {
    envtmpl()
        .args(["render", "-"])
        .write_stdin("prefix {{ default nil }} suffix")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("failed to transform template"))
        .stderr(predicate::str::contains("prefix").not());
}

#[test]
fn test_render_non_utf8_stdin() {
    envtmpl()
        .args(["render", "-"])
        .env("ENVTMPL_CLI_NAME", "Ann")
        .write_stdin(&b"caf\xe9 {{env \"ENVTMPL_CLI_NAME\"}}\n"[..])
        .assert()
        .success()
        .stdout(&b"caf\xe9 Ann\n"[..]);
}

#[test]
fn test_render_conditional() {
    let source = r#"{{if eq (env "ENVTMPL_CLI_MODE") "prod"}}prod{{else}}dev{{end}}"#;

    envtmpl()
        .args(["render", "-"])
        .env("ENVTMPL_CLI_MODE", "prod")
        .write_stdin(source)
        .assert()
        .success()
        .stdout("prod");

    envtmpl()
        .args(["render", "-"])
        .env_remove("ENVTMPL_CLI_MODE")
        .write_stdin(source)
        .assert()
        .success()
        .stdout("dev");
}

#[test]
fn test_strict_required_flag() {
    let source = r#"[{{required (env "ENVTMPL_CLI_MUST")}}]"#;

    envtmpl()
        .args(["render", "-"])
        .env_remove("ENVTMPL_CLI_MUST")
        .write_stdin(source)
        .assert()
        .success()
        .stdout("[]");

    envtmpl()
        .args(["render", "-", "--strict-required"])
        .env_remove("ENVTMPL_CLI_MUST")
        .write_stdin(source)
        .assert()
        .failure()
        .stderr(predicate::str::contains("required value is absent"));
}

#[test]
fn test_config_file_delimiters() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("envtmpl.json");
    std::fs::write(&config, r#"{"left_delim": "<%", "right_delim": "%>"}"#).unwrap();

    envtmpl()
        .arg("--config")
        .arg(&config)
        .args(["render", "-"])
        .env("ENVTMPL_CLI_WHO", "ops")
        .write_stdin(r#"{{literal}} <% env "ENVTMPL_CLI_WHO" %>"#)
        .assert()
        .success()
        .stdout("{{literal}} ops");
}

#[test]
fn test_missing_config_file() {
    envtmpl()
        .args(["--config", "/nonexistent/envtmpl.json", "render", "-"])
        .write_stdin("text")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn test_check_valid_template() {
    envtmpl()
        .args(["check", "-"])
        .write_stdin(HELLO)
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("valid template"))
        .stderr(predicate::str::contains("Actions: 1"));
}

#[test]
fn test_check_does_not_execute() {
    envtmpl()
        .args(["check", "-"])
        .write_stdin("{{ required nil }}")
        .assert()
        .success();
}

#[test]
fn test_check_reports_syntax_error() {
    envtmpl()
        .args(["check", "-"])
        .write_stdin("{{ if true }}x{{ end }}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("template: stdin:1:"));
}
