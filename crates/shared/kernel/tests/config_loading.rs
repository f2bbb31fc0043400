use sc_domain::config::ApiConfig;
use sc_domain::constants::{SOFTWARE, TECHS_API};
use sc_kernel::config::{ConfigError, ConfigSources, load_config};
use std::fs;

fn write(dir: &tempfile::TempDir, name: &str, body: &str) {
    fs::write(dir.path().join(name), body).expect("write settings file");
}

#[test]
fn environment_file_overrides_base_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        &dir,
        "appsettings.toml",
        r#"
[server]
port = 5000

[connection_strings]
software = "mem://"
techs-api = "http://prod-techs/"
"#,
    );
    write(
        &dir,
        "appsettings.Development.toml",
        r#"
[connection_strings]
techs-api = "http://localhost:1337/"
"#,
    );

    let sources = ConfigSources::new().base(dir.path().join("appsettings.toml")).environment("Development");
    let cfg: ApiConfig = load_config(&sources).expect("config loads");

    assert!(cfg.environment.is_development());
    assert_eq!(cfg.server.port, 5000);
    assert_eq!(cfg.connection_strings.get(SOFTWARE), Some("mem://"));
    assert_eq!(cfg.connection_strings.get(TECHS_API), Some("http://localhost:1337/"));
}

#[test]
fn command_line_overrides_win() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(&dir, "appsettings.toml", "[server]\nport = 5000\n");

    let sources = ConfigSources::new()
        .base(dir.path().join("appsettings"))
        .environment("Staging")
        .set("server.port", "6001")
        .set("connection_strings.software", "mem://");
    let cfg: ApiConfig = load_config(&sources).expect("config loads");

    assert_eq!(cfg.environment.as_str(), "Staging");
    assert_eq!(cfg.server.port, 6001);
    assert_eq!(cfg.connection_strings.get(SOFTWARE), Some("mem://"));
}

#[test]
fn missing_files_yield_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");

    let sources = ConfigSources::new().base(dir.path().join("absent")).environment("Production");
    let cfg: ApiConfig = load_config(&sources).expect("config loads");

    assert!(!cfg.environment.is_development());
    assert_eq!(cfg.server.port, 8080);
    assert!(cfg.connection_strings.get(SOFTWARE).is_none());
}

#[test]
fn malformed_file_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(&dir, "appsettings.toml", "[server\nport = ");

    let sources = ConfigSources::new().base(dir.path().join("appsettings.toml")).environment("Production");
    let err = load_config::<ApiConfig>(&sources).expect_err("must fail");

    assert!(matches!(err, ConfigError::Config { .. }));
}

fn layered_files(dir: &tempfile::TempDir) {
    write(
        dir,
        "appsettings.toml",
        r#"
[server]
port = 5000

[connection_strings]
software = "mem://"
techs-api = "http://base-techs/"
"#,
    );
    write(
        dir,
        "appsettings.Development.toml",
        r#"
[server]
port = 5001

[connection_strings]
techs-api = "http://development-techs/"
"#,
    );
}

#[test]
fn environment_variables_override_both_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    layered_files(&dir);

    let sources = ConfigSources::new()
        .base(dir.path().join("appsettings.toml"))
        .environment("Development")
        .env_prefix("TEST")
        .environment_variables([
            ("TEST__CONNECTION_STRINGS__TECHS_API", "http://from-env/"),
            ("TEST__SERVER__PORT", "9000"),
            ("OTHER__SERVER__PORT", "1"),
        ]);
    let cfg: ApiConfig = load_config(&sources).expect("config loads");

    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.connection_strings.get(TECHS_API), Some("http://from-env/"));
    assert_eq!(cfg.connection_strings.get("techs_api"), Some("http://from-env/"));
    assert_eq!(cfg.connection_strings.get(SOFTWARE), Some("mem://"));
}

#[test]
fn environment_variable_replaces_blank_file_entry() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(&dir, "appsettings.toml", "[connection_strings]\ntechs-api = \"\"\n");

    let sources = ConfigSources::new()
        .base(dir.path().join("appsettings.toml"))
        .environment("Production")
        .env_prefix("TEST")
        .environment_variables([("TEST__CONNECTION_STRINGS__TECHS_API", "http://from-env/")]);
    let cfg: ApiConfig = load_config(&sources).expect("config loads");

    assert_eq!(cfg.connection_strings.len(), 1);
    assert_eq!(cfg.connection_strings.get(TECHS_API), Some("http://from-env/"));
}

#[test]
fn command_line_overrides_file_and_environment_connection_strings() {
    let dir = tempfile::tempdir().expect("tempdir");
    layered_files(&dir);

    let sources = ConfigSources::new()
        .base(dir.path().join("appsettings.toml"))
        .environment("Development")
        .env_prefix("TEST")
        .environment_variables([("TEST__CONNECTION_STRINGS__TECHS_API", "http://from-env/")])
        .set("connection_strings.techs-api", "http://from-command-line/");
    let cfg: ApiConfig = load_config(&sources).expect("config loads");

    assert_eq!(cfg.server.port, 5001);
    assert_eq!(cfg.connection_strings.get(TECHS_API), Some("http://from-command-line/"));
}
