use sc_server::Server;
use softwarecenter::domain::config::ApiConfig;

fn config(strings: &[(&str, &str)]) -> ApiConfig {
    let mut cfg = ApiConfig::default();
    cfg.security.jwt.signing_key = "startup-test-signing-key-with-enough-bytes".to_owned();
    for (name, value) in strings {
        cfg.connection_strings.insert(*name, *value);
    }
    cfg
}

#[tokio::test]
async fn missing_software_connection_string_aborts_startup() {
    let err = Server::builder()
        .config(config(&[("techs-api", "http://localhost:1338")]))
        .build()
        .await
        .expect_err("startup must fail");

    assert!(format!("{err:#}").contains("connection string 'software' is not configured"), "{err:#}");
}

#[tokio::test]
async fn missing_techs_api_connection_string_aborts_startup() {
    let err = Server::builder()
        .config(config(&[("software", "mem://")]))
        .build()
        .await
        .expect_err("startup must fail");

    assert!(format!("{err:#}").contains("connection string 'techs-api' is not configured"), "{err:#}");
}

#[tokio::test]
async fn blank_connection_strings_count_as_missing() {
    let err = Server::builder()
        .config(config(&[("software", "   "), ("techs-api", "http://localhost:1338")]))
        .build()
        .await
        .expect_err("startup must fail");

    assert!(format!("{err:#}").contains("'software'"), "{err:#}");
}

#[tokio::test]
async fn relative_techs_api_address_aborts_startup() {
    let err = Server::builder()
        .config(config(&[("software", "mem://"), ("techs-api", "techs.local/api")]))
        .build()
        .await
        .expect_err("startup must fail");

    assert!(format!("{err:#}").contains("techs-api"), "{err:#}");
}

#[tokio::test]
async fn missing_signing_key_aborts_startup() {
    let mut cfg = config(&[("software", "mem://"), ("techs-api", "http://localhost:1338")]);
    cfg.security.jwt.signing_key = String::new();

    assert!(Server::builder().config(cfg).build().await.is_err());
}

#[tokio::test]
async fn environment_variable_spelling_is_accepted() {
    let server = Server::builder()
        .config(config(&[("SOFTWARE", "mem://"), ("techs_api", "http://localhost:1338/api")]))
        .build()
        .await
        .expect("startup succeeds");

    assert_eq!(server.state().slice_names().collect::<Vec<_>>(), vec!["vendors"]);
}
