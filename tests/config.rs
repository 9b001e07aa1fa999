use std::time::Duration;

use assert_matches::assert_matches;

use kira_ena_fetch::config::{ConfigLoader, FetchConfig};
use kira_ena_fetch::error::{ErrorKind, FetchError};

#[test]
fn partial_config_keeps_defaults() {
    let config = ConfigLoader::parse(
        r#"{ "host": "ftp.example.org", "base_path": "/pub/fastq", "read_timeout_secs": 60 }"#,
    )
    .unwrap();

    assert_eq!(config.host, "ftp.example.org");
    assert_eq!(config.base_path, "/pub/fastq");
    assert_eq!(config.read_timeout(), Duration::from_secs(60));
    assert_eq!(config.port, 21);
    assert_eq!(config.user, "anonymous");
    assert_eq!(
        config.connect_timeout(),
        FetchConfig::default().connect_timeout()
    );
}

#[test]
fn malformed_config_is_a_configuration_error() {
    let err = ConfigLoader::parse("{ host = }").unwrap_err();
    assert_matches!(err, FetchError::ConfigParse(_));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn empty_host_rejected() {
    let err = ConfigLoader::parse(r#"{ "host": "  " }"#).unwrap_err();
    assert_matches!(err, FetchError::ConfigParse(_));
}

#[test]
fn explicit_path_must_exist() {
    let temp = tempfile::tempdir().unwrap();
    let err = ConfigLoader::resolve(Some(temp.path().join("nope.json").as_path())).unwrap_err();
    assert_matches!(err, FetchError::MissingConfig(_));
}

#[test]
fn explicit_path_is_loaded() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("fetch.json");
    std::fs::write(&path, r#"{ "port": 2121, "user": "reader", "password": "secret" }"#).unwrap();

    let config = ConfigLoader::resolve(Some(path.as_path())).unwrap();
    assert_eq!(config.port, 2121);
    assert_eq!(config.user, "reader");
    assert_eq!(config.host, "ftp.sra.ebi.ac.uk");
}
