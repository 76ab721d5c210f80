use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// `fiken` isolated from the user's keyring, config and environment.
fn fiken(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fiken").unwrap();
    cmd.env_remove("FIKEN_API_TOKEN")
        .env_remove("FIKEN_API_URL")
        .env_remove("FIKEN_KEYRING_BACKEND")
        .env_remove("FIKEN_LOG")
        .arg("--keyring-backend")
        .arg("file")
        .arg("--config-dir")
        .arg(config_dir);
    cmd
}

/// Config dir with no rate-limit delay, pointed at `server`.
fn mock_config(server: &MockServer) -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        format!("api_url = \"{}\"\nrate_limit_ms = 0\n", server.uri()),
    )
    .unwrap();
    dir
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("fiken")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fiken.no"))
        .stdout(predicate::str::contains("purchases"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn test_auth_token_flow_with_file_backend() {
    let dir = tempdir().unwrap();

    fiken(dir.path())
        .args(["auth", "token"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No token configured"));

    fiken(dir.path())
        .args(["auth", "token", "abcd1234efgh5678"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Token saved to file storage"));

    assert!(dir.path().join("secrets.toml").exists());

    fiken(dir.path())
        .args(["auth", "token"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Token configured: abcd********5678"));

    fiken(dir.path())
        .args(["auth", "logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Token removed"));

    fiken(dir.path())
        .args(["auth", "token"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No token configured"));
}

#[test]
fn test_auth_token_from_stdin() {
    let dir = tempdir().unwrap();

    fiken(dir.path())
        .args(["auth", "token", "--stdin"])
        .write_stdin("  piped-token-value  \n")
        .assert()
        .success();

    fiken(dir.path())
        .args(["auth", "token"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Token configured: pipe"));
}

#[test]
fn test_verbose_notes_stay_off_stdout() {
    let dir = tempdir().unwrap();

    fiken(dir.path())
        .args(["-v", "auth", "token", "--stdin"])
        .write_stdin("piped-token-value\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Verbose: Reading token from stdin"))
        .stdout(predicate::str::contains("Verbose").not());
}

#[test]
fn test_blank_token_is_rejected() {
    let dir = tempdir().unwrap();

    fiken(dir.path())
        .args(["auth", "token", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty"));
}

#[test]
fn test_login_refused_without_input() {
    let dir = tempdir().unwrap();

    fiken(dir.path())
        .args(["--no-input", "auth", "login"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--no-input"));
}

#[test]
fn test_list_without_token_fails() {
    let dir = tempdir().unwrap();

    fiken(dir.path())
        .args(["--company", "acme", "contacts", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No API token configured"))
        .stderr(predicate::str::contains("fiken auth token"));
}

#[test]
fn test_unknown_keyring_backend_fails() {
    let dir = tempdir().unwrap();

    Command::cargo_bin("fiken")
        .unwrap()
        .env_remove("FIKEN_KEYRING_BACKEND")
        .args(["--keyring-backend", "pass", "--config-dir"])
        .arg(dir.path())
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("keyring-backend"));
}

#[test]
fn test_config_set_and_show() {
    let dir = tempdir().unwrap();

    fiken(dir.path())
        .args(["config", "set", "page-size", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set page-size = 50"));

    fiken(dir.path())
        .args(["--json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"page_size\": 50"))
        .stdout(predicate::str::contains("\"keyring_backend\": \"file\""));

    fiken(dir.path())
        .args(["config", "set", "page-size", "500"])
        .assert()
        .failure();

    fiken(dir.path())
        .args(["config", "set", "rate-limit-ms", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rate-limit-ms"));

    fiken(dir.path())
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("colour"));
}

#[test]
fn test_companies_default_roundtrip() {
    let dir = tempdir().unwrap();

    fiken(dir.path())
        .args(["companies", "default", "acme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Default company set to 'acme'"));

    fiken(dir.path())
        .args(["companies", "default"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Default company: acme"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_contacts_list_against_mock_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/companies/acme/contacts"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([
                    {"contactId": 1, "name": "Ola Nordmann", "customer": true},
                    {"contactId": 2, "name": "Kari Leverandør AS", "supplier": true}
                ]))
                .insert_header("Fiken-Api-Page", "0")
                .insert_header("Fiken-Api-Page-Count", "1")
                .insert_header("Fiken-Api-Result-Count", "2"),
        )
        .expect(2)
        .mount(&server)
        .await;

    let dir = mock_config(&server);

    fiken(dir.path())
        .args(["--token", "test-token", "--company", "acme", "--json"])
        .args(["contacts", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Ola Nordmann\""))
        .stdout(predicate::str::contains("\"contactId\": 2"));

    fiken(dir.path())
        .args(["--token", "test-token", "--company", "acme"])
        .args(["contacts", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ola Nordmann"))
        .stdout(predicate::str::contains("2 contacts"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_error_exits_non_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/companies/acme/invoices"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let dir = mock_config(&server);

    fiken(dir.path())
        .args(["--token", "bad-token", "--company", "acme"])
        .args(["invoices", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fetching invoices"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_purchase_create_reports_location() {
    let server = MockServer::start().await;
    let location = format!("{}/companies/acme/purchases/42", server.uri());
    Mock::given(method("POST"))
        .and(path("/companies/acme/purchases"))
        .respond_with(ResponseTemplate::new(201).insert_header("Location", location.as_str()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = mock_config(&server);

    fiken(dir.path())
        .args(["--token", "test-token", "--company", "acme"])
        .args(["purchases", "create", "--date", "2024-05-01", "--account", "6800"])
        .args(["--amount", "1250,00", "--vat-type", "HIGH"])
        .args(["--payment-account", "1920:10001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Purchase created"))
        .stdout(predicate::str::contains("/companies/acme/purchases/42"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_survives_failing_line() {
    let server = MockServer::start().await;
    for (resource, count) in [("inbox", "3"), ("purchases", "17")] {
        Mock::given(method("GET"))
            .and(path(format!("/companies/acme/{}", resource)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .insert_header("Fiken-Api-Result-Count", count),
            )
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/companies/acme/bankAccounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Driftskonto", "accountCode": "1920:10001", "bankAccountNumber": "12345678903"},
            {"name": "Old account", "accountCode": "1920:10002", "inactive": true}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/companies/acme/contacts"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let dir = mock_config(&server);

    fiken(dir.path())
        .args(["--token", "test-token", "--company", "acme", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dashboard for: acme"))
        .stdout(predicate::str::contains("Inbox: 3 documents"))
        .stdout(predicate::str::contains("Purchases: 17 total"))
        .stdout(predicate::str::contains("Bank accounts: 2 accounts"))
        .stdout(predicate::str::contains("Driftskonto (1920:10001) - 12345678903"))
        .stdout(predicate::str::contains("Old account").not())
        .stdout(predicate::str::contains("Contacts: error ("));
}
