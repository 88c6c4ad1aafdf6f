// tests/manifest.rs

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use fetchbin::cli::Command;
use fetchbin::config::{Manifest, load_and_validate};
use fetchbin::dispatch;
use fetchbin::errors::FetchbinError;
use fetchbin::fs::RealFileSystem;
use fetchbin::fs::mock::MockFileSystem;
use fetchbin::types::HttpStatusPolicy;
use fetchbin_test_utils::builders::{BinaryConfigBuilder, FakeHost, ManifestBuilder};
use fetchbin_test_utils::fakes::FakeFetcher;
use fetchbin_test_utils::init_tracing;
use tempfile::NamedTempFile;

fn write_manifest(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn loads_manifest_with_defaults() {
    let file = write_manifest(
        r#"
[binary.protoc]
url = "https://example.com/$GOOS/$GOARCH/v$VERSION/protoc"
version = "1.2.3"
"#,
    );

    let manifest = load_and_validate(&RealFileSystem, file.path()).unwrap();

    assert_eq!(manifest.names().collect::<Vec<_>>(), vec!["protoc"]);
    assert_eq!(manifest.config.download_path, PathBuf::from(".bin"));
    assert_eq!(manifest.config.http_status, HttpStatusPolicy::Ignore);
    assert_eq!(manifest.timeout(), None);
    assert_eq!(manifest.root(), file.path().parent().unwrap());
}

#[test]
fn loads_global_and_per_binary_settings() {
    let file = write_manifest(
        r#"
[config]
download_path = "/opt/tools"
timeout_secs = 30
http_status = "fail"

[binary.a]
url = "https://a"

[binary.b]
url = "https://b"
download_path = "/elsewhere"
http_status = "ignore"
"#,
    );

    let manifest = load_and_validate(&RealFileSystem, file.path()).unwrap();
    let fs = MockFileSystem::new();

    assert_eq!(manifest.timeout(), Some(Duration::from_secs(30)));

    let a = manifest.descriptor("a", &fs).unwrap();
    assert_eq!(a.executable_path(), PathBuf::from("/opt/tools/a"));
    assert_eq!(a.status_policy(), HttpStatusPolicy::Fail);

    let b = manifest.descriptor("b", &fs).unwrap();
    assert_eq!(b.executable_path(), PathBuf::from("/elsewhere/b"));
    assert_eq!(b.status_policy(), HttpStatusPolicy::Ignore);
}

#[test]
fn invalid_status_policy_is_a_toml_error() {
    let file = write_manifest(
        r#"
[config]
http_status = "sometimes"

[binary.a]
url = "https://a"
"#,
    );

    let result = load_and_validate(&RealFileSystem, file.path());
    assert!(matches!(result, Err(FetchbinError::Toml(_))), "got {:?}", result);
}

#[test]
fn missing_manifest_is_a_file_io_error() {
    let result = load_and_validate(&RealFileSystem, Path::new("/definitely/not/here.toml"));
    assert!(matches!(result, Err(FetchbinError::FileIo { .. })), "got {:?}", result);
}

#[test]
fn empty_manifest_is_rejected() {
    let result = Manifest::try_from(ManifestBuilder::new().raw());

    match result {
        Err(FetchbinError::Config(msg)) => assert!(msg.contains("at least one")),
        other => panic!("Expected Config error, got: {:?}", other),
    }
}

#[test]
fn path_like_names_are_rejected() {
    for name in ["../evil", "a/b", "..", ".", "", "a\\b"] {
        let raw = ManifestBuilder::new()
            .with_binary(name, BinaryConfigBuilder::new("https://x").build())
            .raw();

        match Manifest::try_from(raw) {
            Err(FetchbinError::Config(msg)) => assert!(msg.contains("plain file name"), "{msg}"),
            other => panic!("Expected Config error for {name:?}, got: {:?}", other),
        }
    }
}

#[test]
fn empty_url_and_zero_timeout_are_rejected() {
    let raw = ManifestBuilder::new()
        .with_binary("a", BinaryConfigBuilder::new("  ").build())
        .raw();
    match Manifest::try_from(raw) {
        Err(FetchbinError::Config(msg)) => assert!(msg.contains("empty `url`")),
        other => panic!("Expected Config error, got: {:?}", other),
    }

    let raw = ManifestBuilder::new()
        .with_timeout_secs(0)
        .with_binary("a", BinaryConfigBuilder::new("https://a").build())
        .raw();
    match Manifest::try_from(raw) {
        Err(FetchbinError::Config(msg)) => assert!(msg.contains("timeout_secs")),
        other => panic!("Expected Config error, got: {:?}", other),
    }
}

#[test]
fn embedded_payload_is_read_relative_to_root_without_whitespace() {
    let fs = MockFileSystem::new();
    let encoded = STANDARD.encode(b"hello binary");
    let (head, tail) = encoded.split_at(8);
    fs.add_file("/project/payloads/tool.b64", format!("{head}\n{tail}\n"));

    let manifest = ManifestBuilder::new()
        .with_binary(
            "tool",
            BinaryConfigBuilder::new("https://x")
                .embedded("payloads/tool.b64")
                .build(),
        )
        .build()
        .with_root("/project");

    let descriptor = manifest.descriptor("tool", &fs).unwrap();
    assert_eq!(descriptor.embedded_data(), encoded);
    assert_eq!(
        descriptor.executable_path(),
        PathBuf::from("/project/.bin/tool")
    );
}

#[test]
fn missing_or_blank_embedded_payload_is_an_error() {
    let fs = MockFileSystem::new();
    fs.add_file("/p/blank.b64", "\n  \n");

    let manifest = ManifestBuilder::new()
        .with_binary("missing", BinaryConfigBuilder::new("https://x").embedded("none.b64").build())
        .with_binary("blank", BinaryConfigBuilder::new("https://x").embedded("blank.b64").build())
        .build()
        .with_root("/p");

    assert!(matches!(
        manifest.descriptor("missing", &fs),
        Err(FetchbinError::FileIo { .. })
    ));
    assert!(matches!(
        manifest.descriptor("blank", &fs),
        Err(FetchbinError::Config(_))
    ));
    assert!(matches!(
        manifest.descriptor("other", &fs),
        Err(FetchbinError::UnknownBinary(name)) if name == "other"
    ));
}

fn two_binary_manifest() -> Manifest {
    ManifestBuilder::new()
        .with_download_path("/virtual/bin")
        .with_binary(
            "alpha",
            BinaryConfigBuilder::new("https://dl/$GOOS-$GOARCH/alpha-$VERSION")
                .version("0.9")
                .build(),
        )
        .with_binary("beta", BinaryConfigBuilder::new("https://dl/beta").build())
        .build()
}

#[tokio::test]
async fn prepare_command_provisions_every_binary() {
    init_tracing();
    let fake = FakeHost::new(FakeFetcher::ok(b"bin".to_vec()));

    let mut out = Vec::new();
    dispatch(
        &two_binary_manifest(),
        &fake.host,
        Command::Prepare { names: vec![] },
        &mut out,
    )
    .await
    .unwrap();

    assert_eq!(
        fake.http.requests(),
        vec![
            "https://dl/linux-amd64/alpha-0.9".to_string(),
            "https://dl/beta".to_string()
        ]
    );
    assert!(fake.fs.contents("/virtual/bin/alpha").is_some());
    assert!(fake.fs.contents("/virtual/bin/beta").is_some());
}

#[tokio::test]
async fn run_command_prepares_then_launches() {
    init_tracing();
    let fake = FakeHost::new(FakeFetcher::ok(b"bin".to_vec()));
    let command = Command::Run {
        name: "beta".to_string(),
        args: vec!["-v".to_string()],
    };

    dispatch(&two_binary_manifest(), &fake.host, command, &mut std::io::sink())
        .await
        .unwrap();

    let launches = fake.launcher.launches();
    assert_eq!(launches.len(), 1);
    assert_eq!(launches[0].program, PathBuf::from("/virtual/bin/beta"));
    assert_eq!(launches[0].args, vec!["-v".to_string()]);
}

#[tokio::test]
async fn embed_command_writes_base64_payload() {
    init_tracing();
    let body = b"\x7fELF pretend binary".to_vec();
    let fake = FakeHost::new(FakeFetcher::ok(body.clone()));
    let command = Command::Embed {
        name: "alpha".to_string(),
        output: PathBuf::from("/out/alpha.b64"),
    };

    dispatch(&two_binary_manifest(), &fake.host, command, &mut std::io::sink())
        .await
        .unwrap();

    let written = fake.fs.contents("/out/alpha.b64").unwrap();
    assert_eq!(STANDARD.decode(written).unwrap(), body);
    assert!(
        fake.fs.contents("/virtual/bin/alpha").is_none(),
        "embed must not materialize the binary"
    );
}

#[tokio::test]
async fn unknown_binary_command_fails() {
    init_tracing();
    let fake = FakeHost::new(FakeFetcher::ok(Vec::new()));

    let err = dispatch(
        &two_binary_manifest(),
        &fake.host,
        Command::Url {
            name: "gamma".to_string(),
        },
        &mut std::io::sink(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, FetchbinError::UnknownBinary(_)));
}

async fn output_of(fake: &FakeHost, command: Command) -> String {
    let mut out = Vec::new();
    dispatch(&two_binary_manifest(), &fake.host, command, &mut out)
        .await
        .unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn url_and_path_commands_print_one_line() {
    init_tracing();
    let fake = FakeHost::new(FakeFetcher::ok(Vec::new()));

    let url = output_of(&fake, Command::Url { name: "alpha".to_string() }).await;
    assert_eq!(url, "https://dl/linux-amd64/alpha-0.9\n");

    let path = output_of(&fake, Command::Path { name: "beta".to_string() }).await;
    assert_eq!(path, "/virtual/bin/beta\n");

    assert_eq!(fake.http.request_count(), 0);
}

#[tokio::test]
async fn list_command_describes_every_binary() {
    init_tracing();
    let fake = FakeHost::new(FakeFetcher::ok(Vec::new()));
    fake.fs.add_file("/virtual/bin/beta", b"bin".to_vec());

    let listing = output_of(&fake, Command::List).await;

    let expected = "\
binaries (2):
  - alpha
      template: https://dl/$GOOS-$GOARCH/alpha-$VERSION
      version: 0.9
      url: https://dl/linux-amd64/alpha-0.9
      path: /virtual/bin/alpha
      saved: false
  - beta
      template: https://dl/beta
      url: https://dl/beta
      path: /virtual/bin/beta
      saved: true
";
    assert_eq!(listing, expected);
}

#[tokio::test]
async fn per_binary_status_policy_overrides_global_one() {
    init_tracing();
    let fake = FakeHost::new(FakeFetcher::status(404, b"not found".to_vec()));
    let manifest = ManifestBuilder::new()
        .with_download_path("/virtual/bin")
        .with_http_status(HttpStatusPolicy::Fail)
        .with_binary("strict", BinaryConfigBuilder::new("https://dl/strict").build())
        .with_binary(
            "lenient",
            BinaryConfigBuilder::new("https://dl/lenient")
                .http_status(HttpStatusPolicy::Ignore)
                .build(),
        )
        .build();

    let prepare = |name: &str| Command::Prepare {
        names: vec![name.to_string()],
    };

    let err = dispatch(&manifest, &fake.host, prepare("strict"), &mut std::io::sink())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchbinError::Fetch { .. }), "got {:?}", err);
    assert!(fake.fs.contents("/virtual/bin/strict").is_none());

    dispatch(&manifest, &fake.host, prepare("lenient"), &mut std::io::sink())
        .await
        .unwrap();
    assert_eq!(
        fake.fs.contents("/virtual/bin/lenient").unwrap(),
        b"not found".to_vec()
    );
}
