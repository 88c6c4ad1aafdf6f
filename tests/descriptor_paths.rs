// tests/descriptor_paths.rs

use std::path::PathBuf;

use fetchbin::BinaryDescriptor;
use fetchbin::platform::{Environment, StaticEnvironment, SystemEnvironment};
use proptest::prelude::*;

fn linux_amd64() -> StaticEnvironment {
    StaticEnvironment::new("linux", "amd64")
}

#[test]
fn absolute_download_path_is_joined_with_name() {
    let b = BinaryDescriptor::new("protoc", "/opt/tools", "https://x", "1.0");
    assert_eq!(b.executable_path(), PathBuf::from("/opt/tools/protoc"));
}

#[test]
fn relative_download_path_is_made_absolute() {
    let b = BinaryDescriptor::new("protoc", "tools/bin", "https://x", "1.0");
    let path = b.executable_path();

    assert!(path.is_absolute(), "expected absolute path, got {:?}", path);
    assert!(path.ends_with("tools/bin/protoc"));
    assert_eq!(path, std::env::current_dir().unwrap().join("tools/bin/protoc"));
}

#[test]
fn expands_platform_and_version_placeholders() {
    let b = BinaryDescriptor::new(
        "tool",
        "/bin",
        "https://example.com/$GOOS/$GOARCH/v$VERSION",
        "1.2.3",
    );
    let env = linux_amd64().with_var("OTHER", "ignored");

    assert_eq!(b.expand_url(&env), "https://example.com/linux/amd64/v1.2.3");
}

#[test]
fn platform_placeholders_ignore_same_named_variables() {
    let b = BinaryDescriptor::new("tool", "/bin", "${GOOS}-${GOARCH}-${VERSION}", "2");
    let env = linux_amd64()
        .with_var("GOOS", "plan9")
        .with_var("GOARCH", "mips")
        .with_var("VERSION", "9");

    assert_eq!(b.expand_url(&env), "linux-amd64-2");
}

#[test]
fn unknown_placeholders_fall_back_to_environment() {
    let b = BinaryDescriptor::new("tool", "/bin", "https://h/$CUSTOM_VAR/x", "1");

    let set = linux_amd64().with_var("CUSTOM_VAR", "foo");
    assert_eq!(b.expand_url(&set), "https://h/foo/x");

    let unset = linux_amd64();
    assert_eq!(b.expand_url(&unset), "https://h//x");
}

#[test]
fn expanded_values_are_not_expanded_again() {
    let b = BinaryDescriptor::new("tool", "/bin", "$MIRROR/$VERSION", "$GOOS");
    let env = linux_amd64().with_var("MIRROR", "$GOARCH");

    assert_eq!(b.expand_url(&env), "$GOARCH/$GOOS");
}

#[test]
fn system_environment_uses_go_platform_names() {
    let env = SystemEnvironment;
    let os = env.os();
    let arch = env.arch();

    assert_ne!(os, "macos");
    assert_ne!(arch, "x86_64");
    assert_ne!(arch, "aarch64");
    assert!(!os.is_empty() && !arch.is_empty());
}

proptest! {
    #[test]
    fn executable_path_is_deterministic(
        dir in "[a-zA-Z0-9_./-]{0,24}",
        name in "[a-zA-Z0-9_.-]{1,16}",
    ) {
        let b = BinaryDescriptor::new(name.clone(), dir.clone(), "u", "v");
        let again = BinaryDescriptor::new(name, dir, "other", "w");

        prop_assert_eq!(b.executable_path(), b.executable_path());
        prop_assert_eq!(b.executable_path(), again.executable_path());
    }

    #[test]
    fn expansion_never_panics_and_keeps_plain_text(template in "\\PC{0,40}") {
        let b = BinaryDescriptor::new("t", "/bin", template.clone(), "1");
        let out = b.expand_url(&linux_amd64());
        if !template.contains('$') {
            prop_assert_eq!(out, template);
        }
    }
}
