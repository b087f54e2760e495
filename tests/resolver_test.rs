mod common;

use std::path::Path;
use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use cliventory::application::services::CommandResolver;
use cliventory::application::ApplicationError;
use cliventory::domain::{CommandSpec, DomainError, OptionSpec, OptionType, OptionValue};
use cliventory::infrastructure::traits::{RealCommandRunner, RealFileSystem};
use cliventory::util::testing;
use cliventory::{ExecutorRegistry, Settings};

use common::write;

fn resolver(dir: &Path, registry: ExecutorRegistry, settings: &Settings) -> CommandResolver {
    testing::init_test_setup();
    CommandResolver::new(
        dir,
        registry,
        Arc::new(RealFileSystem),
        Arc::new(RealCommandRunner),
        settings,
    )
}

fn registry() -> ExecutorRegistry {
    ExecutorRegistry::new().register_fn("commands/deploy", |_| Ok(0))
}

fn option(name: &str, alias: Option<&str>) -> OptionSpec {
    OptionSpec {
        name: name.into(),
        alias: alias.map(Into::into),
        description: None,
        default: None,
        value_type: None,
    }
}

fn command(executor: Option<&str>, options: Vec<OptionSpec>) -> CommandSpec {
    CommandSpec {
        name: Some("deploy".into()),
        description: Some("Deploy the app".into()),
        executor: executor.map(Into::into),
        options,
    }
}

#[test]
fn given_command_without_options_when_resolving_then_description_unchanged() {
    let dir = TempDir::new().unwrap();
    let resolver = resolver(dir.path(), registry(), &Settings::default());

    let resolved = resolver
        .parse_command(&command(Some("./commands/deploy"), vec![]))
        .unwrap();

    assert_eq!(resolved.name, "deploy");
    assert_eq!(resolved.description, "Deploy the app");
    assert!(resolved.options.is_empty());
}

#[test]
fn given_options_when_resolving_then_hints_prefix_description_in_declaration_order() {
    let dir = TempDir::new().unwrap();
    let resolver = resolver(dir.path(), registry(), &Settings::default());
    let spec = command(
        Some("./commands/deploy"),
        vec![option("env", Some("e")), option("force", None)],
    );

    let resolved = resolver.parse_command(&spec).unwrap();

    assert_eq!(resolved.description, "[--env, -e] [--force] Deploy the app");
}

#[test]
fn given_options_without_description_when_resolving_then_hints_only() {
    let dir = TempDir::new().unwrap();
    let resolver = resolver(dir.path(), registry(), &Settings::default());
    let mut spec = command(Some("./commands/deploy"), vec![option("env", None)]);
    spec.description = None;

    let resolved = resolver.parse_command(&spec).unwrap();

    assert_eq!(resolved.description, "[--env]");
}

#[test]
fn given_default_without_type_when_resolving_then_type_inferred_from_default() {
    let dir = TempDir::new().unwrap();
    let resolver = resolver(dir.path(), registry(), &Settings::default());
    let mut retries = option("retries", None);
    retries.default = Some(OptionValue::Integer(3));
    let mut dry_run = option("dry-run", None);
    dry_run.value_type = Some(OptionType::Boolean);

    let resolved = resolver
        .parse_command(&command(Some("./commands/deploy"), vec![retries, dry_run]))
        .unwrap();

    assert_eq!(resolved.option("retries").unwrap().value_type, OptionType::Integer);
    assert_eq!(resolved.option("dry-run").unwrap().value_type, OptionType::Boolean);
}

#[rstest]
#[case::no_executor(None)]
#[case::blank_executor(Some("  "))]
#[case::nothing_at_path(Some("./commands/missing"))]
fn given_unresolvable_executor_when_resolving_then_invalid_executor(#[case] executor: Option<&str>) {
    let dir = TempDir::new().unwrap();
    let resolver = resolver(dir.path(), registry(), &Settings::default());

    let result = resolver.parse_command(&command(executor, vec![]));

    match result {
        Err(ApplicationError::InvalidExecutor { command, .. }) => assert_eq!(command, "deploy"),
        other => panic!("expected InvalidExecutor, got {:?}", other),
    }
}

#[test]
fn given_directory_at_executor_path_when_resolving_then_invalid_executor() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("commands/build")).unwrap();
    let resolver = resolver(dir.path(), registry(), &Settings::default());

    let result = resolver.parse_command(&command(Some("./commands/build"), vec![]));

    match result {
        Err(ApplicationError::InvalidExecutor { reason, .. }) => {
            assert!(reason.contains("not a file"), "{}", reason)
        }
        other => panic!("expected InvalidExecutor, got {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn given_non_executable_file_when_resolving_then_invalid_executor() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "commands/build", "#!/bin/sh\nexit 0\n");
    let resolver = resolver(dir.path(), registry(), &Settings::default());

    let result = resolver.parse_command(&command(Some("./commands/build"), vec![]));

    match result {
        Err(ApplicationError::InvalidExecutor { reason, .. }) => {
            assert!(reason.contains("not executable"), "{}", reason)
        }
        other => panic!("expected InvalidExecutor, got {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn given_executable_file_when_resolving_then_resolved() {
    let dir = TempDir::new().unwrap();
    let script = write(dir.path(), "commands/build", "#!/bin/sh\nexit 0\n");
    common::make_executable(&script);
    let resolver = resolver(dir.path(), registry(), &Settings::default());

    let resolved = resolver.parse_command(&command(Some("./commands/build"), vec![]));

    assert!(resolved.is_ok(), "{:?}", resolved);
}

#[cfg(unix)]
#[test]
fn given_external_executors_disabled_when_resolving_file_then_invalid_executor() {
    let dir = TempDir::new().unwrap();
    let script = write(dir.path(), "commands/build", "#!/bin/sh\nexit 0\n");
    common::make_executable(&script);
    let settings = Settings {
        external_executors: false,
        ..Settings::default()
    };
    let resolver = resolver(dir.path(), registry(), &settings);

    let result = resolver.parse_command(&command(Some("./commands/build"), vec![]));

    match result {
        Err(ApplicationError::InvalidExecutor { reason, .. }) => {
            assert!(reason.contains("not registered"), "{}", reason)
        }
        other => panic!("expected InvalidExecutor, got {:?}", other),
    }
}

#[test]
fn given_registered_executor_when_external_disabled_then_resolved() {
    let dir = TempDir::new().unwrap();
    let settings = Settings {
        external_executors: false,
        ..Settings::default()
    };
    let resolver = resolver(dir.path(), registry(), &settings);

    let resolved = resolver.parse_command(&command(Some("commands/deploy"), vec![]));

    assert!(resolved.is_ok());
}

#[rstest]
#[case::help_name(option("help", None))]
#[case::h_alias(option("host", Some("h")))]
#[case::help_alias(option("assist", Some("help")))]
fn given_option_clashing_with_help_when_resolving_then_reserved_option(#[case] clashing: OptionSpec) {
    let dir = TempDir::new().unwrap();
    let resolver = resolver(dir.path(), registry(), &Settings::default());

    let result = resolver.parse_command(&command(Some("./commands/deploy"), vec![clashing]));

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::ReservedOption { .. }))
    ));
}

#[rstest]
#[case::same_name(vec![option("env", None), option("env", None)])]
#[case::same_short(vec![option("env", Some("e")), option("edition", Some("e"))])]
#[case::alias_matches_name(vec![option("env", None), option("environment", Some("env"))])]
fn given_colliding_options_when_resolving_then_duplicate_option(#[case] options: Vec<OptionSpec>) {
    let dir = TempDir::new().unwrap();
    let resolver = resolver(dir.path(), registry(), &Settings::default());

    let result = resolver.parse_command(&command(Some("./commands/deploy"), options));

    match result {
        Err(ApplicationError::Domain(DomainError::DuplicateOption { command, .. })) => {
            assert_eq!(command, "deploy")
        }
        other => panic!("expected DuplicateOption, got {:?}", other),
    }
}

#[test]
fn given_command_without_name_when_resolving_then_missing_command_name() {
    let dir = TempDir::new().unwrap();
    let resolver = resolver(dir.path(), registry(), &Settings::default());
    let mut spec = command(Some("./commands/deploy"), vec![]);
    spec.name = None;

    let result = resolver.parse_command(&spec);

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::MissingCommandName))
    ));
}

#[rstest]
#[case::empty("", None)]
#[case::blank("   ", None)]
#[case::leading_dashes("--env", None)]
#[case::inner_space("dry run", None)]
#[case::equals_sign("env=prod", None)]
#[case::alias_with_space("env", Some("e x"))]
fn given_malformed_option_name_when_resolving_then_invalid_option_name(
    #[case] name: &str,
    #[case] alias: Option<&str>,
) {
    let dir = TempDir::new().unwrap();
    let resolver = resolver(dir.path(), registry(), &Settings::default());

    let result = resolver.parse_command(&command(Some("./commands/deploy"), vec![option(name, alias)]));

    match result {
        Err(ApplicationError::Domain(DomainError::InvalidOptionName { command, .. })) => {
            assert_eq!(command, "deploy")
        }
        other => panic!("expected InvalidOptionName, got {:?}", other),
    }
}

#[rstest]
#[case::text_for_integer(OptionType::Integer, OptionValue::String("abc".into()))]
#[case::fraction_for_integer(OptionType::Integer, OptionValue::Number(2.5))]
#[case::text_for_number(OptionType::Number, OptionValue::String("fast".into()))]
#[case::text_for_boolean(OptionType::Boolean, OptionValue::String("maybe".into()))]
fn given_default_not_matching_type_when_resolving_then_invalid_default(
    #[case] value_type: OptionType,
    #[case] default: OptionValue,
) {
    let dir = TempDir::new().unwrap();
    let resolver = resolver(dir.path(), registry(), &Settings::default());
    let mut retries = option("retries", None);
    retries.value_type = Some(value_type);
    retries.default = Some(default);

    let result = resolver.parse_command(&command(Some("./commands/deploy"), vec![retries]));

    match result {
        Err(ApplicationError::Domain(DomainError::InvalidDefault { option, expected, .. })) => {
            assert_eq!(option, "retries");
            assert_eq!(expected, value_type.to_string());
        }
        other => panic!("expected InvalidDefault, got {:?}", other),
    }
}

#[test]
fn given_default_in_string_form_of_type_when_resolving_then_accepted() {
    let dir = TempDir::new().unwrap();
    let resolver = resolver(dir.path(), registry(), &Settings::default());
    let mut retries = option("retries", None);
    retries.value_type = Some(OptionType::Integer);
    retries.default = Some(OptionValue::String("3".into()));

    let resolved = resolver.parse_command(&command(Some("./commands/deploy"), vec![retries]));

    assert!(resolved.is_ok(), "{:?}", resolved);
}

#[test]
fn given_dashed_alias_when_resolving_then_hint_shows_real_flags() {
    let dir = TempDir::new().unwrap();
    let resolver = resolver(dir.path(), registry(), &Settings::default());
    let spec = command(
        Some("./commands/deploy"),
        vec![option("env", Some("-e")), option("region", Some("zone"))],
    );

    let resolved = resolver.parse_command(&spec).unwrap();

    assert_eq!(
        resolved.description,
        "[--env, -e] [--region, --zone] Deploy the app"
    );
}
