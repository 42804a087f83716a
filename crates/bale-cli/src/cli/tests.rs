#![cfg(test)]

use super::*;
use clap::Parser;

#[test]
fn test_parse_entry_named() {
    assert_eq!(
        parse_entry("main=./src/index.js").unwrap(),
        ("main".to_string(), "./src/index.js".to_string())
    );
}

#[test]
fn test_parse_entry_uses_stem() {
    assert_eq!(
        parse_entry("src/statistics.ts").unwrap(),
        ("statistics".to_string(), "src/statistics.ts".to_string())
    );
}

#[test]
fn test_parse_entry_rejects_bad_values() {
    assert!(parse_entry("main=").is_err());
    assert!(parse_entry("=src/index.js").is_err());
    assert!(parse_entry("a/b=src/index.js").is_err());
}

#[test]
fn test_build_command_flags() {
    let cli = Cli::try_parse_from([
        "bale",
        "build",
        "--mode",
        "prod",
        "-e",
        "main=src/index.js",
        "--entry",
        "src/stat.js",
        "--out-dir",
        "build",
        "--clean",
        "--watch",
    ])
    .unwrap();

    let Command::Build(args) = cli.command;
    assert_eq!(args.mode, Some(ModeArg::Production));
    assert_eq!(
        args.entry,
        vec![
            ("main".to_string(), "src/index.js".to_string()),
            ("stat".to_string(), "src/stat.js".to_string()),
        ]
    );
    assert_eq!(args.out_dir, Some(std::path::PathBuf::from("build")));
    assert!(args.clean);
    assert!(args.watch);
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["bale", "build", "-v", "--no-color"]).unwrap();
    assert!(cli.verbose);
    assert!(cli.no_color);
    assert!(!cli.quiet);
}

#[test]
fn test_verbose_conflicts_with_quiet() {
    assert!(Cli::try_parse_from(["bale", "-v", "-q", "build"]).is_err());
}

#[test]
fn test_invalid_mode_rejected() {
    assert!(Cli::try_parse_from(["bale", "build", "--mode", "staging"]).is_err());
}
