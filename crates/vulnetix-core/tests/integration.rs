use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vulnetix_core::ci::{RuntimePlatform, StaticEnv, load_context};
use vulnetix_core::config::{TaskType, ToolFormat, VulnetixConfig, parse_org_id, parse_tools};
use vulnetix_core::release::{self, ArtifactStatus, SiblingJobsContext};
use vulnetix_core::sarif::EnhancedValidationResult;
use vulnetix_core::validate_file;

/// Path to the fixtures directory relative to the crate root.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn validate_fixture(name: &str) -> EnhancedValidationResult {
    validate_file(&fixtures_dir().join(name))
        .unwrap_or_else(|e| panic!("failed to validate {name}: {e:#}"))
}

fn copy_fixture(name: &str, dest: &Path) {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::copy(fixtures_dir().join(name), dest).unwrap();
}

fn github_env() -> StaticEnv {
    StaticEnv::from_pairs([
        ("GITHUB_ACTIONS", "true"),
        ("GITHUB_REPOSITORY", "octocat/Spoon-Knife"),
        ("GITHUB_REPOSITORY_OWNER", "octocat"),
        ("GITHUB_RUN_ID", "123456789"),
        ("GITHUB_RUN_NUMBER", "7"),
        ("GITHUB_REF_NAME", "release/1.0"),
        ("GITHUB_EVENT_NAME", "push"),
        ("GITHUB_API_URL", "https://api.github.com"),
    ])
}

fn release_config(env: &StaticEnv) -> VulnetixConfig {
    let org = parse_org_id(Some("123e4567-e89b-12d3-a456-426614174000")).unwrap();
    let mut cfg = VulnetixConfig::new(org, TaskType::Release, load_context(env, "0.1.0"), "0.1.0");
    cfg.release.release_branch = "release/1.0".into();
    cfg
}

#[test]
fn valid_fixtures_pass_both_passes() {
    let cases = [
        ("minimal_2_1_0.sarif", "2.1.0", 1, 0, 1),
        ("comprehensive_2_1_0.sarif", "2.1.0", 1, 1, 1),
        ("basic_2_0_0.sarif", "2.0.0", 1, 1, 1),
        ("notifications.sarif", "2.1.0", 1, 0, 1),
        ("unicode.sarif", "2.1.0", 1, 1, 1),
        ("empty_results.sarif", "2.1.0", 1, 0, 1),
    ];

    for (name, version, runs, results, tools) in cases {
        let result = validate_fixture(name);
        assert!(result.valid, "{name}: {:?}", result.all_errors());
        assert_eq!(result.version(), version, "{name}");

        let stats = result.stats();
        assert_eq!(stats.run_count, runs, "{name}");
        assert_eq!(stats.result_count, results, "{name}");
        assert_eq!(stats.tool_count, tools, "{name}");
    }
}

#[test]
fn repeated_tool_names_count_once() {
    let result = validate_fixture("multi_run.sarif");

    assert!(result.valid);
    assert_eq!(result.stats().run_count, 3);
    assert_eq!(result.stats().result_count, 2);
    assert_eq!(result.stats().tool_count, 2);
}

#[test]
fn invalid_fixtures_report_structural_errors() {
    let cases = [
        ("missing_version.sarif", 2, "Unsupported SARIF version: "),
        ("unsupported_version.sarif", 1, "Unsupported SARIF version: 3.0.0"),
        ("missing_runs.sarif", 2, "SARIF 2.1.0 requires at least one run"),
        ("empty_runs.sarif", 1, "SARIF 2.1.0 requires at least one run"),
        (
            "missing_driver_name.sarif",
            1,
            "Run 0: tool.driver.name is required in SARIF 2.1.0",
        ),
        (
            "missing_message_text.sarif",
            1,
            "Run 0, Result 0: message.text is required",
        ),
        ("malformed.sarif", 1, "Invalid JSON format"),
    ];

    for (name, count, first) in cases {
        let result = validate_fixture(name);
        let errors = &result.structural.errors;

        assert!(!result.valid, "{name} should fail");
        assert_eq!(errors.len(), count, "{name}: {errors:?}");
        assert!(errors[0].starts_with(first), "{name}: {}", errors[0]);
    }
}

#[test]
fn unsupported_version_passes_the_cross_check_only() {
    let result = validate_fixture("unsupported_version.sarif");

    assert!(!result.structural.valid);
    assert!(result.schema_valid);
    assert_eq!(result.failed_passes(), vec!["structural"]);
    assert!(result.structural.errors[0].contains("(supported: 2.1.0, 2.0.0)"));
}

#[test]
fn mistyped_members_fail_the_cross_check_only() {
    let result = validate_fixture("mistyped_members.sarif");

    assert!(result.structural.valid);
    assert!(!result.schema_valid);
    assert!(!result.valid);
    assert_eq!(result.failed_passes(), vec!["schema"]);
    assert_eq!(result.stats().result_count, 1);
}

#[test]
fn malformed_fixture_has_zero_stats() {
    let result = validate_fixture("malformed.sarif");

    assert!(!result.schema_valid);
    assert_eq!(result.stats().run_count, 0);
    assert_eq!(result.stats().result_count, 0);
    assert_eq!(result.stats().tool_count, 0);
}

#[test]
fn validate_file_reports_missing_path() {
    let err = validate_file(Path::new("does/not/exist.sarif")).unwrap_err();
    assert!(format!("{err:#}").contains("failed to open SARIF file does/not/exist.sarif"));
}

#[test]
fn release_flow_from_github_context() {
    let env = github_env();
    let mut cfg = release_config(&env);
    assert_eq!(cfg.ci.platform, RuntimePlatform::Github);

    cfg.validate_release_readiness().expect("prerequisites satisfied");

    let naming = cfg.artifact_naming();
    assert_eq!(
        naming.for_tool("sast", "results.sarif"),
        "vulnetix-octocat-Spoon-Knife-123456789-sast-results.sarif"
    );

    let sibling = SiblingJobsContext::new(&cfg.ci, &cfg.release);
    assert_eq!(sibling.artifact_pattern, "vulnetix-octocat-Spoon-Knife-123456789-*");
    assert_eq!(sibling.run.workflow_run_attempt, "1");
    assert_eq!(sibling.timeout_minutes, 30);

    let dir = TempDir::new().unwrap();
    copy_fixture("comprehensive_2_1_0.sarif", &dir.path().join("reports/eslint.sarif"));
    copy_fixture("basic_2_0_0.sarif", &dir.path().join("artifacts/legacy.sarif"));
    fs::write(dir.path().join("sbom.cdx"), "<bom/>").unwrap();

    cfg.tools = parse_tools(
        r#"
- category: SAST
  artifact_name: eslint.sarif
  format: SARIF
- category: SAST
  artifact_name: legacy.sarif
  format: SARIF
- category: SCA
  artifact_name: sbom.cdx
  format: SBOM
"#,
    )
    .unwrap();
    cfg.release.required_formats = vec![ToolFormat::Sarif, ToolFormat::Sbom];
    cfg.release.min_tool_count = Some(3);

    let assessment = release::assess(&cfg.tools, dir.path(), &cfg.release);

    assert!(assessment.is_ready(), "{:?}", assessment.violations);
    let statuses: Vec<_> = assessment.artifacts.iter().map(|a| a.status).collect();
    assert_eq!(
        statuses,
        vec![
            ArtifactStatus::Valid,
            ArtifactStatus::Valid,
            ArtifactStatus::Skipped
        ]
    );
}

#[test]
fn release_flow_blocks_on_invalid_artifact() {
    let env = github_env();
    let cfg = release_config(&env);

    let dir = TempDir::new().unwrap();
    copy_fixture("missing_message_text.sarif", &dir.path().join("results/bad.sarif"));

    let tools = parse_tools("- {category: SAST, artifact_name: bad.sarif, format: SARIF}").unwrap();
    let assessment = release::assess(&tools, dir.path(), &cfg.release);

    assert!(!assessment.is_ready());
    assert_eq!(assessment.artifacts[0].status, ArtifactStatus::Invalid);
    assert!(assessment.violations[0].contains("Run 0, Result 0: message.text is required"));
}

#[test]
fn cli_context_satisfies_release_gate() {
    let env = StaticEnv::new().with_cwd("/work/my-project");
    let mut cfg = release_config(&env);
    assert_eq!(cfg.ci.platform, RuntimePlatform::Cli);

    // the CLI provider synthesizes a run id and repository
    assert!(cfg.validate_release_readiness().is_ok());

    cfg.release.release_branch.clear();
    let err = cfg.validate_release_readiness().unwrap_err();
    assert_eq!(
        err.to_string(),
        "release branch is required for release readiness assessment"
    );
}

#[test]
fn release_gate_passes_from_root_or_missing_cwd() {
    for env in [StaticEnv::new().with_cwd("/"), StaticEnv::new()] {
        let mut cfg = release_config(&env);
        assert!(!cfg.ci.repository.is_empty());
        assert!(cfg.validate_release_readiness().is_ok());
    }
}
