// End-to-end ingestion tests against the in-memory fixture host.

use stackscout_core::config::ScoutConfig;
use stackscout_core::fetch::RepoHost;
use stackscout_core::pipeline::OrgIngestor;
use stackscout_core::progress::NoopReporter;
use stackscout_core::report::ReportWriter;
use stackscout_core::types::Severity;
use stackscout_test::FixtureHost;

async fn ingest_single(host: &FixtureHost, config: &ScoutConfig) -> stackscout_core::types::RepositoryReport {
    let repos = host.list_org_repos("acme").await.expect("org exists");
    let ingestor = OrgIngestor::new(host, config);
    ingestor.ingest_repo(&repos[0]).await
}

#[tokio::test]
async fn empty_repo_yields_complete_empty_bundles_and_no_insights() {
    let host = FixtureHost::new("acme").with_repo("widgets");
    let config = ScoutConfig::default();

    let report = ingest_single(&host, &config).await;

    assert!(report.insights.is_empty());
    assert!(report.files.is_empty());
    let mining = report.comment_mining.data().expect("complete");
    assert_eq!(mining.prs_scanned, 0);
    assert!(!report.comment_mining.is_partial());
    assert!(!report.commit_patterns.is_unavailable());
    assert_eq!(report.metadata.full_name, "acme/widgets");
}

#[tokio::test]
async fn makefile_deploy_target_is_the_only_insight() {
    let host = FixtureHost::new("acme").with_repo("widgets").with_file(
        "widgets",
        "Makefile",
        "build:\n\tgo build ./...\n\ndeploy:\n\tssh prod ./release.sh\n",
    );
    let config = ScoutConfig::default();

    let report = ingest_single(&host, &config).await;

    assert_eq!(report.insights.len(), 1);
    let insight = &report.insights[0];
    assert_eq!(insight.category, "deployment");
    assert_eq!(insight.issue_code, "manual_deployment_detected");
    assert_eq!(insight.severity, Severity::Medium);

    let shadow = report.shadow_infrastructure.data().expect("complete");
    let build = shadow.build_file.as_ref().expect("makefile parsed");
    assert!(build.has_deploy_target);
    assert_eq!(build.targets.len(), 2);
}

#[tokio::test]
async fn env_red_flags_surface_with_variable_names() {
    let host = FixtureHost::new("acme").with_repo("widgets").with_file(
        "widgets",
        ".env.example",
        "# core settings\nAPI_SECRET_DONT_CHANGE=x\n",
    );
    let config = ScoutConfig::default();

    let report = ingest_single(&host, &config).await;

    let shadow = report.shadow_infrastructure.data().expect("complete");
    let env = shadow.env.as_ref().expect("env parsed");
    assert_eq!(env.red_flags, vec!["API_SECRET_DONT_CHANGE"]);

    let codes: Vec<&str> = report
        .insights
        .iter()
        .map(|i| i.issue_code.as_str())
        .collect();
    assert_eq!(codes, vec!["config_red_flags"]);
    assert_eq!(report.insights[0].severity, Severity::High);
    assert!(report.insights[0].description.contains("API_SECRET_DONT_CHANGE"));
}

#[tokio::test]
async fn pr_mining_stops_at_the_configured_cap() {
    let mut host = FixtureHost::new("acme").with_repo("widgets");
    for n in 1..=120 {
        host = host.with_pull("widgets", n, &format!("change {n}"), &["why does this work"]);
    }
    let config = ScoutConfig::default();

    let report = ingest_single(&host, &config).await;

    let mining = report.comment_mining.data().expect("complete");
    assert_eq!(mining.prs_scanned, 100);
    assert_eq!(mining.comments_scanned, 100);
    assert_eq!(mining.confusion.len(), 100);
}

#[tokio::test]
async fn comment_paging_failure_degrades_to_partial() {
    let mut host = FixtureHost::new("acme")
        .with_repo("widgets")
        .with_pull("widgets", 1, "change", &["this is a hack"]);
    host.fail_pull_comments = true;
    let config = ScoutConfig::default();

    let report = ingest_single(&host, &config).await;

    assert!(report.comment_mining.is_partial());
    let mining = report.comment_mining.data().expect("partial data");
    assert_eq!(mining.prs_scanned, 0);
}

#[tokio::test]
async fn revert_heavy_history_flags_stability() {
    let mut host = FixtureHost::new("acme").with_repo("widgets");
    for n in 0..9 {
        host = host.with_commit(
            "widgets",
            &format!("aaaaaaa{n}"),
            "routine maintenance work on the scheduler",
            Some("2024-06-07T10:00:00Z"),
        );
    }
    host = host.with_commit(
        "widgets",
        "bbbbbbb0",
        "Revert \"routine maintenance work on the scheduler\"",
        Some("2024-06-07T11:00:00Z"),
    );
    let config = ScoutConfig::default();

    let report = ingest_single(&host, &config).await;

    let stats = report.commit_patterns.data().expect("complete");
    assert_eq!(stats.total_commits, 10);
    assert_eq!(stats.reverts.len(), 1);

    let stability: Vec<_> = report
        .insights
        .iter()
        .filter(|i| i.issue_code == "high_revert_rate")
        .collect();
    assert_eq!(stability.len(), 1);
    assert_eq!(stability[0].severity, Severity::High);
}

#[tokio::test]
async fn fear_hits_above_threshold_raise_the_fear_insight() {
    let host = FixtureHost::new("acme")
        .with_repo("widgets")
        .with_search_hits(
            "widgets",
            "FRAGILE",
            &["a.py", "b.py", "c.py", "d.py", "e.py", "f.py"],
        );
    let config = ScoutConfig::default();

    let report = ingest_single(&host, &config).await;

    let fear = report.fear_signals.data().expect("complete");
    assert_eq!(fear.total_hits, 6);
    assert_eq!(fear.keywords_searched, 10);
    assert!(report
        .insights
        .iter()
        .any(|i| i.issue_code == "high_fear_signals" && i.severity == Severity::High));
}

#[tokio::test]
async fn hardcoded_endpoints_in_stack_files_are_counted() {
    let host = FixtureHost::new("acme").with_repo("widgets").with_file(
        "widgets",
        "Procfile",
        "web: curl https://boot.internal.example/api && ./serve 10.0.3.7\n",
    );
    let config = ScoutConfig::default();

    let report = ingest_single(&host, &config).await;

    assert!(report.files.contains_key("heroku"));
    let shadow = report.shadow_infrastructure.data().expect("complete");
    assert_eq!(shadow.hidden_deps.hardcoded_urls, 1);
    assert_eq!(shadow.hidden_deps.hardcoded_ips, 1);
    assert_eq!(shadow.hidden_deps.total, 2);
    assert!(report
        .insights
        .iter()
        .any(|i| i.issue_code == "hardcoded_dependencies"));
}

#[tokio::test]
async fn endpoint_findings_survive_a_failed_shadow_scan() {
    // Every artifact the shadow scan fetches fails, but the critical files
    // still arrive and carry a hardcoded endpoint.
    let host = FixtureHost::new("acme")
        .with_repo("widgets")
        .with_file(
            "widgets",
            "Procfile",
            "web: ./serve https://boot.internal.example/api\n",
        )
        .with_failing_path("Makefile")
        .with_failing_path("package.json")
        .with_failing_path(".env.example")
        .with_failing_path("")
        .with_failing_path("scripts")
        .with_failing_path("docker-compose.yml")
        .with_failing_path("docker-compose.yaml")
        .with_failing_path("compose.yml")
        .with_failing_path("compose.yaml");
    let config = ScoutConfig::default();

    let report = ingest_single(&host, &config).await;

    assert!(report.shadow_infrastructure.is_partial());
    let shadow = report.shadow_infrastructure.data().expect("partial data");
    assert!(shadow.build_file.is_none());
    assert!(shadow.env.is_none());
    assert_eq!(shadow.hidden_deps.total, 1);

    let codes: Vec<&str> = report
        .insights
        .iter()
        .map(|i| i.issue_code.as_str())
        .collect();
    assert_eq!(codes, vec!["hardcoded_dependencies"]);
}

#[tokio::test]
async fn single_shadow_fetch_failure_keeps_partial_results() {
    let host = FixtureHost::new("acme")
        .with_repo("widgets")
        .with_file("widgets", ".env.example", "DATABASE_URL=postgres://db/dev\n")
        .with_failing_path("Makefile");
    let config = ScoutConfig::default();

    let report = ingest_single(&host, &config).await;

    assert!(report.shadow_infrastructure.is_partial());
    let shadow = report.shadow_infrastructure.data().expect("partial data");
    assert!(shadow.build_file.is_none());
    let env = shadow.env.as_ref().expect("env still parsed");
    assert_eq!(env.variables, vec!["DATABASE_URL"]);
}

#[tokio::test]
async fn failed_code_search_degrades_fear_to_unavailable() {
    let mut host = FixtureHost::new("acme")
        .with_repo("widgets")
        .with_search_hits(
            "widgets",
            "FRAGILE",
            &["a.py", "b.py", "c.py", "d.py", "e.py", "f.py"],
        );
    host.fail_search = true;
    let config = ScoutConfig::default();

    let report = ingest_single(&host, &config).await;

    assert!(report.fear_signals.is_unavailable());
    assert!(report.insights.is_empty());
}

#[tokio::test]
async fn org_listing_failure_aborts_without_output() {
    let mut host = FixtureHost::new("acme").with_repo("widgets");
    host.fail_org_listing = true;
    let config = ScoutConfig::default();
    let dir = tempfile::tempdir().unwrap();
    let writer = ReportWriter::new(dir.path().join("out")).unwrap();

    let ingestor = OrgIngestor::new(&host, &config);
    let result = ingestor.ingest_org("acme", &writer, &NoopReporter).await;

    assert!(result.is_err());
    assert!(!dir.path().join("out").join("summary.json").exists());
}

#[tokio::test]
async fn summary_lists_each_ingested_repository() {
    let host = FixtureHost::new("acme")
        .with_repo("widgets")
        .with_repo("gadgets")
        .with_file("widgets", "Makefile", "deploy:\n\tscp app prod:/srv\n");
    let config = ScoutConfig::default();
    let dir = tempfile::tempdir().unwrap();
    let writer = ReportWriter::new(dir.path()).unwrap();

    let ingestor = OrgIngestor::new(&host, &config);
    let summary = ingestor
        .ingest_org("acme", &writer, &NoopReporter)
        .await
        .expect("ingestion succeeds");

    assert_eq!(summary.org, "acme");
    assert_eq!(summary.repos_ingested, 2);
    assert_eq!(summary.repos, vec!["widgets", "gadgets"]);

    for name in ["widgets", "gadgets", "summary"] {
        assert!(dir.path().join(format!("{name}.json")).exists());
    }

    let raw = std::fs::read_to_string(dir.path().join("widgets.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed["metadata"]["name"], "widgets");
    assert_eq!(
        parsed["insights"][0]["issue_code"],
        "manual_deployment_detected"
    );
    assert_eq!(parsed["shadow_infrastructure"]["status"], "complete");
}
