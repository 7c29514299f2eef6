use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn mentor_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("mentor");
    path
}

/// Build a config pointing at a fresh persist directory, using the
/// deterministic hash provider so everything runs offline.
fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[persist]
dir = "{}/kb"

[embedding]
provider = "hash"
dims = 128

[retrieval]
tip_results = 5
example_results = 4
"#,
        root.display()
    );

    let config_path = config_dir.join("mentor.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_mentor(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = mentor_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run mentor binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_init_seeds_knowledge_base() {
    let (_tmp, config) = setup_test_env();

    let (stdout, stderr, ok) = run_mentor(&config, &["init"]);
    assert!(ok, "init failed: {stderr}");
    assert!(stdout.contains("Status:     available"), "stdout: {stdout}");
    assert!(stdout.contains("Documents:  54"), "stdout: {stdout}");
    assert!(stdout.contains("Dimension:  128"), "stdout: {stdout}");

    // Idempotent: a second init loads the snapshot instead of reseeding.
    let (stdout, _, ok) = run_mentor(&config, &["init"]);
    assert!(ok);
    assert!(stdout.contains("Documents:  54"));
}

#[test]
fn test_stats_json_idempotent() {
    let (_tmp, config) = setup_test_env();
    run_mentor(&config, &["init"]);

    let (first, _, ok) = run_mentor(&config, &["stats", "--json"]);
    assert!(ok);
    let (second, _, _) = run_mentor(&config, &["stats", "--json"]);
    assert_eq!(first, second);

    let stats: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(stats["status"], "available");
    assert_eq!(stats["count"], 54);
    assert_eq!(stats["dimension"], 128);
}

#[test]
fn test_search_filters_and_ordering() {
    let (_tmp, config) = setup_test_env();
    run_mentor(&config, &["init"]);

    let (stdout, stderr, ok) = run_mentor(
        &config,
        &[
            "search",
            "leadership",
            "--role",
            "product manager",
            "--content-type",
            "career_tip",
            "--limit",
            "3",
            "--json",
        ],
    );
    assert!(ok, "search failed: {stderr}");

    let hits: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let hits = hits.as_array().unwrap();
    assert!(!hits.is_empty());
    assert!(hits.len() <= 3);

    let mut last_score = f64::INFINITY;
    for hit in hits {
        assert_eq!(hit["metadata"]["job_role"], "product_manager");
        assert_eq!(hit["metadata"]["content_type"], "career_tip");
        let score = hit["score"].as_f64().unwrap();
        assert!((-1.0..=1.0).contains(&score), "score out of bounds: {score}");
        assert!(score <= last_score, "results not in descending order");
        last_score = score;
    }
}

#[test]
fn test_add_then_duplicate_rejected() {
    let (_tmp, config) = setup_test_env();
    run_mentor(&config, &["init"]);

    let content = "Volunteer for internal hackathons to demonstrate initiative";
    let (stdout, _, ok) = run_mentor(
        &config,
        &[
            "add",
            content,
            "--role",
            "frontend developer",
            "--content-type",
            "career_tip",
        ],
    );
    assert!(ok);
    assert!(stdout.contains("Added career_tip for frontend_developer"), "stdout: {stdout}");

    // Exact duplicate: rejected, count unchanged.
    let (stdout, _, ok) = run_mentor(
        &config,
        &[
            "add",
            content,
            "--role",
            "frontend developer",
            "--content-type",
            "career_tip",
        ],
    );
    assert!(ok);
    assert!(stdout.contains("Rejected"), "stdout: {stdout}");

    let (stats, _, _) = run_mentor(&config, &["stats", "--json"]);
    let stats: serde_json::Value = serde_json::from_str(&stats).unwrap();
    assert_eq!(stats["count"], 55);
}

#[test]
fn test_added_content_survives_restart() {
    let (_tmp, config) = setup_test_env();
    run_mentor(&config, &["init"]);

    run_mentor(
        &config,
        &[
            "add",
            "Shipped cross-platform design tokens adopted by four product squads",
            "--role",
            "ux designer",
            "--content-type",
            "resume_example",
        ],
    );

    // A fresh process loads the snapshot and finds the new entry.
    let (stdout, _, ok) = run_mentor(
        &config,
        &[
            "search",
            "design tokens product squads",
            "--role",
            "ux designer",
            "--content-type",
            "resume_example",
            "--limit",
            "1",
            "--json",
        ],
    );
    assert!(ok);
    let hits: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert!(hits[0]["document"]
        .as_str()
        .unwrap()
        .contains("design tokens"));
    assert_eq!(hits[0]["metadata"]["source"], "user_added");
}

#[test]
fn test_search_results_stable_across_runs() {
    let (_tmp, config) = setup_test_env();
    run_mentor(&config, &["init"]);

    let args = ["search", "quantify impact metrics", "--limit", "5", "--json"];
    let (first, _, _) = run_mentor(&config, &args);
    let (second, _, _) = run_mentor(&config, &args);
    assert_eq!(first, second);
}

#[test]
fn test_dims_change_reseeds_snapshot() {
    let (tmp, config) = setup_test_env();
    run_mentor(&config, &["init"]);

    // Reconfigure the embedding dimension against the same persist dir.
    let new_config = format!(
        r#"[persist]
dir = "{}/kb"

[embedding]
provider = "hash"
dims = 256
"#,
        tmp.path().display()
    );
    fs::write(&config, new_config).unwrap();

    // The stale snapshot is rejected and the corpus reseeded at the new
    // dimension, so the engine stays fully usable.
    let (stdout, _, ok) = run_mentor(&config, &["stats", "--json"]);
    assert!(ok);
    let stats: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(stats["status"], "available");
    assert_eq!(stats["count"], 54);
    assert_eq!(stats["dimension"], 256);

    let (stdout, _, ok) = run_mentor(
        &config,
        &["search", "quantify impact metrics", "--limit", "3", "--json"],
    );
    assert!(ok);
    let hits: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(hits
        .as_array()
        .unwrap()
        .iter()
        .any(|h| h["score"].as_f64().unwrap() > 0.0));

    let (stdout, _, ok) = run_mentor(
        &config,
        &[
            "add",
            "Automated the release checklist for the platform team",
            "--role",
            "backend developer",
            "--content-type",
            "career_tip",
        ],
    );
    assert!(ok);
    assert!(stdout.contains("Added"), "stdout: {stdout}");
}

#[test]
fn test_knowledge_command_splits_results() {
    let (_tmp, config) = setup_test_env();
    run_mentor(&config, &["init"]);

    let (stdout, _, ok) = run_mentor(
        &config,
        &["knowledge", "quantify impact metrics", "--json"],
    );
    assert!(ok);
    let result: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(result["search_method"], "vector_database");
    let tips = result["career_tips"].as_array().unwrap();
    let examples = result["resume_examples"].as_array().unwrap();
    assert!(tips.len() <= 5 && examples.len() <= 5);
    assert!(!tips.is_empty() || !examples.is_empty());
    assert_eq!(tips.len(), result["tip_scores"].as_array().unwrap().len());
}

#[test]
fn test_knowledge_command_falls_back_when_degraded() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("mentor.toml");
    fs::write(
        &config_path,
        format!(
            r#"[persist]
dir = "{}/kb"
"#,
            tmp.path().display()
        ),
    )
    .unwrap();

    let (stdout, _, ok) = run_mentor(
        &config_path,
        &["knowledge", "anything", "--role", "product manager", "--json"],
    );
    assert!(ok);
    let result: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(result["search_method"], "fallback_dictionary");
    assert!(!result["career_tips"].as_array().unwrap().is_empty());
    assert!(result["tip_scores"].as_array().unwrap().is_empty());
}

#[test]
fn test_disabled_provider_reports_unavailable() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("mentor.toml");
    fs::write(
        &config_path,
        format!(
            r#"[persist]
dir = "{}/kb"
"#,
            tmp.path().display()
        ),
    )
    .unwrap();

    let (stdout, _, ok) = run_mentor(&config_path, &["stats", "--json"]);
    assert!(ok);
    let stats: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(stats["status"], "unavailable");
    assert_eq!(stats["count"], 0);

    // Search never fails the caller, it just has nothing to say.
    let (stdout, _, ok) = run_mentor(&config_path, &["search", "anything"]);
    assert!(ok);
    assert!(stdout.contains("No results."));

    let (stdout, _, ok) = run_mentor(
        &config_path,
        &[
            "add",
            "some tip",
            "--role",
            "backend developer",
            "--content-type",
            "career_tip",
        ],
    );
    assert!(ok);
    assert!(stdout.contains("unavailable"), "stdout: {stdout}");
}

#[test]
fn test_roles_lists_requirements() {
    let (_tmp, config) = setup_test_env();

    let (stdout, _, ok) = run_mentor(&config, &["roles"]);
    assert!(ok);
    assert!(stdout.contains("Data Scientist"));
    assert!(stdout.contains("Machine Learning"));
    assert!(stdout.contains("UX Designer"));
}

#[test]
fn test_advise_falls_back_without_api_key() {
    let (_tmp, config) = setup_test_env();
    run_mentor(&config, &["init"]);

    let binary = mentor_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config.to_str().unwrap())
        .args([
            "advise",
            "--name",
            "Jordan Lee",
            "--role",
            "data scientist",
            "--skills",
            "Python,SQL",
        ])
        .env_remove("GEMINI_API_KEY")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Candidate:   Jordan Lee"));
    assert!(stdout.contains("resumeBullets"), "stdout: {stdout}");
    assert!(stdout.contains("Skill gaps to close:"), "stdout: {stdout}");

    // The plan JSON is embedded in the output and parses.
    let start = stdout.find('{').unwrap();
    let end = stdout.rfind('}').unwrap();
    let _slice = &stdout[start..=end];
}
