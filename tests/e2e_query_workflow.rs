//! End-to-End Test Suite: Question to Filtered Measurements
//!
//! Drives the `floatchat` command surface the way a user would: parse the
//! command line, load layered configuration, interpret the question through the
//! language model (or the keyword fallback) and filter the dataset.

use std::io::Write;

use clap::Parser;
use floatchat_cli::commands::QueryCommand;
use floatchat_cli::output::OutputStyle;
use floatchat_cli::{AppContext, Cli, CliError, CommandRouter, Commands};
use mockito::Matcher;
use serde_json::json;
use tempfile::{NamedTempFile, TempDir};

const DATASET: &str = "\
float_id,date,latitude,longitude,pressure,temperature,salinity
2902115,2010-02-11,15.2,61.8,5.0,27.3,36.1
2902115,2012-08-01,16.0,63.1,300.0,14.2,35.9
1901234,2013-04-02,-4.1,55.2,12.0,28.4,35.1
1901234,2013-05-02,-5.0,56.0,800.0,6.1,34.8
";

fn write_dataset(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("master_dataset.csv");
    std::fs::write(&path, DATASET).expect("Failed to write dataset");
    path
}

fn write_config(dir: &TempDir, body: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile_in(dir.path())
        .expect("Failed to create config file");
    file.write_all(body.as_bytes()).expect("Failed to write config");
    file
}

fn context_from_args(args: &[&str]) -> (Cli, AppContext) {
    let cli = Cli::try_parse_from(args).expect("Arguments should parse");
    let context = AppContext::load(&cli).expect("Configuration should load");
    (cli, context)
}

/// Model-backed workflow: the language model names a place outside the region
/// table, the geocoder resolves it and the pipeline keeps the nearby profiles.
#[tokio::test]
async fn test_model_and_geocoder_workflow() {
    let mut ollama = mockito::Server::new_async().await;
    let mut nominatim = mockito::Server::new_async().await;

    let _probe = ollama
        .mock("POST", "/api/generate")
        .match_body(Matcher::PartialJson(json!({ "prompt": "Test" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"model":"gemma2:2b","response":"ok","done":true}"#)
        .create_async()
        .await;

    let extract = ollama
        .mock("POST", "/api/generate")
        .match_body(Matcher::Regex("Analyze this oceanographic data query".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "model": "gemma2:2b",
                "response": "Parameter: temperature\nLocation: Seychelles\nDate: none\nDate_range: none\nDepth_range: [0,100]",
                "done": true
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let search = nominatim
        .mock("GET", "/search")
        .match_query(Matcher::UrlEncoded("q".into(), "seychelles".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"lat":"-4.6574977","lon":"55.4540146","display_name":"Seychelles"}]"#)
        .expect(1)
        .create_async()
        .await;

    let dir = TempDir::new().expect("Failed to create temp directory");
    let dataset = write_dataset(&dir);
    let config = write_config(
        &dir,
        &format!(
            "[dataset]\npath = {:?}\n\n[ollama]\nbase_url = {:?}\nrequest_timeout_secs = 2\nprobe_timeout_secs = 2\n\n[geocoder]\nbase_url = {:?}\ntimeout_secs = 2\n",
            dataset.to_string_lossy(),
            ollama.url(),
            nominatim.url()
        ),
    );
    let config_path = config.path().to_string_lossy().to_string();

    let (cli, context) = context_from_args(&[
        "floatchat",
        "--config",
        &config_path,
        "query",
        "how",
        "warm",
        "is",
        "the",
        "water",
        "off",
        "the",
        "seychelles",
        "--format",
        "json",
    ]);
    assert!(!cli.offline);
    assert_eq!(context.config.ollama.base_url, ollama.url());

    let (text, format, limit) = match cli.command {
        Commands::Query {
            text,
            format,
            limit,
        } => (text.join(" "), format, limit),
        other => panic!("Expected query command, got {:?}", other),
    };
    let command = QueryCommand::new(context, text, format, limit);
    let response = command.run().await.expect("Query should run");

    let report: serde_json::Value =
        serde_json::from_str(&command.render(&response, &OutputStyle::plain()).unwrap()).unwrap();
    assert_eq!(report["interpretation"]["strategy"], "model");
    assert_eq!(report["interpretation"]["descriptor"]["location"], "seychelles");
    assert_eq!(report["status"], "available");
    // Only the shallow Seychelles profile survives location and depth
    assert_eq!(report["matched"], 1);
    assert_eq!(report["records"][0]["float_id"], "1901234");
    assert_eq!(report["statistics"]["count"], 1);

    extract.assert_async().await;
    search.assert_async().await;
}

/// Offline workflow: keyword extraction and the built-in region table only.
#[tokio::test]
async fn test_offline_keyword_workflow() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let dataset = write_dataset(&dir);
    let config = write_config(&dir, "[pipeline]\nresult_cap = 1\n");
    let config_path = config.path().to_string_lossy().to_string();
    let data_path = dataset.to_string_lossy().to_string();

    let (_, context) = context_from_args(&[
        "floatchat",
        "--offline",
        "--config",
        &config_path,
        "--data",
        &data_path,
        "query",
        "temperature",
    ]);
    assert!(context.offline);
    assert_eq!(context.config.dataset.path, dataset);

    let command = QueryCommand::new(
        context,
        "temperature in the arabian sea".to_string(),
        floatchat_cli::OutputFormat::Table,
        20,
    );
    let response = command.run().await.expect("Query should run");
    let text = command.render(&response, &OutputStyle::plain()).unwrap();

    assert!(text.contains("Found 2 records"));
    assert!(text.contains("Showing the 1 most recent of 2 matching records"));
    assert!(text.contains("2012-08-01"));
    assert!(!text.contains("2010-02-11"));
}

#[tokio::test]
async fn test_router_reports_missing_dataset() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let config = write_config(&dir, "");
    let config_path = config.path().to_string_lossy().to_string();
    let missing = dir.path().join("absent.csv");
    let missing_path = missing.to_string_lossy().to_string();

    let cli = Cli::try_parse_from([
        "floatchat",
        "--offline",
        "--quiet",
        "--config",
        config_path.as_str(),
        "--data",
        missing_path.as_str(),
        "query",
        "salinity",
    ])
    .unwrap();

    match CommandRouter::execute(cli).await {
        Err(CliError::DatasetUnavailable { path }) => assert_eq!(path, missing),
        other => panic!("Expected DatasetUnavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_router_runs_informational_commands() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let dataset = write_dataset(&dir);
    let config = write_config(&dir, "[logging]\nlevel = \"error\"\n");
    let config_path = config.path().to_string_lossy().to_string();
    let data_path = dataset.to_string_lossy().to_string();

    for command in [
        vec!["interpret", "pressure", "between", "100-500", "m"],
        vec!["summary", "--json"],
        vec!["status"],
        vec!["config"],
    ] {
        let mut args: Vec<&str> = vec![
            "floatchat",
            "--offline",
            "--config",
            config_path.as_str(),
            "--data",
            data_path.as_str(),
        ];
        args.extend(command.iter().copied());
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(
            CommandRouter::execute(cli).await.is_ok(),
            "Command {:?} should succeed",
            command
        );
    }
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let config = write_config(&dir, "[pipeline]\nresult_cap = 0\n");
    let config_path = config.path().to_string_lossy().to_string();

    let cli = Cli::try_parse_from(["floatchat", "--config", config_path.as_str(), "config"]).unwrap();
    match AppContext::load(&cli) {
        Err(CliError::Config(msg)) => assert!(msg.contains("Result cap")),
        other => panic!("Expected Config error, got {:?}", other.map(|_| ())),
    }
}
