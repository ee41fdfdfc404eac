use std::fs;
use std::path::Path;

use sessionize_lib::cli::Cli;
use sessionize_lib::commands::sessionize;
use sessionize_lib::config::INACTIVITY_FILE_NAME;
use clap::Parser;
use tempfile::TempDir;

const HEADER: &str =
    "ip,date,time,zone,cik,accession,extention,code,size,idx,norefer,noagent,find,crawler,browser";

fn write_input(dir: &Path, rows: &[&str], inactivity: &str) {
    let mut log = String::from(HEADER);
    for row in rows {
        log.push('\n');
        log.push_str(row);
    }
    log.push('\n');
    fs::write(dir.join("log.csv"), log).unwrap();
    fs::write(dir.join(INACTIVITY_FILE_NAME), inactivity).unwrap();
}

fn cli(dir: &Path, extra: &[&str]) -> Cli {
    let input = dir.join("log.csv");
    let output = dir.join("output").join("sessionization.txt");
    let mut args = vec![
        "sessionize".to_string(),
        input.display().to_string(),
        output.display().to_string(),
    ];
    args.extend(extra.iter().map(|s| s.to_string()));
    Cli::try_parse_from(args).unwrap()
}

fn output(dir: &Path) -> String {
    fs::read_to_string(dir.join("output").join("sessionization.txt")).unwrap()
}

#[test]
fn sessionizes_log_with_inactivity_file() {
    let dir = TempDir::new().unwrap();
    write_input(
        dir.path(),
        &[
            "101.81.133.jja,2017-06-30,00:00:00,0.0,1608552.0,0001047469-17-004337,-index.htm,200.0,80251.0,1.0,0.0,0.0,9.0,0.0,",
            "107.23.85.jfd,2017-06-30,00:00:00,0.0,1027281.0,0000898430-02-001167,-index.htm,200.0,2825.0,1.0,0.0,0.0,10.0,0.0,",
            "107.23.85.jfd,2017-06-30,00:00:01,0.0,841535.0,0000841535-98-000002,-index.html,200.0,2699.0,1.0,0.0,0.0,10.0,0.0,",
            "108.91.91.hbc,2017-06-30,00:00:05,0.0,1295391.0,0001209784-17-000052,.txt,200.0,18614.0,0.0,0.0,0.0,10.0,0.0,",
        ],
        "2\n",
    );

    let config = cli(dir.path(), &[]).into_config().unwrap();
    let summary = sessionize(&config).unwrap();

    assert_eq!(summary.events, 4);
    assert_eq!(summary.sessions, 3);
    assert_eq!(
        output(dir.path()),
        "\
101.81.133.jja,2017-06-30 00:00:00,2017-06-30 00:00:00,1,1
107.23.85.jfd,2017-06-30 00:00:00,2017-06-30 00:00:01,2,2
108.91.91.hbc,2017-06-30 00:00:05,2017-06-30 00:00:05,1,1
"
    );
}

#[test]
fn long_session_keeps_later_starts_behind_it() {
    let dir = TempDir::new().unwrap();
    write_input(
        dir.path(),
        &[
            "y,2017-06-30,00:00:00",
            "x,2017-06-30,00:00:01",
            "y,2017-06-30,00:00:02",
            "y,2017-06-30,00:00:03",
        ],
        "1",
    );

    sessionize(&cli(dir.path(), &[]).into_config().unwrap()).unwrap();
    let global: Vec<String> = output(dir.path()).lines().map(|l| l[..1].to_string()).collect();
    assert_eq!(global, vec!["y", "x"]);

    sessionize(&cli(dir.path(), &["--output-order", "per-batch"]).into_config().unwrap()).unwrap();
    let per_batch: Vec<String> = output(dir.path()).lines().map(|l| l[..1].to_string()).collect();
    assert_eq!(per_batch, vec!["x", "y"]);
}

#[test]
fn skips_or_rejects_malformed_rows() {
    let dir = TempDir::new().unwrap();
    write_input(
        dir.path(),
        &["a,2017-06-30,00:00:00", "b,2017-06-30,bad", "c,2017-06-30,00:00:01"],
        "2",
    );

    let summary = sessionize(&cli(dir.path(), &[]).into_config().unwrap()).unwrap();
    assert_eq!(summary.skipped_rows, 1);
    assert_eq!(summary.sessions, 2);

    let err = sessionize(&cli(dir.path(), &["--strict"]).into_config().unwrap()).unwrap_err();
    assert!(format!("{:#}", err).contains("line 3"));
}

#[test]
fn json_output_and_explicit_threshold() {
    let dir = TempDir::new().unwrap();
    write_input(dir.path(), &["a,2017-06-30,00:00:00", "a,2017-06-30,00:00:09"], "2");

    let config = cli(dir.path(), &["--inactivity", "10", "--format", "json"])
        .into_config()
        .unwrap();
    sessionize(&config).unwrap();

    let out = output(dir.path());
    let lines: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["duration"], 10);
    assert_eq!(lines[0]["event_count"], 2);
}

#[test]
fn fractional_inactivity_period_is_floored() {
    let dir = TempDir::new().unwrap();
    write_input(
        dir.path(),
        &["a,2017-06-30,00:00:00", "b,2017-06-30,00:00:02", "b,2017-06-30,00:00:03"],
        "2.5\n",
    );

    let config = cli(dir.path(), &[]).into_config().unwrap();
    assert_eq!(config.inactivity_threshold, 2);

    let summary = sessionize(&config).unwrap();
    assert_eq!(summary.sessions, 2);
    assert_eq!(
        output(dir.path()),
        "\
a,2017-06-30 00:00:00,2017-06-30 00:00:00,1,1
b,2017-06-30 00:00:02,2017-06-30 00:00:03,2,2
"
    );
}

#[test]
fn missing_inactivity_period_fails_before_reading() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("log.csv"), format!("{}\n", HEADER)).unwrap();

    assert!(cli(dir.path(), &[]).into_config().is_err());
    assert!(!dir.path().join("output").exists());
}
