mod helpers;

use helpers::CliRunner;

fn cfg_json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("cfg prints JSON")
}

#[test]
fn defaults_are_reported() {
    let cli = CliRunner::new();
    let res = cli.run(&["cfg"]);
    assert_eq!(res.exit_code, 0, "{}", res.stderr);
    let json = cfg_json(&res.stdout);
    assert_eq!(json["opening_threshold"]["value"], 40);
    assert_eq!(json["opening_threshold"]["source"], "default");
    assert_eq!(json["seed"]["value"], serde_json::Value::Null);
}

#[test]
fn environment_overrides_the_file() {
    let cli = CliRunner::new();
    let path = cli.path("kalooki.toml");
    std::fs::write(
        &path,
        "seed = 5\ndifficulty = \"easy\"\nopening_threshold = 51\n",
    )
    .unwrap();

    let res = cli.run_with_env(
        &["cfg"],
        &[("KALOOKI_CONFIG", path.as_str()), ("KALOOKI_SEED", "12")],
    );
    assert_eq!(res.exit_code, 0, "{}", res.stderr);
    let json = cfg_json(&res.stdout);
    assert_eq!(json["seed"]["value"], 12);
    assert_eq!(json["seed"]["source"], "env");
    assert_eq!(json["difficulty"]["value"], "easy");
    assert_eq!(json["difficulty"]["source"], "file");
    assert_eq!(json["opening_threshold"]["value"], 51);
    assert_eq!(json["bots_exempt"]["source"], "default");
}

#[test]
fn malformed_file_exits_two() {
    let cli = CliRunner::new();
    let path = cli.path("broken.toml");
    std::fs::write(&path, "seed = [not toml").unwrap();
    let res = cli.run_with_env(&["cfg"], &[("KALOOKI_CONFIG", path.as_str())]);
    assert_eq!(res.exit_code, 2);
    assert!(res.stderr.contains("Invalid configuration"));
}

#[test]
fn unknown_difficulty_exits_two() {
    let cli = CliRunner::new();
    let res = cli.run_with_env(&["cfg"], &[("KALOOKI_DIFFICULTY", "expert")]);
    assert_eq!(res.exit_code, 2);
}

#[test]
fn configured_threshold_reaches_the_table() {
    let cli = CliRunner::new();
    let out = cli.path("h.jsonl");
    let res = cli.run_with_env(
        &["sim", "--hands", "1", "--seed", "3", "--output", &out],
        &[("KALOOKI_OPENING_THRESHOLD", "60")],
    );
    assert_eq!(res.exit_code, 0, "{}", res.stderr);
    let line = std::fs::read_to_string(&out).unwrap();
    let v: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(v["rules"]["opening_threshold"], 60);
}
