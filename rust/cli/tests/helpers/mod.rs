//! Shared harness for the CLI integration tests.
//!
//! `CliRunner` runs the built `kalooki` binary inside its own temporary
//! directory, so tests can pipe stdin and set environment variables without
//! touching the test process.
//!
//! ```ignore
//! let cli = CliRunner::new();
//! let out = cli.path("hands.jsonl");
//! let res = cli.run(&["sim", "--hands", "1", "--output", &out]);
//! assert_eq!(res.exit_code, 0);
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

#[derive(Debug)]
pub struct CliRunner {
    binary: PathBuf,
    temp_dir: tempfile::TempDir,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct CliResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[allow(dead_code)]
impl CliRunner {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from(env!("CARGO_BIN_EXE_kalooki")),
            temp_dir: tempfile::tempdir().expect("temp dir"),
        }
    }

    /// A path inside this runner's temporary directory.
    pub fn path(&self, name: &str) -> String {
        self.temp_dir.path().join(name).to_string_lossy().into_owned()
    }

    pub fn run(&self, args: &[&str]) -> CliResult {
        self.run_inner(args, &[], None)
    }

    pub fn run_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> CliResult {
        self.run_inner(args, env, None)
    }

    pub fn run_with_input(&self, args: &[&str], input: &str) -> CliResult {
        self.run_inner(args, &[], Some(input))
    }

    fn run_inner(&self, args: &[&str], env: &[(&str, &str)], input: Option<&str>) -> CliResult {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .current_dir(self.temp_dir.path())
            .env_remove("KALOOKI_CONFIG")
            .env_remove("KALOOKI_SEED")
            .env_remove("KALOOKI_DIFFICULTY")
            .env_remove("KALOOKI_OPENING_THRESHOLD")
            .env_remove("KALOOKI_BOTS_EXEMPT")
            .env_remove("KALOOKI_SIM_BREAK_AFTER")
            .env_remove("RUST_LOG")
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in env {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().expect("failed to spawn CLI binary");
        if let Some(payload) = input
            && let Some(mut stdin) = child.stdin.take()
        {
            let _ = stdin.write_all(payload.as_bytes());
        }
        let output = child.wait_with_output().expect("failed to read output");
        CliResult {
            exit_code: output.status.code().unwrap_or(1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}
