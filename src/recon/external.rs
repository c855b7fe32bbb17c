//! External scanning tools (`nmap`, `gobuster`).
//!
//! Commands are built as argument vectors and spawned directly; nothing
//! passes through a shell, so targets cannot inject extra commands.

use crate::error::ToolError;
use async_trait::async_trait;
use std::fmt;
use std::io;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `nmap` with default scripts and version detection; `fast` limits it
    /// to the top ports instead of all 65535.
    pub fn nmap(target: &str, fast: bool) -> Self {
        let ports = if fast { "-F" } else { "-p-" };
        Self::new("nmap", [ports, "-sC", "-sV", target])
    }

    /// `gobuster dns` subdomain brute force.
    pub fn gobuster_dns(domain: &str, wordlist: &Path) -> Self {
        Self::new(
            "gobuster",
            [
                "dns".to_string(),
                "-d".to_string(),
                domain.to_string(),
                "-w".to_string(),
                wordlist.display().to_string(),
                "-q".to_string(),
            ],
        )
    }

    /// `gobuster dir` against `http://target`.
    pub fn gobuster_dir(target: &str, wordlist: &Path) -> Self {
        Self::new(
            "gobuster",
            [
                "dir".to_string(),
                "-u".to_string(),
                format!("http://{}", target),
                "-w".to_string(),
                wordlist.display().to_string(),
                "-q".to_string(),
            ],
        )
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs tool commands and returns their standard output.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, command: &ToolCommand) -> Result<String, ToolError>;
}

/// Runner that spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTools;

#[async_trait]
impl ToolRunner for SystemTools {
    async fn run(&self, command: &ToolCommand) -> Result<String, ToolError> {
        run_tool(command).await
    }
}

/// Spawn `command`, capture stdout and discard stderr.
///
/// A non-zero exit status yields empty output rather than an error; only a
/// missing or unspawnable binary fails.
pub async fn run_tool(command: &ToolCommand) -> Result<String, ToolError> {
    info!(command = %command, "running external tool");

    let output = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ToolError::NotFound(command.program.clone()),
            _ => ToolError::SpawnFailed {
                program: command.program.clone(),
                reason: e.to_string(),
            },
        })?;

    if !output.status.success() {
        debug!(program = %command.program, status = %output.status, "tool exited unsuccessfully");
        return Ok(String::new());
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Whether an nmap report shows a web service on 80 or 443.
pub fn web_detected(nmap_output: &str) -> bool {
    nmap_output.contains("80/tcp") || nmap_output.contains("443/tcp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nmap_arguments() {
        assert_eq!(
            ToolCommand::nmap("10.10.11.5", true).to_string(),
            "nmap -F -sC -sV 10.10.11.5"
        );
        assert_eq!(
            ToolCommand::nmap("box.htb", false).args,
            vec!["-p-", "-sC", "-sV", "box.htb"]
        );
    }

    #[test]
    fn test_gobuster_arguments() {
        let words = Path::new("wordlists/subdomains.txt");
        assert_eq!(
            ToolCommand::gobuster_dns("box.htb", words).to_string(),
            "gobuster dns -d box.htb -w wordlists/subdomains.txt -q"
        );
        assert_eq!(
            ToolCommand::gobuster_dir("box.htb", Path::new("wordlists/dirs.txt")).args[2],
            "http://box.htb"
        );
    }

    #[test]
    fn test_target_stays_one_argument() {
        let cmd = ToolCommand::nmap("box.htb; rm -rf /", true);
        assert_eq!(cmd.args.len(), 4);
        assert_eq!(cmd.args[3], "box.htb; rm -rf /");
    }

    #[test]
    fn test_web_detected() {
        assert!(web_detected("80/tcp   open  http    nginx 1.18.0"));
        assert!(web_detected("443/tcp  open  ssl/http"));
        assert!(!web_detected("22/tcp   open  ssh"));
        assert!(!web_detected(""));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_tool_captures_stdout() {
        let out = run_tool(&ToolCommand::new("echo", ["hello"])).await.unwrap();
        assert_eq!(out, "hello\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_tool_yields_empty_output() {
        let out = run_tool(&ToolCommand::new("false", Vec::<String>::new()))
            .await
            .unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_missing_tool() {
        let err = run_tool(&ToolCommand::new("ctf-recon-no-such-tool", ["-h"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(ref p) if p == "ctf-recon-no-such-tool"));
    }
}
