//! Shell command execution with interactive session support.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use toolbelt_domain::{CommandConfig, CommandOutput, ProcessInfo, ProcessStatus, ToolError};

/// Poll interval of the observation loop.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Output must stay unchanged this long before a trailing prompt is
/// considered an input request.
const PROMPT_IDLE: Duration = Duration::from_millis(500);

/// Trailing-output shapes that indicate a process is blocked on a prompt.
const PROMPT_REGEX: &str = r"(?i)([?:>$#]|\(y/n\)|\[y/n\]|password[^\n]*)\s*$";

/// A spawned process kept alive across calls because it asked for input.
struct TrackedProcess {
    child: Child,
    stdin: ChildStdin,
    command: String,
    stdout: Arc<Mutex<String>>,
    stderr: Arc<Mutex<String>>,
    _readers: Vec<JoinHandle<()>>,
}

/// Executes shell commands under an allow-list policy.
///
/// One-shot commands run to completion. Commands that block on a prompt —
/// detected heuristically from the trailing output once it goes idle —
/// are parked in a pid map and resumed via [`send_input`](Self::send_input).
///
/// No timeout is imposed here: a command that neither exits nor prompts
/// blocks its caller until it does. Callers enforce deadlines externally.
pub struct CommandService {
    shell: String,
    allowed: Vec<Regex>,
    prompt_pattern: Regex,
    processes: Mutex<HashMap<u32, TrackedProcess>>,
}

impl CommandService {
    pub fn new(config: &CommandConfig) -> Result<Self, ToolError> {
        let mut allowed = Vec::with_capacity(config.allowed_commands.len());
        for rule in &config.allowed_commands {
            allowed.push(compile_pattern(&rule.pattern)?);
        }

        let prompt_pattern = Regex::new(PROMPT_REGEX)
            .map_err(|e| ToolError::validation(format!("Invalid prompt pattern: {e}")))?;

        Ok(Self {
            shell: config.shell.clone(),
            allowed,
            prompt_pattern,
            processes: Mutex::new(HashMap::new()),
        })
    }

    /// Start a new command in `cwd` and observe it until it exits or
    /// blocks on a prompt. The allow-list is checked before any spawn.
    pub async fn execute_command(
        &self,
        command: &str,
        cwd: &str,
    ) -> Result<CommandOutput, ToolError> {
        self.check_policy(command)?;

        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .current_dir(cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Linux: have the kernel SIGTERM the child if this process dies,
        // covering exits where Drop never runs (SIGKILL, OOM kill).
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| ToolError::io(format!("Failed to spawn command: {e}")))?;

        let pid = child.id().unwrap_or_default();
        debug!(pid, command, "command spawned");

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ToolError::io("Failed to capture stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ToolError::io("Failed to capture stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ToolError::io("Failed to capture stderr".to_string()))?;

        let stdout_buf = Arc::new(Mutex::new(String::new()));
        let stderr_buf = Arc::new(Mutex::new(String::new()));
        let readers = vec![
            spawn_reader(stdout, Arc::clone(&stdout_buf)),
            spawn_reader(stderr, Arc::clone(&stderr_buf)),
        ];

        let mut tracked = TrackedProcess {
            child,
            stdin,
            command: command.to_string(),
            stdout: stdout_buf,
            stderr: stderr_buf,
            _readers: readers,
        };

        let output = self.observe(&mut tracked, pid).await;
        if output.requires_input {
            self.processes.lock().await.insert(pid, tracked);
        }
        Ok(output)
    }

    /// Send a line of input to a tracked, input-awaiting process, then
    /// observe it again.
    ///
    /// Unknown pids and processes that are not awaiting input are rejected
    /// deterministically; the caller re-issues after the next
    /// awaiting-input result. Because the process is taken out of the map
    /// for the duration of the call, inputs for one session are delivered
    /// in the order the callers send them.
    pub async fn send_input(&self, pid: u32, stdin: &str) -> Result<CommandOutput, ToolError> {
        let mut tracked = self
            .processes
            .lock()
            .await
            .remove(&pid)
            .ok_or_else(|| ToolError::validation(format!("Process {pid} is not awaiting input")))?;

        let line = format!("{stdin}\n");
        if let Err(e) = tracked.stdin.write_all(line.as_bytes()).await {
            self.reap(pid, tracked).await;
            return Err(ToolError::io(format!("Failed to write stdin: {e}")));
        }
        if let Err(e) = tracked.stdin.flush().await {
            self.reap(pid, tracked).await;
            return Err(ToolError::io(format!("Failed to flush stdin: {e}")));
        }

        debug!(pid, "stdin delivered");

        let output = self.observe(&mut tracked, pid).await;
        if output.requires_input {
            self.processes.lock().await.insert(pid, tracked);
        }
        Ok(output)
    }

    /// Kill and reap every tracked process. Called when the active config
    /// replaces this service, so nothing is leaked.
    pub async fn shutdown(&self) {
        let mut processes = self.processes.lock().await;
        for (pid, mut tracked) in processes.drain() {
            debug!(pid, "killing orphaned process");
            let _ = tracked.child.start_kill();
            let _ = tracked.child.wait().await;
        }
    }

    /// Pids currently parked as awaiting input.
    pub async fn tracked_pids(&self) -> Vec<u32> {
        self.processes.lock().await.keys().copied().collect()
    }

    fn check_policy(&self, command: &str) -> Result<(), ToolError> {
        if self.allowed.iter().any(|regex| regex.is_match(command.trim())) {
            return Ok(());
        }
        Err(ToolError::validation(format!(
            "Command not allowed: {command}"
        )))
    }

    /// Wait until the process exits or its output goes idle on a prompt.
    async fn observe(&self, tracked: &mut TrackedProcess, pid: u32) -> CommandOutput {
        let mut last_len = (0usize, 0usize);
        let mut idle = Duration::ZERO;

        loop {
            match tracked.child.try_wait() {
                Ok(Some(status)) => {
                    // Give the reader tasks one tick to drain the pipes.
                    tokio::time::sleep(POLL_INTERVAL).await;
                    let stdout = tracked.stdout.lock().await.clone();
                    let stderr = tracked.stderr.lock().await.clone();
                    let exit_code = status.code().unwrap_or(-1);
                    debug!(pid, exit_code, "command exited");
                    return CommandOutput {
                        stdout,
                        stderr,
                        exit_code: Some(exit_code),
                        process_info: Some(ProcessInfo {
                            pid,
                            command: tracked.command.clone(),
                            status: ProcessStatus::Terminated,
                        }),
                        requires_input: false,
                        prompt: None,
                    };
                }
                Ok(None) => {}
                Err(e) => warn!(pid, error = %e, "failed to poll process"),
            }

            let stdout = tracked.stdout.lock().await.clone();
            let stderr = tracked.stderr.lock().await.clone();
            let lens = (stdout.len(), stderr.len());
            if lens == last_len {
                idle += POLL_INTERVAL;
            } else {
                idle = Duration::ZERO;
                last_len = lens;
            }

            if idle >= PROMPT_IDLE {
                if let Some(prompt) = self.detect_prompt(&stdout, &stderr) {
                    debug!(pid, prompt = %prompt, "process awaiting input");
                    return CommandOutput {
                        stdout,
                        stderr,
                        exit_code: None,
                        process_info: Some(ProcessInfo {
                            pid,
                            command: tracked.command.clone(),
                            status: ProcessStatus::AwaitingInput,
                        }),
                        requires_input: true,
                        prompt: Some(prompt),
                    };
                }
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// The trailing non-empty line of either stream, when it looks like a
    /// prompt. Prompts rarely end with a newline, so the unterminated
    /// fragment is the usual candidate.
    fn detect_prompt(&self, stdout: &str, stderr: &str) -> Option<String> {
        let last_line = |text: &str| {
            text.lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .map(|line| line.trim_end().to_string())
        };

        let candidate = last_line(stdout).or_else(|| last_line(stderr))?;
        if self.prompt_pattern.is_match(&candidate) {
            Some(candidate)
        } else {
            None
        }
    }

    async fn reap(&self, pid: u32, mut tracked: TrackedProcess) {
        warn!(pid, "reaping broken process");
        let _ = tracked.child.start_kill();
        let _ = tracked.child.wait().await;
    }
}

/// Compile a wildcard allow-list pattern (`ls *`) into an anchored regex.
fn compile_pattern(pattern: &str) -> Result<Regex, ToolError> {
    let escaped = regex::escape(pattern.trim()).replace(r"\*", ".*");
    Regex::new(&format!("^{escaped}$"))
        .map_err(|e| ToolError::validation(format!("Invalid command pattern '{pattern}': {e}")))
}

fn spawn_reader<R>(mut reader: R, buf: Arc<Mutex<String>>) -> JoinHandle<()>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut bytes = [0u8; 4096];
        loop {
            match reader.read(&mut bytes).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let text = String::from_utf8_lossy(&bytes[..n]).into_owned();
                    buf.lock().await.push_str(&text);
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(patterns: &[&str]) -> CommandService {
        let mut config = CommandConfig::new("/bin/sh");
        for pattern in patterns {
            config = config.allow(*pattern, "test rule");
        }
        CommandService::new(&config).unwrap()
    }

    #[test]
    fn test_compile_pattern_wildcards() {
        let regex = compile_pattern("ls *").unwrap();
        assert!(regex.is_match("ls -la"));
        assert!(regex.is_match("ls /tmp"));
        assert!(!regex.is_match("lsof -i"));
        assert!(!regex.is_match("cat ls file"));

        // Regex metacharacters in the pattern are literal.
        let regex = compile_pattern("git log --oneline").unwrap();
        assert!(regex.is_match("git log --oneline"));
        assert!(!regex.is_match("git log --onelineX"));
    }

    #[tokio::test]
    async fn test_one_shot_command_completes() {
        let service = service(&["echo *"]);

        let output = service.execute_command("echo hello", ".").await.unwrap();

        assert_eq!(output.exit_code, Some(0));
        assert!(output.stdout.contains("hello"));
        assert!(!output.requires_input);
        assert_eq!(
            output.process_info.unwrap().status,
            ProcessStatus::Terminated
        );
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_reported_not_raised() {
        let service = service(&["*"]);

        let output = service
            .execute_command("ls /definitely-not-a-real-path", ".")
            .await
            .unwrap();

        assert_ne!(output.exit_code, Some(0));
        assert!(!output.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_policy_violation_fails_before_spawn() {
        let service = service(&["ls *"]);

        let err = service.execute_command("rm -rf /tmp/x", ".").await.unwrap_err();

        assert_eq!(err.code(), "VALIDATION");
        assert!(err.to_string().contains("Command not allowed"));
        assert!(service.tracked_pids().await.is_empty());
    }

    #[tokio::test]
    async fn test_spawn_failure_raises_io() {
        let config = CommandConfig::new("/nonexistent-shell").allow("*", "any");
        let service = CommandService::new(&config).unwrap();

        let err = service.execute_command("echo hi", ".").await.unwrap_err();

        assert_eq!(err.code(), "IO");
        assert!(err.to_string().starts_with("Failed to spawn command: "));
    }

    #[tokio::test]
    async fn test_interactive_prompt_roundtrip() {
        let service = service(&["*"]);

        let first = service
            .execute_command("printf 'Continue? '; read line; echo \"got:$line\"", ".")
            .await
            .unwrap();

        assert!(first.requires_input);
        assert_eq!(first.exit_code, None);
        assert_eq!(first.prompt.as_deref(), Some("Continue?"));
        let info = first.process_info.unwrap();
        assert_eq!(info.status, ProcessStatus::AwaitingInput);

        let second = service.send_input(info.pid, "yes").await.unwrap();

        assert_eq!(second.exit_code, Some(0));
        assert!(second.stdout.contains("got:yes"));
        assert!(!second.requires_input);
        assert!(service.tracked_pids().await.is_empty());
    }

    #[tokio::test]
    async fn test_stdin_to_unknown_pid_is_rejected() {
        let service = service(&["*"]);

        let err = service.send_input(999_999, "yes").await.unwrap_err();

        assert_eq!(err.code(), "VALIDATION");
        assert!(err.to_string().contains("not awaiting input"));
    }

    #[tokio::test]
    async fn test_shutdown_reaps_tracked_processes() {
        let service = service(&["*"]);

        let output = service
            .execute_command("printf 'name: '; read n; echo \"hi $n\"", ".")
            .await
            .unwrap();
        assert!(output.requires_input);
        let pid = output.process_info.unwrap().pid;

        service.shutdown().await;

        assert!(service.tracked_pids().await.is_empty());
        let err = service.send_input(pid, "x").await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION");
    }
}
