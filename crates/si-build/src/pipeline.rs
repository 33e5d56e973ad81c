//! The external-process seam.
//!
//! `BuildPipeline` abstracts "run this invocation to completion" so the
//! executor can be driven by a real subprocess in production and by synthetic
//! backends in tests.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tracing::{debug, warn};

use si_types::BuildError;

use crate::invocation::BuildInvocation;

#[async_trait]
pub trait BuildPipeline: Send + Sync {
    /// Run the invocation to completion within `timeout`. Returns the exit
    /// code; `Err` means the process never ran to completion (spawn failure
    /// or wall-clock expiry), not that the build logically failed.
    async fn run(&self, invocation: &BuildInvocation, timeout: Duration)
        -> Result<i32, BuildError>;
}

/// Spawns the build as a real subprocess via tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessPipeline;

#[async_trait]
impl BuildPipeline for ProcessPipeline {
    async fn run(
        &self,
        invocation: &BuildInvocation,
        timeout: Duration,
    ) -> Result<i32, BuildError> {
        let mut cmd = tokio::process::Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.workspace)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future on timeout must take the child with it.
            .kill_on_drop(true);
        for (key, value) in invocation.env.iter() {
            cmd.env(key, value);
        }

        debug!(command = %invocation.command_line(), "spawning build process");
        let child = cmd.spawn().map_err(|e| BuildError::Spawn {
            program: invocation.program.clone(),
            message: e.to_string(),
        })?;

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Err(_) => {
                return Err(BuildError::Timeout {
                    seconds: timeout.as_secs(),
                })
            }
            Ok(Err(e)) => {
                return Err(BuildError::Spawn {
                    program: invocation.program.clone(),
                    message: e.to_string(),
                })
            }
            Ok(Ok(output)) => output,
        };

        let code = output.status.code().unwrap_or(-1);
        if code != 0 {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: String = stderr
                .chars()
                .rev()
                .take(1000)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            warn!(code, stderr_tail = %tail, "build process exited nonzero");
        }
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use si_types::EnvOverlay;
    use std::path::PathBuf;

    fn shell_invocation(script: &str, workspace: PathBuf) -> BuildInvocation {
        BuildInvocation {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            env: EnvOverlay::new(),
            workspace,
        }
    }

    #[tokio::test]
    async fn captures_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let invocation = shell_invocation("exit 3", dir.path().to_path_buf());
        let code = ProcessPipeline
            .run(&invocation, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(code, 3);
    }

    #[tokio::test]
    async fn zero_exit_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let invocation = shell_invocation("true", dir.path().to_path_buf());
        let code = ProcessPipeline
            .run(&invocation, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn timeout_kills_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let invocation = shell_invocation("sleep 30", dir.path().to_path_buf());
        let err = ProcessPipeline
            .run(&invocation, Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::Timeout { .. }));
    }

    #[tokio::test]
    async fn missing_program_is_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let invocation = BuildInvocation {
            program: "definitely-not-a-real-binary".to_string(),
            args: Vec::new(),
            env: EnvOverlay::new(),
            workspace: dir.path().to_path_buf(),
        };
        let err = ProcessPipeline
            .run(&invocation, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::Spawn { .. }));
    }

    #[tokio::test]
    async fn env_overlay_reaches_the_child() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("env_value.txt");
        let mut invocation = shell_invocation(
            &format!("printf '%s' \"$DSE_TEST_VAR\" > {}", marker.display()),
            dir.path().to_path_buf(),
        );
        invocation.env = EnvOverlay::new().set("DSE_TEST_VAR", "overlay-worked");

        let code = ProcessPipeline
            .run(&invocation, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(code, 0);
        assert_eq!(std::fs::read_to_string(&marker).unwrap(), "overlay-worked");
    }
}
