//! Supervised executor processes.

use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::{BuildError, Invocation};

/// Runs an executor invocation to completion.
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Run `invocation`, returning early with [`BuildError::Cancelled`] once a
    /// message arrives on `cancel`.
    async fn launch(
        &self,
        invocation: &Invocation,
        cancel: &mut broadcast::Receiver<()>,
    ) -> Result<ExitStatus, BuildError>;
}

/// Launches the executor as a child process.
///
/// The child's stdout and stderr are the caller's, so build logs stream
/// live. It is killed on cancellation, and when dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn launch(
        &self,
        invocation: &Invocation,
        cancel: &mut broadcast::Receiver<()>,
    ) -> Result<ExitStatus, BuildError> {
        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .env_clear()
            .envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| BuildError::Launch {
                program: invocation.program.clone(),
                source,
            })?;

        info!(pid = ?child.id(), "Executor started");

        tokio::select! {
            status = child.wait() => {
                let status = status?;
                if status.success() {
                    info!("Executor finished");
                    Ok(status)
                } else {
                    Err(BuildError::NonZeroExit { status })
                }
            }
            _ = cancelled(cancel) => {
                warn!("Cancellation requested, stopping executor");
                child.kill().await?;
                Err(BuildError::Cancelled)
            }
        }
    }
}

/// Resolves when cancellation is requested.
///
/// A closed channel means nobody can cancel any more, so it never resolves.
pub async fn cancelled(cancel: &mut broadcast::Receiver<()>) {
    match cancel.recv().await {
        Ok(()) | Err(RecvError::Lagged(_)) => {}
        Err(RecvError::Closed) => std::future::pending().await,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use kbuild_core::StaticEnvironment;
    use std::time::Duration;

    fn shell(script: &str, env: &StaticEnvironment) -> Invocation {
        Invocation::new("/bin/sh", vec!["-c".to_string(), script.to_string()], env)
    }

    fn base_env() -> StaticEnvironment {
        StaticEnvironment::new().with("PATH", "/usr/local/bin:/usr/bin:/bin")
    }

    #[tokio::test]
    async fn test_successful_exit() {
        let (_tx, mut rx) = broadcast::channel(1);
        let status = ProcessLauncher
            .launch(&shell("exit 0", &StaticEnvironment::new()), &mut rx)
            .await
            .unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_non_zero_exit() {
        let (_tx, mut rx) = broadcast::channel(1);
        let err = ProcessLauncher
            .launch(&shell("exit 3", &StaticEnvironment::new()), &mut rx)
            .await
            .unwrap_err();

        match err {
            BuildError::NonZeroExit { status } => assert_eq!(status.code(), Some(3)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_environment_is_passed_explicitly() {
        let (_tx, mut rx) = broadcast::channel(1);
        let env = StaticEnvironment::new().with("KANIKO_TEST_VALUE", "bar");
        let invocation = shell(r#"test "$KANIKO_TEST_VALUE" = bar && test -z "$HOME""#, &env);

        let status = ProcessLauncher.launch(&invocation, &mut rx).await.unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_non_unicode_environment_reaches_child() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let (_tx, mut rx) = broadcast::channel(1);
        let mut invocation = shell(
            r#"test "$KANIKO_TEST_LATIN1" = "$(printf 'caf\351')""#,
            &base_env(),
        );
        invocation.env.push((
            OsString::from("KANIKO_TEST_LATIN1"),
            OsString::from_vec(b"caf\xe9".to_vec()),
        ));

        let status = ProcessLauncher.launch(&invocation, &mut rx).await.unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_cancellation_stops_child() {
        let (tx, mut rx) = broadcast::channel(1);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let _ = tx.send(());
        });

        let result = tokio::time::timeout(
            Duration::from_secs(10),
            ProcessLauncher.launch(&shell("sleep 30", &base_env()), &mut rx),
        )
        .await
        .expect("launch should return promptly after cancellation");

        assert!(matches!(result, Err(BuildError::Cancelled)));
    }

    #[tokio::test]
    async fn test_closed_channel_does_not_cancel() {
        let (tx, mut rx) = broadcast::channel::<()>(1);
        drop(tx);

        let status = ProcessLauncher
            .launch(&shell("sleep 1", &base_env()), &mut rx)
            .await
            .unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_missing_program() {
        let (_tx, mut rx) = broadcast::channel(1);
        let invocation = Invocation::new(
            "/nonexistent/kaniko/executor",
            vec![],
            &StaticEnvironment::new(),
        );

        let err = ProcessLauncher.launch(&invocation, &mut rx).await.unwrap_err();
        assert!(matches!(err, BuildError::Launch { .. }));
    }
}
