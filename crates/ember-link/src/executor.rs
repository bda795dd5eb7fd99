//! Script execution against the open session
//!
//! One invocation per trigger: the script runs front to back, sending
//! power and fire frames and suspending for the scripted dwells. There are
//! no retries, no rollback, and no cancellation — the caller is suspended
//! for the full scripted duration.

use ember_script::{CommandKind, CommandScript};
use tokio::io::AsyncWrite;
use tracing::info;

use crate::error::LinkError;
use crate::session::DeviceSession;

/// Outcome of a completed script run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionSummary {
    /// Commands executed
    pub commands_run: usize,
    /// Protocol frames actually sent (pauses send none)
    pub frames_sent: usize,
}

/// Run the script against the session, in order
///
/// The controller must only call this while the device is connected; the
/// session handle itself is proof a session is open. An I/O failure ends
/// the run where it happened.
pub async fn execute<T>(
    script: &CommandScript,
    session: &mut DeviceSession<T>,
) -> Result<ExecutionSummary, LinkError>
where
    T: AsyncWrite + Unpin + Send,
{
    info!(
        "sending {} command(s) to {}",
        script.len(),
        session.port_name()
    );
    let mut frames_sent = 0;

    for command in script.commands() {
        match command.kind() {
            CommandKind::SetPower => info!("setting power to {}W", command.value() as u16),
            CommandKind::Fire => info!("firing for {}s", command.value() as u16),
            CommandKind::Pause => info!("pausing for {}s", command.value() as u16),
        }

        if let Some(frame) = command.frame() {
            session.send_frame(&frame).await?;
            frames_sent += 1;
        }
        if let Some(dwell) = command.dwell() {
            tokio::time::sleep(dwell).await;
        }
    }

    info!("script complete, {} frame(s) sent", frames_sent);
    Ok(ExecutionSummary {
        commands_run: script.len(),
        frames_sent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::AsyncReadExt;

    fn script(text: &str) -> CommandScript {
        CommandScript::parse(text, ',').unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_execution_trace() {
        let (near, mut far) = tokio::io::duplex(1024);
        let mut session = DeviceSession::new("test".to_string(), near);
        let script = script("W,100,F,5,P,10");

        let started = tokio::time::Instant::now();
        let summary = execute(&script, &mut session).await.unwrap();
        let elapsed = started.elapsed();

        // Two frames, and the full 15s of scripted dwell
        assert_eq!(summary.commands_run, 3);
        assert_eq!(summary.frames_sent, 2);
        assert!(elapsed >= Duration::from_secs(15), "elapsed {elapsed:?}");

        let mut buf = vec![0u8; "P=100W\r\nF=5S\r\n".len()];
        far.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, b"P=100W\r\nF=5S\r\n");

        // No third frame follows the trailing pause
        let pending = tokio::time::timeout(Duration::from_secs(1), far.read(&mut [0u8; 1])).await;
        assert!(pending.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_power_does_not_suspend() {
        let (near, _far) = tokio::io::duplex(1024);
        let mut session = DeviceSession::new("test".to_string(), near);
        let script = script("W,100,W,200");

        let started = tokio::time::Instant::now();
        execute(&script, &mut session).await.unwrap();

        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ends_on_io_failure() {
        let (near, far) = tokio::io::duplex(1024);
        let mut session = DeviceSession::new("test".to_string(), near);
        drop(far);

        let err = execute(&script("W,100,F,5"), &mut session).await.unwrap_err();
        assert!(matches!(err, LinkError::Io(_)));
    }
}
