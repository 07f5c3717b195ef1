// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! Interrupt watcher

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::mpsc;

/// Stream yielding once per SIGINT or SIGTERM received
pub type Interrupts = BoxStream<'static, ()>;

/// Take over SIGINT and SIGTERM for the rest of the process.
///
/// The handlers are registered before this returns, so a signal arriving at
/// any later point is delivered through the stream instead of killing the
/// process. Must be called from within a tokio runtime.
pub fn watch_interrupts() -> std::io::Result<Interrupts> {
    let (tx, rx) = mpsc::unbounded_channel();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut terminate = signal(SignalKind::terminate())?;
        tokio::spawn(async move {
            loop {
                let name = tokio::select! {
                    Some(()) = interrupt.recv() => "SIGINT",
                    Some(()) = terminate.recv() => "SIGTERM",
                    else => break,
                };
                tracing::info!(signal = name, "received signal");
                if tx.send(()).is_err() {
                    break;
                }
            }
        });
    }

    #[cfg(not(unix))]
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!(signal = "ctrl-c", "received signal");
            if tx.send(()).is_err() {
                break;
            }
        }
    });

    Ok(stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|()| ((), rx)) }).boxed())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_sigterm_is_delivered_as_interrupt() {
        let mut interrupts = watch_interrupts().unwrap();

        std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .unwrap();

        let received = tokio::time::timeout(Duration::from_secs(5), interrupts.next()).await;
        assert_eq!(received.unwrap(), Some(()));
    }
}
