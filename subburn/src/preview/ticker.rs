use crate::foundation::core::Canvas;
use crate::foundation::error::{SubburnError, SubburnResult};
use crate::model::style::Style;
use crate::model::track::Track;
use crate::preview::driver::{MediaClock, PreviewDriver, TickReport};
use crate::render::frame::FrameRGBA;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Messages accepted by the preview render thread.
#[derive(Debug)]
pub enum PreviewCommand {
    /// Start per-frame rendering.
    Play,
    /// Stop per-frame rendering.
    Pause,
    /// Render once (scrub).
    Invalidate,
    /// Replace the segments.
    SetTrack(Track),
    /// Replace the style.
    SetStyle(Style),
    /// Resize the surface.
    Resize(Canvas),
    /// Exit the render thread.
    Shutdown,
}

/// Owns a [`PreviewDriver`] on a dedicated thread and ticks it at a fixed refresh interval while
/// playing.
///
/// While paused the thread blocks on its command channel and uses no CPU. Every render is
/// delivered to the `on_frame` callback on the render thread.
pub struct PreviewTicker {
    tx: mpsc::Sender<PreviewCommand>,
    handle: Option<JoinHandle<()>>,
}

impl PreviewTicker {
    /// Move `driver` onto a new render thread.
    pub fn spawn<C, F>(
        mut driver: PreviewDriver<C>,
        interval: Duration,
        mut on_frame: F,
    ) -> SubburnResult<Self>
    where
        C: MediaClock + Send + 'static,
        F: FnMut(&FrameRGBA, &TickReport) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<PreviewCommand>();
        let handle = std::thread::Builder::new()
            .name("subburn-preview".to_owned())
            .spawn(move || {
                loop {
                    let next = if driver.is_scheduled() {
                        match rx.recv_timeout(interval) {
                            Ok(cmd) => Some(cmd),
                            Err(mpsc::RecvTimeoutError::Timeout) => None,
                            Err(mpsc::RecvTimeoutError::Disconnected) => break,
                        }
                    } else if driver.needs_tick() {
                        match rx.try_recv() {
                            Ok(cmd) => Some(cmd),
                            Err(mpsc::TryRecvError::Empty) => None,
                            Err(mpsc::TryRecvError::Disconnected) => break,
                        }
                    } else {
                        match rx.recv() {
                            Ok(cmd) => Some(cmd),
                            Err(_) => break,
                        }
                    };

                    match next {
                        Some(PreviewCommand::Shutdown) => break,
                        Some(PreviewCommand::Play) => driver.play(),
                        Some(PreviewCommand::Pause) => driver.pause(),
                        Some(PreviewCommand::Invalidate) => driver.invalidate(),
                        Some(PreviewCommand::SetTrack(track)) => driver.set_track(track),
                        Some(PreviewCommand::SetStyle(style)) => driver.set_style(style),
                        Some(PreviewCommand::Resize(canvas)) => driver.resize(canvas),
                        None => {}
                    }

                    match driver.tick() {
                        Ok(Some(report)) => on_frame(driver.surface(), &report),
                        Ok(None) => {}
                        Err(e) => tracing::warn!(error = %e, "preview render failed"),
                    }
                }
                tracing::debug!("preview thread exiting");
            })
            .map_err(|e| SubburnError::evaluation(format!("spawn preview thread: {e}")))?;

        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    /// Send a command to the render thread.
    pub fn send(&self, cmd: PreviewCommand) -> SubburnResult<()> {
        self.tx
            .send(cmd)
            .map_err(|_| SubburnError::evaluation("preview thread is not accepting commands"))
    }

    /// Stop the render thread and wait for it to exit.
    pub fn shutdown(mut self) -> SubburnResult<()> {
        self.stop()
    }

    fn stop(&mut self) -> SubburnResult<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        let _ = self.tx.send(PreviewCommand::Shutdown);
        handle
            .join()
            .map_err(|_| SubburnError::evaluation("preview thread panicked"))
    }
}

impl Drop for PreviewTicker {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/preview/ticker.rs"]
mod tests;
