//! Deferring surface mutations to the next render opportunity
//!
//! Actions never touch a surface directly. They hand a [`PendingPaint`] to a
//! [`FrameScheduler`], which applies it when the next frame is rendered.

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use log::{debug, error};

use crate::surface::SharedSurface;

/// One surface content replacement waiting for a frame
pub struct PendingPaint {
    surface: SharedSurface,
    content: String,
}

impl PendingPaint {
    pub fn new(surface: SharedSurface, content: String) -> Self {
        PendingPaint { surface, content }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the surface content
    pub fn apply(self) -> Result<()> {
        let mut surface = self
            .surface
            .lock()
            .map_err(|_| anyhow!("Surface lock poisoned"))?;
        surface.set_content(&self.content)
    }
}

impl std::fmt::Debug for PendingPaint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingPaint")
            .field("content", &self.content)
            .finish_non_exhaustive()
    }
}

/// Something that applies paints on its next frame
pub trait FrameScheduler {
    /// Queue a paint for the next frame
    fn request_frame(&mut self, paint: PendingPaint) -> Result<()>;

    /// Block until every paint requested so far has been applied
    fn sync(&mut self) -> Result<()>;

    /// First paint error reported since the last call, if any
    fn take_error(&mut self) -> Option<anyhow::Error> {
        None
    }
}

/// Frame scheduler driven by the caller: each [`FrameQueue::render_frame`] call is one frame
#[derive(Debug, Default)]
pub struct FrameQueue {
    pending: VecDeque<PendingPaint>,
    frames_rendered: u64,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Apply every paint queued before this call, in order
    ///
    /// Returns the number of paints applied. Stops at the first failing paint and
    /// drops the rest of this frame's paints.
    pub fn render_frame(&mut self) -> Result<usize> {
        let frame: Vec<PendingPaint> = self.pending.drain(..).collect();
        self.frames_rendered += 1;
        let count = frame.len();
        for paint in frame {
            paint.apply()?;
        }
        Ok(count)
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self, paint: PendingPaint) -> Result<()> {
        self.pending.push_back(paint);
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        while !self.pending.is_empty() {
            self.render_frame()?;
        }
        Ok(())
    }
}

/// Message sent to the render thread
enum FrameMessage {
    Paint(PendingPaint),
    /// Acknowledge once every earlier paint has been applied
    Barrier(Sender<()>),
}

/// Background render thread that applies paints at a fixed frame interval
pub struct FrameLoop {
    sender: Option<Sender<FrameMessage>>,
    errors: Receiver<anyhow::Error>,
    handle: Option<JoinHandle<()>>,
}

impl FrameLoop {
    /// Spawn the render thread
    pub fn start(frame_interval: Duration) -> Result<Self> {
        let (sender, receiver) = channel();
        let (error_tx, error_rx) = channel();

        let handle = thread::Builder::new()
            .name("typist-frames".to_string())
            .spawn(move || Self::render_loop(receiver, error_tx, frame_interval))
            .context("Failed to spawn render thread")?;

        Ok(FrameLoop {
            sender: Some(sender),
            errors: error_rx,
            handle: Some(handle),
        })
    }

    fn render_loop(
        receiver: Receiver<FrameMessage>,
        error_tx: Sender<anyhow::Error>,
        frame_interval: Duration,
    ) {
        debug!("🎞️  Render thread started ({:?} frames)", frame_interval);

        let mut next_frame = Instant::now() + frame_interval;
        let mut frame: Vec<FrameMessage> = Vec::new();
        let mut disconnected = false;

        while !disconnected {
            // Collect everything that arrives before the frame deadline
            loop {
                let timeout = next_frame.saturating_duration_since(Instant::now());
                match receiver.recv_timeout(timeout) {
                    Ok(message) => frame.push(message),
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
            if !disconnected {
                loop {
                    match receiver.try_recv() {
                        Ok(message) => frame.push(message),
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            disconnected = true;
                            break;
                        }
                    }
                }
            }

            for message in frame.drain(..) {
                match message {
                    FrameMessage::Paint(paint) => {
                        debug!("🖌️  Paint {:?}", paint.content());
                        if let Err(e) = paint.apply() {
                            error!("❌ Paint failed: {:#}", e);
                            if error_tx.send(e).is_err() {
                                return;
                            }
                        }
                    }
                    FrameMessage::Barrier(ack) => {
                        // The waiting side may have given up already
                        let _ = ack.send(());
                    }
                }
            }

            next_frame += frame_interval;
            let now = Instant::now();
            if next_frame < now {
                next_frame = now + frame_interval;
            }
        }

        debug!("🎞️  Render thread stopped");
    }

    fn send(&self, message: FrameMessage) -> Result<()> {
        let sender = self
            .sender
            .as_ref()
            .context("Render thread already shut down")?;
        sender
            .send(message)
            .map_err(|_| anyhow!("Render thread disconnected"))
    }

    /// Apply the remaining paints and stop the render thread
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()?;
        match self.take_error() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn stop(&mut self) -> Result<()> {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow!("Render thread panicked"))?;
        }
        Ok(())
    }
}

impl FrameScheduler for FrameLoop {
    fn request_frame(&mut self, paint: PendingPaint) -> Result<()> {
        self.send(FrameMessage::Paint(paint))
    }

    fn sync(&mut self) -> Result<()> {
        let (ack_tx, ack_rx) = channel();
        self.send(FrameMessage::Barrier(ack_tx))?;
        ack_rx
            .recv()
            .map_err(|_| anyhow!("Render thread stopped before reaching barrier"))?;

        // Errors are sent before the barrier is acknowledged
        match self.errors.try_recv() {
            Ok(e) => Err(e),
            Err(_) => Ok(()),
        }
    }

    fn take_error(&mut self) -> Option<anyhow::Error> {
        self.errors.try_recv().ok()
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!("❌ {:#}", e);
        }
    }
}
