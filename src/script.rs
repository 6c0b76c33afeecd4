//! Typing scripts: texts to type, pauses, callbacks and signals, run in order

use std::fmt;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use anyhow::{bail, Result};
use log::info;

use crate::frame::FrameScheduler;
use crate::playback::{CancelToken, Playback, Player};
use crate::surface::SharedSurface;

/// How often a blocked [`Signal`] wait checks for cancellation
const SIGNAL_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Callback invoked with the surface once every earlier step has been painted
///
/// Only the surface is passed. Callbacks that need the rest of the script capture
/// whatever they need, and looping is expressed with [`ScriptItem::Repeat`].
pub type Callback = Box<dyn FnMut(&SharedSurface) -> Result<()> + Send>;

/// Completion signal a script can wait on
///
/// Once it has fired, later passes over the same script (after a repeat) do not wait
/// on it again.
pub struct Signal {
    receiver: Receiver<()>,
    resolved: bool,
}

impl Signal {
    /// A signal and the sender that fires it
    pub fn channel() -> (Sender<()>, Signal) {
        let (sender, receiver) = channel();
        (sender, Signal { receiver, resolved: false })
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Block until fired; returns whether the wait was cancelled instead
    fn wait(&mut self, cancel: &CancelToken) -> Result<bool> {
        while !self.resolved {
            if cancel.is_cancelled() {
                return Ok(true);
            }
            match self.receiver.recv_timeout(SIGNAL_POLL_INTERVAL) {
                Ok(()) => self.resolved = true,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    bail!("Signal sender dropped before firing")
                }
            }
        }
        Ok(false)
    }
}

pub enum ScriptItem {
    /// Edit the surface until it shows this text
    Text(String),
    Pause(Duration),
    Call(Callback),
    Await(Signal),
    /// Start over from the first item
    Repeat,
}

impl fmt::Debug for ScriptItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptItem::Text(text) => f.debug_tuple("Text").field(text).finish(),
            ScriptItem::Pause(duration) => f.debug_tuple("Pause").field(duration).finish(),
            ScriptItem::Call(_) => f.write_str("Call"),
            ScriptItem::Await(signal) => f
                .debug_struct("Await")
                .field("resolved", &signal.resolved)
                .finish(),
            ScriptItem::Repeat => f.write_str("Repeat"),
        }
    }
}

#[derive(Debug, Default)]
pub struct Script {
    items: Vec<ScriptItem>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a script from command-line style arguments
    ///
    /// Arguments that parse as a whole number are pauses in milliseconds, everything
    /// else is text to type.
    pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Self {
        args.iter().fold(Script::new(), |script, arg| {
            let arg = arg.as_ref();
            match arg.parse::<u64>() {
                Ok(ms) => script.pause(Duration::from_millis(ms)),
                Err(_) => script.text(arg),
            }
        })
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.items.push(ScriptItem::Text(text.into()));
        self
    }

    pub fn pause(mut self, duration: Duration) -> Self {
        self.items.push(ScriptItem::Pause(duration));
        self
    }

    pub fn call<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&SharedSurface) -> Result<()> + Send + 'static,
    {
        self.items.push(ScriptItem::Call(Box::new(callback)));
        self
    }

    pub fn await_signal(mut self, signal: Signal) -> Self {
        self.items.push(ScriptItem::Await(signal));
        self
    }

    pub fn repeat(mut self) -> Self {
        self.items.push(ScriptItem::Repeat);
        self
    }

    pub fn items(&self) -> &[ScriptItem] {
        &self.items
    }

    /// A repeating script must contain something that takes time, or it would spin
    pub fn validate(&self) -> Result<()> {
        let repeats = self.items.iter().any(|item| matches!(item, ScriptItem::Repeat));
        let paced = self
            .items
            .iter()
            .any(|item| matches!(item, ScriptItem::Text(_) | ScriptItem::Pause(_)));
        if repeats && !paced {
            bail!("A repeating script needs at least one text or pause");
        }
        Ok(())
    }
}

/// Runs scripts against one surface
pub struct Typist<F: FrameScheduler> {
    surface: SharedSurface,
    frames: F,
    player: Player,
}

impl<F: FrameScheduler> Typist<F> {
    pub fn new(surface: SharedSurface, frames: F, player: Player) -> Self {
        Typist { surface, frames, player }
    }

    pub fn surface(&self) -> &SharedSurface {
        &self.surface
    }

    pub fn frames_mut(&mut self) -> &mut F {
        &mut self.frames
    }

    pub fn into_frames(self) -> F {
        self.frames
    }

    /// Edit straight to `text`, outside of any script
    pub fn type_text(&mut self, text: &str, cancel: &CancelToken) -> Result<Playback> {
        self.player.edit(&self.surface, &mut self.frames, text, cancel)
    }

    /// Run every item in order until the script ends or is cancelled
    ///
    /// The returned playback counts steps across all edits of the run.
    pub fn run(&mut self, script: &mut Script, cancel: &CancelToken) -> Result<Playback> {
        script.validate()?;
        info!("▶️  Running script with {} items", script.items.len());

        let mut total = 0;
        let mut index = 0;

        while index < script.items.len() {
            if cancel.is_cancelled() {
                return Ok(Playback::Cancelled { applied: total });
            }

            match &mut script.items[index] {
                ScriptItem::Text(text) => {
                    let outcome = self.player.edit(&self.surface, &mut self.frames, text.as_str(), cancel)?;
                    total += outcome.steps();
                    if outcome.is_cancelled() {
                        return Ok(Playback::Cancelled { applied: total });
                    }
                }
                ScriptItem::Pause(duration) => {
                    if cancel.wait_timeout(*duration) {
                        return Ok(Playback::Cancelled { applied: total });
                    }
                }
                ScriptItem::Call(callback) => {
                    self.frames.sync()?;
                    callback(&self.surface)?;
                }
                ScriptItem::Await(signal) => {
                    if signal.wait(cancel)? {
                        return Ok(Playback::Cancelled { applied: total });
                    }
                }
                ScriptItem::Repeat => {
                    info!("🔁 Repeating script");
                    index = 0;
                    continue;
                }
            }

            index += 1;
        }

        self.frames.sync()?;
        info!("✅ Script finished after {} steps", total);
        Ok(Playback::Completed { steps: total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let script = Script::parse_args(&["Hello", "500", "Hello world"]);
        let items = script.items();
        assert_eq!(items.len(), 3);
        assert!(matches!(&items[0], ScriptItem::Text(t) if t == "Hello"));
        assert!(matches!(items[1], ScriptItem::Pause(d) if d == Duration::from_millis(500)));
        assert!(matches!(&items[2], ScriptItem::Text(t) if t == "Hello world"));
    }

    #[test]
    fn test_parse_args_keeps_non_integers_as_text() {
        let script = Script::parse_args(&["-5", "1.5", "12a"]);
        assert!(script.items().iter().all(|item| matches!(item, ScriptItem::Text(_))));
    }

    #[test]
    fn test_repeat_without_pacing_is_rejected() {
        let script = Script::new().call(|_| Ok(())).repeat();
        assert!(script.validate().is_err());

        let script = Script::new().text("a").repeat();
        assert!(script.validate().is_ok());
    }

    #[test]
    fn test_signal_wait() {
        let (sender, mut signal) = Signal::channel();
        sender.send(()).unwrap();
        assert!(!signal.wait(&CancelToken::new()).unwrap());
        assert!(signal.is_resolved());
        // Already resolved: returns immediately even though nothing else is sent
        assert!(!signal.wait(&CancelToken::new()).unwrap());
    }

    #[test]
    fn test_signal_dropped_sender_is_an_error() {
        let (sender, mut signal) = Signal::channel();
        drop(sender);
        assert!(signal.wait(&CancelToken::new()).is_err());
    }

    #[test]
    fn test_signal_wait_cancelled() {
        let (_sender, mut signal) = Signal::channel();
        let cancel = CancelToken::new();
        cancel.cancel();
        assert!(signal.wait(&cancel).unwrap());
    }
}
