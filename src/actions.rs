//! Turning text steps into deferred surface updates

use anyhow::Result;
use log::debug;

use crate::frame::{FrameScheduler, PendingPaint};
use crate::surface::SharedSurface;

/// Sets a surface's content to one step on the next frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    step: String,
}

impl Action {
    pub fn new(step: impl Into<String>) -> Self {
        Action { step: step.into() }
    }

    pub fn step(&self) -> &str {
        &self.step
    }

    /// Schedule the content change; the surface is untouched until `frames` renders
    pub fn invoke(&self, surface: &SharedSurface, frames: &mut dyn FrameScheduler) -> Result<()> {
        debug!("⌨️  Scheduling step {:?}", self.step);
        frames.request_frame(PendingPaint::new(surface.clone(), self.step.clone()))
    }
}

/// One action per step, lazily, in the same order
pub fn map_to_actions<I>(steps: I) -> impl Iterator<Item = Action>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    steps.into_iter().map(Action::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameQueue;
    use crate::steps::writer;
    use crate::surface::{read_content, shared, TextBuffer};

    #[test]
    fn test_one_action_per_step() {
        assert_eq!(map_to_actions(writer("text")).count(), 4);
        assert_eq!(map_to_actions(Vec::<String>::new()).count(), 0);
    }

    #[test]
    fn test_actions_apply_on_separate_frames() {
        let surface = shared(TextBuffer::new(""));
        let mut frames = FrameQueue::new();
        let actions: Vec<Action> = map_to_actions(["a", "ab"]).collect();
        assert_eq!(actions.len(), 2);

        actions[0].invoke(&surface, &mut frames).unwrap();
        assert_eq!(read_content(&surface).unwrap(), "");
        frames.render_frame().unwrap();
        assert_eq!(read_content(&surface).unwrap(), "a");

        actions[1].invoke(&surface, &mut frames).unwrap();
        assert_eq!(read_content(&surface).unwrap(), "a");
        frames.render_frame().unwrap();
        assert_eq!(read_content(&surface).unwrap(), "ab");
    }

    #[test]
    fn test_action_binds_its_step() {
        let mut steps = vec!["one".to_string()];
        let action = map_to_actions(steps.clone()).next().unwrap();
        steps[0].push_str(" changed");
        assert_eq!(action.step(), "one");
    }
}
