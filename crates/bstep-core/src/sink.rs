#![forbid(unsafe_code)]

//! Destinations for the animation event stream.

use crate::event::AnimationEvent;

/// Receives animation events in emission order.
pub trait AnimationSink {
    fn emit(&mut self, event: AnimationEvent);
}

impl AnimationSink for Vec<AnimationEvent> {
    fn emit(&mut self, event: AnimationEvent) {
        self.push(event);
    }
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AnimationSink for NullSink {
    fn emit(&mut self, _event: AnimationEvent) {}
}

/// In-memory recording sink.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<AnimationEvent>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[AnimationEvent] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Drain everything recorded so far.
    pub fn take(&mut self) -> Vec<AnimationEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of events whose [`AnimationEvent::kind`] is `kind`.
    #[must_use]
    pub fn count_kind(&self, kind: &str) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    /// Top-level `Start`..`End` chains, each including its brackets.
    ///
    /// Nested chains stay inside their parent. Events outside any chain
    /// (for example a controller redraw) are skipped, as is a trailing
    /// unterminated chain.
    #[must_use]
    pub fn chains(&self) -> Vec<&[AnimationEvent]> {
        let mut chains = Vec::new();
        let mut depth = 0usize;
        let mut start = 0;
        for (i, event) in self.events.iter().enumerate() {
            match event {
                AnimationEvent::Start => {
                    if depth == 0 {
                        start = i;
                    }
                    depth += 1;
                }
                AnimationEvent::End if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        chains.push(&self.events[start..=i]);
                    }
                }
                _ => {}
            }
        }
        chains
    }

    /// Whether every `Start` has a matching `End` and no `End` comes first.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        let mut depth = 0usize;
        for event in &self.events {
            match event {
                AnimationEvent::Start => depth += 1,
                AnimationEvent::End => match depth.checked_sub(1) {
                    Some(d) => depth = d,
                    None => return false,
                },
                _ => {}
            }
        }
        depth == 0
    }
}

impl AnimationSink for EventLog {
    fn emit(&mut self, event: AnimationEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Beat;

    #[test]
    fn chains_respect_nesting() {
        let mut log = EventLog::new();
        log.emit(AnimationEvent::Start);
        log.emit(AnimationEvent::Start);
        log.emit(AnimationEvent::End);
        log.emit(AnimationEvent::ShowTree(Beat::Full));
        log.emit(AnimationEvent::End);
        log.emit(AnimationEvent::RedrawTree(Vec::new()));
        log.emit(AnimationEvent::Start);
        log.emit(AnimationEvent::End);

        let chains = log.chains();
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0].len(), 5);
        assert_eq!(chains[1].len(), 2);
        assert!(log.is_balanced());
        assert_eq!(log.count_kind("start"), 3);
    }

    #[test]
    fn unbalanced_log() {
        let mut log = EventLog::new();
        log.emit(AnimationEvent::End);
        log.emit(AnimationEvent::Start);
        assert!(!log.is_balanced());
        assert!(log.chains().is_empty());
    }

    #[test]
    fn take_drains() {
        let mut log = EventLog::new();
        log.emit(AnimationEvent::ClearArray);
        assert_eq!(log.take(), vec![AnimationEvent::ClearArray]);
        assert!(log.is_empty());
    }
}
