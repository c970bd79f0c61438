//! Looping type-then-erase animation over an ordered list of texts.
//!
//! The machine never sleeps or spawns anything itself: every step is handed
//! to a [`TypingDriver`] together with a [`StepTicket`], and the driver calls
//! [`TypingMachine::fire`] with that ticket once the delay has elapsed. Only
//! the ticket of the single pending step is accepted, so a timer that slipped
//! through a cancel can never render a character.

use serde::{Deserialize, Serialize};

use crate::TypingTiming;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Typing,
    Erasing,
}

/// Identity of one scheduled step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StepTicket {
    generation: u64,
    seq: u64,
}

impl StepTicket {
    /// Number of resets the machine had seen when this step was scheduled.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Timer and output backend of a [`TypingMachine`].
pub trait TypingDriver {
    type Handle;

    /// Arrange for `fire(ticket)` to be called after `delay_ms`.
    fn schedule(&mut self, delay_ms: u32, ticket: StepTicket) -> Self::Handle;

    /// Drop a step scheduled earlier. Called at most once per handle.
    fn cancel(&mut self, handle: Self::Handle);

    /// Show `text` as the animated element's content.
    fn render(&mut self, text: &str);
}

struct Pending<H> {
    ticket: StepTicket,
    handle: H,
}

pub struct TypingMachine<D: TypingDriver> {
    driver: D,
    timing: TypingTiming,
    texts: Vec<String>,
    text_index: usize,
    char_index: usize,
    phase: Phase,
    rendered: String,
    generation: u64,
    seq: u64,
    pending: Option<Pending<D::Handle>>,
}

impl<D: TypingDriver> TypingMachine<D> {
    /// An idle machine with no texts and nothing scheduled.
    pub fn new(driver: D, timing: TypingTiming) -> Self {
        Self {
            driver,
            timing,
            texts: Vec::new(),
            text_index: 0,
            char_index: 0,
            phase: Phase::Idle,
            rendered: String::new(),
            generation: 0,
            seq: 0,
            pending: None,
        }
    }

    /// Restart from a clean state with `texts`.
    ///
    /// Cancels the pending step if any, clears the rendered text and, unless
    /// `texts` is empty, schedules the first typing step. Afterwards at most
    /// one step is pending.
    pub fn reset(&mut self, texts: Vec<String>) {
        self.cancel_pending();
        self.generation += 1;
        self.texts = texts;
        self.text_index = 0;
        self.char_index = 0;
        self.rendered.clear();
        self.driver.render("");

        if self.texts.is_empty() {
            self.phase = Phase::Idle;
            log::debug!("typing reset with no texts, staying idle");
            return;
        }

        self.phase = Phase::Typing;
        log::debug!(
            "typing reset: {} texts, generation {}",
            self.texts.len(),
            self.generation
        );
        self.schedule(self.timing.start_ms);
    }

    /// Stop animating, keeping whatever is currently rendered.
    pub fn cancel(&mut self) {
        self.cancel_pending();
        self.phase = Phase::Idle;
    }

    /// Run the step identified by `ticket`.
    ///
    /// Returns `false` and changes nothing when `ticket` is not the pending
    /// step (cancelled, superseded by a reset, or already run).
    pub fn fire(&mut self, ticket: StepTicket) -> bool {
        match &self.pending {
            Some(pending) if pending.ticket == ticket => {}
            _ => {
                log::debug!("ignoring stale typing step {ticket:?}");
                return false;
            }
        }
        // The driver's timer has already elapsed; the handle is spent.
        self.pending = None;
        self.step();
        true
    }

    fn step(&mut self) {
        let Some(target) = self.texts.get(self.text_index) else {
            self.phase = Phase::Idle;
            return;
        };

        match self.phase {
            Phase::Idle => {}
            Phase::Typing => match target.chars().nth(self.char_index) {
                Some(ch) => {
                    self.rendered.push(ch);
                    self.char_index += 1;
                    self.driver.render(&self.rendered);
                    self.schedule(self.timing.type_ms);
                }
                None => {
                    self.phase = Phase::Erasing;
                    self.schedule(self.timing.read_pause_ms);
                }
            },
            Phase::Erasing => {
                if self.char_index > 0 {
                    self.rendered.pop();
                    self.char_index -= 1;
                    self.driver.render(&self.rendered);
                    self.schedule(self.timing.erase_ms);
                } else {
                    self.text_index = (self.text_index + 1) % self.texts.len();
                    self.phase = Phase::Typing;
                    self.schedule(self.timing.next_text_ms);
                }
            }
        }
    }

    fn schedule(&mut self, delay_ms: u32) {
        self.cancel_pending();
        self.seq += 1;
        let ticket = StepTicket {
            generation: self.generation,
            seq: self.seq,
        };
        let handle = self.driver.schedule(delay_ms, ticket);
        self.pending = Some(Pending { ticket, handle });
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.driver.cancel(pending.handle);
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn text_index(&self) -> usize {
        self.text_index
    }

    pub fn char_index(&self) -> usize {
        self.char_index
    }

    /// The string currently being typed or erased.
    pub fn current_text(&self) -> Option<&str> {
        self.texts.get(self.text_index).map(String::as_str)
    }

    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    pub fn pending_ticket(&self) -> Option<StepTicket> {
        self.pending.as_ref().map(|pending| pending.ticket)
    }

    pub fn timing(&self) -> TypingTiming {
        self.timing
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}

/// A step waiting in a [`ManualDriver`] queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledStep {
    pub id: u64,
    pub due_ms: u64,
    pub ticket: StepTicket,
}

/// Virtual-clock driver: steps wait in a queue until pulled.
///
/// Used by tests and by tooling that previews the animation offline.
#[derive(Debug, Default)]
pub struct ManualDriver {
    now_ms: u64,
    next_id: u64,
    queue: Vec<ScheduledStep>,
    screen: String,
    frames: Vec<String>,
    cancelled: usize,
}

impl ManualDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn screen(&self) -> &str {
        &self.screen
    }

    /// Every rendered text in order, including clears.
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn queued(&self) -> &[ScheduledStep] {
        &self.queue
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled
    }

    /// Remove the earliest due step and advance the clock to it.
    pub fn pop_next(&mut self) -> Option<ScheduledStep> {
        let (index, _) = self
            .queue
            .iter()
            .enumerate()
            .min_by_key(|(_, step)| (step.due_ms, step.id))?;
        let step = self.queue.remove(index);
        self.now_ms = self.now_ms.max(step.due_ms);
        Some(step)
    }
}

impl TypingDriver for ManualDriver {
    type Handle = u64;

    fn schedule(&mut self, delay_ms: u32, ticket: StepTicket) -> u64 {
        self.next_id += 1;
        self.queue.push(ScheduledStep {
            id: self.next_id,
            due_ms: self.now_ms + u64::from(delay_ms),
            ticket,
        });
        self.next_id
    }

    fn cancel(&mut self, handle: u64) {
        let before = self.queue.len();
        self.queue.retain(|step| step.id != handle);
        if self.queue.len() != before {
            self.cancelled += 1;
        }
    }

    fn render(&mut self, text: &str) {
        self.screen.clear();
        self.screen.push_str(text);
        self.frames.push(text.to_string());
    }
}

impl TypingMachine<ManualDriver> {
    /// Pull the next queued step and run it. `None` once the queue is empty.
    pub fn run_next(&mut self) -> Option<bool> {
        let step = self.driver.pop_next()?;
        Some(self.fire(step.ticket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> TypingMachine<ManualDriver> {
        TypingMachine::new(ManualDriver::new(), TypingTiming::default())
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn new_machine_is_idle_and_unscheduled() {
        let m = machine();
        assert_eq!(m.phase(), Phase::Idle);
        assert!(m.pending_ticket().is_none());
        assert!(m.driver().queued().is_empty());
    }

    #[test]
    fn types_then_erases_then_moves_on() {
        let mut m = machine();
        m.reset(texts(&["ab", "c"]));

        assert_eq!(m.run_next(), Some(true));
        assert_eq!(m.rendered(), "a");
        assert_eq!(m.run_next(), Some(true));
        assert_eq!(m.rendered(), "ab");

        // End of text: switch to erasing after the read pause.
        m.run_next();
        assert_eq!(m.phase(), Phase::Erasing);
        assert_eq!(m.driver().queued()[0].due_ms, m.driver().now_ms() + 2000);

        m.run_next();
        assert_eq!(m.rendered(), "a");
        m.run_next();
        assert_eq!(m.rendered(), "");

        m.run_next();
        assert_eq!(m.phase(), Phase::Typing);
        assert_eq!(m.text_index(), 1);
        m.run_next();
        assert_eq!(m.rendered(), "c");
    }

    #[test]
    fn wraps_around_to_first_text() {
        let mut m = machine();
        m.reset(texts(&["x"]));
        // type x, pause, erase x, advance
        for _ in 0..4 {
            m.run_next();
        }
        assert_eq!(m.text_index(), 0);
        assert_eq!(m.phase(), Phase::Typing);
        m.run_next();
        assert_eq!(m.rendered(), "x");
    }

    #[test]
    fn counts_characters_not_bytes() {
        let mut m = machine();
        m.reset(texts(&["Größe"]));
        for _ in 0..3 {
            m.run_next();
        }
        assert_eq!(m.rendered(), "Grö");
        assert_eq!(m.char_index(), 3);
    }

    #[test]
    fn empty_texts_stay_idle() {
        let mut m = machine();
        m.reset(Vec::new());
        assert_eq!(m.phase(), Phase::Idle);
        assert_eq!(m.run_next(), None);
        assert_eq!(m.rendered(), "");
    }

    #[test]
    fn empty_string_entries_do_not_spin() {
        let mut m = machine();
        m.reset(texts(&["", "z"]));
        m.run_next();
        assert_eq!(m.phase(), Phase::Erasing);
        assert_eq!(m.driver().queued().len(), 1);
        m.run_next();
        m.run_next();
        assert_eq!(m.rendered(), "z");
    }

    #[test]
    fn reset_mid_animation_leaves_one_pending_step() {
        let mut m = machine();
        m.reset(texts(&["hello"]));
        m.run_next();
        m.run_next();
        assert_eq!(m.rendered(), "he");

        m.reset(texts(&["hallo"]));
        assert_eq!(m.driver().queued().len(), 1);
        assert_eq!(m.driver().cancelled(), 1);
        assert_eq!(m.rendered(), "");
        assert_eq!(m.driver().screen(), "");
    }

    #[test]
    fn step_fired_across_reset_is_ignored() {
        let mut m = machine();
        m.reset(texts(&["hello"]));
        m.run_next();

        // Timer elapses, but the reset lands before its callback runs.
        let raced = m.driver_mut().pop_next().unwrap();
        m.reset(texts(&["bonjour"]));
        assert!(!m.fire(raced.ticket));
        assert_eq!(m.rendered(), "");
        assert_eq!(m.driver().queued().len(), 1);

        m.run_next();
        assert_eq!(m.rendered(), "b");
    }

    #[test]
    fn a_ticket_fires_at_most_once() {
        let mut m = machine();
        m.reset(texts(&["ab"]));
        let step = m.driver_mut().pop_next().unwrap();
        assert!(m.fire(step.ticket));
        assert!(!m.fire(step.ticket));
        assert_eq!(m.rendered(), "a");
    }

    #[test]
    fn cancel_stops_the_loop() {
        let mut m = machine();
        m.reset(texts(&["ab"]));
        m.run_next();
        m.cancel();
        assert_eq!(m.phase(), Phase::Idle);
        assert_eq!(m.run_next(), None);
        assert_eq!(m.rendered(), "a");
    }
}
