use std::cell::RefCell;
use std::rc::{Rc, Weak};

use folio_core::{StepTicket, TypingDriver, TypingMachine, TypingTiming};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, Window};

use crate::dom::js_error_text;

pub type SharedTyping = Rc<RefCell<TypingMachine<WindowDriver>>>;

/// A pending `setTimeout`. Dropping it clears the timeout.
pub struct TimerHandle {
    _cb: Closure<dyn FnMut()>,
    id: i32,
    window: Window,
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.window.clear_timeout_with_handle(self.id);
    }
}

/// Drives a typing machine with window timers and renders into one element.
pub struct WindowDriver {
    window: Window,
    target: Option<Element>,
    machine: Weak<RefCell<TypingMachine<WindowDriver>>>,
}

impl TypingDriver for WindowDriver {
    type Handle = Option<TimerHandle>;

    fn schedule(&mut self, delay_ms: u32, ticket: StepTicket) -> Option<TimerHandle> {
        let machine = self.machine.clone();
        // The step runs as a separate task so the machine can drop this
        // closure while handling it.
        let cb = Closure::once(Box::new(move || deliver(machine, ticket)) as Box<dyn FnOnce()>);

        let timeout = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), timeout)
        {
            Ok(id) => Some(TimerHandle {
                _cb: cb,
                id,
                window: self.window.clone(),
            }),
            Err(err) => {
                log::error!("typing step not scheduled: {}", js_error_text(&err));
                None
            }
        }
    }

    fn cancel(&mut self, handle: Option<TimerHandle>) {
        drop(handle);
    }

    fn render(&mut self, text: &str) {
        if let Some(target) = &self.target {
            target.set_text_content(Some(text));
        }
    }
}

/// Hand `ticket` to the machine on a fresh task.
///
/// Borrows of the machine never span a task boundary, so a busy machine is
/// unexpected. The step is then retried from a zero-delay timeout: a dropped
/// step would leave the pending ticket unanswered and stall the loop.
pub(crate) fn deliver(machine: Weak<RefCell<TypingMachine<WindowDriver>>>, ticket: StepTicket) {
    wasm_bindgen_futures::spawn_local(async move {
        let Some(shared) = machine.upgrade() else {
            return;
        };
        let Ok(mut typing) = shared.try_borrow_mut() else {
            log::warn!("typing machine busy, retrying step {ticket:?}");
            retry_later(machine, ticket);
            return;
        };
        typing.fire(ticket);
    });
}

fn retry_later(machine: Weak<RefCell<TypingMachine<WindowDriver>>>, ticket: StepTicket) {
    let retry = Closure::once_into_js(move || deliver(machine, ticket));
    let scheduled = web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))
        .and_then(|window| {
            window.set_timeout_with_callback_and_timeout_and_arguments_0(retry.unchecked_ref(), 0)
        });
    if let Err(err) = scheduled {
        log::error!("typing step {ticket:?} lost: {}", js_error_text(&err));
    }
}

/// The page's single typing machine, rendering into `target`.
pub fn typing_machine(window: Window, target: Option<Element>, timing: TypingTiming) -> SharedTyping {
    if target.is_none() {
        log::debug!("no typing target on page");
    }
    Rc::new_cyclic(|machine| {
        RefCell::new(TypingMachine::new(
            WindowDriver {
                window,
                target,
                machine: machine.clone(),
            },
            timing,
        ))
    })
}
