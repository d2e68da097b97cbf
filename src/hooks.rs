use heat_timer::web_timers::GlooTimers;
use heat_timer::{Heat, SchedulePolicy, Screen, SessionController, SessionError};
use log::debug;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Holds the state and callbacks for a validated input field.
#[derive(Clone)]
pub struct ValidatedInput {
    /// The current text content of the input field.
    pub text: String,
    pub error: Option<String>,
    pub on_text_input: Callback<InputEvent>,
    /// Validate the current text, typically from `onchange`.
    pub on_commit: Callback<()>,
    /// Report a validation failure that happened elsewhere (e.g. on submit).
    pub set_error: Callback<Option<String>>,
}

/// Custom hook to manage state for a validated input field.
#[hook]
pub fn use_validated_input<T: std::fmt::Display + 'static>(
    initial_value: T,
    parse_and_validate: Rc<dyn Fn(&str) -> Result<T, String>>,
) -> ValidatedInput {
    let text_handle: UseStateHandle<String> = use_state(|| initial_value.to_string());
    let error_handle: UseStateHandle<Option<String>> = use_state(|| None::<String>);

    let on_text_input = {
        let text_setter = text_handle.clone();
        let error_setter = error_handle.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            text_setter.set(input.value());
            error_setter.set(None);
        })
    };

    let on_commit = {
        let current_text = text_handle.clone();
        let text_setter = text_handle.clone();
        let error_setter = error_handle.clone();
        Callback::from(move |_| match parse_and_validate(&current_text) {
            Ok(parsed) => {
                text_setter.set(parsed.to_string()); // canonical form
                error_setter.set(None);
            }
            Err(err_msg) => error_setter.set(Some(err_msg)),
        })
    };

    let set_error = {
        let error_setter = error_handle.clone();
        Callback::from(move |err: Option<String>| error_setter.set(err))
    };

    ValidatedInput {
        text: (*text_handle).clone(),
        error: (*error_handle).clone(),
        on_text_input,
        on_commit,
        set_error,
    }
}

type SharedController = Rc<RefCell<SessionController<GlooTimers>>>;

/// What the view needs from the session on one render.
pub struct SessionView {
    pub screen: Screen,
    /// Newest heat first, matching the card order on screen.
    pub heats: Vec<Heat>,
    pub countdown: Option<u32>,
}

/// Handle to the page's session controller.
///
/// Every mutation goes through here so the controller borrow is released
/// before a re-render is requested.
#[derive(Clone)]
pub struct HeatSession {
    controller: SharedController,
    update: UseForceUpdateHandle,
}

impl HeatSession {
    pub fn start(&self, heats: &str, delay: &str) -> Result<(), SessionError> {
        let result = self.controller.borrow_mut().start_from_input(
            heats,
            delay,
            SchedulePolicy::Chained,
            js_sys::Date::now(),
        );
        self.update.force_update();
        result
    }

    pub fn stop_lane(&self, heat: u32, lane: usize) {
        let result = self
            .controller
            .borrow_mut()
            .stop_lane(heat, lane, js_sys::Date::now());
        if let Err(e) = result {
            debug!("Stop ignored: {}", e);
        }
        self.update.force_update();
    }

    pub fn reset(&self) {
        self.controller.borrow_mut().reset();
        self.update.force_update();
    }

    pub fn view(&self) -> SessionView {
        let controller = self.controller.borrow();
        let screen = controller.screen();
        let session = controller.session();
        let heats = session
            .map(|s| s.heats().iter().rev().cloned().collect())
            .unwrap_or_default();
        let countdown = session.and_then(|s| s.countdown());
        SessionView {
            screen,
            heats,
            countdown,
        }
    }
}

fn build_controller(update: UseForceUpdateHandle) -> SharedController {
    Rc::new_cyclic(|weak: &Weak<RefCell<SessionController<GlooTimers>>>| {
        let weak = weak.clone();
        let timers = GlooTimers::new(move |id, event| {
            let Some(controller) = weak.upgrade() else {
                return;
            };
            controller
                .borrow_mut()
                .on_timer(id, event, js_sys::Date::now());
            update.force_update();
        });
        RefCell::new(SessionController::new(timers))
    })
}

/// Owns one [`SessionController`] for the lifetime of the component and
/// resets it on unmount so no timer outlives the view.
#[hook]
pub fn use_heat_session() -> HeatSession {
    let update = use_force_update();
    let controller = {
        let update = update.clone();
        use_memo((), move |_| build_controller(update))
    };
    let controller: SharedController = (*controller).clone();

    {
        let controller = controller.clone();
        use_effect_with((), move |_| {
            move || {
                controller.borrow_mut().reset();
            }
        });
    }

    HeatSession { controller, update }
}
