//! Main module for the Heat Timer application using Yew.
//! Wires the session hook to the config screen, heats list, countdown and
//! status regions.

use heat_timer::config::{DEFAULT_DELAY_SEC, DEFAULT_HEAT_COUNT, INVALID_HEATS_ALERT};
use heat_timer::utils::validate_heat_count;
use heat_timer::{Screen, SessionError};
use log::{info, warn};
use std::rc::Rc;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

mod components;
mod hooks;

use components::{render_heats, ConfigScreen, CountdownDisplay, SessionStatus};
use hooks::{use_heat_session, use_validated_input};

/// Blocking browser alert for rejected configuration.
fn alert(message: &str) {
    if let Err(e) = gloo_utils::window().alert_with_message(message) {
        warn!("Could not show alert: {:?}", e);
    }
}

fn alert_text(err: &SessionError) -> String {
    match err {
        SessionError::InvalidHeatCount(_) => INVALID_HEATS_ALERT.to_string(),
        other => other.to_string(),
    }
}

/// Primary application component.
#[function_component(App)]
fn app() -> Html {
    let session = use_heat_session();
    let parse_heats: Rc<dyn Fn(&str) -> Result<u32, String>> =
        Rc::new(|text: &str| validate_heat_count(text).map_err(|e| e.to_string()));
    let heat_input = use_validated_input(DEFAULT_HEAT_COUNT, parse_heats);
    let delay_value = use_state(|| format!("{}s", DEFAULT_DELAY_SEC));

    let on_delay_change = {
        let delay_value = delay_value.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            delay_value.set(select.value());
        })
    };

    let on_start = {
        let session = session.clone();
        let heat_text = heat_input.text.clone();
        let set_heat_error = heat_input.set_error.clone();
        let delay_value = delay_value.clone();
        Callback::from(move |_: MouseEvent| {
            match session.start(&heat_text, &delay_value) {
                Ok(()) => set_heat_error.emit(None),
                Err(err) => {
                    if let SessionError::InvalidHeatCount(ref msg) = err {
                        set_heat_error.emit(Some(msg.clone()));
                    }
                    alert(&alert_text(&err));
                }
            }
        })
    };

    let on_reset = {
        let session = session.clone();
        Callback::from(move |_: MouseEvent| {
            info!("Returning to configuration");
            session.reset();
        })
    };

    let on_stop = {
        let session = session.clone();
        Callback::from(move |(heat, lane): (u32, usize)| session.stop_lane(heat, lane))
    };

    let view = session.view();
    let in_session = view.screen != Screen::Config;

    html! {
        <div class="container">
            <h1>{ "Heat Timer" }</h1>

            if !in_session {
                <ConfigScreen
                    heat_text={heat_input.text.clone()}
                    heat_error={heat_input.error.clone()}
                    on_heat_input={heat_input.on_text_input.clone()}
                    on_heat_commit={heat_input.on_commit.clone()}
                    delay_value={(*delay_value).clone()}
                    {on_delay_change}
                    {on_start}
                />
            }

            <SessionStatus complete={view.screen == Screen::Complete} />
            <CountdownDisplay value={view.countdown} />

            { render_heats(&view.heats, &on_stop) }

            <button
                id="reset-session"
                class={classes!("btn-secondary", (!in_session).then_some("hidden"))}
                onclick={on_reset}
            >
                { "Reset" }
            </button>
        </div>
    }
}

/// Entry point: installs the panic hook and logger, then renders the App.
fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
    yew::Renderer::<App>::new().render();
}
