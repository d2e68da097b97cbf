//! Pure Yew view components for the heat timer UI.
//!
//! Components here render from props only; session state and timers live in
//! `hooks::use_heat_session`.

use heat_timer::config::{COUNTDOWN_PLACEHOLDER, DELAY_OPTIONS_SEC, SESSION_COMPLETE_TEXT};
use heat_timer::utils::delay_label;
use heat_timer::{Heat, Lane};
use yew::prelude::*;

/// Heat count input, delay selector and start button.
#[derive(Properties, PartialEq)]
pub struct ConfigScreenProps {
    pub heat_text: String,
    pub heat_error: Option<String>,
    pub on_heat_input: Callback<InputEvent>,
    pub on_heat_commit: Callback<()>,
    pub delay_value: String,
    pub on_delay_change: Callback<Event>,
    pub on_start: Callback<MouseEvent>,
}

#[function_component(ConfigScreen)]
pub fn config_screen(props: &ConfigScreenProps) -> Html {
    html! {
        <div id="config-screen" class="config-screen">
            <div class="form-group">
                <label for="iteration-count">{ "Number of Heats:" }</label>
                <input
                    type="number"
                    id="iteration-count"
                    min="1"
                    value={props.heat_text.clone()}
                    class={if props.heat_error.is_some() { "invalid" } else { "" }}
                    oninput={props.on_heat_input.clone()}
                    onchange={props.on_heat_commit.reform(|_| ())}
                />
                if let Some(ref err) = props.heat_error {
                    <div class="input-error">{ err }</div>
                }
            </div>
            <div class="form-group">
                <label for="delay-select">{ "Delay Between Heats:" }</label>
                <select id="delay-select" onchange={props.on_delay_change.clone()}>
                    { DELAY_OPTIONS_SEC.iter().map(|&secs| {
                        let value = format!("{}s", secs);
                        let selected = value == props.delay_value;
                        html! {
                            <option value={value} selected={selected}>{ delay_label(secs) }</option>
                        }
                    }).collect::<Html>() }
                </select>
            </div>
            <button id="start-session" class="btn-primary" onclick={props.on_start.clone()}>
                { "Start Session" }
            </button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct CountdownProps {
    /// `None` hides the display.
    pub value: Option<u32>,
}

#[function_component(CountdownDisplay)]
pub fn countdown_display(props: &CountdownProps) -> Html {
    let class = classes!("countdown-display", props.value.is_none().then_some("hidden"));
    let text = props
        .value
        .map(|v| v.to_string())
        .unwrap_or_else(|| COUNTDOWN_PLACEHOLDER.to_string());
    html! {
        <div id="countdown-display" {class}>
            { "Next heat in " }
            <span id="countdown-timer">{ text }</span>
            { "s" }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct SessionStatusProps {
    pub complete: bool,
}

#[function_component(SessionStatus)]
pub fn session_status(props: &SessionStatusProps) -> Html {
    let class = classes!("session-status", (!props.complete).then_some("hidden"));
    html! {
        <div id="session-status" {class}>
            <span id="session-status-text">
                { if props.complete { SESSION_COMPLETE_TEXT } else { "" } }
            </span>
        </div>
    }
}

/// Renders one lane's time label and stop control.
fn render_lane(heat: u32, index: usize, lane: &Lane, on_stop: &Callback<(u32, usize)>) -> Html {
    let stopped = lane.is_stopped();
    let onclick = on_stop.reform(move |_: MouseEvent| (heat, index));
    html! {
        <div class="lane">
            <div class="lane-label">{ format!("Lane {}", index + 1) }</div>
            <span
                class={classes!("time-display", stopped.then_some("stopped"))}
                id={format!("time-h{}-l{}", heat, index + 1)}
            >
                { lane.display() }
            </span>
            <button class="stop-btn" disabled={stopped} {onclick}>
                if stopped {
                    <i class="fa-solid fa-check"></i>
                } else {
                    { "Stop" }
                }
            </button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct HeatCardProps {
    pub heat: Heat,
    pub on_stop: Callback<(u32, usize)>,
}

#[function_component(HeatCard)]
pub fn heat_card(props: &HeatCardProps) -> Html {
    let number = props.heat.number();
    html! {
        <div class="heat-card">
            <div class="heat-card-header">{ format!("Heat {}", number) }</div>
            <div class="lanes-container">
                { props.heat.lanes().iter().enumerate().map(|(i, lane)| {
                    render_lane(number, i, lane, &props.on_stop)
                }).collect::<Html>() }
            </div>
        </div>
    }
}

/// Renders the heats list in the order given (newest first on screen).
pub fn render_heats(heats: &[Heat], on_stop: &Callback<(u32, usize)>) -> Html {
    html! {
        <div id="heats-container" class="heats-container">
            { heats.iter().map(|heat| html! {
                <HeatCard key={heat.number()} heat={heat.clone()} on_stop={on_stop.clone()} />
            }).collect::<Html>() }
        </div>
    }
}
