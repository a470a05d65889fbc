// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Control panel — pick source, sides, resolution, sheet count and recipient,
// then scan.
//
// Every scan goes through a modal: confirm, "Scanning..." while the pass runs
// on the blocking worker, the flip prompt between duplex passes, and finally
// the outcome. The panel controls are disabled while any modal is open.

use dioxus::prelude::*;

use scanwerk_core::error::Result;
use scanwerk_core::types::{Resolution, ScanSource, Sides};
use scanwerk_core::ScanwerkError;
use scanwerk_scan::SessionStep;

use crate::services::app_services::AppServices;
use crate::state::{AppState, Modal, Notice};

#[component]
pub fn Panel() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let device = svc.config().device;

    let busy = state.read().is_busy();
    let sides = state.read().panel.sides();
    let page_text = state.read().panel.page_text().to_string();
    let recipient = state.read().panel.recipient().unwrap_or_default().to_string();
    let recipients = state.read().panel.recipients().to_vec();
    let last_scan = state.read().last_record.as_ref().map(|r| {
        format!("Last scan: {} page(s) → {}", r.pages, r.output.display())
    });

    rsx! {
        div {
            h1 { "Scanwerk" }
            p { style: "color: #666;", "{device}" }

            // Source actions
            div { style: "display: flex; gap: 12px; margin: 16px 0;",
                SourceButton {
                    label: "Scan from feeder",
                    color: "#34c759",
                    disabled: busy,
                    on_press: move |_| { state.write().modal = Modal::ConfirmStart(ScanSource::Feeder); },
                }
                SourceButton {
                    label: "Scan from glass",
                    color: "#ff9500",
                    disabled: busy,
                    on_press: move |_| { state.write().modal = Modal::ConfirmStart(ScanSource::Flatbed); },
                }
            }

            section { style: "margin: 16px 0;",
                h3 { "Feeder" }
                div { style: "display: flex; gap: 8px; align-items: center;",
                    ChoiceButton {
                        label: "1-sided".to_string(),
                        selected: sides == Sides::OneSided,
                        disabled: busy,
                        on_press: move |_| state.write().panel.select_sides(Sides::OneSided),
                    }
                    ChoiceButton {
                        label: "2-sided".to_string(),
                        selected: sides == Sides::TwoSided,
                        disabled: busy,
                        on_press: move |_| state.write().panel.select_sides(Sides::TwoSided),
                    }

                    span { style: "margin-left: 16px;", "sheets" }
                    button {
                        style: "width: 32px; height: 32px; border-radius: 6px; border: 1px solid #ccc; background: white;",
                        disabled: busy,
                        onclick: move |_| state.write().panel.decrement_pages(),
                        "−"
                    }
                    input {
                        style: "width: 56px; padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px; text-align: center;",
                        disabled: busy,
                        value: "{page_text}",
                        oninput: move |evt| state.write().panel.set_page_text(evt.value()),
                    }
                    button {
                        style: "width: 32px; height: 32px; border-radius: 6px; border: 1px solid #ccc; background: white;",
                        disabled: busy,
                        onclick: move |_| state.write().panel.increment_pages(),
                        "+"
                    }
                }
            }

            section { style: "margin: 16px 0;",
                h3 { "Resolution" }
                div { style: "display: flex; flex-wrap: wrap; gap: 8px;",
                    for resolution in Resolution::ALL {
                        ChoiceButton {
                            key: "{resolution.dpi()}",
                            label: resolution.to_string(),
                            selected: state.read().panel.is_resolution_selected(resolution),
                            disabled: busy,
                            on_press: move |_| state.write().panel.select_resolution(resolution),
                        }
                    }
                }
            }

            section { style: "margin: 16px 0;",
                h3 { "Send to" }
                div { style: "display: flex; gap: 8px;",
                    input {
                        style: "flex: 1; padding: 6px 8px; border: 1px solid #ccc; border-radius: 4px;",
                        disabled: busy,
                        value: "{recipient}",
                        oninput: move |evt| state.write().panel.set_recipient(evt.value()),
                    }
                    select {
                        style: "padding: 6px 8px; border: 1px solid #ccc; border-radius: 4px;",
                        disabled: busy,
                        value: "{recipient}",
                        onchange: move |evt| state.write().panel.set_recipient(evt.value()),
                        for address in recipients {
                            option { key: "{address}", value: "{address}", "{address}" }
                        }
                    }
                }
            }

            if let Some(line) = last_scan {
                p { style: "color: #666; font-size: 14px;", "{line}" }
            }

            ScanModal {}
        }
    }
}

#[component]
fn SourceButton(
    label: &'static str,
    color: &'static str,
    disabled: bool,
    on_press: EventHandler<()>,
) -> Element {
    rsx! {
        button {
            style: "flex: 1; padding: 24px 12px; border-radius: 12px; border: 2px solid #333; background: {color}; color: white; font-size: 18px; font-weight: bold;",
            disabled: disabled,
            onclick: move |_| on_press.call(()),
            "{label}"
        }
    }
}

#[component]
fn ChoiceButton(label: String, selected: bool, disabled: bool, on_press: EventHandler<()>) -> Element {
    let (background, color) = if selected {
        ("#007aff", "white")
    } else {
        ("white", "#333")
    };
    rsx! {
        button {
            style: "padding: 8px 12px; border-radius: 8px; border: 1px solid #007aff; background: {background}; color: {color};",
            disabled: disabled,
            onclick: move |_| on_press.call(()),
            "{label}"
        }
    }
}

/// The modal layer over the panel; renders nothing when closed.
#[component]
fn ScanModal() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let modal = state.read().modal.clone();

    match modal {
        Modal::Closed => rsx! {},
        Modal::ConfirmStart(source) => {
            let prompt = match source {
                ScanSource::Flatbed => "Place the page face down on the glass.".to_string(),
                ScanSource::Feeder => format!(
                    "Load {} sheet(s) into the feeder, first page on top.",
                    state.read().panel.page_text()
                ),
            };
            rsx! {
                Overlay {
                    p { "{prompt}" }
                    div { style: "display: flex; gap: 8px; justify-content: center;",
                        DialogButton {
                            label: "Cancel",
                            on_press: move |_| { state.write().modal = Modal::Closed; },
                        }
                        DialogButton {
                            label: "OK",
                            on_press: move |_| start_scan(state, svc.clone(), source),
                        }
                    }
                }
            }
        }
        Modal::Scanning(source) => rsx! {
            Overlay {
                p { "Scanning from {source.label()}..." }
            }
        },
        Modal::AwaitingFlip(prompt) => rsx! {
            Overlay {
                p { "{prompt}" }
                DialogButton {
                    label: "OK",
                    on_press: move |_| continue_after_flip(state, svc.clone()),
                }
            }
        },
        Modal::Notice(notice) => {
            let title_color = notice.title_color();
            let Notice {
                title,
                message,
                suggestion,
                retry,
                ..
            } = notice;
            rsx! {
                Overlay {
                    h3 { style: "color: {title_color};", "{title}" }
                    p { "{message}" }
                    if let Some(suggestion) = suggestion {
                        p { style: "color: #666; font-size: 14px;", "{suggestion}" }
                    }
                    div { style: "display: flex; gap: 8px; justify-content: center;",
                        if let Some(source) = retry {
                            DialogButton {
                                label: "Try again",
                                on_press: move |_| { state.write().modal = Modal::ConfirmStart(source); },
                            }
                        }
                        DialogButton {
                            label: "OK",
                            on_press: move |_| { state.write().modal = Modal::Closed; },
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn Overlay(children: Element) -> Element {
    rsx! {
        div { style: "position: fixed; inset: 0; background: rgba(0, 0, 0, 0.4); display: flex; align-items: center; justify-content: center;",
            div { style: "background: white; border-radius: 12px; padding: 24px; min-width: 320px; max-width: 420px; text-align: center; font-size: 16px;",
                {children}
            }
        }
    }
}

#[component]
fn DialogButton(label: &'static str, on_press: EventHandler<()>) -> Element {
    rsx! {
        button {
            style: "min-width: 96px; padding: 10px 16px; border-radius: 8px; border: none; background: #007aff; color: white; font-size: 16px; margin-top: 8px;",
            onclick: move |_| on_press.call(()),
            "{label}"
        }
    }
}

/// Snapshot the panel into a job and run its first pass.
fn start_scan(mut state: Signal<AppState>, svc: AppServices, source: ScanSource) {
    let job = svc.build_job(&state.read().panel, source);
    let job = match job {
        Ok(job) => job,
        Err(e) => {
            tracing::warn!(error = %e, "scan not started");
            state.write().modal = Modal::Notice(Notice::from_error(&e, source));
            return;
        }
    };

    tracing::info!(
        job = %job.id,
        source = source.label(),
        pages = job.expected_pages(),
        resolution = %job.resolution,
        "starting scan"
    );
    state.write().modal = Modal::Scanning(source);
    spawn(async move {
        let step = svc.begin_scan(job).await;
        show_step(state, source, step);
    });
}

fn continue_after_flip(mut state: Signal<AppState>, svc: AppServices) {
    state.write().modal = Modal::Scanning(ScanSource::Feeder);
    spawn(async move {
        let step = svc.confirm_flip().await;
        show_step(state, ScanSource::Feeder, step);
    });
}

fn show_step(mut state: Signal<AppState>, source: ScanSource, step: Result<SessionStep>) {
    let modal = match step {
        Ok(SessionStep::AwaitingFlip { prompt }) => Modal::AwaitingFlip(prompt),
        Ok(SessionStep::Finished(record)) => {
            let notice = Notice::from_record(&record);
            state.write().last_record = Some(record);
            Modal::Notice(notice)
        }
        Ok(SessionStep::ScannerFault { exit_code }) => {
            Modal::Notice(Notice::from_error(&ScanwerkError::ScannerFault { exit_code }, source))
        }
        Err(e) => {
            tracing::error!(error = %e, "scan job failed");
            Modal::Notice(Notice::from_error(&e, source))
        }
    };
    state.write().modal = modal;
}
