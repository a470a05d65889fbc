// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings page — persistent app configuration.

use std::path::PathBuf;

use dioxus::prelude::*;

use scanwerk_core::{AssemblerKind, ControlPanel, DeliveryMethod};

use crate::services::app_services::AppServices;
use crate::state::AppState;

const DEFAULT_MAIL_SUBJECT: &str = "new scan from jonesbase";
const DEFAULT_MAIL_BODY: &str = "Your scanned document is attached.";
const ABOUT_TITLE: &str = concat!("Scanwerk v", env!("CARGO_PKG_VERSION"));

#[component]
pub fn Settings() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let mut save_msg = use_signal(|| Option::<(bool, String)>::None);

    let config = state.read().config.clone();
    let work_dir = config
        .work_dir
        .as_ref()
        .map(|d| d.display().to_string())
        .unwrap_or_default();
    let recipients = config.recipients.join("\n");

    rsx! {
        div {
            h1 { "Settings" }

            section { style: "margin: 16px 0;",
                h3 { "Scanner" }
                TextRow {
                    label: "SANE device",
                    value: config.device.clone(),
                    on_change: move |v: String| { state.write().config.device = v.trim().to_string(); },
                }
                NumberRow {
                    label: "Niceness",
                    value: config.nice.to_string(),
                    on_change: move |v: String| {
                        if let Ok(n) = v.parse::<i8>() {
                            state.write().config.nice = n;
                        }
                    },
                }
                NumberRow {
                    label: "Scan width (mm)",
                    value: config.geometry.width_mm.to_string(),
                    on_change: move |v: String| {
                        if let Ok(mm) = v.parse::<f32>() {
                            state.write().config.geometry.width_mm = mm;
                        }
                    },
                }
                NumberRow {
                    label: "Scan height (mm)",
                    value: config.geometry.height_mm.to_string(),
                    on_change: move |v: String| {
                        if let Ok(mm) = v.parse::<f32>() {
                            state.write().config.geometry.height_mm = mm;
                        }
                    },
                }
            }

            section { style: "margin: 16px 0;",
                h3 { "Gamma" }
                NumberRow {
                    label: "Gamma",
                    value: config.gamma.gamma.to_string(),
                    on_change: move |v: String| {
                        if let Ok(g) = v.parse::<f32>() {
                            state.write().config.gamma.gamma = g;
                        }
                    },
                }
                NumberRow {
                    label: "Black level",
                    value: config.gamma.black.to_string(),
                    on_change: move |v: String| {
                        if let Ok(level) = v.parse::<u16>() {
                            state.write().config.gamma.black = level;
                        }
                    },
                }
                NumberRow {
                    label: "White level",
                    value: config.gamma.white.to_string(),
                    on_change: move |v: String| {
                        if let Ok(level) = v.parse::<u16>() {
                            state.write().config.gamma.white = level;
                        }
                    },
                }
                NumberRow {
                    label: "Maximum level",
                    value: config.gamma.max_level.to_string(),
                    on_change: move |v: String| {
                        if let Ok(level) = v.parse::<u16>() {
                            state.write().config.gamma.max_level = level;
                        }
                    },
                }
            }

            section { style: "margin: 16px 0;",
                h3 { "Output" }
                div { style: ROW_STYLE,
                    span { "Work directory" }
                    div { style: "display: flex; gap: 8px;",
                        input {
                            style: "width: 200px; padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px;",
                            placeholder: "~/scans",
                            value: "{work_dir}",
                            onchange: move |evt| {
                                let v = evt.value();
                                state.write().config.work_dir =
                                    (!v.trim().is_empty()).then(|| PathBuf::from(v.trim()));
                            },
                        }
                        button {
                            style: "padding: 4px 8px; border-radius: 4px; border: 1px solid #ccc; background: white;",
                            onclick: move |_| {
                                #[cfg(not(any(target_os = "ios", target_os = "android")))]
                                {
                                    if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                                        tracing::info!(path = %dir.display(), "work directory chosen");
                                        state.write().config.work_dir = Some(dir);
                                    }
                                }
                            },
                            "Choose…"
                        }
                    }
                }
                div { style: ROW_STYLE,
                    span { "PDF assembler" }
                    select {
                        style: "padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px;",
                        value: assembler_label(config.assembler),
                        onchange: move |evt| {
                            if let Some(kind) = assembler_from_label(&evt.value()) {
                                state.write().config.assembler = kind;
                            }
                        },
                        option { value: "img2pdf", "img2pdf" }
                        option { value: "native", "built-in" }
                    }
                }
                TextRow {
                    label: "Scan tool",
                    value: config.scan_tool.clone(),
                    on_change: move |v: String| { state.write().config.scan_tool = v.trim().to_string(); },
                }
                TextRow {
                    label: "Gamma tool",
                    value: config.gamma_tool.clone(),
                    on_change: move |v: String| { state.write().config.gamma_tool = v.trim().to_string(); },
                }
                TextRow {
                    label: "Assembly tool",
                    value: config.assembly_tool.clone(),
                    on_change: move |v: String| { state.write().config.assembly_tool = v.trim().to_string(); },
                }
            }

            section { style: "margin: 16px 0;",
                h3 { "Delivery" }
                div { style: ROW_STYLE,
                    span { "After scanning" }
                    select {
                        style: "padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px;",
                        value: config.delivery.label(),
                        onchange: move |evt| {
                            if let Some(method) = delivery_from_label(&evt.value()) {
                                state.write().config.delivery = method;
                            }
                        },
                        option { value: "none", "Keep the PDF here" }
                        option { value: "remote-copy", "Copy to another machine" }
                        option { value: "mail", "Mail to the recipient" }
                    }
                }
                {match config.delivery.clone() {
                    DeliveryMethod::None => rsx! {},
                    DeliveryMethod::RemoteCopy { destination } => rsx! {
                        TextRow {
                            label: "scp destination",
                            value: destination,
                            on_change: move |v: String| {
                                if let DeliveryMethod::RemoteCopy { destination } = &mut state.write().config.delivery {
                                    *destination = v.trim().to_string();
                                }
                            },
                        }
                    },
                    DeliveryMethod::Mail { subject, body, relay } => rsx! {
                        TextRow {
                            label: "Subject",
                            value: subject,
                            on_change: move |v: String| {
                                if let DeliveryMethod::Mail { subject, .. } = &mut state.write().config.delivery {
                                    *subject = v;
                                }
                            },
                        }
                        TextRow {
                            label: "Message",
                            value: body,
                            on_change: move |v: String| {
                                if let DeliveryMethod::Mail { body, .. } = &mut state.write().config.delivery {
                                    *body = v;
                                }
                            },
                        }
                        TextRow {
                            label: "Relay host (optional)",
                            value: relay.unwrap_or_default(),
                            on_change: move |v: String| {
                                if let DeliveryMethod::Mail { relay, .. } = &mut state.write().config.delivery {
                                    *relay = (!v.trim().is_empty()).then(|| v.trim().to_string());
                                }
                            },
                        }
                    },
                }}
                div { style: "padding: 12px 0;",
                    p { style: "margin: 0 0 4px 0;", "Recipients, one per line" }
                    textarea {
                        style: "width: 100%; height: 80px; padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px;",
                        value: "{recipients}",
                        onchange: move |evt| {
                            state.write().config.recipients = parse_recipients(&evt.value());
                        },
                    }
                }
            }

            // Save button
            button {
                style: "width: 100%; padding: 12px; border-radius: 8px; border: none; background: #007aff; color: white; font-size: 16px; margin-top: 8px;",
                onclick: {
                    let svc = svc.clone();
                    move |_| {
                        let config = state.read().config.clone();
                        match svc.save_config(&config) {
                            Ok(()) => {
                                tracing::info!("settings saved");
                                let mut current = state.write();
                                if current.panel.recipients() != config.recipients.as_slice() {
                                    current.panel = ControlPanel::new(config.recipients.clone());
                                }
                                save_msg.set(Some((true, "Settings saved.".into())));
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "failed to save settings");
                                save_msg.set(Some((false, format!("Save failed: {e}"))));
                            }
                        }
                    }
                },
                "Save Settings"
            }
            if let Some((ok, ref msg)) = *save_msg.read() {
                p { style: "color: {save_color(ok)}; font-size: 14px; text-align: center; margin-top: 8px;",
                    "{msg}"
                }
            }

            section { style: "margin: 24px 0;",
                h3 { "About" }
                p { style: "color: #666; font-size: 14px;",
                    "{ABOUT_TITLE}"
                    br {}
                    "Duplex-aware scanning panel for SANE scanners"
                    br {}
                    "PMPL-1.0-or-later"
                }
            }
        }
    }
}

const ROW_STYLE: &str = "display: flex; justify-content: space-between; align-items: center; padding: 12px 0; border-bottom: 1px solid #f0f0f0;";

#[component]
fn TextRow(label: &'static str, value: String, on_change: EventHandler<String>) -> Element {
    rsx! {
        div { style: ROW_STYLE,
            span { "{label}" }
            input {
                style: "width: 240px; padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px;",
                value: "{value}",
                onchange: move |evt| on_change.call(evt.value()),
            }
        }
    }
}

#[component]
fn NumberRow(label: &'static str, value: String, on_change: EventHandler<String>) -> Element {
    rsx! {
        div { style: ROW_STYLE,
            span { "{label}" }
            input {
                r#type: "number",
                style: "width: 80px; padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px; text-align: right;",
                value: "{value}",
                onchange: move |evt| on_change.call(evt.value()),
            }
        }
    }
}

fn save_color(ok: bool) -> &'static str {
    if ok { "#34c759" } else { "#ff3b30" }
}

fn assembler_label(kind: AssemblerKind) -> &'static str {
    match kind {
        AssemblerKind::Img2Pdf => "img2pdf",
        AssemblerKind::Native => "native",
    }
}

fn assembler_from_label(label: &str) -> Option<AssemblerKind> {
    match label {
        "img2pdf" => Some(AssemblerKind::Img2Pdf),
        "native" => Some(AssemblerKind::Native),
        _ => None,
    }
}

fn delivery_from_label(label: &str) -> Option<DeliveryMethod> {
    match label {
        "none" => Some(DeliveryMethod::None),
        "remote-copy" => Some(DeliveryMethod::RemoteCopy {
            destination: String::new(),
        }),
        "mail" => Some(DeliveryMethod::Mail {
            subject: DEFAULT_MAIL_SUBJECT.into(),
            body: DEFAULT_MAIL_BODY.into(),
            relay: None,
        }),
        _ => None,
    }
}

/// One address per line; blank lines and surrounding space dropped.
fn parse_recipients(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
