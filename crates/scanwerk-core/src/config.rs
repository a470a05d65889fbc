// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanwerkError};
use crate::types::{GammaParams, ScanGeometry};

/// How page images become a PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssemblerKind {
    /// Shell out to `img2pdf`.
    #[default]
    Img2Pdf,
    /// Decode the pages in-process and write the PDF with `printpdf`.
    Native,
}

/// What to do with a finished PDF.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeliveryMethod {
    /// Leave it in the work directory.
    #[default]
    None,
    /// `scp` the PDF to `destination` (e.g. `user@host:`).
    RemoteCopy { destination: String },
    /// Mail the PDF as an attachment to the selected recipient.
    ///
    /// With a `relay`, the PDF is copied there first and `mail` runs on the
    /// relay over `ssh`.
    Mail {
        subject: String,
        body: String,
        relay: Option<String>,
    },
}

impl DeliveryMethod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::RemoteCopy { .. } => "remote-copy",
            Self::Mail { .. } => "mail",
        }
    }
}

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SANE device name passed to `scanimage -d`.
    pub device: String,
    /// Niceness of the scan process.
    pub nice: i8,
    /// Scratch space for batch files and destination for PDFs.
    /// `None` means `$HOME/scans`.
    pub work_dir: Option<PathBuf>,
    pub scan_tool: String,
    pub gamma_tool: String,
    pub assembly_tool: String,
    pub assembler: AssemblerKind,
    pub gamma: GammaParams,
    pub geometry: ScanGeometry,
    /// Candidate recipients; the first is preselected.
    pub recipients: Vec<String>,
    pub delivery: DeliveryMethod,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device: "pixma:MX920_jonesscanner".into(),
            nice: 18,
            work_dir: None,
            scan_tool: "scanimage".into(),
            gamma_tool: "gamma4scanimage".into(),
            assembly_tool: "img2pdf".into(),
            assembler: AssemblerKind::default(),
            gamma: GammaParams::default(),
            geometry: ScanGeometry::default(),
            recipients: vec![
                "rjones30@gmail.com".into(),
                "carolbj30@gmail.com".into(),
                "estherpjones@gmail.com".into(),
            ],
            delivery: DeliveryMethod::default(),
        }
    }
}

impl AppConfig {
    /// Resolve the work directory, falling back to `$HOME/scans`.
    pub fn resolved_work_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.work_dir {
            return Ok(dir.clone());
        }
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join("scans"))
            .ok_or_else(|| ScanwerkError::Config("HOME is not set and no work_dir configured".into()))
    }

    /// Reject settings that can never produce a scan.
    pub fn validate(&self) -> Result<()> {
        if self.device.trim().is_empty() {
            return Err(ScanwerkError::Config("scanner device is empty".into()));
        }
        for (name, tool) in [
            ("scan_tool", &self.scan_tool),
            ("gamma_tool", &self.gamma_tool),
            ("assembly_tool", &self.assembly_tool),
        ] {
            if tool.trim().is_empty() {
                return Err(ScanwerkError::Config(format!("{name} is empty")));
            }
        }
        let gamma = &self.gamma;
        if gamma.gamma <= 0.0 || gamma.black >= gamma.white || gamma.white > gamma.max_level {
            return Err(ScanwerkError::Config(format!(
                "gamma settings must satisfy gamma > 0 and black < white <= max ({gamma:?})"
            )));
        }
        if self.geometry.width_mm <= 0.0 || self.geometry.height_mm <= 0.0 {
            return Err(ScanwerkError::Config("scan area must be larger than zero".into()));
        }
        if let DeliveryMethod::RemoteCopy { destination } = &self.delivery
            && destination.trim().is_empty()
        {
            return Err(ScanwerkError::Config("remote copy destination is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        AppConfig::default().validate().expect("default config");
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "device": "test:0", "assembler": "Native" }"#).unwrap();
        assert_eq!(config.device, "test:0");
        assert_eq!(config.assembler, AssemblerKind::Native);
        assert_eq!(config.scan_tool, "scanimage");
        assert_eq!(config.delivery, DeliveryMethod::None);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = AppConfig {
            work_dir: Some("/tmp/scans".into()),
            delivery: DeliveryMethod::Mail {
                subject: "new scan".into(),
                body: "Your scanned document is attached.".into(),
                relay: Some("piggy@gluey".into()),
            },
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn inverted_gamma_levels_are_rejected() {
        let mut config = AppConfig::default();
        config.gamma.black = 3000;
        assert!(matches!(config.validate(), Err(ScanwerkError::Config(_))));
    }

    #[test]
    fn explicit_work_dir_wins() {
        let config = AppConfig {
            work_dir: Some("/srv/scans".into()),
            ..Default::default()
        };
        assert_eq!(config.resolved_work_dir().unwrap(), PathBuf::from("/srv/scans"));
    }
}
