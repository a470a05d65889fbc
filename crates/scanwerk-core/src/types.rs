// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Scanwerk scan jobs.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ScanwerkError};

/// Batch index base for the front (or only) feeder pass; files start at base + 1.
pub const FRONT_BATCH_BASE: u32 = 1000;

/// Batch index base for the back feeder pass of a duplex job.
pub const BACK_BATCH_BASE: u32 = 2000;

/// Largest number of sheets a single feeder job may request.
///
/// Renumbered pages occupy positions `1..=2 * MAX_SHEETS`, which must stay
/// below the first front-pass batch index.
pub const MAX_SHEETS: u32 = 499;

/// Unique identifier for a scan job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the paper is fed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanSource {
    /// The flatbed glass. Always a single one-sided page.
    Flatbed,
    /// The automatic document feeder.
    Feeder,
}

impl ScanSource {
    /// Value for `scanimage --source`, or `None` to keep the device default.
    pub fn sane_source(&self) -> Option<&'static str> {
        match self {
            Self::Flatbed => None,
            Self::Feeder => Some("Automatic Document Feeder"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Flatbed => "glass",
            Self::Feeder => "feeder",
        }
    }
}

/// One- or two-sided feeder scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sides {
    #[default]
    OneSided,
    /// Two feeder passes with the stack turned over in between.
    TwoSided,
}

/// Scan resolutions offered by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    Dpi75,
    Dpi150,
    Dpi300,
    Dpi600,
    Dpi1200,
    Dpi2400,
}

impl Resolution {
    /// Every selectable resolution, lowest first.
    pub const ALL: [Resolution; 6] = [
        Self::Dpi75,
        Self::Dpi150,
        Self::Dpi300,
        Self::Dpi600,
        Self::Dpi1200,
        Self::Dpi2400,
    ];

    pub fn dpi(&self) -> u32 {
        match self {
            Self::Dpi75 => 75,
            Self::Dpi150 => 150,
            Self::Dpi300 => 300,
            Self::Dpi600 => 600,
            Self::Dpi1200 => 1200,
            Self::Dpi2400 => 2400,
        }
    }

    /// Look up a resolution by its dpi value.
    pub fn from_dpi(dpi: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.dpi() == dpi)
            .ok_or(ScanwerkError::UnsupportedResolution(dpi))
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} dpi", self.dpi())
    }
}

/// Number of sheets in a feeder job, always within `1..=MAX_SHEETS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageCount(u32);

impl PageCount {
    pub const ONE: PageCount = PageCount(1);

    pub fn new(sheets: u32) -> Result<Self> {
        if (1..=MAX_SHEETS).contains(&sheets) {
            Ok(Self(sheets))
        } else {
            Err(ScanwerkError::InvalidPageCount(format!(
                "{sheets} sheets (must be between 1 and {MAX_SHEETS})"
            )))
        }
    }

    /// Parse the text of the page-count field.
    pub fn parse(text: &str) -> Result<Self> {
        let sheets = text
            .trim()
            .parse::<u32>()
            .map_err(|_| ScanwerkError::InvalidPageCount(format!("{text:?} is not a number")))?;
        Self::new(sheets)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for PageCount {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u32> for PageCount {
    type Error = ScanwerkError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PageCount> for u32 {
    fn from(count: PageCount) -> Self {
        count.0
    }
}

/// Inputs to the gamma-table generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GammaParams {
    /// Gamma factor for the non-linear response.
    pub gamma: f32,
    /// Maximum level still treated as black.
    pub black: u16,
    /// Threshold level for white.
    pub white: u16,
    /// Full-scale level of the table.
    pub max_level: u16,
}

impl Default for GammaParams {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            black: 100,
            white: 2000,
            max_level: 4095,
        }
    }
}

/// Scan area in millimetres, measured from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl Default for ScanGeometry {
    fn default() -> Self {
        Self {
            width_mm: 216.0,
            height_mm: 280.0,
        }
    }
}

/// Everything one scan needs, snapshotted when the user starts it.
///
/// A job is never mutated once scanning begins; the panel builds a new one
/// for every scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanJob {
    pub id: JobId,
    /// SANE device name, e.g. `pixma:MX920_jonesscanner`.
    pub device: String,
    pub source: ScanSource,
    pub sides: Sides,
    pub resolution: Resolution,
    pub page_count: PageCount,
    pub gamma: GammaParams,
    pub geometry: ScanGeometry,
    /// Niceness the scan tool runs at.
    pub nice: i8,
    /// Delivery address, if any.
    pub recipient: Option<String>,
    /// Capture time; names the output PDF.
    pub created_at: DateTime<Utc>,
}

impl ScanJob {
    pub fn new(device: impl Into<String>, source: ScanSource) -> Self {
        Self {
            id: JobId::new(),
            device: device.into(),
            source,
            sides: Sides::OneSided,
            resolution: Resolution::default(),
            page_count: PageCount::ONE,
            gamma: GammaParams::default(),
            geometry: ScanGeometry::default(),
            nice: 18,
            recipient: None,
            created_at: Utc::now(),
        }
    }

    /// Two-sided only sticks for feeder jobs.
    pub fn with_sides(mut self, sides: Sides) -> Self {
        self.sides = match self.source {
            ScanSource::Flatbed => Sides::OneSided,
            ScanSource::Feeder => sides,
        };
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_page_count(mut self, page_count: PageCount) -> Self {
        self.page_count = page_count;
        self
    }

    pub fn with_gamma(mut self, gamma: GammaParams) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_geometry(mut self, geometry: ScanGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_nice(mut self, nice: i8) -> Self {
        self.nice = nice;
        self
    }

    pub fn with_recipient(mut self, recipient: Option<String>) -> Self {
        self.recipient = recipient;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn is_duplex(&self) -> bool {
        self.source == ScanSource::Feeder && self.sides == Sides::TwoSided
    }

    /// Sheets fed per pass. The glass always holds one.
    pub fn sheets(&self) -> u32 {
        match self.source {
            ScanSource::Flatbed => 1,
            ScanSource::Feeder => self.page_count.get(),
        }
    }

    /// Pages in the finished document.
    pub fn expected_pages(&self) -> u32 {
        if self.is_duplex() {
            self.sheets() * 2
        } else {
            self.sheets()
        }
    }

    /// `scan-<unix seconds>.pdf`, from the capture time.
    pub fn output_file_name(&self) -> String {
        format!("scan-{}.pdf", self.created_at.timestamp())
    }
}

/// What happened to the finished PDF after it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryOutcome {
    /// No delivery configured; the PDF stays in the work directory.
    Kept,
    Delivered { method: String, destination: String },
    /// Delivery failed. The PDF is still in the work directory.
    Failed { method: String, reason: String },
}

/// A completed scan job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub job_id: JobId,
    pub output: PathBuf,
    pub pages: u32,
    /// SHA-256 of the written PDF.
    pub document_hash: String,
    pub delivery: DeliveryOutcome,
    pub completed_at: DateTime<Utc>,
}
