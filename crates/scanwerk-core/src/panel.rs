// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Control panel model — the selections the UI shows, independent of any
// widget toolkit. The UI only renders this and forwards clicks.

use crate::config::AppConfig;
use crate::error::Result;
use crate::types::{MAX_SHEETS, PageCount, Resolution, ScanJob, ScanSource, Sides};

/// Current selections on the control panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPanel {
    sides: Sides,
    resolution: Resolution,
    /// Raw text of the sheet-count field; users may type into it.
    page_text: String,
    recipients: Vec<String>,
    recipient: Option<String>,
}

impl ControlPanel {
    /// One-sided, 75 dpi, one sheet, first recipient.
    pub fn new(recipients: Vec<String>) -> Self {
        let recipient = recipients.first().cloned();
        Self {
            sides: Sides::OneSided,
            resolution: Resolution::default(),
            page_text: "1".into(),
            recipients,
            recipient,
        }
    }

    // -- Sides ----------------------------------------------------------------

    pub fn sides(&self) -> Sides {
        self.sides
    }

    pub fn select_sides(&mut self, sides: Sides) {
        self.sides = sides;
    }

    // -- Resolution -----------------------------------------------------------

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Selecting one resolution deselects every other.
    pub fn select_resolution(&mut self, resolution: Resolution) {
        self.resolution = resolution;
    }

    pub fn is_resolution_selected(&self, resolution: Resolution) -> bool {
        self.resolution == resolution
    }

    // -- Sheet count ----------------------------------------------------------

    pub fn page_text(&self) -> &str {
        &self.page_text
    }

    /// Manual entry. Not validated until the next step or scan.
    pub fn set_page_text(&mut self, text: impl Into<String>) {
        self.page_text = text.into();
    }

    pub fn increment_pages(&mut self) {
        let next = match self.stepped_from() {
            Some(n) => n.saturating_add(1).min(MAX_SHEETS),
            None => 1,
        };
        self.page_text = next.to_string();
    }

    pub fn decrement_pages(&mut self) {
        let next = match self.stepped_from() {
            Some(n) => n.saturating_sub(1).max(1),
            None => 1,
        };
        self.page_text = next.to_string();
    }

    /// The field's value pulled into `1..=MAX_SHEETS`, or `None` when it
    /// is not a positive number.
    fn stepped_from(&self) -> Option<u32> {
        let text = self.page_text.trim();
        match text.parse::<u64>() {
            Ok(0) => None,
            Ok(n) => Some(u32::try_from(n).unwrap_or(MAX_SHEETS).min(MAX_SHEETS)),
            // All digits but wider than u64: still a huge positive count.
            Err(_) if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => {
                Some(MAX_SHEETS)
            }
            Err(_) => None,
        }
    }

    pub fn page_count(&self) -> Result<PageCount> {
        PageCount::parse(&self.page_text)
    }

    // -- Recipient ------------------------------------------------------------

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    pub fn recipient(&self) -> Option<&str> {
        self.recipient.as_deref()
    }

    /// Pick from the list or type a new address; blank clears it.
    pub fn set_recipient(&mut self, recipient: impl Into<String>) {
        let recipient = recipient.into();
        let trimmed = recipient.trim();
        self.recipient = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    // -- Job construction -----------------------------------------------------

    /// Snapshot the panel into a fresh job for `source`.
    ///
    /// The sheet count only matters for the feeder, so a glass scan never
    /// fails on a garbled count field.
    pub fn build_job(&self, source: ScanSource, config: &AppConfig) -> Result<ScanJob> {
        let page_count = match source {
            ScanSource::Flatbed => PageCount::ONE,
            ScanSource::Feeder => self.page_count()?,
        };
        Ok(ScanJob::new(config.device.clone(), source)
            .with_sides(self.sides)
            .with_resolution(self.resolution)
            .with_page_count(page_count)
            .with_gamma(config.gamma)
            .with_geometry(config.geometry)
            .with_nice(config.nice)
            .with_recipient(self.recipient.clone()))
    }
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new(AppConfig::default().recipients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanwerkError;

    #[test]
    fn defaults_match_a_fresh_panel() {
        let panel = ControlPanel::new(vec!["a@example.org".into(), "b@example.org".into()]);
        assert_eq!(panel.sides(), Sides::OneSided);
        assert_eq!(panel.resolution(), Resolution::Dpi75);
        assert_eq!(panel.page_text(), "1");
        assert_eq!(panel.recipient(), Some("a@example.org"));
    }

    #[test]
    fn exactly_one_resolution_is_selected() {
        let mut panel = ControlPanel::default();
        for chosen in Resolution::ALL {
            panel.select_resolution(chosen);
            let selected: Vec<_> = Resolution::ALL
                .into_iter()
                .filter(|r| panel.is_resolution_selected(*r))
                .collect();
            assert_eq!(selected, vec![chosen]);
            assert_eq!(panel.resolution(), chosen);
        }
    }

    #[test]
    fn decrement_at_one_stays_at_one() {
        let mut panel = ControlPanel::default();
        panel.decrement_pages();
        assert_eq!(panel.page_text(), "1");
        panel.increment_pages();
        panel.increment_pages();
        assert_eq!(panel.page_text(), "3");
        panel.decrement_pages();
        assert_eq!(panel.page_text(), "2");
    }

    #[test]
    fn garbage_resets_on_next_step() {
        let mut panel = ControlPanel::default();
        panel.set_page_text("lots");
        assert!(panel.page_count().is_err());
        panel.increment_pages();
        assert_eq!(panel.page_text(), "1");

        panel.set_page_text("x");
        panel.decrement_pages();
        assert_eq!(panel.page_text(), "1");

        panel.set_page_text("-4");
        panel.increment_pages();
        assert_eq!(panel.page_text(), "1");
    }

    #[test]
    fn stepper_never_goes_below_one_or_above_max() {
        let mut panel = ControlPanel::default();
        for _ in 0..10 {
            panel.decrement_pages();
            assert!(panel.page_count().unwrap().get() >= 1);
        }
        panel.set_page_text(MAX_SHEETS.to_string());
        panel.increment_pages();
        assert_eq!(panel.page_count().unwrap().get(), MAX_SHEETS);
    }

    #[test]
    fn huge_entries_step_within_bounds() {
        let mut panel = ControlPanel::default();
        panel.set_page_text(i64::MAX.to_string());
        panel.increment_pages();
        assert_eq!(panel.page_text(), MAX_SHEETS.to_string());

        panel.set_page_text(i64::MAX.to_string());
        panel.decrement_pages();
        assert_eq!(panel.page_text(), (MAX_SHEETS - 1).to_string());

        panel.set_page_text("99999999999999999999999999");
        panel.increment_pages();
        assert_eq!(panel.page_text(), MAX_SHEETS.to_string());

        panel.set_page_text(u32::MAX.to_string());
        panel.decrement_pages();
        assert_eq!(panel.page_text(), (MAX_SHEETS - 1).to_string());

        panel.set_page_text(i64::MIN.to_string());
        panel.increment_pages();
        assert_eq!(panel.page_text(), "1");
        panel.set_page_text(i64::MIN.to_string());
        panel.decrement_pages();
        assert_eq!(panel.page_text(), "1");
    }

    #[test]
    fn feeder_job_needs_a_valid_count_but_glass_does_not() {
        let config = AppConfig::default();
        let mut panel = ControlPanel::default();
        panel.set_page_text("??");
        assert!(matches!(
            panel.build_job(ScanSource::Feeder, &config),
            Err(ScanwerkError::InvalidPageCount(_))
        ));
        let job = panel.build_job(ScanSource::Flatbed, &config).unwrap();
        assert_eq!(job.sheets(), 1);
    }

    #[test]
    fn job_snapshots_panel_and_config() {
        let config = AppConfig::default();
        let mut panel = ControlPanel::new(config.recipients.clone());
        panel.select_sides(Sides::TwoSided);
        panel.select_resolution(Resolution::Dpi300);
        panel.set_page_text("4");
        panel.set_recipient("someone@example.org ");

        let job = panel.build_job(ScanSource::Feeder, &config).unwrap();
        assert!(job.is_duplex());
        assert_eq!(job.resolution, Resolution::Dpi300);
        assert_eq!(job.page_count.get(), 4);
        assert_eq!(job.device, config.device);
        assert_eq!(job.recipient.as_deref(), Some("someone@example.org"));

        // Later panel edits do not reach the job already built.
        panel.select_resolution(Resolution::Dpi600);
        assert_eq!(job.resolution, Resolution::Dpi300);
    }

    #[test]
    fn blank_recipient_clears_selection() {
        let mut panel = ControlPanel::default();
        panel.set_recipient("   ");
        assert_eq!(panel.recipient(), None);
    }
}
