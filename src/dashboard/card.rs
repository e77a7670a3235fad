//! Presentation of a single tenant

use log::{error, info};
use std::fmt;

use crate::api::{AdminApi, TenantRecord, TierName};

pub const NO_TIER: &str = "No Tier";
pub const NO_RECORDING_DATA: &str = "No recording data";

pub const SUCCESS_COLOR: &str = "#52c41a";
pub const FAILURE_COLOR: &str = "#f5222d";

/// A tier button on the card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierButton {
    pub tier: TierName,
    /// Highlighted as the current tier
    pub selected: bool,
    pub disabled: bool,
}

/// One slice of the recordings chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSlice {
    pub kind: &'static str,
    pub value: u64,
    pub color: &'static str,
    /// Hidden for empty slices
    pub label: Option<String>,
}

/// Successful vs. failed recordings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingBreakdown {
    pub total: u64,
    pub slices: [ChartSlice; 2],
}

fn slice(kind: &'static str, value: u64, color: &'static str) -> ChartSlice {
    ChartSlice {
        kind,
        value,
        color,
        label: (value > 0).then(|| value.to_string()),
    }
}

/// Transient message shown after a tier change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

impl Notification {
    pub fn message(&self) -> &str {
        match self {
            Notification::Success(msg) | Notification::Error(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notification::Error(_))
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierChangeOutcome {
    /// The tier was already current; nothing was sent
    Unchanged,
    Changed(Notification),
    Failed(Notification),
}

/// View of one tenant on the dashboard
///
/// The card never changes the record it shows. After a successful tier
/// change the caller's `on_update` reloads the list and a new card is built
/// from the fresh data.
#[derive(Debug, Clone, Copy)]
pub struct TenantCard<'a> {
    tenant: &'a TenantRecord,
}

impl<'a> TenantCard<'a> {
    pub fn new(tenant: &'a TenantRecord) -> Self {
        Self { tenant }
    }

    pub fn tenant(&self) -> &'a TenantRecord {
        self.tenant
    }

    pub fn title(&self) -> &'a str {
        &self.tenant.full_name
    }

    pub fn tier_label(&self) -> &'a str {
        match self.tenant.tier_name.as_deref() {
            Some(tier) if !tier.is_empty() => tier,
            _ => NO_TIER,
        }
    }

    pub fn current_tier(&self) -> Option<TierName> {
        TierName::ALL.into_iter().find(|tier| self.is_current(*tier))
    }

    pub fn is_current(&self, tier: TierName) -> bool {
        self.tenant.tier_name.as_deref() == Some(tier.as_str())
    }

    pub fn tier_buttons(&self) -> Vec<TierButton> {
        TierName::ALL
            .into_iter()
            .map(|tier| {
                let current = self.is_current(tier);
                TierButton {
                    tier,
                    selected: current,
                    disabled: current,
                }
            })
            .collect()
    }

    /// Chart data, or `None` when there are no recordings at all
    pub fn recording_breakdown(&self) -> Option<RecordingBreakdown> {
        let total = self.tenant.total_recordings();
        if total == 0 {
            return None;
        }

        Some(RecordingBreakdown {
            total,
            slices: [
                slice("Successful", self.tenant.successful_recordings, SUCCESS_COLOR),
                slice("Failed", self.tenant.failed_recordings, FAILURE_COLOR),
            ],
        })
    }

    /// Ask the backend to move the tenant to `tier`.
    ///
    /// `on_update` runs only after the backend confirmed the change.
    pub async fn request_tier_change<F>(
        &self,
        api: &AdminApi,
        tier: TierName,
        on_update: F,
    ) -> TierChangeOutcome
    where
        F: FnOnce(),
    {
        if self.is_current(tier) {
            return TierChangeOutcome::Unchanged;
        }

        match api.set_tenant_tier(&self.tenant.user_id, tier).await {
            Ok(response) => {
                info!(
                    "Changed tier of {} to {} ({:?})",
                    self.tenant.user_id, tier, response.status
                );
                let notification = Notification::Success(format!(
                    "Successfully changed {}'s tier to {}.",
                    self.tenant.full_name, tier
                ));
                on_update();
                TierChangeOutcome::Changed(notification)
            }
            Err(e) => {
                error!("Failed to change tier: {}", e);
                TierChangeOutcome::Failed(Notification::Error("Failed to change tier.".to_string()))
            }
        }
    }
}

impl fmt::Display for TenantCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.tenant;
        writeln!(f, "{} [{}]", self.title(), self.tier_label())?;
        writeln!(f, "  {}", t.email)?;
        writeln!(
            f,
            "  Patients: {}  Successful: {}  Failed: {}",
            t.patient_count, t.successful_recordings, t.failed_recordings
        )?;
        match self.recording_breakdown() {
            Some(breakdown) => {
                let rate = t.successful_recordings as f64 * 100.0 / breakdown.total as f64;
                writeln!(f, "  {} Total ({:.0}% successful)", breakdown.total, rate)?;
            }
            None => writeln!(f, "  {}", NO_RECORDING_DATA)?,
        }
        writeln!(
            f,
            "  Hours: {:.1}  Avg length: {:.0}s  Avg size: {:.0} B",
            t.total_hours, t.avg_length_seconds, t.avg_file_size_bytes
        )?;

        let buttons: Vec<String> = self
            .tier_buttons()
            .iter()
            .map(|b| {
                if b.selected {
                    format!("({})", b.tier)
                } else {
                    format!("[{}]", b.tier)
                }
            })
            .collect();
        write!(f, "  {}", buttons.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant(tier: Option<&str>, successful: u64, failed: u64) -> TenantRecord {
        TenantRecord {
            user_id: "user-001".to_string(),
            full_name: "Alice".to_string(),
            email: "alice@clinic.example".to_string(),
            patient_count: 4,
            successful_recordings: successful,
            failed_recordings: failed,
            total_hours: 1.5,
            avg_length_seconds: 90.0,
            avg_file_size_bytes: 1024.0,
            tier_name: tier.map(str::to_string),
        }
    }

    #[test]
    fn current_tier_button_is_disabled() {
        let record = tenant(Some("Basic"), 1, 0);
        let card = TenantCard::new(&record);

        let buttons = card.tier_buttons();
        assert_eq!(buttons.len(), 4);
        for button in buttons {
            assert_eq!(button.disabled, button.tier == TierName::Basic);
            assert_eq!(button.selected, button.disabled);
        }
        assert_eq!(card.current_tier(), Some(TierName::Basic));
    }

    #[test]
    fn missing_tier_shows_placeholder() {
        let record = tenant(None, 0, 0);
        let card = TenantCard::new(&record);

        assert_eq!(card.tier_label(), NO_TIER);
        assert_eq!(card.current_tier(), None);
        assert!(card.tier_buttons().iter().all(|b| !b.disabled));
    }

    #[test]
    fn empty_slices_have_no_label() {
        let record = tenant(None, 7, 0);
        let breakdown = TenantCard::new(&record).recording_breakdown().unwrap();

        assert_eq!(breakdown.total, 7);
        assert_eq!(breakdown.slices[0].label.as_deref(), Some("7"));
        assert_eq!(breakdown.slices[0].color, SUCCESS_COLOR);
        assert_eq!(breakdown.slices[1].label, None);
        assert_eq!(breakdown.slices[1].color, FAILURE_COLOR);
    }

    #[test]
    fn no_recordings_means_no_chart() {
        let record = tenant(Some("Enterprise"), 0, 0);
        let card = TenantCard::new(&record);

        assert_eq!(card.recording_breakdown(), None);
        assert!(card.to_string().contains(NO_RECORDING_DATA));
    }

    #[test]
    fn rendering_marks_current_tier() {
        let record = tenant(Some("Professional"), 3, 1);
        let text = TenantCard::new(&record).to_string();

        assert!(text.starts_with("Alice [Professional]"));
        assert!(text.contains("(Professional)"));
        assert!(text.contains("[Free Trial]"));
        assert!(text.contains("4 Total"));
    }
}
