use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::devices::{self, Placement, PUBLIC_REFERENCE_OWNER};

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read roster file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode roster file: {0}")]
    Csv(#[from] csv::Error),
}

/// One participant row of the device/user file. Either device cell may be
/// blank when the participant only hosts one unit.
#[derive(Debug, Clone, Deserialize)]
struct RosterRow {
    #[serde(rename = "User")]
    user: String,
    #[serde(rename = "In", default)]
    indoor: String,
    #[serde(rename = "Out", default)]
    outdoor: String,
}

impl RosterRow {
    fn indoor(&self) -> Option<&str> {
        Some(self.indoor.trim()).filter(|v| !v.is_empty())
    }

    fn outdoor(&self) -> Option<&str> {
        Some(self.outdoor.trim()).filter(|v| !v.is_empty())
    }
}

/// An indoor/outdoor device pair hosted by one participant, the unit the
/// cross-device aligner works in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePair {
    pub user: String,
    pub indoor: String,
    pub outdoor: String,
}

/// The external device/user table (`User,In,Out` header).
#[derive(Debug, Clone)]
pub struct UserRoster {
    rows: Vec<RosterRow>,
}

impl UserRoster {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RosterError> {
        let mut decoder = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for row in decoder.deserialize() {
            rows.push(row?);
        }
        Ok(Self { rows })
    }

    pub fn from_path(path: &Path) -> Result<Self, RosterError> {
        Self::from_reader(File::open(path)?)
    }

    pub fn users(&self) -> Vec<&str> {
        let mut users = Vec::new();
        for row in &self.rows {
            if !users.contains(&row.user.as_str()) {
                users.push(row.user.as_str());
            }
        }
        users
    }

    /// Rows where both devices are present, in file order.
    pub fn indoor_outdoor_pairs(&self) -> Vec<DevicePair> {
        self.rows
            .iter()
            .filter_map(|row| {
                let indoor = row.indoor()?;
                let outdoor = row.outdoor()?;
                Some(DevicePair {
                    user: row.user.clone(),
                    indoor: indoor.to_string(),
                    outdoor: outdoor.to_string(),
                })
            })
            .collect()
    }

    /// (user, device) pairs for one side of the roster.
    pub fn devices_with(&self, placement: Placement) -> Vec<(String, String)> {
        self.rows
            .iter()
            .filter_map(|row| {
                let device = match placement {
                    Placement::Indoor => row.indoor(),
                    Placement::Outdoor => row.outdoor(),
                    Placement::Unknown => None,
                }?;
                Some((row.user.clone(), device.to_string()))
            })
            .collect()
    }

    /// Owner label for legends and reports. Reference stations resolve to
    /// the fixed public label, registry overrides win next, then the
    /// roster; a miss is the valid "Unknown" owner.
    pub fn owner_of(&self, placement: Placement, device: &str) -> String {
        let info = devices::lookup(device);
        if info.reference {
            return PUBLIC_REFERENCE_OWNER.to_string();
        }
        if let Some(owner) = info.owner_override {
            return owner.to_string();
        }

        self.rows
            .iter()
            .find(|row| match placement {
                Placement::Indoor => row.indoor() == Some(device),
                Placement::Outdoor => row.outdoor() == Some(device),
                Placement::Unknown => false,
            })
            .map(|row| row.user.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = "\
User,In,Out
Alice,Beta-19,Beta-01
Bob,Beta-07,Beta-17
Carol,Beta-13,
Dan,,Breakout-02
";

    fn roster() -> UserRoster {
        UserRoster::from_reader(ROSTER.as_bytes()).expect("roster parse failed")
    }

    #[test]
    fn pairs_require_both_devices() {
        let pairs = roster().indoor_outdoor_pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].user, "Alice");
        assert_eq!(pairs[0].indoor, "Beta-19");
        assert_eq!(pairs[0].outdoor, "Beta-01");
    }

    #[test]
    fn one_sided_rows_still_list_devices() {
        let indoor = roster().devices_with(Placement::Indoor);
        assert_eq!(indoor.len(), 3);
        assert!(indoor.contains(&("Carol".to_string(), "Beta-13".to_string())));
    }

    #[test]
    fn owner_resolution_order() {
        let roster = roster();
        assert_eq!(
            roster.owner_of(Placement::Outdoor, "Bellevue SE 12th"),
            PUBLIC_REFERENCE_OWNER
        );
        assert_eq!(roster.owner_of(Placement::Outdoor, "Breakout-02"), "Igor");
        assert_eq!(roster.owner_of(Placement::Indoor, "Beta-19"), "Alice");
        assert_eq!(roster.owner_of(Placement::Indoor, "Beta-99"), "Unknown");
    }
}
