use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    Indoor,
    Outdoor,
    Unknown,
}

impl Placement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Placement::Indoor => "indoor",
            Placement::Outdoor => "outdoor",
            Placement::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Placement {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "indoor" | "in" | "i" => Ok(Placement::Indoor),
            "outdoor" | "out" | "o" => Ok(Placement::Outdoor),
            "unknown" => Ok(Placement::Unknown),
            other => Err(format!("unknown placement '{other}'")),
        }
    }
}

/// Fixed coordinates kept as canonical strings: they are grouping keys and
/// output fields, never arithmetic operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinates {
    pub latitude: &'static str,
    pub longitude: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct DeviceInfo {
    pub placement: Placement,
    pub coordinates: Option<Coordinates>,
    /// The co-located device on the other side of the wall, when one exists.
    pub paired_device: Option<&'static str>,
    /// Owner label for devices that never appear in the user roster.
    pub owner_override: Option<&'static str>,
    pub reference: bool,
}

impl DeviceInfo {
    const UNKNOWN: DeviceInfo = DeviceInfo {
        placement: Placement::Unknown,
        coordinates: None,
        paired_device: None,
        owner_override: None,
        reference: false,
    };
}

const fn fixed(
    placement: Placement,
    paired_device: &'static str,
    latitude: &'static str,
    longitude: &'static str,
) -> DeviceInfo {
    DeviceInfo {
        placement,
        coordinates: Some(Coordinates {
            latitude,
            longitude,
        }),
        paired_device: Some(paired_device),
        owner_override: None,
        reference: false,
    }
}

const fn mobile(placement: Placement, owner_override: Option<&'static str>) -> DeviceInfo {
    DeviceInfo {
        placement,
        coordinates: None,
        paired_device: None,
        owner_override,
        reference: false,
    }
}

const fn station(latitude: &'static str, longitude: &'static str) -> DeviceInfo {
    DeviceInfo {
        placement: Placement::Outdoor,
        coordinates: Some(Coordinates {
            latitude,
            longitude,
        }),
        paired_device: None,
        owner_override: None,
        reference: true,
    }
}

/// Reference stations in the order ratio fan-outs report them.
pub const REFERENCE_STATIONS: [&str; 3] = [
    "Bellevue SE 12th",
    "Lake Forest Park",
    "Seattle 10th & Weller",
];

/// Owner label resolved for every reference station.
pub const PUBLIC_REFERENCE_OWNER: &str = "Public Reference";

static DEVICE_TABLE: Lazy<HashMap<&'static str, DeviceInfo>> = Lazy::new(|| {
    use Placement::{Indoor, Outdoor, Unknown};

    HashMap::from([
        ("Beta-01", fixed(Outdoor, "Beta-19", "47.661273", "-122.323842")),
        ("Beta-19", fixed(Indoor, "Beta-01", "47.661273", "-122.323842")),
        ("Beta-17", fixed(Outdoor, "Beta-07", "47.657965", "-122.333808")),
        ("Beta-07", fixed(Indoor, "Beta-17", "47.657965", "-122.333808")),
        ("Beta-03", fixed(Outdoor, "Beta-12", "47.695662", "-122.293314")),
        ("Beta-12", fixed(Indoor, "Beta-03", "47.695662", "-122.293314")),
        ("Breakout-08", fixed(Outdoor, "Beta-06", "47.659161", "-122.317555")),
        ("Beta-06", fixed(Indoor, "Breakout-08", "47.659161", "-122.317555")),
        // co-located triple: two indoor units share one outdoor partner
        ("Beta-16", fixed(Outdoor, "Beta-11", "47.661519", "-122.332354")),
        ("Beta-11", fixed(Indoor, "Beta-16", "47.661519", "-122.332354")),
        ("Beta-14", fixed(Indoor, "Beta-16", "47.661519", "-122.332354")),
        ("Breakout-06", fixed(Outdoor, "Beta-18", "47.664879", "-122.27600")),
        ("Beta-18", fixed(Indoor, "Breakout-06", "47.664879", "-122.27600")),
        ("Beta-08", fixed(Outdoor, "Beta-13", "47.653598", "-122.304305")),
        ("Beta-13", fixed(Indoor, "Beta-08", "47.653598", "-122.304305")),
        ("Breakout-01", mobile(Unknown, None)),
        ("Breakout-09", mobile(Unknown, None)),
        ("Breakout-10", mobile(Unknown, None)),
        ("Breakout-11", mobile(Unknown, None)),
        ("Breakout-02", mobile(Outdoor, Some("Igor"))),
        ("Bellevue SE 12th", station("47.601002", "-122.149234")),
        ("Lake Forest Park", station("47.753631", "-122.277257")),
        ("Seattle 10th & Weller", station("47.597314", "-122.3197095")),
    ])
});

/// Registry lookup. A miss is not an error: the device is simply of
/// unknown placement with no fixed coordinates.
pub fn lookup(device: &str) -> DeviceInfo {
    DEVICE_TABLE
        .get(device)
        .copied()
        .unwrap_or(DeviceInfo::UNKNOWN)
}

pub fn is_reference(device: &str) -> bool {
    lookup(device).reference
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paired_devices_share_coordinates() {
        let outdoor = lookup("Beta-01");
        let indoor = lookup("Beta-19");

        assert_eq!(outdoor.placement, Placement::Outdoor);
        assert_eq!(indoor.placement, Placement::Indoor);
        assert_eq!(outdoor.coordinates, indoor.coordinates);
        assert_eq!(outdoor.paired_device, Some("Beta-19"));
        assert_eq!(indoor.paired_device, Some("Beta-01"));
    }

    #[test]
    fn unknown_device_is_a_valid_classification() {
        let info = lookup("Gamma-99");
        assert_eq!(info.placement, Placement::Unknown);
        assert!(info.coordinates.is_none());
        assert!(!info.reference);
    }

    #[test]
    fn mobile_devices_have_no_fixed_coordinates() {
        let info = lookup("Breakout-02");
        assert_eq!(info.placement, Placement::Outdoor);
        assert!(info.coordinates.is_none());
        assert_eq!(info.owner_override, Some("Igor"));
    }

    #[test]
    fn reference_stations_are_flagged() {
        for station in REFERENCE_STATIONS {
            assert!(
                is_reference(station),
                "{station} should be a reference station"
            );
            assert!(lookup(station).coordinates.is_some());
        }
        assert!(!is_reference("Beta-19"));
    }
}
