//! Built-in station registry.
//!
//! Used when the configuration file does not list any `[[sites]]`. Order
//! matters: it is the column order of the history table.

use crate::model::GaugeSite;

/// Metadata for a single USGS gauge station.
pub struct Station {
    /// Column header and display name. Must be unique across the registry.
    pub name: &'static str,
    /// 8-digit USGS site code.
    pub site_code: &'static str,
}

/// Default Virginia river gauges, in column order.
pub static STATION_REGISTRY: &[Station] = &[
    Station {
        name: "James River",
        site_code: "02037500",
    },
    Station {
        name: "Rappahannock River",
        site_code: "01668000",
    },
    Station {
        name: "New River",
        site_code: "03171000",
    },
    Station {
        name: "South Fork Shenandoah River",
        site_code: "01631000",
    },
    Station {
        name: "Roanoke River",
        site_code: "02055000",
    },
    Station {
        name: "Potomac River",
        site_code: "01646500",
    },
];

/// The registry as configured sites, preserving registry order.
pub fn default_sites() -> Vec<GaugeSite> {
    STATION_REGISTRY
        .iter()
        .map(|s| GaugeSite::new(s.name, s.site_code))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Integration Tests - Station API Verification
// ---------------------------------------------------------------------------
//
// Marked #[ignore] so CI does not depend on USGS availability.
//
//   cargo test -- --ignored station_api
