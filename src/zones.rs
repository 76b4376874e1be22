//! Bidding zones offered by the dashboard
//!
//! Maps the short zone codes users pick (`CZ`, `DE_LU`, ...) to the EIC area
//! codes the ENTSO-E Transparency Platform expects in `in_Domain`/`out_Domain`.

use serde::Serialize;

use crate::error::{DashboardError, Result};

/// A bidding zone with its ENTSO-E area code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Zone {
    pub code: &'static str,
    pub eic: &'static str,
    pub name: &'static str,
}

/// Every zone the region picker offers, in display order
pub const ZONES: &[Zone] = &[
    Zone { code: "CZ", eic: "10YCZ-CEPS-----N", name: "Czech Republic" },
    Zone { code: "PL", eic: "10YPL-AREA-----S", name: "Poland" },
    Zone { code: "DE_LU", eic: "10Y1001A1001A82H", name: "Germany-Luxembourg" },
    Zone { code: "FR", eic: "10YFR-RTE------C", name: "France" },
    Zone { code: "SK", eic: "10YSK-SEPS-----K", name: "Slovakia" },
    Zone { code: "DK_1", eic: "10YDK-1--------W", name: "Denmark West" },
    Zone { code: "SE_4", eic: "10Y1001A1001A47J", name: "Sweden SE4" },
    Zone { code: "ES", eic: "10YES-REE------0", name: "Spain" },
    Zone { code: "AT", eic: "10YAT-APG------L", name: "Austria" },
    Zone { code: "IT_NORD", eic: "10Y1001A1001A73I", name: "Italy North" },
    Zone { code: "NO_3", eic: "10YNO-3--------J", name: "Norway NO3" },
    Zone { code: "HU", eic: "10YHU-MAVIR----U", name: "Hungary" },
    Zone { code: "HR", eic: "10YHR-HEP------M", name: "Croatia" },
    Zone { code: "SI", eic: "10YSI-ELES-----O", name: "Slovenia" },
    Zone { code: "BE", eic: "10YBE----------2", name: "Belgium" },
    Zone { code: "NL", eic: "10YNL----------L", name: "Netherlands" },
    Zone { code: "PT", eic: "10YPT-REN------W", name: "Portugal" },
    Zone { code: "IE_SEM", eic: "10Y1001A1001A59C", name: "Ireland (SEM)" },
    Zone { code: "LT", eic: "10YLT-1001A0008Q", name: "Lithuania" },
    Zone { code: "LV", eic: "10YLV-1001A00074", name: "Latvia" },
    Zone { code: "EE", eic: "10Y1001A1001A39I", name: "Estonia" },
    Zone { code: "GR", eic: "10YGR-HTSO-----Y", name: "Greece" },
    Zone { code: "FI", eic: "10YFI-1--------U", name: "Finland" },
    Zone { code: "BG", eic: "10YCA-BULGARIA-R", name: "Bulgaria" },
    Zone { code: "RO", eic: "10YRO-TEL------P", name: "Romania" },
    Zone { code: "CH", eic: "10YCH-SWISSGRIDZ", name: "Switzerland" },
    Zone { code: "LU", eic: "10YLU-CEGEDEL-NQ", name: "Luxembourg" },
];

/// Look up a zone by its short code (case-insensitive)
pub fn lookup(code: &str) -> Option<&'static Zone> {
    let code = code.trim();
    ZONES.iter().find(|z| z.code.eq_ignore_ascii_case(code))
}

/// Parse a comma-separated region list into an ordered set of zone codes.
///
/// Order of first appearance is kept and repeats are dropped, so the result
/// can be used directly as the column order of a price table.
pub fn parse_region_list(raw: &str) -> Result<Vec<String>> {
    let mut regions: Vec<String> = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let zone = lookup(part).ok_or_else(|| {
            DashboardError::InvalidRequest(format!("Unknown bidding zone: {part}"))
        })?;
        if !regions.iter().any(|r| r == zone.code) {
            regions.push(zone.code.to_string());
        }
    }
    Ok(regions)
}
