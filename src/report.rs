//! Plain-text "danger log" rendering of proximity reports.

use crate::model::{NearbyIncident, ProximityReport};

const BANNER: &str = "------------\n|DANGER LOG|\n------------\n";

const SEPARATOR_WIDTH: usize = 100;

/// Render one report as a human-readable text block.
///
/// `origin_label` names the query point as the user gave it, e.g. the
/// address that was geocoded.
pub fn render_report(origin_label: &str, report: &ProximityReport) -> String {
    let mut out = String::from(BANNER);
    out.push('\n');

    if report.incidents.is_empty() {
        out.push_str("No incidents in this area or in range\n");
        return out;
    }

    out.push_str(&format!(
        "Incidents near {} in {} within {} km:\n\n",
        origin_label, report.region, report.radius_km
    ));

    for nearby in &report.incidents {
        out.push_str(&render_line(nearby));
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&format!("Total Incidents: {}\n", report.total_incidents));
    out.push_str(&format!("Total Killed: {}\n", report.total_killed));
    out.push_str(&format!("Total Injured: {}\n", report.total_injured));
    out.push_str(&format!(
        "THE DANGER LEVEL IN THIS AREA IS: {}\n",
        report.danger_level.label()
    ));
    out.push_str(&"-".repeat(SEPARATOR_WIDTH));
    out.push('\n');

    out
}

/// One incident line, distance with two decimals.
pub fn render_line(nearby: &NearbyIncident) -> String {
    let incident = &nearby.incident;
    format!(
        "id : {}, city : {}, state : {}, address : {}, Killed : {}, Injured : {}, Distance to You: {:.2}",
        incident.id,
        incident.city,
        incident.region,
        incident.address,
        incident.killed,
        incident.injured,
        nearby.distance_km
    )
}
