//! Simulated technician tracking
//!
//! Each tick moves the technician one minute closer and a tenth of a mile
//! nearer. ETA bottoms out at 1 minute and distance at 0.1 mile.

use serde::{Deserialize, Serialize};

pub const MIN_ETA_MINUTES: u32 = 1;
pub const MIN_DISTANCE_MILES: f64 = 0.1;
const DISTANCE_STEP_MILES: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechnicianStatus {
    EnRoute,
    Arrived,
    Working,
    Completed,
}

impl TechnicianStatus {
    /// Status implied by an ETA: more than 5 minutes is en route, 2 to 5 is
    /// arrived, 1 or less is working.
    pub fn from_eta(eta_minutes: u32) -> Self {
        if eta_minutes > 5 {
            TechnicianStatus::EnRoute
        } else if eta_minutes > 1 {
            TechnicianStatus::Arrived
        } else {
            TechnicianStatus::Working
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TechnicianStatus::EnRoute => "en_route",
            TechnicianStatus::Arrived => "arrived",
            TechnicianStatus::Working => "working",
            TechnicianStatus::Completed => "completed",
        }
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            TechnicianStatus::EnRoute => "EN ROUTE TO YOUR LOCATION",
            TechnicianStatus::Arrived => "ARRIVED AT YOUR LOCATION",
            TechnicianStatus::Working => "WORKING ON YOUR ISSUE",
            TechnicianStatus::Completed => "SERVICE COMPLETED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    /// Leading mileage figure followed by free text, e.g.
    /// `2.3 miles away - Mission District`
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technician {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub eta_minutes: u32,
    pub status: TechnicianStatus,
    pub location: Location,
    pub skills: Vec<String>,
}

impl Default for Technician {
    fn default() -> Self {
        Self::seed()
    }
}

impl Technician {
    /// The technician dispatched in the demo scenario
    pub fn seed() -> Self {
        Self {
            id: "tech-001".to_string(),
            name: "Alex Chen".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            eta_minutes: 15,
            status: TechnicianStatus::EnRoute,
            location: Location {
                lat: 37.7749,
                lng: -122.4194,
                address: "2.3 miles away - Mission District".to_string(),
            },
            skills: vec![
                "Fiber Optic".to_string(),
                "Router Config".to_string(),
                "Network Security".to_string(),
            ],
        }
    }

    /// State after one simulation tick
    pub fn advance(&self) -> Self {
        let eta_minutes = self.eta_minutes.saturating_sub(1).max(MIN_ETA_MINUTES);
        Self {
            eta_minutes,
            status: TechnicianStatus::from_eta(eta_minutes),
            location: Location {
                address: step_distance_label(&self.location.address),
                ..self.location.clone()
            },
            ..self.clone()
        }
    }

    pub fn eta_label(&self) -> String {
        format!("{} minutes", self.eta_minutes)
    }
}

/// Leading mileage of a distance label, if it starts with a number
pub fn parse_distance(label: &str) -> Option<f64> {
    label.split_whitespace().next()?.parse().ok()
}

/// Knock a tenth of a mile off the label's leading figure.
///
/// The rest of the label is kept. Labels that don't start with a number come
/// back unchanged.
pub fn step_distance_label(label: &str) -> String {
    let Some(miles) = parse_distance(label) else {
        return label.to_string();
    };

    let next = (miles - DISTANCE_STEP_MILES).max(MIN_DISTANCE_MILES);
    let rest = label
        .trim_start()
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest)
        .unwrap_or("");

    if rest.is_empty() {
        format!("{:.1}", next)
    } else {
        format!("{:.1} {}", next, rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_thresholds() {
        assert_eq!(TechnicianStatus::from_eta(15), TechnicianStatus::EnRoute);
        assert_eq!(TechnicianStatus::from_eta(6), TechnicianStatus::EnRoute);
        assert_eq!(TechnicianStatus::from_eta(5), TechnicianStatus::Arrived);
        assert_eq!(TechnicianStatus::from_eta(2), TechnicianStatus::Arrived);
        assert_eq!(TechnicianStatus::from_eta(1), TechnicianStatus::Working);
        assert_eq!(TechnicianStatus::from_eta(0), TechnicianStatus::Working);
    }

    #[test]
    fn test_single_tick() {
        let next = Technician::seed().advance();
        assert_eq!(next.eta_minutes, 14);
        assert_eq!(next.eta_label(), "14 minutes");
        assert_eq!(next.location.address, "2.2 miles away - Mission District");
        assert_eq!(next.name, "Alex Chen");
    }

    #[test]
    fn test_ticks_floor_at_minimums() {
        let mut tech = Technician::seed();
        for _ in 0..40 {
            tech = tech.advance();
            assert!(tech.eta_minutes >= MIN_ETA_MINUTES);
            assert!(parse_distance(&tech.location.address).unwrap() >= MIN_DISTANCE_MILES);
        }
        assert_eq!(tech.eta_minutes, 1);
        assert_eq!(tech.status, TechnicianStatus::Working);
        assert_eq!(tech.location.address, "0.1 miles away - Mission District");
    }

    #[test]
    fn test_status_follows_eta_while_ticking() {
        let mut tech = Technician::seed();
        tech.eta_minutes = 6;
        tech = tech.advance();
        assert_eq!(tech.status, TechnicianStatus::Arrived);
    }

    #[test]
    fn test_distance_label_edge_cases() {
        assert_eq!(step_distance_label("0.15 miles"), "0.1 miles");
        assert_eq!(step_distance_label("1.0"), "0.9");
        assert_eq!(step_distance_label("nearby"), "nearby");
        assert_eq!(step_distance_label(""), "");
    }
}
