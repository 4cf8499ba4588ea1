//! Self-help troubleshooting guides
//!
//! Guides are static seed data. Progress is tracked by flipping each step's
//! `completed` flag through [`toggle_step`], which returns the updated guides
//! instead of mutating in place.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpStep {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpGuide {
    pub id: String,
    pub title: String,
    pub description: String,
    pub steps: Vec<HelpStep>,
}

impl HelpGuide {
    fn seed(id: &str, title: &str, description: &str, steps: &[(&str, &str)]) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            steps: steps
                .iter()
                .enumerate()
                .map(|(i, (title, description))| HelpStep {
                    id: (i + 1).to_string(),
                    title: title.to_string(),
                    description: description.to_string(),
                    completed: false,
                })
                .collect(),
        }
    }
}

/// The built-in guides, all steps unchecked
pub fn seed_guides() -> Vec<HelpGuide> {
    vec![
        HelpGuide::seed(
            "slow-internet",
            "SLOW INTERNET SPEED",
            "Diagnose and fix connection speed issues",
            &[
                ("Check Device Connection", "Ensure your device is connected to the correct network"),
                ("Restart Router", "Unplug router for 30 seconds, then plug back in"),
                ("Run Speed Test", "Test your connection speed using our diagnostic tool"),
                ("Check for Interference", "Move closer to router and remove obstacles"),
            ],
        ),
        HelpGuide::seed(
            "no-connection",
            "NO INTERNET CONNECTION",
            "Restore your internet connection",
            &[
                ("Check Cable Connections", "Ensure all cables are securely connected"),
                ("Power Cycle Equipment", "Restart modem and router in correct order"),
                ("Check Service Status", "Verify if there are any outages in your area"),
            ],
        ),
        HelpGuide::seed(
            "wifi-issues",
            "WIFI CONNECTION PROBLEMS",
            "Fix wireless connectivity issues",
            &[
                ("Forget and Reconnect", "Remove WiFi network and reconnect with password"),
                ("Update Network Drivers", "Ensure your device drivers are up to date"),
                ("Change WiFi Channel", "Switch to a less congested channel"),
            ],
        ),
    ]
}

pub fn find_guide<'a>(guides: &'a [HelpGuide], guide_id: &str) -> Option<&'a HelpGuide> {
    guides.iter().find(|guide| guide.id == guide_id)
}

/// Flip one step's completion flag. Unknown ids leave everything as is.
pub fn toggle_step(guides: &[HelpGuide], guide_id: &str, step_id: &str) -> Vec<HelpGuide> {
    guides
        .iter()
        .map(|guide| {
            if guide.id != guide_id {
                return guide.clone();
            }
            HelpGuide {
                steps: guide
                    .steps
                    .iter()
                    .map(|step| HelpStep {
                        completed: if step.id == step_id { !step.completed } else { step.completed },
                        ..step.clone()
                    })
                    .collect(),
                ..guide.clone()
            }
        })
        .collect()
}

pub fn completed_count(guide: &HelpGuide) -> usize {
    guide.steps.iter().filter(|step| step.completed).count()
}

/// True when every step is checked
pub fn is_complete(guide: &HelpGuide) -> bool {
    guide.steps.iter().all(|step| step.completed)
}

/// Completed fraction in `0.0..=1.0`; a guide without steps reports 0
pub fn progress(guide: &HelpGuide) -> f64 {
    if guide.steps.is_empty() {
        return 0.0;
    }
    completed_count(guide) as f64 / guide.steps.len() as f64
}
