use serde::{Deserialize, Serialize};

use crate::notifications::{seed_alerts, Notification};

/// Connection card at the top of the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub state: String,
    pub speed_mbps: f64,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self {
            state: "ACTIVE".to_string(),
            speed_mbps: 85.2,
        }
    }
}

impl ConnectionStatus {
    pub fn speed_label(&self) -> String {
        format!("{:.1} Mbps", self.speed_mbps)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub connection: ConnectionStatus,
    /// Newest first
    pub alerts: Vec<Notification>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            connection: ConnectionStatus::default(),
            alerts: seed_alerts(),
        }
    }
}

impl Dashboard {
    /// Same dashboard with `alert` at the top of the feed
    pub fn with_alert(&self, alert: Notification) -> Self {
        let mut alerts = Vec::with_capacity(self.alerts.len() + 1);
        alerts.push(alert);
        alerts.extend(self.alerts.iter().cloned());
        Self {
            alerts,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::proactive_alert;

    #[test]
    fn test_new_alert_goes_first() {
        let dashboard = Dashboard::default();
        let updated = dashboard.with_alert(proactive_alert());
        assert_eq!(updated.alerts.len(), 3);
        assert_eq!(updated.alerts[0].timestamp, "just now");
        assert_eq!(updated.alerts[1..], dashboard.alerts[..]);
    }

    #[test]
    fn test_speed_label() {
        assert_eq!(ConnectionStatus::default().speed_label(), "85.2 Mbps");
    }
}
