//! Registered pools and their sheet metadata.

use serde::Serialize;

/// Registry column holding the pool name
pub const NAME_COLUMN: &str = "name";
/// Registry column holding the volume in m³
pub const VOLUME_COLUMN: &str = "volume_m3";
pub const PUMP_TYPE_COLUMN: &str = "pump_type";
pub const ADDRESS_COLUMN: &str = "address";
/// Litres flushed by a 5 minute backwash
pub const BACKWASH_COLUMN: &str = "backwash_litres";
pub const KEYBOX_COLUMN: &str = "keybox_code";
pub const HOST_PHONE_COLUMN: &str = "host_phone";

/// Column layout written to a new registry file
pub const REGISTRY_COLUMNS: &[&str] = &[
    NAME_COLUMN,
    VOLUME_COLUMN,
    PUMP_TYPE_COLUMN,
    ADDRESS_COLUMN,
    BACKWASH_COLUMN,
    KEYBOX_COLUMN,
    HOST_PHONE_COLUMN,
];

/// Metadata shown first, in this order; any other columns follow
const DISPLAY_ORDER: &[&str] = &[
    ADDRESS_COLUMN,
    KEYBOX_COLUMN,
    HOST_PHONE_COLUMN,
    PUMP_TYPE_COLUMN,
    BACKWASH_COLUMN,
];

/// A pool known to the registry
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Pool {
    pub name: String,
    pub volume_m3: f64,
    pub info: PoolInfo,
}

impl Pool {
    /// "Name - 45.0 m³"
    pub fn heading(&self) -> String {
        format!("{} - {:.1} m³", self.name, self.volume_m3)
    }
}

/// One metadata cell from the registry sheet
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct InfoEntry {
    pub key: String,
    /// `None` when the cell is blank
    pub value: Option<String>,
}

/// Every non-core column of a pool's row, in sheet order
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct PoolInfo {
    pub entries: Vec<InfoEntry>,
}

impl PoolInfo {
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        let value = value.filter(|v| !v.trim().is_empty());
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => entry.value = value,
            None => self.entries.push(InfoEntry { key, value }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .and_then(|e| e.value.as_deref())
    }

    pub fn address(&self) -> Option<&str> {
        self.get(ADDRESS_COLUMN)
    }

    /// Backwash volume in litres, when the cell holds a number
    pub fn backwash_litres(&self) -> Option<f64> {
        self.get(BACKWASH_COLUMN)
            .and_then(|v| v.trim().parse::<f64>().ok())
    }

    /// "Label: value" lines for display, well-known fields first
    pub fn display_lines(&self) -> Vec<String> {
        let known = DISPLAY_ORDER
            .iter()
            .filter_map(|key| self.entries.iter().find(|e| e.key == *key));
        let rest = self
            .entries
            .iter()
            .filter(|e| !DISPLAY_ORDER.contains(&e.key.as_str()));

        known
            .chain(rest)
            .map(|entry| format!("{}: {}", label(&entry.key), self.display_value(entry)))
            .collect()
    }

    fn display_value(&self, entry: &InfoEntry) -> String {
        let Some(value) = entry.value.as_deref() else {
            return "Not specified".into();
        };
        if entry.key == BACKWASH_COLUMN {
            if let Some(litres) = self.backwash_litres() {
                return format!("{} litres / {:.1} m³", litres as i64, litres / 1000.0);
            }
        }
        value.to_string()
    }
}

fn label(key: &str) -> &str {
    match key {
        ADDRESS_COLUMN => "Address",
        KEYBOX_COLUMN => "Keybox code",
        HOST_PHONE_COLUMN => "Host phone",
        PUMP_TYPE_COLUMN => "Pump type",
        BACKWASH_COLUMN => "Backwash (5 min)",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_info() -> PoolInfo {
        let mut info = PoolInfo::default();
        info.insert("gate_colour", Some("green".into()));
        info.insert(PUMP_TYPE_COLUMN, Some("Hayward".into()));
        info.insert(ADDRESS_COLUMN, Some("Strandvej 1".into()));
        info.insert(BACKWASH_COLUMN, Some("1500".into()));
        info.insert(KEYBOX_COLUMN, Some("  ".into()));
        info
    }

    #[test]
    fn test_display_lines_order() {
        let lines = sample_info().display_lines();
        assert_eq!(
            lines,
            vec![
                "Address: Strandvej 1".to_string(),
                "Keybox code: Not specified".to_string(),
                "Pump type: Hayward".to_string(),
                "Backwash (5 min): 1500 litres / 1.5 m³".to_string(),
                "gate_colour: green".to_string(),
            ]
        );
    }

    #[test]
    fn test_unparsable_backwash_shown_raw() {
        let mut info = PoolInfo::default();
        info.insert(BACKWASH_COLUMN, Some("ask host".into()));
        assert_eq!(info.backwash_litres(), None);
        assert_eq!(info.display_lines(), vec!["Backwash (5 min): ask host"]);
    }

    #[test]
    fn test_insert_replaces_existing_key() {
        let mut info = sample_info();
        info.insert(ADDRESS_COLUMN, Some("Havnegade 2".into()));
        assert_eq!(info.address(), Some("Havnegade 2"));
        assert_eq!(info.entries.len(), 5);
    }

    #[test]
    fn test_heading() {
        let pool = Pool {
            name: "Villa Sol".into(),
            volume_m3: 45.0,
            info: PoolInfo::default(),
        };
        assert_eq!(pool.heading(), "Villa Sol - 45.0 m³");
    }
}
