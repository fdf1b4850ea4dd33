use serde::{Deserialize, Serialize};

/// One named choghadiya slot within a day. `start`/`end` are clock-time
/// labels as the backend renders them ("7:45 AM" or "19:05"); an `end`
/// earlier than `start` means the slot crosses midnight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeWindow {
    #[serde(rename = "type")]
    pub kind: String,
    pub start: String,
    pub end: String,
    pub quality: WindowQuality,
    pub period: WindowPeriod,
}

/// Auspiciousness tag. Drives colors and filtering, so it stays untranslated.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(from = "String")]
pub enum WindowQuality {
    Good,
    Bad,
    #[default]
    Neutral,
}

impl From<String> for WindowQuality {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Good" => WindowQuality::Good,
            "Bad" => WindowQuality::Bad,
            // The backend emits both spellings for the middle tier.
            "Neutral" | "Normal" => WindowQuality::Neutral,
            _ => WindowQuality::Neutral,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(from = "String")]
pub enum WindowPeriod {
    #[default]
    Day,
    Night,
}

impl From<String> for WindowPeriod {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Night" => WindowPeriod::Night,
            _ => WindowPeriod::Day,
        }
    }
}

/// The muhurat endpoint has shipped three shapes over time: a bare array,
/// `{"choghadiya": [...]}`, and the same nested under `"data"`. They all
/// normalize to a flat window list here so nothing past the network
/// boundary ever sees the variants.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WindowsResponse {
    Bare(Vec<TimeWindow>),
    Keyed { choghadiya: Vec<TimeWindow> },
    Wrapped { data: KeyedWindows },
}

#[derive(Debug, Deserialize)]
pub struct KeyedWindows {
    pub choghadiya: Vec<TimeWindow>,
}

impl WindowsResponse {
    pub fn into_windows(self) -> Vec<TimeWindow> {
        match self {
            WindowsResponse::Bare(windows) => windows,
            WindowsResponse::Keyed { choghadiya } => choghadiya,
            WindowsResponse::Wrapped { data } => data.choghadiya,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot_json() -> serde_json::Value {
        serde_json::json!({
            "type": "Amrit Muhurat",
            "start": "7:45 AM",
            "end": "9:09 AM",
            "quality": "Good",
            "period": "Day"
        })
    }

    #[test]
    fn normal_quality_maps_to_neutral() {
        let mut value = slot_json();
        value["quality"] = "Normal".into();
        let window: TimeWindow = serde_json::from_value(value).unwrap();
        assert_eq!(window.quality, WindowQuality::Neutral);
    }

    #[test]
    fn bare_array_shape() {
        let response: WindowsResponse =
            serde_json::from_value(serde_json::json!([slot_json()])).unwrap();
        assert_eq!(response.into_windows().len(), 1);
    }

    #[test]
    fn keyed_shape() {
        let response: WindowsResponse =
            serde_json::from_value(serde_json::json!({ "choghadiya": [slot_json()] })).unwrap();
        assert_eq!(response.into_windows()[0].kind, "Amrit Muhurat");
    }

    #[test]
    fn data_wrapped_shape() {
        let response: WindowsResponse = serde_json::from_value(serde_json::json!({
            "data": { "choghadiya": [slot_json(), slot_json()] }
        }))
        .unwrap();
        assert_eq!(response.into_windows().len(), 2);
    }
}
