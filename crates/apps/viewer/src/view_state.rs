use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_PITCH: f64 = 89.0;

/// Web-mercator camera: degrees for angles, fractional zoom.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub bearing: f64,
    pub pitch: f64,
    pub zoom: f64,
    #[serde(default = "default_max_pitch")]
    pub max_pitch: f64,
}

fn default_max_pitch() -> f64 {
    DEFAULT_MAX_PITCH
}

impl ViewState {
    pub fn new(latitude: f64, longitude: f64, bearing: f64, pitch: f64, zoom: f64) -> Self {
        Self {
            latitude,
            longitude,
            bearing,
            pitch,
            zoom,
            max_pitch: DEFAULT_MAX_PITCH,
        }
    }

    /// Pitch limited to `[0, max_pitch]`.
    pub fn clamped(mut self) -> Self {
        self.pitch = self.pitch.clamp(0.0, self.max_pitch);
        self
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Preset::GrandCanyon.view_state()
    }
}

/// Fly-to destinations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[serde(rename = "glac")]
    GlacierNationalPark,
    #[serde(rename = "grca")]
    GrandCanyon,
    #[serde(rename = "yose")]
    YosemiteValley,
    MtStHelens,
    MontBlanc,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::GlacierNationalPark,
        Preset::GrandCanyon,
        Preset::YosemiteValley,
        Preset::MtStHelens,
        Preset::MontBlanc,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Preset::GlacierNationalPark => "glac",
            Preset::GrandCanyon => "grca",
            Preset::YosemiteValley => "yose",
            Preset::MtStHelens => "mtsthelens",
            Preset::MontBlanc => "montblanc",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Preset::GlacierNationalPark => "Glacier National Park",
            Preset::GrandCanyon => "Grand Canyon",
            Preset::YosemiteValley => "Yosemite Valley",
            Preset::MtStHelens => "Mt. St. Helens",
            Preset::MontBlanc => "Mont Blanc",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    pub fn view_state(self) -> ViewState {
        match self {
            Preset::GlacierNationalPark => ViewState::new(48.7, -113.81, -3.3, 65.0, 11.6),
            Preset::GrandCanyon => ViewState::new(
                36.07091852096502,
                -112.00934837595949,
                -35.19642857142857,
                60.0,
                13.574472859832357,
            ),
            Preset::YosemiteValley => ViewState::new(
                37.74831303498057,
                -119.54799204629128,
                78.74986923166337,
                65.0,
                12.1,
            ),
            Preset::MtStHelens => ViewState::new(
                46.2099889639587,
                -122.18025571716424,
                156.227493316285,
                53.0,
                12.5,
            ),
            Preset::MontBlanc => ViewState::new(
                45.86306112220158,
                6.861778870346716,
                31.589576310589322,
                62.6,
                11.7,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn initial_view_is_grand_canyon() {
        let v = ViewState::default();
        assert_eq!(v.latitude, 36.07091852096502);
        assert_eq!(v.pitch, 60.0);
        assert_eq!(v.max_pitch, 89.0);
    }

    #[test]
    fn preset_keys_resolve() {
        for p in Preset::ALL {
            assert_eq!(Preset::from_key(p.key()), Some(p));
            let json = serde_json::to_string(&p).unwrap();
            assert_eq!(json, format!("\"{}\"", p.key()));
        }
        assert_eq!(Preset::from_key("everest"), None);
    }

    #[test]
    fn view_state_json_uses_camel_case() {
        let json = serde_json::to_value(Preset::MontBlanc.view_state()).unwrap();
        assert_eq!(json["maxPitch"], 89.0);
        let parsed: ViewState = serde_json::from_str(
            r#"{"latitude":1,"longitude":2,"bearing":0,"pitch":10,"zoom":3}"#,
        )
        .unwrap();
        assert_eq!(parsed.max_pitch, DEFAULT_MAX_PITCH);
    }

    #[test]
    fn pitch_clamps_to_max() {
        let v = ViewState::new(0.0, 0.0, 0.0, 120.0, 1.0).clamped();
        assert_eq!(v.pitch, 89.0);
    }
}
