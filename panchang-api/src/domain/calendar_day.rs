use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One astrological day record as consumed by the calendar grid and the
/// day-detail view. The grid endpoint returns these without `panchang`;
/// the detail endpoint fills everything in.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub panchang: Option<Panchang>,
    pub astronomy: Astronomy,
    pub lunar: LunarLabel,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Panchang {
    pub tithi: Option<PanchangElement>,
    pub nakshatra: Option<PanchangElement>,
    pub yoga: Option<PanchangElement>,
    pub karana: Option<PanchangElement>,
    pub paksha: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PanchangElement {
    pub name: String,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Astronomy {
    pub sunrise: String,
    pub sunset: String,
    pub moonrise: Option<String>,
    pub moonset: Option<String>,
    /// Illumination fraction in 0.0–1.0. Fallback only; the lunar label's
    /// display text wins for moon-glyph selection when it parses.
    pub moon_phase: f64,
}

/// Lunar-calendar label block ("Magshar Sud 11", Vikram Samvat year).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LunarLabel {
    pub month_name: String,
    pub era_year: i32,
    pub paksha: String,
    pub display_text: String,
}

impl From<RawCalendarDay> for CalendarDay {
    fn from(raw: RawCalendarDay) -> Self {
        let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d").unwrap_or_default();

        CalendarDay {
            date,
            panchang: raw.panchang.map(Panchang::from),
            astronomy: Astronomy {
                sunrise: raw.astronomy.sunrise,
                sunset: raw.astronomy.sunset,
                moonrise: raw.astronomy.moonrise,
                moonset: raw.astronomy.moonset,
                moon_phase: raw.astronomy.moon_phase.unwrap_or(0.0),
            },
            lunar: LunarLabel {
                month_name: raw.gujarati.month_name,
                era_year: raw.gujarati.vikram_samvat,
                paksha: raw.gujarati.paksha,
                display_text: raw.gujarati.display_text,
            },
        }
    }
}

impl From<RawPanchang> for Panchang {
    fn from(raw: RawPanchang) -> Self {
        Panchang {
            tithi: raw.tithi.map(PanchangElement::from),
            nakshatra: raw.nakshatra.map(PanchangElement::from),
            yoga: raw.yoga.map(PanchangElement::from),
            karana: raw.karana.map(PanchangElement::from),
            paksha: raw.paksha,
        }
    }
}

impl From<RawPanchangElement> for PanchangElement {
    fn from(raw: RawPanchangElement) -> Self {
        PanchangElement {
            name: raw.name,
            end_time: raw.end_time,
        }
    }
}

// Raw types, exactly as returned by the panchang backend.
#[derive(Debug, Deserialize)]
pub struct RawCalendarDay {
    pub date: String,
    pub panchang: Option<RawPanchang>,
    pub astronomy: RawAstronomy,
    pub gujarati: RawLunarLabel,
}

#[derive(Debug, Deserialize)]
pub struct RawPanchang {
    pub tithi: Option<RawPanchangElement>,
    pub nakshatra: Option<RawPanchangElement>,
    pub yoga: Option<RawPanchangElement>,
    pub karana: Option<RawPanchangElement>,
    pub paksha: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawPanchangElement {
    pub name: String,
    pub end_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawAstronomy {
    pub sunrise: String,
    pub sunset: String,
    pub moonrise: Option<String>,
    pub moonset: Option<String>,
    pub moon_phase: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RawLunarLabel {
    pub month_name: String,
    pub vikram_samvat: i32,
    pub paksha: String,
    pub display_text: String,
}
