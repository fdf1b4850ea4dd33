//! Moon-glyph selection from the lunar-calendar label.
//!
//! The UI ships thirty moon images indexed 0–29. The textual lunar-day
//! label ("Posh Sud 11", "Amas") is authoritative; the numeric illumination
//! fraction is only a last resort for missing or malformed labels.

/// Markers the backend uses for the new-moon day.
const NEW_MOON_MARKERS: [&str; 2] = ["amas", "amavasya"];
/// Markers for the full-moon day.
const FULL_MOON_MARKERS: [&str; 3] = ["punam", "purnima", "poonam"];

const FULL_MOON_INDEX: usize = 14;
const NEW_MOON_INDEX: usize = 29;

/// Length of the synodic month in days, used to spread the 0.0–1.0
/// illumination fraction over the thirty images.
const SYNODIC_MONTH: f64 = 29.53;

/// Resolve a phase-image index in `0..=29`.
///
/// Order of precedence: named special days (full moon, new moon), then a
/// `<Sud|Vad> <lunar day>` label (tokens in either order, case-insensitive),
/// then the numeric fraction.
pub fn moon_phase_index(display_text: Option<&str>, phase_fraction: f64) -> usize {
    display_text
        .and_then(index_from_label)
        .unwrap_or_else(|| index_from_fraction(phase_fraction))
        .min(NEW_MOON_INDEX)
}

fn index_from_label(text: &str) -> Option<usize> {
    let lower = text.to_lowercase();

    if NEW_MOON_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return Some(NEW_MOON_INDEX);
    }
    if FULL_MOON_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return Some(FULL_MOON_INDEX);
    }

    // "Magshar Sud 11", "Vad 5", "1 Sud" all parse; the month name is noise.
    let mut fortnight: Option<Fortnight> = None;
    let mut lunar_day: Option<i64> = None;

    for part in lower.split_whitespace() {
        if part.contains("sud") {
            fortnight = Some(Fortnight::Waxing);
        } else if part.contains("vad") {
            fortnight = Some(Fortnight::Waning);
        } else if let Ok(day) = part.parse::<i64>() {
            lunar_day = Some(day);
        }
    }

    match (fortnight?, lunar_day?) {
        (Fortnight::Waxing, day) => Some(day.saturating_sub(1).max(0) as usize),
        (Fortnight::Waning, day) => Some((14 + day).max(0) as usize),
    }
}

fn index_from_fraction(fraction: f64) -> usize {
    let valid = fraction.clamp(0.0, 1.0);
    (valid * SYNODIC_MONTH).floor() as usize
}

#[derive(Clone, Copy)]
enum Fortnight {
    Waxing,
    Waning,
}
