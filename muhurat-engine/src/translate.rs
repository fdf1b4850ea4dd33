//! Translation seam and per-entity field translation.
//!
//! Only a declared allow-list of display fields is translated per entity:
//! window lists translate `kind` only (`quality` and `period` drive
//! filtering and colors, so they must stay English), day details translate
//! the lunar label strings and the panchang element names. The source
//! language `en` short-circuits before any provider call, and a field whose
//! translation fails keeps its original text.

use async_trait::async_trait;
use panchang_api::domain::{CalendarDay, TimeWindow};
use thiserror::Error;
use tracing::warn;

pub const SOURCE_LANGUAGE: &str = "en";

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("ResponseError: {0}")]
    ResponseError(String),
    #[error("ParsingError: {0}")]
    ParsingError(String),
}

/// Abstracts the translation provider so the engine can be tested without
/// network access.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslateError>;
}

/// Translate one field, falling back to the original text on failure.
/// Never calls the provider for the source language or empty text.
pub async fn translate_or_original(
    translator: &dyn Translator,
    text: &str,
    target_lang: &str,
) -> String {
    if target_lang == SOURCE_LANGUAGE || text.is_empty() {
        return text.to_string();
    }
    match translator.translate(text, target_lang).await {
        Ok(translated) => translated,
        Err(e) => {
            warn!("Translation of {:?} failed, keeping original: {}", text, e);
            text.to_string()
        }
    }
}

/// Translate the `kind` field of every window in the list.
pub async fn translate_window_kinds(
    translator: &dyn Translator,
    windows: Vec<TimeWindow>,
    target_lang: &str,
) -> Vec<TimeWindow> {
    if target_lang == SOURCE_LANGUAGE {
        return windows;
    }
    let mut translated = Vec::with_capacity(windows.len());
    for mut window in windows {
        window.kind = translate_or_original(translator, &window.kind, target_lang).await;
        translated.push(window);
    }
    translated
}

/// Translate the display fields of a day detail record. The caller keeps an
/// untranslated copy of the lunar label, which the moon resolver and the
/// fortnight logic parse in its English form.
pub async fn translate_day(
    translator: &dyn Translator,
    mut day: CalendarDay,
    target_lang: &str,
) -> CalendarDay {
    if target_lang == SOURCE_LANGUAGE {
        return day;
    }

    day.lunar.month_name =
        translate_or_original(translator, &day.lunar.month_name, target_lang).await;
    day.lunar.paksha = translate_or_original(translator, &day.lunar.paksha, target_lang).await;
    day.lunar.display_text =
        translate_or_original(translator, &day.lunar.display_text, target_lang).await;

    if let Some(panchang) = day.panchang.as_mut() {
        if let Some(paksha) = panchang.paksha.take() {
            panchang.paksha = Some(translate_or_original(translator, &paksha, target_lang).await);
        }
        for element in [
            panchang.tithi.as_mut(),
            panchang.nakshatra.as_mut(),
            panchang.yoga.as_mut(),
            panchang.karana.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            element.name = translate_or_original(translator, &element.name, target_lang).await;
        }
    }

    day
}

/// Translator backed by the public Google translate endpoint.
pub struct HttpTranslator {
    http: reqwest::Client,
    endpoint: String,
}

impl Default for HttpTranslator {
    fn default() -> Self {
        Self::new("https://translate.googleapis.com/translate_a/single")
    }
}

impl HttpTranslator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslateError> {
        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", SOURCE_LANGUAGE),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| TranslateError::ResponseError(e.to_string()))?;

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| TranslateError::ParsingError(e.to_string()))?;

        // The endpoint answers [[["<translated>", "<source>", ...], ...], ...];
        // longer inputs come back as several segments to concatenate.
        let segments = body
            .get(0)
            .and_then(|v| v.as_array())
            .ok_or_else(|| TranslateError::ParsingError("unexpected response shape".into()))?;

        let translated: String = segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(|s| s.as_str()))
            .collect();

        if translated.is_empty() {
            return Err(TranslateError::ParsingError("empty translation".into()));
        }
        Ok(translated)
    }
}

/// Test translator that wraps each input in brackets with the target
/// language and counts provider calls.
#[derive(Default)]
pub struct MockTranslator {
    call_count: std::sync::atomic::AtomicUsize,
    fail: bool,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose every call fails, for the keep-original fallback path.
    pub fn failing() -> Self {
        Self {
            call_count: std::sync::atomic::AtomicUsize::new(0),
            fail: true,
        }
    }

    /// Number of times the provider was actually invoked.
    pub fn call_count(&self) -> usize {
        self.call_count.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslateError> {
        self.call_count
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.fail {
            return Err(TranslateError::ResponseError("mock failure".into()));
        }
        Ok(format!("{} [{}]", text, target_lang))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panchang_api::domain::{Astronomy, LunarLabel, Panchang, PanchangElement, WindowPeriod, WindowQuality};

    fn sample_day() -> CalendarDay {
        CalendarDay {
            date: chrono::NaiveDate::from_ymd_opt(2025, 1, 14).unwrap(),
            panchang: Some(Panchang {
                tithi: Some(PanchangElement {
                    name: "Pratipada".into(),
                    end_time: Some("10:28 AM".into()),
                }),
                nakshatra: None,
                yoga: None,
                karana: None,
                paksha: Some("Shukla".into()),
            }),
            astronomy: Astronomy {
                sunrise: "7:22 AM".into(),
                sunset: "6:09 PM".into(),
                moonrise: None,
                moonset: None,
                moon_phase: 0.98,
            },
            lunar: LunarLabel {
                month_name: "Posh".into(),
                era_year: 2081,
                paksha: "Sud".into(),
                display_text: "Posh Sud 15".into(),
            },
        }
    }

    #[tokio::test]
    async fn english_never_calls_the_provider() {
        let translator = MockTranslator::new();
        let day = translate_day(&translator, sample_day(), "en").await;
        assert_eq!(day.lunar.display_text, "Posh Sud 15");
        assert_eq!(translator.call_count(), 0);
    }

    #[tokio::test]
    async fn translates_allowed_day_fields() {
        let translator = MockTranslator::new();
        let day = translate_day(&translator, sample_day(), "gu").await;

        assert_eq!(day.lunar.month_name, "Posh [gu]");
        assert_eq!(day.lunar.display_text, "Posh Sud 15 [gu]");
        let panchang = day.panchang.unwrap();
        let tithi = panchang.tithi.unwrap();
        assert_eq!(tithi.name, "Pratipada [gu]");
        // End times are clock labels, not display text; they stay untouched.
        assert_eq!(tithi.end_time.as_deref(), Some("10:28 AM"));
        assert_eq!(panchang.paksha.as_deref(), Some("Shukla [gu]"));
    }

    #[tokio::test]
    async fn window_translation_touches_kind_only() {
        let translator = MockTranslator::new();
        let windows = vec![TimeWindow {
            kind: "Amrit Muhurat".into(),
            start: "7:45 AM".into(),
            end: "9:09 AM".into(),
            quality: WindowQuality::Good,
            period: WindowPeriod::Day,
        }];

        let translated = translate_window_kinds(&translator, windows, "hi").await;
        assert_eq!(translated[0].kind, "Amrit Muhurat [hi]");
        assert_eq!(translated[0].start, "7:45 AM");
        assert_eq!(translated[0].quality, WindowQuality::Good);
        assert_eq!(translator.call_count(), 1);
    }

    #[tokio::test]
    async fn failed_field_keeps_original_text() {
        let translator = MockTranslator::failing();
        let day = translate_day(&translator, sample_day(), "gu").await;
        assert_eq!(day.lunar.month_name, "Posh");
        assert_eq!(day.lunar.display_text, "Posh Sud 15");
        assert!(translator.call_count() > 0);
    }
}
