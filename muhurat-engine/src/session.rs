//! Screen-level orchestration of the panchang views.
//!
//! `PanchangSession` owns the month grid, the selected day's detail and
//! window list, and the translation caches. Month and day fetches are
//! tagged with a generation counter at issue time; a completion whose
//! generation no longer matches the current selection is discarded
//! silently, so rapid navigation can never apply a stale response.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use panchang_api::domain::{CalendarDay, LunarLabel, TimeWindow};
use panchang_api::FetchError;
use tracing::{debug, warn};

use crate::cache::{CacheKey, TranslationCache};
use crate::choghadiya::upcoming_windows;
use crate::grid::{build_month_grid, MonthGrid};
use crate::moon::moon_phase_index;
use crate::ticker::WindowTicker;
use crate::translate::{translate_day, translate_window_kinds, Translator};

/// Backend operations the session needs, abstracted for testing.
#[async_trait]
pub trait PanchangApi: Send + Sync {
    async fn month_grid(
        &self,
        month: u32,
        year: i32,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<CalendarDay>, FetchError>;

    async fn day_detail(
        &self,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
    ) -> Result<CalendarDay, FetchError>;

    async fn windows(
        &self,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<TimeWindow>, FetchError>;
}

#[async_trait]
impl PanchangApi for panchang_api::Client {
    async fn month_grid(
        &self,
        month: u32,
        year: i32,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<CalendarDay>, FetchError> {
        panchang_api::Client::month_grid(self, month, year, latitude, longitude).await
    }

    async fn day_detail(
        &self,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
    ) -> Result<CalendarDay, FetchError> {
        panchang_api::Client::day_detail(self, date, latitude, longitude).await
    }

    async fn windows(
        &self,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<TimeWindow>, FetchError> {
        panchang_api::Client::windows(self, date, latitude, longitude).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Location collaborator state. Anything but `Granted` defers all fetching;
/// the awaiting-location state is distinct from an error.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LocationAccess {
    Granted(Coordinates),
    Denied,
    #[default]
    Undetermined,
}

impl LocationAccess {
    fn coordinates(&self) -> Option<Coordinates> {
        match self {
            LocationAccess::Granted(coordinates) => Some(*coordinates),
            _ => None,
        }
    }
}

/// A fully loaded, translated day: the cached unit of the day cache.
#[derive(Debug, Clone, PartialEq)]
pub struct DayPayload {
    pub detail: CalendarDay,
    pub windows: Vec<TimeWindow>,
    /// Untranslated lunar label; the moon resolver parses its English form.
    pub lunar_raw: LunarLabel,
}

impl DayPayload {
    pub fn moon_index(&self) -> usize {
        moon_phase_index(
            Some(&self.lunar_raw.display_text),
            self.detail.astronomy.moon_phase,
        )
    }
}

/// Moon-glyph index for a grid cell, whose label is never translated.
pub fn moon_index_for(day: &CalendarDay) -> usize {
    moon_phase_index(Some(&day.lunar.display_text), day.astronomy.moon_phase)
}

#[derive(Debug, Clone, Default)]
struct ViewState {
    grid: Option<MonthGrid>,
    selected_date: Option<NaiveDate>,
    detail: Option<CalendarDay>,
    windows: Vec<TimeWindow>,
    lunar_raw: Option<LunarLabel>,
}

/// Snapshot of the selected day for rendering.
#[derive(Debug, Clone)]
pub struct SelectedDay {
    pub date: NaiveDate,
    pub detail: Option<CalendarDay>,
    pub windows: Vec<TimeWindow>,
    pub moon_index: Option<usize>,
}

pub struct PanchangSession {
    api: Arc<dyn PanchangApi>,
    translator: Arc<dyn Translator>,
    language: Mutex<String>,
    location: Mutex<LocationAccess>,
    state: Mutex<ViewState>,
    day_cache: Arc<TranslationCache<DayPayload>>,
    muhurat_cache: Arc<TranslationCache<Vec<TimeWindow>>>,
    month_generation: AtomicU64,
    day_generation: AtomicU64,
}

impl PanchangSession {
    pub fn new(
        api: Arc<dyn PanchangApi>,
        translator: Arc<dyn Translator>,
        language: impl Into<String>,
        location: LocationAccess,
    ) -> Self {
        Self {
            api,
            translator,
            language: Mutex::new(language.into()),
            location: Mutex::new(location),
            state: Mutex::new(ViewState::default()),
            day_cache: Arc::new(TranslationCache::new()),
            muhurat_cache: Arc::new(TranslationCache::new()),
            month_generation: AtomicU64::new(0),
            day_generation: AtomicU64::new(0),
        }
    }

    pub fn set_location(&self, access: LocationAccess) {
        *self.location.lock().expect("location lock poisoned") = access;
    }

    /// Switching language invalidates in-flight responses (the cache keeps
    /// per-language entries, so nothing already translated is lost).
    pub fn set_language(&self, language: impl Into<String>) {
        *self.language.lock().expect("language lock poisoned") = language.into();
        self.month_generation.fetch_add(1, Ordering::SeqCst);
        self.day_generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn language(&self) -> String {
        self.language.lock().expect("language lock poisoned").clone()
    }

    pub fn is_awaiting_location(&self) -> bool {
        self.location
            .lock()
            .expect("location lock poisoned")
            .coordinates()
            .is_none()
    }

    pub fn grid(&self) -> Option<MonthGrid> {
        self.state.lock().expect("state lock poisoned").grid.clone()
    }

    pub fn selected(&self) -> Option<SelectedDay> {
        let state = self.state.lock().expect("state lock poisoned");
        let date = state.selected_date?;
        let moon_index = state.lunar_raw.as_ref().map(|lunar| {
            moon_phase_index(
                Some(&lunar.display_text),
                state
                    .detail
                    .as_ref()
                    .map(|d| d.astronomy.moon_phase)
                    .unwrap_or(0.0),
            )
        });
        Some(SelectedDay {
            date,
            detail: state.detail.clone(),
            windows: state.windows.clone(),
            moon_index,
        })
    }

    /// Start the 1 Hz ticker over the selected day's windows. `None` when
    /// no day is selected or its window list is empty.
    pub fn start_ticker(&self) -> Option<WindowTicker> {
        let windows = self.state.lock().expect("state lock poisoned").windows.clone();
        WindowTicker::start(windows)
    }

    /// Fetch and apply a month of day records, then auto-select today if
    /// the month being shown is the current one.
    #[tracing::instrument(skip(self))]
    pub async fn select_month(&self, year: i32, month: u32) -> Result<(), FetchError> {
        let Some(coordinates) = self.location.lock().expect("location lock poisoned").coordinates()
        else {
            debug!("No location yet, deferring month fetch");
            return Ok(());
        };

        let generation = self.month_generation.fetch_add(1, Ordering::SeqCst) + 1;
        // Navigating months discards the previous selection.
        self.day_generation.fetch_add(1, Ordering::SeqCst);
        {
            let mut state = self.state.lock().expect("state lock poisoned");
            state.selected_date = None;
            state.detail = None;
            state.windows = Vec::new();
            state.lunar_raw = None;
        }

        let days = self
            .api
            .month_grid(month, year, coordinates.latitude, coordinates.longitude)
            .await?;

        if self.month_generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding stale month response for {}-{}", year, month);
            return Ok(());
        }

        let grid = build_month_grid(days, year, month);
        let today = Local::now().date_naive();
        let auto_select = grid.today(today).map(|day| day.date);

        self.state.lock().expect("state lock poisoned").grid = Some(grid);

        if let Some(date) = auto_select {
            self.select_date(date).await?;
        }
        Ok(())
    }

    /// Load a day's detail and window list concurrently, translate, cache,
    /// and apply. Either half failing leaves the other intact; the failed
    /// half renders empty.
    #[tracing::instrument(skip(self))]
    pub async fn select_date(&self, date: NaiveDate) -> Result<(), FetchError> {
        let Some(coordinates) = self.location.lock().expect("location lock poisoned").coordinates()
        else {
            debug!("No location yet, deferring day fetch");
            return Ok(());
        };

        let generation = self.day_generation.fetch_add(1, Ordering::SeqCst) + 1;
        // Selection highlight updates immediately, even before data lands.
        self.state.lock().expect("state lock poisoned").selected_date = Some(date);

        let language = self.language();
        let cache_key = CacheKey::new(language.clone(), date.format("%Y-%m-%d").to_string());

        if let Some(cached) = self.day_cache.get(&cache_key) {
            self.apply_day(generation, date, Some(cached.detail), cached.windows, Some(cached.lunar_raw));
            return Ok(());
        }

        let (detail_result, windows_result) = tokio::join!(
            self.api
                .day_detail(date, coordinates.latitude, coordinates.longitude),
            self.api
                .windows(date, coordinates.latitude, coordinates.longitude),
        );

        let windows = match windows_result {
            Ok(windows) => windows,
            Err(e) => {
                warn!("Window list fetch failed for {}: {}", date, e);
                Vec::new()
            }
        };
        let detail = match detail_result {
            Ok(detail) => Some(detail),
            Err(e) => {
                warn!("Day detail fetch failed for {}: {}", date, e);
                None
            }
        };

        let windows = translate_window_kinds(self.translator.as_ref(), windows, &language).await;

        let mut lunar_raw = None;
        let detail = match detail {
            Some(day) => {
                let raw = day.lunar.clone();
                let translated = translate_day(self.translator.as_ref(), day, &language).await;
                lunar_raw = Some(raw);
                Some(translated)
            }
            None => None,
        };

        // Only a complete detail is worth caching; a half-empty day should
        // be refetched next time.
        if let (Some(detail), Some(lunar_raw)) = (detail.as_ref(), lunar_raw.as_ref()) {
            self.day_cache.insert(
                cache_key,
                DayPayload {
                    detail: detail.clone(),
                    windows: windows.clone(),
                    lunar_raw: lunar_raw.clone(),
                },
            );
        }

        self.apply_day(generation, date, detail, windows, lunar_raw);
        Ok(())
    }

    fn apply_day(
        &self,
        generation: u64,
        date: NaiveDate,
        detail: Option<CalendarDay>,
        windows: Vec<TimeWindow>,
        lunar_raw: Option<LunarLabel>,
    ) {
        if self.day_generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding stale day response for {}", date);
            return;
        }
        let mut state = self.state.lock().expect("state lock poisoned");
        state.selected_date = Some(date);
        state.detail = detail;
        state.windows = windows;
        state.lunar_raw = lunar_raw;
    }

    /// Translated muhurat slots for a date, filtered to the ones still
    /// ahead of the user when the date is today. Failures come back as an
    /// empty list; the view renders "no slots" rather than an error.
    #[tracing::instrument(skip(self))]
    pub async fn muhurat_list(&self, date: NaiveDate) -> Vec<TimeWindow> {
        let Some(coordinates) = self.location.lock().expect("location lock poisoned").coordinates()
        else {
            debug!("No location yet, deferring muhurat fetch");
            return Vec::new();
        };

        let now = Local::now().naive_local();
        let language = self.language();
        let cache_key = CacheKey::new(
            language.clone(),
            format!("muhurat:{}", date.format("%Y-%m-%d")),
        );

        if let Some(cached) = self.muhurat_cache.get(&cache_key) {
            return upcoming_windows(&cached, date, now);
        }

        let windows = match self
            .api
            .windows(date, coordinates.latitude, coordinates.longitude)
            .await
        {
            Ok(windows) => windows,
            Err(e) => {
                warn!("Muhurat fetch failed for {}: {}", date, e);
                return Vec::new();
            }
        };

        let translated = translate_window_kinds(self.translator.as_ref(), windows, &language).await;
        if !translated.is_empty() {
            self.muhurat_cache.insert(cache_key, translated.clone());
        }
        upcoming_windows(&translated, date, now)
    }
}

/// Mock backend with per-endpoint call counters and optional per-date
/// latency, for exercising the staleness protection.
#[derive(Default)]
pub struct MockPanchangApi {
    month_days: Mutex<HashMap<(i32, u32), Vec<CalendarDay>>>,
    details: Mutex<HashMap<NaiveDate, CalendarDay>>,
    windows: Mutex<HashMap<NaiveDate, Vec<TimeWindow>>>,
    delays: Mutex<HashMap<NaiveDate, std::time::Duration>>,
    fail_details: Mutex<std::collections::HashSet<NaiveDate>>,
    fail_windows: Mutex<std::collections::HashSet<NaiveDate>>,
    detail_calls: AtomicUsize,
    window_calls: AtomicUsize,
    month_calls: AtomicUsize,
}

impl MockPanchangApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_month(self, year: i32, month: u32, days: Vec<CalendarDay>) -> Self {
        self.month_days.lock().unwrap().insert((year, month), days);
        self
    }

    pub fn with_day(self, day: CalendarDay, windows: Vec<TimeWindow>) -> Self {
        let date = day.date;
        self.details.lock().unwrap().insert(date, day);
        self.windows.lock().unwrap().insert(date, windows);
        self
    }

    pub fn with_delay(self, date: NaiveDate, delay: std::time::Duration) -> Self {
        self.delays.lock().unwrap().insert(date, delay);
        self
    }

    pub fn failing_detail(self, date: NaiveDate) -> Self {
        self.fail_details.lock().unwrap().insert(date);
        self
    }

    pub fn failing_windows(self, date: NaiveDate) -> Self {
        self.fail_windows.lock().unwrap().insert(date);
        self
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn window_calls(&self) -> usize {
        self.window_calls.load(Ordering::SeqCst)
    }

    pub fn month_calls(&self) -> usize {
        self.month_calls.load(Ordering::SeqCst)
    }

    async fn delay_for(&self, date: NaiveDate) {
        let delay = self.delays.lock().unwrap().get(&date).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl PanchangApi for MockPanchangApi {
    async fn month_grid(
        &self,
        month: u32,
        year: i32,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<Vec<CalendarDay>, FetchError> {
        self.month_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .month_days
            .lock()
            .unwrap()
            .get(&(year, month))
            .cloned()
            .unwrap_or_default())
    }

    async fn day_detail(
        &self,
        date: NaiveDate,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<CalendarDay, FetchError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.delay_for(date).await;
        if self.fail_details.lock().unwrap().contains(&date) {
            return Err(FetchError::Status(500));
        }
        self.details
            .lock()
            .unwrap()
            .get(&date)
            .cloned()
            .ok_or(FetchError::Status(404))
    }

    async fn windows(
        &self,
        date: NaiveDate,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<Vec<TimeWindow>, FetchError> {
        self.window_calls.fetch_add(1, Ordering::SeqCst);
        self.delay_for(date).await;
        if self.fail_windows.lock().unwrap().contains(&date) {
            return Err(FetchError::Status(500));
        }
        Ok(self
            .windows
            .lock()
            .unwrap()
            .get(&date)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::MockTranslator;
    use panchang_api::domain::{Astronomy, Panchang, PanchangElement, WindowPeriod, WindowQuality};

    fn ahmedabad() -> LocationAccess {
        LocationAccess::Granted(Coordinates {
            latitude: 23.0225,
            longitude: 72.5714,
        })
    }

    fn day(date: NaiveDate, display_text: &str) -> CalendarDay {
        CalendarDay {
            date,
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
                moon_phase: 0.35,
            },
            lunar: LunarLabel {
                month_name: "Posh".into(),
                era_year: 2081,
                paksha: "Sud".into(),
                display_text: display_text.into(),
            },
        }
    }

    fn slots() -> Vec<TimeWindow> {
        vec![TimeWindow {
            kind: "Amrit Muhurat".into(),
            start: "0:00".into(),
            end: "12:00".into(),
            quality: WindowQuality::Good,
            period: WindowPeriod::Day,
        }]
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn session(api: MockPanchangApi, language: &str) -> (Arc<MockPanchangApi>, PanchangSession) {
        let api = Arc::new(api);
        let session = PanchangSession::new(
            api.clone(),
            Arc::new(MockTranslator::new()),
            language,
            ahmedabad(),
        );
        (api, session)
    }

    #[tokio::test]
    async fn month_selection_builds_a_padded_grid() {
        let days: Vec<CalendarDay> = (1..=31)
            .map(|d| day(date(d), &format!("Posh Sud {}", d.min(15))))
            .collect();
        let (_, session) = session(MockPanchangApi::new().with_month(2025, 1, days), "en");

        session.select_month(2025, 1).await.unwrap();

        let grid = session.grid().unwrap();
        // January 2025 starts on a Wednesday.
        assert_eq!(grid.start_offset, 3);
        assert_eq!(grid.len(), 34);
    }

    #[tokio::test]
    async fn day_selection_joins_detail_and_windows() {
        let (api, session) = session(
            MockPanchangApi::new().with_day(day(date(14), "Posh Sud 15"), slots()),
            "en",
        );

        session.select_date(date(14)).await.unwrap();

        let selected = session.selected().unwrap();
        assert_eq!(selected.date, date(14));
        assert_eq!(selected.windows.len(), 1);
        assert_eq!(selected.detail.unwrap().lunar.display_text, "Posh Sud 15");
        // Full moon label wins over the 0.35 fraction.
        assert_eq!(selected.moon_index, Some(14));
        assert_eq!(api.detail_calls(), 1);
        assert_eq!(api.window_calls(), 1);
    }

    #[tokio::test]
    async fn second_selection_of_same_day_hits_the_cache() {
        let (api, session) = session(
            MockPanchangApi::new().with_day(day(date(14), "Posh Sud 15"), slots()),
            "gu",
        );

        session.select_date(date(14)).await.unwrap();
        session.select_date(date(14)).await.unwrap();

        assert_eq!(api.detail_calls(), 1);
        assert_eq!(api.window_calls(), 1);
        let selected = session.selected().unwrap();
        assert_eq!(selected.detail.unwrap().lunar.display_text, "Posh Sud 15 [gu]");
        // Raw label still drives the moon glyph after translation.
        assert_eq!(selected.moon_index, Some(14));
    }

    #[tokio::test]
    async fn language_change_refetches_and_caches_separately() {
        let (api, session) = session(
            MockPanchangApi::new().with_day(day(date(14), "Posh Sud 15"), slots()),
            "en",
        );

        session.select_date(date(14)).await.unwrap();
        session.set_language("hi");
        session.select_date(date(14)).await.unwrap();

        assert_eq!(api.detail_calls(), 2);
        let selected = session.selected().unwrap();
        assert_eq!(selected.windows[0].kind, "Amrit Muhurat [hi]");
    }

    #[tokio::test]
    async fn failed_windows_half_leaves_detail_intact() {
        let (api, session) = session(
            MockPanchangApi::new()
                .with_day(day(date(14), "Posh Sud 15"), slots())
                .failing_windows(date(14)),
            "en",
        );

        session.select_date(date(14)).await.unwrap();

        let selected = session.selected().unwrap();
        assert!(selected.detail.is_some());
        assert!(selected.windows.is_empty());
        // Incomplete days are not cached; a retry refetches both halves.
        session.select_date(date(14)).await.unwrap();
        assert_eq!(api.detail_calls(), 2);
    }

    #[tokio::test]
    async fn failed_detail_half_still_applies_windows() {
        let (_, session) = session(
            MockPanchangApi::new()
                .with_day(day(date(14), "Posh Sud 15"), slots())
                .failing_detail(date(14)),
            "en",
        );

        session.select_date(date(14)).await.unwrap();

        let selected = session.selected().unwrap();
        assert!(selected.detail.is_none());
        assert_eq!(selected.windows.len(), 1);
    }

    #[tokio::test]
    async fn no_location_defers_instead_of_fetching() {
        let api = Arc::new(MockPanchangApi::new());
        let session = PanchangSession::new(
            api.clone(),
            Arc::new(MockTranslator::new()),
            "en",
            LocationAccess::Undetermined,
        );

        session.select_month(2025, 1).await.unwrap();
        session.select_date(date(14)).await.unwrap();

        assert!(session.is_awaiting_location());
        assert!(session.grid().is_none());
        assert_eq!(api.month_calls(), 0);
        assert_eq!(api.detail_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_stale_response_never_overwrites_newer_selection() {
        let api = Arc::new(
            MockPanchangApi::new()
                .with_day(day(date(13), "Posh Sud 14"), slots())
                .with_day(day(date(14), "Posh Sud 15"), slots())
                .with_delay(date(13), std::time::Duration::from_millis(500))
                .with_delay(date(14), std::time::Duration::from_millis(50)),
        );
        let session = Arc::new(PanchangSession::new(
            api.clone(),
            Arc::new(MockTranslator::new()),
            "en",
            ahmedabad(),
        ));

        let slow = tokio::spawn({
            let session = session.clone();
            async move { session.select_date(date(13)).await }
        });
        // Let the slow fetch get in flight before selecting the newer date.
        tokio::task::yield_now().await;

        session.select_date(date(14)).await.unwrap();
        slow.await.unwrap().unwrap();

        let selected = session.selected().unwrap();
        assert_eq!(selected.date, date(14));
        assert_eq!(selected.detail.unwrap().lunar.display_text, "Posh Sud 15");
    }

    #[tokio::test]
    async fn muhurat_list_caches_per_language_and_date() {
        let (api, session) = session(
            MockPanchangApi::new().with_day(day(date(20), "Posh Vad 5"), slots()),
            "gu",
        );

        let first = session.muhurat_list(date(20)).await;
        let second = session.muhurat_list(date(20)).await;

        assert_eq!(api.window_calls(), 1);
        assert_eq!(first[0].kind, "Amrit Muhurat [gu]");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn muhurat_fetch_failure_degrades_to_empty_list() {
        let (_, session) = session(
            MockPanchangApi::new().failing_windows(date(20)),
            "en",
        );

        assert!(session.muhurat_list(date(20)).await.is_empty());
    }

    #[tokio::test]
    async fn ticker_starts_only_with_window_data() {
        let (_, session) = session(
            MockPanchangApi::new().with_day(day(date(14), "Posh Sud 15"), vec![]),
            "en",
        );

        session.select_date(date(14)).await.unwrap();
        assert!(session.start_ticker().is_none());
    }
}
