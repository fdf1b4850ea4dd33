mod config;

use std::sync::Arc;

use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use config::PanchangConfig;
use muhurat_engine::{
    moon_index_for, Coordinates, HttpTranslator, LocationAccess, PanchangSession,
};
use panchang_api::{Client, PanchangUrl};

#[derive(Parser)]
#[command(name = "panchang-cli", about = "Panchang calendar and live choghadiya in the terminal")]
struct Opts {
    /// Month to show as YYYY-MM; defaults to the current month
    month: Option<String>,
    /// Date to show the day card for; defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Keep running and print the live choghadiya card once per second
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let config = PanchangConfig::load()?;

    let location = match (config.latitude, config.longitude) {
        (Some(latitude), Some(longitude)) => LocationAccess::Granted(Coordinates {
            latitude,
            longitude,
        }),
        _ => LocationAccess::Undetermined,
    };

    let api = Arc::new(Client::new(PanchangUrl::new(config.api_url.clone())));
    let translator = Arc::new(HttpTranslator::default());
    let session = PanchangSession::new(api, translator, config.language.clone(), location);

    if session.is_awaiting_location() {
        println!("Awaiting location: set latitude and longitude in the config file");
        println!("  ({})", PanchangConfig::config_path()?.display());
        return Ok(());
    }

    let today = Local::now().date_naive();
    let (year, month) = match &opts.month {
        Some(raw) => parse_month(raw)?,
        None => (today.year(), today.month()),
    };

    if let Err(e) = session.select_month(year, month).await {
        warn!("Month fetch failed: {}", e);
    }
    if let Some(date) = opts.date {
        if let Err(e) = session.select_date(date).await {
            warn!("Day fetch failed: {}", e);
        }
    }

    print_grid(&session, year, month);
    print_day_card(&session);

    if opts.watch {
        watch_choghadiya(&session).await;
    }

    Ok(())
}

fn parse_month(raw: &str) -> Result<(i32, u32)> {
    let (year, month) = raw
        .split_once('-')
        .ok_or_else(|| anyhow::anyhow!("Expected YYYY-MM, got {:?}", raw))?;
    let year: i32 = year.parse()?;
    let month: u32 = month.parse()?;
    if !(1..=12).contains(&month) {
        anyhow::bail!("Month out of range: {}", month);
    }
    Ok((year, month))
}

fn print_grid(session: &PanchangSession, year: i32, month: u32) {
    let Some(grid) = session.grid() else {
        println!("No calendar data for {}-{:02}", year, month);
        return;
    };

    println!("{}-{:02}", year, month);
    println!(" Sun  Mon  Tue  Wed  Thu  Fri  Sat");
    for (index, cell) in grid.cells().iter().enumerate() {
        match cell {
            Some(day) => print!("{:>3}{} ", day.date.day(), moon_glyph(moon_index_for(day))),
            None => print!("     "),
        }
        if index % 7 == 6 {
            println!();
        }
    }
    println!();
}

/// Rough terminal stand-in for the thirty moon-phase images.
fn moon_glyph(index: usize) -> char {
    match index {
        0..=3 | 26..=29 => '🌑',
        4..=10 => '🌓',
        11..=17 => '🌕',
        _ => '🌗',
    }
}

fn print_day_card(session: &PanchangSession) {
    let Some(selected) = session.selected() else {
        return;
    };

    println!("== {} ==", selected.date);
    if let Some(detail) = &selected.detail {
        println!(
            "{} {} (moon {}/29)",
            detail.lunar.month_name,
            detail.lunar.era_year,
            selected.moon_index.unwrap_or_default()
        );
        println!("{}", detail.lunar.display_text);
        if let Some(panchang) = &detail.panchang {
            for (label, element) in [
                ("Tithi", &panchang.tithi),
                ("Nakshatra", &panchang.nakshatra),
                ("Yoga", &panchang.yoga),
                ("Karana", &panchang.karana),
            ] {
                if let Some(element) = element {
                    match &element.end_time {
                        Some(end) => println!("{:<10} {} (until {})", label, element.name, end),
                        None => println!("{:<10} {}", label, element.name),
                    }
                }
            }
        }
        println!(
            "Sunrise {}  Sunset {}  Moonrise {}  Moonset {}",
            detail.astronomy.sunrise,
            detail.astronomy.sunset,
            detail.astronomy.moonrise.as_deref().unwrap_or("--:--"),
            detail.astronomy.moonset.as_deref().unwrap_or("--:--"),
        );
    } else {
        println!("(day detail unavailable)");
    }

    if selected.windows.is_empty() {
        println!("(no choghadiya data)");
    } else {
        println!("Choghadiya:");
        for window in &selected.windows {
            println!(
                "  {:<20} {:>8} - {:<8} {:?} ({:?})",
                window.kind, window.start, window.end, window.quality, window.period
            );
        }
    }
}

async fn watch_choghadiya(session: &PanchangSession) {
    let Some(ticker) = session.start_ticker() else {
        println!("Nothing to watch: no window data for the selected day");
        return;
    };
    let mut rx = ticker.subscribe();

    println!("Watching (Ctrl-C to stop)…");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = rx.borrow().clone();
                match (&status.current, &status.remaining) {
                    (Some(current), Some(remaining)) => {
                        let next = status
                            .next
                            .as_ref()
                            .map(|w| w.kind.as_str())
                            .unwrap_or("—");
                        print!("\r{} ({:?})  {} left  next: {}   ", current.kind, current.quality, remaining, next);
                        use std::io::Write;
                        let _ = std::io::stdout().flush();
                    }
                    _ => {
                        print!("\r(no active window)               ");
                        use std::io::Write;
                        let _ = std::io::stdout().flush();
                    }
                }
            }
        }
    }
    ticker.stop();
    println!();
}
