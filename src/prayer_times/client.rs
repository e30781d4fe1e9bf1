use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::config::ApiConfig;
use crate::models::{City, DateInfo, HijriDay, Schedule, ScheduleError};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("prayer-time source answered HTTP {0}")]
    Status(u16),
    #[error("prayer-time source returned code {code}: {status}")]
    Api { code: i64, status: String },
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid schedule: {0}")]
    Invalid(#[from] ScheduleError),
}

/// Whether a schedule is a fresh answer or a stored copy served because the
/// source could not be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Live,
    Cached,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub schedule: Schedule,
    pub origin: Origin,
}

/// Where daily schedules come from.
pub trait ScheduleSource: Send + Sync {
    fn fetch(&self, city: &City, date: NaiveDate) -> Result<Schedule, FetchError>;

    /// Like [`fetch`](Self::fetch), also telling whether the answer is live.
    fn fetch_tracked(&self, city: &City, date: NaiveDate) -> Result<Fetched, FetchError> {
        Ok(Fetched {
            schedule: self.fetch(city, date)?,
            origin: Origin::Live,
        })
    }
}

// ─── Response shape ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    status: String,
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct DayData {
    timings: HashMap<String, String>,
    #[serde(default)]
    date: Option<DateData>,
}

#[derive(Debug, Deserialize)]
struct DateData {
    readable: Option<String>,
    gregorian: Option<GregorianData>,
    hijri: Option<HijriData>,
}

#[derive(Debug, Deserialize)]
struct GregorianData {
    date: String,
}

#[derive(Debug, Deserialize)]
struct HijriData {
    day: String,
    month: HijriMonth,
    year: String,
}

#[derive(Debug, Deserialize)]
struct HijriMonth {
    #[serde(default)]
    en: String,
    #[serde(default)]
    ar: String,
}

/// Turns a `timingsByCity` response body into a schedule. The calendar date
/// comes from the response when present, otherwise from the request.
pub fn parse_response(body: &str, requested: NaiveDate) -> Result<Schedule, FetchError> {
    let envelope: Envelope = serde_json::from_str(body)?;
    if envelope.code != 200 {
        return Err(FetchError::Api {
            code: envelope.code,
            status: envelope.status,
        });
    }
    let day: DayData = serde_json::from_value(envelope.data)?;

    let (calendar_date, date_info) = match day.date {
        Some(date) => {
            let calendar_date = date
                .gregorian
                .and_then(|g| NaiveDate::parse_from_str(&g.date, "%d-%m-%Y").ok())
                .unwrap_or(requested);
            let hijri = date.hijri.map(|h| HijriDay {
                day: h.day,
                month_en: h.month.en,
                month_ar: h.month.ar,
                year: h.year,
            });
            (
                calendar_date,
                DateInfo {
                    readable: date.readable,
                    hijri,
                },
            )
        }
        None => (requested, DateInfo::default()),
    };

    let schedule = Schedule::from_timings(
        calendar_date,
        |name| day.timings.get(name.as_str()).map(String::as_str),
        date_info,
    )?;
    Ok(schedule)
}

// ─── HTTP client ────────────────────────────────────────────────────────────

/// Client for the Aladhan `timingsByCity` endpoint.
pub struct AladhanClient {
    client: Client,
    base_url: String,
    method: u8,
}

impl AladhanClient {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("vakit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            method: config.method,
        })
    }

    fn endpoint(&self, date: NaiveDate) -> String {
        format!("{}/timingsByCity/{}", self.base_url, date.format("%d-%m-%Y"))
    }
}

impl ScheduleSource for AladhanClient {
    fn fetch(&self, city: &City, date: NaiveDate) -> Result<Schedule, FetchError> {
        let url = self.endpoint(date);
        let method = self.method.to_string();
        log::debug!("GET {} city={} country={}", url, city.name, city.country);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("city", city.name.as_str()),
                ("country", city.country.as_str()),
                ("method", method.as_str()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.text()?;
        parse_response(&body, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrayerName;
    use crate::models::schedule::tests::{day, hm};

    const BODY: &str = r#"{
        "code": 200,
        "status": "OK",
        "data": {
            "timings": {
                "Fajr": "05:48", "Sunrise": "07:13", "Dhuhr": "12:59", "Asr": "16:04",
                "Sunset": "18:35", "Maghrib": "18:35", "Isha": "19:54",
                "Imsak": "05:38", "Midnight": "00:59"
            },
            "date": {
                "readable": "18 Oct 2026",
                "timestamp": "1792281600",
                "gregorian": { "date": "18-10-2026", "format": "DD-MM-YYYY", "day": "18" },
                "hijri": {
                    "date": "06-05-1448",
                    "day": "6",
                    "month": { "number": 5, "en": "Jumādá al-ūlá", "ar": "جُمادى الأولى" },
                    "year": "1448"
                }
            },
            "meta": { "method": { "id": 13 } }
        }
    }"#;

    #[test]
    fn parses_timings_and_date_metadata() {
        let schedule = parse_response(BODY, day()).unwrap();
        assert_eq!(schedule.calendar_date(), day());
        assert_eq!(schedule.instant(PrayerName::Fajr), hm(5, 48));
        assert_eq!(schedule.instant(PrayerName::Isha), hm(19, 54));
        let hijri = schedule.date_info().hijri.as_ref().unwrap();
        assert_eq!(hijri.day, "6");
        assert_eq!(hijri.month_ar, "جُمادى الأولى");
        assert_eq!(schedule.date_info().readable.as_deref(), Some("18 Oct 2026"));
    }

    #[test]
    fn response_date_wins_over_requested_date() {
        let yesterday = day().pred_opt().unwrap();
        let schedule = parse_response(BODY, yesterday).unwrap();
        assert_eq!(schedule.calendar_date(), day());
    }

    #[test]
    fn error_code_is_a_failure() {
        let body = r#"{"code": 400, "status": "BAD_REQUEST", "data": "Unable to locate city"}"#;
        match parse_response(body, day()) {
            Err(FetchError::Api { code, status }) => {
                assert_eq!(code, 400);
                assert_eq!(status, "BAD_REQUEST");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn malformed_json_is_a_failure() {
        assert!(matches!(parse_response("<html>", day()), Err(FetchError::Json(_))));
    }

    #[test]
    fn malformed_instant_rejects_the_response() {
        let body = BODY.replace("\"Asr\": \"16:04\"", "\"Asr\": \"--:--\"");
        assert!(matches!(
            parse_response(&body, day()),
            Err(FetchError::Invalid(ScheduleError::Malformed { .. }))
        ));
    }

    #[test]
    fn missing_date_block_uses_requested_day() {
        let body = r#"{"code":200,"data":{"timings":{
            "Fajr":"05:00","Sunrise":"06:30","Dhuhr":"12:30",
            "Asr":"15:45","Maghrib":"18:20","Isha":"19:50"}}}"#;
        let schedule = parse_response(body, day()).unwrap();
        assert_eq!(schedule.calendar_date(), day());
        assert_eq!(schedule.date_info(), &DateInfo::default());
    }

    #[test]
    fn endpoint_uses_day_month_year() {
        let client = AladhanClient::new(&ApiConfig {
            base_url: "https://api.aladhan.com/v1/".to_string(),
            ..ApiConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.endpoint(day()),
            "https://api.aladhan.com/v1/timingsByCity/18-10-2026"
        );
    }
}
