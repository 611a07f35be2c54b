///! Turns raw API readings into display-ready report entries
///!
///! Correlation ids (`wid<i>` for weather, `aid<i>` for air quality) link
///! each entry's icon attachment to its `cid:` reference in the mail body.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Timelike};
use serde::Serialize;
use skywatch_common::{AirQualityReading, HourlyReading, Indicator, Measurement, ThresholdTable};

const WEATHER_ICON_DIR: &str = "summary-icons";
const LEGEND_ICON_DIR: &str = "legends";
const ICON_EXTENSION: &str = "png";

/// Local hours included in the daily forecast mail.
pub const FORECAST_HOURS: [u32; 8] = [8, 10, 12, 14, 16, 18, 20, 22];

/// A value with its unit, e.g. `14.2 C`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quantity {
    pub value: f64,
    pub units: String,
}

impl From<&Measurement<f64>> for Quantity {
    fn from(m: &Measurement<f64>) -> Self {
        Self {
            value: m.value,
            units: m.units.clone().unwrap_or_default(),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.units.is_empty() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.units)
        }
    }
}

/// One forecast hour, ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherEntry {
    /// Hour of day in the report's time zone
    pub hour: u32,
    /// Weather code as reported, e.g. "partly_cloudy"
    pub weather_code: String,
    /// Icon path relative to the asset directory
    pub weather_image: PathBuf,
    pub cid: String,
    pub temp: Quantity,
    pub humidity: Quantity,
    pub wind_speed: Quantity,
}

/// One indicator's current air-quality value, ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirQualityEntry {
    pub indicator: Indicator,
    pub current_value: Option<f64>,
    pub units: Option<String>,
    /// Legend path relative to the asset directory
    pub image: PathBuf,
    pub cid: String,
}

fn icon_path(dir: &str, name: &str) -> PathBuf {
    PathBuf::from(dir).join(format!("{}.{}", name, ICON_EXTENSION))
}

/// Format hourly readings in input order, assigning `wid0`, `wid1`, …
pub fn format_weather_data<Tz: TimeZone>(records: &[HourlyReading], tz: &Tz) -> Vec<WeatherEntry> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| WeatherEntry {
            hour: record.observation_time.value.with_timezone(tz).hour(),
            weather_code: record.weather_code.value.clone(),
            weather_image: icon_path(WEATHER_ICON_DIR, &record.weather_code.value),
            cid: format!("wid{}", i),
            temp: Quantity::from(&record.temp),
            humidity: Quantity::from(&record.humidity),
            wind_speed: Quantity::from(&record.wind_speed),
        })
        .collect()
}

/// Format the realtime reading, one entry per indicator in
/// [`Indicator::ALL`] order, assigning `aid0`, `aid1`, …
pub fn format_air_quality_data(reading: &AirQualityReading) -> Vec<AirQualityEntry> {
    Indicator::ALL
        .iter()
        .enumerate()
        .map(|(i, indicator)| {
            let measurement = reading.measurement(*indicator);
            AirQualityEntry {
                indicator: *indicator,
                current_value: measurement.and_then(|m| m.value),
                units: measurement.and_then(|m| m.units.clone()),
                image: icon_path(LEGEND_ICON_DIR, indicator.as_str()),
                cid: format!("aid{}", i),
            }
        })
        .collect()
}

/// Keep readings that fall on `now`'s calendar date at one of the
/// [`FORECAST_HOURS`], both evaluated in `now`'s time zone.
pub fn filter_forecast_hours<Tz: TimeZone>(records: &[HourlyReading], now: &DateTime<Tz>) -> Vec<HourlyReading> {
    let tz = now.timezone();
    let today = now.date_naive();

    records
        .iter()
        .filter(|record| {
            let local = record.observation_time.value.with_timezone(&tz);
            local.date_naive() == today && FORECAST_HOURS.contains(&local.hour())
        })
        .cloned()
        .collect()
}

/// Entries whose current value is strictly above their indicator's limit,
/// in input order.
pub fn select_exceeded(entries: &[AirQualityEntry], thresholds: &ThresholdTable) -> Vec<AirQualityEntry> {
    entries
        .iter()
        .filter(|entry| thresholds.is_exceeded(entry.indicator, entry.current_value))
        .cloned()
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    pub(crate) fn hourly(at: DateTime<Utc>, code: &str, temp: f64) -> HourlyReading {
        let measure = |value: f64, units: &str| Measurement {
            value,
            units: Some(units.to_string()),
        };
        HourlyReading {
            lat: None,
            lon: None,
            observation_time: Measurement { value: at, units: None },
            weather_code: Measurement {
                value: code.to_string(),
                units: None,
            },
            temp: measure(temp, "C"),
            humidity: measure(60.0, "%"),
            wind_speed: measure(4.0, "m/s"),
        }
    }

    pub(crate) fn air_quality(values: &[(Indicator, f64)]) -> AirQualityReading {
        let mut reading = AirQualityReading::default();
        for (indicator, value) in values {
            let measurement = Some(Measurement {
                value: Some(*value),
                units: Some("µg/m3".to_string()),
            });
            match indicator {
                Indicator::Pm10 => reading.pm10 = measurement,
                Indicator::Pm25 => reading.pm25 = measurement,
                Indicator::O3 => reading.o3 = measurement,
                Indicator::No2 => reading.no2 = measurement,
                Indicator::Co => reading.co = measurement,
                Indicator::So2 => reading.so2 = measurement,
            }
        }
        reading
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_format_weather_data() {
        let records = vec![
            hourly(utc(2026, 10, 18, 8), "clear_day", 9.5),
            hourly(utc(2026, 10, 18, 10), "cloudy", 12.0),
            hourly(utc(2026, 10, 18, 12), "rain", 13.25),
        ];
        let entries = format_weather_data(&records, &Utc);

        assert_eq!(entries.len(), records.len());
        let cids: Vec<&str> = entries.iter().map(|e| e.cid.as_str()).collect();
        assert_eq!(cids, vec!["wid0", "wid1", "wid2"]);
        assert_eq!(entries[1].hour, 10);
        assert_eq!(entries[1].weather_image, PathBuf::from("summary-icons/cloudy.png"));
        assert_eq!(entries[2].temp.to_string(), "13.25 C");
        assert_eq!(entries[0].wind_speed.to_string(), "4 m/s");
    }

    #[test]
    fn test_format_weather_hour_uses_time_zone() {
        let records = vec![hourly(utc(2026, 10, 18, 6), "clear_day", 9.5)];
        let warsaw = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(format_weather_data(&records, &warsaw)[0].hour, 8);
    }

    #[test]
    fn test_format_air_quality_follows_indicator_order() {
        // Deliberately reversed input order
        let reading = air_quality(&[
            (Indicator::So2, 5.0),
            (Indicator::Co, 300.0),
            (Indicator::No2, 20.0),
            (Indicator::O3, 60.0),
            (Indicator::Pm25, 11.0),
            (Indicator::Pm10, 18.0),
        ]);
        let entries = format_air_quality_data(&reading);

        assert_eq!(entries.len(), Indicator::ALL.len());
        let order: Vec<Indicator> = entries.iter().map(|e| e.indicator).collect();
        assert_eq!(order, Indicator::ALL.to_vec());
        assert_eq!(entries[0].current_value, Some(18.0));
        assert_eq!(entries[0].cid, "aid0");
        assert_eq!(entries[5].cid, "aid5");
        assert_eq!(entries[3].image, PathBuf::from("legends/no2.png"));
    }

    #[test]
    fn test_format_air_quality_with_missing_indicators() {
        let entries = format_air_quality_data(&air_quality(&[(Indicator::Pm10, 18.0)]));
        assert_eq!(entries.len(), Indicator::ALL.len());
        assert_eq!(entries[1].current_value, None);
        assert_eq!(entries[1].units, None);
    }

    #[test]
    fn test_filter_forecast_hours_same_day_only() {
        let now = utc(2026, 10, 18, 6);
        let records = vec![
            hourly(utc(2026, 10, 18, 7), "a", 1.0),
            hourly(utc(2026, 10, 18, 8), "b", 1.0),
            hourly(utc(2026, 10, 18, 9), "c", 1.0),
            hourly(utc(2026, 10, 18, 22), "d", 1.0),
            hourly(utc(2026, 10, 19, 8), "e", 1.0),
            hourly(utc(2026, 11, 18, 10), "f", 1.0),
        ];
        let kept: Vec<String> = filter_forecast_hours(&records, &now)
            .into_iter()
            .map(|r| r.weather_code.value)
            .collect();
        assert_eq!(kept, vec!["b", "d"]);
    }

    #[test]
    fn test_filter_forecast_hours_all_target_hours() {
        let now = utc(2026, 10, 18, 0);
        let records: Vec<HourlyReading> = (0..24).map(|h| hourly(utc(2026, 10, 18, h), "x", 1.0)).collect();
        let hours: Vec<u32> = filter_forecast_hours(&records, &now)
            .iter()
            .map(|r| r.observation_time.value.hour())
            .collect();
        assert_eq!(hours, FORECAST_HOURS.to_vec());
    }

    #[test]
    fn test_select_exceeded() {
        let thresholds = ThresholdTable::from_limits([(Indicator::Co, 7000.0), (Indicator::No2, 230.0)]);
        let entries = format_air_quality_data(&air_quality(&[(Indicator::Co, 8000.0), (Indicator::No2, 100.0)]));

        let selected = select_exceeded(&entries, &thresholds);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].indicator, Indicator::Co);
        assert_eq!(selected[0].cid, "aid4");
    }

    #[test]
    fn test_select_exceeded_empty_when_below() {
        let thresholds = ThresholdTable::from_limits([(Indicator::Co, 7000.0), (Indicator::No2, 230.0)]);
        let entries = format_air_quality_data(&air_quality(&[(Indicator::Co, 6000.0), (Indicator::No2, 100.0)]));
        assert!(select_exceeded(&entries, &thresholds).is_empty());
    }
}
