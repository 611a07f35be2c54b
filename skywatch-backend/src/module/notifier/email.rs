use std::path::PathBuf;

use crate::module::formatter::{AirQualityEntry, WeatherEntry};

/// A local file attached inline and referenced from the HTML as `cid:<cid>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Path relative to the asset directory
    pub path: PathBuf,
    pub cid: String,
}

impl From<&WeatherEntry> for Attachment {
    fn from(entry: &WeatherEntry) -> Self {
        Self {
            path: entry.weather_image.clone(),
            cid: entry.cid.clone(),
        }
    }
}

impl From<&AirQualityEntry> for Attachment {
    fn from(entry: &AirQualityEntry) -> Self {
        Self {
            path: entry.image.clone(),
            cid: entry.cid.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    /// Display name and address, e.g. `Skywatch <reports@example.org>`
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attachments: Vec<Attachment>,
}
