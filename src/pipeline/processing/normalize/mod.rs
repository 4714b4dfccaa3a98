use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::constants::*;
use crate::common::error::DateParseError;
use crate::common::types::{AttributedImage, ImageAttribution, NormalizedAction, RawRow};
use crate::metrics::IngestMetrics;
use crate::pipeline::processing::date_parser::parse_csv_date;

/// `<url> (<name>)`
static ATTRIBUTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*\(([^()]*)\)$").expect("valid attribution pattern"));

/// Default literals substituted for empty text cells. These differ between
/// deployments, so they are configuration rather than constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerProfile {
    pub headline: String,
    pub details: String,
    pub link_text: String,
    pub link_url: String,
    pub social_message: String,
}

impl Default for NormalizerProfile {
    fn default() -> Self {
        Self {
            headline: String::new(),
            details: String::new(),
            link_text: DEFAULT_LINK_TEXT.to_string(),
            link_url: DEFAULT_LINK_URL.to_string(),
            social_message: String::new(),
        }
    }
}

/// Trait for turning a decoded spreadsheet row into a domain record
pub trait Normalizer: Send + Sync {
    /// Normalize a row, reporting why it was rejected.
    fn try_normalize(&self, row: &RawRow) -> Result<NormalizedAction, DateParseError>;

    /// Like [`Normalizer::try_normalize`], but a rejected row is logged and
    /// counted as dropped. Every drop goes through here.
    fn normalize_or_drop(&self, row: &RawRow) -> Result<NormalizedAction, DateParseError> {
        self.try_normalize(row).map_err(|e| {
            warn!(date = row.get(COL_DATE), error = %e, "dropping row with invalid date");
            IngestMetrics::record_row_dropped();
            e
        })
    }

    /// `None` drops the row; the drop is logged and counted.
    fn normalize(&self, row: &RawRow) -> Option<NormalizedAction> {
        self.normalize_or_drop(row).ok()
    }
}

/// Maps raw spreadsheet columns onto [`NormalizedAction`].
///
/// Only the date decides whether a row survives; every other column falls
/// back to a default when empty.
#[derive(Debug, Clone, Default)]
pub struct FieldNormalizer {
    profile: NormalizerProfile,
}

impl FieldNormalizer {
    /// Empty link defaults in `profile` are replaced by the built-in ones, so
    /// `link_text` and `link_url` are never empty in a built record.
    pub fn new(mut profile: NormalizerProfile) -> Self {
        if profile.link_text.is_empty() {
            warn!("empty default link_text, using {:?}", DEFAULT_LINK_TEXT);
            profile.link_text = DEFAULT_LINK_TEXT.to_string();
        }
        if profile.link_url.is_empty() {
            warn!("empty default link_url, using {:?}", DEFAULT_LINK_URL);
            profile.link_url = DEFAULT_LINK_URL.to_string();
        }
        Self { profile }
    }
}

impl Normalizer for FieldNormalizer {
    fn try_normalize(&self, row: &RawRow) -> Result<NormalizedAction, DateParseError> {
        let date = parse_csv_date(row.get(COL_DATE))?;

        let image_front = AttributedImage {
            url: row.get(COL_IMAGE_FRONT_URL).to_string(),
            artist_name: row.get(COL_IMAGE_FRONT_ARTIST).to_string(),
            artist_url: row.get(COL_IMAGE_FRONT_ARTIST_URL).to_string(),
        };
        let image_back = AttributedImage {
            url: or_default(row.get(COL_IMAGE_BACK_URL), &image_front.url),
            artist_name: or_default(row.get(COL_IMAGE_BACK_ARTIST), &image_front.artist_name),
            artist_url: or_default(row.get(COL_IMAGE_BACK_ARTIST_URL), &image_front.artist_url),
        };

        Ok(NormalizedAction {
            date,
            headline: or_default(row.get(COL_HEADLINE), &self.profile.headline),
            details: or_default(row.get(COL_DETAILS), &self.profile.details),
            link_text: or_default(row.get(COL_LINK_TEXT), &self.profile.link_text),
            link_url: or_default(row.get(COL_LINK_URL), &self.profile.link_url),
            social_message: or_default(row.get(COL_SOCIAL_MESSAGE), &self.profile.social_message),
            labels: parse_labels(row.get(COL_LABELS)),
            image_front,
            image_back,
            image_attributions: parse_image_attributions(row.get(COL_IMAGE_ATTRIBUTIONS)),
        })
    }
}

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Comma-separated, trimmed, lowercased; empty tokens removed, order and
/// duplicates kept.
pub fn parse_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect()
}

/// One attribution per non-blank line. Lines that do not look like
/// `<url> (<name>)` are kept whole as the url with an empty name.
pub fn parse_image_attributions(raw: &str) -> Vec<ImageAttribution> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match ATTRIBUTION_LINE.captures(line) {
            Some(caps) => ImageAttribution {
                url: caps[1].trim().to_string(),
                name: caps[2].trim().to_string(),
            },
            None => ImageAttribution {
                url: line.to_string(),
                name: String::new(),
            },
        })
        .collect()
}
