/// Column names recognized in the spreadsheet export.
/// Unknown columns are ignored; missing ones read as empty strings.
pub const COL_DATE: &str = "date";
pub const COL_HEADLINE: &str = "headline";
pub const COL_DETAILS: &str = "details";
pub const COL_LABELS: &str = "labels";
pub const COL_LINK_TEXT: &str = "link_text";
pub const COL_LINK_URL: &str = "link_url";
pub const COL_SOCIAL_MESSAGE: &str = "social_message";
pub const COL_IMAGE_FRONT_URL: &str = "image_front_url";
pub const COL_IMAGE_FRONT_ARTIST: &str = "image_front_artist";
pub const COL_IMAGE_FRONT_ARTIST_URL: &str = "image_front_artist_url";
pub const COL_IMAGE_BACK_URL: &str = "image_back_url";
pub const COL_IMAGE_BACK_ARTIST: &str = "image_back_artist";
pub const COL_IMAGE_BACK_ARTIST_URL: &str = "image_back_artist_url";
pub const COL_IMAGE_ATTRIBUTIONS: &str = "image_attributions";

// Default literals substituted for empty cells
pub const DEFAULT_LINK_TEXT: &str = "Learn more";
pub const DEFAULT_LINK_URL: &str = "#";

/// Label that hides an action unless dev mode is on.
pub const TESTING_LABEL: &str = "testing";

/// Values of the `env` query parameter.
pub const ENV_DEV: &str = "dev";
pub const ENV_PRD: &str = "prd";

pub const DEFAULT_SHEET_URL: &str =
    "https://docs.google.com/spreadsheets/d/1kG5tVKYaz6Wny2wIZKmbhloD_3Bwl5NeqsPNNGxcHIA/export?format=csv";

/// Fixed key of the completion store; used as the file name on disk.
pub const COMPLETION_STORE_KEY: &str = "isf-completed-actions";

pub const DEFAULT_PORT: u16 = 8080;

/// Canonical `YYYY-MM-DD` rendering shared by action keys and the completion store.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";
