/// Constants used by monetary conversion and metric scaling.
pub mod money {
    /// Micros per whole currency unit in Google Ads monetary fields.
    pub const MICROS_PER_UNIT: i64 = 1_000_000;
    /// Fractional digits carried by currency amounts (cost, conversion value).
    pub const CURRENCY_SCALE: u32 = 2;
    /// Fractional digits carried by per-click and per-mille averages (CPC, CPM).
    pub const AVERAGE_SCALE: u32 = 3;
    /// Fractional digits carried by rate metrics (CTR, impression share).
    pub const RATE_SCALE: u32 = 4;
    /// Impressions per mille, the CPM multiplier.
    pub const PER_MILLE: u32 = 1_000;
}

/// Constants used by record normalization.
pub mod normalize {
    /// Fallback cell emitted when a coded field is absent or unrecognized.
    pub const UNDEFINED_VALUE: &str = "UNDEFINED";
    /// Channel-type label stamped on Performance Max placeholder columns.
    pub const PERFORMANCE_MAX_LABEL: &str = "PERFORMANCE_MAX";
    /// Separator whose last occurrence marks the ARC suffix of a campaign name.
    pub const ARC_DELIMITER: char = ':';
}

/// Constants used by date parsing and range presets.
pub mod dates {
    /// Date string formats accepted anywhere a date argument is read.
    pub const SUPPORTED_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];
    /// Days covered by the rolling `last30` preset.
    pub const LAST_30_DAYS_SPAN: i64 = 30;
}

/// Constants used by argument resolution and interactive prompts.
pub mod cli {
    /// Reply that leaves the program from any prompt.
    pub const EXIT_SENTINEL: &str = "exit";
    /// Toggle argument values that switch a dimension block on.
    pub const TOGGLE_INCLUDE_VALUES: [&str; 6] = ["include", "in", "yes", "y", "true", "1"];
    /// Toggle argument values that switch a dimension block off.
    pub const TOGGLE_EXCLUDE_VALUES: [&str; 6] = ["exclude", "ex", "no", "n", "false", "0"];
}

/// Constants used by CSV export and table rendering.
pub mod output {
    /// Prefix of default CSV export filenames.
    pub const CSV_FILE_PREFIX: &str = "gads_report_";
    /// Timestamp format embedded in default CSV filenames.
    pub const FILENAME_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
    /// Extension appended to CSV export filenames.
    pub const CSV_EXTENSION: &str = "csv";
    /// Characters stripped from user-supplied filenames.
    pub const INVALID_FILENAME_CHARS: &str = "<>:\"/\\|?*";
    /// Column gap used by the aligned text renderer.
    pub const TABLE_COLUMN_GAP: usize = 2;
}
