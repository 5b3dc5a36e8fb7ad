use crate::i18n::SupportedLocale;

/// All localized strings the time-range resolver renders for a locale
#[derive(Debug, Clone)]
pub struct LocaleStrings {
    // ==================== Range Labels ====================
    /// Label for `last_7_days`
    pub range_last_7_days: &'static str,

    /// Label for `last_30_days`
    pub range_last_30_days: &'static str,

    /// Label for `last_90_days`
    pub range_last_90_days: &'static str,

    /// Label for `last_quarter`
    pub range_last_quarter: &'static str,

    /// Label for `this_quarter_to_date`
    pub range_this_quarter_to_date: &'static str,

    /// Label for `last_12_months`
    pub range_last_12_months: &'static str,

    // ==================== Short Dates ====================
    /// Abbreviated month names, January first
    pub month_abbreviations: [&'static str; 12],

    /// Whether short dates put the day before the month ("1 ott" vs "Oct 1")
    pub day_first: bool,
}

// ==================== English Strings ====================

/// English strings (default locale)
pub const ENGLISH_STRINGS: LocaleStrings = LocaleStrings {
    range_last_7_days: "Last 7 days",
    range_last_30_days: "Last 30 days",
    range_last_90_days: "Last 90 days",
    range_last_quarter: "Last quarter",
    range_this_quarter_to_date: "This quarter to date",
    range_last_12_months: "Last 12 months",

    month_abbreviations: [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ],
    day_first: false,
};

// ==================== Italian Strings ====================

/// Italian strings
pub const ITALIAN_STRINGS: LocaleStrings = LocaleStrings {
    range_last_7_days: "Ultimi 7 giorni",
    range_last_30_days: "Ultimi 30 giorni",
    range_last_90_days: "Ultimi 90 giorni",
    range_last_quarter: "Ultimo trimestre",
    range_this_quarter_to_date: "Trimestre in corso",
    range_last_12_months: "Ultimi 12 mesi",

    month_abbreviations: [
        "gen", "feb", "mar", "apr", "mag", "giu", "lug", "ago", "set", "ott", "nov", "dic",
    ],
    day_first: true,
};

impl LocaleStrings {
    /// Get the strings for a locale.
    pub fn for_locale(locale: SupportedLocale) -> &'static LocaleStrings {
        match locale {
            SupportedLocale::English => &ENGLISH_STRINGS,
            SupportedLocale::Italian => &ITALIAN_STRINGS,
        }
    }

    /// Format a month/day pair the way the locale abbreviates dates.
    ///
    /// `month` is 1-based. Out-of-range months render the bare day.
    pub fn short_date(&self, month: u32, day: u32) -> String {
        let Some(name) = month
            .checked_sub(1)
            .and_then(|index| self.month_abbreviations.get(index as usize))
        else {
            return day.to_string();
        };

        if self.day_first {
            format!("{} {}", day, name)
        } else {
            format!("{} {}", name, day)
        }
    }
}
