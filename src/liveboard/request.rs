use chrono::{DateTime, Utc};
use chrono_tz::Europe::Brussels;
use reqwest::Url;

use crate::model::Direction;

/// Builds the live-board query for one station, direction and hour.
///
/// The provider reads `time` (`HHmm`) and `date` (`ddMMyy`) as Belgian wall
/// clock time, so the instant is converted before formatting.
pub fn liveboard_url(
    endpoint: &Url,
    lang: &str,
    station: &str,
    direction: Direction,
    at: DateTime<Utc>,
) -> Url {
    let local = at.with_timezone(&Brussels);

    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("format", "json")
        .append_pair("lang", lang)
        .append_pair("station", station)
        .append_pair("arrdep", direction.as_param())
        .append_pair("time", &local.format("%H%M").to_string())
        .append_pair("date", &local.format("%d%m%y").to_string());
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn params(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    #[test]
    fn test_query_parameters() {
        let endpoint = Url::parse("https://api.irail.be/liveboard/").unwrap();
        // 07:05 UTC in January is 08:05 in Brussels.
        let at = Utc.with_ymd_and_hms(2025, 1, 9, 7, 5, 0).unwrap();

        let url = liveboard_url(&endpoint, "fr", "Nivelles", Direction::Arrival, at);
        let p = params(&url);

        assert_eq!(url.path(), "/liveboard/");
        assert_eq!(p["format"], "json");
        assert_eq!(p["lang"], "fr");
        assert_eq!(p["station"], "Nivelles");
        assert_eq!(p["arrdep"], "arrival");
        assert_eq!(p["time"], "0805");
        assert_eq!(p["date"], "090125");
    }

    #[test]
    fn test_summer_time_and_day_rollover() {
        let endpoint = Url::parse("https://api.irail.be/liveboard/").unwrap();
        // 22:30 UTC in July is 00:30 the next day in Brussels.
        let at = Utc.with_ymd_and_hms(2025, 7, 14, 22, 30, 0).unwrap();

        let p = params(&liveboard_url(
            &endpoint,
            "nl",
            "Bruxelles-Midi",
            Direction::Departure,
            at,
        ));

        assert_eq!(p["time"], "0030");
        assert_eq!(p["date"], "150725");
        assert_eq!(p["station"], "Bruxelles-Midi");
    }
}
