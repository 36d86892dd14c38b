use std::str::FromStr;

use shared::{
    domain::{FilterSelection, PageSize},
    error::ApiError,
};
use url::form_urlencoded;

/// Control values carried by a dashboard request. `country` and `continent`
/// repeat once per selected option.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DashboardQuery {
    pub(crate) selection: FilterSelection,
    pub(crate) page: usize,
    pub(crate) n_clicks: Option<u64>,
}

/// Parameters missing from `raw` keep their value from `defaults`; blank
/// values count as missing.
pub(crate) fn parse_dashboard_query(
    raw: Option<&str>,
    defaults: FilterSelection,
) -> Result<DashboardQuery, ApiError> {
    let mut query = DashboardQuery {
        selection: defaults,
        page: 0,
        n_clicks: None,
    };
    let Some(raw) = raw else {
        return Ok(query);
    };

    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let selection = &mut query.selection;
        match &*key {
            "country" => {
                selection.countries.insert(value.to_string());
            }
            "continent" => {
                selection.continents.insert(value.to_string());
            }
            "pop_min" => selection.population.min = parse_population(&key, value)?,
            "pop_max" => selection.population.max = parse_population(&key, value)?,
            "life_exp_min" => selection.life_expectancy.min = parse_finite(&key, value)?,
            "life_exp_max" => selection.life_expectancy.max = parse_finite(&key, value)?,
            "page_size" => {
                selection.page_size = PageSize::try_from(parse_number::<u32>(&key, value)?)?
            }
            "page" => query.page = parse_number(&key, value)?,
            "n_clicks" => query.n_clicks = Some(parse_number(&key, value)?),
            _ => {}
        }
    }

    Ok(query)
}

/// Reads only `n_clicks`, so an unclicked export never trips over other
/// parameters.
pub(crate) fn click_count(raw: Option<&str>) -> Result<Option<u64>, ApiError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let mut n_clicks = None;
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        let value = value.trim();
        if key == "n_clicks" && !value.is_empty() {
            n_clicks = Some(parse_number(&key, value)?);
        }
    }
    Ok(n_clicks)
}

/// Inverse of [`parse_dashboard_query`] for the selection part.
pub(crate) fn selection_query(selection: &FilterSelection) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for country in &selection.countries {
        serializer.append_pair("country", country);
    }
    for continent in &selection.continents {
        serializer.append_pair("continent", continent);
    }
    serializer
        .append_pair("pop_min", &selection.population.min.to_string())
        .append_pair("pop_max", &selection.population.max.to_string())
        .append_pair("life_exp_min", &selection.life_expectancy.min.to_string())
        .append_pair("life_exp_max", &selection.life_expectancy.max.to_string())
        .append_pair("page_size", &selection.page_size.to_string());
    serializer.finish()
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::validation(format!("invalid value for {key}: '{value}'")))
}

fn parse_finite(key: &str, value: &str) -> Result<f64, ApiError> {
    let parsed: f64 = parse_number(key, value)?;
    if !parsed.is_finite() {
        return Err(ApiError::validation(format!(
            "{key} must be a finite number"
        )));
    }
    Ok(parsed)
}

/// Range inputs may submit `1.5e9`; whole numbers are expected.
fn parse_population(key: &str, value: &str) -> Result<u64, ApiError> {
    if let Ok(parsed) = value.parse::<u64>() {
        return Ok(parsed);
    }
    let parsed = parse_finite(key, value)?;
    if parsed < 0.0 {
        return Err(ApiError::validation(format!("{key} must not be negative")));
    }
    Ok(parsed.round() as u64)
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
