use std::sync::Arc;

use bcrp_store::schema::{MISSING_VALUE, NOT_REPORTED_MARKER, make_series_path};
use bcrp_store::{Frequency, MetadataRow, Observation, SeriesTable};
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::metadata::{decode_metadata_bytes, parse_metadata_csv};
use super::period::PeriodRange;
use super::{ClientConfig, ClientError};

/// Async client for the BCRP statistics API.
///
/// Clones share the HTTP connection pool and the request gate.
#[derive(Debug, Clone)]
pub struct BcrpClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    gate: Arc<Semaphore>,
}

impl BcrpClient {
    /// # Errors
    /// Returns `ClientError::Http` if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            http,
            config: Arc::new(config),
            gate: Arc::new(Semaphore::new(1)),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetches observations for `codes` over `range`.
    ///
    /// Frequency is taken from the first code and drives how the bounds are
    /// formatted. A 404 or a payload without periods yields an empty table.
    ///
    /// # Errors
    /// Returns `ClientError::InvalidInput` for empty codes or malformed dates,
    /// and transport, status or decode errors from the upstream request.
    pub async fn fetch_series(
        &self,
        codes: &[String],
        range: &PeriodRange,
    ) -> Result<SeriesTable, ClientError> {
        let codes = clean_codes(codes)?;
        let frequency = Frequency::from_code(&codes[0]);
        let url = series_url(&self.config.api_base_url, &codes, frequency, range)?;
        debug!(frequency = frequency.as_str(), %url, "requesting series");

        let Some(body) = self.get_json(&url).await? else {
            warn!(codes = ?codes, "series not found upstream");
            return Ok(SeriesTable::empty(codes));
        };
        Ok(parse_series_payload(codes, &body))
    }

    /// Downloads and parses the full metadata catalog.
    ///
    /// # Errors
    /// Returns transport or status errors, or `ClientError::Decode` when the
    /// CSV has no series code column.
    pub async fn fetch_metadata(&self) -> Result<Vec<MetadataRow>, ClientError> {
        let url = &self.config.metadata_url;
        info!(%url, "downloading metadata catalog");
        let response = self
            .http
            .get(url)
            .timeout(self.config.metadata_timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: url.clone(),
            });
        }
        let bytes = response.bytes().await?;

        let rows = tokio::task::spawn_blocking(move || {
            let text = decode_metadata_bytes(&bytes);
            parse_metadata_csv(&text)
        })
        .await??;
        info!(rows = rows.len(), "downloaded metadata catalog");
        Ok(rows)
    }

    /// Sends one gated GET and returns the JSON body, or `None` on 404.
    async fn get_json(&self, url: &str) -> Result<Option<Value>, ClientError> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|err| ClientError::Io(std::io::Error::other(err)))?;
        tokio::time::sleep(self.config.request_delay).await;

        info!(%url, "fetching series data");
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json, text/plain, */*")
            .timeout(self.config.timeout)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| ClientError::Decode(err.to_string()))
    }
}

fn clean_codes(codes: &[String]) -> Result<Vec<String>, ClientError> {
    let cleaned: Vec<String> = codes
        .iter()
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty())
        .collect();
    if cleaned.is_empty() {
        return Err(ClientError::InvalidInput(
            "at least one series code is required".to_string(),
        ));
    }
    Ok(cleaned)
}

/// Builds `{base}/{codes}/json[/{start}/{end}]` for a series request.
///
/// # Errors
/// Returns `ClientError::InvalidInput` when a bound cannot be formatted.
pub fn series_url(
    base: &str,
    codes: &[String],
    frequency: Frequency,
    range: &PeriodRange,
) -> Result<String, ClientError> {
    let mut url = format!(
        "{}/{}/json",
        base.trim_end_matches('/'),
        make_series_path(codes)
    );
    if let Some((start, end)) = range.to_api_bounds(frequency)? {
        url.push('/');
        url.push_str(&start);
        url.push('/');
        url.push_str(&end);
    }
    Ok(url)
}

/// Converts an API response body into a [`SeriesTable`].
#[must_use]
pub fn parse_series_payload(codes: Vec<String>, body: &Value) -> SeriesTable {
    let Some(periods) = body.get("periods").and_then(Value::as_array) else {
        return SeriesTable::empty(codes);
    };

    let observations = periods
        .iter()
        .map(|period| {
            let label = match period.get("name") {
                Some(Value::String(name)) => name.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            let values = period
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(parse_value).collect())
                .unwrap_or_default();
            Observation {
                period: label,
                values,
            }
        })
        .collect();

    SeriesTable {
        codes,
        observations,
    }
}

/// Parses one observation. Missing markers and non-numeric text become `None`.
#[must_use]
pub fn parse_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let text = text.trim();
            if text == MISSING_VALUE || text.to_ascii_lowercase().contains(NOT_REPORTED_MARKER) {
                return None;
            }
            text.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn codes(values: &[&str]) -> Vec<String> {
        values.iter().map(|code| (*code).to_string()).collect()
    }

    #[test]
    fn builds_series_urls() {
        let base = "https://example.test/api/";
        let monthly = series_url(
            base,
            &codes(&["PN01652XM", "PN01654XM"]),
            Frequency::Monthly,
            &PeriodRange::new(Some("2024-01"), Some("2024-06")),
        )
        .expect("url");
        assert_eq!(
            monthly,
            "https://example.test/api/PN01652XM-PN01654XM/json/2024-1/2024-6"
        );

        let open = series_url(base, &codes(&["PN01652XM"]), Frequency::Monthly, &PeriodRange::default())
            .expect("url");
        assert_eq!(open, "https://example.test/api/PN01652XM/json");
    }

    #[test]
    fn parses_values_and_missing_markers() {
        assert_eq!(parse_value(&json!("3.75")), Some(3.75));
        assert_eq!(parse_value(&json!(2.5)), Some(2.5));
        assert_eq!(parse_value(&json!("n.d.")), None);
        assert_eq!(parse_value(&json!("NIR")), None);
        assert_eq!(parse_value(&json!("NaN")), None);
        assert_eq!(parse_value(&json!("texto")), None);
        assert_eq!(parse_value(&Value::Null), None);
    }

    #[test]
    fn parses_payload_periods() {
        let body = json!({
            "config": {"title": "x"},
            "periods": [
                {"name": "Ene.2024", "values": ["3.70", "n.d."]},
                {"name": "Feb.2024", "values": ["3.75", "1.2", "9"]}
            ]
        });
        let table = parse_series_payload(codes(&["A", "B"]), &body);
        assert_eq!(table.observations.len(), 2);
        assert_eq!(table.observations[0].period, "Ene.2024");
        assert_eq!(table.column(1), vec![None, Some(1.2)]);
        assert_eq!(table.column_name(2), "series_2");
    }

    #[test]
    fn payload_without_periods_is_empty() {
        let table = parse_series_payload(codes(&["A"]), &json!({"config": {}}));
        assert!(table.is_empty());
        assert_eq!(table.codes, codes(&["A"]));
    }

    #[test]
    fn rejects_blank_codes() {
        assert!(matches!(
            clean_codes(&codes(&[" ", ""])),
            Err(ClientError::InvalidInput(_))
        ));
        assert_eq!(clean_codes(&codes(&[" PN1 "])).expect("codes"), codes(&["PN1"]));
    }
}
