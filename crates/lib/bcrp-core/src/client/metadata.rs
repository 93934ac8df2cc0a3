//! Metadata catalog decoding and cache locations.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use bcrp_store::MetadataRow;
use bcrp_store::schema::{CACHE_DIR_NAME, CACHE_FILENAME, is_series_code_column};
use tracing::debug;

use super::ClientError;

/// Decodes the catalog body as UTF-8, falling back to Latin-1.
#[must_use]
pub fn decode_metadata_bytes(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text.trim_start_matches('\u{feff}')),
        Err(_) => Cow::Owned(bytes.iter().map(|&byte| char::from(byte)).collect()),
    }
}

/// Parses the `;`-delimited catalog into rows.
///
/// Records that fail to deserialize are skipped.
///
/// # Errors
/// Returns `ClientError::Decode` when the header row is unreadable or has no
/// series code column.
pub fn parse_metadata_csv(text: &str) -> Result<Vec<MetadataRow>, ClientError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|err| ClientError::Decode(err.to_string()))?;
    if !headers.iter().any(is_series_code_column) {
        return Err(ClientError::Decode(
            "metadata catalog has no series code column".to_string(),
        ));
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.deserialize::<MetadataRow>() {
        match record {
            Ok(row) => rows.push(row),
            Err(_) => skipped += 1,
        }
    }
    debug!(rows = rows.len(), skipped, "parsed metadata csv");
    Ok(rows)
}

/// Cache file inside `dir`.
#[must_use]
pub fn cache_path_in(dir: &Path) -> PathBuf {
    dir.join(CACHE_FILENAME)
}

/// Per-user cache location, e.g. `~/.cache/mcp_bcrp/bcrp_metadata.json`.
#[must_use]
pub fn default_cache_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| cache_path_in(&dir.join(CACHE_DIR_NAME)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Código de serie;Categoría de serie;Nombre de serie;Frecuencia\n\
        PN01652XM;Precios;Precio del Cobre;Mensual\n\
        PD04637PD;Tipo de cambio;Tipo de Cambio Interbancario Compra (S/ por US$);Diaria\n";

    #[test]
    fn parses_utf8_catalog() {
        let rows = parse_metadata_csv(SAMPLE).expect("parse");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].series_code(), Some("PN01652XM"));
        assert_eq!(rows[1].display_name(), "Tipo de Cambio Interbancario Compra (S/ por US$)");
        assert_eq!(rows[1].frequency.as_deref(), Some("Diaria"));
    }

    #[test]
    fn latin1_catalog_is_decoded() {
        let latin1: Vec<u8> = SAMPLE
            .chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect();
        let text = decode_metadata_bytes(&latin1);
        let rows = parse_metadata_csv(&text).expect("parse latin-1");
        assert_eq!(rows[0].series_code(), Some("PN01652XM"));
    }

    #[test]
    fn mojibake_header_is_accepted() {
        let text = "CÃ³digo de serie;Nombre de serie\nPN1;Cobre\n";
        let rows = parse_metadata_csv(text).expect("parse");
        assert_eq!(rows[0].series_code(), Some("PN1"));
    }

    #[test]
    fn missing_code_column_is_an_error() {
        let err = parse_metadata_csv("Serie;Nombre\nx;y\n").expect_err("no code column");
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let mut bytes = "\u{feff}".as_bytes().to_vec();
        bytes.extend_from_slice(SAMPLE.as_bytes());
        let rows = parse_metadata_csv(&decode_metadata_bytes(&bytes)).expect("parse");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn cache_path_uses_fixed_file_name() {
        let path = cache_path_in(Path::new("/tmp/bcrp"));
        assert_eq!(path, PathBuf::from("/tmp/bcrp/bcrp_metadata.json"));
    }
}
