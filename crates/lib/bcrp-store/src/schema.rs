pub const METADATA_URL: &str = "https://estadisticas.bcrp.gob.pe/estadisticas/series/metadata";
pub const API_BASE_URL: &str = "https://estadisticas.bcrp.gob.pe/estadisticas/series/api";

pub const CACHE_DIR_NAME: &str = "mcp_bcrp";
pub const CACHE_FILENAME: &str = "bcrp_metadata.json";

pub const COL_SERIES_CODE: &str = "Código de serie";
/// UTF-8 header read back as Latin-1.
pub const COL_SERIES_CODE_MOJIBAKE: &str = "CÃ³digo de serie";
pub const COL_SERIES_CODE_ASCII: &str = "Codigo de serie";

pub const TIME_COLUMN: &str = "time";

/// Markers the API uses in place of a numeric observation.
pub const MISSING_VALUE: &str = "n.d.";
pub const NOT_REPORTED_MARKER: &str = "nir";

#[must_use]
pub fn make_series_path(codes: &[String]) -> String {
    codes.join("-")
}

/// Returns true when a header names the series code column under any of its
/// known spellings.
#[must_use]
pub fn is_series_code_column(header: &str) -> bool {
    matches!(
        header.trim(),
        COL_SERIES_CODE | COL_SERIES_CODE_MOJIBAKE | COL_SERIES_CODE_ASCII
    )
}
