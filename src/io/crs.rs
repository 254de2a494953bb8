use std::sync::OnceLock;

use regex::Regex;

/// EPSG code named by a CRS identifier such as `EPSG:2154`,
/// `urn:ogc:def:crs:EPSG::2154` or the OGC CRS84 urn (mapped to 4326).
pub(crate) fn epsg_from_name(name: &str) -> Option<u32> {
    static NAME: OnceLock<Regex> = OnceLock::new();
    let re = NAME.get_or_init(|| Regex::new(r"(?i)EPSG:+(\d+)\s*$").expect("valid regex"));

    if name.to_ascii_uppercase().ends_with("CRS84") { return Some(4326) }
    re.captures(name.trim())?.get(1)?.as_str().parse().ok()
}

/// EPSG code of a WKT definition (a `.prj` file): the last EPSG authority,
/// which belongs to the outermost CRS. ESRI-flavoured WKT carries none.
pub(crate) fn epsg_from_wkt(wkt: &str) -> Option<u32> {
    static AUTHORITY: OnceLock<Regex> = OnceLock::new();
    let re = AUTHORITY.get_or_init(|| {
        Regex::new(r#"(?i)(?:AUTHORITY|ID)\[\s*"EPSG"\s*,\s*"?(\d+)"?\s*\]"#).expect("valid regex")
    });

    re.captures_iter(wkt).last()?.get(1)?.as_str().parse().ok()
}

/// CRS identifier written to GeoJSON output.
pub(crate) fn epsg_urn(epsg: u32) -> String { format!("urn:ogc:def:crs:EPSG::{epsg}") }
