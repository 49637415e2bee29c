use stratum_core::clamped_scale;

/// Portable type to native MySQL column type. The `AUTO_INCREMENT`
/// keyword is a column attribute, appended by the generator rather
/// than folded into the type. Unknown names pass through verbatim.
pub(crate) fn map_type(data_type: &str, size: u32, scale: u32, _auto_increment: bool) -> String {
    let lowered = data_type.to_ascii_lowercase();

    match lowered.as_str() {
        "string" | "varchar" => format!("VARCHAR({})", if size > 0 { size } else { 255 }),
        "char" => format!("CHAR({})", size.max(1)),
        "text" => "TEXT".to_string(),
        "int" | "integer" => "INT".to_string(),
        "smallint" => "SMALLINT".to_string(),
        "bigint" => "BIGINT".to_string(),
        "decimal" | "numeric" => {
            if size > 0 {
                format!("DECIMAL({size}, {})", clamped_scale(size, scale))
            } else {
                "DECIMAL".to_string()
            }
        }
        "float" => "FLOAT".to_string(),
        "double" | "real" => "DOUBLE".to_string(),
        "bool" | "boolean" => "TINYINT(1)".to_string(),
        "date" => "DATE".to_string(),
        "time" => "TIME".to_string(),
        "datetime" => "DATETIME".to_string(),
        "timestamp" => "TIMESTAMP".to_string(),
        "json" => "JSON".to_string(),
        "uuid" => "CHAR(36)".to_string(),
        "blob" | "binary" => "BLOB".to_string(),
        _ => data_type.to_string(),
    }
}
