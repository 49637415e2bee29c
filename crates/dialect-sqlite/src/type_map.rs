use stratum_core::clamped_scale;

/// Portable type to SQLite column type. Auto-increment relies on
/// `INTEGER PRIMARY KEY`, so integer kinds all collapse to INTEGER.
/// Unknown names pass through verbatim.
pub(crate) fn map_type(data_type: &str, size: u32, scale: u32, _auto_increment: bool) -> String {
    let lowered = data_type.to_ascii_lowercase();

    match lowered.as_str() {
        "string" | "varchar" | "char" | "text" | "uuid" | "json" => "TEXT".to_string(),
        "int" | "integer" | "smallint" | "bigint" => "INTEGER".to_string(),
        "decimal" | "numeric" => {
            if size > 0 {
                format!("NUMERIC({size}, {})", clamped_scale(size, scale))
            } else {
                "NUMERIC".to_string()
            }
        }
        "float" | "double" | "real" => "REAL".to_string(),
        "bool" | "boolean" => "BOOLEAN".to_string(),
        "date" => "DATE".to_string(),
        "time" => "TIME".to_string(),
        "datetime" | "timestamp" => "DATETIME".to_string(),
        "blob" | "binary" => "BLOB".to_string(),
        _ => data_type.to_string(),
    }
}
