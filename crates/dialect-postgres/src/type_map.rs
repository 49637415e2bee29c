use stratum_core::clamped_scale;

/// Portable type to native PostgreSQL column type. Auto-increment
/// escalates integers to SERIAL, or BIGSERIAL for `bigint` and sizes
/// above 10 digits. Unknown names pass through verbatim.
pub(crate) fn map_type(data_type: &str, size: u32, scale: u32, auto_increment: bool) -> String {
    let lowered = data_type.to_ascii_lowercase();

    if auto_increment
        && matches!(
            lowered.as_str(),
            "int" | "integer" | "smallint" | "bigint" | "serial" | "bigserial"
        )
    {
        if lowered == "bigint" || lowered == "bigserial" || size > 10 {
            return "BIGSERIAL".to_string();
        }
        return "SERIAL".to_string();
    }

    match lowered.as_str() {
        "string" | "varchar" => {
            if size > 0 {
                format!("VARCHAR({size})")
            } else {
                "TEXT".to_string()
            }
        }
        "char" => format!("CHAR({})", size.max(1)),
        "text" => "TEXT".to_string(),
        "int" | "integer" => "INTEGER".to_string(),
        "smallint" => "SMALLINT".to_string(),
        "bigint" => "BIGINT".to_string(),
        "decimal" | "numeric" => {
            if size > 0 {
                format!("DECIMAL({size}, {})", clamped_scale(size, scale))
            } else {
                "DECIMAL".to_string()
            }
        }
        "float" | "real" => "REAL".to_string(),
        "double" => "DOUBLE PRECISION".to_string(),
        "bool" | "boolean" => "BOOLEAN".to_string(),
        "date" => "DATE".to_string(),
        "time" => "TIME".to_string(),
        "datetime" | "timestamp" => "TIMESTAMP".to_string(),
        "json" => "JSONB".to_string(),
        "uuid" => "UUID".to_string(),
        "blob" | "binary" => "BYTEA".to_string(),
        _ => data_type.to_string(),
    }
}
