/// A table creation directive. When `primary_key` is non-empty it
/// supersedes per-field `primary_key` flags; otherwise every flagged
/// field contributes to the key in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateTable {
    pub name: String,
    pub fields: Vec<Field>,
    pub primary_key: Vec<String>,
}

impl CreateTable {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Resolved primary-key column list: the explicit list when given,
    /// otherwise the fields flagged `primary_key` in source order.
    pub fn primary_key_columns(&self) -> Vec<String> {
        if !self.primary_key.is_empty() {
            return self.primary_key.clone();
        }
        self.fields
            .iter()
            .filter(|field| field.primary_key)
            .map(|field| field.name.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Field {
    pub name: String,
    pub data_type: String,
    pub size: u32,
    pub scale: u32,
    pub nullable: bool,
    pub default: Option<String>,
    pub check: Option<String>,
    pub auto_increment: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub index: bool,
    pub foreign_key: Option<ForeignKey>,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForeignKey {
    pub reference_table: String,
    pub reference_field: String,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlterTable {
    pub name: String,
    pub add_fields: Vec<Field>,
    pub drop_fields: Vec<DropField>,
    pub rename_fields: Vec<RenameField>,
}

impl AlterTable {
    /// SQLite can only append columns; any drop or rename forces a
    /// table recreation.
    pub fn requires_recreation(&self) -> bool {
        !self.drop_fields.is_empty() || !self.rename_fields.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropField {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenameField {
    pub from: String,
    pub to: String,
    /// Column type, required by MySQL's `CHANGE` syntax.
    pub data_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropTable {
    pub name: String,
    pub if_exists: bool,
    pub cascade: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenameTable {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteData {
    pub table: String,
    pub where_clause: Option<String>,
}
