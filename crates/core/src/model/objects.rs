#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropSchema {
    pub name: String,
    pub if_exists: bool,
    pub cascade: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropEnumType {
    pub name: String,
    pub if_exists: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropRowPolicy {
    pub name: String,
    pub table: String,
    pub if_exists: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropMaterializedView {
    pub name: String,
    pub if_exists: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateView {
    pub name: String,
    pub definition: String,
    pub or_replace: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropView {
    pub name: String,
    pub if_exists: bool,
    pub cascade: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenameView {
    pub from: String,
    pub to: String,
}

/// A stored function. `params` and `returns` are emitted verbatim;
/// `language` defaults per dialect when empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateFunction {
    pub name: String,
    pub params: String,
    pub returns: String,
    pub language: String,
    pub body: String,
    pub or_replace: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropFunction {
    pub name: String,
    pub if_exists: bool,
    pub cascade: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenameFunction {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateProcedure {
    pub name: String,
    pub params: String,
    pub language: String,
    pub body: String,
    pub or_replace: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropProcedure {
    pub name: String,
    pub if_exists: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenameProcedure {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTrigger {
    pub name: String,
    pub table: String,
    pub timing: TriggerTiming,
    pub event: TriggerEvent,
    pub for_each_row: bool,
    pub body: String,
}

impl Default for CreateTrigger {
    fn default() -> Self {
        Self {
            name: String::new(),
            table: String::new(),
            timing: TriggerTiming::Before,
            event: TriggerEvent::Insert,
            for_each_row: true,
            body: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropTrigger {
    pub name: String,
    pub table: String,
    pub if_exists: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenameTrigger {
    pub table: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerTiming {
    Before,
    After,
    InsteadOf,
}

impl TriggerTiming {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Before => "BEFORE",
            Self::After => "AFTER",
            Self::InsteadOf => "INSTEAD OF",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().replace(' ', "_").as_str() {
            "before" => Some(Self::Before),
            "after" => Some(Self::After),
            "instead_of" => Some(Self::InsteadOf),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
}

impl TriggerEvent {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "insert" => Some(Self::Insert),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}
