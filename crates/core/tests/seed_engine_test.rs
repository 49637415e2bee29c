mod support;

use stratum_core::{
    Error, SeedEngine, SqlValue,
    seed::{Seed, SeedField},
};
use support::fake_dialect::FakeDialect;

fn field(name: &str, value: SqlValue) -> SeedField {
    SeedField {
        name: name.to_string(),
        value,
        unique: false,
        random: false,
        size: 0,
        data_type: None,
    }
}

fn text_field(name: &str, value: &str) -> SeedField {
    field(name, SqlValue::Text(value.to_string()))
}

fn seed(table: &str, fields: Vec<SeedField>) -> Seed {
    Seed {
        name: format!("{table}_seed"),
        table: table.to_string(),
        fields,
        combine: Vec::new(),
        condition: None,
        rows: 0,
    }
}

#[test]
fn produces_exactly_the_requested_row_count() {
    let definition = seed(
        "users",
        vec![
            text_field("id", "fake_uuid"),
            text_field("name", "fake_first_name"),
        ],
    );
    let mut engine = SeedEngine::new(&FakeDialect);

    let inserts = engine.generate_rows(&definition, 7).expect("generate");
    assert_eq!(inserts.len(), 7);
}

#[test]
fn insert_columns_follow_source_order() {
    let definition = seed(
        "users",
        vec![
            text_field("b", "literal"),
            text_field("a", "literal"),
            text_field("c", "literal"),
        ],
    );
    let mut engine = SeedEngine::new(&FakeDialect);

    let inserts = engine.generate_rows(&definition, 1).expect("generate");
    assert!(
        inserts[0].sql.contains("(\"b\", \"a\", \"c\")"),
        "got: {}",
        inserts[0].sql
    );
    assert!(inserts[0].sql.contains("(:b, :a, :c)"));
}

#[test]
fn expr_fields_resolve_after_their_dependencies() {
    let mut age = text_field("age", "fake_age");
    age.data_type = Some("int".to_string());
    let mut adult = text_field("adult", "expr: age.value >= 18 ? true : false");
    adult.data_type = Some("boolean".to_string());

    // The expr field comes FIRST in source order; it must still see age.
    let definition = seed("people", vec![adult, age]);
    let mut engine = SeedEngine::new(&FakeDialect);

    let inserts = engine.generate_rows(&definition, 3).expect("generate");
    assert_eq!(inserts.len(), 3);

    for insert in &inserts {
        let age = match insert.args.get("age") {
            Some(SqlValue::Integer(age)) => *age,
            other => panic!("age should be an integer, got {other:?}"),
        };
        let adult = match insert.args.get("adult") {
            Some(SqlValue::Bool(adult)) => *adult,
            other => panic!("adult should be a bool, got {other:?}"),
        };
        assert_eq!(adult, age >= 18, "adult must be derived from age {age}");
    }
}

#[test]
fn chained_expressions_resolve_transitively() {
    let mut base = field("base", SqlValue::Integer(10));
    base.data_type = Some("int".to_string());
    let mut doubled = text_field("doubled", "expr: base.value * 2");
    doubled.data_type = Some("int".to_string());
    let mut quadrupled = text_field("quadrupled", "expr: doubled.value * 2");
    quadrupled.data_type = Some("int".to_string());

    let definition = seed("numbers", vec![quadrupled, doubled, base]);
    let mut engine = SeedEngine::new(&FakeDialect);

    let inserts = engine.generate_rows(&definition, 1).expect("generate");
    assert_eq!(inserts[0].args.get("doubled"), Some(&SqlValue::Integer(20)));
    assert_eq!(
        inserts[0].args.get("quadrupled"),
        Some(&SqlValue::Integer(40))
    );
}

#[test]
fn cyclic_expressions_fail_with_expr_resolution() {
    let definition = seed(
        "loops",
        vec![
            text_field("a", "expr: b.value + 1"),
            text_field("b", "expr: a.value + 1"),
        ],
    );
    let mut engine = SeedEngine::new(&FakeDialect);

    let error = engine
        .generate_rows(&definition, 1)
        .expect_err("cycle must fail");
    match error {
        Error::ExprResolution { fields, .. } => {
            assert_eq!(fields.len(), 2);
        }
        other => panic!("expected ExprResolution, got {other:?}"),
    }
}

#[test]
fn unique_literal_collision_errors_after_retries() {
    let mut constant = field("code", SqlValue::Integer(42));
    constant.unique = true;
    let definition = seed("codes", vec![constant]);
    let mut engine = SeedEngine::new(&FakeDialect);

    let error = engine
        .generate_rows(&definition, 2)
        .expect_err("constant unique value cannot produce two rows");
    assert!(
        error.to_string().contains("unique"),
        "got: {error}"
    );
}

#[test]
fn unique_uuid_fields_generate_distinct_rows() {
    let mut id = text_field("id", "fake_uuid");
    id.unique = true;
    let definition = seed("users", vec![id]);
    let mut engine = SeedEngine::new(&FakeDialect);

    let inserts = engine.generate_rows(&definition, 50).expect("generate");
    let mut seen = std::collections::HashSet::new();
    for insert in &inserts {
        match insert.args.get("id") {
            Some(SqlValue::Text(id)) => assert!(seen.insert(id.clone()), "duplicate id {id}"),
            other => panic!("id should be text, got {other:?}"),
        }
    }
}

#[test]
fn data_type_casts_apply_to_literals() {
    let mut count = text_field("count", "18");
    count.data_type = Some("int".to_string());
    let mut flag = text_field("flag", "true");
    flag.data_type = Some("bool".to_string());

    let definition = seed("casts", vec![count, flag]);
    let mut engine = SeedEngine::new(&FakeDialect);

    let inserts = engine.generate_rows(&definition, 1).expect("generate");
    assert_eq!(inserts[0].args.get("count"), Some(&SqlValue::Integer(18)));
    assert_eq!(inserts[0].args.get("flag"), Some(&SqlValue::Bool(true)));
}

#[test]
fn uncastable_literal_is_invalid_input() {
    let mut bad = text_field("count", "not_a_number");
    bad.data_type = Some("int".to_string());
    let definition = seed("casts", vec![bad]);
    let mut engine = SeedEngine::new(&FakeDialect);

    assert!(engine.generate_rows(&definition, 1).is_err());
}

#[test]
fn unknown_fake_token_is_invalid_input() {
    let definition = seed("users", vec![text_field("x", "fake_flux_capacitor")]);
    let mut engine = SeedEngine::new(&FakeDialect);
    assert!(engine.generate_rows(&definition, 1).is_err());
}

#[test]
fn ref_placeholder_substitutes_the_bare_literal() {
    let definition = seed("users", vec![text_field("plan", "${ref(default_plan)}")]);
    let mut engine = SeedEngine::new(&FakeDialect);

    let inserts = engine.generate_rows(&definition, 1).expect("generate");
    assert_eq!(
        inserts[0].args.get("plan"),
        Some(&SqlValue::Text("default_plan".to_string()))
    );
}

#[test]
fn seed_without_fields_is_invalid() {
    let definition = seed("empty", Vec::new());
    let mut engine = SeedEngine::new(&FakeDialect);
    assert!(engine.generate_rows(&definition, 1).is_err());
}

#[test]
fn string_size_truncates_generated_text() {
    let mut name = text_field("name", "fake_name");
    name.size = 3;
    let definition = seed("users", vec![name]);
    let mut engine = SeedEngine::new(&FakeDialect);

    let inserts = engine.generate_rows(&definition, 5).expect("generate");
    for insert in &inserts {
        match insert.args.get("name") {
            Some(SqlValue::Text(name)) => assert!(name.chars().count() <= 3),
            other => panic!("name should be text, got {other:?}"),
        }
    }
}
