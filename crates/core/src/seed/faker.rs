use fake::{
    Fake,
    faker::{
        address::en::{CityName, CountryName, StreetName, ZipCode},
        company::en::CompanyName,
        internet::en::{SafeEmail, Username},
        lorem::en::Word,
        name::en::{FirstName, LastName, Name},
        phone_number::en::PhoneNumber,
    },
};
use rand::{Rng, seq::SliceRandom};
use uuid::Uuid;

use crate::{Error, Result, SqlValue};

const STATUSES: &[&str] = &["active", "inactive", "pending", "archived"];

/// Resolves one `fake_*` token to a generated value. `size > 0`
/// truncates textual output. Unknown tokens are `invalid-input`.
pub fn generate_fake(token: &str, size: u32, rng: &mut impl Rng) -> Result<SqlValue> {
    let value = match token {
        "fake_uuid" => SqlValue::Text(Uuid::new_v4().to_string()),
        "fake_name" => text(Name().fake_with_rng::<String, _>(rng), size),
        "fake_first_name" => text(FirstName().fake_with_rng::<String, _>(rng), size),
        "fake_last_name" => text(LastName().fake_with_rng::<String, _>(rng), size),
        "fake_username" => text(Username().fake_with_rng::<String, _>(rng), size),
        "fake_email" => text(SafeEmail().fake_with_rng::<String, _>(rng), size),
        "fake_phone" => text(PhoneNumber().fake_with_rng::<String, _>(rng), size),
        "fake_address" => text(StreetName().fake_with_rng::<String, _>(rng), size),
        "fake_city" => text(CityName().fake_with_rng::<String, _>(rng), size),
        "fake_country" => text(CountryName().fake_with_rng::<String, _>(rng), size),
        "fake_zip" => text(ZipCode().fake_with_rng::<String, _>(rng), size),
        "fake_company" => text(CompanyName().fake_with_rng::<String, _>(rng), size),
        "fake_word" => text(Word().fake_with_rng::<String, _>(rng), size),
        "fake_date" => SqlValue::Text(fake_date(rng)),
        "fake_datetime" => SqlValue::Text(format!(
            "{} {:02}:{:02}:{:02}",
            fake_date(rng),
            rng.gen_range(0..24),
            rng.gen_range(0..60),
            rng.gen_range(0..60),
        )),
        "fake_year" => SqlValue::Integer(rng.gen_range(1970..=2030)),
        "fake_month" => SqlValue::Integer(rng.gen_range(1..=12)),
        "fake_day" => SqlValue::Integer(rng.gen_range(1..=28)),
        "fake_hour" => SqlValue::Integer(rng.gen_range(0..24)),
        "fake_minute" => SqlValue::Integer(rng.gen_range(0..60)),
        "fake_bool" => SqlValue::Bool(rng.gen_bool(0.5)),
        "fake_int" => SqlValue::Integer(rng.gen_range(0..1_000_000)),
        "fake_uint" => SqlValue::Integer(rng.gen_range(0..1_000_000)),
        "fake_age" => SqlValue::Integer(rng.gen_range(1..=100)),
        "fake_float" | "fake_price" => {
            SqlValue::Float((rng.gen_range(0.0..10_000.0f64) * 100.0).round() / 100.0)
        }
        "fake_status" => SqlValue::Text(
            STATUSES
                .choose(rng)
                .copied()
                .unwrap_or("active")
                .to_string(),
        ),
        other => {
            return Err(Error::invalid_input(format!(
                "unknown fake value token `{other}`"
            )));
        }
    };

    Ok(value)
}

fn text(value: String, size: u32) -> SqlValue {
    if size > 0 && value.chars().count() > size as usize {
        return SqlValue::Text(value.chars().take(size as usize).collect());
    }
    SqlValue::Text(value)
}

fn fake_date(rng: &mut impl Rng) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        rng.gen_range(1970..=2030),
        rng.gen_range(1..=12),
        rng.gen_range(1..=28),
    )
}
