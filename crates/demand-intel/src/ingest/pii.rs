//! Header denylist that keeps personal identifiers out of household imports.

const DISALLOWED_KEYS: &[&str] = &[
    "email",
    "e-mail",
    "email_address",
    "phone",
    "phone_number",
    "telephone",
    "mobile",
    "cell",
    "cell_phone",
    "firstname",
    "first_name",
    "fname",
    "lastname",
    "last_name",
    "lname",
    "surname",
    "fullname",
    "full_name",
    "name",
    "owner",
    "owner_name",
    "property_owner",
    "homeowner_name",
    "address",
    "street",
    "street_address",
    "street_address_line_1",
    "apt",
    "apartment",
    "unit",
    "unit_number",
    "suite",
    "ssn",
    "social_security_number",
    "social_security",
    "dob",
    "date_of_birth",
    "birthday",
    "birth_date",
    "facebook",
    "facebook_id",
    "facebook_url",
    "instagram",
    "instagram_id",
    "instagram_url",
    "linkedin",
    "linkedin_id",
    "linkedin_url",
    "twitter",
    "twitter_id",
    "twitter_url",
    "twitter_handle",
    "tiktok",
    "tiktok_id",
    "tiktok_url",
    "driver_license",
    "drivers_license",
    "dl_number",
    "passport",
    "passport_number",
];

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, '_' | '-') && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

pub(crate) fn is_disallowed(key: &str) -> bool {
    let normalized = normalize_key(key);
    DISALLOWED_KEYS
        .iter()
        .any(|candidate| normalize_key(candidate) == normalized)
}

/// First header that names a personal identifier, if any.
pub(crate) fn first_disallowed<'a, I>(headers: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    headers
        .into_iter()
        .find(|header| is_disallowed(header))
        .map(str::to_string)
}
