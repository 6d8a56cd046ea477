//! Decoding of `application/x-www-form-urlencoded` request bodies

use crate::{Error, Grid, Result};

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Name of the form field that carries the grid JSON.
pub const DATA_FIELD: &str = "data";

/// Check a request `Content-Type`. Only a urlencoded form is accepted; a
/// missing header counts as an opaque binary body.
pub fn check_content_type(content_type: Option<&str>) -> Result<()> {
    let Some(value) = content_type else {
        return Err(Error::InvalidForm("missing content type".into()));
    };
    let essence = value.split(';').next().unwrap_or_default().trim();
    if essence.eq_ignore_ascii_case(FORM_URLENCODED) {
        Ok(())
    } else {
        Err(Error::InvalidForm(format!("unsupported content type \"{}\"", value)))
    }
}

/// Reject bodies with a `%` that is not followed by two hex digits.
/// `form_urlencoded::parse` would pass such escapes through as text.
pub fn check_escapes(body: &[u8]) -> Result<()> {
    for (pos, _) in body.iter().enumerate().filter(|(_, b)| **b == b'%') {
        let escape = body.get(pos + 1..pos + 3);
        if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
            let end = (pos + 3).min(body.len());
            return Err(Error::InvalidForm(format!(
                "invalid URL escape \"{}\"",
                String::from_utf8_lossy(&body[pos..end])
            )));
        }
    }
    Ok(())
}

/// First value of `name` in a urlencoded body.
pub fn field(body: &[u8], name: &str) -> Option<String> {
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Extract and parse the grid posted in the `data` field.
pub fn parse_grid(content_type: Option<&str>, body: &[u8]) -> Result<Grid> {
    check_content_type(content_type)?;
    check_escapes(body)?;
    let data = field(body, DATA_FIELD).ok_or(Error::MissingField(DATA_FIELD))?;
    Grid::from_json(&data)
}
