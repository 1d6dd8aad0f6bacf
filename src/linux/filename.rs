/// hwmon attribute filename split into `<kind><id>_<property>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedFilename<'a> {
    pub kind: &'a str,
    pub id: u32,
    pub property: &'a str,
}

/// Split a hwmon attribute filename, `temp1_input` becomes (`temp`, 1, `input`).
///
/// The kind runs up to the first digit or `_`, a missing id is 0 and a missing
/// property is empty. Anything else trailing the id makes the name unparsable.
pub fn parse_sensor_filename(name: &str) -> Option<ParsedFilename<'_>> {
    let kind_len = name
        .find(|c: char| c.is_ascii_digit() || c == '_')
        .unwrap_or(name.len());
    if kind_len == 0 {
        return None;
    }
    let (kind, rest) = name.split_at(kind_len);

    let id_len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (digits, rest) = rest.split_at(id_len);
    let id = if digits.is_empty() {
        0
    } else {
        digits.parse().ok()?
    };

    let property = match rest.strip_prefix('_') {
        Some("") => return None,
        Some(property) => property,
        None if rest.is_empty() => "",
        None => return None,
    };

    Some(ParsedFilename { kind, id, property })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed<'a>(kind: &'a str, id: u32, property: &'a str) -> Option<ParsedFilename<'a>> {
        Some(ParsedFilename { kind, id, property })
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(
            parse_sensor_filename("temp1_input"),
            parsed("temp", 1, "input")
        );
        assert_eq!(
            parse_sensor_filename("humidity3_input"),
            parsed("humidity", 3, "input")
        );
    }

    #[test]
    fn test_parse_without_id() {
        assert_eq!(
            parse_sensor_filename("fan_input"),
            parsed("fan", 0, "input")
        );
        assert_eq!(
            parse_sensor_filename("temp_label"),
            parsed("temp", 0, "label")
        );
    }

    #[test]
    fn test_parse_without_property() {
        assert_eq!(parse_sensor_filename("name"), parsed("name", 0, ""));
        assert_eq!(parse_sensor_filename("pwm2"), parsed("pwm", 2, ""));
    }

    #[test]
    fn test_parse_multi_digit_and_nested_property() {
        assert_eq!(
            parse_sensor_filename("temp12_crit_alarm"),
            parsed("temp", 12, "crit_alarm")
        );
        assert_eq!(
            parse_sensor_filename("fan007_input"),
            parsed("fan", 7, "input")
        );
    }

    #[test]
    fn test_no_match() {
        assert_eq!(parse_sensor_filename(""), None);
        assert_eq!(parse_sensor_filename("1_input"), None);
        assert_eq!(parse_sensor_filename("_input"), None);
        assert_eq!(parse_sensor_filename("temp1x"), None);
        assert_eq!(parse_sensor_filename("temp1_"), None);
        // doesn't fit in the id
        assert_eq!(parse_sensor_filename("temp99999999999_input"), None);
    }
}
