/// Best-effort correction of malformed postal codes. Must not fail.
pub trait PostalCodeFixer: Send + Sync {
    fn fix(&self, raw: &str) -> String;
}

impl<F> PostalCodeFixer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn fix(&self, raw: &str) -> String {
        self(raw)
    }
}

/// Repairs US ZIP+4 codes; other formats, including short numeric codes used by many
/// countries, pass through trimmed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipCodeFixer;

impl PostalCodeFixer for ZipCodeFixer {
    fn fix(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        let all_digits = !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit());

        if all_digits && trimmed.len() == 9 {
            return format!("{}-{}", &trimmed[..5], &trimmed[5..]);
        }

        if let Some((head, tail)) = trimmed.split_once(' ') {
            let tail = tail.trim_start();
            if is_digits(head, 5) && is_digits(tail, 4) {
                return format!("{head}-{tail}");
            }
        }

        trimmed.to_string()
    }
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nine_digit_zip_gets_hyphen() {
        assert_eq!(ZipCodeFixer.fix("123456789"), "12345-6789");
    }

    #[test]
    fn space_separated_plus_four_is_hyphenated() {
        assert_eq!(ZipCodeFixer.fix("12345 6789"), "12345-6789");
        assert_eq!(ZipCodeFixer.fix("12345   6789"), "12345-6789");
    }

    #[test]
    fn four_digit_codes_are_left_alone() {
        assert_eq!(ZipCodeFixer.fix("8001"), "8001");
        assert_eq!(ZipCodeFixer.fix("2000"), "2000");
        assert_eq!(ZipCodeFixer.fix(" 501 "), "501");
    }

    #[test]
    fn well_formed_and_foreign_codes_pass_through() {
        assert_eq!(ZipCodeFixer.fix("62704"), "62704");
        assert_eq!(ZipCodeFixer.fix("12345-6789"), "12345-6789");
        assert_eq!(ZipCodeFixer.fix(" SW1A 1AA "), "SW1A 1AA");
        assert_eq!(ZipCodeFixer.fix("K1A 0B1"), "K1A 0B1");
        assert_eq!(ZipCodeFixer.fix("1234567"), "1234567");
    }

    #[test]
    fn blank_input_stays_blank() {
        assert_eq!(ZipCodeFixer.fix("   "), "");
    }

    #[test]
    fn closures_act_as_fixers() {
        let upper = |raw: &str| raw.to_uppercase();
        assert_eq!(upper.fix("sw1a"), "SW1A");
    }
}
