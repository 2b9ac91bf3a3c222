//! Console request parsing
//!
//! A line is a list of words separated by blanks or `,;:`. `read` is
//! accepted and ignored so both `read temp press` and `temp press` work.

use heapless::Vec;

/// Maximum requests honored from one line
pub const MAX_REQUESTS: usize = 4;

/// One thing the operator asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request {
    Temperature,
    Pressure,
    Humidity,
    ChipId,
    Scan,
    /// Bytes lost to receive overflow
    Dropped,
}

impl Request {
    fn from_word(word: &[u8]) -> Option<Self> {
        const WORDS: &[(&[u8], Request)] = &[
            (b"temp", Request::Temperature),
            (b"temperature", Request::Temperature),
            (b"press", Request::Pressure),
            (b"pressure", Request::Pressure),
            (b"hum", Request::Humidity),
            (b"humidity", Request::Humidity),
            (b"id", Request::ChipId),
            (b"scan", Request::Scan),
            (b"dropped", Request::Dropped),
        ];
        WORDS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(word))
            .map(|&(_, request)| request)
    }

    /// Whether answering needs a fresh sensor sample
    pub fn needs_sample(self) -> bool {
        matches!(
            self,
            Request::Temperature | Request::Pressure | Request::Humidity
        )
    }
}

/// Outcome of parsing one line
pub struct Parsed<'a> {
    pub requests: Vec<Request, MAX_REQUESTS>,
    /// First word that was not understood, if any
    pub unknown: Option<&'a [u8]>,
}

/// Split `line` into requests
///
/// Requests past [`MAX_REQUESTS`] are ignored. Unknown words do not stop
/// the parse; only the first one is kept for the reply.
pub fn parse(line: &[u8]) -> Parsed<'_> {
    let mut parsed = Parsed {
        requests: Vec::new(),
        unknown: None,
    };

    let words = line
        .split(|&b| matches!(b, b' ' | b'\t' | b',' | b';' | b':'))
        .filter(|word| !word.is_empty());

    for word in words {
        if word.eq_ignore_ascii_case(b"read") {
            continue;
        }
        match Request::from_word(word) {
            Some(request) => {
                if parsed.requests.push(request).is_err() {
                    break;
                }
            }
            None => {
                parsed.unknown.get_or_insert(word);
            }
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requests(line: &[u8]) -> std::vec::Vec<Request> {
        parse(line).requests.iter().copied().collect()
    }

    #[test]
    fn test_read_word_is_optional() {
        assert_eq!(
            requests(b"read temp press"),
            [Request::Temperature, Request::Pressure]
        );
        assert_eq!(requests(b"temp press"), requests(b"read temp press"));
        assert!(parse(b"READ").requests.is_empty());
        assert_eq!(parse(b"read").unknown, None);
    }

    #[test]
    fn test_words_are_case_insensitive() {
        assert_eq!(
            requests(b"Temperature HUM Id"),
            [Request::Temperature, Request::Humidity, Request::ChipId]
        );
    }

    #[test]
    fn test_separators() {
        assert_eq!(
            requests(b"  temp,press;hum:\tscan  "),
            [
                Request::Temperature,
                Request::Pressure,
                Request::Humidity,
                Request::Scan
            ]
        );
        assert!(parse(b" ,;: ").requests.is_empty());
    }

    #[test]
    fn test_extra_requests_are_dropped() {
        let parsed = parse(b"temp press hum id scan dropped");
        assert_eq!(parsed.requests.len(), MAX_REQUESTS);
        assert_eq!(
            parsed.requests.as_slice(),
            [
                Request::Temperature,
                Request::Pressure,
                Request::Humidity,
                Request::ChipId
            ]
        );
    }

    #[test]
    fn test_first_unknown_word_is_kept() {
        let parsed = parse(b"temp wind press rain");
        assert_eq!(parsed.unknown, Some(&b"wind"[..]));
        assert_eq!(
            parsed.requests.as_slice(),
            [Request::Temperature, Request::Pressure]
        );
    }

    #[test]
    fn test_needs_sample() {
        assert!(Request::Temperature.needs_sample());
        assert!(Request::Pressure.needs_sample());
        assert!(Request::Humidity.needs_sample());
        assert!(!Request::ChipId.needs_sample());
        assert!(!Request::Scan.needs_sample());
        assert!(!Request::Dropped.needs_sample());
    }
}
