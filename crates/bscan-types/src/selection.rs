//! Operator selection and characteristic selection policy.
//!
//! Lists shown to the operator are numbered from 1. The helpers here turn an
//! answer into a 0-based index and pick the characteristic a payload is
//! written to.

use crate::error::{SelectionError, SelectionResult};
use crate::types::{CharacteristicInfo, ServiceInfo};

/// Parse a 1-based answer against a list of `count` entries.
///
/// Surrounding whitespace is ignored. Returns the 0-based index. A whole
/// number too large for `i64` is out of range, not malformed.
///
/// # Examples
///
/// ```
/// use bscan_types::parse_selection;
///
/// assert_eq!(parse_selection("1", 2), Ok(0));
/// assert_eq!(parse_selection(" 2\n", 2), Ok(1));
/// assert!(parse_selection("3", 2).is_err());
/// assert!(parse_selection("one", 2).is_err());
/// ```
pub fn parse_selection(input: &str, count: usize) -> SelectionResult<usize> {
    let trimmed = input.trim();
    let index: i64 = match trimmed.parse() {
        Ok(index) => index,
        Err(_) => match overflow_bound(trimmed) {
            Some(index) => index,
            None => return Err(SelectionError::NotANumber(trimmed.to_string())),
        },
    };

    if index < 1 || index as u64 > count as u64 {
        return Err(SelectionError::OutOfRange { index, count });
    }

    Ok((index - 1) as usize)
}

/// Saturated value of a signed decimal integer that does not fit in `i64`.
fn overflow_bound(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}

/// The first characteristic, in service order then characteristic order,
/// that accepts a write request.
pub fn first_writable(services: &[ServiceInfo]) -> Option<&CharacteristicInfo> {
    services
        .iter()
        .flat_map(|service| service.characteristics.iter())
        .find(|c| c.properties.supports_write())
}

/// Every characteristic across all services, in the order offered to the
/// operator for manual selection.
pub fn flatten_characteristics(services: &[ServiceInfo]) -> Vec<CharacteristicInfo> {
    services
        .iter()
        .flat_map(|service| service.characteristics.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CharProperties;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn char_with(n: u128, props: CharProperties) -> CharacteristicInfo {
        CharacteristicInfo::new(Uuid::from_u128(n), Uuid::from_u128(n >> 8), props)
    }

    #[test]
    fn test_parse_selection_rejects_zero_and_negative() {
        assert_eq!(
            parse_selection("0", 3),
            Err(SelectionError::OutOfRange { index: 0, count: 3 })
        );
        assert_eq!(
            parse_selection("-1", 3),
            Err(SelectionError::OutOfRange { index: -1, count: 3 })
        );
    }

    #[test]
    fn test_parse_selection_rejects_non_numeric() {
        assert_eq!(
            parse_selection("", 3),
            Err(SelectionError::NotANumber(String::new()))
        );
        assert_eq!(
            parse_selection("1.5", 3),
            Err(SelectionError::NotANumber("1.5".to_string()))
        );
    }

    #[test]
    fn test_parse_selection_huge_number_is_out_of_range() {
        assert_eq!(
            parse_selection("99999999999999999999", 2),
            Err(SelectionError::OutOfRange {
                index: i64::MAX,
                count: 2
            })
        );
        assert_eq!(
            parse_selection(" -99999999999999999999 ", 2),
            Err(SelectionError::OutOfRange {
                index: i64::MIN,
                count: 2
            })
        );
        assert_eq!(
            parse_selection("+", 2),
            Err(SelectionError::NotANumber("+".to_string()))
        );
        assert_eq!(
            parse_selection("9999999999999999999x", 2),
            Err(SelectionError::NotANumber("9999999999999999999x".to_string()))
        );
    }

    #[test]
    fn test_parse_selection_accepts_explicit_plus() {
        assert_eq!(parse_selection("+1", 2), Ok(0));
    }

    #[test]
    fn test_parse_selection_empty_list() {
        assert!(parse_selection("1", 0).is_err());
    }

    #[test]
    fn test_first_writable_prefers_service_order() {
        let services = vec![
            ServiceInfo::new(
                Uuid::from_u128(0x1800),
                vec![char_with(0x2A00, CharProperties::READ)],
            ),
            ServiceInfo::new(
                Uuid::from_u128(0xFFE0),
                vec![
                    char_with(0xFFE2, CharProperties::WRITE_WITHOUT_RESPONSE),
                    char_with(0xFFE1, CharProperties::READ | CharProperties::WRITE),
                ],
            ),
            ServiceInfo::new(
                Uuid::from_u128(0xFFF0),
                vec![char_with(0xFFF1, CharProperties::WRITE)],
            ),
        ];

        let chosen = first_writable(&services).unwrap();
        assert_eq!(chosen.uuid, Uuid::from_u128(0xFFE1));
    }

    #[test]
    fn test_first_writable_none() {
        let services = vec![ServiceInfo::new(
            Uuid::from_u128(0x180F),
            vec![char_with(0x2A19, CharProperties::READ | CharProperties::NOTIFY)],
        )];
        assert!(first_writable(&services).is_none());
        assert!(first_writable(&[]).is_none());
    }

    #[test]
    fn test_flatten_keeps_cross_service_order() {
        let services = vec![
            ServiceInfo::new(
                Uuid::from_u128(0x1800),
                vec![
                    char_with(0x2A00, CharProperties::READ),
                    char_with(0x2A01, CharProperties::READ),
                ],
            ),
            ServiceInfo::new(Uuid::from_u128(0x1801), vec![]),
            ServiceInfo::new(
                Uuid::from_u128(0x180A),
                vec![char_with(0x2A29, CharProperties::READ)],
            ),
        ];

        let uuids: Vec<Uuid> = flatten_characteristics(&services)
            .iter()
            .map(|c| c.uuid)
            .collect();
        assert_eq!(
            uuids,
            vec![
                Uuid::from_u128(0x2A00),
                Uuid::from_u128(0x2A01),
                Uuid::from_u128(0x2A29)
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_in_range_maps_to_previous_index(count in 1usize..64, pick in 0usize..64) {
            prop_assume!(pick < count);
            let answer = (pick + 1).to_string();
            prop_assert_eq!(parse_selection(&answer, count), Ok(pick));
        }

        #[test]
        fn prop_out_of_range_is_rejected(count in 0usize..64, index in 65i64..10_000) {
            let is_out_of_range = matches!(
                parse_selection(&index.to_string(), count),
                Err(SelectionError::OutOfRange { .. })
            );
            prop_assert!(is_out_of_range);
        }

        #[test]
        fn prop_parse_never_panics(input in ".*", count in 0usize..16) {
            let _ = parse_selection(&input, count);
        }
    }
}
