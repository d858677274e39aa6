//! Who receives lifecycle notifications for a booking.

use crate::model::Booking;

/// Pick the email address to notify about `booking`.
///
/// A non-blank guest email wins; otherwise the linked customer's account
/// email, if non-blank. The result is trimmed. `None` means nobody can be
/// contacted.
#[must_use]
pub fn resolve_recipient(booking: &Booking) -> Option<String> {
    non_blank(booking.guest_email.as_deref())
        .or_else(|| {
            let user = booking.customer.as_ref()?.user.as_ref()?;
            non_blank(Some(user.email.as_str()))
        })
        .map(str::to_string)
}

fn non_blank(email: Option<&str>) -> Option<&str> {
    email.map(str::trim).filter(|email| !email.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{BookingId, CustomerId, CustomerLink, PersonRef};
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use wildtrails_auth::UserId;

    fn booking(guest: Option<&str>, customer: Option<&str>) -> Booking {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        let mut booking = Booking::new(BookingId(1), date);
        booking.guest_email = guest.map(str::to_string);
        booking.customer = customer.map(|email| CustomerLink {
            id: CustomerId(5),
            user: Some(PersonRef {
                user_id: UserId(8),
                name: "Cust".to_string(),
                email: email.to_string(),
            }),
        });
        booking
    }

    #[test]
    fn test_guest_email_takes_precedence() {
        assert_eq!(
            resolve_recipient(&booking(Some("g@x.com"), Some("c@x.com"))),
            Some("g@x.com".to_string())
        );
    }

    #[test]
    fn test_blank_guest_falls_back_to_customer() {
        assert_eq!(
            resolve_recipient(&booking(Some("   "), Some("c@x.com"))),
            Some("c@x.com".to_string())
        );
        assert_eq!(
            resolve_recipient(&booking(None, Some(" c@x.com\t"))),
            Some("c@x.com".to_string())
        );
    }

    #[test]
    fn test_nobody_to_contact() {
        assert_eq!(resolve_recipient(&booking(None, None)), None);
        assert_eq!(resolve_recipient(&booking(Some(""), Some(" "))), None);

        let mut orphaned = booking(None, None);
        orphaned.customer = Some(CustomerLink { id: CustomerId(1), user: None });
        assert_eq!(resolve_recipient(&orphaned), None);
    }

    fn padded(inner: &'static str) -> impl Strategy<Value = String> {
        ("[ \t]{0,3}", "[ \t]{0,3}").prop_map(move |(l, r)| format!("{l}{inner}{r}"))
    }

    proptest! {
        #[test]
        fn prop_non_blank_guest_always_wins(guest in padded("g@x.com"), customer in prop::option::of(padded("c@x.com"))) {
            let booking = booking(Some(&guest), customer.as_deref());
            prop_assert_eq!(resolve_recipient(&booking), Some("g@x.com".to_string()));
        }

        #[test]
        fn prop_blank_guest_defers_to_customer(guest in prop::option::of("[ \t]{0,4}"), customer in padded("c@x.com")) {
            let booking = booking(guest.as_deref(), Some(&customer));
            prop_assert_eq!(resolve_recipient(&booking), Some("c@x.com".to_string()));
        }

        #[test]
        fn prop_result_is_never_blank(guest in prop::option::of("[ a-z@.]{0,8}"), customer in prop::option::of("[ a-z@.]{0,8}")) {
            let booking = booking(guest.as_deref(), customer.as_deref());
            if let Some(recipient) = resolve_recipient(&booking) {
                prop_assert!(!recipient.is_empty());
                prop_assert_eq!(recipient.trim(), recipient.as_str());
            }
        }
    }
}
