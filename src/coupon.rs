//! Coupon validation and discount arithmetic.
//!
//! The rule is a pure function over sequential guard clauses: active, date
//! window, usage limit, minimum subtotal, prior redemption by the same
//! customer. Each failure maps to a distinct rejection reason so the caller
//! can show the customer which guard tripped.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::models::{coupon_kind, Coupon};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponRejection {
    UnknownCode,
    NotStarted,
    Expired,
    UsageLimitReached,
    BelowMinimum { minimum: i64 },
    AlreadyRedeemed,
}

impl fmt::Display for CouponRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCode => write!(f, "coupon code is invalid"),
            Self::NotStarted => write!(f, "coupon is not active yet"),
            Self::Expired => write!(f, "coupon has expired"),
            Self::UsageLimitReached => write!(f, "coupon usage limit reached"),
            Self::BelowMinimum { minimum } => {
                write!(f, "order must be at least {minimum} to use this coupon")
            }
            Self::AlreadyRedeemed => write!(f, "coupon was already redeemed"),
        }
    }
}

/// Validate `coupon` against an order subtotal and return the discount in
/// whole currency units.
///
/// An inactive coupon is indistinguishable from a nonexistent one; callers
/// map a missing row to [`CouponRejection::UnknownCode`] themselves.
pub fn discount_for(
    coupon: &Coupon,
    subtotal: i64,
    now: DateTime<Utc>,
    already_redeemed: bool,
) -> Result<i64, CouponRejection> {
    if !coupon.active {
        return Err(CouponRejection::UnknownCode);
    }
    if let Some(starts_at) = coupon.starts_at {
        if now < starts_at {
            return Err(CouponRejection::NotStarted);
        }
    }
    if let Some(expires_at) = coupon.expires_at {
        if now > expires_at {
            return Err(CouponRejection::Expired);
        }
    }
    if let Some(limit) = coupon.usage_limit {
        if coupon.usage_count >= limit {
            return Err(CouponRejection::UsageLimitReached);
        }
    }
    if subtotal < coupon.min_order_amount {
        return Err(CouponRejection::BelowMinimum { minimum: coupon.min_order_amount });
    }
    if already_redeemed {
        return Err(CouponRejection::AlreadyRedeemed);
    }

    let raw = if coupon.kind == coupon_kind::PERCENTAGE {
        // Round half-up to the nearest whole currency unit.
        let pct = (subtotal * coupon.value + 50) / 100;
        match coupon.max_discount {
            Some(cap) => pct.min(cap),
            None => pct,
        }
    } else {
        coupon.value
    };

    // The discount never exceeds the subtotal itself.
    Ok(raw.clamp(0, subtotal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn coupon(kind: &str, value: i64) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            code: "SAVE".into(),
            kind: kind.into(),
            value,
            max_discount: None,
            min_order_amount: 0,
            usage_limit: None,
            usage_count: 0,
            starts_at: None,
            expires_at: None,
            active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn percentage_discount_is_capped() {
        let mut c = coupon("percentage", 20);
        c.max_discount = Some(100);
        // 20% of 1000 would be 200; the cap wins.
        assert_eq!(discount_for(&c, 1000, Utc::now(), false), Ok(100));
    }

    #[test]
    fn percentage_discount_rounds_half_up() {
        let c = coupon("percentage", 15);
        // 15% of 250 = 37.5, rounds to 38.
        assert_eq!(discount_for(&c, 250, Utc::now(), false), Ok(38));
        // 15% of 249 = 37.35, rounds to 37.
        assert_eq!(discount_for(&c, 249, Utc::now(), false), Ok(37));
    }

    #[test]
    fn fixed_discount_never_exceeds_subtotal() {
        let c = coupon("fixed", 50);
        assert_eq!(discount_for(&c, 30, Utc::now(), false), Ok(30));
        assert_eq!(discount_for(&c, 80, Utc::now(), false), Ok(50));
    }

    #[test]
    fn inactive_reads_as_unknown_code() {
        let mut c = coupon("fixed", 50);
        c.active = false;
        c.expires_at = Some(Utc::now() - Duration::days(1));
        // Active guard runs before the date window.
        assert_eq!(discount_for(&c, 100, Utc::now(), false), Err(CouponRejection::UnknownCode));
    }

    #[test]
    fn date_window_guards() {
        let now = Utc::now();
        let mut c = coupon("fixed", 50);
        c.starts_at = Some(now + Duration::hours(1));
        assert_eq!(discount_for(&c, 100, now, false), Err(CouponRejection::NotStarted));

        let mut c = coupon("fixed", 50);
        c.expires_at = Some(now - Duration::hours(1));
        assert_eq!(discount_for(&c, 100, now, false), Err(CouponRejection::Expired));
    }

    #[test]
    fn usage_limit_checked_before_minimum() {
        let mut c = coupon("fixed", 50);
        c.usage_limit = Some(3);
        c.usage_count = 3;
        c.min_order_amount = 500;
        // Subtotal is also below the minimum; the usage guard fires first.
        assert_eq!(discount_for(&c, 100, Utc::now(), false), Err(CouponRejection::UsageLimitReached));
    }

    #[test]
    fn minimum_checked_before_redemption() {
        let mut c = coupon("fixed", 50);
        c.min_order_amount = 500;
        assert_eq!(
            discount_for(&c, 100, Utc::now(), true),
            Err(CouponRejection::BelowMinimum { minimum: 500 })
        );
        c.min_order_amount = 0;
        assert_eq!(discount_for(&c, 100, Utc::now(), true), Err(CouponRejection::AlreadyRedeemed));
    }

    #[test]
    fn usage_below_limit_is_accepted() {
        let mut c = coupon("percentage", 10);
        c.usage_limit = Some(3);
        c.usage_count = 2;
        assert_eq!(discount_for(&c, 200, Utc::now(), false), Ok(20));
    }
}
