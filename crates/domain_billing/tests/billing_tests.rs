//! Comprehensive tests for domain_billing entities

use chrono::{Days, NaiveDate, Utc};
use rust_decimal_macros::dec;

use core_kernel::{BillId, Currency, Money, PatientId};

use domain_billing::allocator::BillNumberAllocator;
use domain_billing::bill::{Bill, BillItem, BillStatus, DEFAULT_DUE_DAYS};
use domain_billing::error::BillingError;
use domain_billing::payment::{Payment, PaymentStatus};

use test_utils::MoneyFixtures;

fn usd(amount: rust_decimal::Decimal) -> Money {
    Money::new(amount, Currency::USD)
}

fn create_test_bill() -> Bill {
    Bill::new(
        BillId::from_sequence(1),
        PatientId::new(),
        Utc::now().date_naive(),
        Currency::USD,
    )
}

// ============================================================================
// Status Derivation Tests
// ============================================================================

mod status_tests {
    use super::*;

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    #[test]
    fn test_nothing_paid_before_due_date_is_unpaid() {
        let status = BillStatus::derive(
            MoneyFixtures::usd_zero(),
            MoneyFixtures::usd_consultation(),
            today() + Days::new(30),
            today(),
        );
        assert_eq!(status, BillStatus::Unpaid);
    }

    #[test]
    fn test_partial_payment_is_partial() {
        let status = BillStatus::derive(
            MoneyFixtures::usd_partial_payment(),
            MoneyFixtures::usd_consultation(),
            today() + Days::new(30),
            today(),
        );
        assert_eq!(status, BillStatus::Partial);
    }

    #[test]
    fn test_full_payment_is_paid() {
        let status = BillStatus::derive(
            MoneyFixtures::usd_consultation(),
            MoneyFixtures::usd_consultation(),
            today() + Days::new(30),
            today(),
        );
        assert_eq!(status, BillStatus::Paid);
    }

    #[test]
    fn test_nothing_paid_past_due_date_is_overdue() {
        let status = BillStatus::derive(
            MoneyFixtures::usd_zero(),
            MoneyFixtures::usd_consultation(),
            today() - Days::new(1),
            today(),
        );
        assert_eq!(status, BillStatus::Overdue);
    }

    #[test]
    fn test_due_today_is_not_overdue() {
        let status = BillStatus::derive(
            MoneyFixtures::usd_zero(),
            MoneyFixtures::usd_consultation(),
            today(),
            today(),
        );
        assert_eq!(status, BillStatus::Unpaid);
    }

    #[test]
    fn test_partial_takes_precedence_over_overdue() {
        // The derivation ladder checks paid amounts before due dates.
        let status = BillStatus::derive(
            MoneyFixtures::usd_partial_payment(),
            MoneyFixtures::usd_consultation(),
            today() - Days::new(10),
            today(),
        );
        assert_eq!(status, BillStatus::Partial);
    }

    #[test]
    fn test_zero_total_with_positive_payment_is_paid() {
        let status = BillStatus::derive(
            MoneyFixtures::usd_partial_payment(),
            MoneyFixtures::usd_zero(),
            today() + Days::new(30),
            today(),
        );
        assert_eq!(status, BillStatus::Paid);
    }

    #[test]
    fn test_zero_total_with_nothing_paid_is_unpaid() {
        let status = BillStatus::derive(
            MoneyFixtures::usd_zero(),
            MoneyFixtures::usd_zero(),
            today() + Days::new(30),
            today(),
        );
        assert_eq!(status, BillStatus::Unpaid);
    }
}

// ============================================================================
// Bill Tests
// ============================================================================

mod bill_tests {
    use super::*;

    #[test]
    fn test_bill_new() {
        let bill = create_test_bill();

        assert_eq!(bill.status, BillStatus::Unpaid);
        assert_eq!(bill.currency, Currency::USD);
        assert!(bill.items.is_empty());
        assert!(bill.total_amount.is_zero());
        assert!(bill.amount_paid.is_zero());
        assert!(bill.date_paid.is_none());
    }

    #[test]
    fn test_bill_item_order_is_preserved() {
        let mut bill = create_test_bill();
        bill.add_item(BillItem::new("Consultation", usd(dec!(150)))).unwrap();
        bill.add_item(BillItem::new("X-Ray", usd(dec!(100)))).unwrap();
        bill.add_item(BillItem::new("Lab work", usd(dec!(75)))).unwrap();

        let descriptions: Vec<&str> = bill.items.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Consultation", "X-Ray", "Lab work"]);
        assert_eq!(bill.total_amount.amount(), dec!(325));
    }

    #[test]
    fn test_remaining_balance_floors_at_zero() {
        let mut bill = create_test_bill();

        // Zero-total discharge leaves no negative remainder.
        bill.apply_payment(usd(dec!(20))).unwrap();
        assert!(bill.remaining_balance().is_zero());
    }

    #[test]
    fn test_default_due_threshold_constant() {
        let bill = create_test_bill();
        let expected = bill.issue_date + Days::new(DEFAULT_DUE_DAYS);
        assert_eq!(bill.effective_due_date(None), expected);
    }

    #[test]
    fn test_bill_serialization_round_trip() {
        let mut bill = create_test_bill();
        bill.add_item(BillItem::new("Consultation", usd(dec!(150)))).unwrap();

        let json = serde_json::to_string(&bill).unwrap();
        let back: Bill = serde_json::from_str(&json).unwrap();

        assert_eq!(back.id, bill.id);
        assert_eq!(back.items, bill.items);
        assert_eq!(back.total_amount, bill.total_amount);
        assert_eq!(back.status, bill.status);
    }

    #[test]
    fn test_all_bill_statuses_serialize() {
        let statuses = vec![
            BillStatus::Unpaid,
            BillStatus::Partial,
            BillStatus::Paid,
            BillStatus::Overdue,
        ];

        for status in statuses {
            let json = serde_json::to_string(&status).unwrap();
            assert!(!json.is_empty());
        }
    }
}

// ============================================================================
// Payment Tests
// ============================================================================

mod payment_tests {
    use super::*;

    fn create_test_payment() -> Payment {
        Payment::new(BillId::from_sequence(1), usd(dec!(40)), "CASH")
    }

    #[test]
    fn test_payment_new() {
        let payment = create_test_payment();

        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.amount.amount(), dec!(40));
        assert_eq!(payment.method, "CASH");
        assert!(payment.completed_at.is_none());
    }

    #[test]
    fn test_payment_amount_and_bill_are_fixed() {
        let mut payment = create_test_payment();
        let bill_id = payment.bill_id;
        let amount = payment.amount;

        payment.complete().unwrap();
        payment.refund("charge entered twice").unwrap();

        // Status transitions never touch amount or bill id.
        assert_eq!(payment.bill_id, bill_id);
        assert_eq!(payment.amount, amount);
    }

    #[test]
    fn test_completed_payment_cannot_fail() {
        let mut payment = create_test_payment();
        payment.complete().unwrap();

        let result = payment.fail("too late");
        assert!(matches!(
            result,
            Err(BillingError::InvalidPaymentTransition {
                from: PaymentStatus::Completed,
                to: PaymentStatus::Failed,
            })
        ));
    }

    #[test]
    fn test_all_payment_statuses_serialize() {
        let statuses = vec![
            PaymentStatus::Pending,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
        ];

        for status in statuses {
            let json = serde_json::to_string(&status).unwrap();
            assert!(!json.is_empty());
        }
    }

    #[test]
    fn test_payment_serialization_round_trip() {
        let mut payment = create_test_payment();
        payment.complete().unwrap();

        let json = serde_json::to_string(&payment).unwrap();
        let back: Payment = serde_json::from_str(&json).unwrap();

        assert_eq!(back.id, payment.id);
        assert_eq!(back.status, PaymentStatus::Completed);
        assert_eq!(back.amount, payment.amount);
    }
}

// ============================================================================
// Allocator Tests
// ============================================================================

mod allocator_tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_back_to_back_allocations_are_pairwise_distinct() {
        let allocator = BillNumberAllocator::new();

        let ids: HashSet<BillId> = (0..50).map(|_| allocator.allocate()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_allocation_order_matches_id_order() {
        let allocator = BillNumberAllocator::new();

        let ids: Vec<BillId> = (0..100).map(|_| allocator.allocate()).collect();
        let mut sorted = ids.clone();
        sorted.sort();

        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_independent_allocators_restart_from_the_clock() {
        // Two engine instances each allocate from wall-clock millis; within
        // one instance ids are unique regardless.
        let first = BillNumberAllocator::new();
        let second = BillNumberAllocator::new();

        let a = first.allocate();
        let b = first.allocate();
        let c = second.allocate();

        assert!(b > a);
        assert!(c.value() > 0);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod proptests {
    use super::*;
    use proptest::prelude::*;
    use test_utils::generators::{description_strategy, item_amount_minor_strategy};

    proptest! {
        #[test]
        fn adding_items_never_decreases_the_total(
            entries in proptest::collection::vec(
                (description_strategy(), item_amount_minor_strategy()),
                1..15
            )
        ) {
            let mut bill = create_test_bill();
            let mut previous_total = bill.total_amount;

            for (description, minor) in entries {
                bill.add_item(BillItem::new(description, Money::from_minor(minor, Currency::USD))).unwrap();
                prop_assert!(bill.total_amount >= previous_total);
                previous_total = bill.total_amount;
            }
        }

        #[test]
        fn derive_never_answers_paid_for_zero_paid_amount(
            total_minor in 1i64..1_000_000i64,
            due_offset in -60i64..60i64
        ) {
            let today = Utc::now().date_naive();
            let due = if due_offset >= 0 {
                today + Days::new(due_offset as u64)
            } else {
                today - Days::new((-due_offset) as u64)
            };

            let status = BillStatus::derive(
                Money::zero(Currency::USD),
                Money::from_minor(total_minor, Currency::USD),
                due,
                today,
            );

            prop_assert_ne!(status, BillStatus::Paid);
            prop_assert_ne!(status, BillStatus::Partial);
        }
    }
}
