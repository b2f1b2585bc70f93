//! End-to-end behaviour of the local backend through a `StoreContext`.

use chrono::NaiveDate;
use tempfile::TempDir;

use deskbook::{Config, StoreContext};
use deskbook_core::booking::{Booking, BookingStatus, BulkAvailabilityCommand};
use deskbook_core::expense::{Expense, RecurringExpense};
use deskbook_core::storage::{
    BookingStore, DateRange, DeskStore, ExpenseStore, RecurringExpenseStore,
};
use deskbook_core::waitlist::NewWaitingListEntry;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn summary(expenses: &[Expense]) -> Vec<(String, f64)> {
    expenses.iter().map(|e| (e.id.clone(), e.amount)).collect()
}

fn context(dir: &TempDir) -> StoreContext {
    StoreContext::from_config(&Config::local(dir.path())).unwrap()
}

#[tokio::test]
async fn test_bulk_available_produces_six_clean_records() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    ctx.store()
        .save_booking(&Booking::booked("D2", date(2024, 4, 2), "Ana").with_price(30.0))
        .await
        .unwrap();

    let command = BulkAvailabilityCommand::new(
        date(2024, 4, 1),
        date(2024, 4, 3),
        vec!["D1".to_string(), "D2".to_string()],
        BookingStatus::Available,
    );
    let written = ctx.store().apply_bulk_availability(&command).await.unwrap();
    assert_eq!(written.len(), 6);

    let stored = ctx
        .store()
        .get_bookings_for_range(DateRange::new(date(2024, 4, 1), date(2024, 4, 3)).unwrap())
        .await
        .unwrap();
    assert_eq!(stored.len(), 6);
    for booking in &stored {
        assert_eq!(booking.status, BookingStatus::Available);
        assert!(booking.person_name.is_none());
        assert!(booking.title.is_none());
        assert!(booking.price.is_none());
    }
}

#[tokio::test]
async fn test_bulk_booked_carries_person_on_every_slot() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);

    let command = BulkAvailabilityCommand::new(
        date(2024, 5, 6),
        date(2024, 5, 10),
        vec!["D3".to_string(), "D4".to_string(), "D5".to_string()],
        BookingStatus::Booked,
    )
    .with_person("Acme team")
    .with_price(18.0);
    ctx.store().apply_bulk_availability(&command).await.unwrap();

    let stored = ctx
        .store()
        .get_bookings_for_range(DateRange::new(date(2024, 5, 6), date(2024, 5, 10)).unwrap())
        .await
        .unwrap();
    assert_eq!(stored.len(), 15);
    assert!(stored
        .iter()
        .all(|b| b.status == BookingStatus::Booked && b.person_name.as_deref() == Some("Acme team")));
}

#[tokio::test]
async fn test_invalid_booking_is_never_observed() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let day = date(2024, 3, 15);

    let mut booking = Booking::booked("D1", day, "Ana");
    booking.person_name = None;
    let err = ctx.store().save_booking(&booking).await.unwrap_err();
    assert!(err.is_validation());

    let stored = ctx
        .store()
        .get_bookings_for_range(DateRange::day(day))
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_save_booking_shows_in_cached_monthly_stats() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);

    let before = ctx.store().get_monthly_stats(2024, 3).await.unwrap();
    ctx.store()
        .save_booking(&Booking::booked("D1", date(2024, 3, 15), "Ana"))
        .await
        .unwrap();
    let after = ctx.store().get_monthly_stats(2024, 3).await.unwrap();

    assert_eq!(after.occupied, before.occupied + 1);
    assert_eq!(after.booked, before.booked + 1);
}

#[tokio::test]
async fn test_generation_twice_yields_identical_expenses() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let store = ctx.store();
    store
        .save_recurring_expense(&RecurringExpense::new("Rent", 1_500.0, 1).with_id("rent"))
        .await
        .unwrap();
    store
        .save_recurring_expense(&RecurringExpense::new("Internet", 60.0, 31).with_id("net"))
        .await
        .unwrap();

    let first = store.generate_recurring_expenses(2024, 4).await.unwrap();
    let second = store.generate_recurring_expenses(2024, 4).await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(summary(&first), summary(&second));

    let april = store
        .get_expenses(DateRange::month(2024, 4).unwrap())
        .await
        .unwrap();
    assert_eq!(april.len(), 2);
    assert!(april.iter().any(|e| e.date == date(2024, 4, 30)));
}

#[tokio::test]
async fn test_generation_without_active_rules_is_empty() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    ctx.store()
        .save_recurring_expense(&RecurringExpense::new("Cleaning", 80.0, 5).with_active(false))
        .await
        .unwrap();

    let generated = ctx.store().generate_recurring_expenses(2024, 4).await.unwrap();
    assert!(generated.is_empty());
}

#[tokio::test]
async fn test_rule_edits_do_not_touch_generated_expenses() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let store = ctx.store();
    let rule = store
        .save_recurring_expense(&RecurringExpense::new("Rent", 1_500.0, 1).with_id("rent"))
        .await
        .unwrap();
    store.generate_recurring_expenses(2024, 4).await.unwrap();

    let mut raised = rule.clone();
    raised.amount = 1_600.0;
    store.save_recurring_expense(&raised).await.unwrap();
    store.delete_recurring_expense("rent").await.unwrap();

    let april = store
        .get_expenses(DateRange::month(2024, 4).unwrap())
        .await
        .unwrap();
    assert_eq!(april.len(), 1);
    assert_eq!(april[0].amount, 1_500.0);
}

#[tokio::test]
async fn test_regeneration_drops_expenses_of_retired_rules() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let store = ctx.store();
    let rent = store
        .save_recurring_expense(&RecurringExpense::new("Rent", 1_500.0, 1).with_id("rent"))
        .await
        .unwrap();
    store
        .save_expense(&Expense::new(date(2024, 4, 12), 25.0, "Coffee").with_id("coffee"))
        .await
        .unwrap();

    assert_eq!(store.generate_recurring_expenses(2024, 4).await.unwrap().len(), 1);
    assert_eq!(store.get_monthly_stats(2024, 4).await.unwrap().expenses, 1_525.0);

    store
        .save_recurring_expense(&rent.with_active(false))
        .await
        .unwrap();
    let regenerated = store.generate_recurring_expenses(2024, 4).await.unwrap();

    assert!(regenerated.is_empty());
    let april = store
        .get_expenses(DateRange::month(2024, 4).unwrap())
        .await
        .unwrap();
    assert_eq!(summary(&april), vec![("coffee".to_string(), 25.0)]);
    assert_eq!(store.get_monthly_stats(2024, 4).await.unwrap().expenses, 25.0);
}

#[tokio::test]
async fn test_reused_booking_id_keeps_the_original_slot() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let store = ctx.store();
    let march = DateRange::month(2024, 3).unwrap();
    let ana = store
        .save_booking(&Booking::booked("D1", date(2024, 3, 31), "Ana"))
        .await
        .unwrap();
    assert_eq!(store.get_bookings_for_range(march).await.unwrap().len(), 1);

    let bea = Booking::booked("D2", date(2024, 4, 1), "Bea").with_id(ana.id.clone());
    let result = store.save_booking(&bea).await;

    assert!(result.unwrap_err().is_validation());
    let fresh = context(&dir);
    assert_eq!(
        fresh.store().get_bookings_for_range(march).await.unwrap(),
        vec![ana.clone()]
    );
    assert_eq!(store.get_bookings_for_range(march).await.unwrap(), vec![ana]);
    assert!(fresh
        .store()
        .get_bookings_for_range(DateRange::month(2024, 4).unwrap())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_expense_moved_between_months_updates_both_stats() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let store = ctx.store();
    let expense = store
        .save_expense(&Expense::new(date(2024, 3, 10), 40.0, "Paper").with_id("paper"))
        .await
        .unwrap();

    assert_eq!(store.get_monthly_stats(2024, 3).await.unwrap().expenses, 40.0);
    assert_eq!(store.get_monthly_stats(2024, 4).await.unwrap().expenses, 0.0);

    let mut moved = expense.clone();
    moved.date = date(2024, 4, 2);
    store.save_expense(&moved).await.unwrap();

    assert_eq!(store.get_monthly_stats(2024, 3).await.unwrap().expenses, 0.0);
    assert_eq!(store.get_monthly_stats(2024, 4).await.unwrap().expenses, 40.0);
}

#[tokio::test]
async fn test_waiting_list_newest_first() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);

    ctx.waitlist()
        .add_entry(NewWaitingListEntry::new("Ana"))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let latest = ctx
        .waitlist()
        .add_entry(NewWaitingListEntry::new("Bruno"))
        .await
        .unwrap();

    let entries = ctx.waitlist().get_all_entries().await.unwrap();
    assert_eq!(entries[0], latest);
}

#[tokio::test]
async fn test_documents_survive_a_new_context() {
    let dir = TempDir::new().unwrap();
    {
        let ctx = context(&dir);
        ctx.store()
            .save_booking(&Booking::booked("D7", date(2024, 6, 3), "Carla"))
            .await
            .unwrap();
        ctx.waitlist()
            .add_entry(NewWaitingListEntry::new("Dario"))
            .await
            .unwrap();
    }

    let ctx = context(&dir);
    let bookings = ctx
        .store()
        .get_bookings_for_range(DateRange::month(2024, 6).unwrap())
        .await
        .unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].person_name.as_deref(), Some("Carla"));
    assert_eq!(ctx.waitlist().get_all_entries().await.unwrap().len(), 1);
    assert!(dir.path().join("deskbook.bookings.json").exists());
}

#[tokio::test]
async fn test_upcoming_and_desk_statistics() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let store = ctx.store();
    store
        .save_booking(&Booking::booked("D2", date(2024, 3, 20), "Ana").with_price(25.0))
        .await
        .unwrap();
    store
        .save_booking(&Booking::available("D1", date(2024, 3, 18)).assign("Bruno").unwrap())
        .await
        .unwrap();
    store
        .save_booking(&Booking::available("D3", date(2024, 3, 19)).block().unwrap())
        .await
        .unwrap();

    let upcoming = store
        .get_upcoming_bookings(date(2024, 3, 1), 10)
        .await
        .unwrap();
    let keys: Vec<(&str, NaiveDate)> = upcoming.iter().map(|b| b.key()).collect();
    assert_eq!(keys, vec![("D1", date(2024, 3, 18)), ("D2", date(2024, 3, 20))]);

    let desks = store
        .get_desk_statistics(DateRange::month(2024, 3).unwrap())
        .await
        .unwrap();
    assert_eq!(desks.len(), 10);
    assert_eq!(desks[1].desk_id, "D2");
    assert_eq!(desks[1].booked_days, 1);
    assert_eq!(desks[1].revenue, 25.0);
}
