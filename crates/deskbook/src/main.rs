//! deskbook CLI entry point.

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deskbook::cli::bookings::BookingsAction;
use deskbook::cli::expenses::ExpensesAction;
use deskbook::cli::recurring::RecurringAction;
use deskbook::cli::stats::StatsAction;
use deskbook::cli::waitlist::WaitlistAction;
use deskbook::cli::{Cli, Commands, OutputFormat};
use deskbook::output::{format_output, pretty};
use deskbook::{Config, StoreContext};
use deskbook_core::booking::{Booking, BulkAvailabilityCommand};
use deskbook_core::expense::{Expense, RecurringExpense};
use deskbook_core::storage::DateRange;
use deskbook_core::waitlist::{NewWaitingListEntry, WaitingListPatch};

/// Prints `value` as JSON, or through `pretty` otherwise.
fn print<T: serde::Serialize>(format: OutputFormat, value: &T, pretty: impl Fn(&T) -> String) {
    match format {
        OutputFormat::Json => println!("{}", format_output(value, format)),
        OutputFormat::Pretty => println!("{}", pretty(value)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays machine readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deskbook=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env().context("Invalid configuration")?;
    let ctx = StoreContext::from_config(&config)?;

    match cli.command {
        Commands::Desks => {
            print(cli.format, &ctx.store().desks().to_vec(), |d| {
                pretty::format_desks(d)
            });
        }
        Commands::Bookings(cmd) => bookings(&ctx, cmd.action, cli.format, cli.quiet).await?,
        Commands::Expenses(cmd) => expenses(&ctx, cmd.action, cli.format, cli.quiet).await?,
        Commands::Recurring(cmd) => recurring(&ctx, cmd.action, cli.format, cli.quiet).await?,
        Commands::Stats(cmd) => stats(&ctx, cmd.action, cli.format).await?,
        Commands::Waitlist(cmd) => waitlist(&ctx, cmd.action, cli.format, cli.quiet).await?,
    }

    Ok(())
}

/// The stored booking for a slot, or an available one if none exists.
async fn current_booking(ctx: &StoreContext, desk: &str, date: NaiveDate) -> Result<Booking> {
    let existing = ctx
        .store()
        .get_bookings_for_range(DateRange::day(date))
        .await?
        .into_iter()
        .find(|b| b.desk_id == desk);
    Ok(existing.unwrap_or_else(|| Booking::available(desk, date)))
}

async fn bookings(
    ctx: &StoreContext,
    action: BookingsAction,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let store = ctx.store();
    match action {
        BookingsAction::List { start, end, desk } => {
            let mut bookings = store
                .get_bookings_for_range(DateRange::new(start, end)?)
                .await?;
            if let Some(desk) = desk {
                bookings.retain(|b| b.desk_id == desk);
            }
            print(format, &bookings, |b| pretty::format_bookings(b));
        }
        BookingsAction::Book {
            desk,
            date,
            person,
            title,
            price,
        } => {
            let mut booking = current_booking(ctx, &desk, date).await?.book(person, price)?;
            booking.title = title;
            let saved = store.save_booking(&booking).await?;
            print(format, &saved, pretty::format_booking);
        }
        BookingsAction::Assign {
            desk,
            date,
            person,
            title,
        } => {
            let mut booking = current_booking(ctx, &desk, date).await?.assign(person)?;
            booking.title = title;
            let saved = store.save_booking(&booking).await?;
            print(format, &saved, pretty::format_booking);
        }
        BookingsAction::Release { desk, date } => {
            let booking = current_booking(ctx, &desk, date).await?.release()?;
            let saved = store.save_booking(&booking).await?;
            print(format, &saved, pretty::format_booking);
        }
        BookingsAction::Block { desk, date } => {
            let booking = current_booking(ctx, &desk, date).await?.block()?;
            let saved = store.save_booking(&booking).await?;
            print(format, &saved, pretty::format_booking);
        }
        BookingsAction::Unblock { desk, date } => {
            let booking = current_booking(ctx, &desk, date).await?.unblock()?;
            let saved = store.save_booking(&booking).await?;
            print(format, &saved, pretty::format_booking);
        }
        BookingsAction::Delete { id } => match store.delete_booking(&id).await? {
            Some(_) if !quiet => println!("Deleted booking {id}"),
            Some(_) => {}
            None => bail!("Booking {id} not found"),
        },
        BookingsAction::Bulk {
            start,
            end,
            desks,
            status,
            person,
            title,
            price,
        } => {
            let command = BulkAvailabilityCommand {
                person_name: person,
                title,
                price,
                ..BulkAvailabilityCommand::new(start, end, desks, status)
            };
            let written = store.apply_bulk_availability(&command).await?;
            if !quiet {
                eprintln!("Wrote {} booking(s)", written.len());
            }
            print(format, &written, |b| pretty::format_bookings(b));
        }
        BookingsAction::Upcoming { from, limit } => {
            let from = from.unwrap_or_else(|| Local::now().date_naive());
            let bookings = store.get_upcoming_bookings(from, limit).await?;
            print(format, &bookings, |b| pretty::format_bookings(b));
        }
    }
    Ok(())
}

async fn expenses(
    ctx: &StoreContext,
    action: ExpensesAction,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let store = ctx.store();
    match action {
        ExpensesAction::List { start, end } => {
            let expenses = store.get_expenses(DateRange::new(start, end)?).await?;
            print(format, &expenses, |e| pretty::format_expenses(e));
        }
        ExpensesAction::Add {
            date,
            amount,
            description,
            category,
        } => {
            let expense = Expense::new(date, amount, description).with_category(category);
            let saved = store.save_expense(&expense).await?;
            print(format, &saved, pretty::format_expense);
        }
        ExpensesAction::Delete { id } => match store.delete_expense(&id).await? {
            Some(_) if !quiet => println!("Deleted expense {id}"),
            Some(_) => {}
            None => bail!("Expense {id} not found"),
        },
    }
    Ok(())
}

async fn recurring(
    ctx: &StoreContext,
    action: RecurringAction,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let store = ctx.store();
    match action {
        RecurringAction::List => {
            let rules = store.get_recurring_expenses().await?;
            print(format, &rules, |r| pretty::format_rules(r));
        }
        RecurringAction::Add {
            description,
            amount,
            day,
            category,
            start,
            end,
            inactive,
        } => {
            let rule = RecurringExpense::new(description, amount, day)
                .with_category(category)
                .with_window(start, end)
                .with_active(!inactive);
            let saved = store.save_recurring_expense(&rule).await?;
            print(format, &saved, pretty::format_rule);
        }
        RecurringAction::SetActive { id, active } => {
            let Some(rule) = store
                .get_recurring_expenses()
                .await?
                .into_iter()
                .find(|r| r.id == id)
            else {
                bail!("Recurring expense {id} not found");
            };
            let saved = store
                .save_recurring_expense(&rule.with_active(active))
                .await?;
            print(format, &saved, pretty::format_rule);
        }
        RecurringAction::Delete { id } => match store.delete_recurring_expense(&id).await? {
            Some(_) if !quiet => println!("Deleted recurring expense {id}"),
            Some(_) => {}
            None => bail!("Recurring expense {id} not found"),
        },
        RecurringAction::Generate { year, month } => {
            let generated = store.generate_recurring_expenses(year, month).await?;
            if !quiet {
                eprintln!("Generated {} expense(s) for {year}-{month:02}", generated.len());
            }
            print(format, &generated, |e| pretty::format_expenses(e));
        }
    }
    Ok(())
}

async fn stats(ctx: &StoreContext, action: StatsAction, format: OutputFormat) -> Result<()> {
    let store = ctx.store();
    match action {
        StatsAction::Month { year, month } => {
            let stats = store.get_monthly_stats(year, month).await?;
            print(format, &stats, pretty::format_period_stats);
        }
        StatsAction::Range { start, end } => {
            let stats = store
                .get_stats_for_date_range(DateRange::new(start, end)?)
                .await?;
            print(format, &stats, pretty::format_period_stats);
        }
        StatsAction::Desks { start, end } => {
            let stats = store
                .get_desk_statistics(DateRange::new(start, end)?)
                .await?;
            print(format, &stats, |s| pretty::format_desk_statistics(s));
        }
    }
    Ok(())
}

async fn waitlist(
    ctx: &StoreContext,
    action: WaitlistAction,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let waitlist = ctx.waitlist();
    match action {
        WaitlistAction::List => {
            let entries = waitlist.get_all_entries().await?;
            print(format, &entries, |e| pretty::format_entries(e));
        }
        WaitlistAction::Add {
            name,
            email,
            phone,
            desired_start,
            notes,
        } => {
            let new = NewWaitingListEntry {
                name,
                email,
                phone,
                desired_start,
                notes,
            };
            let entry = waitlist.add_entry(new).await?;
            print(format, &entry, pretty::format_entry);
        }
        WaitlistAction::Update {
            id,
            name,
            email,
            phone,
            desired_start,
            notes,
        } => {
            let patch = WaitingListPatch {
                name,
                email,
                phone,
                desired_start,
                notes,
            };
            match waitlist.update_entry(&id, patch).await? {
                Some(entry) => print(format, &entry, pretty::format_entry),
                None => bail!("Waiting list entry {id} not found"),
            }
        }
        WaitlistAction::Remove { id } => match waitlist.remove_entry(&id).await? {
            Some(_) if !quiet => println!("Removed {id} from the waiting list"),
            Some(_) => {}
            None => bail!("Waiting list entry {id} not found"),
        },
        WaitlistAction::Clear => {
            waitlist.clear().await?;
            if !quiet {
                println!("Waiting list cleared");
            }
        }
    }
    Ok(())
}
