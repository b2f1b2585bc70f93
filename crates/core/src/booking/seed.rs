use super::types::Desk;

/// Returns the default desk layout.
///
/// Desks are seeded once when a store is built and never change afterwards.
pub fn seed_desks() -> Vec<Desk> {
    let main = (1..=6).map(|n| Desk::new(format!("D{n}"), "Main", n));
    let quiet = (7..=10).map(|n| Desk::new(format!("D{n}"), "Quiet", n - 6));
    main.chain(quiet).collect()
}
