pub mod totals_calculator;

pub use totals_calculator::{compute_totals, effective_rate, standard_rate, Totals};
